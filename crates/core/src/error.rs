#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("comparison matrix is not square: {rows} rows but row {row} has {len} entries")]
    MatrixNotSquare { rows: usize, row: usize, len: usize },
    #[error("matrix '{name}' is not reciprocal at ({row}, {col})")]
    NotReciprocal {
        name: String,
        row: usize,
        col: usize,
    },
    #[error("matrix '{name}' has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to deserialize JSON: {0}")]
    JsonDeserialization(serde_json::Error),
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
