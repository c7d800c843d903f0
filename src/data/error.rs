use thiserror::Error;

/// Fatal ingestion failures. Bad individual cells never end up here; they
/// are coerced to nulls during normalization.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed source: {0}")]
    Malformed(String),

    #[error("source is missing required column '{0}'")]
    MissingColumn(String),

    #[error("source contains no data rows")]
    Empty,
}

pub type Result<T> = std::result::Result<T, DataError>;
