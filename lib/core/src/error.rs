use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid {field}: {reason}")]
    DataShape { field: &'static str, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Import error on line {line}: {reason}")]
    Import { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn data_shape(field: &'static str, reason: impl Into<String>) -> Self {
        Error::DataShape {
            field,
            reason: reason.into(),
        }
    }
}
