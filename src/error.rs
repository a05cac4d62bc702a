use thiserror::Error;

#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unparsable amount {value:?} at row {row}")]
    UnparsableAmount { row: usize, value: String },

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Could not create account {0:?}: {1}")]
    AccountCreateFailed(String, String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("No file provided")]
    NoFileProvided,

    #[error("Could not determine statement format; pass an explicit format key")]
    FormatDetectionAmbiguous,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, HearthError>;
