use std::str::Utf8Error;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum FixError {
    #[error("secret for '{key}' is not valid UTF-8: {source}")]
    Encoding {
        key: String,
        #[source]
        source: Utf8Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
