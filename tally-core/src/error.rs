//! Pipeline-level error taxonomy.
//!
//! Only failures that abort an upload live here. A single bad statement line
//! never becomes an `Error`; the parsers drop it and move on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The PDF (or fragment stream) could not be turned into text.
    #[error("decode error: {0}")]
    Decode(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote transaction store rejected a request or returned garbage.
    #[error("store error: {0}")]
    Store(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
