#[cfg(feature = "redis-store")]
pub mod redis;

#[cfg(feature = "postgres-store")]
pub mod postgres;

pub mod file;
pub mod memory;

mod document_trait;
pub use document_trait::*;

/// Errors raised by the quote stores.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No quote exists for the session. A legitimate answer, not a failure.
    #[error("Quote not found")]
    NotFound,

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Encoding failed with: {0}")]
    Encode(String),

    #[error("Decoding failed with: {0}")]
    Decode(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Backend(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(feature = "redis-store")]
impl From<fred::error::Error> for Error {
    fn from(err: fred::error::Error) -> Self {
        Error::Backend(err.to_string())
    }
}

#[cfg(feature = "postgres-store")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Backend(err.to_string())
    }
}

#[cfg(feature = "redis-store")]
pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::Encode(e.to_string()))
}

#[cfg(feature = "redis-store")]
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, Error> {
    serde_json::from_str(value).map_err(|e| Error::Decode(e.to_string()))
}
