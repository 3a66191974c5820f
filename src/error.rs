use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the remote data providers.
///
/// "Not found" is deliberately not a variant: a missing verse, chapter or
/// word is modeled as absence (`Option` / empty map) everywhere in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Network/connectivity failure, including non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected schema.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
