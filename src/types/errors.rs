use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unknown client: {0}")]
    UnknownClient(String),
    #[error("Catalog error: {0}")]
    Catalog(String),
    #[error("Knowledge store error: {0}")]
    Knowledge(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Serialize for ResolveError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
