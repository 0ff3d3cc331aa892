use thiserror::Error;

use crate::client::ClientError;
use crate::models::RecordId;

/// Collection errors.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Expected a JSON array of records")]
    NotAnArray,

    #[error("Malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Collection URL must be a non-empty string")]
    InvalidUrl,

    #[error("No record with id {0} in the collection")]
    UnknownRecord(RecordId),
}
