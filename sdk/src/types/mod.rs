//! Value types shared across the SDK.
use thiserror::Error;

pub mod entity_id;
pub mod time;
pub mod transaction;

pub use entity_id::{AccountId, ContractId, FileId};
pub use time::{Duration, Timestamp};
pub use transaction::TransactionId;

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed entity id: {0}")]
    MalformedEntityId(String),
    #[error("malformed transaction id: {0}")]
    MalformedTransactionId(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
