use thiserror::Error;

use crate::core::client::database::DatabaseError;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Lock store error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid lock expiry: {0} seconds")]
    InvalidExpiry(u64),
}
