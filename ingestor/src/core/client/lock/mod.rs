pub mod error;
pub mod mongodb;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error::LockError;
use serde::{Deserialize, Serialize};

pub use self::mongodb::MongoLockClient;

/// Stored lock entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LockInfo {
    #[serde(rename = "_id")]
    pub key: String,
    pub owner: String,
    #[serde(with = "::mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

/// Result of lock acquisition attempts
#[derive(Debug, Clone, PartialEq)]
pub enum LockResult {
    Acquired,
    AlreadyHeld(String), // Contains current owner
    Released,
    NotFound,
}

/// Single-flight lock keyed by an arbitrary string.
///
/// A lock expires on its own after `expiry_seconds`, so a crashed holder
/// blocks other runs for at most that long.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockClient: Send + Sync {
    /// Acquire the lock unless another owner holds an unexpired one.
    /// Re-acquiring a lock already owned by `owner` refreshes its expiry.
    async fn acquire_lock(&self, key: &str, owner: &str, expiry_seconds: u64) -> Result<LockResult, LockError>;

    /// Release a lock if owned by the specified owner
    async fn release_lock(&self, key: &str, owner: &str) -> Result<LockResult, LockError>;

    /// Check if a lock exists and get its current owner
    async fn get_lock_owner(&self, key: &str) -> Result<Option<String>, LockError>;
}
