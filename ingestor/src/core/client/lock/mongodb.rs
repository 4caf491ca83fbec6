use async_trait::async_trait;
use chrono::{Duration, SubsecRound, Utc};
use mongodb::bson::{doc, Bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::UpdateOptions;
use mongodb::Collection;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::LockError;
use super::{LockClient, LockInfo, LockResult};
use crate::core::client::database::constant::LOCKS_COLLECTION;
use crate::core::client::database::MongoClient;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Lock client backed by a MongoDB collection, one document per key.
pub struct MongoLockClient {
    client: Arc<MongoClient>,
}

impl MongoLockClient {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<LockInfo> {
        self.client.collection(LOCKS_COLLECTION)
    }
}

/// A conditional upsert that loses to an existing key fails with a duplicate key error.
fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match &*error.kind {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[async_trait]
impl LockClient for MongoLockClient {
    async fn acquire_lock(&self, key: &str, owner: &str, expiry_seconds: u64) -> Result<LockResult, LockError> {
        let ttl = i64::try_from(expiry_seconds).map_err(|_| LockError::InvalidExpiry(expiry_seconds))?;
        let now = Utc::now().round_subsecs(0);
        let expires_at = now + Duration::seconds(ttl);

        let filter = doc! {
            "_id": key,
            "$or": [
                { "expires_at": { "$lte": Bson::DateTime(now.into()) } },
                { "owner": owner },
            ],
        };
        let update = doc! { "$set": { "owner": owner, "expires_at": Bson::DateTime(expires_at.into()) } };
        let options = UpdateOptions::builder().upsert(true).build();

        match self.collection().update_one(filter, update, options).await {
            Ok(_) => {
                debug!(key, owner, expiry_seconds, "Lock acquired");
                Ok(LockResult::Acquired)
            }
            Err(e) if is_duplicate_key(&e) => {
                let current = self.get_lock_owner(key).await?.unwrap_or_default();
                info!(key, owner, current_owner = %current, "Lock already held");
                Ok(LockResult::AlreadyHeld(current))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn release_lock(&self, key: &str, owner: &str) -> Result<LockResult, LockError> {
        let deleted = self.client.delete_one::<LockInfo>(LOCKS_COLLECTION, doc! { "_id": key, "owner": owner }).await?;
        if deleted == 0 {
            debug!(key, owner, "No lock to release");
            Ok(LockResult::NotFound)
        } else {
            debug!(key, owner, "Lock released");
            Ok(LockResult::Released)
        }
    }

    async fn get_lock_owner(&self, key: &str) -> Result<Option<String>, LockError> {
        let lock: Option<LockInfo> = self.client.find_one(LOCKS_COLLECTION, doc! { "_id": key }).await?;
        Ok(lock.map(|l| l.owner))
    }
}
