pub mod helpers;

use self::helpers::{timed, ToDocument};
use crate::core::client::database::error::DatabaseError;
use mongodb::bson::{doc, Document};
use mongodb::options::UpdateOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Generic MongoDB client with no business logic knowledge
///
/// Repositories build filters and update documents, this client only runs
/// them and logs timings.
pub struct MongoClient {
    database: Arc<Database>,
}

impl MongoClient {
    /// Create a new MongoClient connection
    pub async fn new(connection_uri: &str, database_name: &str) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(connection_uri).await?;
        let database = Arc::new(client.database(database_name));
        Ok(Self { database })
    }

    /// Get a typed collection
    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// Find a single document
    pub async fn find_one<T>(&self, collection: &str, filter: Document) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        timed("find_one", || async { Ok(self.collection::<T>(collection).find_one(filter, None).await?) }).await
    }

    /// Insert if not exists (upsert with $setOnInsert)
    /// Returns true if inserted, false if already existed
    pub async fn insert_if_not_exists<T>(
        &self,
        collection: &str,
        filter: Document,
        doc: T,
    ) -> Result<bool, DatabaseError>
    where
        T: Serialize + ToDocument + Send + Sync,
    {
        timed("insert_if_not_exists", || async {
            let options = UpdateOptions::builder().upsert(true).build();
            let update = doc! { "$setOnInsert": doc.to_document()? };
            let result = self.collection::<T>(collection).update_one(filter, update, options).await?;
            Ok(result.matched_count == 0)
        })
        .await
    }

    /// Update a single document, never inserting
    pub async fn update_one<T>(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, DatabaseError>
    where
        T: Send + Sync,
    {
        timed("update_one", || async {
            let result = self.collection::<T>(collection).update_one(filter, update, None).await?;
            Ok(UpdateResult { matched_count: result.matched_count, modified_count: result.modified_count })
        })
        .await
    }

    /// Count documents matching filter
    pub async fn count<T>(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError>
    where
        T: Send + Sync,
    {
        timed("count", || async { Ok(self.collection::<T>(collection).count_documents(filter, None).await?) }).await
    }

    /// Delete a single document
    pub async fn delete_one<T>(&self, collection: &str, filter: Document) -> Result<u64, DatabaseError>
    where
        T: Send + Sync,
    {
        timed("delete_one", || async {
            let result = self.collection::<T>(collection).delete_one(filter, None).await?;
            Ok(result.deleted_count)
        })
        .await
    }

    /// Create indexes on a collection
    pub async fn create_indexes<T>(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<(), DatabaseError>
    where
        T: Send + Sync,
    {
        timed("create_indexes", || async {
            self.collection::<T>(collection).create_indexes(indexes, None).await?;
            Ok(())
        })
        .await
    }

    /// Health check - ping the database
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        timed("health_check", || async {
            self.database.run_command(doc! { "ping": 1 }, None).await?;
            Ok(())
        })
        .await
    }
}

/// Result of an update operation
#[derive(Debug, Clone, Copy)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}
