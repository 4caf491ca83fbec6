use mongodb::bson;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Failed to serialize to BSON: {0}")]
    BsonSer(#[from] bson::ser::Error),

    #[error("Failed to deserialize from BSON: {0}")]
    BsonDe(#[from] bson::de::Error),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("No update found: {0}")]
    NoUpdateFound(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),
}
