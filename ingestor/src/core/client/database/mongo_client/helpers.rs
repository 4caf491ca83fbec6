use std::future::Future;
use std::time::Instant;

use mongodb::bson::{self, Bson, Document};
use serde::Serialize;

use crate::core::client::database::error::DatabaseError;

/// Conversion of any serializable value into a BSON document.
pub trait ToDocument {
    fn to_document(&self) -> Result<Document, DatabaseError>;
}

impl<T: Serialize> ToDocument for T {
    fn to_document(&self) -> Result<Document, DatabaseError> {
        match bson::to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(DatabaseError::FailedToSerializeDocument(format!(
                "expected a document, got {:?}",
                other.element_type()
            ))),
        }
    }
}

/// Converts a counter into the signed integer BSON stores.
pub fn to_bson_int(value: u64) -> Result<i64, DatabaseError> {
    i64::try_from(value)
        .map_err(|_| DatabaseError::FailedToSerializeDocument(format!("{value} does not fit in a BSON integer")))
}

/// Runs a database operation and logs how long it took.
pub async fn timed<F, Fut, T>(operation: &'static str, f: F) -> Result<T, DatabaseError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let start = Instant::now();
    let result = f().await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match &result {
        Ok(_) => tracing::trace!(operation, elapsed_ms, "Database operation completed"),
        Err(e) => tracing::debug!(operation, elapsed_ms, error = %e, "Database operation failed"),
    }
    result
}
