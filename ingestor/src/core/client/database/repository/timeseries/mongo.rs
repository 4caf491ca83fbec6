use async_trait::async_trait;
use ingestor_provider_client_interface::PixelCoordinate;
use mongodb::bson::{self, doc, Document};
use std::sync::Arc;
use tracing::{debug, trace};

use super::r#trait::TimeSeriesRepository;
use crate::core::client::database::constant::TIMESERIES_COLLECTION;
use crate::core::client::database::error::DatabaseError;
use crate::core::client::database::mongo_client::MongoClient;
use crate::types::timeseries::{TimeSeriesDocument, UpsertResult};

pub struct MongoTimeSeriesRepository {
    client: Arc<MongoClient>,
}

impl MongoTimeSeriesRepository {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }
}

/// Exact match on a stored pixel coordinate.
pub fn coordinate_filter(coordinate: PixelCoordinate) -> Document {
    doc! { "metadata.coordinates": [coordinate.lng, coordinate.lat] }
}

#[async_trait]
impl TimeSeriesRepository for MongoTimeSeriesRepository {
    async fn upsert_batch(&self, documents: &[TimeSeriesDocument]) -> Result<UpsertResult, DatabaseError> {
        let mut outcome = UpsertResult::default();
        for document in documents.iter().filter(|d| !d.timeseries.is_empty()) {
            let update = doc! { "$push": { "timeseries": { "$each": bson::to_bson(&document.timeseries)? } } };
            let result = self
                .client
                .update_one::<TimeSeriesDocument>(TIMESERIES_COLLECTION, coordinate_filter(document.coordinate()), update)
                .await?;
            if result.matched_count == 0 {
                trace!(coordinate = %document.coordinate(), geocode = %document.geocode, "No stored pixel, skipping");
            }
            outcome.matched += result.matched_count;
            outcome.modified += result.modified_count;
        }
        debug!(
            documents = documents.len(),
            matched = outcome.matched,
            modified = outcome.modified,
            "Time series batch written"
        );
        Ok(outcome)
    }
}
