use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Failed to read geometry file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a FeatureCollection, got `{0}`")]
    NotAFeatureCollection(String),

    #[error("Feature {position} has an invalid {kind} geometry: {message}")]
    InvalidGeometry { position: usize, kind: String, message: String },

    #[error("Geometry source contains no Polygon or MultiPolygon features")]
    NoPolygons,
}
