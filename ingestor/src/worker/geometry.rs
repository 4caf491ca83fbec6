use ingestor_provider_client_interface::Geometry;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::GeometryError;
use crate::types::geometry::{Feature, FeatureCollection, GeometrySet, GeometrySource};

const AREAL_KINDS: [&str; 2] = ["Polygon", "MultiPolygon"];

/// Loads the polygons of a run.
pub async fn load_geometry(source: &GeometrySource, geocode_property: &str) -> Result<GeometrySet, GeometryError> {
    match source {
        GeometrySource::File(path) => {
            let bytes =
                tokio::fs::read(path).await.map_err(|source| GeometryError::Io { path: path.clone(), source })?;
            let collection: FeatureCollection = serde_json::from_slice(&bytes)?;
            let set = polygons_from_collection(&collection, geocode_property)?;
            info!(path = %path.display(), polygons = set.len(), "Loaded geometry file");
            Ok(set)
        }
        GeometrySource::Inline(collection) => {
            let set = polygons_from_collection(collection, geocode_property)?;
            info!(polygons = set.len(), "Loaded inline geometry");
            Ok(set)
        }
    }
}

/// Keeps Polygon and MultiPolygon features, in order, reading each geocode from
/// `geocode_property`.
pub fn polygons_from_collection(
    collection: &FeatureCollection,
    geocode_property: &str,
) -> Result<GeometrySet, GeometryError> {
    if collection.kind != "FeatureCollection" {
        return Err(GeometryError::NotAFeatureCollection(collection.kind.clone()));
    }

    let mut pairs = Vec::new();
    let mut skipped = 0usize;
    for (position, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = areal_geometry(position, feature)? else {
            skipped += 1;
            continue;
        };
        let geocode = match geocode_of(feature, geocode_property) {
            Some(geocode) => geocode,
            None => {
                let fallback = pairs.len().to_string();
                warn!(position, property = geocode_property, geocode = %fallback, "Feature has no geocode, using its index");
                fallback
            }
        };
        pairs.push((geocode, geometry));
    }

    if skipped > 0 {
        debug!(skipped, "Skipped features without an areal geometry");
    }
    if pairs.is_empty() {
        return Err(GeometryError::NoPolygons);
    }
    Ok(GeometrySet::from_pairs(pairs))
}

fn areal_geometry(position: usize, feature: &Feature) -> Result<Option<Geometry>, GeometryError> {
    let Some(value) = feature.geometry.as_ref() else { return Ok(None) };
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    if !AREAL_KINDS.contains(&kind) {
        return Ok(None);
    }
    serde_json::from_value(value.clone()).map(Some).map_err(|e| GeometryError::InvalidGeometry {
        position,
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

fn geocode_of(feature: &Feature, property: &str) -> Option<String> {
    match feature.properties.as_ref()?.get(property)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
