use std::path::PathBuf;

use ingestor_provider_client_interface::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON FeatureCollection as received from callers or read from disk.
///
/// Feature geometries are kept untyped so that non-areal features can be
/// skipped instead of failing the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Where a run's polygons come from.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySource {
    File(PathBuf),
    Inline(FeatureCollection),
}

/// One polygon of the run with its stable position.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonUnit {
    pub index: u64,
    pub geocode: String,
    pub geometry: Geometry,
}

/// Ordered polygons of one run. `units[i].index == i` always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySet {
    units: Vec<PolygonUnit>,
}

impl GeometrySet {
    /// Builds the set from `(geocode, geometry)` pairs, assigning indexes by position.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Geometry)>) -> Self {
        let units = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (geocode, geometry))| PolygonUnit { index: i as u64, geocode, geometry })
            .collect();
        Self { units }
    }

    pub fn len(&self) -> u64 {
        self.units.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&PolygonUnit> {
        usize::try_from(index).ok().and_then(|i| self.units.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolygonUnit> {
        self.units.iter()
    }
}
