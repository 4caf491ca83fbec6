use std::io::Write;

use assert_matches::assert_matches;
use rstest::*;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::error::GeometryError;
use crate::types::geometry::{FeatureCollection, GeometrySource};
use crate::worker::geometry::{load_geometry, polygons_from_collection};

fn square(x: f64) -> serde_json::Value {
    json!({ "type": "Polygon", "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 0.0]]] })
}

#[fixture]
fn municipalities() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "CD_MUN": "3550308" }, "geometry": square(0.0) },
            { "type": "Feature", "properties": { "CD_MUN": "0" }, "geometry": { "type": "Point", "coordinates": [1.0, 1.0] } },
            { "type": "Feature", "properties": { "CD_MUN": 3509502 }, "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 0.0]]]]
            } },
            { "type": "Feature", "properties": {}, "geometry": square(4.0) },
            { "type": "Feature", "properties": { "CD_MUN": "1" }, "geometry": null }
        ]
    })
}

#[rstest]
#[tokio::test]
async fn file_source_keeps_areal_features_in_order(municipalities: serde_json::Value) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(municipalities.to_string().as_bytes()).unwrap();

    let set = load_geometry(&GeometrySource::File(file.path().to_path_buf()), "CD_MUN").await.unwrap();

    assert_eq!(set.len(), 3);
    let units: Vec<_> = set.iter().collect();
    assert_eq!(units[0].geocode, "3550308");
    assert_eq!(units[0].geometry.kind(), "Polygon");
    assert_eq!(units[1].geocode, "3509502");
    assert_eq!(units[1].geometry.kind(), "MultiPolygon");
    // Missing property falls back to the index
    assert_eq!(units[2].geocode, "2");
    assert!(units.iter().enumerate().all(|(i, unit)| unit.index == i as u64));
}

#[rstest]
#[tokio::test]
async fn inline_source_reads_a_custom_property(municipalities: serde_json::Value) {
    let mut collection: FeatureCollection = serde_json::from_value(municipalities).unwrap();
    collection.features[0].properties.as_mut().unwrap().insert("GEOCODE".into(), json!("A1"));

    let set = load_geometry(&GeometrySource::Inline(collection), "GEOCODE").await.unwrap();

    assert_eq!(set.get(0).unwrap().geocode, "A1");
    assert_eq!(set.get(1).unwrap().geocode, "1");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_geometry(&GeometrySource::File(dir.path().join("missing.geojson")), "CD_MUN").await;
    assert_matches!(result, Err(GeometryError::Io { .. }));
}

#[rstest]
#[case(json!({ "type": "FeatureCollection", "features": [] }))]
#[case(json!({
    "type": "FeatureCollection",
    "features": [{ "type": "Feature", "properties": {}, "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] } }]
}))]
fn collections_without_polygons_are_rejected(#[case] body: serde_json::Value) {
    let collection: FeatureCollection = serde_json::from_value(body).unwrap();
    assert_matches!(polygons_from_collection(&collection, "CD_MUN"), Err(GeometryError::NoPolygons));
}

#[test]
fn malformed_polygon_is_rejected() {
    let collection: FeatureCollection = serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Feature", "properties": {}, "geometry": { "type": "Polygon", "coordinates": "nope" } }]
    }))
    .unwrap();
    assert_matches!(
        polygons_from_collection(&collection, "CD_MUN"),
        Err(GeometryError::InvalidGeometry { position: 0, .. })
    );
}

#[test]
fn single_feature_is_not_a_collection() {
    let collection: FeatureCollection =
        serde_json::from_value(json!({ "type": "Feature", "features": [] })).unwrap();
    assert_matches!(polygons_from_collection(&collection, "CD_MUN"), Err(GeometryError::NotAFeatureCollection(_)));
}
