use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use ingestor_provider_client_interface::{ObservationTable, PixelCoordinate};

use crate::error::job::ReshapeError;
use crate::types::timeseries::{PointMetadata, TimeSeriesDocument, TimeSeriesRecord};

/// Stored field an attribute code is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    Ndvi,
    Evi,
    Red,
    Nir,
    Green,
}

impl SeriesField {
    pub fn from_attribute(code: &str) -> Option<Self> {
        match code {
            "NDVI" => Some(SeriesField::Ndvi),
            "EVI" => Some(SeriesField::Evi),
            "B04" => Some(SeriesField::Red),
            "B08" => Some(SeriesField::Nir),
            "B03" => Some(SeriesField::Green),
            _ => None,
        }
    }

    fn slot(self, record: &mut TimeSeriesRecord) -> &mut Option<f64> {
        match self {
            SeriesField::Ndvi => &mut record.ndvi,
            SeriesField::Evi => &mut record.evi,
            SeriesField::Red => &mut record.red,
            SeriesField::Nir => &mut record.nir,
            SeriesField::Green => &mut record.green,
        }
    }
}

/// Groups raw observations into one document per pixel.
///
/// Documents follow the order in which coordinates first appear, records are
/// sorted by date. When the same (coordinate, date, attribute) is observed
/// twice the first value is kept.
pub fn reshape(geocode: &str, table: &ObservationTable) -> Result<Vec<TimeSeriesDocument>, ReshapeError> {
    let mut positions: HashMap<(u64, u64), usize> = HashMap::new();
    let mut pixels: Vec<(PixelCoordinate, BTreeMap<NaiveDate, TimeSeriesRecord>)> = Vec::new();

    for row in &table.rows {
        if !row.coordinate.is_finite() {
            return Err(ReshapeError::InvalidCoordinate { lng: row.coordinate.lng, lat: row.coordinate.lat });
        }
        let field = SeriesField::from_attribute(&row.attribute)
            .ok_or_else(|| ReshapeError::UnknownAttribute(row.attribute.clone()))?;

        let position = *positions.entry(row.coordinate.key()).or_insert_with(|| {
            pixels.push((row.coordinate, BTreeMap::new()));
            pixels.len() - 1
        });
        let record = pixels[position]
            .1
            .entry(row.timestamp)
            .or_insert_with(|| TimeSeriesRecord::empty(row.timestamp.and_time(NaiveTime::MIN).and_utc()));
        let slot = field.slot(record);
        if slot.is_none() {
            *slot = Some(row.value);
        }
    }

    Ok(pixels
        .into_iter()
        .map(|(coordinate, records)| TimeSeriesDocument {
            geocode: geocode.to_string(),
            metadata: PointMetadata::point(coordinate),
            timeseries: records.into_values().collect(),
        })
        .collect())
}
