//! Point-feature ingestion through the coordinate-transform pipeline.

pub mod projector;

pub use projector::CoordinateProjector;

use geo_types::Point;

use crate::engine::{FeatureClass, FeatureClassSpec, FeatureStore, FieldValue};
use crate::{Result, SessionError};

// Field indexes of the point layout declared by `FeatureClassSpec::points`.
// The datetime slot (2) keeps its engine-side default.
const FIELD_LONG: usize = 0;
const FIELD_LAT: usize = 1;
const FIELD_NAME: usize = 3;

/// A raw point record in the source spatial reference. Ephemeral:
/// consumed by ingestion and not retained afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl FeatureRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    /// The four-capital sample set demo maps are seeded with.
    pub fn sample_cities() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::new("Moscow", 37.616667, 55.75),
            FeatureRecord::new("London", -0.1275, 51.507222),
            FeatureRecord::new("Washington", -77.016389, 38.904722),
            FeatureRecord::new("Beijing", 116.383333, 39.916667),
        ]
    }
}

/// Turns raw records into persisted features through a projector.
pub struct FeatureIngestor;

impl FeatureIngestor {
    /// Creates the feature class described by `spec` in `store` and
    /// ingests `records` into it, strictly in input order, returning the
    /// number of persisted features.
    ///
    /// Any per-record failure is fatal to the whole batch; callers must
    /// not mark their surrounding bootstrap complete on error, so a later
    /// attempt re-runs ingestion instead of keeping a half-populated
    /// class. Ingestion is not idempotent: running it twice against a
    /// non-empty class duplicates records, which is why bootstrap gates
    /// on the map's layer count.
    pub fn ingest(
        store: &mut dyn FeatureStore,
        spec: &FeatureClassSpec,
        records: &[FeatureRecord],
        projector: &CoordinateProjector,
    ) -> Result<usize> {
        let mut class = store.create_feature_class(spec)?;

        for (index, record) in records.iter().enumerate() {
            Self::ingest_one(class.as_mut(), record, projector).map_err(|e| {
                SessionError::Ingestion {
                    index,
                    name: record.name.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        log::debug!(
            "ingested {} features into feature class '{}'",
            records.len(),
            spec.name
        );
        Ok(records.len())
    }

    fn ingest_one(
        class: &mut dyn FeatureClass,
        record: &FeatureRecord,
        projector: &CoordinateProjector,
    ) -> Result<()> {
        let projected = projector.transform(Point::new(record.x, record.y));

        let mut feature = class.create_feature()?;
        feature.set_geometry(projected);
        feature.set_field(FIELD_LONG, FieldValue::Real(record.x))?;
        feature.set_field(FIELD_LAT, FieldValue::Real(record.y))?;
        feature.set_field(FIELD_NAME, FieldValue::Text(record.name.clone()))?;

        class.insert(feature)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{SR_WEB_MERCATOR, SR_WGS84};
    use crate::engine::memory::MemoryEngine;
    use crate::engine::{FieldDef, FieldType, GeoEngine, GeometryType};
    use crate::prelude::HashMap;

    fn projector(engine: &MemoryEngine) -> CoordinateProjector {
        CoordinateProjector::new(engine, SR_WGS84, SR_WEB_MERCATOR).unwrap()
    }

    #[test]
    fn test_sample_cities_ingest() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");

        let count = FeatureIngestor::ingest(
            store.as_mut(),
            &spec,
            &FeatureRecord::sample_cities(),
            &projector(&engine),
        )
        .unwrap();

        assert_eq!(count, 4);
        assert_eq!(engine.feature_count("store", "points"), 4);
    }

    #[test]
    fn test_ingest_preserves_input_order() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");
        let records = FeatureRecord::sample_cities();

        FeatureIngestor::ingest(store.as_mut(), &spec, &records, &projector(&engine)).unwrap();

        let features = engine.features("store", "points");
        assert_eq!(features.len(), records.len());
        for (record, (_, feature)) in records.iter().zip(&features) {
            assert_eq!(
                feature.field(FIELD_NAME),
                Some(&FieldValue::Text(record.name.clone()))
            );
        }
    }

    #[test]
    fn test_empty_batch_creates_empty_class() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");

        let count =
            FeatureIngestor::ingest(store.as_mut(), &spec, &[], &projector(&engine)).unwrap();

        assert_eq!(count, 0);
        assert!(store.feature_class("points").is_some());
    }

    #[test]
    fn test_record_failure_is_fatal_to_batch() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();

        // A schema narrower than the point layout makes the name-field
        // assignment fail for every record.
        let spec = FeatureClassSpec {
            name: "points".to_string(),
            geometry_type: GeometryType::Point,
            fields: vec![
                FieldDef::new("long", FieldType::Real),
                FieldDef::new("lat", FieldType::Real),
            ],
            options: HashMap::default(),
        };

        let result = FeatureIngestor::ingest(
            store.as_mut(),
            &spec,
            &FeatureRecord::sample_cities(),
            &projector(&engine),
        );

        match result {
            Err(crate::SessionError::Ingestion { index, name, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(name, "Moscow");
            }
            other => panic!("expected Ingestion error, got {other:?}"),
        }
        assert_eq!(engine.feature_count("store", "points"), 0);
    }

    #[test]
    fn test_ingested_features_carry_projected_geometry() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");
        let records = vec![FeatureRecord::new("Moscow", 37.616667, 55.75)];

        FeatureIngestor::ingest(store.as_mut(), &spec, &records, &projector(&engine)).unwrap();

        let features = engine.features("store", "points");
        let (_, feature) = &features[0];

        let geometry = feature.geometry().expect("geometry must be set");
        assert!((geometry.x() - 4_187_468.215_780).abs() < 1e-4);
        assert!((geometry.y() - 7_508_807.851_302).abs() < 1e-4);

        // Raw source coordinates are kept in the attribute fields.
        assert_eq!(feature.field(FIELD_LONG), Some(&FieldValue::Real(37.616667)));
        assert_eq!(feature.field(FIELD_LAT), Some(&FieldValue::Real(55.75)));
    }
}
