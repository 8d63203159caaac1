//! In-process engine used by demos and the test suite.
//!
//! Documents and stores persist for the lifetime of the engine instance
//! and are shared by every handle opened from it, so a second session on
//! the same map identifier observes what the first one persisted.

use std::f64::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use geo_types::Point;

use crate::core::constants::{DEFAULT_MAP_SCALE, SR_WEB_MERCATOR, SR_WGS84};
use crate::core::geo::SpatialExtent;
use crate::engine::{
    CoordinateTransform, DataSourceRef, Feature, FeatureClass, FeatureClassSpec, FeatureId,
    FeatureStore, FieldType, FieldValue, GeoEngine, GeometryType, LayerRef, MapDocument, MapView,
    SrCode,
};
use crate::prelude::HashMap;
use crate::{Result, SessionError};

/// Web-Mercator sphere radius in metres.
const EARTH_RADIUS: f64 = 6_378_137.0;

const KNOWN_SR: [SrCode; 2] = [SR_WGS84, SR_WEB_MERCATOR];

#[derive(Default)]
struct DocumentState {
    options: HashMap<String, String>,
    extent_limits: Option<SpatialExtent>,
    layers: Vec<LayerRef>,
    save_count: u32,
}

struct ClassState {
    spec: FeatureClassSpec,
    features: Vec<(FeatureId, Feature)>,
    next_id: u64,
}

#[derive(Default)]
struct StoreState {
    classes: HashMap<String, ClassState>,
}

#[derive(Default)]
struct EngineState {
    maps: HashMap<String, DocumentState>,
    stores: HashMap<String, StoreState>,
}

/// A complete in-memory [`GeoEngine`]. Cloning shares the underlying
/// state; handles opened from any clone see the same maps and stores.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    state: Arc<Mutex<EngineState>>,
}

fn lock(state: &Arc<Mutex<EngineState>>) -> Result<MutexGuard<'_, EngineState>> {
    state
        .lock()
        .map_err(|_| SessionError::Engine("engine state poisoned".to_string()))
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current feature count of a class, for assertions against persisted
    /// state.
    pub fn feature_count(&self, store: &str, class: &str) -> usize {
        lock(&self.state)
            .ok()
            .and_then(|state| {
                state
                    .stores
                    .get(store)
                    .and_then(|s| s.classes.get(class))
                    .map(|c| c.features.len())
            })
            .unwrap_or(0)
    }

    /// Persisted features of a class, in insertion order.
    pub fn features(&self, store: &str, class: &str) -> Vec<(FeatureId, Feature)> {
        lock(&self.state)
            .ok()
            .and_then(|state| {
                state
                    .stores
                    .get(store)
                    .and_then(|s| s.classes.get(class))
                    .map(|c| c.features.clone())
            })
            .unwrap_or_default()
    }

    /// How often a map document has been persisted.
    pub fn save_count(&self, map: &str) -> u32 {
        lock(&self.state)
            .ok()
            .and_then(|state| state.maps.get(map).map(|m| m.save_count))
            .unwrap_or(0)
    }

    /// Options a map document currently carries.
    pub fn document_options(&self, map: &str) -> HashMap<String, String> {
        lock(&self.state)
            .ok()
            .and_then(|state| state.maps.get(map).map(|m| m.options.clone()))
            .unwrap_or_default()
    }

    /// Extent limits applied to a map document, if any.
    pub fn extent_limits(&self, map: &str) -> Option<SpatialExtent> {
        lock(&self.state)
            .ok()
            .and_then(|state| state.maps.get(map).and_then(|m| m.extent_limits))
    }
}

impl GeoEngine for MemoryEngine {
    fn open_map(&self, id: &str) -> Result<Box<dyn MapDocument>> {
        lock(&self.state)?.maps.entry(id.to_string()).or_default();
        Ok(Box::new(MemoryDocument {
            state: Arc::clone(&self.state),
            id: id.to_string(),
        }))
    }

    fn open_store(&self, name: &str) -> Result<Box<dyn FeatureStore>> {
        lock(&self.state)?
            .stores
            .entry(name.to_string())
            .or_default();
        Ok(Box::new(MemoryStore {
            state: Arc::clone(&self.state),
            name: name.to_string(),
        }))
    }

    fn create_transform(
        &self,
        source: SrCode,
        target: SrCode,
    ) -> Result<Box<dyn CoordinateTransform>> {
        for code in [source, target] {
            if !KNOWN_SR.contains(&code) {
                return Err(SessionError::UnsupportedSpatialReference(code));
            }
        }

        match (source, target) {
            (s, t) if s == t => Ok(Box::new(IdentityTransform)),
            (SR_WGS84, SR_WEB_MERCATOR) => Ok(Box::new(ForwardWebMercator)),
            (SR_WEB_MERCATOR, SR_WGS84) => Ok(Box::new(InverseWebMercator)),
            (_, t) => Err(SessionError::UnsupportedSpatialReference(t)),
        }
    }

    fn version_string(&self, component: &str) -> String {
        match component {
            "" => format!("memory-{}", env!("CARGO_PKG_VERSION")),
            _ => "builtin".to_string(),
        }
    }
}

struct MemoryDocument {
    state: Arc<Mutex<EngineState>>,
    id: String,
}

impl MemoryDocument {
    fn with_map<R>(&self, f: impl FnOnce(&mut DocumentState) -> R) -> Result<R> {
        let mut state = lock(&self.state)?;
        let map = state
            .maps
            .get_mut(&self.id)
            .ok_or_else(|| SessionError::Engine(format!("map '{}' vanished", self.id)))?;
        Ok(f(map))
    }
}

impl MapDocument for MemoryDocument {
    fn set_options(&mut self, options: &HashMap<String, String>) -> Result<()> {
        self.with_map(|map| {
            for (key, value) in options {
                map.options.insert(key.clone(), value.clone());
            }
        })
    }

    fn set_extent_limits(&mut self, extent: &SpatialExtent) -> Result<()> {
        self.with_map(|map| map.extent_limits = Some(*extent))
    }

    fn layer_count(&self) -> usize {
        self.with_map(|map| map.layers.len()).unwrap_or(0)
    }

    fn layers(&self) -> Vec<LayerRef> {
        self.with_map(|map| map.layers.clone()).unwrap_or_default()
    }

    fn add_layer(&mut self, name: &str, source: DataSourceRef) -> Result<LayerRef> {
        let layer = LayerRef {
            name: name.to_string(),
            source,
            style: serde_json::Value::Null,
        };
        self.with_map(|map| map.layers.push(layer.clone()))?;
        Ok(layer)
    }

    fn set_layer_style(&mut self, name: &str, style: &serde_json::Value) -> Result<()> {
        self.with_map(|map| {
            map.layers
                .iter_mut()
                .find(|layer| layer.name == name)
                .map(|layer| layer.style = style.clone())
        })?
        .ok_or_else(|| SessionError::Engine(format!("no layer named '{name}'")))
    }

    fn save(&mut self) -> Result<()> {
        self.with_map(|map| map.save_count += 1)
    }

    fn close(&mut self) -> Result<()> {
        // Nothing to release; persisted state stays with the engine.
        Ok(())
    }
}

struct MemoryStore {
    state: Arc<Mutex<EngineState>>,
    name: String,
}

impl FeatureStore for MemoryStore {
    fn create_feature_class(&mut self, spec: &FeatureClassSpec) -> Result<Box<dyn FeatureClass>> {
        let mut state = lock(&self.state)?;
        let store = state
            .stores
            .get_mut(&self.name)
            .ok_or_else(|| SessionError::Engine(format!("store '{}' vanished", self.name)))?;

        // Replace-empty semantics: a class left behind by an aborted
        // bootstrap never leaks records into the retry.
        store.classes.insert(
            spec.name.clone(),
            ClassState {
                spec: spec.clone(),
                features: Vec::new(),
                next_id: 1,
            },
        );
        drop(state);

        Ok(Box::new(MemoryFeatureClass {
            state: Arc::clone(&self.state),
            store: self.name.clone(),
            class: spec.name.clone(),
        }))
    }

    fn feature_class(&self, name: &str) -> Option<Box<dyn FeatureClass>> {
        let state = lock(&self.state).ok()?;
        let exists = state
            .stores
            .get(&self.name)
            .is_some_and(|store| store.classes.contains_key(name));
        drop(state);

        exists.then(|| {
            Box::new(MemoryFeatureClass {
                state: Arc::clone(&self.state),
                store: self.name.clone(),
                class: name.to_string(),
            }) as Box<dyn FeatureClass>
        })
    }
}

struct MemoryFeatureClass {
    state: Arc<Mutex<EngineState>>,
    store: String,
    class: String,
}

impl MemoryFeatureClass {
    fn with_class<R>(&self, f: impl FnOnce(&mut ClassState) -> R) -> Result<R> {
        let mut state = lock(&self.state)?;
        let class = state
            .stores
            .get_mut(&self.store)
            .and_then(|store| store.classes.get_mut(&self.class))
            .ok_or_else(|| {
                SessionError::Engine(format!(
                    "feature class '{}/{}' vanished",
                    self.store, self.class
                ))
            })?;
        Ok(f(class))
    }
}

impl FeatureClass for MemoryFeatureClass {
    fn spec(&self) -> FeatureClassSpec {
        self.with_class(|class| class.spec.clone())
            .unwrap_or_else(|_| FeatureClassSpec::points(&self.class))
    }

    fn source_ref(&self) -> DataSourceRef {
        DataSourceRef::Features {
            store: self.store.clone(),
            class: self.class.clone(),
        }
    }

    fn create_feature(&self) -> Result<Feature> {
        self.with_class(|class| {
            let fields = class
                .spec
                .fields
                .iter()
                .map(|field| match (&field.field_type, field.default.as_deref()) {
                    (FieldType::Date, Some("CURRENT_TIMESTAMP")) => FieldValue::Date(Utc::now()),
                    _ => FieldValue::Null,
                })
                .collect();
            Feature::with_fields(fields)
        })
    }

    fn insert(&mut self, feature: Feature) -> Result<FeatureId> {
        self.with_class(|class| {
            if feature.fields().len() != class.spec.fields.len() {
                return Err(SessionError::Engine(format!(
                    "feature carries {} fields, class '{}' declares {}",
                    feature.fields().len(),
                    class.spec.name,
                    class.spec.fields.len()
                )));
            }
            if class.spec.geometry_type == GeometryType::Point && feature.geometry().is_none() {
                return Err(SessionError::Engine(format!(
                    "feature for point class '{}' has no geometry",
                    class.spec.name
                )));
            }

            let id = FeatureId(class.next_id);
            class.next_id += 1;
            class.features.push((id, feature));
            Ok(id)
        })?
    }

    fn feature_count(&self) -> usize {
        self.with_class(|class| class.features.len()).unwrap_or(0)
    }
}

struct IdentityTransform;

impl CoordinateTransform for IdentityTransform {
    fn forward(&self, point: Point<f64>) -> Point<f64> {
        point
    }
}

/// Spherical Web-Mercator forward projection, EPSG:4326 to EPSG:3857.
struct ForwardWebMercator;

impl CoordinateTransform for ForwardWebMercator {
    fn forward(&self, point: Point<f64>) -> Point<f64> {
        let x = point.x().to_radians() * EARTH_RADIUS;
        let y = (PI / 4.0 + point.y().to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
        Point::new(x, y)
    }
}

struct InverseWebMercator;

impl CoordinateTransform for InverseWebMercator {
    fn forward(&self, point: Point<f64>) -> Point<f64> {
        let lng = (point.x() / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y() / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Point::new(lng, lat)
    }
}

/// A headless [`MapView`]. Starts frozen, as every view must until its
/// session finishes configuration and layer setup.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryView {
    scale: f64,
    center: Point<f64>,
    frozen: bool,
}

impl MemoryView {
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_MAP_SCALE,
            center: Point::new(0.0, 0.0),
            frozen: true,
        }
    }
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView for MemoryView {
    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn center(&self) -> Point<f64> {
        self.center
    }

    fn set_center(&mut self, center: Point<f64>) {
        self.center = center;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;

    #[test]
    fn test_documents_persist_across_opens() {
        let engine = MemoryEngine::new();
        {
            let mut document = engine.open_map("main").unwrap();
            document
                .add_layer(
                    "Points",
                    DataSourceRef::Features {
                        store: "store".to_string(),
                        class: "points".to_string(),
                    },
                )
                .unwrap();
            document.save().unwrap();
        }

        let document = engine.open_map("main").unwrap();
        assert_eq!(document.layer_count(), 1);
        assert_eq!(engine.save_count("main"), 1);
    }

    #[test]
    fn test_feature_class_replace_empty() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");

        let mut class = store.create_feature_class(&spec).unwrap();
        let mut feature = class.create_feature().unwrap();
        feature.set_geometry(Point::new(0.0, 0.0));
        class.insert(feature).unwrap();
        assert_eq!(class.feature_count(), 1);

        let class = store.create_feature_class(&spec).unwrap();
        assert_eq!(class.feature_count(), 0);
    }

    #[test]
    fn test_class_spec_round_trip() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let spec = FeatureClassSpec::points("points");

        let class = store.create_feature_class(&spec).unwrap();
        assert_eq!(class.spec(), spec);
        assert_eq!(
            class.source_ref(),
            DataSourceRef::Features {
                store: "store".to_string(),
                class: "points".to_string(),
            }
        );
    }

    #[test]
    fn test_insert_requires_geometry() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let mut class = store
            .create_feature_class(&FeatureClassSpec::points("points"))
            .unwrap();

        let feature = class.create_feature().unwrap();
        assert!(class.insert(feature).is_err());
        assert_eq!(class.feature_count(), 0);
    }

    #[test]
    fn test_date_default_fills_ingestion_time() {
        let engine = MemoryEngine::new();
        let mut store = engine.open_store("store").unwrap();
        let class = store
            .create_feature_class(&FeatureClassSpec::points("points"))
            .unwrap();

        let feature = class.create_feature().unwrap();
        assert!(matches!(feature.field(2), Some(FieldValue::Date(_))));
        assert_eq!(feature.field(0), Some(&FieldValue::Null));
    }

    #[test]
    fn test_unknown_spatial_reference() {
        let engine = MemoryEngine::new();
        match engine.create_transform(2154, SR_WEB_MERCATOR) {
            Err(SessionError::UnsupportedSpatialReference(code)) => assert_eq!(code, 2154),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected UnsupportedSpatialReference"),
        }
    }

    #[test]
    fn test_identity_transform() {
        let engine = MemoryEngine::new();
        let transform = engine.create_transform(SR_WGS84, SR_WGS84).unwrap();
        let point = Point::new(37.616667, 55.75);
        assert_eq!(transform.forward(point), point);
    }

    #[test]
    fn test_mercator_round_trip() {
        let engine = MemoryEngine::new();
        let forward = engine.create_transform(SR_WGS84, SR_WEB_MERCATOR).unwrap();
        let inverse = engine.create_transform(SR_WEB_MERCATOR, SR_WGS84).unwrap();

        let original = Point::new(-0.1275, 51.507222);
        let back = inverse.forward(forward.forward(original));
        assert!((back.x() - original.x()).abs() < 1e-9);
        assert!((back.y() - original.y()).abs() < 1e-9);
    }

    #[test]
    fn test_view_zoom_steps() {
        let mut view = MemoryView::new();
        let initial = view.scale();
        view.zoom_in();
        assert_eq!(view.scale(), initial * 2.0);
        view.zoom_out();
        assert_eq!(view.scale(), initial);
    }
}
