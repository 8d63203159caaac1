//! Contracts consumed from the underlying geospatial engine.
//!
//! The session core never touches feature storage, tile rendering or
//! reprojection math directly; it drives these trait objects and leaves
//! their semantics to the engine behind them. [`memory`] provides a
//! complete in-process implementation for demos and tests.

pub mod memory;
mod types;

pub use types::{
    DataSourceRef, Feature, FeatureClassSpec, FeatureId, FieldDef, FieldType, FieldValue,
    GeometryType, LayerRef, SrCode, TileServiceSpec,
};

use geo_types::Point;

use crate::core::geo::SpatialExtent;
use crate::prelude::HashMap;
use crate::Result;

/// Factory surface of the engine: map documents, feature stores and
/// coordinate transforms are all obtained here.
pub trait GeoEngine {
    /// Opens (or creates) the map document for a logical map identifier.
    fn open_map(&self, id: &str) -> Result<Box<dyn MapDocument>>;

    /// Opens (or creates) a named feature store.
    fn open_store(&self, name: &str) -> Result<Box<dyn FeatureStore>>;

    /// Builds a source-to-target coordinate transform. Fails with
    /// `UnsupportedSpatialReference` for SR codes the engine does not
    /// recognize.
    fn create_transform(&self, source: SrCode, target: SrCode)
        -> Result<Box<dyn CoordinateTransform>>;

    /// Version of an engine component (`"gdal"`, `"proj"`, ...); the
    /// engine's own version for the empty string.
    fn version_string(&self, component: &str) -> String;
}

/// The top-level container owning a map's layer list and persisted
/// configuration.
pub trait MapDocument {
    fn set_options(&mut self, options: &HashMap<String, String>) -> Result<()>;

    fn set_extent_limits(&mut self, extent: &SpatialExtent) -> Result<()>;

    fn layer_count(&self) -> usize;

    fn layers(&self) -> Vec<LayerRef>;

    fn add_layer(&mut self, name: &str, source: DataSourceRef) -> Result<LayerRef>;

    fn set_layer_style(&mut self, name: &str, style: &serde_json::Value) -> Result<()>;

    /// Persists the document. Idempotent; saving an unchanged document is
    /// a cheap no-op on the engine side.
    fn save(&mut self) -> Result<()>;

    /// Releases the underlying handle.
    fn close(&mut self) -> Result<()>;
}

/// A persistent container of feature classes.
pub trait FeatureStore {
    /// Creates the named feature class with the given schema. An existing
    /// class of the same name is replaced empty, so a retried bootstrap
    /// never inherits half-ingested records.
    fn create_feature_class(&mut self, spec: &FeatureClassSpec) -> Result<Box<dyn FeatureClass>>;

    fn feature_class(&self, name: &str) -> Option<Box<dyn FeatureClass>>;
}

/// A named, schema'd collection of features sharing one geometry type.
pub trait FeatureClass {
    fn spec(&self) -> FeatureClassSpec;

    /// Source handle a layer can render this class from.
    fn source_ref(&self) -> DataSourceRef;

    /// Builds a feature with schema defaults pre-filled.
    fn create_feature(&self) -> Result<Feature>;

    /// Persists the feature; identity is assigned here, not by callers.
    fn insert(&mut self, feature: Feature) -> Result<FeatureId>;

    fn feature_count(&self) -> usize;
}

/// A source-to-target coordinate remap.
pub trait CoordinateTransform {
    /// Pure remap; must not mutate its input. Out-of-range coordinates
    /// pass through engine-defined behavior, unvalidated here.
    fn forward(&self, point: Point<f64>) -> Point<f64>;
}

/// The renderable surface the host binds to a session. The view's
/// lifetime belongs to the host; a session only borrows it for the
/// duration of the binding.
pub trait MapView {
    fn scale(&self) -> f64;

    fn set_scale(&mut self, scale: f64);

    fn center(&self) -> Point<f64>;

    fn set_center(&mut self, center: Point<f64>);

    fn is_frozen(&self) -> bool;

    /// Rendering and interaction stay frozen from session creation until
    /// configuration and layer setup have completed.
    fn set_frozen(&mut self, frozen: bool);

    fn zoom_in(&mut self) {
        let scale = self.scale();
        self.set_scale(scale * 2.0);
    }

    fn zoom_out(&mut self) {
        let scale = self.scale();
        self.set_scale(scale / 2.0);
    }
}

/// Assembles the component report shown by the host's info surface.
pub fn version_report(engine: &dyn GeoEngine) -> String {
    const COMPONENTS: [&str; 5] = ["gdal", "geos", "proj", "sqlite", "tiff"];

    let mut report = format!("engine: {}", engine.version_string(""));
    for component in COMPONENTS {
        report.push_str(&format!(
            "\n{}: {}",
            component,
            engine.version_string(component)
        ));
    }
    report
}
