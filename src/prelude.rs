//! Prelude module for common mapsession types and traits
//!
//! Re-exports the most commonly used types, traits, and functions for
//! easy importing with `use mapsession::prelude::*;`

pub use crate::core::{
    constants, geo::SpatialExtent, memory::MemoryProfile, view_state::ViewState,
};

pub use crate::engine::{
    CoordinateTransform, DataSourceRef, Feature, FeatureClass, FeatureClassSpec, FeatureId,
    FeatureStore, FieldDef, FieldType, FieldValue, GeoEngine, GeometryType, LayerRef, MapDocument,
    MapView, SrCode, TileServiceSpec,
};

pub use crate::ingest::{CoordinateProjector, FeatureIngestor, FeatureRecord};

pub use crate::session::{
    registry::{OpenOutcome, SessionRegistry},
    BaseLayerOptions, MapSession, SessionOptions, SessionState,
};

pub use crate::{Error, Result, SessionError};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
