//! # mapsession
//!
//! Adaptive map session orchestration over a pluggable geospatial engine.
//!
//! The crate derives a memory-aware map configuration from device
//! constraints, bootstraps a map's layer set exactly once, ingests point
//! features through a coordinate-transform pipeline into a spatial store,
//! and persists view state across the session lifecycle. The geospatial
//! engine itself (feature storage, tile rendering, reprojection math) is
//! consumed through the trait seams in [`engine`].

pub mod core;
pub mod engine;
pub mod ingest;
pub mod prelude;
pub mod session;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{geo::SpatialExtent, memory::MemoryProfile, view_state::ViewState};

pub use crate::engine::{
    CoordinateTransform, DataSourceRef, FeatureClass, FeatureStore, GeoEngine, LayerRef,
    MapDocument, MapView, TileServiceSpec,
};

pub use crate::ingest::{CoordinateProjector, FeatureIngestor, FeatureRecord};

pub use crate::session::{
    registry::{OpenOutcome, SessionRegistry},
    MapSession, SessionOptions, SessionState,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, SessionError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("unsupported spatial reference: EPSG:{0}")]
    UnsupportedSpatialReference(u32),

    #[error("ingestion failed at record {index} ({name}): {reason}")]
    Ingestion {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("session is not configured")]
    NotConfigured,

    #[error("no view is bound to the session")]
    ViewNotBound,

    #[error("engine error: {0}")]
    Engine(String),
}

/// Error type alias for convenience
pub type Error = SessionError;
