//! Map session lifecycle orchestration.

pub mod registry;

use crate::core::constants::{
    BASE_LAYER_MAX_ZOOM, BASE_LAYER_MIN_ZOOM, OSM_URL_TEMPLATE, SR_WEB_MERCATOR, SR_WGS84,
    TILE_SIZE,
};
use crate::core::geo::SpatialExtent;
use crate::core::memory::MemoryProfile;
use crate::core::view_state::ViewState;
use crate::engine::{
    DataSourceRef, FeatureClassSpec, GeoEngine, LayerRef, MapDocument, MapView, SrCode,
    TileServiceSpec,
};
use crate::ingest::{CoordinateProjector, FeatureIngestor, FeatureRecord};
use crate::{Result, SessionError};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// Memory profile options and extent limits are applied.
    Configured,
    /// This session created and seeded the layer set.
    Bootstrapped,
    /// An existing layer set was adopted; no ingestion ran.
    Loaded,
    /// A renderable view is bound and rendering is un-frozen.
    Active,
    Closed,
}

/// Base raster layer parameters; the coverage extents come from the
/// session itself so they can never drift from the pan/zoom clamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayerOptions {
    pub layer_name: String,
    pub service_name: String,
    pub url_template: String,
    pub sr_code: SrCode,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tile_size: u32,
}

impl Default for BaseLayerOptions {
    fn default() -> Self {
        Self {
            layer_name: "OSM".to_string(),
            service_name: "osm.wconn".to_string(),
            url_template: OSM_URL_TEMPLATE.to_string(),
            sr_code: SR_WEB_MERCATOR,
            min_zoom: BASE_LAYER_MIN_ZOOM,
            max_zoom: BASE_LAYER_MAX_ZOOM,
            tile_size: TILE_SIZE,
        }
    }
}

/// Everything configurable about a session start.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Total device memory as reported by the host; `None` when the
    /// platform cannot report it.
    pub memory_hint_mb: Option<u64>,
    pub extent: SpatialExtent,
    pub store_name: String,
    pub points_spec: FeatureClassSpec,
    pub points_layer_name: String,
    /// Opaque style payload handed to the points layer (color, symbol
    /// size, symbol shape); not interpreted here.
    pub points_style: serde_json::Value,
    pub seed: Vec<FeatureRecord>,
    pub source_sr: SrCode,
    pub base_layer: BaseLayerOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            memory_hint_mb: None,
            extent: SpatialExtent::web_mercator_world(),
            store_name: "store".to_string(),
            points_spec: FeatureClassSpec::points("points"),
            points_layer_name: "Points".to_string(),
            points_style: default_points_style(),
            seed: Vec::new(),
            source_sr: SR_WGS84,
            base_layer: BaseLayerOptions::default(),
        }
    }
}

impl SessionOptions {
    /// Demo preset seeded with the four-capital sample set.
    pub fn with_sample_cities() -> Self {
        Self {
            seed: FeatureRecord::sample_cities(),
            ..Self::default()
        }
    }

    pub fn with_memory_hint(mut self, memory_mb: u64) -> Self {
        self.memory_hint_mb = Some(memory_mb);
        self
    }
}

fn default_points_style() -> serde_json::Value {
    // Star symbol in the engine's marker set.
    serde_json::json!({ "color": "#00be78", "size": 8.0, "type": 6 })
}

/// Aggregate root owning a map's lifetime: applies the memory profile
/// and extent limits, bootstraps the layer set exactly once, and carries
/// view state across the session lifecycle.
pub struct MapSession {
    id: String,
    document: Box<dyn MapDocument>,
    options: SessionOptions,
    profile: MemoryProfile,
    extent: SpatialExtent,
    layers: Vec<LayerRef>,
    state: SessionState,
    view: Option<Box<dyn MapView>>,
}

impl MapSession {
    /// Opens the map document for `id` without configuring anything yet.
    pub fn open(engine: &dyn GeoEngine, id: &str, options: SessionOptions) -> Result<Self> {
        let document = engine.open_map(id)?;
        Ok(Self {
            id: id.to_string(),
            document,
            profile: MemoryProfile::compute(options.memory_hint_mb),
            extent: options.extent,
            options,
            layers: Vec::new(),
            state: SessionState::Uninitialized,
            view: None,
        })
    }

    /// The full start sequence: open, configure, bootstrap-or-load.
    pub fn start(engine: &dyn GeoEngine, id: &str, options: SessionOptions) -> Result<Self> {
        let mut session = Self::open(engine, id, options)?;
        session.configure()?;
        session.initialize_layers(engine)?;
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &MemoryProfile {
        &self.profile
    }

    pub fn extent(&self) -> &SpatialExtent {
        &self.extent
    }

    pub fn layers(&self) -> &[LayerRef] {
        &self.layers
    }

    pub fn view(&self) -> Option<&dyn MapView> {
        self.view.as_deref()
    }

    /// Mutable access to the bound view, for hosts wiring gestures and
    /// zoom controls through the session.
    pub fn view_mut(&mut self) -> Result<&mut (dyn MapView + 'static)> {
        self.view.as_deref_mut().ok_or(SessionError::ViewNotBound)
    }

    /// Applies the memory-profile options and the extent pan/zoom limits
    /// to the map document. Runs at every session start, regardless of
    /// whether the map already has layers.
    pub fn configure(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(SessionError::NotConfigured);
        }

        self.document
            .set_options(&self.profile.to_options())
            .map_err(|e| SessionError::Configuration(e.to_string()))?;
        self.document
            .set_extent_limits(&self.extent)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        self.state = SessionState::Configured;
        log::debug!(
            "session '{}' configured, reduce factor {}",
            self.id,
            self.profile.reduce_factor
        );
        Ok(())
    }

    /// Bootstraps the layer set iff the map has none, otherwise adopts
    /// the existing layers. The emptiness check and the bootstrap form
    /// one logical step: nothing marks the map populated until the
    /// document is persisted at the end of the bootstrap.
    pub fn initialize_layers(&mut self, engine: &dyn GeoEngine) -> Result<()> {
        if self.state != SessionState::Configured {
            return Err(SessionError::NotConfigured);
        }

        if self.document.layer_count() == 0 {
            self.bootstrap(engine)?;
            self.state = SessionState::Bootstrapped;
        } else {
            self.layers = self.document.layers();
            self.state = SessionState::Loaded;
            log::debug!(
                "session '{}' loaded {} existing layers",
                self.id,
                self.layers.len()
            );
        }
        Ok(())
    }

    fn bootstrap(&mut self, engine: &dyn GeoEngine) -> Result<()> {
        let mut store = engine.open_store(&self.options.store_name)?;
        let projector = CoordinateProjector::new(
            engine,
            self.options.source_sr,
            self.options.base_layer.sr_code,
        )?;
        let count = FeatureIngestor::ingest(
            store.as_mut(),
            &self.options.points_spec,
            &self.options.seed,
            &projector,
        )?;

        let class = store
            .feature_class(&self.options.points_spec.name)
            .ok_or_else(|| {
                SessionError::Engine(format!(
                    "feature class '{}' missing after ingestion",
                    self.options.points_spec.name
                ))
            })?;

        let mut points_layer = self
            .document
            .add_layer(&self.options.points_layer_name, class.source_ref())?;
        self.document
            .set_layer_style(&points_layer.name, &self.options.points_style)?;
        points_layer.style = self.options.points_style.clone();

        let base_layer = self.document.add_layer(
            &self.options.base_layer.layer_name,
            DataSourceRef::Tiles(self.base_tile_spec()),
        )?;

        self.layers = vec![points_layer, base_layer];
        self.document.save()?;
        log::info!(
            "session '{}' bootstrapped: {} features, {} layers",
            self.id,
            count,
            self.layers.len()
        );
        Ok(())
    }

    /// Both extent slots reference the session's own extent value, so the
    /// pan clamp and the tile coverage cannot drift apart.
    fn base_tile_spec(&self) -> TileServiceSpec {
        let base = &self.options.base_layer;
        TileServiceSpec {
            name: base.service_name.clone(),
            url_template: base.url_template.clone(),
            sr_code: base.sr_code,
            min_zoom: base.min_zoom,
            max_zoom: base.max_zoom,
            coverage: self.extent,
            cache_extent: self.extent,
            tile_size: base.tile_size,
        }
    }

    /// Binds the renderable view and un-freezes rendering. Exactly one
    /// view is bound at a time; a previous binding is handed back to the
    /// caller.
    pub fn bind_view(&mut self, mut view: Box<dyn MapView>) -> Result<Option<Box<dyn MapView>>> {
        match self.state {
            SessionState::Bootstrapped | SessionState::Loaded | SessionState::Active => {}
            _ => return Err(SessionError::NotConfigured),
        }

        view.set_frozen(false);
        let previous = self.view.replace(view);
        self.state = SessionState::Active;
        Ok(previous)
    }

    /// Releases the current view binding, if any.
    pub fn unbind_view(&mut self) -> Option<Box<dyn MapView>> {
        self.view.take()
    }

    /// Snapshot of the bound view's scale and center. `None` when no
    /// view is bound; prior persisted state is left untouched.
    pub fn save_state(&self) -> Option<ViewState> {
        let view = self.view.as_deref()?;
        Some(ViewState::new(view.scale(), view.center()))
    }

    /// Applies persisted view state, scale before center, so the view
    /// never shows a visible jump once it becomes interactive. Silently
    /// skipped when no view is bound.
    pub fn restore_state(&mut self, state: &ViewState) {
        match self.view.as_deref_mut() {
            Some(view) => {
                view.set_scale(state.scale);
                view.set_center(state.center());
            }
            None => log::warn!(
                "session '{}': view-state restore skipped, no view bound",
                self.id
            ),
        }
    }

    /// The feature-class source behind the points layer, when the layer
    /// list has one. Each lookup step propagates absence explicitly; a
    /// missing layer or a tile-backed first layer is a clean `None`.
    pub fn points_source(&self) -> Option<&DataSourceRef> {
        let layer = self.layers.first()?;
        match &layer.source {
            source @ DataSourceRef::Features { .. } => Some(source),
            DataSourceRef::Tiles(_) => None,
        }
    }

    /// Persists the map document, then releases the underlying handle.
    /// Runs even when nothing was ever added (the save is idempotent).
    /// A second close is a no-op; closing a session that was never
    /// configured is a programming error.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Uninitialized => return Err(SessionError::NotConfigured),
            _ => {}
        }

        self.view = None;
        self.document.save()?;
        self.document.close()?;
        self.state = SessionState::Closed;
        log::info!("session '{}' closed", self.id);
        Ok(())
    }
}
