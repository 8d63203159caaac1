//! Engine-wide magic numbers and option keys, kept in a single place.

/// Half-width of the Web-Mercator world extent in metres (EPSG:3857).
pub const WEB_MERCATOR_MAX: f64 = 20_037_508.34;

/// Assumed device memory when the host platform cannot report it.
pub const FALLBACK_DEVICE_MEMORY_MB: u64 = 512;

/// Below this total memory the viewport is rendered reduced.
pub const LOW_MEMORY_THRESHOLD_MB: u64 = 1024;

/// Viewport reduce factor for low-memory devices (bigger effective tiles,
/// fewer tiles, less memory load).
pub const LOW_MEMORY_REDUCE_FACTOR: f64 = 2.0;

/// Viewport reduce factor everywhere else.
pub const DEFAULT_REDUCE_FACTOR: f64 = 1.0;

/// Fixed offset applied to the scale-to-zoom-level mapping.
pub const ZOOM_INCREMENT: i32 = -1;

/// Engine option key for [`ZOOM_INCREMENT`].
pub const OPT_ZOOM_INCREMENT: &str = "ZOOM_INCREMENT";

/// Engine option key for the viewport reduce factor.
pub const OPT_VIEWPORT_REDUCE_FACTOR: &str = "VIEWPORT_REDUCE_FACTOR";

/// Map scale applied when no persisted view state exists.
pub const DEFAULT_MAP_SCALE: f64 = 0.000_001_5;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Default tile URL template for the base raster layer.
pub const OSM_URL_TEMPLATE: &str = "http://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// EPSG code of the geographic source reference (WGS84).
pub const SR_WGS84: u32 = 4326;

/// EPSG code of the projected target reference (Web Mercator).
pub const SR_WEB_MERCATOR: u32 = 3857;

/// Zoom range served by the base tile layer.
pub const BASE_LAYER_MIN_ZOOM: u8 = 0;
pub const BASE_LAYER_MAX_ZOOM: u8 = 18;

/// Zoom levels for which point feature classes generate overviews.
pub const OVERVIEW_ZOOM_LEVELS: &str = "2,3,4,5,6,7,8,9,10,11,12,13,14";
