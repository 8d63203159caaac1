use serde::{Deserialize, Serialize};

use crate::core::constants::WEB_MERCATOR_MAX;
use crate::{Result, SessionError};

/// A fixed bounding geometry in a single projected spatial reference.
///
/// The same extent value is used both as the hard pan/zoom clamp on a map
/// document and as the coverage box of its base tile service. Clamping
/// itself is delegated to the underlying engine; this type only carries
/// the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl SpatialExtent {
    /// Creates an extent, rejecting degenerate bounds (min must be
    /// strictly below max on both axes).
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if min_x >= max_x || min_y >= max_y {
            return Err(SessionError::Configuration(format!(
                "invalid extent: ({min_x}, {min_y}) .. ({max_x}, {max_y})"
            )));
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// The full Web-Mercator world extent (EPSG:3857).
    pub const fn web_mercator_world() -> Self {
        Self {
            min_x: -WEB_MERCATOR_MAX,
            min_y: -WEB_MERCATOR_MAX,
            max_x: WEB_MERCATOR_MAX,
            max_y: WEB_MERCATOR_MAX,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
