//! View scale and center, round-tripped through the host's save/restore
//! mechanism.

use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_MAP_SCALE;

/// Snapshot of a bound view's scale and center.
///
/// Mutated continuously by user interaction on the view side; the session
/// only captures it on save and reapplies it on restore. Defaults cover
/// the first run and state loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub scale: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl ViewState {
    pub fn new(scale: f64, center: Point<f64>) -> Self {
        Self {
            scale,
            center_x: center.x(),
            center_y: center.y(),
        }
    }

    pub fn center(&self) -> Point<f64> {
        Point::new(self.center_x, self.center_y)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: DEFAULT_MAP_SCALE,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}
