//! Source-to-target spatial-reference transform wrapper.

use geo_types::Point;

use crate::engine::{CoordinateTransform, GeoEngine, SrCode};
use crate::Result;

/// Wraps an engine coordinate transform. Stateless once constructed; one
/// projector is reused for an entire ingestion batch so construction cost
/// is amortized.
pub struct CoordinateProjector {
    source: SrCode,
    target: SrCode,
    transform: Box<dyn CoordinateTransform>,
}

impl CoordinateProjector {
    /// Fails with `UnsupportedSpatialReference` when either SR code is
    /// unrecognized by the engine.
    pub fn new(engine: &dyn GeoEngine, source: SrCode, target: SrCode) -> Result<Self> {
        let transform = engine.create_transform(source, target)?;
        Ok(Self {
            source,
            target,
            transform,
        })
    }

    pub fn source(&self) -> SrCode {
        self.source
    }

    pub fn target(&self) -> SrCode {
        self.target
    }

    /// Pure coordinate remap; the input point is left untouched. Invalid
    /// coordinates pass through engine-defined behavior, unvalidated.
    pub fn transform(&self, point: Point<f64>) -> Point<f64> {
        self.transform.forward(point)
    }
}
