//! Value types crossing the engine seam.

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::core::constants::{OVERVIEW_ZOOM_LEVELS, TILE_SIZE};
use crate::core::geo::SpatialExtent;
use crate::prelude::HashMap;
use crate::{Result, SessionError};

/// EPSG spatial-reference code.
pub type SrCode = u32;

/// Identity assigned by a feature store on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId(pub u64);

/// Geometry kinds a feature class can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
}

/// Declared attribute field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Real,
    Date,
    Text,
}

/// One attribute column of a feature class.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    /// Engine-side default; `CURRENT_TIMESTAMP` on a date field fills the
    /// ingestion time.
    pub default: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    pub fn with_default(
        name: impl Into<String>,
        field_type: FieldType,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: Some(default.into()),
        }
    }
}

/// Attribute values carried by a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Real(f64),
    Date(DateTime<Utc>),
    Text(String),
}

/// Schema and creation options of a feature class.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClassSpec {
    pub name: String,
    pub geometry_type: GeometryType,
    pub fields: Vec<FieldDef>,
    pub options: HashMap<String, String>,
}

impl FeatureClassSpec {
    /// The point layout used by session bootstrap: raw longitude and
    /// latitude, an ingestion timestamp and a display name, with overview
    /// generation enabled for the fixed zoom-level list.
    pub fn points(name: impl Into<String>) -> Self {
        let mut options = HashMap::default();
        options.insert("CREATE_OVERVIEWS".to_string(), "ON".to_string());
        options.insert("ZOOM_LEVELS".to_string(), OVERVIEW_ZOOM_LEVELS.to_string());

        Self {
            name: name.into(),
            geometry_type: GeometryType::Point,
            fields: vec![
                FieldDef::new("long", FieldType::Real),
                FieldDef::new("lat", FieldType::Real),
                FieldDef::with_default("datetime", FieldType::Date, "CURRENT_TIMESTAMP"),
                FieldDef::new("name", FieldType::Text),
            ],
            options,
        }
    }
}

/// A feature entity between `create_feature` and `insert`. Field slots
/// match the class schema by index; the store assigns identity on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Option<Point<f64>>,
    fields: Vec<FieldValue>,
}

impl Feature {
    pub fn with_fields(fields: Vec<FieldValue>) -> Self {
        Self {
            geometry: None,
            fields,
        }
    }

    pub fn set_geometry(&mut self, point: Point<f64>) {
        self.geometry = Some(point);
    }

    pub fn geometry(&self) -> Option<Point<f64>> {
        self.geometry
    }

    pub fn set_field(&mut self, index: usize, value: FieldValue) -> Result<()> {
        match self.fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SessionError::Engine(format!(
                "field index {index} out of range ({} fields)",
                self.fields.len()
            ))),
        }
    }

    pub fn field(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }
}

/// Constructor tuple for a TMS-backed tile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileServiceSpec {
    pub name: String,
    pub url_template: String,
    pub sr_code: SrCode,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub coverage: SpatialExtent,
    pub cache_extent: SpatialExtent,
    pub tile_size: u32,
}

impl Default for TileServiceSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            url_template: String::new(),
            sr_code: crate::core::constants::SR_WEB_MERCATOR,
            min_zoom: crate::core::constants::BASE_LAYER_MIN_ZOOM,
            max_zoom: crate::core::constants::BASE_LAYER_MAX_ZOOM,
            coverage: SpatialExtent::web_mercator_world(),
            cache_extent: SpatialExtent::web_mercator_world(),
            tile_size: TILE_SIZE,
        }
    }
}

/// What a composed layer renders from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceRef {
    Features { store: String, class: String },
    Tiles(TileServiceSpec),
}

/// One composed layer. Owned by the session for the session's lifetime
/// and destroyed with the map document.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRef {
    pub name: String,
    pub source: DataSourceRef,
    /// Opaque style payload; not interpreted by this crate.
    pub style: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_spec_layout() {
        let spec = FeatureClassSpec::points("points");
        assert_eq!(spec.geometry_type, GeometryType::Point);
        assert_eq!(spec.fields.len(), 4);
        assert_eq!(spec.fields[0].name, "long");
        assert_eq!(spec.fields[1].name, "lat");
        assert_eq!(spec.fields[2].default.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(spec.fields[3].field_type, FieldType::Text);
        assert_eq!(spec.options.get("CREATE_OVERVIEWS").map(String::as_str), Some("ON"));
    }

    #[test]
    fn test_feature_field_assignment() {
        let mut feature = Feature::with_fields(vec![FieldValue::Null, FieldValue::Null]);
        assert!(feature.set_field(1, FieldValue::Real(55.75)).is_ok());
        assert_eq!(feature.field(1), Some(&FieldValue::Real(55.75)));
        assert!(feature.set_field(2, FieldValue::Null).is_err());
    }

    #[test]
    fn test_feature_geometry() {
        let mut feature = Feature::with_fields(Vec::new());
        assert!(feature.geometry().is_none());
        feature.set_geometry(Point::new(1.0, 2.0));
        assert_eq!(feature.geometry(), Some(Point::new(1.0, 2.0)));
    }
}
