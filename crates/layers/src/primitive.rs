use std::rc::Rc;

use chrono::NaiveDate;
use foundation::LatLng;
use serde::Serialize;
use trip::ItemRef;

use crate::layer::LayerKey;
use crate::symbology::{MarkerStyle, PolylineStyle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerRole {
    Origin,
    Destination,
    Stay,
}

/// Horizontal copy of the world a primitive is drawn in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldCopy {
    West,
    #[default]
    Home,
    East,
}

impl WorldCopy {
    pub const ALL: [WorldCopy; 3] = [WorldCopy::West, WorldCopy::Home, WorldCopy::East];

    pub fn offset_deg(self) -> f64 {
        match self {
            WorldCopy::West => -360.0,
            WorldCopy::Home => 0.0,
            WorldCopy::East => 360.0,
        }
    }
}

/// Popup content as a structured record; turning it into markup is up to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Popup {
    Route {
        transport: String,
        from: String,
        to: String,
    },
    Place {
        label: String,
    },
    Stay {
        location: String,
        date_start: NaiveDate,
        date_end: NaiveDate,
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub item: ItemRef,
    pub role: MarkerRole,
    pub position: LatLng,
    pub layer: LayerKey,
    pub copy: WorldCopy,
    pub no_wrap: bool,
    pub style: Rc<MarkerStyle>,
    pub popup: Rc<Popup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub item: ItemRef,
    pub points: Vec<LatLng>,
    pub layer: LayerKey,
    pub copy: WorldCopy,
    pub no_wrap: bool,
    pub style: Rc<PolylineStyle>,
    pub popup: Rc<Popup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Marker(Marker),
    Polyline(Polyline),
}

/// Identity of a marker within one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub item: ItemRef,
    pub role: MarkerRole,
    pub copy: WorldCopy,
}

impl std::fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:?}/{:?}", self.item, self.role, self.copy)
    }
}

impl Primitive {
    pub fn layer(&self) -> LayerKey {
        match self {
            Primitive::Marker(m) => m.layer,
            Primitive::Polyline(p) => p.layer,
        }
    }

    pub fn item(&self) -> &ItemRef {
        match self {
            Primitive::Marker(m) => &m.item,
            Primitive::Polyline(p) => &p.item,
        }
    }

    pub fn copy(&self) -> WorldCopy {
        match self {
            Primitive::Marker(m) => m.copy,
            Primitive::Polyline(p) => p.copy,
        }
    }

    pub fn no_wrap(&self) -> bool {
        match self {
            Primitive::Marker(m) => m.no_wrap,
            Primitive::Polyline(p) => p.no_wrap,
        }
    }

    pub fn marker_key(&self) -> Option<MarkerKey> {
        match self {
            Primitive::Marker(m) => Some(MarkerKey {
                item: m.item.clone(),
                role: m.role,
                copy: m.copy,
            }),
            Primitive::Polyline(_) => None,
        }
    }

    /// Every coordinate of the primitive, in order.
    pub fn positions(&self) -> &[LatLng] {
        match self {
            Primitive::Marker(m) => std::slice::from_ref(&m.position),
            Primitive::Polyline(p) => &p.points,
        }
    }

    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            Primitive::Marker(m) => Some(m),
            Primitive::Polyline(_) => None,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match self {
            Primitive::Polyline(p) => Some(p),
            Primitive::Marker(_) => None,
        }
    }
}
