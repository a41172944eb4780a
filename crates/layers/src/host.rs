use foundation::{GeoBounds, LatLng};
use serde::Serialize;

use crate::primitive::Primitive;

/// Opaque id of a layer group living on the host map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FitOptions {
    pub padding_px: [f64; 2],
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The map (or its container) is gone.
    Unavailable,
    GroupMissing(GroupHandle),
    Rejected(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Unavailable => write!(f, "host map unavailable"),
            HostError::GroupMissing(h) => write!(f, "layer group {} not on map", h.0),
            HostError::Rejected(msg) => write!(f, "host map rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// What the engine needs from a slippy-map library.
///
/// The host owns tiles, pan/zoom and hit-testing. It must support panning
/// past ±180° with several world copies visible, and must leave primitives
/// flagged `no_wrap` at the longitudes they were given. Groups draw in
/// creation order unless moved with [`HostMap::bring_to_front`].
pub trait HostMap {
    fn is_available(&self) -> bool;

    /// Current viewport size in pixels, if laid out.
    fn viewport_size_px(&self) -> Option<[f64; 2]>;

    fn create_group(&mut self, name: &str) -> Result<GroupHandle, HostError>;
    fn has_group(&self, group: GroupHandle) -> bool;
    fn add_to_group(&mut self, group: GroupHandle, primitive: Primitive) -> Result<(), HostError>;
    fn clear_group(&mut self, group: GroupHandle) -> Result<(), HostError>;
    fn remove_group(&mut self, group: GroupHandle) -> Result<(), HostError>;
    fn bring_to_front(&mut self, group: GroupHandle) -> Result<(), HostError>;

    fn set_view(&mut self, center: LatLng, zoom: u8) -> Result<(), HostError>;
    fn fit_bounds(&mut self, bounds: GeoBounds, options: FitOptions) -> Result<(), HostError>;

    /// Ask the host to re-measure its container. Fire and forget.
    fn invalidate_size(&mut self);
}
