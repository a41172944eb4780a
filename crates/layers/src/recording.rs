use std::collections::BTreeSet;

use foundation::{GeoBounds, LatLng};
use serde::Serialize;

use crate::host::{FitOptions, GroupHandle, HostError, HostMap};
use crate::primitive::Primitive;

pub const DEFAULT_VIEWPORT_PX: [f64; 2] = [1024.0, 768.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppliedView {
    SetView { center: LatLng, zoom: u8 },
    FitBounds { bounds: GeoBounds, options: FitOptions },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

/// Value copy of everything the recording host currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    /// Attached groups in draw order.
    pub groups: Vec<GroupSnapshot>,
    pub view: Option<AppliedView>,
    pub invalidations: u64,
}

impl MapSnapshot {
    pub fn group(&self, name: &str) -> Option<&GroupSnapshot> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn primitive_count(&self) -> usize {
        self.groups.iter().map(|g| g.primitives.len()).sum()
    }
}

#[derive(Debug)]
struct RecordedGroup {
    handle: GroupHandle,
    name: String,
    primitives: Vec<Primitive>,
}

/// In-memory [`HostMap`] that records what it is asked to draw.
///
/// Used by tests and the CLI. Failures can be injected per group name, and
/// [`RecordingMap::detach`] simulates the map container being torn down.
#[derive(Debug)]
pub struct RecordingMap {
    next_handle: u64,
    groups: Vec<RecordedGroup>,
    view: Option<AppliedView>,
    viewport_px: Option<[f64; 2]>,
    available: bool,
    invalidations: u64,
    fail_clear: BTreeSet<String>,
    fail_remove: BTreeSet<String>,
    fail_add: BTreeSet<String>,
}

impl Default for RecordingMap {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingMap {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            groups: Vec::new(),
            view: None,
            viewport_px: Some(DEFAULT_VIEWPORT_PX),
            available: true,
            invalidations: 0,
            fail_clear: BTreeSet::new(),
            fail_remove: BTreeSet::new(),
            fail_add: BTreeSet::new(),
        }
    }

    pub fn with_viewport(mut self, width_px: f64, height_px: f64) -> Self {
        self.viewport_px = Some([width_px, height_px]);
        self
    }

    pub fn set_viewport(&mut self, viewport_px: Option<[f64; 2]>) {
        self.viewport_px = viewport_px;
    }

    /// Container torn down: every later call fails with [`HostError::Unavailable`].
    pub fn detach(&mut self) {
        self.available = false;
    }

    pub fn reattach(&mut self) {
        self.available = true;
    }

    /// Drops a group behind the engine's back, as a host re-layout might.
    pub fn drop_group_named(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        self.groups.len() != before
    }

    pub fn fail_clear_on(&mut self, name: &str, fail: bool) {
        toggle(&mut self.fail_clear, name, fail);
    }

    pub fn fail_remove_on(&mut self, name: &str, fail: bool) {
        toggle(&mut self.fail_remove, name, fail);
    }

    pub fn fail_add_on(&mut self, name: &str, fail: bool) {
        toggle(&mut self.fail_add, name, fail);
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn group(&self, name: &str) -> Option<&[Primitive]> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.primitives.as_slice())
    }

    pub fn primitive_count(&self) -> usize {
        self.groups.iter().map(|g| g.primitives.len()).sum()
    }

    pub fn view(&self) -> Option<&AppliedView> {
        self.view.as_ref()
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            groups: self
                .groups
                .iter()
                .map(|g| GroupSnapshot {
                    name: g.name.clone(),
                    primitives: g.primitives.clone(),
                })
                .collect(),
            view: self.view.clone(),
            invalidations: self.invalidations,
        }
    }

    fn ensure_available(&self) -> Result<(), HostError> {
        if self.available {
            Ok(())
        } else {
            Err(HostError::Unavailable)
        }
    }

    fn find_mut(&mut self, handle: GroupHandle) -> Result<&mut RecordedGroup, HostError> {
        self.groups
            .iter_mut()
            .find(|g| g.handle == handle)
            .ok_or(HostError::GroupMissing(handle))
    }
}

fn toggle(set: &mut BTreeSet<String>, name: &str, on: bool) {
    if on {
        set.insert(name.to_string());
    } else {
        set.remove(name);
    }
}

impl HostMap for RecordingMap {
    fn is_available(&self) -> bool {
        self.available
    }

    fn viewport_size_px(&self) -> Option<[f64; 2]> {
        self.viewport_px
    }

    fn create_group(&mut self, name: &str) -> Result<GroupHandle, HostError> {
        self.ensure_available()?;
        let handle = GroupHandle(self.next_handle);
        self.next_handle += 1;
        self.groups.push(RecordedGroup {
            handle,
            name: name.to_string(),
            primitives: Vec::new(),
        });
        Ok(handle)
    }

    fn has_group(&self, group: GroupHandle) -> bool {
        self.available && self.groups.iter().any(|g| g.handle == group)
    }

    fn add_to_group(&mut self, group: GroupHandle, primitive: Primitive) -> Result<(), HostError> {
        self.ensure_available()?;
        let fail_add = &self.fail_add;
        let g = self
            .groups
            .iter_mut()
            .find(|g| g.handle == group)
            .ok_or(HostError::GroupMissing(group))?;
        if fail_add.contains(&g.name) {
            return Err(HostError::Rejected(format!("add to {}", g.name)));
        }
        g.primitives.push(primitive);
        Ok(())
    }

    fn clear_group(&mut self, group: GroupHandle) -> Result<(), HostError> {
        self.ensure_available()?;
        let fail = self
            .groups
            .iter()
            .find(|g| g.handle == group)
            .is_some_and(|g| self.fail_clear.contains(&g.name));
        let g = self.find_mut(group)?;
        if fail {
            return Err(HostError::Rejected(format!("clear {}", g.name)));
        }
        g.primitives.clear();
        Ok(())
    }

    fn remove_group(&mut self, group: GroupHandle) -> Result<(), HostError> {
        self.ensure_available()?;
        let Some(pos) = self.groups.iter().position(|g| g.handle == group) else {
            return Err(HostError::GroupMissing(group));
        };
        if self.fail_remove.contains(&self.groups[pos].name) {
            return Err(HostError::Rejected(format!("remove {}", self.groups[pos].name)));
        }
        self.groups.remove(pos);
        Ok(())
    }

    fn bring_to_front(&mut self, group: GroupHandle) -> Result<(), HostError> {
        self.ensure_available()?;
        let Some(pos) = self.groups.iter().position(|g| g.handle == group) else {
            return Err(HostError::GroupMissing(group));
        };
        let g = self.groups.remove(pos);
        self.groups.push(g);
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) -> Result<(), HostError> {
        self.ensure_available()?;
        self.view = Some(AppliedView::SetView { center, zoom });
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, options: FitOptions) -> Result<(), HostError> {
        self.ensure_available()?;
        self.view = Some(AppliedView::FitBounds { bounds, options });
        Ok(())
    }

    fn invalidate_size(&mut self) {
        if self.available {
            self.invalidations += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_draw_in_creation_order_until_brought_forward() {
        let mut map = RecordingMap::new();
        let a = map.create_group("a").expect("create");
        let _b = map.create_group("b").expect("create");
        assert_eq!(map.group_names(), vec!["a", "b"]);
        map.bring_to_front(a).expect("raise");
        assert_eq!(map.group_names(), vec!["b", "a"]);
    }

    #[test]
    fn detached_map_rejects_everything() {
        let mut map = RecordingMap::new();
        let a = map.create_group("a").expect("create");
        map.detach();
        assert!(!map.has_group(a));
        assert_eq!(map.clear_group(a), Err(HostError::Unavailable));
        assert_eq!(map.set_view(LatLng::new(0.0, 0.0), 2), Err(HostError::Unavailable));
        map.invalidate_size();
        assert_eq!(map.invalidations(), 0);
    }

    #[test]
    fn injected_clear_failure_keeps_contents() {
        let mut map = RecordingMap::new();
        let a = map.create_group("a").expect("create");
        map.fail_clear_on("a", true);
        assert!(matches!(map.clear_group(a), Err(HostError::Rejected(_))));
        map.fail_clear_on("a", false);
        assert_eq!(map.clear_group(a), Ok(()));
    }

    #[test]
    fn snapshot_serializes() {
        let mut map = RecordingMap::new();
        map.create_group("flights").expect("create");
        map.set_view(LatLng::new(30.0, 0.0), 2).expect("view");
        let json = serde_json::to_string(&map.snapshot()).expect("serialize");
        assert!(json.contains("\"set_view\""));
        assert!(json.contains("\"flights\""));
    }
}
