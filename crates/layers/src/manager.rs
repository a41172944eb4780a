use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::host::{GroupHandle, HostError, HostMap};
use crate::layer::LayerKey;
use crate::primitive::{MarkerKey, Primitive};
use crate::wrap::replicate;

#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// A host call on one group failed; the group has been dropped.
    Host { key: LayerKey, source: HostError },
    GroupMissing(LayerKey),
    DuplicateMarker(MarkerKey),
}

impl LayerError {
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LayerError::Host {
                source: HostError::Unavailable,
                ..
            }
        )
    }
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::Host { key, source } => write!(f, "layer group {key}: {source}"),
            LayerError::GroupMissing(key) => write!(f, "layer group {key} is not attached"),
            LayerError::DuplicateMarker(k) => write!(f, "duplicate marker {k}"),
        }
    }
}

impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayerError::Host { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Owns the seven layer groups on a host map.
///
/// Groups are created in [`LayerKey::ALL`] order so the host's draw order
/// matches it. A group whose clear/attach fails is dropped and recreated by
/// the next [`LayerManager::ensure_groups`]. A dropped group the host
/// refused to remove is kept aside and removal is retried on every
/// `ensure_groups` until it succeeds.
#[derive(Debug, Default)]
pub struct LayerManager {
    groups: BTreeMap<LayerKey, GroupHandle>,
    stale: Vec<(LayerKey, GroupHandle)>,
    markers: HashSet<MarkerKey>,
    counts: BTreeMap<LayerKey, usize>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a handle is held for every layer key.
    pub fn is_initialized(&self) -> bool {
        LayerKey::ALL.iter().all(|k| self.groups.contains_key(k))
    }

    pub fn group(&self, key: LayerKey) -> Option<GroupHandle> {
        self.groups.get(&key).copied()
    }

    /// Primitives added per group since the last clear, replicas included.
    pub fn counts(&self) -> &BTreeMap<LayerKey, usize> {
        &self.counts
    }

    /// Attaches all groups. On re-init, existing groups are cleared and reused.
    pub fn initialize<M: HostMap>(&mut self, host: &mut M) -> Result<(), LayerError> {
        if !self.groups.is_empty() {
            self.clear_all(host);
        }
        self.ensure_groups(host).map(|_| ())
    }

    /// Recreates any group the host no longer has. Returns how many were made.
    ///
    /// When anything was recreated, every group is raised again in key order
    /// so `active` stays on top.
    pub fn ensure_groups<M: HostMap>(&mut self, host: &mut M) -> Result<usize, LayerError> {
        self.sweep_stale(host);
        let mut created = 0;
        for key in LayerKey::ALL {
            let present = self.groups.get(&key).is_some_and(|h| host.has_group(*h));
            if present {
                continue;
            }
            let handle = host
                .create_group(key.name())
                .map_err(|source| LayerError::Host { key, source })?;
            self.groups.insert(key, handle);
            created += 1;
        }

        if created > 0 && created < LayerKey::ALL.len() {
            for (key, handle) in &self.groups {
                host.bring_to_front(*handle)
                    .map_err(|source| LayerError::Host { key: *key, source })?;
            }
        }
        Ok(created)
    }

    /// Empties every group, keeping the groups themselves.
    ///
    /// A failure on one group never stops the others. Failed groups are
    /// dropped; the returned errors say which.
    pub fn clear_all<M: HostMap>(&mut self, host: &mut M) -> Vec<LayerError> {
        let mut faults = Vec::new();
        let mut dropped = Vec::new();
        for (key, handle) in &self.groups {
            if let Err(err) = host.clear_group(*handle) {
                warn!(category = "layer_clear", layer = %key, error = %err, "failed to clear layer group");
                dropped.push(*key);
                faults.push(LayerError::Host {
                    key: *key,
                    source: err,
                });
            }
        }
        for key in dropped {
            self.drop_group(host, key);
        }
        self.markers.clear();
        self.counts.clear();
        faults
    }

    /// Adds the west, home and east replicas of `primitive` to its group.
    pub fn add<M: HostMap>(&mut self, host: &mut M, primitive: &Primitive) -> Result<(), LayerError> {
        let key = primitive.layer();
        let handle = self.group(key).ok_or(LayerError::GroupMissing(key))?;

        for replica in replicate(primitive) {
            if let Some(marker) = replica.marker_key() {
                if self.markers.contains(&marker) {
                    return Err(LayerError::DuplicateMarker(marker));
                }
                self.markers.insert(marker);
            }
            if let Err(err) = host.add_to_group(handle, replica) {
                warn!(category = "layer_attach", layer = %key, error = %err, "failed to add primitive");
                if err != HostError::Unavailable {
                    self.drop_group(host, key);
                }
                return Err(LayerError::Host { key, source: err });
            }
            *self.counts.entry(key).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Groups dropped earlier whose removal the host has refused so far.
    pub fn stale_count(&self) -> usize {
        self.stale.len()
    }

    /// Detaches every group from the host and forgets them.
    pub fn dispose<M: HostMap>(&mut self, host: &mut M) -> Vec<LayerError> {
        let mut faults = Vec::new();
        for (key, handle) in std::mem::take(&mut self.stale) {
            if let Err(err) = host.remove_group(handle) {
                warn!(category = "layer_remove", layer = %key, error = %err, "failed to remove stale layer group");
                faults.push(LayerError::Host { key, source: err });
            }
        }
        for (key, handle) in std::mem::take(&mut self.groups) {
            if let Err(err) = host.clear_group(handle) {
                warn!(category = "layer_clear", layer = %key, error = %err, "failed to clear layer group");
                faults.push(LayerError::Host { key, source: err });
            }
            if let Err(err) = host.remove_group(handle) {
                warn!(category = "layer_remove", layer = %key, error = %err, "failed to remove layer group");
                faults.push(LayerError::Host { key, source: err });
            }
        }
        self.markers.clear();
        self.counts.clear();
        faults
    }

    /// Forgets the handle without touching the host. Used when the host is gone.
    pub fn forget(&mut self) {
        self.groups.clear();
        self.stale.clear();
        self.markers.clear();
        self.counts.clear();
    }

    fn drop_group<M: HostMap>(&mut self, host: &mut M, key: LayerKey) {
        let Some(handle) = self.groups.remove(&key) else {
            return;
        };
        if let Err(err) = host.remove_group(handle) {
            warn!(category = "layer_remove", layer = %key, error = %err, "failed to remove faulted layer group");
            self.stale.push((key, handle));
        }
    }

    fn sweep_stale<M: HostMap>(&mut self, host: &mut M) {
        if self.stale.is_empty() || !host.is_available() {
            return;
        }
        self.stale.retain(|&(key, handle)| {
            if !host.has_group(handle) {
                return false;
            }
            match host.remove_group(handle) {
                Ok(()) => false,
                Err(err) => {
                    warn!(category = "layer_remove", layer = %key, error = %err, "stale layer group still attached");
                    if let Err(err) = host.clear_group(handle) {
                        warn!(category = "layer_clear", layer = %key, error = %err, "failed to clear stale layer group");
                    }
                    true
                }
            }
        });
    }
}
