use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};

use layers::{HostMap, InvalidInput, LayerError, LayerKey, LayerManager, Primitive, PrimitiveBuilder};
use runtime::{Event, EventBus, RenderPass, SubscriptionId};
use tracing::{debug, error, warn};
use trip::{ItemRef, TripData, ViewMode};

use crate::config::{EngineConfig, RegionPreset};
use crate::error::RenderError;
use crate::events::EngineEvent;
use crate::state::{EngineState, InputAction, MountGuard};
use crate::view::{Focus, TargetView, ViewSelector};

/// The three inputs a render pass is a function of.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderInputs {
    pub trip: TripData,
    pub mode: ViewMode,
    pub focus: Option<ItemRef>,
}

/// Outcome of one successful render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub pass_index: u64,
    pub mode: ViewMode,
    pub view: TargetView,
    /// Primitives per group, world copies included.
    pub counts: BTreeMap<LayerKey, usize>,
    pub skipped: Vec<InvalidInput>,
    /// Group faults recovered within the pass.
    pub faults: Vec<LayerError>,
}

impl RenderReport {
    pub fn primitive_count(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Renders a trip onto a host map.
///
/// Every change to trip data, view mode or focus triggers one full pass:
/// clear all groups, rebuild primitives for the current mode, select and
/// apply the view. Passes are synchronous, so the last input always wins.
/// The engine holds the host weakly and never keeps it alive.
pub struct Engine<M: HostMap> {
    host: Weak<RefCell<M>>,
    config: EngineConfig,
    builder: PrimitiveBuilder,
    selector: ViewSelector,
    layers: LayerManager,
    state: EngineState,
    inputs: RenderInputs,
    bus: EventBus<EngineEvent>,
    next_pass: RenderPass,
    mount: MountGuard,
    render_error: Option<String>,
    last_view: Option<TargetView>,
    last_report: Option<RenderReport>,
}

impl<M: HostMap> Engine<M> {
    pub fn create(host: &Rc<RefCell<M>>, config: EngineConfig) -> Self {
        Self {
            host: Rc::downgrade(host),
            builder: PrimitiveBuilder::new(config.great_circle_samples),
            selector: ViewSelector::new(&config),
            config,
            layers: LayerManager::new(),
            state: EngineState::Uninit,
            inputs: RenderInputs::default(),
            bus: EventBus::new(),
            next_pass: RenderPass::default(),
            mount: MountGuard::new(),
            render_error: None,
            last_view: None,
            last_report: None,
        }
    }

    /// Default config with `region` swapped in.
    pub fn with_region(host: &Rc<RefCell<M>>, region: RegionPreset) -> Self {
        Self::create(host, EngineConfig::with_region(region))
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn inputs(&self) -> &RenderInputs {
        &self.inputs
    }

    /// Message of the last failed pass; cleared by the next successful one.
    pub fn render_error(&self) -> Option<&str> {
        self.render_error.as_deref()
    }

    pub fn last_report(&self) -> Option<&RenderReport> {
        self.last_report.as_ref()
    }

    pub fn mount_guard(&self) -> MountGuard {
        self.mount.clone()
    }

    pub fn on(&mut self, kind: &'static str, handler: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        self.bus.on(kind, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    pub fn events(&self) -> &[Event<EngineEvent>] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<EngineEvent>> {
        self.bus.drain()
    }

    /// The host finished creating its map. Runs the first pass with
    /// whatever inputs were buffered.
    pub fn host_ready(&mut self) {
        if self.state.on_host_ready() {
            debug!("host map ready");
            self.run_pass();
        }
    }

    pub fn set_trip_data(&mut self, trip: TripData) {
        self.update("trip", |inputs| inputs.trip = trip);
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.update("mode", |inputs| inputs.mode = mode);
    }

    pub fn set_focused_item(&mut self, focus: Option<ItemRef>) {
        self.update("focus", |inputs| inputs.focus = focus);
    }

    /// Re-runs the pass on unchanged inputs, e.g. after the host came back.
    pub fn refresh(&mut self) {
        if self.state == EngineState::Initialized {
            self.run_pass();
        }
    }

    /// The map container changed size.
    pub fn container_resized(&mut self) {
        if self.state != EngineState::Initialized || !self.mount.is_mounted() {
            return;
        }
        if let Some(host) = self.host.upgrade()
            && let Ok(mut map) = host.try_borrow_mut()
            && map.is_available()
        {
            map.invalidate_size();
        }
    }

    /// Detaches every group and stops reacting to input. Idempotent.
    pub fn dispose(&mut self) {
        if !self.state.on_dispose() {
            return;
        }
        self.mount.unmount();
        let mut faults = Vec::new();
        if let Some(host) = self.host.upgrade() {
            faults = match host.try_borrow_mut() {
                Ok(mut map) if map.is_available() => self.layers.dispose(&mut *map),
                _ => Vec::new(),
            };
        }
        self.layers.forget();
        self.host = Weak::new();
        self.bus.clear_handlers();
        debug!(faults = faults.len(), "engine disposed");
    }

    fn update(&mut self, input: &'static str, apply: impl FnOnce(&mut RenderInputs)) {
        match self.state.on_input_change() {
            InputAction::Ignore => debug!(input, "engine disposed; input ignored"),
            InputAction::Buffer => {
                apply(&mut self.inputs);
                debug!(input, "host not ready; input buffered");
            }
            InputAction::Render => {
                apply(&mut self.inputs);
                self.run_pass();
            }
        }
    }

    fn run_pass(&mut self) {
        let pass = self.next_pass;
        self.next_pass = pass.next();

        let Some(host) = self.host.upgrade() else {
            self.layers.forget();
            self.fail(pass, RenderError::HostMapUnavailable);
            return;
        };
        let outcome = match host.try_borrow_mut() {
            Ok(mut map) => self.render(&mut *map, pass),
            Err(_) => Err(RenderError::HostMapUnavailable),
        };
        match outcome {
            Ok(report) => self.finish(pass, report),
            Err(err) => self.fail(pass, err),
        }
    }

    fn render(&mut self, host: &mut M, pass: RenderPass) -> Result<RenderReport, RenderError> {
        if !host.is_available() {
            return Err(RenderError::HostMapUnavailable);
        }

        if !self.layers.is_initialized() {
            self.layers.initialize(host)?;
            debug!("layer groups attached");
        }
        let recreated = self.layers.ensure_groups(host)?;
        if recreated > 0 {
            debug!(recreated, "missing layer groups recreated");
        }

        let mut faults = self.layers.clear_all(host);
        if faults.iter().any(LayerError::is_unavailable) {
            return Err(RenderError::HostMapUnavailable);
        }
        if !faults.is_empty() {
            self.layers.ensure_groups(host)?;
        }

        let (mut primitives, skipped) = self.collect();
        primitives.sort_by_key(Primitive::layer);

        for primitive in &primitives {
            match self.layers.add(host, primitive) {
                Ok(()) => {}
                // Group dropped earlier in this pass; comes back next pass.
                Err(LayerError::GroupMissing(_)) => {}
                Err(err) if err.is_unavailable() => return Err(RenderError::HostMapUnavailable),
                Err(err @ LayerError::DuplicateMarker(_)) => return Err(err.into()),
                Err(err) => faults.push(err),
            }
        }

        let viewport = host.viewport_size_px().unwrap_or(self.config.viewport_px);
        let view = self.selector.select(self.inputs.mode, self.focus(), viewport);
        view.apply(host)?;
        host.invalidate_size();

        Ok(RenderReport {
            pass_index: pass.index,
            mode: self.inputs.mode,
            view,
            counts: self.layers.counts().clone(),
            skipped,
            faults,
        })
    }

    /// Primitives for the current mode, plus the items that were skipped.
    fn collect(&self) -> (Vec<Primitive>, Vec<InvalidInput>) {
        let trip = &self.inputs.trip;
        let mut primitives = Vec::new();
        let mut skipped = Vec::new();
        let mut push = |built: Result<Vec<Primitive>, InvalidInput>| match built {
            Ok(p) => primitives.extend(p),
            Err(err) => {
                warn!(category = "invalid_input", error = %err, "skipping item");
                skipped.push(err);
            }
        };

        match self.inputs.mode {
            ViewMode::World | ViewMode::Region => {
                let world = self.inputs.mode == ViewMode::World;
                let region = self.config.region.bounds();
                let mut seen = HashSet::new();
                for segment in &trip.segments {
                    if !seen.insert(&segment.id) {
                        let item = ItemRef::Segment(segment.id.clone());
                        push(Err(InvalidInput::DuplicateItem { item }));
                        continue;
                    }
                    let wanted = match segment.endpoints() {
                        Some((a, b)) if a.is_valid() && b.is_valid() => {
                            if world {
                                self.config.intercontinental.matches(segment)
                            } else {
                                region.contains(a) && region.contains(b)
                            }
                        }
                        // Broken endpoints go through so the builder reports them.
                        _ => true,
                    };
                    if wanted {
                        push(self.builder.build_segment(segment, false));
                    }
                }
                if !world {
                    for (id, stay) in trip.stays_with_ids() {
                        push(self.builder.build_stay(id, stay, false));
                    }
                }
            }
            ViewMode::Local => match &self.inputs.focus {
                Some(item @ ItemRef::Segment(id)) => match trip.segment(id) {
                    Some(segment) => push(self.builder.build_segment(segment, true)),
                    None => push(Err(InvalidInput::UnknownItem { item: item.clone() })),
                },
                Some(item @ ItemRef::Stay(id)) => match trip.stay(*id) {
                    Some(stay) => push(self.builder.build_stay(*id, stay, true)),
                    None => push(Err(InvalidInput::UnknownItem { item: item.clone() })),
                },
                None => {}
            },
        }
        (primitives, skipped)
    }

    fn focus(&self) -> Option<Focus<'_>> {
        let trip = &self.inputs.trip;
        match self.inputs.focus.as_ref()? {
            ItemRef::Segment(id) => trip.segment(id).map(Focus::Segment),
            ItemRef::Stay(id) => trip.stay(*id).map(Focus::Stay),
        }
    }

    fn finish(&mut self, pass: RenderPass, report: RenderReport) {
        self.render_error = None;
        for item in &report.skipped {
            let err = RenderError::from(item.clone());
            self.bus.emit(
                pass,
                EngineEvent::Diagnostic {
                    category: err.category(),
                    message: err.to_string(),
                },
            );
        }
        for fault in &report.faults {
            let err = RenderError::LayerGroupFault(fault.clone());
            self.bus.emit(
                pass,
                EngineEvent::Diagnostic {
                    category: err.category(),
                    message: err.to_string(),
                },
            );
        }
        if self.last_view != Some(report.view) {
            self.last_view = Some(report.view);
            self.bus.emit(pass, EngineEvent::ViewChanged(report.view));
        }
        debug!(
            pass = pass.index,
            mode = %report.mode,
            primitives = report.primitive_count(),
            skipped = report.skipped.len(),
            stale_groups = self.layers.stale_count(),
            "render pass complete"
        );
        self.last_report = Some(report);
    }

    fn fail(&mut self, pass: RenderPass, err: RenderError) {
        if err.is_recoverable() {
            warn!(category = err.category(), pass = pass.index, error = %err, "render pass aborted");
        } else {
            error!(category = err.category(), pass = pass.index, error = %err, "render pass failed");
        }
        let message = err.message();
        self.render_error = Some(message.clone());
        self.bus.emit(
            pass,
            EngineEvent::RenderError {
                message,
                recoverable: err.is_recoverable(),
            },
        );
    }
}

impl<M: HostMap> Drop for Engine<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<M: HostMap> std::fmt::Debug for Engine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("inputs", &self.inputs)
            .field("next_pass", &self.next_pass)
            .field("render_error", &self.render_error)
            .finish_non_exhaustive()
    }
}
