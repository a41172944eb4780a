use std::cell::Cell;
use std::rc::Rc;

/// Engine lifecycle.
///
/// `Uninit` buffers input changes until the host is ready; `Disposed` is
/// terminal and ignores everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninit,
    Initialized,
    Disposed,
}

/// What to do with an input change in the current state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputAction {
    Buffer,
    Render,
    Ignore,
}

impl EngineState {
    pub fn on_input_change(self) -> InputAction {
        match self {
            EngineState::Uninit => InputAction::Buffer,
            EngineState::Initialized => InputAction::Render,
            EngineState::Disposed => InputAction::Ignore,
        }
    }

    /// Returns true if this moved the engine to `Initialized`.
    pub fn on_host_ready(&mut self) -> bool {
        if *self != EngineState::Uninit {
            return false;
        }
        *self = EngineState::Initialized;
        true
    }

    /// Returns true the first time only.
    pub fn on_dispose(&mut self) -> bool {
        if *self == EngineState::Disposed {
            return false;
        }
        *self = EngineState::Disposed;
        true
    }
}

/// Shared "still mounted" flag.
///
/// Deferred host callbacks hold a clone and check it before touching the
/// engine or the map; `dispose` clears it.
#[derive(Debug, Clone)]
pub struct MountGuard(Rc<Cell<bool>>);

impl MountGuard {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn unmount(&self) {
        self.0.set(false);
    }

    /// Runs `f` only while mounted.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        self.is_mounted().then(f)
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}
