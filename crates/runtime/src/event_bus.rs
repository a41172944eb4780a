use crate::pass::RenderPass;

/// Events carry a stable kind name used for subscriptions.
pub trait EventKind {
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub pass_index: u64,
    pub payload: E,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Event history plus named subscriptions (`on("renderError", ..)`).
///
/// Handlers run synchronously inside [`EventBus::emit`], in subscription
/// order. History is bounded; the oldest events are dropped first.
pub struct EventBus<E> {
    events: Vec<Event<E>>,
    max_retained: usize,
    next_subscription: u64,
    handlers: Vec<(SubscriptionId, &'static str, Handler<E>)>,
}

pub const DEFAULT_MAX_RETAINED_EVENTS: usize = 256;

impl<E: EventKind> Default for EventBus<E> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_RETAINED_EVENTS)
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events.len())
            .field("max_retained", &self.max_retained)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<E: EventKind> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_retained: usize) -> Self {
        Self {
            events: Vec::new(),
            max_retained: max_retained.max(1),
            next_subscription: 0,
            handlers: Vec::new(),
        }
    }

    pub fn on(&mut self, kind: &'static str, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.handlers.push((id, kind, Box::new(handler)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, pass: RenderPass, payload: E) {
        let kind = payload.kind();
        for (_, k, handler) in &mut self.handlers {
            if *k == kind {
                handler(&payload);
            }
        }
        if self.events.len() >= self.max_retained {
            self.events.remove(0);
        }
        self.events.push(Event {
            pass_index: pass.index,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }

    /// Drops every subscription; history is kept.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind};
    use crate::pass::RenderPass;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Ping(u32),
        Pong,
    }

    impl EventKind for TestEvent {
        fn kind(&self) -> &'static str {
            match self {
                TestEvent::Ping(_) => "ping",
                TestEvent::Pong => "pong",
            }
        }
    }

    #[test]
    fn records_events_with_pass_index() {
        let mut bus = EventBus::new();
        bus.emit(RenderPass::new(2), TestEvent::Pong);
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].pass_index, 2);
    }

    #[test]
    fn handlers_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.on("ping", move |e: &TestEvent| sink.borrow_mut().push(e.clone()));
        bus.emit(RenderPass::new(0), TestEvent::Ping(1));
        bus.emit(RenderPass::new(0), TestEvent::Pong);
        bus.emit(RenderPass::new(1), TestEvent::Ping(2));
        assert_eq!(*seen.borrow(), vec![TestEvent::Ping(1), TestEvent::Ping(2)]);
    }

    #[test]
    fn off_removes_subscription() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let id = bus.on("pong", move |_: &TestEvent| *c.borrow_mut() += 1);
        bus.emit(RenderPass::new(0), TestEvent::Pong);
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.emit(RenderPass::new(0), TestEvent::Pong);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn history_is_bounded_and_drainable() {
        let mut bus = EventBus::with_capacity(2);
        for i in 0..3 {
            bus.emit(RenderPass::new(i), TestEvent::Ping(i as u32));
        }
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].payload, TestEvent::Ping(1));
        assert!(bus.events().is_empty());
    }
}
