//! Typed publish/subscribe for engine events.
//!
//! Handlers run synchronously in subscription order. A handler that returns
//! an error or panics is logged and skipped; the remaining handlers still
//! receive the event.

use dashcanvas_core::interaction::{CanvasMode, MovePhase, PositionUpdate};
use dashcanvas_core::registry::ComponentId;
use dashcanvas_core::shortcuts::Intent;
use dashcanvas_core::viewport::Viewport;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Event discriminant used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    ViewportChange,
    Select,
    Deselect,
    MoveRequest,
    Intent,
    ModeChange,
}

/// Event delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The engine finished construction.
    Ready,
    /// The viewport transform changed.
    ViewportChange(Viewport),
    /// Ids that joined the selection.
    Select(Vec<ComponentId>),
    /// Ids that left the selection.
    Deselect(Vec<ComponentId>),
    /// Position change the host should apply to its component records.
    MoveRequest {
        updates: Vec<PositionUpdate>,
        phase: MovePhase,
    },
    /// Keyboard command for the host.
    Intent(Intent),
    ModeChange(CanvasMode),
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready => EventKind::Ready,
            Self::ViewportChange(_) => EventKind::ViewportChange,
            Self::Select(_) => EventKind::Select,
            Self::Deselect(_) => EventKind::Deselect,
            Self::MoveRequest { .. } => EventKind::MoveRequest,
            Self::Intent(_) => EventKind::Intent,
            Self::ModeChange(_) => EventKind::ModeChange,
        }
    }
}

/// Error a handler may return. It is logged, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed event handler.
pub type Handler = Box<dyn FnMut(&EngineEvent) -> Result<(), HandlerError>>;

/// Token returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Ordered handler lists keyed by [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) -> Result<(), HandlerError> + 'static,
    {
        self.subscribe(kind, Box::new(handler))
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    /// Unsubscribe. Returns `false` if the id was not subscribed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver `event` to its subscribers. Returns how many handled it cleanly.
    pub fn emit(&mut self, event: &EngineEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for subscription in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            let handler = &mut subscription.handler;
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => log::error!("{:?} handler failed: {}", kind, err),
                Err(_) => log::error!("{:?} handler panicked", kind),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let seen = seen.clone();
            bus.on(EventKind::Ready, move |_| {
                seen.borrow_mut().push(n);
                Ok(())
            });
        }
        assert_eq!(bus.emit(&EngineEvent::Ready), 3);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_only_matching_kind_is_called() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        bus.on(EventKind::Select, move |event| {
            assert!(matches!(event, EngineEvent::Select(_)));
            *counter.borrow_mut() += 1;
            Ok(())
        });
        bus.emit(&EngineEvent::Deselect(vec![]));
        bus.emit(&EngineEvent::Select(vec![]));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_failing_handlers_do_not_stop_dispatch() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut bus = EventBus::new();
        let reached = Rc::new(RefCell::new(false));

        bus.on(EventKind::Ready, |_| Err("boom".into()));
        bus.on(EventKind::Ready, |_| panic!("handler bug"));
        let flag = reached.clone();
        bus.on(EventKind::Ready, move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        assert_eq!(bus.emit(&EngineEvent::Ready), 1);
        assert!(*reached.borrow());
    }

    #[test]
    fn test_off_unsubscribes() {
        let mut bus = EventBus::new();
        let id = bus.on(EventKind::Ready, |_| Ok(()));
        bus.on(EventKind::Ready, |_| Ok(()));
        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.emit(&EngineEvent::Ready), 1);

        bus.clear();
        assert!(bus.is_empty());
        assert_eq!(bus.emit(&EngineEvent::Ready), 0);
    }
}
