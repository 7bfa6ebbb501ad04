//! DashCanvas Engine
//!
//! Mounts the canvas into a host container and ties the viewport, input and
//! overlay managers together behind one API. Subscribers receive typed
//! [`EngineEvent`]s; the host stays the owner of component records and
//! applies the positions the engine requests.

mod container;
mod engine;
mod error;
mod events;

pub use container::{Container, ListenerHandle, ListenerKind, MemoryContainer};
pub use engine::{CanvasEngine, CanvasEngineBuilder};
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventBus, EventKind, Handler, HandlerError, SubscriptionId};

pub use dashcanvas_core;
pub use dashcanvas_render;
