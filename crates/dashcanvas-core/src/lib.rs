//! DashCanvas Core Library
//!
//! Platform-agnostic state and geometry for the dashboard canvas: the
//! viewport transform and its history, the component registry, selection,
//! and the input state machine.

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod interaction;
pub mod registry;
pub mod selection;
pub mod shortcuts;
pub mod snap;
pub mod throttle;
pub mod viewport;

pub use config::{
    EngineConfig, GridConfig, GridStyle, GuideConfig, Palette, SerializableColor, Theme,
};
pub use error::{ConfigError, ConfigResult};
pub use history::History;
pub use input::{
    InputEvent, KeyEvent, Modifiers, MouseButton, PointerEvent, TouchEvent, TouchPhase, TouchPoint,
    WheelEvent,
};
pub use interaction::{
    Action, CanvasMode, CanvasState, EventManager, InputContext, MovePhase, PositionUpdate,
};
pub use registry::{ComponentId, ComponentInstance, ComponentRegistry};
pub use selection::{Selection, SelectionDiff};
pub use shortcuts::{Intent, Shortcut, ShortcutRegistry};
pub use snap::{Guide, GuideOrientation, alignment_guides, snap_to_grid};
pub use throttle::FrameThrottle;
pub use viewport::{DEFAULT_ZOOM_STEP, Viewport, ViewportManager};
