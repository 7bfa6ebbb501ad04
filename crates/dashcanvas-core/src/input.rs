//! Raw input events and touch normalization.
//!
//! Hosts translate platform events (DOM, winit, ...) into these types.
//! Positions are in screen space: pixels relative to the same origin as the
//! mounting surface's bounds. Timestamps are milliseconds on any monotonic
//! clock and drive frame throttling.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self { shift: true, ..Self::NONE };
    pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };
    pub const ALT: Self = Self { alt: true, ..Self::NONE };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        time_ms: f64,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
        time_ms: f64,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        time_ms: f64,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. }
            | Self::Move { position, .. }
            | Self::Up { position, .. } => *position,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Down { modifiers, .. }
            | Self::Move { modifiers, .. }
            | Self::Up { modifiers, .. } => *modifiers,
        }
    }

    pub fn time_ms(&self) -> f64 {
        match self {
            Self::Down { time_ms, .. } | Self::Move { time_ms, .. } | Self::Up { time_ms, .. } => {
                *time_ms
            }
        }
    }
}

/// Wheel / trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Scroll amount in pixels (positive y = down).
    pub delta: Vec2,
    pub modifiers: Modifiers,
    pub time_ms: f64,
}

/// Keyboard event type. Key names follow the DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed { key: String, modifiers: Modifiers },
    Released { key: String, modifiers: Modifiers },
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One finger on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

/// A touch event carrying the touch points that changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub changed: Vec<TouchPoint>,
    pub time_ms: f64,
}

/// Any input the engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Wheel(WheelEvent),
    Touch(TouchEvent),
    Key(KeyEvent),
}

/// Touch input reduced to pointer semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchGesture {
    /// Single-finger input behaving like a primary mouse button.
    Pointer(PointerEvent),
    /// A second finger landed.
    PinchStart { first: Point, second: Point, time_ms: f64 },
    /// Either pinch finger moved.
    PinchMove { first: Point, second: Point, time_ms: f64 },
    /// A pinch finger lifted.
    PinchEnd,
    /// The platform cancelled the touch sequence.
    Cancel,
}

/// Tracks active touches and turns them into [`TouchGesture`]s.
///
/// The first finger is a mouse-equivalent pointer. A second finger turns the
/// sequence into a pinch; once a pinch has happened, the remaining finger is
/// ignored until every finger has lifted.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    /// Active touches in landing order.
    active: Vec<TouchPoint>,
    pinching: bool,
    suppressed: bool,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fingers currently down.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinching
    }

    fn pinch_points(&self) -> Option<(Point, Point)> {
        match self.active.as_slice() {
            [a, b, ..] => Some((a.position, b.position)),
            _ => None,
        }
    }

    fn primary(&self) -> Option<TouchPoint> {
        self.active.first().copied()
    }

    pub fn process(&mut self, event: &TouchEvent) -> Vec<TouchGesture> {
        let time_ms = event.time_ms;
        let mut out = Vec::new();
        match event.phase {
            TouchPhase::Start => {
                for touch in &event.changed {
                    self.active.push(*touch);
                    match self.active.len() {
                        1 if !self.suppressed => out.push(TouchGesture::Pointer(PointerEvent::Down {
                            position: touch.position,
                            button: MouseButton::Left,
                            modifiers: Modifiers::NONE,
                            time_ms,
                        })),
                        2 => {
                            if let Some((first, second)) = self.pinch_points() {
                                self.pinching = true;
                                self.suppressed = true;
                                out.push(TouchGesture::PinchStart { first, second, time_ms });
                            }
                        }
                        _ => {}
                    }
                }
            }
            TouchPhase::Move => {
                for touch in &event.changed {
                    if let Some(existing) = self.active.iter_mut().find(|t| t.id == touch.id) {
                        existing.position = touch.position;
                    }
                }
                if self.pinching {
                    if let Some((first, second)) = self.pinch_points() {
                        out.push(TouchGesture::PinchMove { first, second, time_ms });
                    }
                } else if !self.suppressed {
                    if let Some(primary) = self.primary() {
                        if event.changed.iter().any(|t| t.id == primary.id) {
                            out.push(TouchGesture::Pointer(PointerEvent::Move {
                                position: primary.position,
                                modifiers: Modifiers::NONE,
                                time_ms,
                            }));
                        }
                    }
                }
            }
            TouchPhase::End => {
                for touch in &event.changed {
                    let Some(pos) = self.active.iter().position(|t| t.id == touch.id) else {
                        continue;
                    };
                    let was_primary = pos == 0;
                    self.active.remove(pos);
                    if self.pinching && self.active.len() < 2 {
                        self.pinching = false;
                        out.push(TouchGesture::PinchEnd);
                    } else if was_primary && !self.suppressed {
                        out.push(TouchGesture::Pointer(PointerEvent::Up {
                            position: touch.position,
                            button: MouseButton::Left,
                            modifiers: Modifiers::NONE,
                            time_ms,
                        }));
                    }
                }
                if self.active.is_empty() {
                    self.suppressed = false;
                }
            }
            TouchPhase::Cancel => {
                self.active.clear();
                self.pinching = false;
                self.suppressed = false;
                out.push(TouchGesture::Cancel);
            }
        }
        out
    }
}
