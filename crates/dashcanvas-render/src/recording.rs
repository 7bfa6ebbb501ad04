//! Headless overlay surface that records draw calls.
//!
//! Used by tests and by hosts that want to replay overlays onto their own
//! backend. The command log is shared, so a handle obtained with
//! [`RecordingSurface::log`] keeps observing the surface after it has been
//! boxed into a render manager.

use crate::renderer::OverlaySurface;
use dashcanvas_core::config::SerializableColor;
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Resize(Size),
    SetTransform(Affine),
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: SerializableColor,
    },
    StrokeRect {
        rect: Rect,
        width: f64,
        color: SerializableColor,
    },
    FillRect {
        rect: Rect,
        color: SerializableColor,
    },
    Detach,
}

/// Shared handle to a surface's command log.
#[derive(Debug, Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<DrawCommand>>>);

impl DrawLog {
    /// Snapshot of every command recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.0.borrow().clone()
    }

    /// Commands recorded since the last `Clear`.
    pub fn frame(&self) -> Vec<DrawCommand> {
        let commands = self.0.borrow();
        let start = commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        commands[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Forget recorded commands.
    pub fn reset(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, command: DrawCommand) {
        self.0.borrow_mut().push(command);
    }
}

/// In-memory [`OverlaySurface`].
#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    log: DrawLog,
    attached: bool,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            log: DrawLog::default(),
            attached: true,
        }
    }

    /// A handle that observes this surface's commands.
    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl OverlaySurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
        self.log.push(DrawCommand::Resize(size));
    }

    fn clear(&mut self) {
        self.log.push(DrawCommand::Clear);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.log.push(DrawCommand::SetTransform(transform));
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.log.push(DrawCommand::Line {
            from,
            to,
            width,
            color: color.into(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color) {
        self.log.push(DrawCommand::StrokeRect {
            rect,
            width,
            color: color.into(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.log.push(DrawCommand::FillRect {
            rect,
            color: color.into(),
        });
    }

    fn detach(&mut self) {
        self.attached = false;
        self.log.push(DrawCommand::Detach);
    }
}
