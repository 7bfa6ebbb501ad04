//! Mounting surface abstraction.
//!
//! A container is the rectangular region the engine fully controls. The
//! engine applies the viewport transform to the container's content layer,
//! creates one overlay surface inside it, and registers input listeners that
//! it releases again on destroy.

use dashcanvas_render::{DrawLog, OverlaySurface, RecordingSurface};
use kurbo::{Affine, Rect, Size};
use std::cell::RefCell;
use std::rc::Rc;

/// Category of input the engine listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Pointer,
    Wheel,
    Touch,
    Keyboard,
}

/// Registration token for an input listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    pub id: u64,
    pub kind: ListenerKind,
}

/// Host-provided mounting surface.
pub trait Container {
    /// Surface rectangle in screen coordinates.
    fn bounds(&self) -> Rect;

    /// Create the overlay layer the render manager paints into.
    fn create_overlay(&mut self, size: Size) -> Box<dyn OverlaySurface>;

    /// Apply the canvas-to-surface transform to the content layer.
    fn apply_transform(&mut self, transform: Affine);

    /// Start routing input of `kind` to the engine.
    fn listen(&mut self, kind: ListenerKind) -> ListenerHandle;

    fn unlisten(&mut self, handle: ListenerHandle);

    /// Remove everything the engine placed in the container.
    fn clear(&mut self);
}

#[derive(Debug)]
struct MemoryState {
    bounds: Rect,
    transform: Affine,
    listeners: Vec<ListenerHandle>,
    next_listener: u64,
    overlays: Vec<DrawLog>,
    clears: usize,
}

/// In-memory container for testing and headless use.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryContainer {
    /// Create a container occupying `bounds` in screen coordinates.
    pub fn new(bounds: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryState {
                bounds,
                transform: Affine::IDENTITY,
                listeners: Vec::new(),
                next_listener: 0,
                overlays: Vec::new(),
                clears: 0,
            })),
        }
    }

    /// Container at the screen origin.
    pub fn with_size(size: Size) -> Self {
        Self::new(Rect::from_origin_size((0.0, 0.0), size))
    }

    /// Simulate the host resizing or moving the surface.
    pub fn set_bounds(&self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds;
    }

    /// Last transform applied to the content layer.
    pub fn transform(&self) -> Affine {
        self.state.borrow().transform
    }

    pub fn listeners(&self) -> Vec<ListenerHandle> {
        self.state.borrow().listeners.clone()
    }

    /// Command log of the most recently created overlay.
    pub fn overlay_log(&self) -> Option<DrawLog> {
        self.state.borrow().overlays.last().cloned()
    }

    pub fn overlay_count(&self) -> usize {
        self.state.borrow().overlays.len()
    }

    /// How many times the container was cleared.
    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }
}

impl Container for MemoryContainer {
    fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    fn create_overlay(&mut self, size: Size) -> Box<dyn OverlaySurface> {
        let surface = RecordingSurface::new(size);
        self.state.borrow_mut().overlays.push(surface.log());
        Box::new(surface)
    }

    fn apply_transform(&mut self, transform: Affine) {
        self.state.borrow_mut().transform = transform;
    }

    fn listen(&mut self, kind: ListenerKind) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        let handle = ListenerHandle {
            id: state.next_listener,
            kind,
        };
        state.next_listener += 1;
        state.listeners.push(handle);
        handle
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        self.state.borrow_mut().listeners.retain(|h| *h != handle);
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.transform = Affine::IDENTITY;
        state.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_and_unlisten() {
        let mut container = MemoryContainer::with_size(Size::new(100.0, 100.0));
        let pointer = container.listen(ListenerKind::Pointer);
        let wheel = container.listen(ListenerKind::Wheel);
        assert_ne!(pointer.id, wheel.id);
        assert_eq!(container.listeners().len(), 2);

        container.unlisten(pointer);
        assert_eq!(container.listeners(), vec![wheel]);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = MemoryContainer::new(Rect::new(10.0, 20.0, 110.0, 120.0));
        let mut owned = handle.clone();
        owned.apply_transform(Affine::scale(2.0));
        owned.create_overlay(Size::new(100.0, 100.0));
        owned.clear();

        assert_eq!(handle.overlay_count(), 1);
        assert_eq!(handle.clear_count(), 1);
        assert_eq!(handle.transform(), Affine::IDENTITY);

        handle.set_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(owned.bounds().size(), Size::new(50.0, 50.0));
    }
}
