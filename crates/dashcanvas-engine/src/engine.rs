//! The canvas engine: owns the managers and exposes the host-facing API.

use crate::container::{Container, ListenerHandle, ListenerKind};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventBus, EventKind, Handler, HandlerError, SubscriptionId};
use dashcanvas_core::config::{EngineConfig, GridConfig};
use dashcanvas_core::input::InputEvent;
use dashcanvas_core::interaction::{Action, CanvasMode, CanvasState, EventManager, InputContext};
use dashcanvas_core::registry::{ComponentId, ComponentInstance, ComponentRegistry};
use dashcanvas_core::selection::SelectionDiff;
use dashcanvas_core::shortcuts::ShortcutRegistry;
use dashcanvas_core::viewport::{DEFAULT_ZOOM_STEP, Viewport, ViewportManager};
use dashcanvas_render::{RenderContext, RenderManager};
use kurbo::{Point, Rect};

/// Builder for [`CanvasEngine`].
#[derive(Default)]
pub struct CanvasEngineBuilder {
    container: Option<Box<dyn Container>>,
    config: EngineConfig,
    handlers: Vec<(EventKind, Handler)>,
}

impl CanvasEngineBuilder {
    /// Mount into `container`. Required.
    pub fn container(mut self, container: impl Container + 'static) -> Self {
        self.container = Some(Box::new(container));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribe before construction, so the handler also sees `Ready`.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: FnMut(&EngineEvent) -> Result<(), HandlerError> + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
        self
    }

    /// Validate everything, mount, paint the first frame and emit `Ready`.
    pub fn build(self) -> EngineResult<CanvasEngine> {
        let mut container = self.container.ok_or(EngineError::MissingContainer)?;
        let config = self.config;
        config.validate()?;

        let size = container.bounds().size();
        if !(size.width.is_finite()
            && size.height.is_finite()
            && size.width >= 0.0
            && size.height >= 0.0)
        {
            return Err(EngineError::InvalidContainer {
                width: size.width,
                height: size.height,
            });
        }

        let viewport = ViewportManager::new(&config, size);
        let renderer = RenderManager::new(container.create_overlay(size), &config);
        let events = EventManager::new(&config);
        let listeners = [
            ListenerKind::Pointer,
            ListenerKind::Wheel,
            ListenerKind::Touch,
            ListenerKind::Keyboard,
        ]
        .into_iter()
        .map(|kind| container.listen(kind))
        .collect();

        let mut bus = EventBus::new();
        for (kind, handler) in self.handlers {
            bus.subscribe(kind, handler);
        }

        let mut engine = CanvasEngine {
            config,
            container,
            viewport,
            events,
            renderer,
            registry: ComponentRegistry::new(),
            bus,
            listeners,
            destroyed: false,
        };
        engine.container.apply_transform(engine.viewport.viewport().transform());
        engine.render();
        log::info!("Canvas engine mounted at {}x{}", size.width, size.height);
        if engine.config.keyboard_shortcuts {
            ShortcutRegistry::log_all();
        }
        engine.bus.emit(&EngineEvent::Ready);
        Ok(engine)
    }
}

/// Orchestrates viewport, input and overlays for one mounted canvas.
pub struct CanvasEngine {
    config: EngineConfig,
    container: Box<dyn Container>,
    viewport: ViewportManager,
    events: EventManager,
    renderer: RenderManager,
    registry: ComponentRegistry,
    bus: EventBus,
    listeners: Vec<ListenerHandle>,
    destroyed: bool,
}

impl CanvasEngine {
    pub fn builder() -> CanvasEngineBuilder {
        CanvasEngineBuilder::default()
    }

    /// Shorthand for a builder with a container and configuration.
    pub fn new(container: impl Container + 'static, config: EngineConfig) -> EngineResult<Self> {
        Self::builder().container(container).config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // --- Events ---

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) -> Result<(), HandlerError> + 'static,
    {
        self.bus.on(kind, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    fn emit_selection(&mut self, diff: SelectionDiff) {
        if diff.is_empty() {
            return;
        }
        if !diff.removed.is_empty() {
            self.bus.emit(&EngineEvent::Deselect(diff.removed));
        }
        if !diff.added.is_empty() {
            self.bus.emit(&EngineEvent::Select(diff.added));
        }
        self.render();
    }

    // --- Input ---

    /// Feed one raw input event through the interaction state machine.
    pub fn handle_input(&mut self, event: &InputEvent) {
        if self.destroyed {
            return;
        }
        let origin = self.container.bounds().origin();
        let ctx = InputContext::new(self.viewport.viewport(), &self.registry, origin);
        let actions = self.events.handle(event, &ctx);
        self.apply(actions);
    }

    fn apply(&mut self, actions: Vec<Action>) {
        if actions.is_empty() {
            return;
        }
        let mut viewport_changed = false;
        for action in actions {
            match action {
                Action::Pan { dx, dy } => viewport_changed |= self.viewport.pan(dx, dy),
                Action::ZoomAt { scale, center } => {
                    viewport_changed |= self.viewport.zoom(scale, Some(center))
                }
                Action::BeginViewportGesture => self.viewport.begin_gesture(),
                Action::EndViewportGesture => {
                    self.viewport.end_gesture();
                }
                Action::Undo => viewport_changed |= self.viewport.undo(),
                Action::Redo => viewport_changed |= self.viewport.redo(),
                Action::SelectionChanged(diff) => self.emit_selection(diff),
                Action::MoveRequested { updates, phase } => {
                    self.bus.emit(&EngineEvent::MoveRequest { updates, phase });
                }
                Action::ModeChanged(mode) => {
                    self.bus.emit(&EngineEvent::ModeChange(mode));
                }
                Action::Intent(intent) => {
                    self.bus.emit(&EngineEvent::Intent(intent));
                }
                Action::BoxChanged(_) | Action::GuidesChanged(_) => {}
            }
        }
        if viewport_changed {
            self.publish_viewport();
        } else {
            self.render();
        }
    }

    /// Interaction flags and canvas state.
    pub fn interaction(&self) -> &EventManager {
        &self.events
    }

    pub fn state(&self) -> &CanvasState {
        self.events.state()
    }

    pub fn mode(&self) -> CanvasMode {
        self.events.mode()
    }

    pub fn set_mode(&mut self, mode: CanvasMode) {
        if self.destroyed {
            return;
        }
        let actions = self.events.set_mode(mode);
        self.apply(actions);
    }

    // --- Viewport ---

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    fn publish_viewport(&mut self) {
        let viewport = self.viewport.viewport();
        self.container.apply_transform(viewport.transform());
        self.render();
        self.bus.emit(&EngineEvent::ViewportChange(viewport));
    }

    fn viewport_op(&mut self, op: impl FnOnce(&mut ViewportManager) -> bool) -> bool {
        if self.destroyed {
            return false;
        }
        let changed = op(&mut self.viewport);
        if changed {
            self.publish_viewport();
        }
        changed
    }

    /// Set the transform directly. The scale is clamped; non-finite input is ignored.
    pub fn set_viewport(&mut self, x: f64, y: f64, scale: f64, rotation: f64) -> bool {
        self.viewport_op(|v| v.set_viewport(x, y, scale, rotation))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.viewport_op(|v| v.pan(dx, dy))
    }

    /// Zoom to `scale`, keeping the surface-local point `center` fixed.
    pub fn zoom(&mut self, scale: f64, center: Option<Point>) -> bool {
        self.viewport_op(|v| v.zoom(scale, center))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_in_by(DEFAULT_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_out_by(DEFAULT_ZOOM_STEP)
    }

    pub fn zoom_in_by(&mut self, factor: f64) -> bool {
        self.viewport_op(|v| v.zoom_in(factor))
    }

    pub fn zoom_out_by(&mut self, factor: f64) -> bool {
        self.viewport_op(|v| v.zoom_out(factor))
    }

    /// Rotate by `delta` radians around the surface-local point `center`.
    pub fn rotate(&mut self, delta: f64, center: Option<Point>) -> bool {
        self.viewport_op(|v| v.rotate(delta, center))
    }

    /// Fit the whole canvas. `None` uses the configured padding.
    pub fn fit_to_container(&mut self, padding: Option<f64>) -> bool {
        let padding = padding.unwrap_or(self.config.fit_padding);
        self.viewport_op(|v| v.fit_to_container(padding))
    }

    pub fn fit_to_width(&mut self, padding: Option<f64>) -> bool {
        let padding = padding.unwrap_or(self.config.fit_padding);
        self.viewport_op(|v| v.fit_to_width(padding))
    }

    pub fn reset(&mut self) -> bool {
        self.viewport_op(ViewportManager::reset)
    }

    pub fn undo(&mut self) -> bool {
        self.viewport_op(ViewportManager::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.viewport_op(ViewportManager::redo)
    }

    pub fn can_undo(&self) -> bool {
        self.viewport.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.viewport.can_redo()
    }

    /// Screen point (same space as the container bounds) to canvas units.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let origin = self.container.bounds().origin();
        self.viewport.screen_to_canvas(screen - origin.to_vec2())
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let origin = self.container.bounds().origin();
        self.viewport.canvas_to_screen(canvas) + origin.to_vec2()
    }

    pub fn visible_canvas_rect(&self) -> Rect {
        self.viewport.visible_canvas_rect()
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ComponentId] {
        self.events.selection().ids()
    }

    pub fn active(&self) -> Option<ComponentId> {
        self.events.active()
    }

    /// Replace the selection. Unregistered and hidden ids are skipped.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ComponentId>) {
        if self.destroyed {
            return;
        }
        let ids = self.selectable(ids);
        let diff = self.events.select(ids);
        self.emit_selection(diff);
    }

    pub fn add_to_selection(&mut self, ids: impl IntoIterator<Item = ComponentId>) {
        if self.destroyed {
            return;
        }
        let ids = self.selectable(ids);
        let diff = self.events.add_to_selection(ids);
        self.emit_selection(diff);
    }

    /// Select every visible component, honouring the locked-component policy.
    pub fn select_all(&mut self) {
        let include_locked = self.config.box_select_includes_locked;
        let ids: Vec<ComponentId> = self
            .registry
            .ordered()
            .into_iter()
            .filter(|c| include_locked || !c.locked)
            .map(|c| c.id)
            .collect();
        self.select(ids);
    }

    pub fn deselect(&mut self, id: ComponentId) {
        if self.destroyed {
            return;
        }
        let diff = self.events.deselect(id);
        self.emit_selection(diff);
    }

    pub fn clear_selection(&mut self) {
        if self.destroyed {
            return;
        }
        let diff = self.events.clear_selection();
        self.emit_selection(diff);
    }

    /// Focus a selected component. Returns `false` if it is not selected.
    pub fn set_active(&mut self, id: Option<ComponentId>) -> bool {
        !self.destroyed && self.events.set_active(id)
    }

    fn selectable(&self, ids: impl IntoIterator<Item = ComponentId>) -> Vec<ComponentId> {
        ids.into_iter()
            .filter(|&id| self.registry.get(id).is_some_and(|c| c.visible))
            .collect()
    }

    // --- Components ---

    pub fn components(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentInstance> {
        self.registry.get(id)
    }

    /// Register or update a component's geometry. Hiding a selected component deselects it.
    pub fn upsert_component(&mut self, instance: ComponentInstance) {
        if self.destroyed {
            return;
        }
        let (id, visible) = (instance.id, instance.visible);
        self.registry.upsert(instance);
        if !visible && self.events.selection().contains(id) {
            let diff = self.events.deselect(id);
            self.emit_selection(diff);
        } else {
            self.render();
        }
    }

    /// Unregister a component, deselecting it first.
    ///
    /// Removing the component under an active drag reverts the others.
    pub fn remove_component(&mut self, id: ComponentId) -> Option<ComponentInstance> {
        if self.destroyed {
            return None;
        }
        let removed = self.registry.remove(id)?;
        let actions = self.events.forget(id);
        if actions.is_empty() {
            self.render();
        } else {
            self.apply(actions);
        }
        Some(removed)
    }

    /// Drop every component and return the canvas state to its defaults.
    pub fn clear_components(&mut self) {
        if self.destroyed {
            return;
        }
        self.registry.clear();
        let actions = self.events.reset();
        if actions.is_empty() {
            self.render();
        } else {
            self.apply(actions);
        }
    }

    // --- Rendering ---

    fn render_context(&self) -> RenderContext {
        RenderContext::new(self.viewport.viewport())
            .with_selection(self.registry.bounds_of(self.events.selection().ids()))
            .with_box(self.events.box_rect())
            .with_guides(self.config.guides.guides.iter().copied())
            .with_guides(self.events.guides().iter().copied())
    }

    /// Repaint all overlays.
    pub fn render(&mut self) {
        if self.destroyed {
            return;
        }
        let ctx = self.render_context();
        if let Err(err) = self.renderer.render(&ctx) {
            log::debug!("Skipping overlay render: {}", err);
        }
    }

    /// Pick up new container bounds: resize the overlay and repaint.
    pub fn resize(&mut self) {
        if self.destroyed {
            return;
        }
        let size = self.container.bounds().size();
        self.viewport.set_container_size(size);
        let ctx = self.render_context();
        if let Err(err) = self.renderer.resize(size, &ctx) {
            log::warn!("Overlay resize failed: {}", err);
        }
    }

    pub fn set_grid(&mut self, grid: GridConfig) {
        self.renderer.set_grid(grid);
        self.render();
    }

    /// Show or hide every guide line, configured and alignment alike.
    pub fn set_guides_enabled(&mut self, enabled: bool) {
        self.renderer.set_guides_enabled(enabled);
        self.render();
    }

    // --- Teardown ---

    /// Release listeners, the overlay and every subscription. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.events.reset();
        for handle in self.listeners.drain(..) {
            self.container.unlisten(handle);
        }
        self.renderer.destroy();
        self.container.clear();
        self.bus.clear();
        log::info!("Canvas engine destroyed");
    }
}

impl Drop for CanvasEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}
