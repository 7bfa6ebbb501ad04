//! Event manager: input classification and the interaction state machine.
//!
//! Raw [`InputEvent`]s go in, [`Action`]s come out. The manager owns the
//! canvas state (mode, selection, active component, box-select rectangle)
//! and mutates it only through its own transitions; the viewport and the
//! component registry are read through an [`InputContext`] and changed by
//! whoever applies the returned actions.
//!
//! At most one of panning, dragging, box-selecting or pinching is active at
//! a time. Pointer-down is the only way into a gesture, and it is ignored
//! unless the manager is idle.

use crate::config::EngineConfig;
use crate::input::{
    InputEvent, KeyEvent, Modifiers, MouseButton, PointerEvent, TouchEvent, TouchGesture,
    TouchTracker, WheelEvent,
};
use crate::registry::{ComponentId, ComponentRegistry};
use crate::selection::{Selection, SelectionDiff};
use crate::shortcuts::{Intent, PAN_KEY, ShortcutRegistry};
use crate::snap::{Guide, alignment_guides, snap_to_grid};
use crate::throttle::FrameThrottle;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Wheel zoom multiplier for scrolling up.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
/// Wheel zoom multiplier for scrolling down.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// What a primary-button press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasMode {
    /// Press selects, drags or box-selects.
    #[default]
    Select,
    /// Press pans the viewport.
    Pan,
}

/// Editor-facing canvas state. Only [`EventManager`] writes it.
#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    mode: CanvasMode,
    selection: Selection,
    active: Option<ComponentId>,
    box_rect: Option<Rect>,
}

impl CanvasState {
    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The focused component, always a member of the selection.
    pub fn active(&self) -> Option<ComponentId> {
        self.active
    }

    /// Current box-select rectangle in canvas units.
    pub fn box_rect(&self) -> Option<Rect> {
        self.box_rect
    }
}

/// Read-only view of the world an input event is interpreted against.
#[derive(Debug, Clone, Copy)]
pub struct InputContext<'a> {
    pub viewport: Viewport,
    pub registry: &'a ComponentRegistry,
    /// Top-left of the mounting surface in screen coordinates.
    pub surface_origin: Point,
}

impl<'a> InputContext<'a> {
    pub fn new(viewport: Viewport, registry: &'a ComponentRegistry, surface_origin: Point) -> Self {
        Self {
            viewport,
            registry,
            surface_origin,
        }
    }

    /// Screen point to surface-local pixels.
    pub fn to_local(&self, screen: Point) -> Point {
        screen - self.surface_origin.to_vec2()
    }

    /// Screen point to canvas units.
    pub fn to_canvas(&self, screen: Point) -> Point {
        self.viewport.screen_to_canvas(self.to_local(screen))
    }
}

/// Requested new top-left position for a component, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: ComponentId,
    pub x: f64,
    pub y: f64,
}

/// Stage of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePhase {
    /// Intermediate drag frame.
    Preview,
    /// Pointer released; persist these positions.
    Commit,
    /// Drag cancelled; positions are the pre-drag ones.
    Revert,
}

/// Side effect requested by the event manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Translate the viewport by a surface-space delta.
    Pan { dx: f64, dy: f64 },
    /// Zoom to an absolute scale around a surface-local point.
    ZoomAt { scale: f64, center: Point },
    /// Start coalescing viewport changes into one history entry.
    BeginViewportGesture,
    EndViewportGesture,
    Undo,
    Redo,
    SelectionChanged(SelectionDiff),
    MoveRequested {
        updates: Vec<PositionUpdate>,
        phase: MovePhase,
    },
    BoxChanged(Option<Rect>),
    GuidesChanged(Vec<Guide>),
    ModeChanged(CanvasMode),
    /// Command for the host to carry out.
    Intent(Intent),
}

/// State captured for one component drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Component under the pointer at press time.
    pub target: ComponentId,
    /// Pointer position at press time, canvas units.
    pub start: Point,
    pub target_origin: Point,
    /// Every component that moves, with its pre-drag position.
    pub origins: Vec<(ComponentId, Point)>,
    /// Last applied offset.
    pub delta: Vec2,
}

impl DragState {
    fn updates(&self, delta: Vec2) -> Vec<PositionUpdate> {
        self.origins
            .iter()
            .map(|&(id, origin)| PositionUpdate {
                id,
                x: origin.x + delta.x,
                y: origin.y + delta.y,
            })
            .collect()
    }

    fn moves(&self, id: ComponentId) -> bool {
        self.origins.iter().any(|(moving, _)| *moving == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    start_distance: f64,
    start_scale: f64,
    /// Finger midpoint, surface-local.
    last_mid: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Interaction {
    #[default]
    Idle,
    Panning {
        /// Last pointer position, surface-local.
        last: Point,
    },
    Dragging(DragState),
    BoxSelecting {
        anchor: Point,
        current: Point,
        additive: bool,
    },
    Pinching(PinchState),
}

impl Interaction {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::Dragging(_) => "dragging",
            Self::BoxSelecting { .. } => "box-selecting",
            Self::Pinching(_) => "pinching",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    multi_select: bool,
    keyboard_shortcuts: bool,
    include_locked: bool,
    snap_size: Option<f64>,
    alignment_threshold: Option<f64>,
}

impl Settings {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            multi_select: config.multi_select,
            keyboard_shortcuts: config.keyboard_shortcuts,
            include_locked: config.box_select_includes_locked,
            snap_size: (config.grid.snap && config.grid.size > 0.0).then_some(config.grid.size),
            alignment_threshold: (config.guides.enabled && config.guides.alignment)
                .then_some(config.guides.threshold),
        }
    }

    /// Offset for a drag whose pointer is now at `point`, grid-snapped if enabled.
    fn drag_delta(&self, drag: &DragState, point: Point) -> Vec2 {
        let raw = point - drag.start;
        match self.snap_size {
            Some(size) => snap_to_grid(drag.target_origin + raw, size) - drag.target_origin,
            None => raw,
        }
    }

    fn guides_for(&self, drag: &DragState, registry: &ComponentRegistry) -> Vec<Guide> {
        let Some(threshold) = self.alignment_threshold else {
            return Vec::new();
        };
        let moving = drag
            .origins
            .iter()
            .filter_map(|&(id, origin)| {
                registry
                    .get(id)
                    .map(|c| Rect::from_origin_size(origin + drag.delta, c.size))
            })
            .reduce(|a, b| a.union(b));
        let Some(moving) = moving else {
            return Vec::new();
        };
        let others: Vec<Rect> = registry
            .ordered()
            .into_iter()
            .filter(|c| c.visible && !drag.moves(c.id))
            .map(|c| c.bounds())
            .collect();
        alignment_guides(moving, &others, threshold)
    }
}

/// Classifies input and runs the interaction state machine.
#[derive(Debug, Clone)]
pub struct EventManager {
    state: CanvasState,
    interaction: Interaction,
    touches: TouchTracker,
    pointer_throttle: FrameThrottle,
    wheel_throttle: FrameThrottle,
    /// Transient alignment guides for the current drag.
    guides: Vec<Guide>,
    settings: Settings,
}

impl EventManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: CanvasState::default(),
            interaction: Interaction::Idle,
            touches: TouchTracker::new(),
            pointer_throttle: FrameThrottle::new(config.frame_interval_ms),
            wheel_throttle: FrameThrottle::new(config.frame_interval_ms),
            guides: Vec::new(),
            settings: Settings::from_config(config),
        }
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn mode(&self) -> CanvasMode {
        self.state.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn active(&self) -> Option<ComponentId> {
        self.state.active
    }

    pub fn box_rect(&self) -> Option<Rect> {
        self.state.box_rect
    }

    /// Alignment guides produced by the drag in progress.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn drag(&self) -> Option<&DragState> {
        match &self.interaction {
            Interaction::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.interaction, Interaction::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.interaction, Interaction::Panning { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging(_))
    }

    pub fn is_box_selecting(&self) -> bool {
        matches!(self.interaction, Interaction::BoxSelecting { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.interaction, Interaction::Pinching(_))
    }

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent, ctx: &InputContext<'_>) -> Vec<Action> {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer, ctx),
            InputEvent::Wheel(wheel) => self.handle_wheel(wheel, ctx),
            InputEvent::Touch(touch) => self.handle_touch(touch, ctx),
            InputEvent::Key(key) => self.handle_key(key),
        }
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent, ctx: &InputContext<'_>) -> Vec<Action> {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
                ..
            } => self.pointer_down(position, button, modifiers, ctx),
            PointerEvent::Move { position, time_ms, .. } => {
                self.pointer_move(position, time_ms, ctx)
            }
            PointerEvent::Up { position, .. } => self.pointer_up(position, ctx),
        }
    }

    fn pointer_down(
        &mut self,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        ctx: &InputContext<'_>,
    ) -> Vec<Action> {
        if !self.is_idle() {
            log::debug!("Ignoring pointer down while {}", self.interaction.name());
            return Vec::new();
        }
        self.pointer_throttle.reset();
        let local = ctx.to_local(position);

        let pan = button == MouseButton::Middle
            || (button == MouseButton::Left
                && (modifiers.alt || self.state.mode == CanvasMode::Pan));
        if pan {
            log::debug!("Pan start at {:?}", local);
            self.interaction = Interaction::Panning { last: local };
            return vec![Action::BeginViewportGesture];
        }
        if button != MouseButton::Left {
            return Vec::new();
        }

        let point = ctx.viewport.screen_to_canvas(local);
        match ctx.registry.hit_test(point) {
            Some(target) => self.begin_drag(target, point, modifiers, ctx),
            None => {
                let additive =
                    self.settings.multi_select && (modifiers.shift || modifiers.command());
                log::debug!("Box select start at {:?}", point);
                self.interaction = Interaction::BoxSelecting {
                    anchor: point,
                    current: point,
                    additive,
                };
                self.state.box_rect = Some(Rect::from_points(point, point));
                vec![Action::BoxChanged(self.state.box_rect)]
            }
        }
    }

    fn begin_drag(
        &mut self,
        target: ComponentId,
        point: Point,
        modifiers: Modifiers,
        ctx: &InputContext<'_>,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        let diff = if modifiers.shift && self.settings.multi_select {
            self.state.selection.add(target)
        } else if self.state.selection.contains(target) {
            SelectionDiff::default()
        } else {
            self.state.selection.replace([target])
        };
        if !diff.is_empty() {
            actions.push(Action::SelectionChanged(diff));
        }
        self.state.active = Some(target);

        let origins = self
            .state
            .selection
            .ids()
            .iter()
            .filter_map(|&id| ctx.registry.get(id))
            .filter(|c| !c.locked)
            .map(|c| (c.id, c.position))
            .collect();
        let target_origin = ctx.registry.get(target).map_or(point, |c| c.position);

        log::debug!("Drag start on {} at {:?}", target, point);
        self.interaction = Interaction::Dragging(DragState {
            target,
            start: point,
            target_origin,
            origins,
            delta: Vec2::ZERO,
        });
        actions
    }

    fn pointer_move(
        &mut self,
        position: Point,
        time_ms: f64,
        ctx: &InputContext<'_>,
    ) -> Vec<Action> {
        let local = ctx.to_local(position);
        match &mut self.interaction {
            Interaction::Idle | Interaction::Pinching(_) => Vec::new(),
            Interaction::Panning { last } => {
                if !self.pointer_throttle.admit(time_ms) {
                    return Vec::new();
                }
                let delta = local - *last;
                *last = local;
                if delta == Vec2::ZERO {
                    return Vec::new();
                }
                vec![Action::Pan {
                    dx: delta.x,
                    dy: delta.y,
                }]
            }
            Interaction::Dragging(drag) => {
                if !self.pointer_throttle.admit(time_ms) {
                    return Vec::new();
                }
                let delta = self.settings.drag_delta(drag, ctx.viewport.screen_to_canvas(local));
                if delta == drag.delta {
                    return Vec::new();
                }
                drag.delta = delta;
                let mut actions = vec![Action::MoveRequested {
                    updates: drag.updates(delta),
                    phase: MovePhase::Preview,
                }];
                let guides = self.settings.guides_for(drag, ctx.registry);
                if guides != self.guides {
                    self.guides = guides.clone();
                    actions.push(Action::GuidesChanged(guides));
                }
                actions
            }
            Interaction::BoxSelecting { anchor, current, .. } => {
                if !self.pointer_throttle.admit(time_ms) {
                    return Vec::new();
                }
                *current = ctx.viewport.screen_to_canvas(local);
                let rect = Rect::from_points(*anchor, *current);
                self.state.box_rect = Some(rect);
                vec![Action::BoxChanged(Some(rect))]
            }
        }
    }

    fn pointer_up(&mut self, position: Point, ctx: &InputContext<'_>) -> Vec<Action> {
        let local = ctx.to_local(position);
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => Vec::new(),
            Interaction::Pinching(pinch) => {
                // Pinches end when a finger lifts, not on pointer up.
                self.interaction = Interaction::Pinching(pinch);
                Vec::new()
            }
            Interaction::Panning { last } => {
                let delta = local - last;
                let mut actions = Vec::new();
                if delta != Vec2::ZERO {
                    actions.push(Action::Pan {
                        dx: delta.x,
                        dy: delta.y,
                    });
                }
                actions.push(Action::EndViewportGesture);
                log::debug!("Pan end");
                actions
            }
            Interaction::Dragging(drag) => {
                let delta = self.settings.drag_delta(&drag, ctx.viewport.screen_to_canvas(local));
                let mut actions = Vec::new();
                if delta != Vec2::ZERO || drag.delta != Vec2::ZERO {
                    actions.push(Action::MoveRequested {
                        updates: drag.updates(delta),
                        phase: MovePhase::Commit,
                    });
                }
                actions.extend(self.clear_guides());
                log::debug!("Drag end on {} with offset {:?}", drag.target, delta);
                actions
            }
            Interaction::BoxSelecting { anchor, additive, .. } => {
                let rect = Rect::from_points(anchor, ctx.viewport.screen_to_canvas(local));
                self.finish_box(rect, additive, ctx.registry)
            }
        }
    }

    fn finish_box(
        &mut self,
        rect: Rect,
        additive: bool,
        registry: &ComponentRegistry,
    ) -> Vec<Action> {
        self.state.box_rect = None;
        let mut hits = registry.query_rect(rect, self.settings.include_locked);
        if !self.settings.multi_select {
            // Frontmost only.
            hits = hits.pop().into_iter().collect();
        }
        log::debug!("Box select {:?} hit {} components", rect, hits.len());
        let diff = if additive {
            self.state.selection.extend(hits)
        } else {
            self.state.selection.replace(hits)
        };
        self.sync_active();

        let mut actions = vec![Action::BoxChanged(None)];
        if !diff.is_empty() {
            actions.push(Action::SelectionChanged(diff));
        }
        actions
    }

    fn clear_guides(&mut self) -> Option<Action> {
        if self.guides.is_empty() {
            return None;
        }
        self.guides.clear();
        Some(Action::GuidesChanged(Vec::new()))
    }

    pub fn handle_wheel(&mut self, event: &WheelEvent, ctx: &InputContext<'_>) -> Vec<Action> {
        let dy = event.delta.y;
        if dy == 0.0 || !dy.is_finite() {
            return Vec::new();
        }
        if !self.wheel_throttle.admit(event.time_ms) {
            return Vec::new();
        }
        let factor = if dy > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        vec![Action::ZoomAt {
            scale: ctx.viewport.scale * factor,
            center: ctx.to_local(event.position),
        }]
    }

    pub fn handle_touch(&mut self, event: &TouchEvent, ctx: &InputContext<'_>) -> Vec<Action> {
        let mut actions = Vec::new();
        for gesture in self.touches.process(event) {
            match gesture {
                TouchGesture::Pointer(pointer) => {
                    actions.extend(self.handle_pointer(&pointer, ctx))
                }
                TouchGesture::PinchStart { first, second, .. } => {
                    actions.extend(self.cancel_gesture());
                    let start_distance = first.distance(second);
                    log::debug!("Pinch start, finger distance {}", start_distance);
                    self.pointer_throttle.reset();
                    self.interaction = Interaction::Pinching(PinchState {
                        start_distance,
                        start_scale: ctx.viewport.scale,
                        last_mid: ctx.to_local(first.midpoint(second)),
                    });
                    actions.push(Action::BeginViewportGesture);
                }
                TouchGesture::PinchMove { first, second, time_ms } => {
                    let Interaction::Pinching(pinch) = &mut self.interaction else {
                        continue;
                    };
                    if pinch.start_distance <= f64::EPSILON
                        || !self.pointer_throttle.admit(time_ms)
                    {
                        continue;
                    }
                    let mid = ctx.to_local(first.midpoint(second));
                    let shift = mid - pinch.last_mid;
                    pinch.last_mid = mid;
                    if shift != Vec2::ZERO {
                        actions.push(Action::Pan {
                            dx: shift.x,
                            dy: shift.y,
                        });
                    }
                    actions.push(Action::ZoomAt {
                        scale: pinch.start_scale * first.distance(second) / pinch.start_distance,
                        center: mid,
                    });
                }
                TouchGesture::PinchEnd => {
                    if self.is_pinching() {
                        self.interaction = Interaction::Idle;
                        actions.push(Action::EndViewportGesture);
                    }
                }
                TouchGesture::Cancel => actions.extend(self.cancel_gesture()),
            }
        }
        actions
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Vec<Action> {
        match event {
            KeyEvent::Pressed { key, modifiers } => {
                if key == "Escape" && !self.is_idle() {
                    return self.cancel_gesture();
                }
                if !self.settings.keyboard_shortcuts {
                    return Vec::new();
                }
                if key == PAN_KEY {
                    return self.set_mode(CanvasMode::Pan);
                }
                match ShortcutRegistry::lookup(key, *modifiers) {
                    Some(Intent::Undo | Intent::Redo) if !self.is_idle() => {
                        log::debug!("Ignoring history shortcut while {}", self.interaction.name());
                        Vec::new()
                    }
                    Some(Intent::Undo) => vec![Action::Undo],
                    Some(Intent::Redo) => vec![Action::Redo],
                    Some(intent) => vec![Action::Intent(intent)],
                    None => Vec::new(),
                }
            }
            KeyEvent::Released { key, .. } if key == PAN_KEY => self.set_mode(CanvasMode::Select),
            KeyEvent::Released { .. } => Vec::new(),
        }
    }

    /// Abort the current gesture. A drag is reverted to its origin positions.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let interaction = std::mem::take(&mut self.interaction);
        if !matches!(interaction, Interaction::Idle) {
            log::debug!("Cancelling {}", interaction.name());
        }
        match interaction {
            Interaction::Idle => Vec::new(),
            Interaction::Panning { .. } | Interaction::Pinching(_) => {
                vec![Action::EndViewportGesture]
            }
            Interaction::Dragging(drag) => {
                let mut actions = Vec::new();
                if drag.delta != Vec2::ZERO {
                    actions.push(Action::MoveRequested {
                        updates: drag.updates(Vec2::ZERO),
                        phase: MovePhase::Revert,
                    });
                }
                actions.extend(self.clear_guides());
                actions
            }
            Interaction::BoxSelecting { .. } => {
                self.state.box_rect = None;
                vec![Action::BoxChanged(None)]
            }
        }
    }

    /// Switch the primary-button mode. Returns the change, if any.
    pub fn set_mode(&mut self, mode: CanvasMode) -> Vec<Action> {
        if self.state.mode == mode {
            return Vec::new();
        }
        log::debug!("Mode {:?} -> {:?}", self.state.mode, mode);
        self.state.mode = mode;
        vec![Action::ModeChanged(mode)]
    }

    fn sync_active(&mut self) {
        if let Some(active) = self.state.active {
            if !self.state.selection.contains(active) {
                self.state.active = None;
            }
        }
    }

    /// Replace the selection. With multi-select off only the first id is kept.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ComponentId>) -> SelectionDiff {
        let limit = if self.settings.multi_select { usize::MAX } else { 1 };
        let diff = self.state.selection.replace(ids.into_iter().take(limit));
        self.sync_active();
        diff
    }

    /// Add to the selection. With multi-select off this replaces it.
    pub fn add_to_selection(
        &mut self,
        ids: impl IntoIterator<Item = ComponentId>,
    ) -> SelectionDiff {
        if !self.settings.multi_select {
            return self.select(ids);
        }
        self.state.selection.extend(ids)
    }

    pub fn deselect(&mut self, id: ComponentId) -> SelectionDiff {
        let diff = self.state.selection.remove(id);
        self.sync_active();
        diff
    }

    pub fn clear_selection(&mut self) -> SelectionDiff {
        let diff = self.state.selection.clear();
        self.state.active = None;
        diff
    }

    /// Focus a selected component, or clear focus with `None`.
    ///
    /// Returns `false` if `id` is not selected.
    pub fn set_active(&mut self, id: Option<ComponentId>) -> bool {
        match id {
            Some(id) if !self.state.selection.contains(id) => false,
            _ => {
                self.state.active = id;
                true
            }
        }
    }

    /// Drop every reference to a component that no longer exists.
    ///
    /// Losing the drag target ends the drag and reverts the components that
    /// were still moving with it.
    pub fn forget(&mut self, id: ComponentId) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Interaction::Dragging(drag) = &mut self.interaction {
            drag.origins.retain(|(moving, _)| *moving != id);
            if drag.target == id {
                log::debug!("Drag target {} removed, ending drag", id);
                if drag.delta != Vec2::ZERO && !drag.origins.is_empty() {
                    actions.push(Action::MoveRequested {
                        updates: drag.updates(Vec2::ZERO),
                        phase: MovePhase::Revert,
                    });
                }
                self.interaction = Interaction::Idle;
                actions.extend(self.clear_guides());
            }
        }
        let diff = self.deselect(id);
        if !diff.is_empty() {
            actions.push(Action::SelectionChanged(diff));
        }
        actions
    }

    /// Return to defaults: idle, select mode, nothing selected.
    ///
    /// A drag in progress is dropped without a revert; a viewport gesture is
    /// closed.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if matches!(
            std::mem::take(&mut self.interaction),
            Interaction::Panning { .. } | Interaction::Pinching(_)
        ) {
            actions.push(Action::EndViewportGesture);
        }
        self.touches = TouchTracker::new();
        self.pointer_throttle.reset();
        self.wheel_throttle.reset();
        actions.extend(self.clear_guides());
        if self.state.box_rect.take().is_some() {
            actions.push(Action::BoxChanged(None));
        }
        actions.extend(self.set_mode(CanvasMode::Select));
        let diff = self.clear_selection();
        if !diff.is_empty() {
            actions.push(Action::SelectionChanged(diff));
        }
        actions
    }
}
