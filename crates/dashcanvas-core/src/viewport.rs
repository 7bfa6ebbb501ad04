//! Viewport transform and its manager.
//!
//! The viewport maps canvas-space coordinates (the dashboard's own units) to
//! surface-space coordinates (pixels relative to the mounting surface's
//! top-left corner):
//!
//! ```text
//! surface = translate(x, y) * rotate(rotation) * scale(scale) * canvas
//! ```
//!
//! [`ViewportManager`] is the only writer of the live [`Viewport`]; every
//! other part of the engine reads a copy.

use crate::config::EngineConfig;
use crate::history::History;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default multiplier for `zoom_in` / `zoom_out`.
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Translate/scale/rotate mapping from canvas space to surface space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal translation in surface pixels.
    pub x: f64,
    /// Vertical translation in surface pixels.
    pub y: f64,
    /// Uniform scale factor (1.0 = 100%).
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, scale: f64, rotation: f64) -> Self {
        Self { x, y, scale, rotation }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Get the affine transform for rendering (canvas → surface).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::rotate(self.rotation) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (surface → canvas).
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    /// Convert a surface-local point to canvas coordinates.
    ///
    /// With no rotation this is exactly `(p - offset) / scale`.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        let dx = p.x - self.x;
        let dy = p.y - self.y;
        let (sin, cos) = (-self.rotation).sin_cos();
        Point::new(
            (dx * cos - dy * sin) / self.scale,
            (dx * sin + dy * cos) / self.scale,
        )
    }

    /// Convert a canvas point to surface-local coordinates.
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        let sx = p.x * self.scale;
        let sy = p.y * self.scale;
        let (sin, cos) = self.rotation.sin_cos();
        Point::new(sx * cos - sy * sin + self.x, sx * sin + sy * cos + self.y)
    }

    /// Canvas-space bounding box of a surface of the given size.
    pub fn visible_rect(&self, surface: Size) -> Rect {
        let corners = [
            self.screen_to_canvas(Point::new(0.0, 0.0)),
            self.screen_to_canvas(Point::new(surface.width, 0.0)),
            self.screen_to_canvas(Point::new(surface.width, surface.height)),
            self.screen_to_canvas(Point::new(0.0, surface.height)),
        ];
        corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |r, &p| r.union_pt(p))
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }
}

/// Owns the live viewport, its scale bounds and its history.
#[derive(Debug, Clone)]
pub struct ViewportManager {
    viewport: Viewport,
    min_scale: f64,
    max_scale: f64,
    /// Design-surface size in canvas units.
    canvas_size: Size,
    /// Mounting surface size in pixels.
    container_size: Size,
    history: History<Viewport>,
    /// Set while a pan/pinch gesture is coalescing updates.
    in_gesture: bool,
    gesture_dirty: bool,
}

impl ViewportManager {
    /// Create a manager centered in the container at the configured initial scale.
    ///
    /// The configuration is expected to have passed [`EngineConfig::validate`].
    pub fn new(config: &EngineConfig, container_size: Size) -> Self {
        let mut manager = Self {
            viewport: Viewport::default(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            canvas_size: Size::new(config.width, config.height),
            container_size,
            history: History::new(Viewport::default(), config.history_size),
            in_gesture: false,
            gesture_dirty: false,
        };
        let scale = manager.clamp_scale(config.initial_scale);
        manager.viewport = manager.centered(scale);
        manager.history.reset(manager.viewport);
        manager
    }

    /// The current transform.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// Update the mounting surface size. The transform is left alone.
    pub fn set_container_size(&mut self, size: Size) {
        self.container_size = size;
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of retained snapshots, including the current one.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Transform that shows the canvas centered in the container at `scale`.
    fn centered(&self, scale: f64) -> Viewport {
        Viewport::new(
            (self.container_size.width - self.canvas_size.width * scale) / 2.0,
            (self.container_size.height - self.canvas_size.height * scale) / 2.0,
            scale,
            0.0,
        )
    }

    fn apply(&mut self, next: Viewport) -> bool {
        if !next.is_finite() {
            log::warn!("Ignoring non-finite viewport {:?}", next);
            return false;
        }
        let next = Viewport {
            scale: self.clamp_scale(next.scale),
            ..next
        };
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        if self.in_gesture {
            self.gesture_dirty = true;
        } else {
            self.history.push(next);
        }
        true
    }

    /// Set the transform, clamping the scale. Returns whether anything changed.
    ///
    /// Non-finite input is ignored.
    pub fn set_viewport(&mut self, x: f64, y: f64, scale: f64, rotation: f64) -> bool {
        self.apply(Viewport::new(x, y, scale, rotation))
    }

    /// Translate by a surface-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let v = self.viewport;
        self.set_viewport(v.x + dx, v.y + dy, v.scale, v.rotation)
    }

    /// Zoom to `target_scale`, keeping the surface point `center` fixed if given.
    pub fn zoom(&mut self, target_scale: f64, center: Option<Point>) -> bool {
        if !target_scale.is_finite() {
            log::warn!("Ignoring non-finite zoom target {}", target_scale);
            return false;
        }
        let v = self.viewport;
        let target = self.clamp_scale(target_scale);
        match center {
            None => self.set_viewport(v.x, v.y, target, v.rotation),
            Some(c) => {
                let ratio = target / v.scale;
                let x = c.x - (c.x - v.x) * ratio;
                let y = c.y - (c.y - v.y) * ratio;
                self.set_viewport(x, y, target, v.rotation)
            }
        }
    }

    pub fn zoom_in(&mut self, factor: f64) -> bool {
        self.zoom(self.viewport.scale * factor, None)
    }

    pub fn zoom_out(&mut self, factor: f64) -> bool {
        self.zoom(self.viewport.scale / factor, None)
    }

    /// Rotate by `delta` radians, keeping the surface point `center` fixed if given.
    pub fn rotate(&mut self, delta: f64, center: Option<Point>) -> bool {
        let v = self.viewport;
        let rotation = v.rotation + delta;
        match center {
            None => self.set_viewport(v.x, v.y, v.scale, rotation),
            Some(c) => {
                let offset = Affine::rotate(delta) * Point::new(v.x - c.x, v.y - c.y);
                self.set_viewport(c.x + offset.x, c.y + offset.y, v.scale, rotation)
            }
        }
    }

    /// Scale the whole canvas into the container minus `padding` on each side, centered.
    pub fn fit_to_container(&mut self, padding: f64) -> bool {
        let available = Size::new(
            (self.container_size.width - padding * 2.0).max(1.0),
            (self.container_size.height - padding * 2.0).max(1.0),
        );
        let scale = (available.width / self.canvas_size.width)
            .min(available.height / self.canvas_size.height);
        let target = self.centered(self.clamp_scale(scale));
        self.apply(target)
    }

    /// Scale the canvas width into the container, centered both ways.
    pub fn fit_to_width(&mut self, padding: f64) -> bool {
        let available = (self.container_size.width - padding * 2.0).max(1.0);
        let target = self.centered(self.clamp_scale(available / self.canvas_size.width));
        self.apply(target)
    }

    /// Scale 1, canvas centered in the container.
    pub fn reset(&mut self) -> bool {
        let target = self.centered(self.clamp_scale(1.0));
        self.apply(target)
    }

    /// Start coalescing changes into a single history entry.
    pub fn begin_gesture(&mut self) {
        self.in_gesture = true;
        self.gesture_dirty = false;
    }

    /// Finish a gesture, recording one entry if the transform moved.
    pub fn end_gesture(&mut self) -> bool {
        let recorded = self.in_gesture && self.gesture_dirty;
        if recorded {
            self.history.push(self.viewport);
        }
        self.in_gesture = false;
        self.gesture_dirty = false;
        recorded
    }

    pub fn in_gesture(&self) -> bool {
        self.in_gesture
    }

    /// Restore the previous snapshot. No-op at the oldest entry.
    ///
    /// A gesture in progress is committed first and then keeps coalescing.
    pub fn undo(&mut self) -> bool {
        self.step_history(History::undo)
    }

    /// Restore the next snapshot. No-op at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.step_history(History::redo)
    }

    fn step_history(&mut self, step: fn(&mut History<Viewport>) -> Option<Viewport>) -> bool {
        let resume = self.in_gesture;
        self.end_gesture();
        let changed = match step(&mut self.history) {
            Some(viewport) => {
                self.viewport = viewport;
                true
            }
            None => false,
        };
        if resume {
            self.begin_gesture();
        }
        changed
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        self.viewport.screen_to_canvas(p)
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        self.viewport.canvas_to_screen(p)
    }

    /// Canvas-space rectangle currently visible in the container.
    pub fn visible_canvas_rect(&self) -> Rect {
        self.viewport.visible_rect(self.container_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn manager(initial: f64, min: f64, max: f64) -> ViewportManager {
        let config = EngineConfig::new()
            .with_size(1000.0, 500.0)
            .with_scale(initial, min, max);
        ViewportManager::new(&config, Size::new(800.0, 600.0))
    }

    #[test]
    fn test_initial_viewport_is_centered() {
        let vm = manager(1.0, 0.1, 5.0);
        let v = vm.viewport();
        assert!((v.x - (-100.0)).abs() < TOL);
        assert!((v.y - 50.0).abs() < TOL);
        assert!((v.scale - 1.0).abs() < f64::EPSILON);
        assert!(!vm.can_undo());
    }

    #[test]
    fn test_screen_to_canvas_formula() {
        let v = Viewport::new(30.0, -20.0, 2.0, 0.0);
        let canvas = v.screen_to_canvas(Point::new(130.0, 80.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_with_rotation() {
        let v = Viewport::new(30.0, -20.0, 1.5, 0.4);
        let original = Point::new(123.0, 456.0);
        let back = v.canvas_to_screen(v.screen_to_canvas(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);

        let affine = v.transform() * Point::new(10.0, 20.0);
        let manual = v.canvas_to_screen(Point::new(10.0, 20.0));
        assert!((affine.x - manual.x).abs() < 1e-10);
        assert!((affine.y - manual.y).abs() < 1e-10);
    }

    #[test]
    fn test_scale_clamping() {
        let mut vm = manager(1.0, 0.5, 2.0);
        for requested in [-3.0, 0.0, 0.1, 0.5, 1.3, 2.0, 7.0, 1e9] {
            vm.set_viewport(0.0, 0.0, requested, 0.0);
            let s = vm.scale();
            assert!((0.5..=2.0).contains(&s), "scale {s} out of bounds for {requested}");
        }
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut vm = manager(1.0, 0.1, 5.0);
        let before = vm.viewport();
        assert!(!vm.set_viewport(f64::NAN, 0.0, 1.0, 0.0));
        assert!(!vm.set_viewport(0.0, f64::INFINITY, 1.0, 0.0));
        assert!(!vm.zoom(f64::NAN, None));
        assert!(!vm.pan(f64::NEG_INFINITY, 0.0));
        assert_eq!(vm.viewport(), before);
        assert_eq!(vm.history_len(), 1);
    }

    #[test]
    fn test_zoom_to_point_invariance() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.set_viewport(37.0, -12.0, 1.3, 0.0);
        for (center, target) in [
            (Point::new(400.0, 300.0), 2.5),
            (Point::new(0.0, 0.0), 0.4),
            (Point::new(799.0, 17.0), 4.9),
            (Point::new(250.0, 550.0), 30.0),
        ] {
            let anchor = vm.screen_to_canvas(center);
            vm.zoom(target, Some(center));
            let after = vm.canvas_to_screen(anchor);
            assert!((after.x - center.x).abs() < 1e-9);
            assert!((after.y - center.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_formula_exact() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.set_viewport(100.0, 50.0, 1.0, 0.0);
        vm.zoom(2.0, Some(Point::new(300.0, 250.0)));
        let v = vm.viewport();
        assert!((v.x - (300.0 - (300.0 - 100.0) * 2.0)).abs() < f64::EPSILON);
        assert!((v.y - (250.0 - (250.0 - 50.0) * 2.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_without_center_keeps_offset() {
        let mut vm = manager(1.0, 0.1, 5.0);
        let before = vm.viewport();
        vm.zoom(3.0, None);
        assert!((vm.viewport().x - before.x).abs() < f64::EPSILON);
        assert!((vm.scale() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_in_out() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.zoom_in(DEFAULT_ZOOM_STEP);
        assert!((vm.scale() - 1.2).abs() < 1e-12);
        vm.zoom_out(DEFAULT_ZOOM_STEP);
        assert!((vm.scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_about_center_keeps_point() {
        let mut vm = manager(1.0, 0.1, 5.0);
        let center = Point::new(400.0, 300.0);
        let anchor = vm.screen_to_canvas(center);
        vm.rotate(0.7, Some(center));
        let after = vm.canvas_to_screen(anchor);
        assert!((after.x - center.x).abs() < 1e-9);
        assert!((after.y - center.y).abs() < 1e-9);
        assert!((vm.viewport().rotation - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_container() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.fit_to_container(50.0);
        // available 700x500 for a 1000x500 canvas → limited by width
        let v = vm.viewport();
        assert!((v.scale - 0.7).abs() < 1e-12);
        assert!((v.x - 50.0).abs() < 1e-9);
        assert!((v.y - (600.0 - 350.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_width() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.fit_to_width(0.0);
        let v = vm.viewport();
        assert!((v.scale - 0.8).abs() < 1e-12);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - (600.0 - 400.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_recenters() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.set_viewport(3.0, 4.0, 2.0, 0.5);
        vm.reset();
        let v = vm.viewport();
        assert!((v.scale - 1.0).abs() < f64::EPSILON);
        assert!((v.x - (-100.0)).abs() < TOL);
        assert!((v.y - 50.0).abs() < TOL);
        assert!(v.rotation.abs() < f64::EPSILON);
    }

    #[test]
    fn test_undo_redo_boundaries_are_noops() {
        let mut vm = manager(1.0, 0.1, 5.0);
        let initial = vm.viewport();
        assert!(!vm.undo());
        assert_eq!(vm.viewport(), initial);

        vm.pan(10.0, 0.0);
        let panned = vm.viewport();
        assert!(!vm.redo());
        assert_eq!(vm.viewport(), panned);

        assert!(vm.undo());
        assert_eq!(vm.viewport(), initial);
        assert!(!vm.undo());
        assert_eq!(vm.viewport(), initial);
    }

    #[test]
    fn test_new_change_after_undo_discards_redo() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.pan(10.0, 0.0);
        vm.pan(10.0, 0.0);
        vm.undo();
        vm.pan(0.0, 5.0);
        assert!(!vm.can_redo());
    }

    #[test]
    fn test_history_evicts_beyond_capacity() {
        let config = EngineConfig::new().with_history_size(5);
        let mut vm = ViewportManager::new(&config, Size::new(800.0, 600.0));
        let origin = vm.viewport();
        for _ in 0..8 {
            vm.pan(1.0, 0.0);
        }
        for _ in 0..5 {
            vm.undo();
        }
        // Oldest retained is after 4 pans; the original is gone.
        assert!((vm.viewport().x - (origin.x + 4.0)).abs() < TOL);
        assert_ne!(vm.viewport(), origin);
    }

    #[test]
    fn test_gesture_coalesces_history() {
        let mut vm = manager(1.0, 0.1, 5.0);
        vm.begin_gesture();
        for _ in 0..10 {
            vm.pan(3.0, 1.0);
        }
        assert!(vm.end_gesture());
        assert_eq!(vm.history_len(), 2);
        vm.undo();
        assert!(!vm.can_undo());
    }

    #[test]
    fn test_undo_mid_gesture_keeps_coalescing() {
        let mut vm = manager(1.0, 0.1, 5.0);
        let start = vm.viewport();
        vm.begin_gesture();
        vm.pan(5.0, 0.0);
        assert!(vm.undo());
        assert_eq!(vm.viewport(), start);
        assert!(vm.in_gesture());

        for _ in 0..30 {
            vm.pan(1.0, 1.0);
        }
        assert_eq!(vm.history_len(), 2);
        assert!(vm.end_gesture());
        assert_eq!(vm.history_len(), 2);
        assert!(vm.undo());
        assert_eq!(vm.viewport(), start);
    }

    #[test]
    fn test_scale_sequence_scenario() {
        let mut vm = manager(1.0, 0.5, 2.0);
        vm.zoom(3.0, None);
        assert!((vm.scale() - 2.0).abs() < f64::EPSILON);
        vm.zoom_in(DEFAULT_ZOOM_STEP);
        assert!((vm.scale() - 2.0).abs() < f64::EPSILON);
        vm.reset();
        assert!((vm.scale() - 1.0).abs() < f64::EPSILON);

        let mut seen = Vec::new();
        for _ in 0..3 {
            vm.undo();
            seen.push(vm.scale());
        }
        assert_eq!(seen, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_visible_rect() {
        let v = Viewport::new(0.0, 0.0, 2.0, 0.0);
        let r = v.visible_rect(Size::new(100.0, 100.0));
        assert!(r.x0.abs() < f64::EPSILON);
        assert!((r.x1 - 50.0).abs() < f64::EPSILON);
        assert!((r.y1 - 50.0).abs() < f64::EPSILON);
    }
}
