//! Overlay surface abstraction and the render manager.

use dashcanvas_core::config::{EngineConfig, GridConfig, GridStyle, Palette};
use dashcanvas_core::snap::{Guide, GuideOrientation};
use dashcanvas_core::viewport::Viewport;
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Grid passes above this many lines per axis are skipped.
pub const MAX_GRID_LINES: i64 = 4096;
/// Selection handle edge length in surface pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Grid dot half-size in surface pixels.
const DOT_RADIUS: f64 = 1.5;

/// Tolerance, in grid cells, for a visible edge that lands on a grid line.
const GRID_EPSILON: f64 = 1e-9;

/// Renderer errors.
#[derive(Debug, Error, PartialEq)]
pub enum RendererError {
    #[error("Overlay surface has been detached")]
    Detached,
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A 2D drawing target dedicated to overlays.
///
/// Coordinates passed to the drawing methods are mapped through the current
/// transform, so callers draw in canvas units after `set_transform`.
pub trait OverlaySurface {
    /// Surface size in pixels.
    fn size(&self) -> Size;

    fn resize(&mut self, size: Size);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    fn set_transform(&mut self, transform: Affine);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);

    fn stroke_rect(&mut self, rect: Rect, width: f64, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Remove the surface from its container. Drawing afterwards is undefined.
    fn detach(&mut self);
}

/// Context for a single overlay frame.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Transform the overlays are drawn under.
    pub viewport: Viewport,
    /// Union of the selected components' bounds, canvas units.
    pub selection_bounds: Option<Rect>,
    /// Box-select rectangle, canvas units.
    pub box_rect: Option<Rect>,
    /// Guides to draw: static ones plus any transient alignment guides.
    pub guides: Vec<Guide>,
}

impl RenderContext {
    /// Create a new render context.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Set the selection bounding box.
    pub fn with_selection(mut self, bounds: Option<Rect>) -> Self {
        self.selection_bounds = bounds;
        self
    }

    /// Set the box-select rectangle.
    pub fn with_box(mut self, rect: Option<Rect>) -> Self {
        self.box_rect = rect;
        self
    }

    /// Append guides.
    pub fn with_guides(mut self, guides: impl IntoIterator<Item = Guide>) -> Self {
        self.guides.extend(guides);
        self
    }

    /// Stroke width that renders as `px` surface pixels at the current zoom.
    fn hairline(&self, px: f64) -> f64 {
        px / self.viewport.scale
    }
}

/// Paints grid, guides and selection onto an overlay surface.
///
/// Holds no interaction state of its own; every frame is derived from the
/// [`RenderContext`] it is given.
pub struct RenderManager {
    surface: Box<dyn OverlaySurface>,
    grid: GridConfig,
    guides_enabled: bool,
    palette: Palette,
    attached: bool,
}

impl RenderManager {
    pub fn new(surface: Box<dyn OverlaySurface>, config: &EngineConfig) -> Self {
        Self {
            surface,
            grid: config.grid.clone(),
            guides_enabled: config.guides.enabled,
            palette: config.palette(),
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn surface_size(&self) -> Size {
        self.surface.size()
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Replace the grid settings. Takes effect on the next render.
    pub fn set_grid(&mut self, grid: GridConfig) {
        self.grid = grid;
    }

    pub fn set_guides_enabled(&mut self, enabled: bool) {
        self.guides_enabled = enabled;
    }

    fn ensure_attached(&self) -> RenderResult<()> {
        if self.attached {
            Ok(())
        } else {
            Err(RendererError::Detached)
        }
    }

    /// Canvas-space grid extent covering the visible area, as line indices.
    fn grid_indices(&self, visible: Rect) -> Option<(i64, i64, i64, i64)> {
        let size = self.grid.size;
        let start_x = (visible.x0 / size).floor() as i64;
        let start_y = (visible.y0 / size).floor() as i64;
        let end_x = (visible.x1 / size + GRID_EPSILON).floor() as i64;
        let end_y = (visible.y1 / size + GRID_EPSILON).floor() as i64;
        if end_x - start_x > MAX_GRID_LINES || end_y - start_y > MAX_GRID_LINES {
            log::debug!("Grid too dense at size {}, skipping", size);
            return None;
        }
        Some((start_x, start_y, end_x, end_y))
    }

    /// Draw the grid beneath everything else.
    pub fn render_grid(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_attached()?;
        if !self.grid.enabled || self.grid.size <= 0.0 {
            return Ok(());
        }
        let visible = ctx.viewport.visible_rect(self.surface.size());
        let Some((start_x, start_y, end_x, end_y)) = self.grid_indices(visible) else {
            return Ok(());
        };
        let size = self.grid.size;
        let color = self.palette.grid;
        self.surface.set_transform(ctx.viewport.transform());

        match self.grid.style {
            GridStyle::Lines => {
                let width = ctx.hairline(1.0);
                let (top, bottom) = (start_y as f64 * size, visible.y1);
                let (left, right) = (start_x as f64 * size, visible.x1);
                for i in start_x..=end_x {
                    let x = i as f64 * size;
                    self.surface
                        .stroke_line(Point::new(x, top), Point::new(x, bottom), width, color);
                }
                for j in start_y..=end_y {
                    let y = j as f64 * size;
                    self.surface
                        .stroke_line(Point::new(left, y), Point::new(right, y), width, color);
                }
            }
            GridStyle::Dots => {
                let r = ctx.hairline(DOT_RADIUS);
                for i in start_x..=end_x {
                    for j in start_y..=end_y {
                        let (x, y) = (i as f64 * size, j as f64 * size);
                        self.surface.fill_rect(Rect::new(x - r, y - r, x + r, y + r), color);
                    }
                }
            }
        }
        Ok(())
    }

    /// Draw guide lines across the visible area.
    pub fn render_guides(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_attached()?;
        if !self.guides_enabled || ctx.guides.is_empty() {
            return Ok(());
        }
        let visible = ctx.viewport.visible_rect(self.surface.size());
        let width = ctx.hairline(1.0);
        let color = self.palette.guide;
        self.surface.set_transform(ctx.viewport.transform());

        for guide in &ctx.guides {
            let (from, to) = match guide.orientation {
                GuideOrientation::Vertical => (
                    Point::new(guide.position, visible.y0),
                    Point::new(guide.position, visible.y1),
                ),
                GuideOrientation::Horizontal => (
                    Point::new(visible.x0, guide.position),
                    Point::new(visible.x1, guide.position),
                ),
            };
            self.surface.stroke_line(from, to, width, color);
        }
        Ok(())
    }

    /// Draw the box-select rectangle and the selection bounding box with corner handles.
    pub fn render_selection(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_attached()?;
        if ctx.selection_bounds.is_none() && ctx.box_rect.is_none() {
            return Ok(());
        }
        self.surface.set_transform(ctx.viewport.transform());
        let stroke = ctx.hairline(1.0);

        if let Some(rect) = ctx.box_rect {
            self.surface.fill_rect(rect, self.palette.box_fill);
            self.surface.stroke_rect(rect, stroke, self.palette.selection);
        }

        if let Some(bounds) = ctx.selection_bounds {
            self.surface
                .stroke_rect(bounds, ctx.hairline(1.5), self.palette.selection);

            let half = ctx.hairline(HANDLE_SIZE) / 2.0;
            let corners = [
                Point::new(bounds.x0, bounds.y0),
                Point::new(bounds.x1, bounds.y0),
                Point::new(bounds.x1, bounds.y1),
                Point::new(bounds.x0, bounds.y1),
            ];
            for corner in corners {
                let handle =
                    Rect::new(corner.x - half, corner.y - half, corner.x + half, corner.y + half);
                self.surface.fill_rect(handle, self.palette.handle_fill);
                self.surface.stroke_rect(handle, stroke, self.palette.selection);
            }
        }
        Ok(())
    }

    /// Repaint every overlay: grid, then guides, then selection.
    pub fn render(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_attached()?;
        self.surface.clear();
        self.render_grid(ctx)?;
        self.render_guides(ctx)?;
        self.render_selection(ctx)
    }

    /// Resize the overlay surface and repaint it.
    pub fn resize(&mut self, size: Size, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_attached()?;
        if !(size.width.is_finite()
            && size.height.is_finite()
            && size.width >= 0.0
            && size.height >= 0.0)
        {
            return Err(RendererError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        self.surface.resize(size);
        self.render(ctx)
    }

    /// Clear and detach the surface. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.attached {
            return;
        }
        self.surface.clear();
        self.surface.detach();
        self.attached = false;
        log::debug!("Overlay surface detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, DrawLog, RecordingSurface};
    use dashcanvas_core::config::SerializableColor;

    fn manager(config: &EngineConfig, size: Size) -> (RenderManager, DrawLog) {
        let surface = RecordingSurface::new(size);
        let log = surface.log();
        (RenderManager::new(Box::new(surface), config), log)
    }

    fn lines(log: &DrawLog) -> Vec<(Point, Point, f64)> {
        log.commands()
            .into_iter()
            .filter_map(|command| match command {
                DrawCommand::Line { from, to, width, .. } => Some((from, to, width)),
                _ => None,
            })
            .collect()
    }

    fn grid_config(size: f64, style: GridStyle) -> EngineConfig {
        EngineConfig::default().with_grid(GridConfig {
            size,
            style,
            ..GridConfig::default()
        })
    }

    #[test]
    fn test_grid_line_count() {
        let config = grid_config(10.0, GridStyle::Lines);
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        let ctx = RenderContext::new(Viewport::new(0.0, 0.0, 2.0, 0.0));
        renderer.render_grid(&ctx).unwrap();

        let drawn = lines(&log);
        let vertical: Vec<f64> = drawn
            .iter()
            .filter(|(from, to, _)| from.x == to.x)
            .map(|(from, _, _)| from.x)
            .collect();
        assert_eq!(vertical, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let horizontal = drawn.iter().filter(|(from, to, _)| from.y == to.y).count();
        assert_eq!(horizontal, 6);
    }

    #[test]
    fn test_grid_line_width_is_inverse_of_scale() {
        let config = grid_config(10.0, GridStyle::Lines);
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        let ctx = RenderContext::new(Viewport::new(0.0, 0.0, 4.0, 0.0));
        renderer.render_grid(&ctx).unwrap();

        for (_, _, width) in lines(&log) {
            assert!((width - 0.25).abs() < f64::EPSILON);
        }
        assert!(log.commands().contains(&DrawCommand::SetTransform(Affine::scale(4.0))));
    }

    #[test]
    fn test_grid_starts_before_visible_edge() {
        let config = grid_config(10.0, GridStyle::Lines);
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        // Offset by 15px at scale 1: visible canvas x runs -15..85.
        let ctx = RenderContext::new(Viewport::new(15.0, 0.0, 1.0, 0.0));
        renderer.render_grid(&ctx).unwrap();

        let vertical: Vec<f64> = lines(&log)
            .iter()
            .filter(|(from, to, _)| from.x == to.x)
            .map(|(from, _, _)| from.x)
            .collect();
        assert_eq!(vertical.first(), Some(&-20.0));
        assert_eq!(vertical.last(), Some(&80.0));
    }

    #[test]
    fn test_grid_ends_on_or_before_far_edge() {
        let config = grid_config(10.0, GridStyle::Lines);
        let vertical = |surface: Size, scale: f64| {
            let (mut renderer, log) = manager(&config, surface);
            let ctx = RenderContext::new(Viewport::new(0.0, 0.0, scale, 0.0));
            renderer.render_grid(&ctx).unwrap();
            lines(&log)
                .iter()
                .filter(|(from, to, _)| from.x == to.x)
                .map(|(from, _, _)| from.x)
                .collect::<Vec<f64>>()
        };

        // Float noise past a grid line adds no extra line.
        let noisy = vertical(Size::new(100.0000002, 100.0), 2.0);
        assert_eq!(noisy.len(), 6);
        assert_eq!(noisy.last(), Some(&50.0));

        let partial = vertical(Size::new(95.0, 95.0), 1.0);
        assert_eq!(partial.last(), Some(&90.0));
    }

    #[test]
    fn test_grid_dots() {
        let config = grid_config(10.0, GridStyle::Dots);
        let (mut renderer, log) = manager(&config, Size::new(20.0, 20.0));
        renderer.render_grid(&RenderContext::new(Viewport::default())).unwrap();

        let dots = log
            .commands()
            .into_iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(dots, 9);
        assert!(lines(&log).is_empty());
    }

    #[test]
    fn test_disabled_grid_draws_nothing() {
        let mut config = EngineConfig::default();
        config.grid.enabled = false;
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        renderer.render_grid(&RenderContext::new(Viewport::default())).unwrap();
        assert!(log.commands().is_empty());
    }

    #[test]
    fn test_render_order_grid_guides_selection() {
        let config = grid_config(50.0, GridStyle::Lines);
        let palette = config.palette();
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        let ctx = RenderContext::new(Viewport::default())
            .with_guides([Guide::vertical(25.0)])
            .with_selection(Some(Rect::new(10.0, 10.0, 40.0, 40.0)));
        renderer.render(&ctx).unwrap();

        let commands = log.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Clear));

        let grid_color: SerializableColor = palette.grid.into();
        let guide_color: SerializableColor = palette.guide.into();
        let last_grid = commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Line { color, .. } if *color == grid_color))
            .unwrap();
        let guide = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Line { color, .. } if *color == guide_color))
            .unwrap();
        let first_selection = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .unwrap();
        assert!(last_grid < guide);
        assert!(guide < first_selection);
    }

    #[test]
    fn test_guides_span_visible_area() {
        let (mut renderer, log) = manager(&EngineConfig::default(), Size::new(200.0, 100.0));
        let ctx = RenderContext::new(Viewport::new(0.0, 0.0, 2.0, 0.0))
            .with_guides([Guide::horizontal(30.0)]);
        renderer.render_guides(&ctx).unwrap();

        assert_eq!(
            lines(&log),
            vec![(Point::new(0.0, 30.0), Point::new(100.0, 30.0), 0.5)]
        );
    }

    #[test]
    fn test_selection_box_and_handles() {
        let (mut renderer, log) = manager(&EngineConfig::default(), Size::new(100.0, 100.0));
        let ctx = RenderContext::new(Viewport::default())
            .with_selection(Some(Rect::new(0.0, 0.0, 50.0, 50.0)))
            .with_box(Some(Rect::new(60.0, 60.0, 90.0, 90.0)));
        renderer.render_selection(&ctx).unwrap();

        let commands = log.commands();
        let stroked = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .count();
        // Box outline, selection outline and four handles.
        assert_eq!(stroked, 6);
        assert!(commands.contains(&DrawCommand::FillRect {
            rect: Rect::new(-4.0, -4.0, 4.0, 4.0),
            color: renderer.palette.handle_fill.into(),
        }));
    }

    #[test]
    fn test_nothing_selected_draws_nothing() {
        let (mut renderer, log) = manager(&EngineConfig::default(), Size::new(100.0, 100.0));
        renderer.render_selection(&RenderContext::new(Viewport::default())).unwrap();
        assert!(log.commands().is_empty());
    }

    #[test]
    fn test_resize_then_full_repaint() {
        let config = grid_config(10.0, GridStyle::Lines);
        let (mut renderer, log) = manager(&config, Size::new(100.0, 100.0));
        renderer
            .resize(Size::new(20.0, 10.0), &RenderContext::new(Viewport::default()))
            .unwrap();

        let commands = log.commands();
        assert_eq!(commands[0], DrawCommand::Resize(Size::new(20.0, 10.0)));
        assert_eq!(commands[1], DrawCommand::Clear);
        assert_eq!(renderer.surface_size(), Size::new(20.0, 10.0));
        // 3 vertical + 2 horizontal lines on a 20x10 surface.
        assert_eq!(lines(&log).len(), 5);
    }

    #[test]
    fn test_resize_rejects_invalid_size() {
        let (mut renderer, _log) = manager(&EngineConfig::default(), Size::new(100.0, 100.0));
        let result = renderer.resize(Size::new(f64::NAN, 10.0), &RenderContext::default());
        assert!(matches!(result, Err(RendererError::InvalidSize { .. })));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut renderer, log) = manager(&EngineConfig::default(), Size::new(100.0, 100.0));
        renderer.destroy();
        renderer.destroy();
        assert!(!renderer.is_attached());
        let detaches = log
            .commands()
            .into_iter()
            .filter(|c| *c == DrawCommand::Detach)
            .count();
        assert_eq!(detaches, 1);
        assert_eq!(
            renderer.render(&RenderContext::default()),
            Err(RendererError::Detached)
        );
    }
}
