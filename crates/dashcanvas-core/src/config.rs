//! Engine configuration.
//!
//! Every field has a documented default so a host can deserialize a partial
//! JSON object (or nothing at all) and still get a usable engine.

use crate::error::{ConfigError, ConfigResult};
use crate::snap::Guide;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Default design-surface width in canvas units.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1920.0;
/// Default design-surface height in canvas units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1080.0;
/// Default lower scale bound.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;
/// Default upper scale bound.
pub const DEFAULT_MAX_SCALE: f64 = 5.0;
/// Default number of retained viewport snapshots.
pub const DEFAULT_HISTORY_SIZE: usize = 50;
/// Default grid spacing in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;
/// Default padding used by fit operations, in surface pixels.
pub const DEFAULT_FIT_PADDING: f64 = 40.0;
/// One animation frame at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;
/// Default distance (canvas units) under which edges count as aligned.
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 5.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<SerializableColor> for Color {
    fn from(c: SerializableColor) -> Self {
        Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

/// Overlay color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Resolved overlay colors for a theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub grid: Color,
    pub guide: Color,
    pub selection: Color,
    pub handle_fill: Color,
    pub box_fill: Color,
}

impl Theme {
    /// Overlay colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                grid: Color::from_rgba8(200, 200, 200, 100),
                guide: Color::from_rgba8(236, 72, 153, 255),
                selection: Color::from_rgba8(59, 130, 246, 255),
                handle_fill: Color::WHITE,
                box_fill: Color::from_rgba8(59, 130, 246, 40),
            },
            Theme::Dark => Palette {
                grid: Color::from_rgba8(90, 90, 90, 120),
                guide: Color::from_rgba8(244, 114, 182, 255),
                selection: Color::from_rgba8(96, 165, 250, 255),
                handle_fill: Color::from_rgba8(30, 30, 30, 255),
                box_fill: Color::from_rgba8(96, 165, 250, 48),
            },
        }
    }
}

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStyle {
    /// Full grid lines.
    #[default]
    Lines,
    /// Only dots at intersections.
    Dots,
}

/// Grid overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    /// Spacing between grid lines in canvas units.
    pub size: f64,
    pub style: GridStyle,
    /// Overrides the theme's grid color.
    pub color: Option<SerializableColor>,
    /// Snap dragged components to grid intersections.
    pub snap: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: DEFAULT_GRID_SIZE,
            style: GridStyle::Lines,
            color: None,
            snap: false,
        }
    }
}

/// Guide overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub enabled: bool,
    /// Static guides placed by the user, in canvas units.
    pub guides: Vec<Guide>,
    /// Show transient alignment guides while dragging.
    pub alignment: bool,
    /// Alignment distance in canvas units.
    pub threshold: f64,
    /// Overrides the theme's guide color.
    pub color: Option<SerializableColor>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            guides: Vec::new(),
            alignment: true,
            threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            color: None,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Design-surface width in canvas units.
    pub width: f64,
    /// Design-surface height in canvas units.
    pub height: f64,
    pub initial_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Number of viewport snapshots kept for undo/redo.
    pub history_size: usize,
    pub grid: GridConfig,
    pub guides: GuideConfig,
    /// Allow shift-click and box-select to hold more than one component.
    pub multi_select: bool,
    pub keyboard_shortcuts: bool,
    pub theme: Theme,
    /// Let box-select pick up locked components.
    pub box_select_includes_locked: bool,
    /// Padding for `fit_to_container`, in surface pixels.
    pub fit_padding: f64,
    /// Minimum spacing between throttled input updates.
    pub frame_interval_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            initial_scale: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            history_size: DEFAULT_HISTORY_SIZE,
            grid: GridConfig::default(),
            guides: GuideConfig::default(),
            multi_select: true,
            keyboard_shortcuts: true,
            theme: Theme::Light,
            box_select_includes_locked: false,
            fit_padding: DEFAULT_FIT_PADDING,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Set the design-surface dimensions.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the initial scale and the clamping bounds.
    pub fn with_scale(mut self, initial: f64, min: f64, max: f64) -> Self {
        self.initial_scale = initial;
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_guides(mut self, guides: GuideConfig) -> Self {
        self.guides = guides;
        self
    }

    pub fn with_multi_select(mut self, enabled: bool) -> Self {
        self.multi_select = enabled;
        self
    }

    pub fn with_keyboard_shortcuts(mut self, enabled: bool) -> Self {
        self.keyboard_shortcuts = enabled;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_box_select_locked(mut self, enabled: bool) -> Self {
        self.box_select_includes_locked = enabled;
        self
    }

    /// Check numeric bounds. Called by the engine before anything is built.
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ConfigError::InvalidScaleBounds { min, max });
        }
        if !self.initial_scale.is_finite() || self.initial_scale <= 0.0 {
            return Err(ConfigError::InvalidInitialScale(self.initial_scale));
        }
        if !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.history_size == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if !self.grid.size.is_finite() || self.grid.size <= 0.0 {
            return Err(ConfigError::InvalidGridSize(self.grid.size));
        }
        Ok(())
    }

    /// Colors for overlays, with per-overlay overrides applied.
    pub fn palette(&self) -> Palette {
        let mut palette = self.theme.palette();
        if let Some(color) = self.grid.color {
            palette.grid = color.into();
        }
        if let Some(color) = self.guides.color {
            palette.guide = color.into();
        }
        palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.min_scale - 0.1).abs() < f64::EPSILON);
        assert!((config.max_scale - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.history_size, 50);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            EngineConfig::from_json(r#"{"min_scale": 0.5, "grid": {"size": 10}}"#).unwrap();
        assert!((config.min_scale - 0.5).abs() < f64::EPSILON);
        assert!((config.grid.size - 10.0).abs() < f64::EPSILON);
        assert!(config.grid.enabled);
        assert!(config.multi_select);
    }

    #[test]
    fn test_from_json_rejects_inverted_bounds() {
        let err = EngineConfig::from_json(r#"{"min_scale": 3, "max_scale": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScaleBounds { .. }));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = EngineConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_dimensions_and_history() {
        let config = EngineConfig::new().with_size(0.0, 100.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDimensions { .. })));

        let config = EngineConfig::new().with_history_size(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroHistoryCapacity)));

        let config = EngineConfig::new().with_scale(f64::NAN, 0.1, 5.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInitialScale(_))));
    }

    #[test]
    fn test_palette_override() {
        let mut config = EngineConfig::new();
        config.grid.color = Some(SerializableColor::new(1, 2, 3, 255));
        let palette = config.palette();
        assert_eq!(SerializableColor::from(palette.grid), SerializableColor::new(1, 2, 3, 255));
    }

    #[test]
    fn test_json_roundtrip_keeps_theme() {
        let config = EngineConfig::new().with_theme(Theme::Dark);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"dark\""));
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back.theme, Theme::Dark);
    }
}
