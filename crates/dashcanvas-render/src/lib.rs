//! DashCanvas Render Library
//!
//! Overlay surface abstraction and the render manager that paints the grid,
//! guides and selection on top of the dashboard canvas. Component content is
//! never drawn here.

pub mod recording;
mod renderer;

pub use recording::{DrawCommand, DrawLog, RecordingSurface};
pub use renderer::{
    HANDLE_SIZE, MAX_GRID_LINES, OverlaySurface, RenderContext, RenderManager, RenderResult,
    RendererError,
};
