//! Pulse Render - turns simulation state into pixels
//!
//! This crate projects simulation-space points to the screen, shades heart
//! surface samples, depth-sorts and rasters drawables into a software
//! canvas, and presents that canvas through a wgpu fullscreen blit.

mod blit;
mod canvas;
mod compositor;
mod context;
mod lighting;
mod projector;

pub use blit::{BlitPipeline, CANVAS_FORMAT};
pub use canvas::{BlendMode, Canvas, RenderSurface};
pub use compositor::{Compositor, CompositorConfig, Drawable, FrameStats, SurfaceStyle};
pub use context::{RenderContext, RenderError};
pub use lighting::{Light, LightingModel, SurfaceShading};
pub use projector::{Projection, Projector, ScreenPoint};
