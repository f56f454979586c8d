//! GPU rendering subsystem.
//!
//! Renderers consume recorded gizmo batches and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - positions are world space; the view uniform maps them to reverse-Z clip
//!   space.
//! - line widths and billboard sizes are physical pixels.

mod ctx;
pub mod gizmos;

pub use ctx::{RenderCtx, RenderTarget};
