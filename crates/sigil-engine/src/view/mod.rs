//! Camera and view uniform types.
//!
//! Conventions:
//! - right-handed world space, +Y up
//! - reverse-Z clip space: the near plane maps to depth 1, infinity (or the
//!   far plane) to depth 0
//! - viewports are in physical pixels; gizmo widths and sizes are expressed
//!   in the same unit

mod camera;
mod uniform;

pub use camera::{Camera, Projection};
pub use uniform::{ViewUniform, Viewport};
