//! Color types used by gizmos.
//!
//! Gizmo colors are straight-alpha linear RGBA. The gizmo pipelines blend with
//! standard (non-premultiplied) alpha blending, so values are uploaded as-is.

mod linear;

pub mod palette;

pub use linear::LinearRgba;
