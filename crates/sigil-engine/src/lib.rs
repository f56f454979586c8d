//! Sigil engine crate.
//!
//! Screen-space gizmo overlay rendering on top of wgpu: an immediate-mode
//! drawing API for debug lines and billboards, the WGSL programs that expand
//! them into camera-facing quads, and the platform + GPU runtime used to host
//! them.

pub mod device;
pub mod window;
pub mod input;
pub mod core;
pub mod time;

pub mod logging;
pub mod color;
pub mod view;
pub mod gizmos;
pub mod render;
