//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates winit events into [`KeyEvent`]s.

pub(crate) mod platform;
mod state;
mod types;

pub use state::KeyboardInput;
pub use types::{Key, KeyEvent, KeyState};
