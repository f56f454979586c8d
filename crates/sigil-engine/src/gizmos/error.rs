use glam::Vec2;

/// Errors reported by the gizmo API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GizmoError {
    #[error("line width must be finite and non-negative, got {0}")]
    InvalidLineWidth(f32),

    #[error("billboard size must be finite and non-negative, got {0}")]
    InvalidBillboardSize(Vec2),

    #[error("depth bias must lie in [-1, 1], got {0}")]
    DepthBiasOutOfRange(f32),

    #[error("gizmo config group `{0}` is not registered")]
    UnregisteredGroup(&'static str),
}
