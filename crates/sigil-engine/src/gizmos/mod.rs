//! Immediate-mode gizmo drawing.
//!
//! Each frame, callers record lines, line strips and billboards through a
//! [`Gizmos`] handle obtained from a [`GizmoSet`]. Recorded data is grouped by
//! configuration group (a marker type implementing [`GizmoConfigGroup`]) so
//! that different groups can use different widths, sizes and depth biases.
//!
//! At render time [`GizmoSet::take_batches`] drains every enabled group into
//! [`GizmoBatch`]es consumed by `render::gizmos::GizmoRenderer`, then
//! [`GizmoSet::recycle`] hands their storages back for the next frame.
//!
//! The [`vertex`] module holds a CPU reference of the vertex programs in
//! `render/gizmos/shaders`.

mod config;
mod draw;
mod error;
mod extrusion;
mod set;
mod storage;

pub mod primitives;
pub mod vertex;

pub use config::{
    BillboardGizmoUniform, DefaultGizmoConfigGroup, GizmoConfig, GizmoConfigGroup,
    GizmoConfigStore, GizmoLineJoint, LineGizmoUniform,
};
pub use draw::{
    Arc3dBuilder, ArcBuilder2d, CircleBuilder, CircleBuilder2d, EllipseBuilder2d, Gizmos,
    SphereBuilder,
};
pub use error::GizmoError;
pub use set::{GizmoBatch, GizmoSet};
pub use storage::GizmoStorage;

/// Default number of line segments used for circles, ellipses and arcs.
pub const DEFAULT_CIRCLE_RESOLUTION: usize = 32;
