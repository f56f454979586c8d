use std::any::{Any, TypeId};
use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::GizmoError;

/// Marker trait for gizmo configuration groups.
///
/// A group is any `'static` type; its value is stored next to its
/// [`GizmoConfig`] and can carry group-specific settings.
pub trait GizmoConfigGroup: Any + Send + Sync {}

/// The group used when no other group is requested.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultGizmoConfigGroup;

impl GizmoConfigGroup for DefaultGizmoConfigGroup {}

/// How consecutive segments of a line strip are connected.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GizmoLineJoint {
    /// Segments are drawn independently; thick strips show notches at corners.
    #[default]
    None,
    /// Extends both outer edges until they meet.
    Miter,
    /// Fills the corner with a fan of `resolution` triangles.
    Round(u32),
    /// Fills the corner with a single triangle.
    Bevel,
}

impl GizmoLineJoint {
    /// Vertices drawn per joint instance; `0` when joints are off.
    pub fn vertex_count(self) -> u32 {
        match self {
            GizmoLineJoint::None => 0,
            GizmoLineJoint::Miter => 6,
            GizmoLineJoint::Round(resolution) => resolution.saturating_mul(3),
            GizmoLineJoint::Bevel => 3,
        }
    }

    /// Value of `joints_resolution` in the line uniform.
    pub fn resolution(self) -> u32 {
        match self {
            GizmoLineJoint::Round(resolution) => resolution,
            _ => 0,
        }
    }
}

/// Rendering configuration shared by every gizmo of one group.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GizmoConfig {
    /// Disabled groups record nothing and are skipped at render time.
    pub enabled: bool,

    /// Line width in physical pixels.
    ///
    /// With `line_perspective`, this is the width at a view distance of one
    /// world unit.
    pub line_width: f32,

    /// Scale line width with distance from the camera.
    pub line_perspective: bool,

    /// Corner style between consecutive segments of a strip.
    pub line_joints: GizmoLineJoint,

    /// Depth bias in `[-1, 1]`.
    ///
    /// `0` draws gizmos at their real depth, `1` pushes them behind all
    /// other geometry and `-1` pulls them in front of everything.
    pub depth_bias: f32,

    /// Billboard width and height in physical pixels.
    pub billboard_size: Vec2,

    /// Scale billboard size with distance from the camera.
    pub billboard_perspective: bool,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line_width: 2.0,
            line_perspective: false,
            line_joints: GizmoLineJoint::None,
            depth_bias: 0.0,
            billboard_size: Vec2::splat(16.0),
            billboard_perspective: false,
        }
    }
}

impl GizmoConfig {
    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_line_joints(mut self, line_joints: GizmoLineJoint) -> Self {
        self.line_joints = line_joints;
        self
    }

    pub fn with_depth_bias(mut self, depth_bias: f32) -> Self {
        self.depth_bias = depth_bias;
        self
    }

    pub fn with_billboard_size(mut self, billboard_size: Vec2) -> Self {
        self.billboard_size = billboard_size;
        self
    }

    pub fn with_perspective(mut self, perspective: bool) -> Self {
        self.line_perspective = perspective;
        self.billboard_perspective = perspective;
        self
    }

    /// Checks that every field is inside its documented range.
    pub fn validate(&self) -> Result<(), GizmoError> {
        if !(self.line_width.is_finite() && self.line_width >= 0.0) {
            return Err(GizmoError::InvalidLineWidth(self.line_width));
        }
        if !(self.billboard_size.is_finite() && self.billboard_size.min_element() >= 0.0) {
            return Err(GizmoError::InvalidBillboardSize(self.billboard_size));
        }
        if !(-1.0..=1.0).contains(&self.depth_bias) {
            return Err(GizmoError::DepthBiasOutOfRange(self.depth_bias));
        }
        Ok(())
    }
}

// ── per-draw uniforms ─────────────────────────────────────────────────────

/// Per-draw uniform of the line program (`@group(1) @binding(0)`).
///
/// Shared by the segment and the joint program.
///
///  offset  0  line_width         f32
///  offset  4  depth_bias         f32
///  offset  8  joints_resolution  u32
///  offset 12  _padding           f32
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct LineGizmoUniform {
    pub line_width: f32,
    pub depth_bias: f32,
    pub joints_resolution: u32,
    pub _padding: f32,
}

/// Per-draw uniform of the billboard program (`@group(1) @binding(0)`).
///
///  offset  0  billboard_size  vec2<f32>
///  offset  8  depth_bias      f32
///  offset 12  _padding        f32
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct BillboardGizmoUniform {
    pub billboard_size: Vec2,
    pub depth_bias: f32,
    pub _padding: f32,
}

impl From<&GizmoConfig> for LineGizmoUniform {
    fn from(config: &GizmoConfig) -> Self {
        Self {
            line_width: sanitize_extent(config.line_width),
            depth_bias: sanitize_depth_bias(config.depth_bias),
            joints_resolution: config.line_joints.resolution(),
            _padding: 0.0,
        }
    }
}

impl From<&GizmoConfig> for BillboardGizmoUniform {
    fn from(config: &GizmoConfig) -> Self {
        Self {
            billboard_size: Vec2::new(
                sanitize_extent(config.billboard_size.x),
                sanitize_extent(config.billboard_size.y),
            ),
            depth_bias: sanitize_depth_bias(config.depth_bias),
            _padding: 0.0,
        }
    }
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn sanitize_depth_bias(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}

// ── store ─────────────────────────────────────────────────────────────────

struct GroupEntry {
    type_id: TypeId,
    type_name: &'static str,
    config: GizmoConfig,
    group: Box<dyn Any + Send + Sync>,
}

/// Configurations of all registered gizmo groups.
///
/// Iteration follows registration order, so output is stable across runs.
#[derive(Default)]
pub struct GizmoConfigStore {
    entries: Vec<GroupEntry>,
    index: HashMap<TypeId, usize>,
}

impl GizmoConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` with its default value and a default config.
    ///
    /// Does nothing if `T` is already registered.
    pub fn register<T: GizmoConfigGroup + Default>(&mut self) {
        if self.contains::<T>() {
            return;
        }
        self.insert(GizmoConfig::default(), T::default());
    }

    /// Inserts or replaces the config and group value for `T`.
    pub fn insert<T: GizmoConfigGroup>(&mut self, config: GizmoConfig, group: T) {
        let type_id = TypeId::of::<T>();
        if let Some(&i) = self.index.get(&type_id) {
            let entry = &mut self.entries[i];
            entry.config = config;
            entry.group = Box::new(group);
            return;
        }

        self.index.insert(type_id, self.entries.len());
        self.entries.push(GroupEntry {
            type_id,
            type_name: std::any::type_name::<T>(),
            config,
            group: Box::new(group),
        });
        log::debug!("registered gizmo group {}", std::any::type_name::<T>());
    }

    pub fn contains<T: GizmoConfigGroup>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    pub fn config<T: GizmoConfigGroup>(&self) -> Result<(&GizmoConfig, &T), GizmoError> {
        self.index
            .get(&TypeId::of::<T>())
            .and_then(|&i| {
                let entry = &self.entries[i];
                entry.group.downcast_ref::<T>().map(|g| (&entry.config, g))
            })
            .ok_or(GizmoError::UnregisteredGroup(std::any::type_name::<T>()))
    }

    pub fn config_mut<T: GizmoConfigGroup>(
        &mut self,
    ) -> Result<(&mut GizmoConfig, &mut T), GizmoError> {
        let Some(&i) = self.index.get(&TypeId::of::<T>()) else {
            return Err(GizmoError::UnregisteredGroup(std::any::type_name::<T>()));
        };
        let entry = &mut self.entries[i];
        match entry.group.downcast_mut::<T>() {
            Some(g) => Ok((&mut entry.config, g)),
            None => Err(GizmoError::UnregisteredGroup(std::any::type_name::<T>())),
        }
    }

    /// Looks up a group by its `TypeId`.
    pub fn get_config_dyn(
        &self,
        type_id: &TypeId,
    ) -> Option<(&GizmoConfig, &(dyn Any + Send + Sync))> {
        self.index.get(type_id).map(|&i| {
            let entry = &self.entries[i];
            (&entry.config, entry.group.as_ref())
        })
    }

    /// Returns the type name a group was registered with.
    pub fn group_name(&self, type_id: &TypeId) -> Option<&'static str> {
        self.index.get(type_id).map(|&i| self.entries[i].type_name)
    }

    /// Iterates `(group type, config)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &GizmoConfig)> {
        self.entries.iter().map(|e| (e.type_id, &e.config))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
