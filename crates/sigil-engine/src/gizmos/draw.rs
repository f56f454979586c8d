use std::f32::consts::TAU;

use glam::{Quat, UVec2, Vec2, Vec3};

use crate::color::LinearRgba;

use super::{GizmoStorage, DEFAULT_CIRCLE_RESOLUTION};

/// Arrow tips are this fraction of the arrow length.
const ARROW_TIP_FRACTION: f32 = 0.1;

/// Drawing handle for one gizmo group.
///
/// All methods record into the group's [`GizmoStorage`]; nothing reaches the
/// GPU until the frame's batches are rendered. When the group is disabled
/// every call is a no-op.
pub struct Gizmos<'a> {
    storage: &'a mut GizmoStorage,
    enabled: bool,
}

impl<'a> Gizmos<'a> {
    pub fn new(storage: &'a mut GizmoStorage, enabled: bool) -> Self {
        Self { storage, enabled }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ── lines ─────────────────────────────────────────────────────────────

    /// Draws a line from `start` to `end`.
    pub fn line(&mut self, start: Vec3, end: Vec3, color: impl Into<LinearRgba>) {
        let color = color.into();
        self.line_gradient(start, end, color, color);
    }

    /// Draws a line whose color blends from `start_color` to `end_color`.
    pub fn line_gradient(
        &mut self,
        start: Vec3,
        end: Vec3,
        start_color: impl Into<LinearRgba>,
        end_color: impl Into<LinearRgba>,
    ) {
        if !self.enabled {
            return;
        }
        self.storage
            .push_segment(start, end, start_color.into(), end_color.into());
    }

    /// Draws a line from `start` to `start + vector`.
    pub fn ray(&mut self, start: Vec3, vector: Vec3, color: impl Into<LinearRgba>) {
        self.line(start, start + vector, color);
    }

    pub fn ray_gradient(
        &mut self,
        start: Vec3,
        vector: Vec3,
        start_color: impl Into<LinearRgba>,
        end_color: impl Into<LinearRgba>,
    ) {
        self.line_gradient(start, start + vector, start_color, end_color);
    }

    /// Draws connected line segments through `positions`.
    pub fn linestrip(
        &mut self,
        positions: impl IntoIterator<Item = Vec3>,
        color: impl Into<LinearRgba>,
    ) {
        if !self.enabled {
            return;
        }
        let color = color.into();
        self.storage
            .push_strip(positions.into_iter().map(|p| (p, color)));
    }

    /// Draws connected line segments with a color per point.
    pub fn linestrip_gradient<C: Into<LinearRgba>>(
        &mut self,
        points: impl IntoIterator<Item = (Vec3, C)>,
    ) {
        if !self.enabled {
            return;
        }
        self.storage
            .push_strip(points.into_iter().map(|(p, c)| (p, c.into())));
    }

    // ── 2d lines ──────────────────────────────────────────────────────────

    pub fn line_2d(&mut self, start: Vec2, end: Vec2, color: impl Into<LinearRgba>) {
        self.line(start.extend(0.0), end.extend(0.0), color);
    }

    pub fn line_gradient_2d(
        &mut self,
        start: Vec2,
        end: Vec2,
        start_color: impl Into<LinearRgba>,
        end_color: impl Into<LinearRgba>,
    ) {
        self.line_gradient(start.extend(0.0), end.extend(0.0), start_color, end_color);
    }

    pub fn ray_2d(&mut self, start: Vec2, vector: Vec2, color: impl Into<LinearRgba>) {
        self.line_2d(start, start + vector, color);
    }

    pub fn linestrip_2d(
        &mut self,
        positions: impl IntoIterator<Item = Vec2>,
        color: impl Into<LinearRgba>,
    ) {
        self.linestrip(positions.into_iter().map(|p| p.extend(0.0)), color);
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Draws a rectangle of `size` centered on `position`, lying in the plane
    /// spanned by the rotated X and Y axes.
    pub fn rect(
        &mut self,
        position: Vec3,
        rotation: Quat,
        size: Vec2,
        color: impl Into<LinearRgba>,
    ) {
        if !self.enabled {
            return;
        }
        let corners = rect_corners(size).map(|c| position + rotation * c.extend(0.0));
        self.linestrip([corners[0], corners[1], corners[2], corners[3], corners[0]], color);
    }

    pub fn rect_2d(
        &mut self,
        position: Vec2,
        rotation: f32,
        size: Vec2,
        color: impl Into<LinearRgba>,
    ) {
        if !self.enabled {
            return;
        }
        let rot = Vec2::from_angle(rotation);
        let corners = rect_corners(size).map(|c| position + rot.rotate(c));
        self.linestrip_2d([corners[0], corners[1], corners[2], corners[3], corners[0]], color);
    }

    /// Draws a circle facing `normal`. Drawn when the builder is dropped.
    pub fn circle(
        &mut self,
        position: Vec3,
        normal: Vec3,
        radius: f32,
        color: impl Into<LinearRgba>,
    ) -> CircleBuilder<'_, 'a> {
        CircleBuilder {
            gizmos: self,
            position,
            rotation: Quat::from_rotation_arc(Vec3::Z, normal.normalize_or(Vec3::Z)),
            half_size: Vec2::splat(radius),
            color: color.into(),
            resolution: DEFAULT_CIRCLE_RESOLUTION,
        }
    }

    /// Draws a 3D ellipse with the given half extents in the rotated XY plane.
    pub fn ellipse(
        &mut self,
        position: Vec3,
        rotation: Quat,
        half_size: Vec2,
        color: impl Into<LinearRgba>,
    ) -> CircleBuilder<'_, 'a> {
        CircleBuilder {
            gizmos: self,
            position,
            rotation,
            half_size,
            color: color.into(),
            resolution: DEFAULT_CIRCLE_RESOLUTION,
        }
    }

    pub fn circle_2d(
        &mut self,
        position: Vec2,
        radius: f32,
        color: impl Into<LinearRgba>,
    ) -> CircleBuilder2d<'_, 'a> {
        CircleBuilder2d {
            gizmos: self,
            position,
            radius,
            color: color.into(),
            resolution: DEFAULT_CIRCLE_RESOLUTION,
        }
    }

    pub fn ellipse_2d(
        &mut self,
        position: Vec2,
        angle: f32,
        half_size: Vec2,
        color: impl Into<LinearRgba>,
    ) -> EllipseBuilder2d<'_, 'a> {
        EllipseBuilder2d {
            gizmos: self,
            position,
            angle,
            half_size,
            color: color.into(),
            resolution: DEFAULT_CIRCLE_RESOLUTION,
        }
    }

    /// Draws an arc of `arc_angle` radians centered on `direction_angle`
    /// (measured counter-clockwise from +X).
    pub fn arc_2d(
        &mut self,
        position: Vec2,
        direction_angle: f32,
        arc_angle: f32,
        radius: f32,
        color: impl Into<LinearRgba>,
    ) -> ArcBuilder2d<'_, 'a> {
        ArcBuilder2d {
            gizmos: self,
            position,
            direction_angle,
            arc_angle,
            radius,
            color: color.into(),
            resolution: None,
        }
    }

    /// Draws an arc of `angle` radians in the rotated XY plane, starting on
    /// the rotated +X axis and turning counter-clockwise.
    pub fn arc_3d(
        &mut self,
        angle: f32,
        radius: f32,
        position: Vec3,
        rotation: Quat,
        color: impl Into<LinearRgba>,
    ) -> Arc3dBuilder<'_, 'a> {
        Arc3dBuilder {
            gizmos: self,
            position,
            rotation,
            angle,
            radius,
            color: color.into(),
            resolution: None,
        }
    }

    /// Draws a wire sphere as three orthogonal great circles.
    pub fn sphere(
        &mut self,
        position: Vec3,
        rotation: Quat,
        radius: f32,
        color: impl Into<LinearRgba>,
    ) -> SphereBuilder<'_, 'a> {
        SphereBuilder {
            gizmos: self,
            position,
            rotation,
            radius,
            color: color.into(),
            resolution: DEFAULT_CIRCLE_RESOLUTION,
        }
    }

    /// Draws the 12 edges of a box of `size` centered on `position`.
    pub fn cuboid(
        &mut self,
        position: Vec3,
        rotation: Quat,
        size: Vec3,
        color: impl Into<LinearRgba>,
    ) {
        if !self.enabled {
            return;
        }
        let color = color.into();
        let h = size * 0.5;
        let c = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ]
        .map(|v| position + rotation * v);

        // Two faces as strips, four connecting edges as list segments.
        self.linestrip([c[0], c[1], c[2], c[3], c[0]], color);
        self.linestrip([c[4], c[5], c[6], c[7], c[4]], color);
        for i in 0..4 {
            self.line(c[i], c[i + 4], color);
        }
    }

    /// Draws an axis-aligned box between `min` and `max`.
    pub fn aabb(&mut self, min: Vec3, max: Vec3, color: impl Into<LinearRgba>) {
        self.cuboid((min + max) * 0.5, Quat::IDENTITY, (max - min).abs(), color);
    }

    /// Draws a line from `start` to `end` with a tip at `end`.
    pub fn arrow(&mut self, start: Vec3, end: Vec3, color: impl Into<LinearRgba>) {
        if !self.enabled {
            return;
        }
        let color = color.into();
        self.line(start, end, color);

        let dir = end - start;
        let len = dir.length();
        if len <= f32::EPSILON {
            return;
        }
        let forward = dir / len;
        let back = -dir * ARROW_TIP_FRACTION;
        let side = forward.any_orthonormal_vector() * len * ARROW_TIP_FRACTION;
        let up = forward.cross(side);
        for offset in [side, -side, up, -up] {
            self.line(end, end + back + offset, color);
        }
    }

    pub fn arrow_2d(&mut self, start: Vec2, end: Vec2, color: impl Into<LinearRgba>) {
        if !self.enabled {
            return;
        }
        let color = color.into();
        self.line_2d(start, end, color);

        let dir = end - start;
        let len = dir.length();
        if len <= f32::EPSILON {
            return;
        }
        let back = -dir * ARROW_TIP_FRACTION;
        let side = dir.perp() * ARROW_TIP_FRACTION;
        self.linestrip_2d([end + back + side, end, end + back - side], color);
    }

    /// Draws a grid of `cell_count` cells of `spacing` centered on `position`
    /// in the rotated XY plane.
    pub fn grid(
        &mut self,
        position: Vec3,
        rotation: Quat,
        cell_count: UVec2,
        spacing: Vec2,
        color: impl Into<LinearRgba>,
    ) {
        if !self.enabled || cell_count.x == 0 || cell_count.y == 0 {
            return;
        }
        let color = color.into();
        let half = cell_count.as_vec2() * spacing * 0.5;
        let to_world = |p: Vec2| position + rotation * p.extend(0.0);

        for i in 0..=cell_count.x {
            let x = -half.x + i as f32 * spacing.x;
            self.line(to_world(Vec2::new(x, -half.y)), to_world(Vec2::new(x, half.y)), color);
        }
        for j in 0..=cell_count.y {
            let y = -half.y + j as f32 * spacing.y;
            self.line(to_world(Vec2::new(-half.x, y)), to_world(Vec2::new(half.x, y)), color);
        }
    }

    /// Draws the rotated X, Y and Z axes as red, green and blue arrows.
    pub fn axes(&mut self, position: Vec3, rotation: Quat, length: f32) {
        use crate::color::palette::{BLUE, GREEN, RED};

        self.arrow(position, position + rotation * Vec3::X * length, RED);
        self.arrow(position, position + rotation * Vec3::Y * length, GREEN);
        self.arrow(position, position + rotation * Vec3::Z * length, BLUE);
    }

    // ── billboards ────────────────────────────────────────────────────────

    /// Draws a camera-facing square centered on `position`.
    ///
    /// Its on-screen size comes from the group's `billboard_size`.
    pub fn billboard(&mut self, position: Vec3, color: impl Into<LinearRgba>) {
        if !self.enabled {
            return;
        }
        self.storage.push_billboard(position, color.into());
    }

    pub fn billboard_2d(&mut self, position: Vec2, color: impl Into<LinearRgba>) {
        self.billboard(position.extend(0.0), color);
    }
}

fn rect_corners(size: Vec2) -> [Vec2; 4] {
    let h = size * 0.5;
    [
        Vec2::new(-h.x, -h.y),
        Vec2::new(h.x, -h.y),
        Vec2::new(h.x, h.y),
        Vec2::new(-h.x, h.y),
    ]
}

/// Points of a closed ellipse outline (`resolution + 1` points, first == last).
pub(crate) fn ellipse_points(half_size: Vec2, resolution: usize) -> impl Iterator<Item = Vec2> {
    let resolution = resolution.max(3);
    (0..=resolution).map(move |i| {
        let angle = i as f32 * TAU / resolution as f32;
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos * half_size.x, sin * half_size.y)
    })
}

/// Default segment count of an arc: a full turn uses the default circle
/// resolution.
pub(crate) fn arc_resolution(arc_angle: f32) -> usize {
    ((arc_angle.abs() / TAU) * DEFAULT_CIRCLE_RESOLUTION as f32).ceil() as usize
}

/// Points of an arc of `arc_angle` radians starting at `start_angle`.
pub(crate) fn arc_points(
    start_angle: f32,
    arc_angle: f32,
    radius: f32,
    resolution: usize,
) -> impl Iterator<Item = Vec2> {
    let resolution = resolution.max(1);
    (0..=resolution).map(move |i| {
        let angle = start_angle + i as f32 * arc_angle / resolution as f32;
        Vec2::from_angle(angle) * radius
    })
}

// ── builders ──────────────────────────────────────────────────────────────

/// Circle or ellipse in 3D; draws on drop.
pub struct CircleBuilder<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec3,
    rotation: Quat,
    half_size: Vec2,
    color: LinearRgba,
    resolution: usize,
}

impl CircleBuilder<'_, '_> {
    /// Sets the number of line segments.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Drop for CircleBuilder<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let (position, rotation) = (self.position, self.rotation);
        let points = ellipse_points(self.half_size, self.resolution)
            .map(|p| position + rotation * p.extend(0.0));
        self.gizmos.linestrip(points, self.color);
    }
}

pub struct CircleBuilder2d<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec2,
    radius: f32,
    color: LinearRgba,
    resolution: usize,
}

impl CircleBuilder2d<'_, '_> {
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Drop for CircleBuilder2d<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let position = self.position;
        let points =
            ellipse_points(Vec2::splat(self.radius), self.resolution).map(|p| position + p);
        self.gizmos.linestrip_2d(points, self.color);
    }
}

pub struct EllipseBuilder2d<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec2,
    angle: f32,
    half_size: Vec2,
    color: LinearRgba,
    resolution: usize,
}

impl EllipseBuilder2d<'_, '_> {
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Drop for EllipseBuilder2d<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let rot = Vec2::from_angle(self.angle);
        let position = self.position;
        let points =
            ellipse_points(self.half_size, self.resolution).map(|p| position + rot.rotate(p));
        self.gizmos.linestrip_2d(points, self.color);
    }
}

pub struct ArcBuilder2d<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec2,
    direction_angle: f32,
    arc_angle: f32,
    radius: f32,
    color: LinearRgba,
    resolution: Option<usize>,
}

impl ArcBuilder2d<'_, '_> {
    /// Sets the number of line segments.
    ///
    /// By default the count scales with the arc angle so that a full turn
    /// uses the default circle resolution.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = Some(resolution);
        self
    }
}

impl Drop for ArcBuilder2d<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let resolution = self.resolution.unwrap_or_else(|| arc_resolution(self.arc_angle));
        let start = self.direction_angle - self.arc_angle * 0.5;
        let position = self.position;
        let points =
            arc_points(start, self.arc_angle, self.radius, resolution).map(|p| position + p);
        self.gizmos.linestrip_2d(points, self.color);
    }
}

/// Arc in 3D; draws on drop.
pub struct Arc3dBuilder<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec3,
    rotation: Quat,
    angle: f32,
    radius: f32,
    color: LinearRgba,
    resolution: Option<usize>,
}

impl Arc3dBuilder<'_, '_> {
    /// Sets the number of line segments; defaults to a share of the default
    /// circle resolution proportional to the angle.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = Some(resolution);
        self
    }
}

impl Drop for Arc3dBuilder<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let resolution = self.resolution.unwrap_or_else(|| arc_resolution(self.angle));
        let (position, rotation) = (self.position, self.rotation);
        let points = arc_points(0.0, self.angle, self.radius, resolution)
            .map(|p| position + rotation * p.extend(0.0));
        self.gizmos.linestrip(points, self.color);
    }
}

pub struct SphereBuilder<'g, 'a> {
    gizmos: &'g mut Gizmos<'a>,
    position: Vec3,
    rotation: Quat,
    radius: f32,
    color: LinearRgba,
    resolution: usize,
}

impl SphereBuilder<'_, '_> {
    /// Sets the number of line segments per great circle.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Drop for SphereBuilder<'_, '_> {
    fn drop(&mut self) {
        if !self.gizmos.enabled {
            return;
        }
        let (position, radius, color, resolution) =
            (self.position, self.radius, self.color, self.resolution);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let rotation = self.rotation * Quat::from_rotation_arc(Vec3::Z, axis);
            let points = ellipse_points(Vec2::splat(radius), resolution)
                .map(|p| position + rotation * p.extend(0.0));
            self.gizmos.linestrip(points, color);
        }
    }
}
