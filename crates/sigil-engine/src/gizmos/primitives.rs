//! 2D shapes that can be drawn as gizmo outlines.
//!
//! Shapes are described in their local frame (centered on the origin); the
//! caller places them with a position and rotation angle through
//! [`Gizmos::primitive_2d`]. Some of them can also be extruded into 3D
//! outlines with [`Gizmos::extrusion`].

use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU};

use glam::Vec2;

use crate::color::LinearRgba;

use super::draw::{arc_points, arc_resolution, ellipse_points};
use super::{Gizmos, DEFAULT_CIRCLE_RESOLUTION};

pub use super::extrusion::{Extrudable2d, Extrusion, ExtrusionPart};

/// Length of directions, plane normals and line arrow heads.
const DIRECTION_LENGTH: f32 = 50.0;
/// Half-length used for lines and planes that extend forever.
const INFINITE_LENGTH: f32 = 100_000.0;

/// Drawing options forwarded from [`Primitive2dBuilder`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct OutlineOptions {
    /// Segment count of curved parts. `None` picks a per-shape default.
    pub resolution: Option<usize>,
    /// Segment count of inner curves (annulus); falls back to `resolution`.
    pub inner_resolution: Option<usize>,
    /// Marks the direction of segments and lines with an arrow head.
    pub draw_arrow: bool,
}

impl OutlineOptions {
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = Some(resolution);
        self
    }

    fn outer(&self) -> usize {
        self.resolution.unwrap_or(DEFAULT_CIRCLE_RESOLUTION)
    }

    fn inner(&self) -> usize {
        self.inner_resolution.unwrap_or_else(|| self.outer())
    }
}

/// A shape that can be outlined with line strips.
pub trait GizmoPrimitive2d {
    /// Outline of the shape in its local frame.
    ///
    /// Straight-edged shapes ignore the resolutions in `options`.
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>>;
}

/// Unit-length 2D direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Dir2(Vec2);

impl Dir2 {
    pub const X: Self = Self(Vec2::X);
    pub const Y: Self = Self(Vec2::Y);
    pub const NEG_X: Self = Self(Vec2::NEG_X);
    pub const NEG_Y: Self = Self(Vec2::NEG_Y);

    /// Normalizes `value`; `None` for zero-length or non-finite input.
    pub fn new(value: Vec2) -> Option<Self> {
        value.try_normalize().map(Self)
    }

    /// Direction at `angle` radians counter-clockwise from +X.
    pub fn from_angle(angle: f32) -> Self {
        Self(Vec2::from_angle(angle))
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub radius: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipse {
    pub half_size: Vec2,
}

/// Ring between two concentric circles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Annulus {
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Arc of `2 * half_angle` radians, symmetric around +Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arc2d {
    pub radius: f32,
    pub half_angle: f32,
}

/// An [`Arc2d`] closed through its center (a pie slice).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircularSector {
    pub arc: Arc2d,
}

/// An [`Arc2d`] closed by the chord between its ends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircularSegment {
    pub arc: Arc2d,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    pub half_size: Vec2,
}

impl Rectangle {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_size: Vec2::new(width, height) * 0.5,
        }
    }
}

/// Diamond with its corners on the axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rhombus {
    pub half_diagonals: Vec2,
}

/// Polygon with `sides` vertices on a circle of `circumradius`, the first one
/// pointing up (+Y).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegularPolygon {
    pub circumradius: f32,
    pub sides: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle2d {
    pub vertices: [Vec2; 3],
}

/// Line through the origin, infinite in both directions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line2d {
    pub direction: Dir2,
}

/// Half-plane boundary through the origin; `normal` points to the open side.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane2d {
    pub normal: Dir2,
}

/// Segment of `2 * half_length` along `direction`, centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Segment2d {
    pub direction: Vec2,
    pub half_length: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline2d {
    pub vertices: Vec<Vec2>,
}

/// Closed polygon through `vertices`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

/// [`Polygon`] with a fixed vertex slice.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxedPolygon {
    pub vertices: Box<[Vec2]>,
}

/// Stadium shape: a rectangle of `2 * half_length` along +Y capped by two
/// half circles of `radius`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Capsule2d {
    pub radius: f32,
    pub half_length: f32,
}

impl GizmoPrimitive2d for Dir2 {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        arrow(Vec2::ZERO, self.0 * DIRECTION_LENGTH)
    }
}

impl GizmoPrimitive2d for Circle {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        vec![ellipse_points(Vec2::splat(self.radius), options.outer()).collect()]
    }
}

impl GizmoPrimitive2d for Ellipse {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        vec![ellipse_points(self.half_size, options.outer()).collect()]
    }
}

impl GizmoPrimitive2d for Annulus {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        vec![
            ellipse_points(Vec2::splat(self.inner_radius), options.inner()).collect(),
            ellipse_points(Vec2::splat(self.outer_radius), options.outer()).collect(),
        ]
    }
}

impl Arc2d {
    fn points(&self, options: &OutlineOptions) -> Vec<Vec2> {
        let angle = 2.0 * self.half_angle;
        let resolution = options.resolution.unwrap_or_else(|| arc_resolution(angle));
        arc_points(FRAC_PI_2 - self.half_angle, angle, self.radius, resolution).collect()
    }
}

impl GizmoPrimitive2d for Arc2d {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        vec![self.points(options)]
    }
}

impl GizmoPrimitive2d for CircularSector {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let mut strip = self.arc.points(options);
        let first = strip[0];
        strip.extend([Vec2::ZERO, first]);
        vec![strip]
    }
}

impl GizmoPrimitive2d for CircularSegment {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let mut strip = self.arc.points(options);
        strip.push(strip[0]);
        vec![strip]
    }
}

impl GizmoPrimitive2d for Rectangle {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let h = self.half_size;
        vec![vec![
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
            Vec2::new(-h.x, -h.y),
        ]]
    }
}

impl GizmoPrimitive2d for Rhombus {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let h = self.half_diagonals;
        vec![vec![
            Vec2::new(h.x, 0.0),
            Vec2::new(0.0, h.y),
            Vec2::new(-h.x, 0.0),
            Vec2::new(0.0, -h.y),
            Vec2::new(h.x, 0.0),
        ]]
    }
}

impl GizmoPrimitive2d for RegularPolygon {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        if self.sides < 3 {
            return Vec::new();
        }
        let step = TAU / self.sides as f32;
        let strip = (0..=self.sides)
            .map(|i| Vec2::from_angle(FRAC_PI_2 + i as f32 * step) * self.circumradius)
            .collect();
        vec![strip]
    }
}

impl GizmoPrimitive2d for Triangle2d {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let [a, b, c] = self.vertices;
        vec![vec![a, b, c, a]]
    }
}

impl GizmoPrimitive2d for Line2d {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let dir = self.direction.0;
        let end = dir * INFINITE_LENGTH;
        let mut strips = vec![vec![-end, end]];
        if options.draw_arrow {
            strips.push(arrow_head(Vec2::ZERO, dir, DIRECTION_LENGTH));
        }
        strips
    }
}

impl GizmoPrimitive2d for Plane2d {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        // The normal stays on the left of the line direction.
        let line_dir = -self.normal.0.perp();

        let mut strips = arrow(Vec2::ZERO, self.normal.0 * DIRECTION_LENGTH);
        strips.push(vec![line_dir * INFINITE_LENGTH, -line_dir * INFINITE_LENGTH]);
        strips.push(arrow_head(
            line_dir * DIRECTION_LENGTH,
            line_dir,
            DIRECTION_LENGTH / 10.0,
        ));
        strips
    }
}

impl GizmoPrimitive2d for Segment2d {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let d = self.direction.normalize_or_zero() * self.half_length;
        if options.draw_arrow {
            arrow(-d, d)
        } else {
            vec![vec![-d, d]]
        }
    }
}

impl GizmoPrimitive2d for Polyline2d {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        vec![self.vertices.clone()]
    }
}

impl GizmoPrimitive2d for Polygon {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        closed_polygon(&self.vertices)
    }
}

impl GizmoPrimitive2d for BoxedPolygon {
    fn linestrips(&self, _options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        closed_polygon(&self.vertices)
    }
}

impl GizmoPrimitive2d for Capsule2d {
    fn linestrips(&self, options: &OutlineOptions) -> Vec<Vec<Vec2>> {
        let (r, hl) = (self.radius, self.half_length);
        let half_res = (options.outer() / 2).max(1);
        let top = Vec2::new(0.0, hl);
        let bottom = Vec2::new(0.0, -hl);

        // One closed strip: top cap left-to-right over the top, down the
        // right side, bottom cap, back up the left side.
        let mut strip: Vec<Vec2> = arc_points(PI, -PI, r, half_res).map(|p| top + p).collect();
        strip.extend(arc_points(0.0, -PI, r, half_res).map(|p| bottom + p));
        if let Some(&first) = strip.first() {
            strip.push(first);
        }
        vec![strip]
    }
}

/// Polygon outline closed back to its first vertex. Two vertices give an
/// open segment; fewer give nothing.
fn closed_polygon(vertices: &[Vec2]) -> Vec<Vec<Vec2>> {
    match vertices {
        [] | [_] => Vec::new(),
        [a, b] => vec![vec![*a, *b]],
        [first, ..] => vec![vertices.iter().copied().chain([*first]).collect()],
    }
}

/// Shaft from `start` to `end` plus a head a tenth of its length.
fn arrow(start: Vec2, end: Vec2) -> Vec<Vec<Vec2>> {
    let vector = end - start;
    let length = vector.length();
    let mut strips = vec![vec![start, end]];
    if length > f32::EPSILON {
        strips.push(arrow_head(end, vector / length, length / 10.0));
    }
    strips
}

/// Two 45 degree barbs of `tip_length` meeting at `position`, pointing along
/// the unit vector `direction`.
fn arrow_head(position: Vec2, direction: Vec2, tip_length: f32) -> Vec<Vec2> {
    let left = direction.rotate(Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2)) * tip_length;
    let right = direction.rotate(Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2)) * tip_length;
    vec![position + left, position, position + right]
}

/// Outline of a 2D primitive; draws on drop.
pub struct Primitive2dBuilder<'g, 'a, 'p, P: GizmoPrimitive2d + ?Sized> {
    gizmos: &'g mut Gizmos<'a>,
    primitive: &'p P,
    position: Vec2,
    angle: f32,
    color: LinearRgba,
    options: OutlineOptions,
}

impl<P: GizmoPrimitive2d + ?Sized> Primitive2dBuilder<'_, '_, '_, P> {
    /// Sets the segment count of every curve.
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.options.resolution = Some(resolution);
        self.options.inner_resolution = Some(resolution);
        self
    }

    /// Sets the segment count of outer curves only.
    pub fn outer_resolution(mut self, resolution: usize) -> Self {
        self.options.resolution = Some(resolution);
        self
    }

    /// Sets the segment count of inner curves only.
    pub fn inner_resolution(mut self, resolution: usize) -> Self {
        self.options.inner_resolution = Some(resolution);
        self
    }

    /// Marks the direction of segments and lines with an arrow head.
    pub fn draw_arrow(mut self, enabled: bool) -> Self {
        self.options.draw_arrow = enabled;
        self
    }
}

impl<P: GizmoPrimitive2d + ?Sized> Drop for Primitive2dBuilder<'_, '_, '_, P> {
    fn drop(&mut self) {
        if !self.gizmos.is_enabled() {
            return;
        }
        let (position, rot) = (self.position, Vec2::from_angle(self.angle));
        for strip in self.primitive.linestrips(&self.options) {
            self.gizmos
                .linestrip_2d(strip.into_iter().map(|p| position + rot.rotate(p)), self.color);
        }
    }
}

impl<'a> Gizmos<'a> {
    /// Draws the outline of `primitive` rotated by `angle` and moved to
    /// `position`. Drawn when the builder is dropped.
    pub fn primitive_2d<'p, P: GizmoPrimitive2d + ?Sized>(
        &mut self,
        primitive: &'p P,
        position: Vec2,
        angle: f32,
        color: impl Into<LinearRgba>,
    ) -> Primitive2dBuilder<'_, 'a, 'p, P> {
        Primitive2dBuilder {
            gizmos: self,
            primitive,
            position,
            angle,
            color: color.into(),
            options: OutlineOptions::default(),
        }
    }
}
