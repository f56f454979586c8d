use std::f32::consts::PI;

use glam::{Quat, Vec2, Vec3};

use crate::color::LinearRgba;

use super::primitives::{BoxedPolygon, Capsule2d, Polygon, Polyline2d, Rectangle, Triangle2d};
use super::Gizmos;

/// Outline piece of a 2D shape, swept along the extrusion depth.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtrusionPart {
    Line { a: Vec2, b: Vec2 },
    /// Arc of `angle` radians around `center`, starting `start` radians
    /// counter-clockwise from +X.
    Arc { center: Vec2, radius: f32, start: f32, angle: f32 },
    LineStrip { points: Vec<Vec2> },
}

/// A 2D shape whose outline can be extruded along local Z.
pub trait Extrudable2d {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart>;
}

/// `base_shape` in the XY plane, extruded `half_depth` to each side.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion<P> {
    pub base_shape: P,
    pub half_depth: f32,
}

impl<P> Extrusion<P> {
    pub fn new(base_shape: P, depth: f32) -> Self {
        Self {
            base_shape,
            half_depth: depth * 0.5,
        }
    }
}

impl Extrudable2d for Capsule2d {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        let (r, hl) = (self.radius, self.half_length);
        vec![
            ExtrusionPart::Line {
                a: Vec2::new(r, hl),
                b: Vec2::new(r, -hl),
            },
            ExtrusionPart::Arc {
                center: Vec2::new(0.0, -hl),
                radius: r,
                start: 0.0,
                angle: -PI,
            },
            ExtrusionPart::Line {
                a: Vec2::new(-r, -hl),
                b: Vec2::new(-r, hl),
            },
            ExtrusionPart::Arc {
                center: Vec2::new(0.0, hl),
                radius: r,
                start: PI,
                angle: -PI,
            },
        ]
    }
}

impl Extrudable2d for Rectangle {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        let h = self.half_size;
        let points = vec![h, Vec2::new(h.x, -h.y), -h, Vec2::new(-h.x, h.y), h];
        vec![ExtrusionPart::LineStrip { points }]
    }
}

impl Extrudable2d for Triangle2d {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        let [a, b, c] = self.vertices;
        vec![ExtrusionPart::LineStrip {
            points: vec![a, b, c, a],
        }]
    }
}

impl Extrudable2d for Polyline2d {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        vec![ExtrusionPart::LineStrip {
            points: self.vertices.clone(),
        }]
    }
}

impl Extrudable2d for Polygon {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        vec![closed_strip(&self.vertices)]
    }
}

impl Extrudable2d for BoxedPolygon {
    fn extrusion_parts(&self) -> Vec<ExtrusionPart> {
        vec![closed_strip(&self.vertices)]
    }
}

fn closed_strip(vertices: &[Vec2]) -> ExtrusionPart {
    ExtrusionPart::LineStrip {
        points: vertices.iter().chain(vertices.first()).copied().collect(),
    }
}

impl Gizmos<'_> {
    /// Draws both faces of `extrusion` and the edges joining them.
    ///
    /// The base shape lies in the plane spanned by the rotated X and Y axes;
    /// its faces sit `half_depth` in front of and behind `position`.
    pub fn extrusion<P: Extrudable2d>(
        &mut self,
        extrusion: &Extrusion<P>,
        position: Vec3,
        rotation: Quat,
        color: impl Into<LinearRgba>,
    ) {
        if !self.is_enabled() {
            return;
        }
        let color = color.into();
        let half_depth = extrusion.half_depth;
        let depth = rotation * Vec3::new(0.0, 0.0, -2.0 * half_depth);
        let to_front = |p: Vec2| position + rotation * p.extend(half_depth);

        for part in extrusion.base_shape.extrusion_parts() {
            match part {
                ExtrusionPart::Line { a, b } => {
                    let (a, b) = (to_front(a), to_front(b));
                    self.linestrip([b, a, a + depth, b + depth], color);
                }
                ExtrusionPart::Arc {
                    center,
                    radius,
                    start,
                    angle,
                } => {
                    let arc_rotation = rotation * Quat::from_rotation_z(start);
                    let center = to_front(center);
                    self.arc_3d(angle, radius, center, arc_rotation, color);
                    self.arc_3d(angle, radius, center + depth, arc_rotation, color);

                    let arc_start = center + arc_rotation * Vec3::new(radius, 0.0, 0.0);
                    self.line(arc_start, arc_start + depth, color);
                }
                ExtrusionPart::LineStrip { points } => {
                    let points: Vec<Vec3> = points.into_iter().map(to_front).collect();
                    for pair in points.windows(2) {
                        let (a, b) = (pair[0], pair[1]);
                        self.linestrip([b, a, a + depth, b + depth], color);
                    }
                }
            }
        }
    }
}
