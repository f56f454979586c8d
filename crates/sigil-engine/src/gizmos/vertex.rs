//! CPU reference of the gizmo vertex programs.
//!
//! Every function here mirrors the WGSL programs in `render/gizmos/shaders`
//! operation for operation. Tests pin the arithmetic; tools that need the
//! same screen-space placement (picking, hit testing) can call it directly.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::color::LinearRgba;
use crate::view::ViewUniform;

use super::{BillboardGizmoUniform, GizmoLineJoint, LineGizmoUniform};

/// Nudge used by near-plane clipping and the negative depth bias.
pub const EPSILON: f32 = 4.88e-4;

/// Two triangles per quad.
pub const VERTICES_PER_QUAD: u32 = 6;

/// Line quad corners: `x` across the line, `y` from endpoint a (0) to b (1).
pub const LINE_QUAD: [Vec2; 6] = [
    Vec2::new(-0.5, 0.0),
    Vec2::new(-0.5, 1.0),
    Vec2::new(0.5, 1.0),
    Vec2::new(-0.5, 0.0),
    Vec2::new(0.5, 1.0),
    Vec2::new(0.5, 0.0),
];

/// Bevel joint triangle: `x` along the incoming outer edge, `y` along the
/// outgoing one.
pub const BEVEL_TRIANGLE: [Vec2; 3] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 0.5),
    Vec2::new(0.5, 0.0),
];

/// Miter joint triangles: `x` incoming outer edge, `y` miter tip, `z`
/// outgoing outer edge.
pub const MITER_TRIANGLES: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.5, 0.0, 0.0),
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 0.5),
];

/// Billboard quad corners around the center.
pub const BILLBOARD_QUAD: [Vec2; 6] = [
    Vec2::new(-0.5, -0.5),
    Vec2::new(0.5, -0.5),
    Vec2::new(0.5, 0.5),
    Vec2::new(-0.5, -0.5),
    Vec2::new(0.5, 0.5),
    Vec2::new(-0.5, 0.5),
];

/// Position emitted for culled billboards; outside every clip volume.
pub const CULLED_POSITION: Vec4 = Vec4::new(2.0, 2.0, 2.0, 1.0);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineInstance {
    pub position_a: Vec3,
    pub position_b: Vec3,
    pub color_a: LinearRgba,
    pub color_b: LinearRgba,
}

/// Three consecutive strip points; the joint is drawn around `position_b`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JointInstance {
    pub position_a: Vec3,
    pub position_b: Vec3,
    pub position_c: Vec3,
    pub color: LinearRgba,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BillboardInstance {
    pub position: Vec3,
    pub color: LinearRgba,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GizmoVertexOutput {
    pub clip_position: Vec4,
    pub color: LinearRgba,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BillboardVertexOutput {
    pub clip_position: Vec4,
    pub color: LinearRgba,
    pub uv: Vec2,
}

/// Moves `a` towards `b` until it is just in front of the near plane
/// (`z <= w`), if `a` is behind it and `b` is not. Otherwise returns `a`.
pub fn clip_near_plane(a: Vec4, b: Vec4) -> Vec4 {
    if a.z > a.w && b.z <= b.w {
        let distance_a = a.z - a.w;
        let distance_b = b.z - b.w;
        let t = distance_a / (distance_a - distance_b) + EPSILON;
        return a.lerp(b, t);
    }
    a
}

/// Clip space to physical pixels (origin bottom-left, like NDC).
pub fn clip_to_screen(clip: Vec4, resolution: Vec2) -> Vec2 {
    resolution * (0.5 * clip.xy() / clip.w + 0.5)
}

/// Physical pixels back to NDC `xy`.
pub fn screen_to_ndc(screen: Vec2, resolution: Vec2) -> Vec2 {
    2.0 * screen / resolution - 1.0
}

/// Depth written for a vertex at clip `z`/`w` with the given bias.
pub fn biased_depth(clip_z: f32, clip_w: f32, depth_bias: f32) -> f32 {
    if depth_bias >= 0.0 {
        clip_z * (1.0 - depth_bias)
    } else if clip_z <= 0.0 {
        clip_z
    } else {
        clip_z * (-depth_bias * (clip_w / clip_z - EPSILON).log2()).exp2()
    }
}

/// Alpha-fades a sub-pixel extent: returns the clamped extent and the alpha
/// factor to apply.
fn thinness_fade(extent: f32) -> (f32, f32) {
    if extent > 0.0 && extent < 1.0 {
        (1.0, extent)
    } else {
        (extent, 1.0)
    }
}

/// Output of the line vertex program for one quad corner.
pub fn line_vertex(
    view: &ViewUniform,
    uniform: &LineGizmoUniform,
    perspective: bool,
    instance: &LineInstance,
    vertex_index: u32,
) -> GizmoVertexOutput {
    let corner = LINE_QUAD[(vertex_index % VERTICES_PER_QUAD) as usize];

    let mut clip_a = view.clip_from_world * instance.position_a.extend(1.0);
    let mut clip_b = view.clip_from_world * instance.position_b.extend(1.0);

    clip_a = clip_near_plane(clip_a, clip_b);
    clip_b = clip_near_plane(clip_b, clip_a);
    let clip = clip_a.lerp(clip_b, corner.y);

    let resolution = view.resolution();
    let screen_a = clip_to_screen(clip_a, resolution);
    let screen_b = clip_to_screen(clip_b, resolution);

    let y_basis = (screen_b - screen_a).normalize();
    let x_basis = Vec2::new(-y_basis.y, y_basis.x);

    let mut color = instance.color_a.lerp(instance.color_b, corner.y);

    let mut line_width = uniform.line_width;
    if perspective {
        line_width /= clip.w;
    }
    let (line_width, fade) = thinness_fade(line_width);
    color.alpha *= fade;

    let screen = screen_a.lerp(screen_b, corner.y) + corner.x * x_basis * line_width;
    let depth = biased_depth(clip.z, clip.w, uniform.depth_bias);

    GizmoVertexOutput {
        clip_position: to_clip(screen, resolution, depth, clip.w),
        color,
    }
}

/// Output of the joint vertex program, or `None` past the joint's vertex
/// count (including every index when joints are off).
pub fn joint_vertex(
    view: &ViewUniform,
    uniform: &LineGizmoUniform,
    perspective: bool,
    joint: GizmoLineJoint,
    instance: &JointInstance,
    vertex_index: u32,
) -> Option<GizmoVertexOutput> {
    if vertex_index >= joint.vertex_count() {
        return None;
    }

    let mut clip_a = view.clip_from_world * instance.position_a.extend(1.0);
    let mut clip_b = view.clip_from_world * instance.position_b.extend(1.0);
    let mut clip_c = view.clip_from_world * instance.position_c.extend(1.0);

    clip_a = clip_near_plane(clip_a, clip_c);
    clip_b = clip_near_plane(clip_b, clip_a);
    clip_c = clip_near_plane(clip_c, clip_b);
    clip_a = clip_near_plane(clip_a, clip_c);

    let resolution = view.resolution();
    let screen_a = clip_to_screen(clip_a, resolution);
    let screen_b = clip_to_screen(clip_b, resolution);
    let screen_c = clip_to_screen(clip_c, resolution);

    let mut color = instance.color;
    let mut line_width = uniform.line_width;
    if perspective {
        line_width /= clip_b.w;
    }
    let (line_width, fade) = thinness_fade(line_width);
    color.alpha *= fade;

    let ab = (screen_b - screen_a).normalize();
    let cb = (screen_b - screen_c).normalize();
    let ab_norm = Vec2::new(-ab.y, ab.x);
    let cb_norm = Vec2::new(cb.y, -cb.x);
    let tangent = (ab - cb).normalize();
    let normal = Vec2::new(-tangent.y, tangent.x);
    let sigma = wgsl_sign((ab + cb).dot(normal));
    let w = line_width * sigma;

    let offset = match joint {
        GizmoLineJoint::None => return None,
        GizmoLineJoint::Bevel => {
            let p = BEVEL_TRIANGLE[vertex_index as usize];
            p.x * w * ab_norm + p.y * w * cb_norm
        }
        GizmoLineJoint::Miter => {
            let p = MITER_TRIANGLES[vertex_index as usize];
            p.x * w * ab_norm + p.y * w * normal / normal.dot(ab_norm) + p.z * w * cb_norm
        }
        GizmoLineJoint::Round(steps) => {
            let in_tri = vertex_index % 3;
            let tri = vertex_index / 3;
            let radius = wgsl_sign(in_tri as f32) * 0.5 * line_width;
            let theta = ab_norm.dot(cb_norm).clamp(-1.0, 1.0).acos();
            let angle = theta * (tri as f32 + in_tri as f32 - 1.0) / steps.max(1) as f32;
            sigma * radius * angle.cos() * ab_norm + radius * angle.sin() * ab
        }
    };

    let depth = biased_depth(clip_b.z, clip_b.w, uniform.depth_bias);
    Some(GizmoVertexOutput {
        clip_position: to_clip(screen_b + offset, resolution, depth, clip_b.w),
        color,
    })
}

/// Output of the billboard vertex program for one quad corner.
pub fn billboard_vertex(
    view: &ViewUniform,
    uniform: &BillboardGizmoUniform,
    perspective: bool,
    instance: &BillboardInstance,
    vertex_index: u32,
) -> BillboardVertexOutput {
    let corner = BILLBOARD_QUAD[(vertex_index % VERTICES_PER_QUAD) as usize];
    let uv = Vec2::new(corner.x + 0.5, 0.5 - corner.y);

    let clip = view.clip_from_world * instance.position.extend(1.0);
    if clip.w <= 0.0 || clip.z > clip.w {
        return BillboardVertexOutput {
            clip_position: CULLED_POSITION,
            color: instance.color,
            uv,
        };
    }

    let mut color = instance.color;
    let mut size = uniform.billboard_size;
    if perspective {
        size /= clip.w;
    }
    let (size_x, fade_x) = thinness_fade(size.x);
    let (size_y, fade_y) = thinness_fade(size.y);
    color.alpha *= fade_x * fade_y;
    let size = Vec2::new(size_x, size_y);

    let resolution = view.resolution();
    let screen = clip_to_screen(clip, resolution) + corner * size;
    let depth = biased_depth(clip.z, clip.w, uniform.depth_bias);

    BillboardVertexOutput {
        clip_position: to_clip(screen, resolution, depth, clip.w),
        color,
        uv,
    }
}

fn to_clip(screen: Vec2, resolution: Vec2, depth: f32, w: f32) -> Vec4 {
    (w * screen_to_ndc(screen, resolution)).extend(depth).extend(w)
}

/// WGSL `sign`: zero stays zero, unlike `f32::signum`.
fn wgsl_sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Camera, Viewport};
    use glam::Mat4;

    const TOL: f32 = 1e-4;

    fn view_2d(width: f32, height: f32) -> ViewUniform {
        let viewport = Viewport::from_size(width, height);
        Camera::pixel_2d(viewport).view_uniform(viewport)
    }

    fn line(a: Vec3, b: Vec3) -> LineInstance {
        LineInstance {
            position_a: a,
            position_b: b,
            color_a: LinearRgba::WHITE,
            color_b: LinearRgba::BLACK,
        }
    }

    fn line_uniform(line_width: f32, depth_bias: f32) -> LineGizmoUniform {
        LineGizmoUniform {
            line_width,
            depth_bias,
            ..Default::default()
        }
    }

    #[test]
    fn zero_bias_keeps_depth() {
        for (z, w) in [(0.5, 1.0), (0.01, 3.0), (1.0, 1.0), (0.0, 2.0)] {
            assert_eq!(biased_depth(z, w, 0.0), z);
        }
    }

    #[test]
    fn positive_bias_scales_depth() {
        assert!((biased_depth(0.8, 1.0, 0.25) - 0.6).abs() < TOL);
        assert_eq!(biased_depth(0.8, 1.0, 1.0), 0.0);
    }

    #[test]
    fn full_negative_bias_reaches_near_plane() {
        let (z, w) = (0.1, 2.0);
        let depth = biased_depth(z, w, -1.0);
        // z * (w/z - eps) = w - z*eps; just behind the near plane (depth / w < 1).
        assert!((depth - (w - z * EPSILON)).abs() < TOL);
        assert!(depth / w < 1.0);
    }

    #[test]
    fn negative_bias_never_moves_backwards() {
        let (z, w) = (0.05, 1.0);
        let mut last = z;
        for i in 1..=10 {
            let depth = biased_depth(z, w, -(i as f32) / 10.0);
            assert!(depth >= last - TOL);
            last = depth;
        }
    }

    #[test]
    fn negative_bias_past_far_plane_is_identity() {
        assert_eq!(biased_depth(0.0, 5.0, -0.5), 0.0);
        assert_eq!(biased_depth(-0.1, 5.0, -1.0), -0.1);
    }

    #[test]
    fn near_plane_clip_moves_behind_endpoint() {
        let a = Vec4::new(0.0, 0.0, 2.0, 1.0); // behind: z > w
        let b = Vec4::new(0.0, 0.0, 0.5, 1.0);
        let clipped = clip_near_plane(a, b);
        assert!(clipped.z <= clipped.w);
        assert!((clipped.z - clipped.w).abs() < 0.01);

        // Already in front: untouched.
        assert_eq!(clip_near_plane(b, a), b);
        // Both behind: untouched.
        assert_eq!(clip_near_plane(a, a), a);
    }

    #[test]
    fn line_quad_is_width_pixels_wide() {
        let view = view_2d(800.0, 600.0);
        let uniform = line_uniform(10.0, 0.0);
        let inst = line(Vec3::new(100.0, 100.0, 0.0), Vec3::new(300.0, 100.0, 0.0));
        let res = view.resolution();

        // Corner 0 (-0.5, 0) and corner 5 (0.5, 0) straddle endpoint a.
        let v0 = line_vertex(&view, &uniform, false, &inst, 0);
        let v5 = line_vertex(&view, &uniform, false, &inst, 5);
        let s0 = clip_to_screen(v0.clip_position, res);
        let s5 = clip_to_screen(v5.clip_position, res);
        assert!(((s0 - s5).length() - 10.0).abs() < 1e-2);

        let mid = (s0 + s5) * 0.5;
        let clip_a = view.clip_from_world * Vec4::new(100.0, 100.0, 0.0, 1.0);
        let expected_a = clip_to_screen(clip_a, res);
        assert!((mid - expected_a).length() < 1e-2);

        // Corner 2 (0.5, 1) sits at endpoint b's side.
        let v2 = line_vertex(&view, &uniform, false, &inst, 2);
        let s2 = clip_to_screen(v2.clip_position, res);
        assert!((s2.x - s5.x - 200.0).abs() < 1e-2);
        assert_eq!(v2.color, LinearRgba::BLACK);
        assert_eq!(v0.color, LinearRgba::WHITE);
    }

    #[test]
    fn thin_lines_fade_instead_of_shrinking() {
        let view = view_2d(800.0, 600.0);
        let inst = line(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 100.0, 0.0));
        let res = view.resolution();

        let v0 = line_vertex(&view, &line_uniform(0.25, 0.0), false, &inst, 0);
        let v5 = line_vertex(&view, &line_uniform(0.25, 0.0), false, &inst, 5);
        assert!((v0.color.alpha - 0.25).abs() < TOL);
        let s0 = clip_to_screen(v0.clip_position, res);
        let s5 = clip_to_screen(v5.clip_position, res);
        let width = (s0 - s5).length();
        assert!((width - 1.0).abs() < 1e-2);

        // Alpha never increases.
        for w in [0.0, 0.5, 1.0, 3.0] {
            let v = line_vertex(&view, &line_uniform(w, 0.0), false, &inst, 0);
            assert!(v.color.alpha <= 1.0);
        }
    }

    #[test]
    fn perspective_divides_width_by_w() {
        // Every point lands at z = 0.5, w = 4.
        let clip_from_world =
            Mat4::from_cols(Vec4::X, Vec4::Y, Vec4::ZERO, Vec4::new(0.0, 0.0, 0.5, 4.0));
        let view = ViewUniform::new(clip_from_world, Viewport::from_size(100.0, 100.0));
        let res = view.resolution();
        let inst = line(Vec3::ZERO, Vec3::X * 2.0);

        let flat = line_vertex(&view, &line_uniform(8.0, 0.0), false, &inst, 0);
        let persp = line_vertex(&view, &line_uniform(8.0, 0.0), true, &inst, 0);
        let s_flat = clip_to_screen(flat.clip_position, res);
        let s_persp = clip_to_screen(persp.clip_position, res);
        let center = clip_to_screen(Vec4::new(0.0, 0.0, 0.5, 4.0), res);
        assert!(((s_flat - center).length() - 4.0).abs() < 1e-3);
        assert!(((s_persp - center).length() - 1.0).abs() < 1e-3);
        assert_eq!(persp.clip_position.w, 4.0);
    }

    #[test]
    fn vertex_index_wraps_per_quad() {
        let view = view_2d(64.0, 64.0);
        let inst = line(Vec3::ZERO, Vec3::X * 10.0);
        let u = line_uniform(2.0, 0.0);
        assert_eq!(
            line_vertex(&view, &u, false, &inst, 1),
            line_vertex(&view, &u, false, &inst, 7)
        );
    }

    fn billboard_uniform(size: Vec2) -> BillboardGizmoUniform {
        BillboardGizmoUniform {
            billboard_size: size,
            depth_bias: 0.0,
            _padding: 0.0,
        }
    }

    #[test]
    fn billboard_covers_size_pixels() {
        let view = view_2d(640.0, 480.0);
        let res = view.resolution();
        let inst = BillboardInstance {
            position: Vec3::new(50.0, 20.0, 0.0),
            color: LinearRgba::WHITE,
        };
        let u = billboard_uniform(Vec2::new(12.0, 6.0));

        let bl = billboard_vertex(&view, &u, false, &inst, 0);
        let tr = billboard_vertex(&view, &u, false, &inst, 2);
        let extent = clip_to_screen(tr.clip_position, res) - clip_to_screen(bl.clip_position, res);
        assert!((extent - Vec2::new(12.0, 6.0)).length() < 1e-2);

        assert_eq!(bl.uv, Vec2::new(0.0, 1.0));
        assert_eq!(tr.uv, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn billboard_fades_per_axis() {
        let view = view_2d(100.0, 100.0);
        let inst = BillboardInstance {
            position: Vec3::ZERO,
            color: LinearRgba::WHITE,
        };
        let v = billboard_vertex(&view, &billboard_uniform(Vec2::new(0.5, 0.5)), false, &inst, 0);
        assert!((v.color.alpha - 0.25).abs() < TOL);

        let v = billboard_vertex(&view, &billboard_uniform(Vec2::new(0.5, 4.0)), false, &inst, 0);
        assert!((v.color.alpha - 0.5).abs() < TOL);
    }

    #[test]
    fn billboard_behind_camera_is_culled() {
        let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Default::default());
        let viewport = Viewport::from_size(100.0, 100.0);
        let view = camera.view_uniform(viewport);
        let inst = BillboardInstance {
            position: Vec3::new(0.0, 0.0, 10.0),
            color: LinearRgba::WHITE,
        };
        for i in 0..6 {
            let v = billboard_vertex(&view, &billboard_uniform(Vec2::splat(8.0)), false, &inst, i);
            assert_eq!(v.clip_position, CULLED_POSITION);
        }
    }
    fn perspective_view() -> ViewUniform {
        let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Default::default());
        camera.view_uniform(Viewport::from_size(200.0, 100.0))
    }

    #[test]
    fn line_through_the_camera_is_clipped_at_the_near_plane() {
        let view = perspective_view();
        // b lies behind the camera.
        let inst = line(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 10.0));
        let behind = view.clip_from_world * inst.position_b.extend(1.0);
        assert!(behind.w < 0.0);

        let u = line_uniform(4.0, 0.0);
        for i in 0..6 {
            let p = line_vertex(&view, &u, false, &inst, i).clip_position;
            assert!(p.is_finite(), "vertex {i}: {p}");
            assert!(p.w > 0.0, "vertex {i}: {p}");
            assert!(p.z <= p.w, "vertex {i}: {p}");
        }

        // Corners at b sit just in front of the near plane.
        let p = line_vertex(&view, &u, false, &inst, 2).clip_position;
        let ndc_depth = p.z / p.w;
        assert!(ndc_depth > 0.9 && ndc_depth <= 1.0, "{ndc_depth}");
    }

    #[test]
    fn negative_bias_pulls_line_towards_the_near_plane() {
        let view = perspective_view();
        let inst = line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let clip = view.clip_from_world * inst.position_a.extend(1.0);

        let plain = line_vertex(&view, &line_uniform(4.0, 0.0), false, &inst, 0).clip_position;
        let half = line_vertex(&view, &line_uniform(4.0, -0.5), false, &inst, 0).clip_position;
        let full = line_vertex(&view, &line_uniform(4.0, -1.0), false, &inst, 0).clip_position;

        assert!((plain.z - clip.z).abs() < TOL);
        assert!(half.z > plain.z);
        assert!(full.z > half.z);
        assert!((full.z - (clip.w - clip.z * EPSILON)).abs() < 1e-3);
        assert!(full.z < full.w);
        // Bias never moves the quad on screen.
        assert_eq!(plain.xy(), full.xy());
        assert_eq!(plain.w, full.w);
    }

    fn corner_joint() -> JointInstance {
        // Left turn at b.
        JointInstance {
            position_a: Vec3::new(0.0, 0.0, 0.0),
            position_b: Vec3::new(100.0, 0.0, 0.0),
            position_c: Vec3::new(100.0, 100.0, 0.0),
            color: LinearRgba::WHITE,
        }
    }

    /// Joint vertices relative to the projected corner, in pixels.
    fn joint_offsets(joint: GizmoLineJoint) -> Vec<Vec2> {
        let view = view_2d(800.0, 600.0);
        let res = view.resolution();
        let inst = corner_joint();
        let center = clip_to_screen(view.clip_from_world * inst.position_b.extend(1.0), res);
        (0..joint.vertex_count())
            .map(|i| {
                let v = joint_vertex(&view, &line_uniform(10.0, 0.0), false, joint, &inst, i)
                    .expect("index below the vertex count");
                clip_to_screen(v.clip_position, res) - center
            })
            .collect()
    }

    fn near(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-2
    }

    #[test]
    fn joint_vertex_stops_at_the_vertex_count() {
        let view = view_2d(800.0, 600.0);
        let u = line_uniform(10.0, 0.0);
        let inst = corner_joint();
        assert!(joint_vertex(&view, &u, false, GizmoLineJoint::None, &inst, 0).is_none());
        assert!(joint_vertex(&view, &u, false, GizmoLineJoint::Bevel, &inst, 2).is_some());
        assert!(joint_vertex(&view, &u, false, GizmoLineJoint::Bevel, &inst, 3).is_none());
        assert!(joint_vertex(&view, &u, false, GizmoLineJoint::Round(2), &inst, 6).is_none());
    }

    #[test]
    fn bevel_fills_the_outer_corner() {
        // The outer side is below the incoming and right of the outgoing segment.
        let offsets = joint_offsets(GizmoLineJoint::Bevel);
        assert!(near(offsets[0], Vec2::ZERO));
        assert!(near(offsets[1], Vec2::new(5.0, 0.0)));
        assert!(near(offsets[2], Vec2::new(0.0, -5.0)));
    }

    #[test]
    fn miter_reaches_the_outer_edge_intersection() {
        let offsets = joint_offsets(GizmoLineJoint::Miter);
        assert_eq!(offsets.len(), 6);
        assert!(near(offsets[1], Vec2::new(0.0, -5.0)));
        assert!(near(offsets[2], Vec2::new(5.0, -5.0)));
        assert!(near(offsets[5], Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn round_joint_is_a_fan_of_half_width_radius() {
        let offsets = joint_offsets(GizmoLineJoint::Round(4));
        assert_eq!(offsets.len(), 12);
        for (i, offset) in offsets.iter().enumerate() {
            let expected = if i % 3 == 0 { 0.0 } else { 5.0 };
            assert!((offset.length() - expected).abs() < 1e-2, "vertex {i}: {offset}");
        }
        // The fan sweeps from the incoming to the outgoing outer edge.
        assert!(near(offsets[1], Vec2::new(0.0, -5.0)));
        assert!(near(offsets[11], Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn joint_uses_corner_depth_and_fade() {
        let view = view_2d(800.0, 600.0);
        let inst = corner_joint();
        let u = line_uniform(0.5, 0.5);
        let v = joint_vertex(&view, &u, false, GizmoLineJoint::Bevel, &inst, 1)
            .expect("bevel has three vertices");
        let clip_b = view.clip_from_world * inst.position_b.extend(1.0);
        assert!((v.clip_position.z - biased_depth(clip_b.z, clip_b.w, 0.5)).abs() < TOL);
        assert!((v.color.alpha - 0.5).abs() < TOL);
    }

    #[test]
    fn straight_strip_has_degenerate_joints() {
        let view = view_2d(800.0, 600.0);
        let res = view.resolution();
        let inst = JointInstance {
            position_c: Vec3::new(200.0, 0.0, 0.0),
            ..corner_joint()
        };
        let center = clip_to_screen(view.clip_from_world * inst.position_b.extend(1.0), res);
        for i in 0..6 {
            let u = line_uniform(10.0, 0.0);
            let v = joint_vertex(&view, &u, false, GizmoLineJoint::Miter, &inst, i)
                .expect("miter has six vertices");
            assert!(near(clip_to_screen(v.clip_position, res), center));
        }
    }
}
