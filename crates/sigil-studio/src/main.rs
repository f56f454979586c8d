use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Quat, UVec2, Vec2, Vec3};

use sigil_engine::color::{palette, LinearRgba};
use sigil_engine::core::{App, AppControl, FrameCtx};
use sigil_engine::device::GpuInit;
use sigil_engine::gizmos::primitives::{
    Annulus, Arc2d, Capsule2d, Circle, CircularSector, CircularSegment, Dir2, Ellipse, Extrusion,
    Polygon, Rectangle, RegularPolygon, Rhombus, Segment2d, Triangle2d,
};
use sigil_engine::gizmos::{
    DefaultGizmoConfigGroup, GizmoConfig, GizmoConfigGroup, GizmoLineJoint, GizmoSet,
};
use sigil_engine::input::{Key, KeyboardInput};
use sigil_engine::logging::{init_logging, LoggingConfig};
use sigil_engine::render::gizmos::{GizmoPass, GizmoRenderer};
use sigil_engine::view::{Camera, Projection};
use sigil_engine::window::{Runtime, RuntimeConfig};

const CLEAR_HEX: &str = "#1c1f27";

/// Screen-space overlay drawn in front of the scene.
#[derive(Debug, Default)]
struct OverlayGizmos;

impl GizmoConfigGroup for OverlayGizmos {}

struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    auto_rotate: bool,
}

impl OrbitCamera {
    fn update(&mut self, input: &KeyboardInput, dt: f32) {
        let speed = 1.5 * dt;
        if input.pressed(Key::A) {
            self.yaw -= speed;
        }
        if input.pressed(Key::D) {
            self.yaw += speed;
        }
        if input.pressed(Key::W) {
            self.pitch += speed;
        }
        if input.pressed(Key::S) {
            self.pitch -= speed;
        }
        if input.pressed(Key::Q) {
            self.distance *= 1.0 + dt;
        }
        if input.pressed(Key::E) {
            self.distance /= 1.0 + dt;
        }
        if input.just_pressed(Key::R) {
            self.auto_rotate = !self.auto_rotate;
        }
        if self.auto_rotate {
            self.yaw = (self.yaw + 0.2 * dt) % TAU;
        }
        self.pitch = self.pitch.clamp(-FRAC_PI_2 + 0.05, FRAC_PI_2 - 0.05);
        self.distance = self.distance.clamp(1.0, 200.0);
    }

    fn camera(&self) -> Camera {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let eye = Vec3::new(cp * sy, sp, cp * cy) * self.distance;
        Camera::looking_at(eye, Vec3::ZERO, Projection::default())
    }
}

struct Studio {
    gizmos: GizmoSet,
    renderer: GizmoRenderer,
    orbit: OrbitCamera,
    clear: LinearRgba,
}

impl Studio {
    fn new() -> Self {
        let mut gizmos = GizmoSet::new();
        gizmos.insert_group(
            OverlayGizmos,
            GizmoConfig::default()
                .with_line_width(1.5)
                .with_depth_bias(-1.0)
                .with_billboard_size(Vec2::splat(10.0)),
        );

        Self {
            gizmos,
            renderer: GizmoRenderer::new(),
            orbit: OrbitCamera {
                yaw: 0.6,
                pitch: 0.45,
                distance: 9.0,
                auto_rotate: true,
            },
            clear: LinearRgba::from_hex(CLEAR_HEX).unwrap_or(LinearRgba::BLACK),
        }
    }

    fn apply_controls(&mut self, input: &KeyboardInput) {
        let Ok((config, _)) = self
            .gizmos
            .config_store_mut()
            .config_mut::<DefaultGizmoConfigGroup>()
        else {
            return;
        };

        if input.just_pressed(Key::ArrowUp) {
            config.line_width = (config.line_width + 1.0).min(32.0);
        }
        if input.just_pressed(Key::ArrowDown) {
            config.line_width = (config.line_width - 1.0).max(0.0);
        }
        if input.just_pressed(Key::ArrowRight) {
            config.billboard_size = (config.billboard_size + 4.0).min(Vec2::splat(128.0));
        }
        if input.just_pressed(Key::ArrowLeft) {
            config.billboard_size = (config.billboard_size - 4.0).max(Vec2::ZERO);
        }
        if input.just_pressed(Key::BracketRight) {
            config.depth_bias = (config.depth_bias + 0.1).min(1.0);
        }
        if input.just_pressed(Key::BracketLeft) {
            config.depth_bias = (config.depth_bias - 0.1).max(-1.0);
        }
        if input.just_pressed(Key::P) {
            config.line_perspective = !config.line_perspective;
            config.billboard_perspective = config.line_perspective;
            if config.line_perspective {
                // Perspective widths are per world unit of view distance.
                config.line_width *= 4.0;
            } else {
                config.line_width /= 4.0;
            }
        }
        if input.just_pressed(Key::J) {
            config.line_joints = match config.line_joints {
                GizmoLineJoint::None => GizmoLineJoint::Miter,
                GizmoLineJoint::Miter => GizmoLineJoint::Round(8),
                GizmoLineJoint::Round(_) => GizmoLineJoint::Bevel,
                GizmoLineJoint::Bevel => GizmoLineJoint::None,
            };
        }
        if input.just_pressed(Key::Space) {
            config.enabled = !config.enabled;
        }

        if input.just_pressed(Key::Enter) {
            log::info!(
                "width {:.1} px, billboard {:?} px, bias {:.2}, perspective {}, joints {:?}",
                config.line_width,
                config.billboard_size,
                config.depth_bias,
                config.line_perspective,
                config.line_joints
            );
        }
    }

    fn draw_scene(&mut self, t: f32) {
        let mut g = self.gizmos.gizmos::<DefaultGizmoConfigGroup>();

        let floor = Quat::from_rotation_x(-FRAC_PI_2);
        g.grid(Vec3::ZERO, floor, UVec2::splat(20), Vec2::ONE, palette::GRAY);
        g.axes(Vec3::new(0.0, 0.01, 0.0), Quat::IDENTITY, 1.5);

        g.sphere(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(t * 0.5), 1.0, palette::CYAN)
            .resolution(48);
        g.cuboid(
            Vec3::new(3.0, 0.75, -1.0),
            Quat::from_rotation_y(t * 0.3),
            Vec3::splat(1.5),
            palette::ORANGE,
        );
        g.aabb(Vec3::new(-4.0, 0.0, -2.0), Vec3::new(-2.5, 2.0, -0.5), palette::SPRING_GREEN);

        let pill = Extrusion::new(Capsule2d { radius: 0.4, half_length: 0.5 }, 0.6);
        g.extrusion(
            &pill,
            Vec3::new(-3.0, 1.0, -4.0),
            Quat::from_rotation_z(t * 0.4),
            palette::HOT_PINK,
        );
        g.arc_3d(t % TAU, 1.2, Vec3::new(3.0, 0.02, -1.0), floor, palette::YELLOW);

        g.circle(Vec3::new(0.0, 0.02, 0.0), Vec3::Y, 3.0, palette::YELLOW);
        g.circle(Vec3::new(-3.0, 1.0, 2.0), Vec3::X, 0.8, palette::MAGENTA)
            .resolution(12);

        // Pulsing gradient helix.
        let helix: Vec<(Vec3, LinearRgba)> = (0..=96)
            .map(|i| {
                let s = i as f32 / 96.0;
                let a = s * TAU * 3.0 + t;
                let p = Vec3::new(a.cos() * 0.6 + 3.0, s * 3.0, a.sin() * 0.6 + 3.0);
                (p, palette::HOT_PINK.lerp(palette::BLUE, s))
            })
            .collect();
        g.linestrip_gradient(helix);

        for i in 0..8 {
            let a = i as f32 / 8.0 * TAU + t * 0.25;
            let dir = Vec3::new(a.cos(), 0.0, a.sin());
            g.arrow(dir * 4.5, dir * 5.5, palette::WHITE.with_alpha(0.6));
            let color = palette::RED.lerp(palette::YELLOW, i as f32 / 7.0);
            g.billboard(dir * 6.0 + Vec3::Y * 0.25, color);
        }
        g.billboard(Vec3::new(0.0, 2.3, 0.0), palette::WHITE);
    }

    fn draw_overlay(&mut self, half_extent: Vec2, t: f32) {
        let mut g = self.gizmos.gizmos::<OverlayGizmos>();

        // Corner legend, in pixels from the viewport center.
        let origin = Vec2::new(-half_extent.x + 60.0, half_extent.y - 60.0);
        let step = Vec2::new(80.0, 0.0);

        g.primitive_2d(&Circle { radius: 24.0 }, origin, 0.0, palette::CYAN);
        g.primitive_2d(
            &Ellipse { half_size: Vec2::new(30.0, 16.0) },
            origin + step,
            t,
            palette::YELLOW,
        );
        g.primitive_2d(&Rectangle::new(44.0, 30.0), origin + step * 2.0, -t, palette::ORANGE);
        g.primitive_2d(
            &RegularPolygon { circumradius: 26.0, sides: 6 },
            origin + step * 3.0,
            0.0,
            palette::SPRING_GREEN,
        );
        g.primitive_2d(
            &Triangle2d {
                vertices: [Vec2::new(0.0, 24.0), Vec2::new(-22.0, -16.0), Vec2::new(22.0, -16.0)],
            },
            origin + step * 4.0,
            0.0,
            palette::MAGENTA,
        );
        g.primitive_2d(
            &Capsule2d { radius: 12.0, half_length: 12.0 },
            origin + step * 5.0,
            FRAC_PI_2,
            palette::HOT_PINK,
        );
        g.primitive_2d(
            &Segment2d { direction: Vec2::from_angle(t), half_length: 24.0 },
            origin + step * 6.0,
            0.0,
            palette::WHITE,
        );

        // Second row.
        let row = origin - Vec2::new(0.0, 80.0);
        let arc = Arc2d { radius: 24.0, half_angle: 1.0 + 0.5 * t.sin() };
        g.primitive_2d(
            &Annulus { inner_radius: 14.0, outer_radius: 26.0 },
            row,
            0.0,
            palette::CYAN,
        )
        .outer_resolution(24)
        .inner_resolution(8);
        g.primitive_2d(&arc, row + step, 0.0, palette::YELLOW);
        g.primitive_2d(&CircularSector { arc }, row + step * 2.0, 0.0, palette::ORANGE);
        g.primitive_2d(&CircularSegment { arc }, row + step * 3.0, 0.0, palette::SPRING_GREEN);
        g.primitive_2d(
            &Rhombus { half_diagonals: Vec2::new(26.0, 16.0) },
            row + step * 4.0,
            t,
            palette::MAGENTA,
        );
        g.primitive_2d(
            &Polygon {
                vertices: vec![
                    Vec2::new(-24.0, -16.0),
                    Vec2::new(24.0, -16.0),
                    Vec2::new(10.0, 18.0),
                    Vec2::new(-4.0, 4.0),
                ],
            },
            row + step * 5.0,
            0.0,
            palette::HOT_PINK,
        );
        g.primitive_2d(&Dir2::from_angle(-t), row + step * 6.0, 0.0, palette::WHITE);
        g.primitive_2d(
            &Segment2d { direction: Vec2::from_angle(t), half_length: 24.0 },
            row + step * 7.0,
            0.0,
            palette::WHITE,
        )
        .draw_arrow(true);

        // Crosshair and a sweeping arc at the center.
        g.line_2d(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), palette::WHITE);
        g.line_2d(Vec2::new(0.0, -10.0), Vec2::new(0.0, 10.0), palette::WHITE);
        g.arc_2d(Vec2::ZERO, t, FRAC_PI_2, 40.0, palette::CYAN.with_alpha(0.5));
        g.billboard_2d(Vec2::new(half_extent.x - 30.0, half_extent.y - 30.0), palette::GREEN);
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.just_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        self.orbit.update(ctx.input, ctx.time.dt);
        self.apply_controls(ctx.input);

        let viewport = ctx.viewport();
        let t = ctx.time.elapsed;
        self.draw_scene(t);
        self.draw_overlay(viewport.size() * 0.5, t);

        let (overlay, scene): (Vec<_>, Vec<_>) = self
            .gizmos
            .take_batches()
            .into_iter()
            .partition(|b| b.is::<OverlayGizmos>());

        let passes = [
            GizmoPass::new(self.orbit.camera().view_uniform(viewport), &scene),
            GizmoPass::new(Camera::pixel_2d(viewport).view_uniform(viewport), &overlay),
        ];

        let renderer = &mut self.renderer;
        let control = ctx.render(self.clear, |rctx, target| renderer.render(rctx, target, &passes));
        self.gizmos.recycle(scene);
        self.gizmos.recycle(overlay);
        control
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("sigil studio");
    log::info!("  W/A/S/D orbit   Q/E zoom   R auto-rotate");
    log::info!("  Up/Down line width   Left/Right billboard size");
    log::info!("  [ / ] depth bias   P perspective   J joints");
    log::info!("  Space toggle   Enter print   Esc quit");

    Runtime::run(
        RuntimeConfig::default().with_title("Sigil Studio"),
        GpuInit::default(),
        Studio::new(),
    )
}
