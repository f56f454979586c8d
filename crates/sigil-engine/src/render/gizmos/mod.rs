//! GPU renderers for line and billboard gizmos.
//!
//! [`GizmoRenderer::render`] takes one or more [`GizmoPass`]es (a view plus
//! the batches to draw from it) and records one render pass each, loading the
//! existing color and depth contents. Views reaching past the target are
//! cropped, never rescaled.

mod billboards;
mod common;
mod lines;

pub use billboards::BillboardGizmoRenderer;
pub use lines::LineGizmoRenderer;

use glam::{Mat4, Vec2, Vec4};

use crate::gizmos::GizmoBatch;
use crate::render::{RenderCtx, RenderTarget};
use crate::view::ViewUniform;

use common::{dynamic_uniform_layout, DynamicUniformBuffer};

/// Batches to draw from one view.
#[derive(Debug, Copy, Clone)]
pub struct GizmoPass<'a> {
    pub view: ViewUniform,
    pub batches: &'a [GizmoBatch],
}

impl<'a> GizmoPass<'a> {
    #[inline]
    pub fn new(view: ViewUniform, batches: &'a [GizmoBatch]) -> Self {
        Self { view, batches }
    }
}

/// Draws gizmo batches on top of an already rendered frame.
pub struct GizmoRenderer {
    view_layout: Option<wgpu::BindGroupLayout>,
    view_uniforms: DynamicUniformBuffer<ViewUniform>,
    view_offsets: Vec<u32>,
    /// Cropped viewport of each pass; `None` when it is off the target.
    visible: Vec<Option<Vec4>>,

    lines: LineGizmoRenderer,
    billboards: BillboardGizmoRenderer,

    warned_depth_mismatch: bool,
}

impl Default for GizmoRenderer {
    fn default() -> Self {
        Self {
            view_layout: None,
            view_uniforms: DynamicUniformBuffer::new("sigil gizmo view ubo"),
            view_offsets: Vec::new(),
            visible: Vec::new(),
            lines: LineGizmoRenderer::new(),
            billboards: BillboardGizmoRenderer::new(),
            warned_depth_mismatch: false,
        }
    }
}

impl GizmoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every pass in order into `target`.
    ///
    /// `ctx.depth_format` must be `Some` exactly when `target.depth_view` is.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        passes: &[GizmoPass<'_>],
    ) {
        if passes.iter().all(|p| p.batches.is_empty()) {
            return;
        }
        if ctx.depth_format.is_some() != target.depth_view.is_some() {
            if !self.warned_depth_mismatch {
                log::warn!("gizmo render skipped: depth format and depth view disagree");
                self.warned_depth_mismatch = true;
            }
            return;
        }

        let view_layout = self.view_layout.get_or_insert_with(|| {
            dynamic_uniform_layout::<ViewUniform>(ctx.device, "sigil gizmo view bgl")
        });

        let target_size = ctx.viewport.size();
        self.view_uniforms.clear();
        self.view_offsets.clear();
        self.visible.clear();
        for pass in passes {
            let cropped = crop_view(&pass.view, target_size);
            let offset = self
                .view_uniforms
                .push(ctx.device, cropped.as_ref().unwrap_or(&pass.view));
            self.view_offsets.push(offset);
            self.visible.push(cropped.map(|view| view.viewport));
        }
        self.view_uniforms.upload(ctx.device, ctx.queue, view_layout);

        self.lines.prepare(ctx, view_layout, passes);
        self.billboards.prepare(ctx, view_layout, passes);

        let Some(view_bind_group) = self.view_uniforms.bind_group() else { return };

        for i in 0..passes.len() {
            if !self.lines.has_draws(i) && !self.billboards.has_draws(i) {
                continue;
            }
            let Some(viewport) = self.visible[i] else {
                continue;
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sigil gizmo pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: target.depth_view.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_viewport(viewport.x, viewport.y, viewport.z, viewport.w, 0.0, 1.0);
            rpass.set_bind_group(0, view_bind_group, &[self.view_offsets[i]]);
            self.lines.draw(&mut rpass, i);
            self.billboards.draw(&mut rpass, i);
        }
    }
}

/// A view viewport (`xy` origin, `zw` size) clamped to the render target;
/// `None` if nothing of it is visible.
fn clamp_viewport(viewport: Vec4, target_size: Vec2) -> Option<Vec4> {
    let target = target_size.max(Vec2::ONE);
    let x = viewport.x.clamp(0.0, target.x);
    let y = viewport.y.clamp(0.0, target.y);
    let right = (viewport.x + viewport.z).min(target.x);
    let bottom = (viewport.y + viewport.w).min(target.y);
    let (w, h) = (right - x, bottom - y);
    if w <= 0.0 || h <= 0.0 { None } else { Some(Vec4::new(x, y, w, h)) }
}

/// `view` restricted to the part of its viewport inside the render target.
///
/// The result keeps every vertex on the same target pixel as `view` would:
/// its viewport is the clamped rectangle and its clip transform is prefixed
/// with the NDC remap from the full to the clamped rectangle. Pixel-sized
/// widths stay intact because the remap preserves pixel scale.
fn crop_view(view: &ViewUniform, target_size: Vec2) -> Option<ViewUniform> {
    let full = view.viewport;
    let crop = clamp_viewport(full, target_size)?;
    if crop == full {
        return Some(*view);
    }

    // NDC y points up while viewport y points down.
    let scale = Vec2::new(full.z / crop.z, full.w / crop.w);
    let offset = Vec2::new(
        (full.z - crop.z + 2.0 * (full.x - crop.x)) / crop.z,
        (crop.w - full.w + 2.0 * (crop.y - full.y)) / crop.w,
    );
    let remap = Mat4::from_cols(
        Vec4::new(scale.x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, scale.y, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(offset.x, offset.y, 0.0, 1.0),
    );

    Some(ViewUniform {
        clip_from_world: remap * view.clip_from_world,
        viewport: crop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LinearRgba;
    use crate::gizmos::vertex::{clip_to_screen, line_vertex, LineInstance};
    use crate::gizmos::LineGizmoUniform;
    use crate::view::{Camera, Viewport};
    use glam::Vec3;
    use naga::proc::Layouter;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    const LINES_WGSL: &str = include_str!("shaders/lines.wgsl");
    const LINE_JOINTS_WGSL: &str = include_str!("shaders/line_joints.wgsl");
    const BILLBOARDS_WGSL: &str = include_str!("shaders/billboards.wgsl");

    fn parse_and_validate(name: &str, source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|err| panic!("{name} WGSL parse failed: {err}"));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|err| panic!("{name} WGSL validation failed: {err:?}"));
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<(naga::ShaderStage, String)> {
        module
            .entry_points
            .iter()
            .map(|ep| (ep.stage, ep.name.clone()))
            .collect()
    }

    /// `(group, binding, type size)` of every bound global.
    fn bindings(module: &naga::Module) -> Vec<(u32, u32, u32)> {
        let mut layouter = Layouter::default();
        layouter.update(module.to_ctx()).expect("layout");
        let mut out: Vec<(u32, u32, u32)> = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| {
                var.binding
                    .as_ref()
                    .map(|b| (b.group, b.binding, layouter[var.ty].size))
            })
            .collect();
        out.sort();
        out
    }

    fn has_perspective_override(module: &naga::Module) -> bool {
        module
            .overrides
            .iter()
            .any(|(_, o)| o.name.as_deref() == Some("PERSPECTIVE"))
    }

    #[test]
    fn line_shader_is_valid() {
        let module = parse_and_validate("lines", LINES_WGSL);
        assert_eq!(
            entry_points(&module),
            vec![
                (naga::ShaderStage::Vertex, "vs_main".to_string()),
                (naga::ShaderStage::Fragment, "fs_main".to_string()),
            ]
        );
        assert_eq!(bindings(&module), vec![(0, 0, 80), (1, 0, 16)]);
        assert!(has_perspective_override(&module));
    }

    #[test]
    fn line_joint_shader_is_valid() {
        let module = parse_and_validate("line joints", LINE_JOINTS_WGSL);
        assert_eq!(
            entry_points(&module),
            vec![
                (naga::ShaderStage::Vertex, "vs_bevel".to_string()),
                (naga::ShaderStage::Vertex, "vs_miter".to_string()),
                (naga::ShaderStage::Vertex, "vs_round".to_string()),
                (naga::ShaderStage::Fragment, "fs_main".to_string()),
            ]
        );
        assert_eq!(bindings(&module), vec![(0, 0, 80), (1, 0, 16)]);
        assert!(has_perspective_override(&module));
    }

    #[test]
    fn billboard_shader_is_valid() {
        let module = parse_and_validate("billboards", BILLBOARDS_WGSL);
        assert_eq!(
            entry_points(&module),
            vec![
                (naga::ShaderStage::Vertex, "vs_main".to_string()),
                (naga::ShaderStage::Fragment, "fs_main".to_string()),
            ]
        );
        assert_eq!(bindings(&module), vec![(0, 0, 80), (1, 0, 16)]);
        assert!(has_perspective_override(&module));
    }

    #[test]
    fn shaders_share_epsilon_with_cpu_reference() {
        assert_eq!(crate::gizmos::vertex::EPSILON, 4.88e-4);
        assert!(LINES_WGSL.contains("const EPSILON: f32 = 4.88e-04;"));
        assert!(LINE_JOINTS_WGSL.contains("const EPSILON: f32 = 4.88e-04;"));
        assert!(BILLBOARDS_WGSL.contains("const EPSILON: f32 = 4.88e-04;"));
    }

    #[test]
    fn viewport_is_clamped_to_target() {
        let target = Vec2::new(800.0, 600.0);
        assert_eq!(
            clamp_viewport(Vec4::new(0.0, 0.0, 800.0, 600.0), target),
            Some(Vec4::new(0.0, 0.0, 800.0, 600.0))
        );
        assert_eq!(
            clamp_viewport(Vec4::new(700.0, 100.0, 200.0, 600.0), target),
            Some(Vec4::new(700.0, 100.0, 100.0, 500.0))
        );
        assert_eq!(
            clamp_viewport(Vec4::new(-50.0, -20.0, 100.0, 100.0), target),
            Some(Vec4::new(0.0, 0.0, 50.0, 80.0))
        );
        assert_eq!(clamp_viewport(Vec4::new(900.0, 0.0, 10.0, 10.0), target), None);
    }

    /// Target pixel (top-left origin) of a clip position drawn through `view`.
    fn target_pixel(view: &ViewUniform, clip: Vec4) -> Vec2 {
        let screen = clip_to_screen(clip, view.resolution());
        let v = view.viewport;
        Vec2::new(v.x + screen.x, v.y + v.w - screen.y)
    }

    #[test]
    fn cropped_view_keeps_pixels_in_place() {
        let target = Vec2::new(800.0, 600.0);
        let u = LineGizmoUniform {
            line_width: 6.0,
            ..Default::default()
        };
        let inst = LineInstance {
            position_a: Vec3::new(-1.0, -1.0, 0.0),
            position_b: Vec3::new(1.0, 0.5, -2.0),
            color_a: LinearRgba::WHITE,
            color_b: LinearRgba::WHITE,
        };

        for viewport in [
            Viewport::new(700.0, 100.0, 200.0, 600.0),
            Viewport::new(-100.0, -50.0, 400.0, 300.0),
        ] {
            let view = Camera::default().view_uniform(viewport);
            let cropped = crop_view(&view, target).expect("partly visible");
            assert_ne!(cropped.viewport, view.viewport);

            for i in 0..6 {
                let full = line_vertex(&view, &u, true, &inst, i).clip_position;
                let crop = line_vertex(&cropped, &u, true, &inst, i).clip_position;
                let moved = target_pixel(&view, full) - target_pixel(&cropped, crop);
                assert!(moved.length() < 1e-2, "{viewport:?} vertex {i} moved by {moved}");
                assert!((full.z / full.w - crop.z / crop.w).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn visible_view_is_not_remapped() {
        let viewport = Viewport::new(10.0, 20.0, 300.0, 200.0);
        let view = Camera::default().view_uniform(viewport);
        assert_eq!(crop_view(&view, Vec2::new(800.0, 600.0)), Some(view));

        let off = Camera::default().view_uniform(Viewport::new(900.0, 0.0, 10.0, 10.0));
        assert_eq!(crop_view(&off, Vec2::new(800.0, 600.0)), None);
    }
}
