use std::collections::HashMap;

use glam::Vec3;

use crate::color::LinearRgba;
use crate::gizmos::BillboardGizmoUniform;
use crate::render::RenderCtx;

use super::common::{
    alpha_blend, depth_stencil_state, dynamic_uniform_layout, primitive_state,
    DynamicUniformBuffer, InstanceBuffer, PipelineKey, Topology,
};
use super::GizmoPass;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

fn buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vec3>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LinearRgba>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR_ATTRS,
        },
    ]
}

#[derive(Debug, Copy, Clone)]
struct BillboardDraw {
    pass: usize,
    key: PipelineKey,
    uniform_offset: u32,
    start: usize,
    end: usize,
}

/// Renderer for billboard gizmos: one camera-facing quad per point.
pub struct BillboardGizmoRenderer {
    shader: Option<wgpu::ShaderModule>,
    uniform_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    uniforms: DynamicUniformBuffer<BillboardGizmoUniform>,
    positions: InstanceBuffer<Vec3>,
    colors: InstanceBuffer<LinearRgba>,

    staged_positions: Vec<Vec3>,
    staged_colors: Vec<LinearRgba>,
    draws: Vec<BillboardDraw>,
}

impl Default for BillboardGizmoRenderer {
    fn default() -> Self {
        Self {
            shader: None,
            uniform_layout: None,
            pipeline_layout: None,
            pipelines: HashMap::new(),
            uniforms: DynamicUniformBuffer::new("sigil billboard gizmo ubo"),
            positions: InstanceBuffer::new("sigil billboard gizmo positions"),
            colors: InstanceBuffer::new("sigil billboard gizmo colors"),
            staged_positions: Vec::new(),
            staged_colors: Vec::new(),
            draws: Vec::new(),
        }
    }
}

impl BillboardGizmoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        view_layout: &wgpu::BindGroupLayout,
        passes: &[GizmoPass<'_>],
    ) {
        self.draws.clear();
        self.staged_positions.clear();
        self.staged_colors.clear();
        self.uniforms.clear();

        for (pass, gizmo_pass) in passes.iter().enumerate() {
            for batch in gizmo_pass.batches {
                let storage = &batch.storage;
                if storage.billboard_positions.is_empty() {
                    continue;
                }

                let uniform_offset =
                    self.uniforms.push(ctx.device, &BillboardGizmoUniform::from(&batch.config));
                let start = self.staged_positions.len();
                self.staged_positions.extend_from_slice(&storage.billboard_positions);
                self.staged_colors.extend_from_slice(&storage.billboard_colors);
                self.draws.push(BillboardDraw {
                    pass,
                    key: PipelineKey::new(ctx, batch.config.billboard_perspective, Topology::List),
                    uniform_offset,
                    start,
                    end: start + storage.billboard_positions.len(),
                });
            }
        }

        if self.draws.is_empty() {
            return;
        }

        self.ensure_layouts(ctx, view_layout);
        let keys: Vec<PipelineKey> = self.draws.iter().map(|d| d.key).collect();
        for key in keys {
            self.ensure_pipeline(ctx, key);
        }

        if let Some(layout) = self.uniform_layout.as_ref() {
            self.uniforms.upload(ctx.device, ctx.queue, layout);
        }
        self.positions.write(ctx, &self.staged_positions);
        self.colors.write(ctx, &self.staged_colors);
    }

    pub(super) fn has_draws(&self, pass: usize) -> bool {
        self.draws.iter().any(|d| d.pass == pass)
    }

    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, pass: usize) {
        let Some(bind_group) = self.uniforms.bind_group() else { return };

        for draw in self.draws.iter().filter(|d| d.pass == pass) {
            let Some(pipeline) = self.pipelines.get(&draw.key) else { continue };
            let (Some(positions), Some(colors)) = (
                self.positions.slice(draw.start, draw.end),
                self.colors.slice(draw.start, draw.end),
            ) else {
                continue;
            };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, bind_group, &[draw.uniform_offset]);
            rpass.set_vertex_buffer(0, positions);
            rpass.set_vertex_buffer(1, colors);
            rpass.draw(
                0..crate::gizmos::vertex::VERTICES_PER_QUAD,
                0..(draw.end - draw.start) as u32,
            );
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>, view_layout: &wgpu::BindGroupLayout) {
        if self.pipeline_layout.is_some() {
            return;
        }

        self.shader = Some(ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sigil billboard gizmo shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/billboards.wgsl").into()),
        }));

        let uniform_layout = dynamic_uniform_layout::<BillboardGizmoUniform>(
            ctx.device,
            "sigil billboard gizmo bgl",
        );
        self.pipeline_layout = Some(ctx.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("sigil billboard gizmo pipeline layout"),
                bind_group_layouts: &[view_layout, &uniform_layout],
                immediate_size: 0,
            },
        ));
        self.uniform_layout = Some(uniform_layout);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (Some(shader), Some(layout)) = (self.shader.as_ref(), self.pipeline_layout.as_ref())
        else {
            return;
        };

        log::debug!("creating billboard gizmo pipeline {key:?}");

        let constants = key.constants();
        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sigil billboard gizmo pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    ..Default::default()
                },
                buffers: &buffer_layouts(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.color_format,
                    blend: Some(alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: depth_stencil_state(key.depth_format),
            multisample: key.multisample(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(key, pipeline);
    }
}
