use std::collections::HashMap;

use glam::Vec3;

use crate::color::LinearRgba;
use crate::gizmos::vertex::VERTICES_PER_QUAD;
use crate::gizmos::LineGizmoUniform;
use crate::render::RenderCtx;

use super::common::{
    alpha_blend, depth_stencil_state, dynamic_uniform_layout, primitive_state,
    DynamicUniformBuffer, InstanceBuffer, JointKind, PipelineKey, Topology,
};
use super::GizmoPass;

const POSITION_SIZE: u64 = std::mem::size_of::<Vec3>() as u64;
const COLOR_SIZE: u64 = std::mem::size_of::<LinearRgba>() as u64;

// List: one instance = two consecutive elements of each buffer.
const LIST_POSITION_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position_a
    1 => Float32x3  // position_b
];
const LIST_COLOR_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    2 => Float32x4, // color_a
    3 => Float32x4  // color_b
];

// Strip: each buffer is bound twice, the second binding one element ahead.
const POSITION_0_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const POSITION_1_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const POSITION_2_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];
const COLOR_2_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];
const COLOR_3_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x4];

fn instance_layout(
    array_stride: u64,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

fn list_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        instance_layout(2 * POSITION_SIZE, &LIST_POSITION_ATTRS),
        instance_layout(2 * COLOR_SIZE, &LIST_COLOR_ATTRS),
    ]
}

fn strip_layouts() -> [wgpu::VertexBufferLayout<'static>; 4] {
    [
        instance_layout(POSITION_SIZE, &POSITION_0_ATTRS),
        instance_layout(POSITION_SIZE, &POSITION_1_ATTRS),
        instance_layout(COLOR_SIZE, &COLOR_2_ATTRS),
        instance_layout(COLOR_SIZE, &COLOR_3_ATTRS),
    ]
}

// Joint: positions bound three times (a, b, c), color of b.
fn joint_layouts() -> [wgpu::VertexBufferLayout<'static>; 4] {
    [
        instance_layout(POSITION_SIZE, &POSITION_0_ATTRS),
        instance_layout(POSITION_SIZE, &POSITION_1_ATTRS),
        instance_layout(POSITION_SIZE, &POSITION_2_ATTRS),
        instance_layout(COLOR_SIZE, &COLOR_3_ATTRS),
    ]
}

/// One instanced draw over elements `start..end` of the shared buffers.
#[derive(Debug, Copy, Clone)]
struct LineDraw {
    pass: usize,
    key: PipelineKey,
    uniform_offset: u32,
    start: usize,
    end: usize,
    /// Vertices per instance.
    vertices: u32,
}

impl LineDraw {
    fn instance_count(&self) -> u32 {
        let len = (self.end - self.start) as u32;
        match self.key.topology {
            Topology::List => len / 2,
            Topology::Strip => len.saturating_sub(1),
            Topology::Joint(_) => len.saturating_sub(2),
        }
    }
}

/// Renderer for line gizmos (lists, strips and strip joints).
///
/// Every batch of every pass is packed into one position buffer and one color
/// buffer per frame; each draw addresses its range with buffer slices.
pub struct LineGizmoRenderer {
    shader: Option<wgpu::ShaderModule>,
    joint_shader: Option<wgpu::ShaderModule>,
    uniform_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    uniforms: DynamicUniformBuffer<LineGizmoUniform>,
    positions: InstanceBuffer<Vec3>,
    colors: InstanceBuffer<LinearRgba>,

    staged_positions: Vec<Vec3>,
    staged_colors: Vec<LinearRgba>,
    draws: Vec<LineDraw>,
}

impl Default for LineGizmoRenderer {
    fn default() -> Self {
        Self {
            shader: None,
            joint_shader: None,
            uniform_layout: None,
            pipeline_layout: None,
            pipelines: HashMap::new(),
            uniforms: DynamicUniformBuffer::new("sigil line gizmo ubo"),
            positions: InstanceBuffer::new("sigil line gizmo positions"),
            colors: InstanceBuffer::new("sigil line gizmo colors"),
            staged_positions: Vec::new(),
            staged_colors: Vec::new(),
            draws: Vec::new(),
        }
    }
}

impl LineGizmoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs and uploads the line data of every pass and builds any missing
    /// pipeline.
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
                // Pairs only; a dangling list element is ignored.
                let list_len = storage.list_positions.len() & !1;
                let strip_len = storage.strip_positions.len();
                if list_len < 2 && strip_len < 2 {
                    continue;
                }

                let uniform_offset =
                    self.uniforms.push(ctx.device, &LineGizmoUniform::from(&batch.config));
                let perspective = batch.config.line_perspective;

                if list_len >= 2 {
                    let start = self.staged_positions.len();
                    self.staged_positions.extend_from_slice(&storage.list_positions[..list_len]);
                    self.staged_colors.extend_from_slice(&storage.list_colors[..list_len]);
                    self.draws.push(LineDraw {
                        pass,
                        key: PipelineKey::new(ctx, perspective, Topology::List),
                        uniform_offset,
                        start,
                        end: start + list_len,
                        vertices: VERTICES_PER_QUAD,
                    });
                }

                if strip_len >= 2 {
                    let start = self.staged_positions.len();
                    self.staged_positions.extend_from_slice(&storage.strip_positions);
                    self.staged_colors.extend_from_slice(&storage.strip_colors);
                    let strip = LineDraw {
                        pass,
                        key: PipelineKey::new(ctx, perspective, Topology::Strip),
                        uniform_offset,
                        start,
                        end: start + strip_len,
                        vertices: VERTICES_PER_QUAD,
                    };
                    self.draws.push(strip);

                    let joints = batch.config.line_joints;
                    let kind = JointKind::from_joint(joints).filter(|_| strip_len >= 3);
                    if let Some(kind) = kind {
                        self.draws.push(LineDraw {
                            key: PipelineKey::new(ctx, perspective, Topology::Joint(kind)),
                            vertices: joints.vertex_count(),
                            ..strip
                        });
                    }
                }
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

    /// Records the draws of `pass`. The view bind group (group 0) must
    /// already be set.
    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, pass: usize) {
        let Some(bind_group) = self.uniforms.bind_group() else { return };

        for draw in self.draws.iter().filter(|d| d.pass == pass) {
            let Some(pipeline) = self.pipelines.get(&draw.key) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, bind_group, &[draw.uniform_offset]);

            let (start, end) = (draw.start, draw.end);
            match draw.key.topology {
                Topology::List => {
                    let (Some(p), Some(c)) =
                        (self.positions.slice(start, end), self.colors.slice(start, end))
                    else {
                        continue;
                    };
                    rpass.set_vertex_buffer(0, p);
                    rpass.set_vertex_buffer(1, c);
                }
                Topology::Strip => {
                    let (Some(pa), Some(pb), Some(ca), Some(cb)) = (
                        self.positions.slice(start, end - 1),
                        self.positions.slice(start + 1, end),
                        self.colors.slice(start, end - 1),
                        self.colors.slice(start + 1, end),
                    ) else {
                        continue;
                    };
                    rpass.set_vertex_buffer(0, pa);
                    rpass.set_vertex_buffer(1, pb);
                    rpass.set_vertex_buffer(2, ca);
                    rpass.set_vertex_buffer(3, cb);
                }
                Topology::Joint(_) => {
                    let (Some(pa), Some(pb), Some(pc), Some(cb)) = (
                        self.positions.slice(start, end - 2),
                        self.positions.slice(start + 1, end - 1),
                        self.positions.slice(start + 2, end),
                        self.colors.slice(start + 1, end - 1),
                    ) else {
                        continue;
                    };
                    rpass.set_vertex_buffer(0, pa);
                    rpass.set_vertex_buffer(1, pb);
                    rpass.set_vertex_buffer(2, pc);
                    rpass.set_vertex_buffer(3, cb);
                }
            }

            rpass.draw(0..draw.vertices, 0..draw.instance_count());
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>, view_layout: &wgpu::BindGroupLayout) {
        if self.pipeline_layout.is_some() {
            return;
        }

        self.shader = Some(ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sigil line gizmo shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lines.wgsl").into()),
        }));
        self.joint_shader = Some(ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sigil line joint gizmo shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line_joints.wgsl").into()),
        }));

        let uniform_layout =
            dynamic_uniform_layout::<LineGizmoUniform>(ctx.device, "sigil line gizmo bgl");
        self.pipeline_layout = Some(ctx.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("sigil line gizmo pipeline layout"),
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
        let shader = match key.topology {
            Topology::Joint(_) => self.joint_shader.as_ref(),
            Topology::List | Topology::Strip => self.shader.as_ref(),
        };
        let (Some(shader), Some(layout)) = (shader, self.pipeline_layout.as_ref()) else {
            return;
        };

        log::debug!("creating line gizmo pipeline {key:?}");

        let constants = key.constants();
        let list = list_layouts();
        let strip = strip_layouts();
        let joint = joint_layouts();
        let (label, entry_point, buffers): (_, _, &[wgpu::VertexBufferLayout<'_>]) =
            match key.topology {
                Topology::List => ("sigil line gizmo list pipeline", "vs_main", &list[..]),
                Topology::Strip => ("sigil line gizmo strip pipeline", "vs_main", &strip[..]),
                Topology::Joint(kind) => {
                    ("sigil line gizmo joint pipeline", kind.entry_point(), &joint[..])
                }
            };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    ..Default::default()
                },
                buffers,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn key(topology: Topology) -> PipelineKey {
        PipelineKey {
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: None,
            sample_count: 1,
            perspective: false,
            topology,
        }
    }

    #[test]
    fn list_layout_reads_pairs() {
        let [positions, colors] = list_layouts();
        assert_eq!(positions.array_stride, 24);
        assert_eq!(colors.array_stride, 32);
        assert_eq!(positions.attributes[1].offset, 12);
        assert_eq!(colors.attributes[1].offset, 16);
        assert_eq!(colors.attributes[1].shader_location, 3);
    }

    #[test]
    fn strip_layout_has_no_attribute_offsets() {
        for layout in strip_layouts() {
            assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
            assert!(layout.attributes.iter().all(|a| a.offset == 0));
        }
        let locations: Vec<u32> = strip_layouts()
            .iter()
            .map(|l| l.attributes[0].shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }

    #[test]
    fn joint_layout_reads_three_positions_and_the_middle_color() {
        let layouts = joint_layouts();
        let locations: Vec<(u32, u64)> = layouts
            .iter()
            .map(|l| (l.attributes[0].shader_location, l.array_stride))
            .collect();
        assert_eq!(locations, vec![(0, 12), (1, 12), (2, 12), (3, 16)]);
        assert!(layouts.iter().all(|l| l.attributes[0].offset == 0));
    }

    #[test]
    fn instance_counts() {
        let list = LineDraw {
            pass: 0,
            key: key(Topology::List),
            uniform_offset: 0,
            start: 10,
            end: 16,
            vertices: VERTICES_PER_QUAD,
        };
        assert_eq!(list.instance_count(), 3);

        let strip = LineDraw { key: key(Topology::Strip), ..list };
        assert_eq!(strip.instance_count(), 5);

        let joints = LineDraw {
            key: key(Topology::Joint(JointKind::Bevel)),
            vertices: 3,
            ..list
        };
        assert_eq!(joints.instance_count(), 4);
    }
}
