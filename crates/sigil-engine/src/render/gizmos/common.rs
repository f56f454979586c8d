//! Shared GPU types and utilities used by the gizmo renderers.

use std::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::gizmos::GizmoLineJoint;
use crate::render::RenderCtx;

// ── blend / depth ─────────────────────────────────────────────────────────

/// Straight (non-premultiplied) alpha; gizmo colors carry the thinness fade
/// in their alpha channel.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Reverse-Z depth state: nearer fragments have larger depth.
pub(super) fn depth_stencil_state(
    format: Option<wgpu::TextureFormat>,
) -> Option<wgpu::DepthStencilState> {
    format.map(|format| wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Greater,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

pub(super) fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        // Quads flip winding with the line direction.
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

// ── pipeline key ──────────────────────────────────────────────────────────

/// Joint styles that need their own vertex entry point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) enum JointKind {
    Miter,
    Round,
    Bevel,
}

impl JointKind {
    /// `None` when the style draws nothing.
    pub(super) fn from_joint(joint: GizmoLineJoint) -> Option<Self> {
        match joint {
            GizmoLineJoint::None | GizmoLineJoint::Round(0) => None,
            GizmoLineJoint::Miter => Some(JointKind::Miter),
            GizmoLineJoint::Round(_) => Some(JointKind::Round),
            GizmoLineJoint::Bevel => Some(JointKind::Bevel),
        }
    }

    pub(super) fn entry_point(self) -> &'static str {
        match self {
            JointKind::Miter => "vs_miter",
            JointKind::Round => "vs_round",
            JointKind::Bevel => "vs_bevel",
        }
    }
}

/// How a pipeline reads its instance buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) enum Topology {
    /// Independent primitives: segment pairs, or one billboard per point.
    List,
    /// Connected segments; the instance buffers are bound twice.
    Strip,
    /// Corners of a strip; positions are bound three times.
    Joint(JointKind),
}

/// Everything a gizmo pipeline is specialized on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
    pub perspective: bool,
    pub topology: Topology,
}

impl PipelineKey {
    pub(super) fn new(ctx: &RenderCtx<'_>, perspective: bool, topology: Topology) -> Self {
        Self {
            color_format: ctx.color_format,
            depth_format: ctx.depth_format,
            sample_count: ctx.sample_count.max(1),
            perspective,
            topology,
        }
    }

    /// Pipeline-overridable constants for this key.
    pub(super) fn constants(&self) -> [(&'static str, f64); 1] {
        [("PERSPECTIVE", if self.perspective { 1.0 } else { 0.0 })]
    }

    pub(super) fn multisample(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }
}

// ── uniform helpers ───────────────────────────────────────────────────────

/// `size` rounded up to a multiple of `alignment` (a power of two, or 0).
pub(super) fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// Minimum binding size for a uniform of type `T`. `None` only for ZSTs.
pub(super) fn min_binding_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

/// Bind group layout with one vertex-stage uniform at binding 0, addressed
/// with a dynamic offset.
pub(super) fn dynamic_uniform_layout<T>(
    device: &wgpu::Device,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: min_binding_size::<T>(),
            },
            count: None,
        }],
    })
}

/// Uniform buffer holding many `T`s at `min_uniform_buffer_offset_alignment`
/// stride, each selected with a dynamic offset.
pub(super) struct DynamicUniformBuffer<T: Pod> {
    label: &'static str,
    staging: Vec<u8>,
    buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    _marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniformBuffer<T> {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            staging: Vec::new(),
            buffer: None,
            bind_group: None,
            _marker: PhantomData,
        }
    }

    pub(super) fn clear(&mut self) {
        self.staging.clear();
    }

    /// Appends `value` and returns its dynamic offset.
    pub(super) fn push(&mut self, device: &wgpu::Device, value: &T) -> u32 {
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = align_to(std::mem::size_of::<T>() as u64, alignment) as usize;

        let offset = self.staging.len();
        self.staging.extend_from_slice(bytemuck::bytes_of(value));
        self.staging.resize(offset + stride, 0);
        offset as u32
    }

    /// Uploads everything pushed since the last `clear`, growing the buffer
    /// (and rebuilding the bind group) when needed.
    pub(super) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) {
        if self.staging.is_empty() {
            return;
        }

        let required = self.staging.len() as u64;
        let fits = self.buffer.as_ref().is_some_and(|b| b.size() >= required);
        if !fits || self.bind_group.is_none() {
            let size = required.next_power_of_two();
            log::trace!("{}: growing to {size} bytes", self.label);

            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(self.label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: min_binding_size::<T>(),
                    }),
                }],
            });
            self.buffer = Some(buffer);
            self.bind_group = Some(bind_group);
        }

        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, &self.staging);
        }
    }

    pub(super) fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

// ── instance buffer ───────────────────────────────────────────────────────

/// Growable vertex buffer of instance-stepped `T`s.
pub(super) struct InstanceBuffer<T: Pod> {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> InstanceBuffer<T> {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Replaces the buffer contents with `data`.
    pub(super) fn write(&mut self, ctx: &RenderCtx<'_>, data: &[T]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.capacity || self.buffer.is_none() {
            let new_cap = data.len().next_power_of_two().max(64);
            log::trace!("{}: growing to {new_cap} elements", self.label);
            self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (new_cap * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = new_cap;
        }
        if let Some(buffer) = self.buffer.as_ref() {
            ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        }
    }

    /// Slice of elements `start..end`.
    pub(super) fn slice(&self, start: usize, end: usize) -> Option<wgpu::BufferSlice<'_>> {
        let size = std::mem::size_of::<T>() as u64;
        self.buffer
            .as_ref()
            .map(|b| b.slice(start as u64 * size..end as u64 * size))
    }
}
