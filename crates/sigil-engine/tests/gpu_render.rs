//! Headless render of gizmo batches, checked against the CPU vertex programs.
//!
//! Skips (with a note on stderr) when no wgpu adapter is available.

use glam::{Vec2, Vec3};

use sigil_engine::color::LinearRgba;
use sigil_engine::gizmos::vertex::{
    billboard_vertex, clip_to_screen, line_vertex, BillboardInstance, LineInstance,
};
use sigil_engine::gizmos::{
    BillboardGizmoUniform, DefaultGizmoConfigGroup, GizmoConfig, GizmoLineJoint, GizmoSet,
    LineGizmoUniform,
};
use sigil_engine::render::gizmos::{GizmoPass, GizmoRenderer};
use sigil_engine::render::{RenderCtx, RenderTarget};
use sigil_engine::view::{Camera, ViewUniform, Viewport};

const SIZE: u32 = 64;
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Headless {
    fn new() -> Option<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::LowPower,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;
            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("sigil test device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    experimental_features: wgpu::ExperimentalFeatures::disabled(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    trace: wgpu::Trace::Off,
                })
                .await
                .ok()?;
            Some(Self { device, queue })
        })
    }

    fn target(&self, format: wgpu::TextureFormat) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sigil test target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Clears to black and far depth, draws `set` through `view`, reads
    /// back color (RGBA8) and depth.
    fn render(&self, view: ViewUniform, set: &mut GizmoSet) -> Frame {
        let color = self.target(COLOR_FORMAT);
        let depth = self.target(DEPTH_FORMAT);
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sigil test clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let batches = set.take_batches();
        let ctx = RenderCtx::new(
            &self.device,
            &self.queue,
            COLOR_FORMAT,
            Viewport::from_size(SIZE as f32, SIZE as f32),
        )
        .with_depth_format(DEPTH_FORMAT);
        let mut target = RenderTarget::new(&mut encoder, &color_view).with_depth(&depth_view);
        let mut renderer = GizmoRenderer::new();
        renderer.render(&ctx, &mut target, &[GizmoPass::new(view, &batches)]);
        set.recycle(batches);

        let color_buffer = self.readback_buffer();
        let depth_buffer = self.readback_buffer();
        copy(&mut encoder, &color, &color_buffer, wgpu::TextureAspect::All);
        copy(&mut encoder, &depth, &depth_buffer, wgpu::TextureAspect::DepthOnly);
        self.queue.submit([encoder.finish()]);

        let color = self.map(&color_buffer);
        let depth = bytemuck::pod_collect_to_vec::<u8, f32>(&self.map(&depth_buffer));
        Frame { color, depth }
    }

    fn readback_buffer(&self) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sigil test readback"),
            size: (SIZE * SIZE * 4) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    }

    fn map(&self, buffer: &wgpu::Buffer) -> Vec<u8> {
        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .expect("device poll");
        rx.recv().expect("map callback").expect("map readback buffer");
        let bytes = slice.get_mapped_range().to_vec();
        buffer.unmap();
        bytes
    }
}

/// Rows of 64 texels of 4 bytes are already 256-byte aligned.
fn copy(
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
    buffer: &wgpu::Buffer,
    aspect: wgpu::TextureAspect,
) {
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect,
        },
        wgpu::TexelCopyBufferInfo {
            buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(SIZE * 4),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
}

struct Frame {
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Frame {
    /// Texel under screen position `p` (bottom-left origin).
    fn index(p: Vec2) -> usize {
        let col = p.x.floor() as usize;
        let row = (SIZE as f32 - p.y).floor() as usize;
        row * SIZE as usize + col
    }

    fn rgb(&self, p: Vec2) -> [u8; 3] {
        let i = Self::index(p) * 4;
        [self.color[i], self.color[i + 1], self.color[i + 2]]
    }

    fn depth(&self, p: Vec2) -> f32 {
        self.depth[Self::index(p)]
    }
}

/// Screen-space bounds and depth of the six vertices of one quad.
fn quad_bounds(view: &ViewUniform, clips: impl Iterator<Item = glam::Vec4>) -> (Vec2, Vec2, f32) {
    let (mut min, mut max, mut depth) = (Vec2::MAX, Vec2::MIN, 0.0);
    for clip in clips {
        let screen = clip_to_screen(clip, view.resolution());
        min = min.min(screen);
        max = max.max(screen);
        depth = clip.z / clip.w;
    }
    (min, max, depth)
}

fn inside(p: Vec2, (min, max, _): (Vec2, Vec2, f32)) -> bool {
    p.cmpgt(min).all() && p.cmplt(max).all()
}

#[test]
fn strips_and_billboards_land_where_the_cpu_model_puts_them() {
    let Some(gpu) = Headless::new() else {
        eprintln!("skipping gpu_render: no wgpu adapter available");
        return;
    };

    let viewport = Viewport::from_size(SIZE as f32, SIZE as f32);
    let view = Camera::pixel_2d(viewport).view_uniform(viewport);
    let config = GizmoConfig::default()
        .with_line_width(6.0)
        .with_line_joints(GizmoLineJoint::Bevel)
        .with_billboard_size(Vec2::splat(8.0));

    let mut set = GizmoSet::new();
    set.insert_group(DefaultGizmoConfigGroup, config);
    let red = LinearRgba::rgb(1.0, 0.0, 0.0);
    let green = LinearRgba::rgb(0.0, 1.0, 0.0);
    let strip = [
        Vec3::new(-20.0, -10.0, 0.0),
        Vec3::new(0.0, -10.0, 0.0),
        Vec3::new(0.0, 20.0, 0.0),
    ];
    {
        let mut g = set.gizmos::<DefaultGizmoConfigGroup>();
        g.linestrip(strip, red);
        g.billboard(Vec3::new(15.0, 15.0, 0.0), green);
    }
    let frame = gpu.render(view, &mut set);

    let line_uniform = LineGizmoUniform::from(&config);
    let segment = LineInstance {
        position_a: strip[0],
        position_b: strip[1],
        color_a: red,
        color_b: red,
    };
    let line_quad = quad_bounds(
        &view,
        (0..6).map(|i| line_vertex(&view, &line_uniform, false, &segment, i).clip_position),
    );
    let on_line = Vec2::new(21.5, 22.5);
    assert!(inside(on_line, line_quad));
    assert_eq!(frame.rgb(on_line), [255, 0, 0]);
    assert!((frame.depth(on_line) - line_quad.2).abs() < 1e-4);

    let billboard_uniform = BillboardGizmoUniform::from(&config);
    let billboard = BillboardInstance {
        position: Vec3::new(15.0, 15.0, 0.0),
        color: green,
    };
    let billboard_quad = quad_bounds(
        &view,
        (0..6).map(|i| {
            billboard_vertex(&view, &billboard_uniform, false, &billboard, i).clip_position
        }),
    );
    let on_billboard = Vec2::new(47.5, 47.5);
    assert!(inside(on_billboard, billboard_quad));
    assert_eq!(frame.rgb(on_billboard), [0, 255, 0]);
    assert!((frame.depth(on_billboard) - billboard_quad.2).abs() < 1e-4);

    let empty = Vec2::new(4.5, 60.5);
    assert!(!inside(empty, line_quad) && !inside(empty, billboard_quad));
    assert_eq!(frame.rgb(empty), [0, 0, 0]);
    assert_eq!(frame.depth(empty), 0.0);
}

#[test]
fn perspective_lines_shrink_with_distance() {
    let Some(gpu) = Headless::new() else {
        eprintln!("skipping gpu_render: no wgpu adapter available");
        return;
    };

    let viewport = Viewport::from_size(SIZE as f32, SIZE as f32);
    let view = Camera::default().view_uniform(viewport);
    let config = GizmoConfig::default().with_line_width(40.0).with_perspective(true);

    let mut set = GizmoSet::new();
    set.insert_group(DefaultGizmoConfigGroup, config);
    let white = LinearRgba::WHITE;
    set.gizmos::<DefaultGizmoConfigGroup>()
        .line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), white);
    let frame = gpu.render(view, &mut set);

    let uniform = LineGizmoUniform::from(&config);
    let line = LineInstance {
        position_a: Vec3::new(-1.0, 0.0, 0.0),
        position_b: Vec3::new(1.0, 0.0, 0.0),
        color_a: white,
        color_b: white,
    };
    let quad = quad_bounds(
        &view,
        (0..6).map(|i| line_vertex(&view, &uniform, true, &line, i).clip_position),
    );
    // 40 px at a view distance of 5.
    assert!((quad.1.y - quad.0.y - 8.0).abs() < 1e-3);

    let center = Vec2::new(32.5, 32.5);
    assert!(inside(center, quad));
    assert_eq!(frame.rgb(center), [255, 255, 255]);
    assert!((frame.depth(center) - quad.2).abs() < 1e-4);
    assert_eq!(frame.rgb(Vec2::new(32.5, 40.5)), [0, 0, 0]);
}
