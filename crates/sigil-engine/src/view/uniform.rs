use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

/// Render-target rectangle in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` target.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Width over height, `1.0` for degenerate viewports.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// View uniform shared by both gizmo programs (`@group(0) @binding(0)`).
///
/// Layout (80 bytes):
///
///  offset  0  clip_from_world  mat4x4<f32>
///  offset 64  viewport         vec4<f32>   (.xy = origin, .zw = size in px)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    pub clip_from_world: Mat4,
    pub viewport: Vec4,
}

impl ViewUniform {
    pub fn new(clip_from_world: Mat4, viewport: Viewport) -> Self {
        // Zero-sized targets would divide by zero in the screen-space mapping.
        let viewport = Vec4::new(
            viewport.x,
            viewport.y,
            viewport.width.max(1.0),
            viewport.height.max(1.0),
        );
        Self { clip_from_world, viewport }
    }

    /// Target size in physical pixels (`viewport.zw`).
    #[inline]
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.viewport.z, self.viewport.w)
    }
}
