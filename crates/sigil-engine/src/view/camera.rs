use glam::{Mat4, Vec3};

use super::{ViewUniform, Viewport};

/// Projection model for a [`Camera`]. Both variants produce reverse-Z clip space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Infinite perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        near: f32,
    },
    /// Orthographic projection centered on the view axis.
    Orthographic {
        /// Visible height in world units; width follows the aspect ratio.
        height: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
        }
    }
}

/// Look-at camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }
}

impl Camera {
    pub fn looking_at(eye: Vec3, target: Vec3, projection: Projection) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            projection,
        }
    }

    /// Orthographic camera for 2D overlays.
    ///
    /// One world unit maps to one physical pixel, the origin sits at the
    /// viewport center and +Y points up. 2D gizmos live on the `z = 0` plane.
    pub fn pixel_2d(viewport: Viewport) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 1000.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::Orthographic {
                height: viewport.height.max(1.0),
                near: 0.0,
                far: 2000.0,
            },
        }
    }

    pub fn view_from_world(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn clip_from_view(&self, aspect_ratio: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y, near } => {
                Mat4::perspective_infinite_reverse_rh(fov_y, aspect_ratio, near)
            }
            Projection::Orthographic { height, near, far } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect_ratio;
                // Swapped near/far yields reverse-Z.
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, far, near)
            }
        }
    }

    pub fn clip_from_world(&self, aspect_ratio: f32) -> Mat4 {
        self.clip_from_view(aspect_ratio) * self.view_from_world()
    }

    pub fn view_uniform(&self, viewport: Viewport) -> ViewUniform {
        ViewUniform::new(self.clip_from_world(viewport.aspect_ratio()), viewport)
    }
}
