//! A camera with a fixed view-projection matrix.

use glam::{Mat4, Vec3};

use super::Camera;

/// A camera whose view-projection is fixed until replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera {
    view_projection: Mat4,
    upsampling: f32,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }
}

impl FixedCamera {
    /// Camera using `view_projection` as is.
    pub fn from_matrix(view_projection: Mat4) -> Self {
        Self {
            view_projection,
            upsampling: 1.0,
        }
    }

    /// Perspective camera at `eye` looking at `target`. `fovy` is the
    /// vertical field of view in degrees.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        aspect: f32,
        fovy: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        // [0,1] depth range, matching wgpu
        let proj = Mat4::perspective_rh(fovy.to_radians(), aspect, znear, zfar);
        Self::from_matrix(proj * view)
    }

    /// Same camera rendering at `factor` times the window resolution.
    pub fn with_upsampling(mut self, factor: f32) -> Self {
        self.upsampling = factor.max(1.0);
        self
    }

    /// Replace the view-projection matrix.
    pub fn set_view_projection(&mut self, view_projection: Mat4) {
        self.view_projection = view_projection;
    }
}

impl Camera for FixedCamera {
    fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    fn upsampling_factor(&self) -> f32 {
        self.upsampling
    }
}
