//! Camera binding for geometry draws.
//!
//! Geometry containers do no view math. They hand the camera the program
//! about to draw and the symmetry transform of the copy being drawn, and
//! the camera loads whatever uniforms that program needs.

/// Fixed perspective and matrix cameras.
pub mod core;

use glam::Mat4;

pub use self::core::FixedCamera;
use crate::gpu::{uniforms, RenderContext, ShaderHandle};

/// Supplies view uniforms for each draw.
pub trait Camera {
    /// Combined view-projection matrix.
    fn view_projection(&self) -> Mat4;

    /// Render-target scale relative to the window (supersampling).
    fn upsampling_factor(&self) -> f32 {
        1.0
    }

    /// Make `shader` current and load the view-projection and `symmetry`
    /// transform into it.
    fn bind(
        &self,
        ctx: &mut dyn RenderContext,
        shader: ShaderHandle,
        symmetry: &Mat4,
    ) {
        ctx.use_program(shader);
        let view_projection = self.view_projection();
        ctx.set_uniform_mat4(uniforms::VIEW_PROJECTION, &view_projection);
        ctx.set_uniform_mat4(uniforms::SYMMETRY, symmetry);
    }
}
