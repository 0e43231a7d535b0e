//! Tracked pipeline state shared by the bundled contexts.
//!
//! Both [`CommandRecorder`](super::CommandRecorder) and
//! [`WgpuBackend`](super::WgpuBackend) accept the GL-style state verbs of
//! [`RenderContext`](super::RenderContext) into a [`DrawState`] and freeze a
//! copy of it into every [`DrawCall`].

use std::collections::BTreeMap;
use std::ops::Range;

use glam::Mat4;

use super::context::{uniforms, AttribBinding, BufferHandle, Primitive};
use super::shader::ShaderHandle;

/// Per-draw uniform block. Must match the WGSL `DrawUniforms` layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Camera view-projection, column major.
    pub view_projection: [[f32; 4]; 4],
    /// Symmetry transform, column major.
    pub symmetry: [[f32; 4]; 4],
    /// Global opacity multiplier.
    pub opacity: f32,
    /// Line width in pixels.
    pub line_width: f32,
    /// Outline expansion width.
    pub outline_width: f32,
    /// Symmetry transform index.
    pub sym_id: i32,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            symmetry: Mat4::IDENTITY.to_cols_array_2d(),
            opacity: 1.0,
            line_width: 1.0,
            outline_width: 0.0,
            sym_id: 0,
        }
    }
}

impl DrawUniforms {
    /// Symmetry transform as a matrix.
    pub fn symmetry_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.symmetry)
    }

    /// View-projection as a matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_projection)
    }
}

/// Where a draw takes its vertices from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawSource {
    /// A contiguous vertex range of the bound attributes.
    Arrays(Range<u32>),
    /// The first `count` entries of a 16-bit index buffer.
    Elements {
        /// Index buffer.
        indices: BufferHandle,
        /// Number of indices drawn.
        count: u32,
    },
}

/// A frozen draw: state at the time of the call plus what was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Program in use.
    pub program: Option<ShaderHandle>,
    /// Topology.
    pub primitive: Primitive,
    /// Vertex buffer bound at attribute location 0.
    pub vertex_buffer: Option<BufferHandle>,
    /// Vertex or index source.
    pub source: DrawSource,
    /// Uniform block.
    pub uniforms: DrawUniforms,
    /// Whether blending was enabled.
    pub blending: bool,
}

impl DrawCall {
    /// Number of vertices (or indices) consumed by the draw.
    pub fn element_count(&self) -> u32 {
        match &self.source {
            DrawSource::Arrays(range) => range.end - range.start,
            DrawSource::Elements { count, .. } => *count,
        }
    }
}

/// Mutable state accumulated between draws.
#[derive(Debug, Clone, Default)]
pub struct DrawState {
    /// Program in use.
    pub program: Option<ShaderHandle>,
    /// Uniform block being assembled.
    pub uniforms: DrawUniforms,
    /// Bound attributes by location.
    pub attributes: BTreeMap<u32, AttribBinding>,
    /// Blending toggle.
    pub blending: bool,
}

impl DrawState {
    /// Apply a scalar uniform. Unknown names are dropped.
    pub fn set_f32(&mut self, name: &str, value: f32) {
        match name {
            uniforms::OPACITY => self.uniforms.opacity = value,
            uniforms::OUTLINE_WIDTH => self.uniforms.outline_width = value,
            _ => log::trace!("ignoring unknown f32 uniform '{name}'"),
        }
    }

    /// Apply an integer uniform. Unknown names are dropped.
    pub fn set_i32(&mut self, name: &str, value: i32) {
        match name {
            uniforms::SYM_ID => self.uniforms.sym_id = value,
            _ => log::trace!("ignoring unknown i32 uniform '{name}'"),
        }
    }

    /// Apply a matrix uniform. Unknown names are dropped.
    pub fn set_mat4(&mut self, name: &str, value: &Mat4) {
        match name {
            uniforms::VIEW_PROJECTION => {
                self.uniforms.view_projection = value.to_cols_array_2d();
            }
            uniforms::SYMMETRY => {
                self.uniforms.symmetry = value.to_cols_array_2d();
            }
            _ => log::trace!("ignoring unknown mat4 uniform '{name}'"),
        }
    }

    /// Freeze the current state into a draw.
    pub fn snapshot(
        &self,
        primitive: Primitive,
        source: DrawSource,
    ) -> DrawCall {
        DrawCall {
            program: self.program,
            primitive,
            vertex_buffer: self.attributes.get(&0).map(|a| a.buffer),
            source,
            uniforms: self.uniforms,
            blending: self.blending,
        }
    }
}
