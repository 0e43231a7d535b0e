//! The rendering-context capability the geometry layer draws through.
//!
//! The geometry code never talks to a graphics API directly. It issues a
//! small set of GL-flavoured verbs (create/upload buffers, bind interleaved
//! attributes, set uniforms, draw lines or triangles) against a
//! [`RenderContext`]. [`CommandRecorder`](super::CommandRecorder) records
//! them for inspection; [`WgpuBackend`](super::WgpuBackend) replays them
//! into a `wgpu::RenderPass`.

use std::fmt;
use std::ops::Range;

use glam::Mat4;

use super::shader::ShaderHandle;

/// Uniform names understood by the bundled contexts.
pub mod uniforms {
    /// Camera view-projection matrix (mat4).
    pub const VIEW_PROJECTION: &str = "view_projection";
    /// Symmetry transform applied before the camera (mat4).
    pub const SYMMETRY: &str = "symmetry";
    /// Index of the symmetry transform, written into the pick target (i32).
    pub const SYM_ID: &str = "sym_id";
    /// Global opacity multiplier (f32).
    pub const OPACITY: &str = "opacity";
    /// Outline expansion width (f32).
    pub const OUTLINE_WIDTH: &str = "outline_width";
}

/// Opaque handle to a buffer owned by a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// What a buffer will be bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Interleaved vertex data.
    Vertex,
    /// 16-bit triangle indices.
    Index,
}

/// Primitive topology of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Independent line segments, two vertices each.
    Lines,
    /// Independent triangles, three indices each.
    Triangles,
}

/// Binds a strided region of a vertex buffer to an attribute location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribBinding {
    /// Attribute location in the program.
    pub location: u32,
    /// Source buffer.
    pub buffer: BufferHandle,
    /// Number of `f32` components.
    pub components: u32,
    /// Distance between consecutive vertices, in bytes.
    pub stride: u32,
    /// Offset of the first component, in bytes.
    pub offset: u32,
}

/// A failure reported by the underlying graphics layer. The geometry code
/// propagates it without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextError {
    message: String,
}

impl ContextError {
    /// Error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render context error: {}", self.message)
    }
}

impl std::error::Error for ContextError {}

/// The verbs the geometry layer needs from a graphics API.
pub trait RenderContext {
    /// Allocate a new, empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if the graphics layer cannot allocate it.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
    ) -> Result<BufferHandle, ContextError>;

    /// Replace a buffer's contents.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] for unknown handles or failed uploads.
    fn upload_buffer(
        &mut self,
        buffer: BufferHandle,
        data: &[u8],
    ) -> Result<(), ContextError>;

    /// Release a buffer. Unknown handles are ignored.
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Select the program subsequent draws use.
    fn use_program(&mut self, program: ShaderHandle);

    /// Line width for subsequent line draws, in pixels.
    fn set_line_width(&mut self, width: f32);

    /// Set a scalar uniform.
    fn set_uniform_f32(&mut self, name: &str, value: f32);

    /// Set an integer uniform.
    fn set_uniform_i32(&mut self, name: &str, value: i32);

    /// Set a matrix uniform.
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);

    /// Bind a vertex-buffer region as an attribute.
    fn bind_attribute(&mut self, binding: AttribBinding);

    /// Unbind the attribute at `location`.
    fn release_attribute(&mut self, location: u32);

    /// Draw `vertices` of the bound attributes without an index buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if the draw cannot be issued.
    fn draw_arrays(
        &mut self,
        primitive: Primitive,
        vertices: Range<u32>,
    ) -> Result<(), ContextError>;

    /// Draw the first `count` indices of `indices`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if the draw cannot be issued.
    fn draw_elements(
        &mut self,
        primitive: Primitive,
        indices: BufferHandle,
        count: u32,
    ) -> Result<(), ContextError>;

    /// Toggle alpha blending.
    fn set_blending(&mut self, enabled: bool);
}
