//! The rendering-context capability and its bundled implementations.
//!
//! Geometry code draws through the [`RenderContext`] trait only. Two
//! contexts ship with the crate: [`CommandRecorder`] keeps everything in
//! memory for inspection and tests, [`WgpuBackend`] uploads to a wgpu
//! device and replays draws into a render pass.

/// The consumed rendering-context trait and its vocabulary types.
pub mod context;
/// Growable wgpu buffers.
pub mod dynamic_buffer;
/// In-memory recording context.
pub mod recorder;
/// Program handles, passes and the shader catalog.
pub mod shader;
/// Tracked draw state and frozen draw calls.
pub mod state;
/// wgpu-backed context.
pub mod wgpu_backend;

pub use context::{
    uniforms, AttribBinding, BufferHandle, BufferKind, ContextError,
    Primitive, RenderContext,
};
pub use recorder::{CommandRecorder, RecordedBuffer};
pub use shader::{Pass, ShaderCatalog, ShaderHandle};
pub use state::{DrawCall, DrawSource, DrawState, DrawUniforms};
pub use wgpu_backend::{vertex_buffer_layout, WgpuBackend};
