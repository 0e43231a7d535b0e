//! A [`RenderContext`] that records everything it is asked to do.
//!
//! Used headless: tests assert on the recorded draws, tools dump them, and
//! the buffer contents are kept in memory so uploads can be inspected.

use std::ops::Range;

use glam::Mat4;
use rustc_hash::FxHashMap;

use super::context::{
    AttribBinding, BufferHandle, BufferKind, ContextError, Primitive,
    RenderContext,
};
use super::shader::ShaderHandle;
use super::state::{DrawCall, DrawSource, DrawState};

/// A buffer as seen by the recorder.
#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    /// Binding kind.
    pub kind: BufferKind,
    /// Debug label.
    pub label: String,
    /// Last uploaded contents.
    pub data: Vec<u8>,
    /// Number of uploads received.
    pub uploads: u32,
}

/// Records draws and buffer traffic instead of rendering.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    state: DrawState,
    draws: Vec<DrawCall>,
    buffers: FxHashMap<BufferHandle, RecordedBuffer>,
    next_handle: u32,
    line_width: f32,
}

impl CommandRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws issued since the last [`clear_draws`](Self::clear_draws).
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forget recorded draws; buffers are kept.
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// Buffer behind `handle`, if it is still alive.
    pub fn buffer(&self, handle: BufferHandle) -> Option<&RecordedBuffer> {
        self.buffers.get(&handle)
    }

    /// Number of buffers not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Total uploads across all live buffers.
    pub fn total_uploads(&self) -> u32 {
        self.buffers.values().map(|b| b.uploads).sum()
    }

    /// Last line width requested.
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Current tracked state.
    pub fn state(&self) -> &DrawState {
        &self.state
    }
}

impl RenderContext for CommandRecorder {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
    ) -> Result<BufferHandle, ContextError> {
        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        let _ = self.buffers.insert(
            handle,
            RecordedBuffer {
                kind,
                label: label.to_owned(),
                data: Vec::new(),
                uploads: 0,
            },
        );
        Ok(handle)
    }

    fn upload_buffer(
        &mut self,
        buffer: BufferHandle,
        data: &[u8],
    ) -> Result<(), ContextError> {
        let recorded = self.buffers.get_mut(&buffer).ok_or_else(|| {
            ContextError::new(format!("upload to unknown buffer {buffer:?}"))
        })?;
        recorded.data.clear();
        recorded.data.extend_from_slice(data);
        recorded.uploads += 1;
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        let _ = self.buffers.remove(&buffer);
    }

    fn use_program(&mut self, program: ShaderHandle) {
        self.state.program = Some(program);
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
        self.state.uniforms.line_width = width;
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.state.set_f32(name, value);
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.state.set_i32(name, value);
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.state.set_mat4(name, value);
    }

    fn bind_attribute(&mut self, binding: AttribBinding) {
        let _ = self.state.attributes.insert(binding.location, binding);
    }

    fn release_attribute(&mut self, location: u32) {
        let _ = self.state.attributes.remove(&location);
    }

    fn draw_arrays(
        &mut self,
        primitive: Primitive,
        vertices: Range<u32>,
    ) -> Result<(), ContextError> {
        let call = self
            .state
            .snapshot(primitive, DrawSource::Arrays(vertices));
        self.draws.push(call);
        Ok(())
    }

    fn draw_elements(
        &mut self,
        primitive: Primitive,
        indices: BufferHandle,
        count: u32,
    ) -> Result<(), ContextError> {
        if !self.buffers.contains_key(&indices) {
            return Err(ContextError::new(format!(
                "draw with unknown index buffer {indices:?}"
            )));
        }
        let call = self
            .state
            .snapshot(primitive, DrawSource::Elements { indices, count });
        self.draws.push(call);
        Ok(())
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::uniforms;

    #[test]
    fn draws_capture_state() {
        let mut ctx = CommandRecorder::new();
        let vb = ctx.create_buffer(BufferKind::Vertex, "vb").unwrap();
        ctx.use_program(ShaderHandle(3));
        ctx.bind_attribute(AttribBinding {
            location: 0,
            buffer: vb,
            components: 3,
            stride: 32,
            offset: 0,
        });
        ctx.set_uniform_i32(uniforms::SYM_ID, 2);
        ctx.set_blending(true);
        ctx.draw_arrays(Primitive::Lines, 0..6).unwrap();

        let draw = &ctx.draws()[0];
        assert_eq!(draw.program, Some(ShaderHandle(3)));
        assert_eq!(draw.vertex_buffer, Some(vb));
        assert_eq!(draw.uniforms.sym_id, 2);
        assert!(draw.blending);
        assert_eq!(draw.element_count(), 6);
    }

    #[test]
    fn uploads_replace_contents() {
        let mut ctx = CommandRecorder::new();
        let b = ctx.create_buffer(BufferKind::Index, "ib").unwrap();
        ctx.upload_buffer(b, &[1, 2, 3]).unwrap();
        ctx.upload_buffer(b, &[4]).unwrap();
        let recorded = ctx.buffer(b).unwrap();
        assert_eq!(recorded.data, vec![4]);
        assert_eq!(recorded.uploads, 2);

        ctx.delete_buffer(b);
        assert!(ctx.upload_buffer(b, &[0]).is_err());
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn unknown_index_buffer_is_an_error() {
        let mut ctx = CommandRecorder::new();
        let err = ctx
            .draw_elements(Primitive::Triangles, BufferHandle(99), 3)
            .unwrap_err();
        assert!(err.to_string().contains("unknown index buffer"));
    }
}
