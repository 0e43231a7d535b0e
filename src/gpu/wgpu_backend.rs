//! Replays recorded geometry draws through wgpu.
//!
//! Buffer verbs act immediately: vertex and index data go straight to
//! [`DynamicBuffer`]s through the queue. Draw verbs are collected for the
//! frame and turned into real commands by [`WgpuBackend::encode`], which
//! packs every draw's uniform block into one dynamic-offset uniform buffer
//! and looks up the pipeline registered for the draw's program, topology
//! and blend state.
//!
//! Programs are compiled by the caller. Pipelines must use
//! [`WgpuBackend::uniform_layout`] as bind group 0 and one of the layouts
//! from [`vertex_buffer_layout`] as vertex buffer 0.

use std::num::NonZeroU64;
use std::ops::Range;

use glam::Mat4;
use rustc_hash::FxHashMap;

use super::context::{
    AttribBinding, BufferHandle, BufferKind, ContextError, Primitive,
    RenderContext,
};
use super::dynamic_buffer::DynamicBuffer;
use super::shader::ShaderHandle;
use super::state::{DrawCall, DrawSource, DrawState, DrawUniforms};
use crate::geom::VertexLayout;

/// position, color, object id
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32];

/// position, normal, color, object id
const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3, 1 => Float32x3, 2 => Float32x4, 3 => Float32
];

/// Vertex buffer layout matching the interleaved segment format.
pub fn vertex_buffer_layout(
    layout: VertexLayout,
) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match layout {
        VertexLayout::Lines => &LINE_ATTRIBUTES,
        VertexLayout::Mesh => &MESH_ATTRIBUTES,
    };
    wgpu::VertexBufferLayout {
        array_stride: u64::from(layout.stride_bytes()),
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// wgpu topology for a primitive.
pub fn primitive_topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

/// Distance between uniform blocks in the per-frame uniform buffer.
fn uniform_stride(alignment: u32) -> u64 {
    (size_of::<DrawUniforms>() as u64).next_multiple_of(u64::from(alignment))
}

/// Every draw's uniform block, each at a multiple of `stride`.
fn pack_uniforms(frame: &[DrawCall], stride: usize) -> Vec<u8> {
    let mut block = vec![0u8; stride * frame.len()];
    for (chunk, draw) in block.chunks_exact_mut(stride).zip(frame) {
        let bytes = bytemuck::bytes_of(&draw.uniforms);
        chunk[..bytes.len()].copy_from_slice(bytes);
    }
    block
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ShaderHandle,
    primitive: Primitive,
    blending: bool,
}

/// [`RenderContext`] backed by a wgpu device.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffers: FxHashMap<BufferHandle, DynamicBuffer>,
    next_handle: u32,
    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,
    state: DrawState,
    frame: Vec<DrawCall>,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: DynamicBuffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
}

impl WgpuBackend {
    /// Backend drawing with `device` and uploading through `queue`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let block_size = size_of::<DrawUniforms>() as u64;
        let uniform_stride =
            uniform_stride(device.limits().min_uniform_buffer_offset_alignment);

        let uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Uniforms Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(block_size),
                    },
                    count: None,
                }],
            });

        let uniform_buffer = DynamicBuffer::new(
            &device,
            "Draw Uniforms",
            uniform_stride * 64,
            wgpu::BufferUsages::UNIFORM,
        );
        let uniform_bind_group =
            Self::uniform_bind_group(&device, &uniform_layout, &uniform_buffer);

        Self {
            device,
            queue,
            buffers: FxHashMap::default(),
            next_handle: 0,
            pipelines: FxHashMap::default(),
            state: DrawState::default(),
            frame: Vec::new(),
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
        }
    }

    fn uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer.buffer(),
                    offset: 0,
                    size: NonZeroU64::new(size_of::<DrawUniforms>() as u64),
                }),
            }],
        })
    }

    /// Bind group layout pipelines must use at group 0.
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    /// Register the pipeline used for `program` drawing `primitive` with
    /// blending on or off.
    pub fn register_pipeline(
        &mut self,
        program: ShaderHandle,
        primitive: Primitive,
        blending: bool,
        pipeline: wgpu::RenderPipeline,
    ) {
        let key = PipelineKey {
            program,
            primitive,
            blending,
        };
        let _ = self.pipelines.insert(key, pipeline);
    }

    /// Draws collected since the last encode.
    pub fn pending_draws(&self) -> &[DrawCall] {
        &self.frame
    }

    /// Drop collected draws without encoding them.
    pub fn discard_frame(&mut self) {
        self.frame.clear();
    }

    /// Encode all collected draws into `pass` and clear the frame.
    ///
    /// Draws without a registered pipeline, or whose buffers have since
    /// been deleted, are skipped with a warning. Returns the number of
    /// draws encoded.
    pub fn encode(&mut self, pass: &mut wgpu::RenderPass<'_>) -> usize {
        let mut frame = std::mem::take(&mut self.frame);
        if frame.is_empty() {
            self.frame = frame;
            return 0;
        }

        let stride = self.uniform_stride as usize;
        let block = pack_uniforms(&frame, stride);
        if self
            .uniform_buffer
            .write_bytes(&self.device, &self.queue, &block)
        {
            self.uniform_bind_group = Self::uniform_bind_group(
                &self.device,
                &self.uniform_layout,
                &self.uniform_buffer,
            );
        }

        let mut encoded = 0;
        for (i, draw) in frame.iter().enumerate() {
            if self.encode_draw(pass, draw, (i * stride) as u32) {
                encoded += 1;
            }
        }

        frame.clear();
        self.frame = frame;
        encoded
    }

    fn encode_draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        draw: &DrawCall,
        uniform_offset: u32,
    ) -> bool {
        let Some(program) = draw.program else {
            log::warn!("skipping draw issued without a program");
            return false;
        };
        let key = PipelineKey {
            program,
            primitive: draw.primitive,
            blending: draw.blending,
        };
        let Some(pipeline) = self.pipelines.get(&key) else {
            log::warn!("no pipeline registered for {key:?}");
            return false;
        };
        let Some(vertices) =
            draw.vertex_buffer.and_then(|h| self.buffers.get(&h))
        else {
            log::warn!("skipping draw without a live vertex buffer");
            return false;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[uniform_offset]);
        pass.set_vertex_buffer(0, vertices.buffer().slice(..));
        match &draw.source {
            DrawSource::Arrays(range) => pass.draw(range.clone(), 0..1),
            DrawSource::Elements { indices, count } => {
                let Some(indices) = self.buffers.get(indices) else {
                    log::warn!("skipping draw with deleted index buffer");
                    return false;
                };
                pass.set_index_buffer(
                    indices.buffer().slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..*count, 0, 0..1);
            }
        }
        true
    }
}

impl RenderContext for WgpuBackend {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
    ) -> Result<BufferHandle, ContextError> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        let buffer = DynamicBuffer::new(&self.device, label, 0, usage);
        let _ = self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn upload_buffer(
        &mut self,
        buffer: BufferHandle,
        data: &[u8],
    ) -> Result<(), ContextError> {
        let target = self.buffers.get_mut(&buffer).ok_or_else(|| {
            ContextError::new(format!("upload to unknown buffer {buffer:?}"))
        })?;
        let _ = target.write_bytes(&self.device, &self.queue, data);
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(removed) = self.buffers.remove(&buffer) {
            removed.buffer().destroy();
        }
    }

    fn use_program(&mut self, program: ShaderHandle) {
        self.state.program = Some(program);
    }

    fn set_line_width(&mut self, width: f32) {
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
        self.frame.push(call);
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
        self.frame.push(call);
        Ok(())
    }

    fn set_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
    }
}
