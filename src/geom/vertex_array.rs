//! Bounded, interleaved vertex-array segments.
//!
//! A segment holds at most 65536 vertices so every vertex is addressable
//! by a 16-bit index. Positions, optional normals, colors and the picking
//! id are interleaved in one `f32` buffer. Triangle segments carry their own
//! `u16` index buffer whose values never reach outside the segment.
//!
//! CPU-side edits mark the segment [`UploadState::Dirty`]; the next
//! [`VertexArray::bind`] re-uploads and flips it back to `Clean`.

use glam::Vec3;

use crate::gpu::{
    AttribBinding, BufferHandle, BufferKind, ContextError, Primitive,
    RenderContext,
};

/// Hard per-segment vertex ceiling imposed by 16-bit indices.
pub const MAX_SEGMENT_VERTS: usize = 1 << 16;

/// Interleaved layout of a segment's vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// `[position(3), color(4), object_id(1)]`, drawn as line pairs.
    Lines,
    /// `[position(3), normal(3), color(4), object_id(1)]`, drawn indexed.
    Mesh,
}

impl VertexLayout {
    /// Floats per vertex.
    pub const fn floats_per_vertex(self) -> usize {
        match self {
            Self::Lines => 8,
            Self::Mesh => 11,
        }
    }

    /// Bytes per vertex.
    pub const fn stride_bytes(self) -> u32 {
        (self.floats_per_vertex() * size_of::<f32>()) as u32
    }

    /// Float offset of the normal, if the layout has one.
    pub const fn normal_offset(self) -> Option<usize> {
        match self {
            Self::Lines => None,
            Self::Mesh => Some(3),
        }
    }

    /// Float offset of the RGBA color.
    pub const fn color_offset(self) -> usize {
        match self {
            Self::Lines => 3,
            Self::Mesh => 6,
        }
    }

    /// Float offset of the picking id.
    pub const fn id_offset(self) -> usize {
        self.color_offset() + 4
    }

    /// Primitive this layout is drawn with.
    pub const fn primitive(self) -> Primitive {
        match self {
            Self::Lines => Primitive::Lines,
            Self::Mesh => Primitive::Triangles,
        }
    }

    /// `(location, components, float offset)` of every attribute.
    fn attributes(self) -> &'static [(u32, u32, usize)] {
        match self {
            Self::Lines => &[(0, 3, 0), (1, 4, 3), (2, 1, 7)],
            Self::Mesh => &[(0, 3, 0), (1, 3, 3), (2, 4, 6), (3, 1, 10)],
        }
    }
}

/// Whether the GPU copy of a segment matches its CPU data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// GPU buffers hold the current data.
    Clean,
    /// CPU data changed since the last upload.
    Dirty,
}

#[derive(Debug, Clone, Copy)]
struct GpuBuffers {
    vertices: BufferHandle,
    indices: Option<BufferHandle>,
}

/// One bounded vertex-array segment belonging to a single chain.
#[derive(Debug)]
pub struct VertexArray {
    chain: String,
    layout: VertexLayout,
    data: Vec<f32>,
    max_verts: usize,
    indices: Option<Vec<u16>>,
    state: UploadState,
    gpu: Option<GpuBuffers>,
}

impl VertexArray {
    /// Empty segment for `chain` with room for `max_verts` vertices and,
    /// for meshes, a reserved index capacity of `index_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `max_verts` exceeds [`MAX_SEGMENT_VERTS`].
    pub fn new(
        chain: impl Into<String>,
        layout: VertexLayout,
        max_verts: usize,
        index_capacity: usize,
    ) -> Self {
        assert!(
            max_verts <= MAX_SEGMENT_VERTS,
            "segment capacity {max_verts} exceeds 16-bit index range"
        );
        let indices = match layout {
            VertexLayout::Lines => None,
            VertexLayout::Mesh => Some(Vec::with_capacity(index_capacity)),
        };
        Self {
            chain: chain.into(),
            layout,
            data: Vec::with_capacity(max_verts * layout.floats_per_vertex()),
            max_verts,
            indices,
            state: UploadState::Dirty,
            gpu: None,
        }
    }

    /// Chain tag this segment renders.
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Vertex layout.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Vertices written so far.
    pub fn num_verts(&self) -> usize {
        self.data.len() / self.layout.floats_per_vertex()
    }

    /// Declared vertex capacity.
    pub fn max_verts(&self) -> usize {
        self.max_verts
    }

    /// Vertex slots still free.
    pub fn free_verts(&self) -> usize {
        self.max_verts - self.num_verts()
    }

    /// Indices written so far (zero for line segments).
    pub fn num_indices(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Index buffer contents, for mesh segments.
    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    /// Upload state.
    pub fn upload_state(&self) -> UploadState {
        self.state
    }

    fn push_vertex(
        &mut self,
        position: Vec3,
        normal: Option<Vec3>,
        color: [f32; 4],
        object_id: f32,
    ) -> u16 {
        let index = self.num_verts();
        assert!(
            index < self.max_verts,
            "segment for chain '{}' is full ({} vertices)",
            self.chain,
            self.max_verts
        );
        self.data.extend_from_slice(&position.to_array());
        if self.layout.normal_offset().is_some() {
            let n = normal.unwrap_or(Vec3::Z);
            self.data.extend_from_slice(&n.to_array());
        }
        self.data.extend_from_slice(&color);
        self.data.push(object_id);
        self.state = UploadState::Dirty;
        index as u16
    }

    /// Append a mesh vertex and return its segment-local index.
    ///
    /// # Panics
    ///
    /// Panics if the segment is full or is a line segment.
    pub fn add_vertex(
        &mut self,
        position: Vec3,
        normal: Vec3,
        color: [f32; 4],
        object_id: u16,
    ) -> u16 {
        assert!(
            self.layout == VertexLayout::Mesh,
            "add_vertex on a line segment"
        );
        self.push_vertex(position, Some(normal), color, f32::from(object_id))
    }

    /// Append a triangle referencing vertices of this segment.
    ///
    /// # Panics
    ///
    /// Panics if any index is not below [`num_verts`](Self::num_verts), or
    /// if this is a line segment.
    pub fn add_triangle(&mut self, a: u16, b: u16, c: u16) {
        let num_verts = self.num_verts();
        for index in [a, b, c] {
            assert!(
                usize::from(index) < num_verts,
                "index {index} outside segment of {num_verts} vertices"
            );
        }
        assert!(self.indices.is_some(), "add_triangle on a line segment");
        if let Some(indices) = self.indices.as_mut() {
            indices.extend_from_slice(&[a, b, c]);
            self.state = UploadState::Dirty;
        }
    }

    /// Append a line from `start` to `end` with per-end colors and ids.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two vertex slots are free, or if this is a mesh
    /// segment.
    pub fn add_line(
        &mut self,
        start: Vec3,
        start_color: [f32; 4],
        end: Vec3,
        end_color: [f32; 4],
        start_id: u16,
        end_id: u16,
    ) {
        assert!(
            self.layout == VertexLayout::Lines,
            "add_line on a mesh segment"
        );
        let _ = self.push_vertex(start, None, start_color, f32::from(start_id));
        let _ = self.push_vertex(end, None, end_color, f32::from(end_id));
    }

    fn offset(&self, index: usize, field: usize) -> usize {
        index * self.layout.floats_per_vertex() + field
    }

    /// Position of vertex `index`.
    pub fn position(&self, index: usize) -> Vec3 {
        let at = self.offset(index, 0);
        Vec3::from_slice(&self.data[at..at + 3])
    }

    /// Iterator over all vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.data
            .chunks_exact(self.layout.floats_per_vertex())
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// RGBA color of vertex `index`.
    pub fn color(&self, index: usize) -> [f32; 4] {
        let at = self.offset(index, self.layout.color_offset());
        [
            self.data[at],
            self.data[at + 1],
            self.data[at + 2],
            self.data[at + 3],
        ]
    }

    /// Overwrite the RGBA color of vertex `index`.
    pub fn set_color(&mut self, index: usize, color: [f32; 4]) {
        let at = self.offset(index, self.layout.color_offset());
        self.data[at..at + 4].copy_from_slice(&color);
        self.state = UploadState::Dirty;
    }

    /// Overwrite only the alpha channel of vertex `index`.
    pub fn set_opacity(&mut self, index: usize, alpha: f32) {
        let at = self.offset(index, self.layout.color_offset() + 3);
        self.data[at] = alpha;
        self.state = UploadState::Dirty;
    }

    /// Picking id stored at vertex `index`.
    pub fn object_id(&self, index: usize) -> u16 {
        self.data[self.offset(index, self.layout.id_offset())] as u16
    }

    /// Center and radius of a sphere enclosing every vertex, or `None`
    /// when the segment is empty.
    pub fn bounding_sphere(&self) -> Option<(Vec3, f32)> {
        let count = self.num_verts();
        if count == 0 {
            return None;
        }
        let center = self.positions().sum::<Vec3>() / count as f32;
        let radius_sq = self
            .positions()
            .map(|p| p.distance_squared(center))
            .fold(0.0_f32, f32::max);
        Some((center, radius_sq.sqrt()))
    }

    /// Upload if dirty and bind the interleaved attributes.
    ///
    /// # Errors
    ///
    /// Propagates [`ContextError`] from buffer creation or upload.
    pub fn bind(
        &mut self,
        ctx: &mut dyn RenderContext,
    ) -> Result<(), ContextError> {
        let gpu = self.ensure_uploaded(ctx)?;
        let stride = self.layout.stride_bytes();
        for &(location, components, offset) in self.layout.attributes() {
            ctx.bind_attribute(AttribBinding {
                location,
                buffer: gpu.vertices,
                components,
                stride,
                offset: (offset * size_of::<f32>()) as u32,
            });
        }
        Ok(())
    }

    /// Unbind the attributes bound by [`bind`](Self::bind).
    pub fn release_attribs(&self, ctx: &mut dyn RenderContext) {
        for &(location, _, _) in self.layout.attributes() {
            ctx.release_attribute(location);
        }
    }

    /// Issue the draw for this segment. Must follow [`bind`](Self::bind).
    ///
    /// # Errors
    ///
    /// Propagates [`ContextError`] from the draw.
    pub fn draw(
        &self,
        ctx: &mut dyn RenderContext,
    ) -> Result<(), ContextError> {
        let primitive = self.layout.primitive();
        match (self.gpu.and_then(|g| g.indices), &self.indices) {
            (Some(buffer), Some(indices)) => {
                if indices.is_empty() {
                    return Ok(());
                }
                ctx.draw_elements(primitive, buffer, indices.len() as u32)
            }
            _ => {
                let count = self.num_verts() as u32;
                if count == 0 {
                    return Ok(());
                }
                ctx.draw_arrays(primitive, 0..count)
            }
        }
    }

    fn ensure_uploaded(
        &mut self,
        ctx: &mut dyn RenderContext,
    ) -> Result<GpuBuffers, ContextError> {
        let gpu = match self.gpu {
            Some(gpu) => gpu,
            None => {
                let label = format!("segment '{}'", self.chain);
                let vertices = ctx.create_buffer(BufferKind::Vertex, &label)?;
                let indices = match self.indices {
                    Some(_) => {
                        Some(ctx.create_buffer(BufferKind::Index, &label)?)
                    }
                    None => None,
                };
                let gpu = GpuBuffers { vertices, indices };
                self.gpu = Some(gpu);
                gpu
            }
        };
        if self.state == UploadState::Dirty {
            log::trace!(
                "uploading segment '{}': {} vertices, {} indices",
                self.chain,
                self.num_verts(),
                self.num_indices()
            );
            ctx.upload_buffer(gpu.vertices, bytemuck::cast_slice(&self.data))?;
            if let (Some(buffer), Some(indices)) = (gpu.indices, &self.indices)
            {
                ctx.upload_buffer(buffer, bytemuck::cast_slice(indices))?;
            }
            self.state = UploadState::Clean;
        }
        Ok(gpu)
    }

    /// Release the GPU buffers. The CPU data stays, so a later bind would
    /// recreate them.
    pub fn destroy(&mut self, ctx: &mut dyn RenderContext) {
        if let Some(gpu) = self.gpu.take() {
            ctx.delete_buffer(gpu.vertices);
            if let Some(indices) = gpu.indices {
                ctx.delete_buffer(indices);
            }
        }
        self.state = UploadState::Dirty;
    }
}
