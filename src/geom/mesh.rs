//! Indexed triangle geometry: spheres and surfaces.

use std::sync::Arc;

use super::base::{select_shader, GeomBase, Geometry};
use super::partition::Partitioner;
use super::vertex_array::{VertexLayout, MAX_SEGMENT_VERTS};
use crate::gpu::{Pass, RenderContext, ShaderCatalog, ShaderHandle};
use crate::mol::Structure;
use crate::picking::IdPoolHandle;

/// Triangle meshes of one structure representation.
#[derive(Debug)]
pub struct MeshGeom {
    base: GeomBase,
}

impl MeshGeom {
    /// Empty mesh geometry with the default 65536-vertex segment cap.
    pub fn new(structure: Arc<Structure>, pool: IdPoolHandle) -> Self {
        Self::with_cap(structure, pool, MAX_SEGMENT_VERTS)
    }

    /// Empty mesh geometry with segments capped at `cap` vertices.
    pub fn with_cap(
        structure: Arc<Structure>,
        pool: IdPoolHandle,
        cap: usize,
    ) -> Self {
        let partitioner = Partitioner::with_cap(VertexLayout::Mesh, cap);
        Self {
            base: GeomBase::new(structure, pool, partitioner),
        }
    }

    /// Release ids and GPU buffers.
    pub fn destroy(self, ctx: &mut dyn RenderContext) {
        self.base.destroy(ctx);
    }
}

impl Geometry for MeshGeom {
    fn base(&self) -> &GeomBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeomBase {
        &mut self.base
    }

    fn shader_for(
        &self,
        catalog: &ShaderCatalog,
        style: &str,
        pass: Pass,
    ) -> Option<ShaderHandle> {
        match pass {
            Pass::Outline => catalog.outline,
            Pass::Select => select_shader(&self.base, catalog.select),
            Pass::Normal => catalog.style(style),
        }
    }
}
