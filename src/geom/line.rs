//! Line-list geometry: bonds, traces and wire boxes.

use std::sync::Arc;

use super::base::{select_shader, GeomBase, Geometry};
use super::partition::Partitioner;
use super::vertex_array::{VertexLayout, MAX_SEGMENT_VERTS};
use crate::gpu::{Pass, RenderContext, ShaderCatalog, ShaderHandle};
use crate::mol::Structure;
use crate::picking::IdPoolHandle;

/// Line segments of one structure representation.
///
/// Lines take no part in the outline pass and pick through the dedicated
/// `select_lines` program.
#[derive(Debug)]
pub struct LineGeom {
    base: GeomBase,
    line_width: f32,
}

impl LineGeom {
    /// Empty line geometry with the default 65536-vertex segment cap.
    pub fn new(structure: Arc<Structure>, pool: IdPoolHandle) -> Self {
        Self::with_cap(structure, pool, MAX_SEGMENT_VERTS)
    }

    /// Empty line geometry with segments capped at `cap` vertices.
    pub fn with_cap(
        structure: Arc<Structure>,
        pool: IdPoolHandle,
        cap: usize,
    ) -> Self {
        let partitioner = Partitioner::with_cap(VertexLayout::Lines, cap);
        Self {
            base: GeomBase::new(structure, pool, partitioner),
            line_width: 1.0,
        }
    }

    /// Line width in pixels.
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Set the line width in pixels.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Release ids and GPU buffers.
    pub fn destroy(self, ctx: &mut dyn RenderContext) {
        self.base.destroy(ctx);
    }
}

impl Geometry for LineGeom {
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
            Pass::Outline => None,
            Pass::Select => select_shader(&self.base, catalog.select_lines),
            Pass::Normal => catalog.style(style),
        }
    }

    fn prepare(&self, ctx: &mut dyn RenderContext) {
        ctx.set_line_width(self.line_width);
    }
}
