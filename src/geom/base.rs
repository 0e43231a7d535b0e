//! State and behavior shared by line and mesh containers.

use std::sync::Arc;

use glam::Vec3;

use super::assoc::VertexAssoc;
use super::partition::Partitioner;
use super::symmetry::{self, ShowRelated};
use super::vertex_array::VertexArray;
use crate::camera::Camera;
use crate::color::ColorOp;
use crate::error::MolGeomError;
use crate::gpu::{Pass, RenderContext, ShaderCatalog, ShaderHandle};
use crate::mol::{Assembly, CentralAtom, Structure, View};
use crate::picking::{IdPoolHandle, IdRange, PickTarget};
use crate::util::Interval;

/// Segments, vertex associations and picking ids of one representation of
/// one structure.
///
/// Dropping a container returns its id range to the pool. GPU buffers need
/// a context to be freed, so call [`GeomBase::destroy`] (or the container's
/// `destroy`) when one is at hand.
#[derive(Debug)]
pub struct GeomBase {
    structure: Arc<Structure>,
    partitioner: Partitioner,
    assocs: Vec<VertexAssoc>,
    pool: IdPoolHandle,
    ids: Option<IdRange>,
    visible: bool,
    show_related: ShowRelated,
    translucent: bool,
}

impl GeomBase {
    /// Empty container for `structure`, allocating segments through
    /// `partitioner` and picking ids from `pool`.
    pub fn new(
        structure: Arc<Structure>,
        pool: IdPoolHandle,
        partitioner: Partitioner,
    ) -> Self {
        Self {
            structure,
            partitioner,
            assocs: Vec::new(),
            pool,
            ids: None,
            visible: true,
            show_related: ShowRelated::Asym,
            translucent: false,
        }
    }

    /// Structure this geometry renders.
    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    /// Partitioner used to append vertices.
    pub fn partitioner(&mut self) -> &mut Partitioner {
        &mut self.partitioner
    }

    /// Segments in creation order.
    pub fn segments(&self) -> &[VertexArray] {
        self.partitioner.segments()
    }

    /// Register a vertex association used by recolor and opacity edits.
    pub fn add_assoc(&mut self, assoc: impl Into<VertexAssoc>) {
        self.assocs.push(assoc.into());
    }

    /// Vertex associations.
    pub fn assocs(&self) -> &[VertexAssoc] {
        &self.assocs
    }

    /// Reserve `n` picking ids. Any previously held range is released
    /// first. Returns `false` when the pool is exhausted; the container
    /// then draws nothing in the select pass.
    pub fn reserve_ids(&mut self, n: u32) -> bool {
        if let Some(old) = self.ids.take() {
            self.pool.release(old);
        }
        self.ids = self.pool.acquire(n);
        self.ids.is_some()
    }

    /// Held id range, if picking is available.
    pub fn id_range(&self) -> Option<&IdRange> {
        self.ids.as_ref()
    }

    /// Assign the next picking id to `target`. Without an id range every
    /// vertex gets id 0, which is never read back.
    ///
    /// # Panics
    ///
    /// Panics if more ids are assigned than were reserved.
    pub fn assign_id(&mut self, target: PickTarget) -> u16 {
        match self.ids.as_mut() {
            Some(range) => self.pool.next_id(range, target),
            None => 0,
        }
    }

    /// Whether the container draws and contributes to bounds.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the container.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Which symmetry copies are rendered.
    pub fn show_related(&self) -> &ShowRelated {
        &self.show_related
    }

    /// Choose which symmetry copies are rendered.
    pub fn set_show_related(&mut self, show: ShowRelated) {
        self.show_related = show;
    }

    /// Whether draws enable blending.
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    /// Recolor every associated vertex whose atom is in `view`.
    pub fn color_by(&mut self, op: &mut dyn ColorOp, view: &View) {
        op.begin(&self.structure);
        let segments = self.partitioner.segments_mut();
        for assoc in &self.assocs {
            assoc.recolor(&self.structure, &*op, view, segments);
        }
        op.end();
    }

    /// Set the alpha of every associated vertex whose atom is in `view`.
    ///
    /// Any alpha below one makes the container translucent; setting full
    /// opacity on the whole structure makes it opaque again.
    pub fn set_opacity(&mut self, alpha: f32, view: &View) {
        let segments = self.partitioner.segments_mut();
        for assoc in &self.assocs {
            assoc.set_opacity(&self.structure, alpha, view, segments);
        }
        if alpha < 1.0 {
            self.translucent = true;
        } else if view.is_all() {
            self.translucent = false;
        }
    }

    /// Current color of `atom`, from the first association that renders it.
    pub fn color_for_atom(&self, atom: u32) -> Option<[f32; 4]> {
        let segments = self.partitioner.segments();
        self.assocs
            .iter()
            .find_map(|a| a.color_for_atom(&self.structure, atom, segments))
    }

    /// Draw every segment instance with `shader`. Hidden containers and a
    /// missing shader draw nothing. Returns the number of draws issued.
    ///
    /// # Errors
    ///
    /// Propagates [`ContextError`](crate::gpu::ContextError) from the
    /// rendering context.
    pub fn draw_with(
        &mut self,
        ctx: &mut dyn RenderContext,
        camera: &dyn Camera,
        shader: Option<ShaderHandle>,
    ) -> Result<usize, MolGeomError> {
        let Some(shader) = shader.filter(|_| self.visible) else {
            return Ok(0);
        };
        let assembly =
            symmetry::active_assembly(&self.structure, &self.show_related);
        if self.translucent {
            ctx.set_blending(true);
        }
        let drawn = symmetry::draw_segments(
            ctx,
            camera,
            shader,
            self.partitioner.segments_mut(),
            assembly,
        );
        if self.translucent {
            ctx.set_blending(false);
        }
        Ok(drawn?)
    }

    /// Widen `intervals` by every rendered vertex projected onto `axes`.
    pub fn update_projection_intervals(
        &self,
        axes: &[Vec3; 3],
        intervals: &mut [Interval; 3],
    ) {
        if !self.visible {
            return;
        }
        let assembly = self.active_assembly();
        symmetry::update_projection_intervals(
            self.segments(),
            assembly,
            axes,
            intervals,
        );
    }

    /// Largest of `radius_sq` and the squared distance of every rendered
    /// vertex from `center`.
    pub fn update_squared_sphere_radius(
        &self,
        center: Vec3,
        radius_sq: f32,
    ) -> f32 {
        if !self.visible {
            return radius_sq;
        }
        symmetry::update_squared_sphere_radius(
            self.segments(),
            self.active_assembly(),
            center,
            radius_sq,
        )
    }

    /// Central atom of every rendered residue copy.
    pub fn central_atoms(
        &self,
    ) -> Box<dyn Iterator<Item = CentralAtom> + '_> {
        symmetry::central_atoms(&self.structure, self.active_assembly())
    }

    fn active_assembly(&self) -> Option<&Assembly> {
        symmetry::active_assembly(&self.structure, &self.show_related)
    }

    /// Release the id range and every GPU buffer.
    pub fn destroy(mut self, ctx: &mut dyn RenderContext) {
        if let Some(range) = self.ids.take() {
            self.pool.release(range);
        }
        for segment in self.partitioner.segments_mut() {
            segment.destroy(ctx);
        }
    }
}

impl Drop for GeomBase {
    fn drop(&mut self) {
        if let Some(range) = self.ids.take() {
            self.pool.release(range);
        }
    }
}

/// Common surface of the line and mesh containers.
pub trait Geometry {
    /// Shared state.
    fn base(&self) -> &GeomBase;

    /// Shared state, mutably.
    fn base_mut(&mut self) -> &mut GeomBase;

    /// Program drawing `style` in `pass`, if this kind of geometry takes
    /// part in that pass.
    fn shader_for(
        &self,
        catalog: &ShaderCatalog,
        style: &str,
        pass: Pass,
    ) -> Option<ShaderHandle>;

    /// Per-draw state set before the segments are drawn.
    fn prepare(&self, _ctx: &mut dyn RenderContext) {}

    /// Draw the geometry for `pass`. Returns the number of draws issued.
    ///
    /// # Errors
    ///
    /// Propagates failures of the rendering context.
    fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        camera: &dyn Camera,
        catalog: &ShaderCatalog,
        style: &str,
        pass: Pass,
    ) -> Result<usize, MolGeomError> {
        let shader = self.shader_for(catalog, style, pass);
        if shader.is_none() || !self.base().is_visible() {
            return Ok(0);
        }
        self.prepare(ctx);
        self.base_mut().draw_with(ctx, camera, shader)
    }

    /// See [`GeomBase::color_by`].
    fn color_by(&mut self, op: &mut dyn ColorOp, view: &View) {
        self.base_mut().color_by(op, view);
    }

    /// See [`GeomBase::set_opacity`].
    fn set_opacity(&mut self, alpha: f32, view: &View) {
        self.base_mut().set_opacity(alpha, view);
    }
}

/// Pick the select program, but only when the container holds ids.
pub(crate) fn select_shader(
    base: &GeomBase,
    program: Option<ShaderHandle>,
) -> Option<ShaderHandle> {
    program.filter(|_| base.id_range().is_some())
}
