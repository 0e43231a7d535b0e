//! The closed set of things a scene node can draw.

use glam::Vec3;

use super::debug_box::DebugBox;
use crate::camera::Camera;
use crate::error::MolGeomError;
use crate::geom::{Geometry, LineGeom, MeshGeom};
use crate::gpu::{Pass, RenderContext, ShaderCatalog};
use crate::util::Interval;

/// Anything a [`SceneNode`](super::SceneNode) can carry.
#[derive(Debug)]
pub enum Drawable {
    /// Bond lines, traces.
    Lines(LineGeom),
    /// Spheres and other triangle meshes.
    Mesh(MeshGeom),
    /// Bounds visualization. Drawn in the normal pass only and never part
    /// of the bounds it shows.
    DebugBox(DebugBox),
}

impl Drawable {
    /// Molecular geometry behind this drawable, if any.
    pub fn geometry(&self) -> Option<&dyn Geometry> {
        match self {
            Self::Lines(g) => Some(g),
            Self::Mesh(g) => Some(g),
            Self::DebugBox(_) => None,
        }
    }

    /// Mutable molecular geometry behind this drawable, if any.
    pub fn geometry_mut(&mut self) -> Option<&mut dyn Geometry> {
        match self {
            Self::Lines(g) => Some(g),
            Self::Mesh(g) => Some(g),
            Self::DebugBox(_) => None,
        }
    }

    /// Draw for `pass` with the programs of `style`. Returns the number of
    /// draws issued.
    ///
    /// # Errors
    ///
    /// Propagates failures of the rendering context.
    pub fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        camera: &dyn Camera,
        catalog: &ShaderCatalog,
        style: &str,
        pass: Pass,
    ) -> Result<usize, MolGeomError> {
        match self {
            Self::Lines(g) => g.draw(ctx, camera, catalog, style, pass),
            Self::Mesh(g) => g.draw(ctx, camera, catalog, style, pass),
            Self::DebugBox(b) => match (pass, catalog.style(style)) {
                (Pass::Normal, Some(shader)) => b.draw(ctx, camera, shader),
                _ => Ok(0),
            },
        }
    }

    /// Widen `intervals` by the visible geometry; debug boxes contribute
    /// nothing.
    pub fn update_projection_intervals(
        &self,
        axes: &[Vec3; 3],
        intervals: &mut [Interval; 3],
    ) {
        if let Some(g) = self.geometry() {
            g.base().update_projection_intervals(axes, intervals);
        }
    }

    /// Grow `radius_sq` over the visible geometry; debug boxes contribute
    /// nothing.
    pub fn update_squared_sphere_radius(
        &self,
        center: Vec3,
        radius_sq: f32,
    ) -> f32 {
        self.geometry().map_or(radius_sq, |g| {
            g.base().update_squared_sphere_radius(center, radius_sq)
        })
    }

    /// Release ids and GPU buffers.
    pub fn destroy(self, ctx: &mut dyn RenderContext) {
        match self {
            Self::Lines(g) => g.destroy(ctx),
            Self::Mesh(g) => g.destroy(ctx),
            Self::DebugBox(b) => b.destroy(ctx),
        }
    }
}

impl From<LineGeom> for Drawable {
    fn from(geom: LineGeom) -> Self {
        Self::Lines(geom)
    }
}

impl From<MeshGeom> for Drawable {
    fn from(geom: MeshGeom) -> Self {
        Self::Mesh(geom)
    }
}

impl From<DebugBox> for Drawable {
    fn from(debug_box: DebugBox) -> Self {
        Self::DebugBox(debug_box)
    }
}
