//! Atom spheres as indexed icosphere meshes.

use std::sync::Arc;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::PickIds;
use crate::color::ColorOp;
use crate::geom::{AtomVertexAssoc, Geometry, MeshGeom, VertexRef};
use crate::mol::{Structure, View};
use crate::options::GeometryOptions;
use crate::picking::{IdPoolHandle, PickTarget};

/// Highest subdivision level built; level 3 already has 642 vertices.
const MAX_DETAIL: u32 = 3;

/// A unit icosphere template with outward CCW winding.
#[derive(Debug, Clone)]
pub struct UnitSphere {
    positions: Vec<Vec3>,
    indices: Vec<u16>,
}

impl UnitSphere {
    /// Icosphere subdivided `detail` times (clamped to 3).
    /// Level 0 = icosahedron (20 triangles, 12 vertices)
    /// Level 1 = 80 triangles, 42 vertices
    /// Level 2 = 320 triangles, 162 vertices
    pub fn new(detail: u32) -> Self {
        let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let inv_len = 1.0 / (1.0 + phi * phi).sqrt();

        let mut positions: Vec<Vec3> = [
            (-1.0, phi, 0.0),
            (1.0, phi, 0.0),
            (-1.0, -phi, 0.0),
            (1.0, -phi, 0.0),
            (0.0, -1.0, phi),
            (0.0, 1.0, phi),
            (0.0, -1.0, -phi),
            (0.0, 1.0, -phi),
            (phi, 0.0, -1.0),
            (phi, 0.0, 1.0),
            (-phi, 0.0, -1.0),
            (-phi, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z) * inv_len)
        .collect();

        #[rustfmt::skip]
        let mut indices: Vec<u16> = vec![
            0, 5, 11,   0, 1, 5,    0, 7, 1,    0, 10, 7,   0, 11, 10,
            1, 9, 5,    5, 4, 11,   11, 2, 10,  10, 6, 7,   7, 8, 1,
            3, 4, 9,    3, 2, 4,    3, 6, 2,    3, 8, 6,    3, 9, 8,
            4, 5, 9,    2, 11, 4,   6, 10, 2,   8, 7, 6,    9, 1, 8,
        ];

        let mut midpoints: FxHashMap<(u16, u16), u16> = FxHashMap::default();
        for _ in 0..detail.min(MAX_DETAIL) {
            let mut next = Vec::with_capacity(indices.len() * 4);
            for tri in indices.chunks_exact(3) {
                let (v0, v1, v2) = (tri[0], tri[1], tri[2]);
                let a = midpoint(&mut positions, &mut midpoints, v0, v1);
                let b = midpoint(&mut positions, &mut midpoints, v1, v2);
                let c = midpoint(&mut positions, &mut midpoints, v2, v0);
                next.extend_from_slice(&[v0, a, c, v1, b, a, v2, c, b]);
                next.extend_from_slice(&[a, b, c]);
            }
            indices = next;
        }

        Self { positions, indices }
    }

    /// Vertex count.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Index count.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Unit positions; for a unit sphere these double as normals.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle indices into [`positions`](Self::positions).
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
}

fn midpoint(
    positions: &mut Vec<Vec3>,
    cache: &mut FxHashMap<(u16, u16), u16>,
    v0: u16,
    v1: u16,
) -> u16 {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
    *cache.entry(key).or_insert_with(|| {
        let mid = ((positions[usize::from(v0)] + positions[usize::from(v1)])
            * 0.5)
            .normalize();
        positions.push(mid);
        (positions.len() - 1) as u16
    })
}

/// Build one sphere per atom of `structure` in `view`.
pub fn spheres(
    structure: &Arc<Structure>,
    pool: IdPoolHandle,
    view: &View,
    op: &mut dyn ColorOp,
    options: &GeometryOptions,
) -> MeshGeom {
    let sphere = UnitSphere::new(options.sphere_detail);
    // a sphere is appended whole, so a segment must hold at least one
    let cap = options.segment_cap().max(sphere.vertex_count());
    if cap != options.segment_cap() {
        log::debug!(
            "segment cap {} below one sphere, raised to {cap}",
            options.segment_cap()
        );
    }
    let mut geom = MeshGeom::with_cap(Arc::clone(structure), pool, cap);
    let per_chain: Vec<Vec<u32>> = structure
        .chains()
        .iter()
        .map(|chain| {
            structure
                .residues_of(chain)
                .iter()
                .flat_map(|r| r.atoms.clone())
                .filter(|&a| view.contains_atom(a))
                .collect()
        })
        .collect();

    let base = geom.base_mut();
    PickIds::reserve(base, per_chain.iter().map(Vec::len).sum());

    op.begin(structure);
    let mut ids = PickIds::default();
    let mut assoc = AtomVertexAssoc::new();
    for (chain, atoms) in structure.chains().iter().zip(&per_chain) {
        if atoms.is_empty() {
            continue;
        }
        let _ = base.partitioner().begin_chain(
            chain.name.clone(),
            atoms.len() * sphere.vertex_count(),
            atoms.len() * sphere.index_count(),
        );
        for &atom in atoms {
            let center = structure.atom(atom).position;
            let color = op.color(structure, atom);
            let target = PickTarget::Atom {
                structure: structure.id(),
                atom,
            };
            let id = ids.get_or_assign(base, target);
            let (segment, va) =
                base.partitioner().ensure_space_for(sphere.vertex_count());
            let offset = va.num_verts();
            for &unit in sphere.positions() {
                let vertex = va.add_vertex(
                    center + unit * options.sphere_radius,
                    unit,
                    color,
                    id,
                );
                assoc.insert(
                    atom,
                    VertexRef {
                        segment,
                        vertex: usize::from(vertex),
                    },
                );
            }
            let offset = offset as u16;
            for tri in sphere.indices().chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i + offset);
                va.add_triangle(a, b, c);
            }
        }
    }
    op.end();

    log::debug!(
        "built spheres for '{}': {} atoms, {} segments",
        structure.name(),
        assoc.len(),
        base.segments().len()
    );
    base.add_assoc(assoc);
    geom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCamera;
    use crate::color;
    use crate::geom::MAX_SEGMENT_VERTS;
    use crate::gpu::{
        CommandRecorder, DrawSource, Pass, ShaderCatalog, ShaderHandle,
    };
    use crate::mol::StructureBuilder;

    fn row_of_waters(count: usize) -> Arc<Structure> {
        let mut b = StructureBuilder::new("waters");
        let _ = b.chain("A").residue("HOH", 1);
        for i in 0..count {
            let _ = b.atom("O", "O", Vec3::new(i as f32, 0.0, 0.0));
        }
        Arc::new(b.build())
    }

    fn build(
        structure: &Arc<Structure>,
        options: &GeometryOptions,
    ) -> MeshGeom {
        spheres(
            structure,
            IdPoolHandle::new(),
            &View::all(),
            &mut color::by_element(),
            options,
        )
    }

    #[test]
    fn icosphere_levels() {
        for (detail, verts, tris) in [(0, 12, 20), (1, 42, 80), (2, 162, 320)] {
            let sphere = UnitSphere::new(detail);
            assert_eq!(sphere.vertex_count(), verts);
            assert_eq!(sphere.index_count(), tris * 3);
            assert!(sphere
                .positions()
                .iter()
                .all(|p| (p.length() - 1.0).abs() < 1e-5));
        }
        assert_eq!(UnitSphere::new(9).vertex_count(), 642);
    }

    #[test]
    fn many_atoms_split_into_segments_with_local_indices() {
        let count: usize = 2000;
        let options = GeometryOptions {
            sphere_detail: 1,
            ..GeometryOptions::default()
        };
        let mut geom = build(&row_of_waters(count), &options);

        let per_segment = MAX_SEGMENT_VERTS / 42;
        let segments = geom.base().segments();
        assert_eq!(segments.len(), count.div_ceil(per_segment));
        for seg in segments {
            let n = seg.num_verts();
            assert!(n <= MAX_SEGMENT_VERTS);
            let indices = seg.indices().unwrap();
            assert!(indices.iter().all(|&i| usize::from(i) < n));
        }

        let mut catalog = ShaderCatalog::new();
        let _ = catalog.insert_style("spheres", ShaderHandle(1));
        let mut ctx = CommandRecorder::new();
        let camera = FixedCamera::default();
        let drawn = geom
            .draw(&mut ctx, &camera, &catalog, "spheres", Pass::Normal)
            .unwrap();
        assert_eq!(drawn, 2);
        let indices: u32 = ctx.draws().iter().map(|d| d.element_count()).sum();
        assert_eq!(indices as usize, count * 240);
        assert!(ctx
            .draws()
            .iter()
            .all(|d| matches!(d.source, DrawSource::Elements { .. })));
    }

    #[test]
    fn cap_below_one_sphere_still_builds() {
        for (detail, cap) in [(1, 30), (3, 600)] {
            let options = GeometryOptions {
                sphere_detail: detail,
                segment_vertex_cap: cap,
                ..GeometryOptions::default()
            };
            let geom = build(&row_of_waters(3), &options);
            let verts = UnitSphere::new(detail).vertex_count();
            // one sphere per segment
            let segments = geom.base().segments();
            assert_eq!(segments.len(), 3);
            assert!(segments.iter().all(|s| s.num_verts() == verts));
        }
    }
}
