//! Batched geometry: bounded vertex-array segments, their partitioning,
//! vertex-to-atom associations and symmetry replication.
//!
//! Everything drawn through this module is split into segments of at most
//! 65536 vertices so each can be indexed with 16-bit indices. A
//! [`LineGeom`] or [`MeshGeom`] owns the segments of one representation and
//! replays them once per symmetry transform of the active assembly.

mod assoc;
mod base;
mod line;
mod mesh;
mod partition;
pub mod symmetry;
mod vertex_array;

pub use assoc::{AtomVertexAssoc, ResidueVertexAssoc, VertexAssoc, VertexRef};
pub use base::{GeomBase, Geometry};
pub use line::LineGeom;
pub use mesh::MeshGeom;
pub use partition::Partitioner;
pub use symmetry::ShowRelated;
pub use vertex_array::{
    UploadState, VertexArray, VertexLayout, MAX_SEGMENT_VERTS,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Mat4, Vec3};
    use rand::seq::SliceRandom;

    use super::*;
    use crate::camera::FixedCamera;
    use crate::color;
    use crate::gpu::{CommandRecorder, Pass, ShaderCatalog, ShaderHandle};
    use crate::mol::{
        Assembly, Structure, StructureBuilder, SymmetryGenerator, View,
    };
    use crate::picking::{IdPoolHandle, PickTarget, MAX_IDS};
    use crate::util::Interval;

    const WHITE: [f32; 4] = [1.0; 4];
    const STYLE: ShaderHandle = ShaderHandle(1);
    const SELECT: ShaderHandle = ShaderHandle(2);
    const SELECT_LINES: ShaderHandle = ShaderHandle(3);
    const OUTLINE: ShaderHandle = ShaderHandle(4);

    fn catalog() -> ShaderCatalog {
        let mut catalog = ShaderCatalog::new();
        let _ = catalog.insert_style("lines", STYLE);
        catalog.select = Some(SELECT);
        catalog.select_lines = Some(SELECT_LINES);
        catalog.outline = Some(OUTLINE);
        catalog
    }

    fn shift(x: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    /// Chain A (two atoms) and chain B (one atom); assembly "1" replicates
    /// A three times and B once.
    fn structure() -> Arc<Structure> {
        let mut b = StructureBuilder::new("s");
        let _ = b.chain("A").residue("ALA", 1);
        let _ = b.atom("CA", "C", Vec3::ZERO);
        let _ = b.atom("CB", "C", Vec3::X);
        let _ = b.chain("B").residue("GLY", 1);
        let _ = b.atom("CA", "C", Vec3::Y);
        let _ = b.assembly(Assembly::new(
            "1",
            vec![
                SymmetryGenerator::new(
                    ["A"],
                    vec![shift(0.0), shift(10.0), shift(20.0)],
                ),
                SymmetryGenerator::new(["B"], vec![Mat4::IDENTITY]),
            ],
        ));
        Arc::new(b.build())
    }

    /// One line per chain, each in its own segment, with atom associations.
    fn line_geom(pool: &IdPoolHandle) -> LineGeom {
        let s = structure();
        let mut geom = LineGeom::new(Arc::clone(&s), pool.clone());
        let base = geom.base_mut();
        assert!(base.reserve_ids(3));
        let ids: Vec<u16> = (0..3)
            .map(|atom| base.assign_id(PickTarget::Atom { structure: 0, atom }))
            .collect();

        let mut assoc = AtomVertexAssoc::new();
        let _ = base.partitioner().begin_chain("A", 2, 0);
        let (seg, va) = base.partitioner().ensure_space_for(2);
        va.add_line(Vec3::ZERO, WHITE, Vec3::X, WHITE, ids[0], ids[1]);
        assoc.insert(0, VertexRef { segment: seg, vertex: 0 });
        assoc.insert(1, VertexRef { segment: seg, vertex: 1 });

        let _ = base.partitioner().begin_chain("B", 2, 0);
        let (seg, va) = base.partitioner().ensure_space_for(2);
        va.add_line(Vec3::Y, WHITE, Vec3::Y, WHITE, ids[2], ids[2]);
        assoc.insert(2, VertexRef { segment: seg, vertex: 0 });
        assoc.insert(2, VertexRef { segment: seg, vertex: 1 });
        base.add_assoc(assoc);
        geom
    }

    fn draw(geom: &mut LineGeom, pass: Pass) -> CommandRecorder {
        let mut ctx = CommandRecorder::new();
        let _ = geom
            .draw(&mut ctx, &FixedCamera::default(), &catalog(), "lines", pass)
            .unwrap();
        ctx
    }

    #[test]
    fn assembly_draw_count_is_segments_times_transforms() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        geom.base_mut().set_show_related(ShowRelated::Assembly("1".into()));

        let ctx = draw(&mut geom, Pass::Normal);
        assert_eq!(ctx.draws().len(), 4);
        let xs: Vec<f32> = ctx
            .draws()
            .iter()
            .map(|d| d.uniforms.symmetry_matrix().w_axis.x)
            .collect();
        assert_eq!(xs, [0.0, 10.0, 20.0, 0.0]);
        let sym_ids: Vec<i32> =
            ctx.draws().iter().map(|d| d.uniforms.sym_id).collect();
        assert_eq!(sym_ids, [0, 1, 2, 3]);
        // two segments, each uploaded once despite repeated draws
        assert_eq!(ctx.total_uploads(), 2);
    }

    #[test]
    fn dangling_assembly_draws_like_asym() {
        let pool = IdPoolHandle::new();
        let mut asym = line_geom(&pool);
        let mut dangling = line_geom(&pool);
        dangling
            .base_mut()
            .set_show_related(ShowRelated::Assembly("missing".into()));

        let a = draw(&mut asym, Pass::Normal);
        let d = draw(&mut dangling, Pass::Normal);
        assert_eq!(a.draws().len(), 2);
        assert_eq!(d.draws().len(), a.draws().len());
        for (x, y) in a.draws().iter().zip(d.draws()) {
            assert_eq!(x.uniforms, y.uniforms);
            assert_eq!(x.source, y.source);
        }

        let axes = [Vec3::X, Vec3::Y, Vec3::Z];
        let mut ia = [Interval::EMPTY; 3];
        let mut id = [Interval::EMPTY; 3];
        asym.base().update_projection_intervals(&axes, &mut ia);
        dangling.base().update_projection_intervals(&axes, &mut id);
        assert_eq!(ia, id);
        assert_eq!(
            asym.base().central_atoms().count(),
            dangling.base().central_atoms().count()
        );
    }

    #[test]
    fn pass_policies() {
        let pool = IdPoolHandle::new();
        let mut lines = line_geom(&pool);
        assert!(draw(&mut lines, Pass::Outline).draws().is_empty());
        let select = draw(&mut lines, Pass::Select);
        assert_eq!(select.draws()[0].program, Some(SELECT_LINES));

        let cat = catalog();
        let mesh = MeshGeom::new(structure(), pool.clone());
        let outline = mesh.shader_for(&cat, "lines", Pass::Outline);
        assert_eq!(outline, Some(OUTLINE));
        assert_eq!(mesh.shader_for(&cat, "lines", Pass::Normal), Some(STYLE));
        // no id range yet, so no picking
        assert_eq!(mesh.shader_for(&cat, "lines", Pass::Select), None);
        assert_eq!(mesh.shader_for(&cat, "cartoon", Pass::Normal), None);
    }

    #[test]
    fn exhausted_pool_disables_select() {
        let pool = IdPoolHandle::new();
        let hog = pool.acquire(MAX_IDS).unwrap();
        let mut geom = LineGeom::new(structure(), pool.clone());
        assert!(!geom.base_mut().reserve_ids(1));
        let atom = PickTarget::Atom {
            structure: 0,
            atom: 0,
        };
        assert_eq!(geom.base_mut().assign_id(atom), 0);
        assert!(draw(&mut geom, Pass::Select).draws().is_empty());
        pool.release(hog);
    }

    #[test]
    fn hidden_geometry_draws_and_bounds_nothing() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        geom.base_mut().set_visible(false);
        assert!(draw(&mut geom, Pass::Normal).draws().is_empty());
        let radius_sq =
            geom.base().update_squared_sphere_radius(Vec3::ZERO, 0.5);
        assert_eq!(radius_sq, 0.5);
    }

    #[test]
    fn squared_radius_is_order_independent() {
        let mut rng = rand::rng();
        let mut points: Vec<Vec3> = (0..64)
            .map(|i| {
                let t = i as f32 * 0.37;
                Vec3::new(t.sin() * 5.0, t.cos() * 3.0, t * 0.1)
            })
            .collect();
        let pool = IdPoolHandle::new();

        let radius_of = |points: &[Vec3]| {
            let mut geom = LineGeom::with_cap(structure(), pool.clone(), 16);
            let base = geom.base_mut();
            let _ = base.partitioner().begin_chain("A", points.len(), 0);
            for pair in points.chunks_exact(2) {
                let (_, va) = base.partitioner().ensure_space_for(2);
                va.add_line(pair[0], WHITE, pair[1], WHITE, 0, 0);
            }
            geom.base().update_squared_sphere_radius(Vec3::ONE, 0.0)
        };

        let expected = radius_of(&points);
        for _ in 0..8 {
            points.shuffle(&mut rng);
            assert_eq!(radius_of(&points), expected);
        }
    }

    #[test]
    fn recolor_round_trip_respects_view() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        let red = [1.0, 0.0, 0.0, 1.0];
        geom.color_by(&mut color::uniform(red), &View::from_atoms([0, 2]));

        let base = geom.base();
        assert_eq!(base.color_for_atom(0), Some(red));
        assert_eq!(base.color_for_atom(1), Some(WHITE));
        assert_eq!(base.color_for_atom(2), Some(red));
        assert!(base
            .segments()
            .iter()
            .all(|s| s.upload_state() == UploadState::Dirty));
    }

    #[test]
    fn translucent_draws_blend() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        geom.set_opacity(0.5, &View::all());
        assert!(geom.base().is_translucent());
        let ctx = draw(&mut geom, Pass::Normal);
        assert!(ctx.draws().iter().all(|d| d.blending));
        assert!(!ctx.state().blending);

        geom.set_opacity(1.0, &View::all());
        assert!(!geom.base().is_translucent());
    }

    #[test]
    fn destroy_frees_ids_and_buffers() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        let mut ctx = CommandRecorder::new();
        let camera = FixedCamera::default();
        let _ = geom
            .draw(&mut ctx, &camera, &catalog(), "lines", Pass::Normal)
            .unwrap();
        assert_eq!(ctx.live_buffers(), 2);
        assert_eq!(pool.stats().live_ids, 3);

        geom.destroy(&mut ctx);
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(pool.stats().live_ids, 0);
        assert!(pool.lookup(0).is_none());
        assert_eq!(pool.stats().free_ranges, 1);
    }

    #[test]
    fn dropped_geometry_returns_ids() {
        let pool = IdPoolHandle::new();
        drop(line_geom(&pool));
        assert_eq!(pool.stats().live_ids, 0);
        assert_eq!(pool.stats().free_ranges, 1);
    }

    #[test]
    fn line_width_reaches_context() {
        let pool = IdPoolHandle::new();
        let mut geom = line_geom(&pool);
        geom.set_line_width(3.0);
        let ctx = draw(&mut geom, Pass::Normal);
        assert_eq!(ctx.line_width(), 3.0);
        assert_eq!(ctx.draws()[0].uniforms.line_width, 3.0);
    }

    #[test]
    fn more_than_u16_vertices_split_into_segments() {
        let pool = IdPoolHandle::new();
        let mut geom = LineGeom::new(structure(), pool);
        let base = geom.base_mut();
        let lines = 40_000;
        let _ = base.partitioner().begin_chain("A", lines * 2, 0);
        for i in 0..lines {
            let (_, va) = base.partitioner().ensure_space_for(2);
            let p = Vec3::splat(i as f32);
            va.add_line(p, WHITE, p + Vec3::X, WHITE, 0, 0);
        }
        let segments = geom.base().segments();
        assert_eq!(segments.len(), (lines * 2).div_ceil(MAX_SEGMENT_VERTS));
        assert!(segments.iter().all(|s| s.num_verts() <= MAX_SEGMENT_VERTS));

        let ctx = draw(&mut geom, Pass::Normal);
        assert_eq!(ctx.draws().len(), geom.base().segments().len());
    }
}
