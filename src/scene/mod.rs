//! Scene tree: named nodes with visibility and draw order, carrying the
//! geometry containers and debug boxes that make up a frame.
//!
//! The tree owns its drawables. Drawing walks visible nodes only, siblings
//! by ascending [`SceneNode::order`]; bounds are aggregated over visible
//! nodes; [`SceneNode::destroy`] releases everything underneath.

mod debug_box;
mod drawable;
mod node;

pub use debug_box::DebugBox;
pub use drawable::Drawable;
pub use node::SceneNode;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::camera::FixedCamera;
    use crate::color;
    use crate::gpu::{CommandRecorder, Pass, ShaderCatalog, ShaderHandle};
    use crate::mol::{Structure, StructureBuilder, View};
    use crate::options::GeometryOptions;
    use crate::picking::IdPoolHandle;
    use crate::renderer;
    use crate::util::Interval;

    const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

    fn atoms_at(xs: &[f32]) -> Arc<Structure> {
        let mut b = StructureBuilder::new("atoms");
        let _ = b.chain("A").residue("HOH", 1);
        for &x in xs {
            let _ = b.atom("O", "O", Vec3::new(x, 0.0, 0.0));
        }
        Arc::new(b.build())
    }

    fn lines_node(name: &str, pool: &IdPoolHandle, xs: &[f32]) -> SceneNode {
        let geom = renderer::lines(
            &atoms_at(xs),
            pool.clone(),
            &View::all(),
            &mut color::by_element(),
            &GeometryOptions::default(),
        );
        SceneNode::leaf(name, geom)
    }

    fn camera() -> FixedCamera {
        FixedCamera::default()
    }

    fn catalog() -> ShaderCatalog {
        let mut catalog = ShaderCatalog::new();
        let _ = catalog
            .insert_style("default", ShaderHandle(1))
            .insert_style("late", ShaderHandle(2))
            .insert_style("early", ShaderHandle(3));
        catalog
    }

    fn programs(ctx: &CommandRecorder) -> Vec<u32> {
        ctx.draws()
            .iter()
            .filter_map(|d| d.program.map(|p| p.0))
            .collect()
    }

    #[test]
    fn children_draw_by_order_with_inherited_style() {
        let pool = IdPoolHandle::new();
        let mut root = SceneNode::new("root");
        let late = root.add_child(lines_node("late", &pool, &[0.0]));
        late.set_order(5);
        late.set_style(Some("late".to_owned()));
        let early = root.add_child(lines_node("early", &pool, &[1.0]));
        early.set_order(-1);
        early.set_style(Some("early".to_owned()));
        let _ = root.add_child(lines_node("plain", &pool, &[2.0]));

        let mut ctx = CommandRecorder::new();
        let drawn = root
            .draw(&mut ctx, &camera(), &catalog(), "default", Pass::Normal)
            .unwrap();
        assert_eq!(drawn, 3);
        assert_eq!(programs(&ctx), [3, 1, 2]);
    }

    #[test]
    fn hidden_subtree_is_skipped_for_draw_and_bounds() {
        let pool = IdPoolHandle::new();
        let mut root = SceneNode::new("root");
        let group = root.add_child(SceneNode::new("group"));
        let _ = group.add_child(lines_node("far", &pool, &[100.0]));
        let _ = root.add_child(lines_node("near", &pool, &[1.0]));

        root.find_mut("group").unwrap().set_visible(false);
        let mut ctx = CommandRecorder::new();
        let drawn = root
            .draw(&mut ctx, &camera(), &catalog(), "default", Pass::Normal)
            .unwrap();
        assert_eq!(drawn, 1);

        let mut intervals = [Interval::EMPTY; 3];
        root.update_projection_intervals(&AXES, &mut intervals);
        let star = GeometryOptions::default().star_size;
        assert_eq!(intervals[0].max(), Some(1.0 + star));
        assert_eq!(
            root.update_squared_sphere_radius(Vec3::ZERO, 0.0),
            (1.0 + star).powi(2)
        );

        root.find_mut("group").unwrap().set_visible(true);
        assert_eq!(
            root.update_squared_sphere_radius(Vec3::ZERO, 0.0),
            (100.0 + star).powi(2)
        );
    }

    #[test]
    fn debug_box_tracks_bounds_without_widening_them() {
        let pool = IdPoolHandle::new();
        let mut root = SceneNode::new("root");
        let _ = root.add_child(lines_node("atoms", &pool, &[0.0, 4.0]));
        let mut intervals = [Interval::EMPTY; 3];
        root.update_projection_intervals(&AXES, &mut intervals);
        let mut wide = intervals;
        for interval in &mut wide {
            interval.extend(10.0);
        }
        let debug_box =
            DebugBox::from_intervals(&AXES, &wide, [1.0, 0.0, 0.0, 1.0])
                .unwrap();
        let _ = root.add_child(SceneNode::leaf("bounds", debug_box));

        let mut again = [Interval::EMPTY; 3];
        root.update_projection_intervals(&AXES, &mut again);
        assert_eq!(again, intervals);

        let mut ctx = CommandRecorder::new();
        let normal = root
            .draw(&mut ctx, &camera(), &catalog(), "default", Pass::Normal)
            .unwrap();
        assert_eq!(normal, 2);
        let select = root
            .draw(&mut ctx, &camera(), &catalog(), "default", Pass::Select)
            .unwrap();
        assert_eq!(select, 0);
    }

    #[test]
    fn find_and_remove_by_name() {
        let pool = IdPoolHandle::new();
        let mut root = SceneNode::new("root");
        let _ = root
            .add_child(SceneNode::new("a"))
            .add_child(lines_node("a.lines", &pool, &[0.0]));
        assert!(root.find("a.lines").unwrap().drawable().is_some());
        assert!(root.find("missing").is_none());

        let a = root.remove_child("a").unwrap();
        assert!(root.children().is_empty());
        assert_eq!(a.children()[0].name(), "a.lines");
    }

    #[test]
    fn destroy_releases_whole_subtree() {
        let pool = IdPoolHandle::new();
        let mut root = SceneNode::new("root");
        let hidden = root.add_child(lines_node("hidden", &pool, &[0.0]));
        hidden.set_visible(false);
        let _ = root.add_child(lines_node("shown", &pool, &[1.0]));
        assert_eq!(pool.stats().live_ids, 2);

        let mut ctx = CommandRecorder::new();
        let _ = root
            .draw(&mut ctx, &camera(), &catalog(), "default", Pass::Normal)
            .unwrap();
        assert_eq!(ctx.live_buffers(), 1);

        root.destroy(&mut ctx);
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(pool.stats().live_ids, 0);
    }
}
