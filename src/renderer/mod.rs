//! Geometry builders turning a structure into line and mesh containers.
//!
//! Builders route every append through the container's partitioner, tag
//! vertices with picking ids when the pool can supply them, and register the
//! vertex associations recoloring relies on.

mod lines;
mod spheres;
mod trace;

pub use lines::lines;
pub use spheres::{spheres, UnitSphere};
pub use trace::line_trace;
use rustc_hash::FxHashMap;

use crate::geom::GeomBase;
use crate::picking::PickTarget;

/// Picking ids assigned so far, one per target.
#[derive(Debug, Default)]
struct PickIds {
    ids: FxHashMap<PickTarget, u16>,
}

impl PickIds {
    /// Reserve ids for `count` targets. Without a range every vertex is
    /// tagged 0 and the container skips the select pass.
    fn reserve(base: &mut GeomBase, count: usize) {
        if count > 0 && !base.reserve_ids(count as u32) {
            log::warn!(
                "no picking ids for {count} objects of '{}'",
                base.structure().name()
            );
        }
    }

    fn get_or_assign(
        &mut self,
        base: &mut GeomBase,
        target: PickTarget,
    ) -> u16 {
        *self
            .ids
            .entry(target)
            .or_insert_with(|| base.assign_id(target))
    }
}
