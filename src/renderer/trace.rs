//! Central-atom trace: one polyline per chain through each residue's CA
//! (or C3'), broken where residue numbering jumps.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::PickIds;
use crate::color::ColorOp;
use crate::geom::{Geometry, LineGeom, ResidueVertexAssoc, VertexRef};
use crate::mol::{Chain, Structure, View};
use crate::options::GeometryOptions;
use crate::picking::{IdPoolHandle, PickTarget};

/// A trace node: residue index and its central atom.
#[derive(Debug, Clone, Copy)]
struct Node {
    residue: u32,
    atom: u32,
}

/// Consecutive node pairs of `chain` that the trace connects.
fn links(structure: &Structure, chain: &Chain, view: &View) -> Vec<[Node; 2]> {
    let nodes: Vec<(i32, Node)> = structure
        .residues_of(chain)
        .iter()
        .zip(chain.residues.start..)
        .filter_map(|(residue, index)| {
            let atom = residue.central_atom()?;
            view.contains_atom(atom).then_some((
                residue.number,
                Node {
                    residue: index,
                    atom,
                },
            ))
        })
        .collect();
    nodes
        .windows(2)
        .filter(|pair| pair[0].0.checked_add(1) == Some(pair[1].0))
        .map(|pair| [pair[0].1, pair[1].1])
        .collect()
}

/// Build trace geometry for the residues of `structure` whose central atom
/// is in `view`.
pub fn line_trace(
    structure: &Arc<Structure>,
    pool: IdPoolHandle,
    view: &View,
    op: &mut dyn ColorOp,
    options: &GeometryOptions,
) -> LineGeom {
    let mut geom =
        LineGeom::with_cap(Arc::clone(structure), pool, options.segment_cap());
    geom.set_line_width(options.trace_line_width);
    let per_chain: Vec<_> = structure
        .chains()
        .iter()
        .map(|chain| links(structure, chain, view))
        .collect();

    let base = geom.base_mut();
    let residue_count = per_chain
        .iter()
        .flatten()
        .flat_map(|link| link.iter().map(|n| n.residue))
        .collect::<FxHashSet<_>>()
        .len();
    PickIds::reserve(base, residue_count);

    op.begin(structure);
    let mut ids = PickIds::default();
    let mut assoc = ResidueVertexAssoc::new();
    for (chain, chain_links) in structure.chains().iter().zip(&per_chain) {
        if chain_links.is_empty() {
            continue;
        }
        let _ = base.partitioner().begin_chain(
            chain.name.clone(),
            chain_links.len() * 4,
            0,
        );
        for &[from, to] in chain_links {
            let p0 = structure.atom(from.atom).position;
            let p1 = structure.atom(to.atom).position;
            let mid = p0.lerp(p1, 0.5);
            for (node, start, end) in [(from, p0, mid), (to, mid, p1)] {
                let color = op.color(structure, node.atom);
                let target = PickTarget::Residue {
                    structure: structure.id(),
                    residue: node.residue,
                };
                let id = ids.get_or_assign(base, target);
                let (segment, va) = base.partitioner().ensure_space_for(2);
                let first = va.num_verts();
                va.add_line(start, color, end, color, id, id);
                assoc.insert(
                    node.residue,
                    VertexRef {
                        segment,
                        vertex: first,
                    },
                );
                assoc.insert(
                    node.residue,
                    VertexRef {
                        segment,
                        vertex: first + 1,
                    },
                );
            }
        }
    }
    op.end();

    log::debug!(
        "built trace for '{}': {} residues, {} segments",
        structure.name(),
        assoc.len(),
        base.segments().len()
    );
    base.add_assoc(assoc);
    geom
}
