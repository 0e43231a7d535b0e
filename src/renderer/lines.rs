//! Bond lines: every bond as two half-lines colored by their atoms, plus
//! a small axis star for atoms without a drawn bond.
//!
//! Each half-line is filed under its own atom's chain, so a bond between
//! two chains is split across their segments and symmetry replication of
//! one chain never draws atoms of the other.

use std::sync::Arc;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use super::PickIds;
use crate::color::ColorOp;
use crate::geom::{AtomVertexAssoc, GeomBase, Geometry, LineGeom, VertexRef};
use crate::mol::{Structure, View};
use crate::options::GeometryOptions;
use crate::picking::{IdPoolHandle, PickTarget};

const STAR_AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// Half-bonds and stars of one chain. A half-bond runs from its first
/// atom to the bond midpoint.
#[derive(Default)]
struct ChainLines {
    halves: Vec<[u32; 2]>,
    stars: Vec<u32>,
}

impl ChainLines {
    fn vertex_count(&self) -> usize {
        self.halves.len() * 2 + self.stars.len() * STAR_AXES.len() * 2
    }
}

/// Group the bonds and unbonded atoms in `view` by chain, in chain order.
fn collect(structure: &Structure, view: &View) -> Vec<ChainLines> {
    let mut per_chain: Vec<ChainLines> =
        structure.chains().iter().map(|_| ChainLines::default()).collect();
    let mut bonded = FxHashSet::default();
    for &[a, b] in structure.bonds() {
        if !(view.contains_atom(a) && view.contains_atom(b)) {
            continue;
        }
        let _ = bonded.insert(a);
        let _ = bonded.insert(b);
        for half in [[a, b], [b, a]] {
            let residue = structure.residue(structure.atom(half[0]).residue);
            per_chain[residue.chain as usize].halves.push(half);
        }
    }
    for (chain_index, chain) in structure.chains().iter().enumerate() {
        for residue in structure.residues_of(chain) {
            per_chain[chain_index].stars.extend(
                residue
                    .atoms
                    .clone()
                    .filter(|a| view.contains_atom(*a) && !bonded.contains(a)),
            );
        }
    }
    per_chain
}

struct Emitter<'a> {
    base: &'a mut GeomBase,
    assoc: AtomVertexAssoc,
    ids: PickIds,
    colors: FxHashMap<u32, [f32; 4]>,
}

impl Emitter<'_> {
    fn color(
        &mut self,
        structure: &Structure,
        op: &dyn ColorOp,
        atom: u32,
    ) -> [f32; 4] {
        *self
            .colors
            .entry(atom)
            .or_insert_with(|| op.color(structure, atom))
    }

    /// One line piece rendering `atom` at both ends.
    fn piece(&mut self, atom: u32, color: [f32; 4], start: Vec3, end: Vec3) {
        let target = PickTarget::Atom {
            structure: self.base.structure().id(),
            atom,
        };
        let id = self.ids.get_or_assign(self.base, target);
        let (segment, va) = self.base.partitioner().ensure_space_for(2);
        let first = va.num_verts();
        va.add_line(start, color, end, color, id, id);
        for vertex in first..first + 2 {
            self.assoc.insert(atom, VertexRef { segment, vertex });
        }
    }
}

/// Build bond-line geometry for the atoms of `structure` in `view`.
pub fn lines(
    structure: &Arc<Structure>,
    pool: IdPoolHandle,
    view: &View,
    op: &mut dyn ColorOp,
    options: &GeometryOptions,
) -> LineGeom {
    let mut geom =
        LineGeom::with_cap(Arc::clone(structure), pool, options.segment_cap());
    geom.set_line_width(options.line_width);
    let per_chain = collect(structure, view);

    op.begin(structure);
    let mut emitter = Emitter {
        base: geom.base_mut(),
        assoc: AtomVertexAssoc::new(),
        ids: PickIds::default(),
        colors: FxHashMap::default(),
    };
    let atom_count = per_chain
        .iter()
        .flat_map(|c| c.halves.iter().map(|h| &h[0]).chain(&c.stars))
        .collect::<FxHashSet<_>>()
        .len();
    PickIds::reserve(emitter.base, atom_count);

    for (chain, lines) in structure.chains().iter().zip(&per_chain) {
        if lines.vertex_count() == 0 {
            continue;
        }
        let _ = emitter.base.partitioner().begin_chain(
            chain.name.clone(),
            lines.vertex_count(),
            0,
        );
        for &[atom, partner] in &lines.halves {
            let p = structure.atom(atom).position;
            let mid = p.lerp(structure.atom(partner).position, 0.5);
            let color = emitter.color(structure, &*op, atom);
            emitter.piece(atom, color, p, mid);
        }
        for &atom in &lines.stars {
            let p = structure.atom(atom).position;
            let color = emitter.color(structure, &*op, atom);
            for axis in STAR_AXES {
                let offset = axis * options.star_size;
                emitter.piece(atom, color, p - offset, p + offset);
            }
        }
    }
    op.end();

    let Emitter { base, assoc, .. } = emitter;
    log::debug!(
        "built lines for '{}': {} atoms, {} segments",
        structure.name(),
        assoc.len(),
        base.segments().len()
    );
    base.add_assoc(assoc);
    geom
}
