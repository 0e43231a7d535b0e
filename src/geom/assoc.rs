//! Mappings from rendered vertices back to source atoms and residues.
//!
//! Recoloring and opacity edits rewrite vertex colors in place through
//! these maps instead of rebuilding geometry.

use rustc_hash::FxHashMap;

use super::vertex_array::VertexArray;
use crate::color::ColorOp;
use crate::mol::{Structure, View};

/// Location of one vertex: segment index and vertex index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    /// Segment index within the owning container.
    pub segment: usize,
    /// Vertex index within the segment.
    pub vertex: usize,
}

#[derive(Debug, Clone, Default)]
struct VertexMap {
    refs: FxHashMap<u32, Vec<VertexRef>>,
}

impl VertexMap {
    fn insert(&mut self, key: u32, vertex: VertexRef) {
        self.refs.entry(key).or_default().push(vertex);
    }

    fn first_color(
        &self,
        key: u32,
        segments: &[VertexArray],
    ) -> Option<[f32; 4]> {
        let first = self.refs.get(&key)?.first()?;
        Some(segments[first.segment].color(first.vertex))
    }
}

fn recolor_refs(
    refs: &[VertexRef],
    color: [f32; 4],
    segments: &mut [VertexArray],
) {
    for r in refs {
        let segment = &mut segments[r.segment];
        let alpha = segment.color(r.vertex)[3];
        segment.set_color(r.vertex, [color[0], color[1], color[2], alpha]);
    }
}

fn fade_refs(refs: &[VertexRef], alpha: f32, segments: &mut [VertexArray]) {
    for r in refs {
        segments[r.segment].set_opacity(r.vertex, alpha);
    }
}

/// Vertices keyed by the atom they render.
#[derive(Debug, Clone, Default)]
pub struct AtomVertexAssoc {
    map: VertexMap,
}

impl AtomVertexAssoc {
    /// Empty association.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `vertex` renders `atom`.
    pub fn insert(&mut self, atom: u32, vertex: VertexRef) {
        self.map.insert(atom, vertex);
    }

    /// Number of atoms with at least one vertex.
    pub fn len(&self) -> usize {
        self.map.refs.len()
    }

    /// Returns `true` if no vertex is associated.
    pub fn is_empty(&self) -> bool {
        self.map.refs.is_empty()
    }
}

/// Vertices keyed by residue, colored through the residue's central atom
/// (or its first atom when it has none). Residues without atoms are never
/// recolored.
#[derive(Debug, Clone, Default)]
pub struct ResidueVertexAssoc {
    map: VertexMap,
}

impl ResidueVertexAssoc {
    /// Empty association.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `vertex` renders `residue`.
    pub fn insert(&mut self, residue: u32, vertex: VertexRef) {
        self.map.insert(residue, vertex);
    }

    /// Number of residues with at least one vertex.
    pub fn len(&self) -> usize {
        self.map.refs.len()
    }

    /// Returns `true` if no vertex is associated.
    pub fn is_empty(&self) -> bool {
        self.map.refs.is_empty()
    }

    fn representative(structure: &Structure, residue: u32) -> Option<u32> {
        let residue = structure.residue(residue);
        let first = (!residue.atoms.is_empty()).then_some(residue.atoms.start);
        residue.central_atom().or(first)
    }
}

/// A vertex association held by a geometry container.
#[derive(Debug, Clone)]
pub enum VertexAssoc {
    /// Per-atom vertices.
    Atom(AtomVertexAssoc),
    /// Per-residue vertices.
    Residue(ResidueVertexAssoc),
}

impl VertexAssoc {
    /// Rewrite the RGB of every vertex whose atom is in `view`, keeping
    /// alpha. Touched segments become dirty.
    pub fn recolor(
        &self,
        structure: &Structure,
        op: &dyn ColorOp,
        view: &View,
        segments: &mut [VertexArray],
    ) {
        match self {
            Self::Atom(assoc) => {
                for (&atom, refs) in &assoc.map.refs {
                    if view.contains_atom(atom) {
                        recolor_refs(refs, op.color(structure, atom), segments);
                    }
                }
            }
            Self::Residue(assoc) => {
                for (&residue, refs) in &assoc.map.refs {
                    let Some(atom) =
                        ResidueVertexAssoc::representative(structure, residue)
                    else {
                        continue;
                    };
                    if view.contains_atom(atom) {
                        recolor_refs(refs, op.color(structure, atom), segments);
                    }
                }
            }
        }
    }

    /// Set the alpha of every vertex whose atom is in `view`.
    pub fn set_opacity(
        &self,
        structure: &Structure,
        alpha: f32,
        view: &View,
        segments: &mut [VertexArray],
    ) {
        match self {
            Self::Atom(assoc) => {
                for (&atom, refs) in &assoc.map.refs {
                    if view.contains_atom(atom) {
                        fade_refs(refs, alpha, segments);
                    }
                }
            }
            Self::Residue(assoc) => {
                for (&residue, refs) in &assoc.map.refs {
                    let Some(atom) =
                        ResidueVertexAssoc::representative(structure, residue)
                    else {
                        continue;
                    };
                    if view.contains_atom(atom) {
                        fade_refs(refs, alpha, segments);
                    }
                }
            }
        }
    }

    /// Current color of the first vertex rendering `atom`, if any.
    pub fn color_for_atom(
        &self,
        structure: &Structure,
        atom: u32,
        segments: &[VertexArray],
    ) -> Option<[f32; 4]> {
        match self {
            Self::Atom(assoc) => assoc.map.first_color(atom, segments),
            Self::Residue(assoc) => {
                let residue = structure.atom(atom).residue;
                assoc.map.first_color(residue, segments)
            }
        }
    }
}

impl From<AtomVertexAssoc> for VertexAssoc {
    fn from(assoc: AtomVertexAssoc) -> Self {
        Self::Atom(assoc)
    }
}

impl From<ResidueVertexAssoc> for VertexAssoc {
    fn from(assoc: ResidueVertexAssoc) -> Self {
        Self::Residue(assoc)
    }
}
