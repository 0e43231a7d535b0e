//! Color operations applied to rendered vertices through their atom
//! associations.
//!
//! A [`ColorOp`] maps an atom to an RGBA color. Geometry containers call
//! [`ColorOp::begin`] once before a recolor pass and [`ColorOp::end`] once
//! after it, so an op can precompute per-structure tables.

use rustc_hash::FxHashMap;

use crate::mol::Structure;

/// Fallback for unknown elements.
const UNKNOWN_ELEMENT: [f32; 4] = [1.0, 0.08, 0.58, 1.0];

/// Jmol-style element colors.
const ELEMENT_COLORS: &[(&str, [f32; 4])] = &[
    ("H", [1.0, 1.0, 1.0, 1.0]),
    ("C", [0.56, 0.56, 0.56, 1.0]),
    ("N", [0.19, 0.31, 0.97, 1.0]),
    ("O", [1.0, 0.05, 0.05, 1.0]),
    ("F", [0.56, 0.88, 0.31, 1.0]),
    ("NA", [0.67, 0.36, 0.95, 1.0]),
    ("MG", [0.54, 1.0, 0.0, 1.0]),
    ("P", [1.0, 0.5, 0.0, 1.0]),
    ("S", [1.0, 1.0, 0.19, 1.0]),
    ("CL", [0.12, 0.94, 0.12, 1.0]),
    ("K", [0.56, 0.25, 0.83, 1.0]),
    ("CA", [0.24, 1.0, 0.0, 1.0]),
    ("FE", [0.88, 0.4, 0.2, 1.0]),
    ("CU", [0.78, 0.5, 0.2, 1.0]),
    ("ZN", [0.49, 0.5, 0.69, 1.0]),
    ("BR", [0.65, 0.16, 0.16, 1.0]),
    ("I", [0.58, 0.0, 0.58, 1.0]),
];

/// Cyclic chain palette.
const CHAIN_COLORS: [[f32; 4]; 10] = [
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 0.5, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [0.5, 0.5, 1.0, 1.0],
    [1.0, 0.5, 0.5, 1.0],
    [0.5, 1.0, 0.5, 1.0],
    [1.0, 0.75, 0.8, 1.0],
    [0.6, 0.6, 0.6, 1.0],
];

/// CPK color of an element symbol. Case-insensitive.
pub fn element_color(element: &str) -> [f32; 4] {
    let symbol = element.trim();
    ELEMENT_COLORS
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(symbol))
        .map_or(UNKNOWN_ELEMENT, |&(_, c)| c)
}

/// Maps atoms to colors during a recolor pass.
pub trait ColorOp {
    /// Called once before any [`color`](Self::color) call of a pass.
    fn begin(&mut self, _structure: &Structure) {}

    /// Color of atom `atom` of `structure`.
    fn color(&self, structure: &Structure, atom: u32) -> [f32; 4];

    /// Called once after the last [`color`](Self::color) call of a pass.
    fn end(&mut self) {}
}

/// Same color for every atom.
#[derive(Debug, Clone, Copy)]
pub struct Uniform(pub [f32; 4]);

impl ColorOp for Uniform {
    fn color(&self, _structure: &Structure, _atom: u32) -> [f32; 4] {
        self.0
    }
}

/// Color by element symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByElement;

impl ColorOp for ByElement {
    fn color(&self, structure: &Structure, atom: u32) -> [f32; 4] {
        element_color(&structure.atom(atom).element)
    }
}

/// Color by chain, cycling through a fixed palette in chain order.
#[derive(Debug, Clone, Default)]
pub struct ByChain {
    residue_colors: FxHashMap<u32, [f32; 4]>,
}

impl ColorOp for ByChain {
    fn begin(&mut self, structure: &Structure) {
        self.residue_colors.clear();
        for (index, chain) in structure.chains().iter().enumerate() {
            let color = CHAIN_COLORS[index % CHAIN_COLORS.len()];
            for residue in chain.residues.clone() {
                let _ = self.residue_colors.insert(residue, color);
            }
        }
    }

    fn color(&self, structure: &Structure, atom: u32) -> [f32; 4] {
        self.residue_colors
            .get(&structure.atom(atom).residue)
            .copied()
            .unwrap_or(CHAIN_COLORS[0])
    }

    fn end(&mut self) {
        self.residue_colors.clear();
    }
}

/// Paint every atom `rgba`.
pub fn uniform(rgba: [f32; 4]) -> Uniform {
    Uniform(rgba)
}

/// CPK coloring.
pub fn by_element() -> ByElement {
    ByElement
}

/// Per-chain palette coloring.
pub fn by_chain() -> ByChain {
    ByChain::default()
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::mol::StructureBuilder;

    fn two_chains() -> Structure {
        let mut b = StructureBuilder::new("t");
        let _ = b.chain("A").residue("ALA", 1);
        let _ = b.atom("CA", "C", Vec3::ZERO);
        let _ = b.atom("N", "N", Vec3::X);
        let _ = b.chain("B").residue("GLY", 1);
        let _ = b.atom("CA", "C", Vec3::Y);
        b.build()
    }

    #[test]
    fn element_lookup_is_case_insensitive() {
        assert_eq!(element_color("Fe"), element_color("FE"));
        assert_eq!(element_color("Xx"), UNKNOWN_ELEMENT);
    }

    #[test]
    fn by_element_uses_atom_element() {
        let s = two_chains();
        let op = by_element();
        assert_eq!(op.color(&s, 0), element_color("C"));
        assert_eq!(op.color(&s, 1), element_color("N"));
    }

    #[test]
    fn by_chain_cycles_palette() {
        let s = two_chains();
        let mut op = by_chain();
        op.begin(&s);
        assert_eq!(op.color(&s, 0), CHAIN_COLORS[0]);
        assert_eq!(op.color(&s, 1), CHAIN_COLORS[0]);
        assert_eq!(op.color(&s, 2), CHAIN_COLORS[1]);
        op.end();
    }
}
