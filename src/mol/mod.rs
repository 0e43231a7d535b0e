//! Molecular structure model consumed by the geometry layer.
//!
//! A [`Structure`] is immutable once built and shared with every geometry
//! container that renders it. Besides the chain/residue/atom hierarchy it
//! carries the crystallographic [`Assembly`] definitions the symmetry
//! expansion draws from.

mod assembly;
mod builder;
mod structure;
mod view;

pub use assembly::{Assembly, SymmetryGenerator};
pub use builder::StructureBuilder;
pub use structure::{Atom, CentralAtom, Chain, Residue, Structure};
pub use view::View;
