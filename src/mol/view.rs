//! Atom subsets used to scope recoloring and opacity edits.

use rustc_hash::FxHashSet;

use super::structure::Structure;

/// A subset of a structure's atoms, or the whole structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    atoms: Option<FxHashSet<u32>>,
}

impl View {
    /// View containing every atom.
    pub fn all() -> Self {
        Self::default()
    }

    /// View containing exactly the listed atom indices.
    pub fn from_atoms(atoms: impl IntoIterator<Item = u32>) -> Self {
        Self {
            atoms: Some(atoms.into_iter().collect()),
        }
    }

    /// View containing every atom of the named chains.
    pub fn chains(structure: &Structure, names: &[&str]) -> Self {
        let atoms = structure.chains_by_name(names).flat_map(|chain| {
            structure
                .residues_of(chain)
                .iter()
                .flat_map(|residue| residue.atoms.clone())
        });
        Self::from_atoms(atoms)
    }

    /// View containing every atom of the listed residues.
    pub fn residues(
        structure: &Structure,
        residues: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::from_atoms(
            residues
                .into_iter()
                .flat_map(|r| structure.residue(r).atoms.clone()),
        )
    }

    /// Returns `true` if this view spans the whole structure.
    pub fn is_all(&self) -> bool {
        self.atoms.is_none()
    }

    /// Returns `true` if the atom at `index` is part of the view.
    pub fn contains_atom(&self, index: u32) -> bool {
        self.atoms.as_ref().is_none_or(|atoms| atoms.contains(&index))
    }
}
