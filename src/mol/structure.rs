//! Immutable molecular structure: chains, residues, atoms, bonds and
//! assemblies.

use std::ops::Range;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::assembly::Assembly;

/// A single atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name, e.g. `CA`.
    pub name: String,
    /// Element symbol, e.g. `C`.
    pub element: String,
    /// Position in the asymmetric unit.
    pub position: Vec3,
    /// Index of the owning residue.
    pub residue: u32,
}

/// A residue: a contiguous run of atoms within one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Residue name, e.g. `ALA`.
    pub name: String,
    /// Author residue number.
    pub number: i32,
    /// Index of the owning chain.
    pub chain: u32,
    /// Atom indices belonging to this residue.
    pub atoms: Range<u32>,
    pub(crate) central_atom: Option<u32>,
}

impl Residue {
    /// Representative atom used for traces and labels: `CA` for amino
    /// acids, `C3'` for nucleotides, `None` otherwise.
    pub fn central_atom(&self) -> Option<u32> {
        self.central_atom
    }
}

/// A chain: a contiguous run of residues.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Chain name as referenced by symmetry generators.
    pub name: String,
    /// Residue indices belonging to this chain.
    pub residues: Range<u32>,
}

/// One representative atom, with its position after any symmetry transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralAtom {
    /// Atom index in the owning structure.
    pub atom: u32,
    /// Residue index in the owning structure.
    pub residue: u32,
    /// Position, transformed for symmetry copies.
    pub position: Vec3,
}

/// A loaded molecular structure. Built with
/// [`StructureBuilder`](super::StructureBuilder).
#[derive(Debug, Clone)]
pub struct Structure {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) atoms: Vec<Atom>,
    pub(crate) residues: Vec<Residue>,
    pub(crate) chains: Vec<Chain>,
    pub(crate) bonds: Vec<[u32; 2]>,
    pub(crate) assemblies: Vec<Assembly>,
    pub(crate) chain_index: FxHashMap<String, u32>,
}

impl Structure {
    /// Identifier stored in picking targets.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Structure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All atoms.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// All residues.
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// All chains.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Bonds as pairs of atom indices.
    pub fn bonds(&self) -> &[[u32; 2]] {
        &self.bonds
    }

    /// Atom at `index`.
    pub fn atom(&self, index: u32) -> &Atom {
        &self.atoms[index as usize]
    }

    /// Residue at `index`.
    pub fn residue(&self, index: u32) -> &Residue {
        &self.residues[index as usize]
    }

    /// Chain at `index`.
    pub fn chain(&self, index: u32) -> &Chain {
        &self.chains[index as usize]
    }

    /// Chain owning the atom at `index`.
    pub fn chain_of_atom(&self, index: u32) -> &Chain {
        let residue = self.residue(self.atom(index).residue);
        self.chain(residue.chain)
    }

    /// Chain called `name`, if present.
    pub fn chain_by_name(&self, name: &str) -> Option<&Chain> {
        self.chain_index.get(name).map(|&i| self.chain(i))
    }

    /// Chains matching `names`, in the order given. Unknown names are
    /// skipped.
    pub fn chains_by_name<'a, S: AsRef<str>>(
        &'a self,
        names: &'a [S],
    ) -> impl Iterator<Item = &'a Chain> + 'a {
        names
            .iter()
            .filter_map(move |name| self.chain_by_name(name.as_ref()))
    }

    /// Residues of `chain`.
    pub fn residues_of(&self, chain: &Chain) -> &[Residue] {
        let Range { start, end } = chain.residues;
        &self.residues[start as usize..end as usize]
    }

    /// Atoms of `residue`.
    pub fn atoms_of(&self, residue: &Residue) -> &[Atom] {
        let Range { start, end } = residue.atoms;
        &self.atoms[start as usize..end as usize]
    }

    /// Assembly called `name`, if the structure defines one.
    pub fn assembly(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.name() == name)
    }

    /// All assemblies.
    pub fn assemblies(&self) -> &[Assembly] {
        &self.assemblies
    }

    /// Central atoms of the asymmetric unit, one per residue that has one.
    pub fn central_atoms(&self) -> impl Iterator<Item = CentralAtom> + '_ {
        self.residues.iter().enumerate().filter_map(|(index, residue)| {
            residue.central_atom.map(|atom| CentralAtom {
                atom,
                residue: index as u32,
                position: self.atom(atom).position,
            })
        })
    }
}
