//! Incremental construction of a [`Structure`].

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::assembly::Assembly;
use super::structure::{Atom, Chain, Residue, Structure};

/// Builds a [`Structure`] chain by chain, residue by residue.
///
/// Atoms are appended to the most recently started residue, residues to the
/// most recently started chain. Starting a residue before any chain opens
/// an implicit chain `A`; adding an atom before any residue opens an
/// implicit `UNK` residue.
///
/// ```
/// use glam::Vec3;
/// use molgeom::mol::StructureBuilder;
///
/// let mut builder = StructureBuilder::new("demo");
/// let _ = builder.chain("A").residue("GLY", 1);
/// let ca = builder.atom("CA", "C", Vec3::ZERO);
/// let structure = builder.build();
/// assert_eq!(structure.residue(0).central_atom(), Some(ca));
/// ```
#[derive(Debug, Default)]
pub struct StructureBuilder {
    id: u32,
    name: String,
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
    chains: Vec<Chain>,
    bonds: Vec<[u32; 2]>,
    assemblies: Vec<Assembly>,
}

impl StructureBuilder {
    /// Empty builder for a structure called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Identifier recorded in picking targets for this structure.
    pub fn id(&mut self, id: u32) -> &mut Self {
        self.id = id;
        self
    }

    /// Start a new chain.
    pub fn chain(&mut self, name: impl Into<String>) -> &mut Self {
        let start = self.residues.len() as u32;
        self.chains.push(Chain {
            name: name.into(),
            residues: start..start,
        });
        self
    }

    /// Start a new residue in the current chain.
    pub fn residue(
        &mut self,
        name: impl Into<String>,
        number: i32,
    ) -> &mut Self {
        if self.chains.is_empty() {
            let _ = self.chain("A");
        }
        let chain = self.chains.len() as u32 - 1;
        let start = self.atoms.len() as u32;
        self.residues.push(Residue {
            name: name.into(),
            number,
            chain,
            atoms: start..start,
            central_atom: None,
        });
        if let Some(current) = self.chains.last_mut() {
            current.residues.end = self.residues.len() as u32;
        }
        self
    }

    /// Append an atom to the current residue and return its index.
    pub fn atom(
        &mut self,
        name: impl Into<String>,
        element: impl Into<String>,
        position: Vec3,
    ) -> u32 {
        if self.residues.is_empty() {
            let _ = self.residue("UNK", 0);
        }
        let index = self.atoms.len() as u32;
        let residue = self.residues.len() as u32 - 1;
        self.atoms.push(Atom {
            name: name.into(),
            element: element.into(),
            position,
            residue,
        });
        if let Some(current) = self.residues.last_mut() {
            current.atoms.end = index + 1;
        }
        index
    }

    /// Connect two atoms.
    pub fn bond(&mut self, a: u32, b: u32) -> &mut Self {
        self.bonds.push([a, b]);
        self
    }

    /// Register a symmetry assembly.
    pub fn assembly(&mut self, assembly: Assembly) -> &mut Self {
        self.assemblies.push(assembly);
        self
    }

    /// Finish the structure, resolving each residue's central atom.
    pub fn build(self) -> Structure {
        let Self {
            id,
            name,
            atoms,
            mut residues,
            chains,
            bonds,
            assemblies,
        } = self;

        for residue in &mut residues {
            residue.central_atom = find_central_atom(&atoms, residue);
        }

        let mut chain_index = FxHashMap::default();
        for (i, chain) in chains.iter().enumerate() {
            let _ = chain_index.entry(chain.name.clone()).or_insert(i as u32);
        }

        Structure {
            id,
            name,
            atoms,
            residues,
            chains,
            bonds,
            assemblies,
            chain_index,
        }
    }
}

/// `CA` (carbon, not calcium) for amino acids, `C3'` for nucleotides.
fn find_central_atom(atoms: &[Atom], residue: &Residue) -> Option<u32> {
    let find = |name: &str, element: &str| {
        residue.atoms.clone().find(|&i| {
            let atom = &atoms[i as usize];
            atom.name == name && atom.element.eq_ignore_ascii_case(element)
        })
    };
    find("CA", "C").or_else(|| find("C3'", "C"))
}
