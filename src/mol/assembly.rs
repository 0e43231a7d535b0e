//! Crystallographic assemblies: named symmetry expansions of a structure.

use glam::Mat4;

/// Pairs a subset of chains with the ordered affine transforms that
/// replicate them.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryGenerator {
    chains: Vec<String>,
    matrices: Vec<Mat4>,
}

impl SymmetryGenerator {
    /// Generator applying `matrices` (in order) to the chains named in
    /// `chains`.
    pub fn new<S: Into<String>>(
        chains: impl IntoIterator<Item = S>,
        matrices: Vec<Mat4>,
    ) -> Self {
        Self {
            chains: chains.into_iter().map(Into::into).collect(),
            matrices,
        }
    }

    /// Names of the chains this generator replicates.
    pub fn chains(&self) -> &[String] {
        &self.chains
    }

    /// Returns `true` if `chain` is one of the replicated chains.
    pub fn covers(&self, chain: &str) -> bool {
        self.chains.iter().any(|c| c == chain)
    }

    /// Transforms in application order.
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Transform at `index`, if present.
    pub fn matrix(&self, index: usize) -> Option<&Mat4> {
        self.matrices.get(index)
    }
}

/// One named, immutable symmetry expansion of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    name: String,
    generators: Vec<SymmetryGenerator>,
}

impl Assembly {
    /// Assembly called `name` built from `generators`.
    pub fn new(
        name: impl Into<String>,
        generators: Vec<SymmetryGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            generators,
        }
    }

    /// Assembly name as referenced by the show-related setting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generators in iteration order.
    pub fn generators(&self) -> &[SymmetryGenerator] {
        &self.generators
    }

    /// Total number of chain copies the assembly produces.
    pub fn copy_count(&self) -> usize {
        self.generators
            .iter()
            .map(|g| g.chains.len() * g.matrices.len())
            .sum()
    }
}
