//! Program handles and the style/pass shader catalog.

use rustc_hash::FxHashMap;

/// Opaque handle to a compiled program owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Which pass of the frame a draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pass {
    /// Regular shaded color pass.
    #[default]
    Normal,
    /// Offscreen picking pass writing object ids.
    Select,
    /// Silhouette outline pass.
    Outline,
}

/// Programs available to a frame, keyed by style name, plus the dedicated
/// picking and outline programs.
#[derive(Debug, Clone, Default)]
pub struct ShaderCatalog {
    styles: FxHashMap<String, ShaderHandle>,
    /// Picking program for triangle geometry.
    pub select: Option<ShaderHandle>,
    /// Picking program for line geometry.
    pub select_lines: Option<ShaderHandle>,
    /// Outline program for triangle geometry.
    pub outline: Option<ShaderHandle>,
}

impl ShaderCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `program` under the style `name`.
    pub fn insert_style(
        &mut self,
        name: impl Into<String>,
        program: ShaderHandle,
    ) -> &mut Self {
        let _ = self.styles.insert(name.into(), program);
        self
    }

    /// Program registered for the style `name`.
    pub fn style(&self, name: &str) -> Option<ShaderHandle> {
        self.styles.get(name).copied()
    }
}
