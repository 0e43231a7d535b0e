//! Crate-level error types.

use std::fmt;

use crate::gpu::ContextError;

/// Errors produced by the molgeom crate.
#[derive(Debug)]
pub enum MolGeomError {
    /// The rendering context rejected a buffer or draw operation.
    Context(ContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Options text or value that does not fit [`Options`].
    ///
    /// [`Options`]: crate::options::Options
    OptionsParse(String),
}

impl fmt::Display for MolGeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(e) => write!(f, "draw failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for MolGeomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<ContextError> for MolGeomError {
    fn from(e: ContextError) -> Self {
        Self::Context(e)
    }
}

impl From<std::io::Error> for MolGeomError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for MolGeomError {
    fn from(e: toml::de::Error) -> Self {
        Self::OptionsParse(e.to_string())
    }
}

impl From<toml::ser::Error> for MolGeomError {
    fn from(e: toml::ser::Error) -> Self {
        Self::OptionsParse(e.to_string())
    }
}

impl From<serde_json::Error> for MolGeomError {
    fn from(e: serde_json::Error) -> Self {
        Self::OptionsParse(e.to_string())
    }
}
