//! Geometry and display options with TOML preset support.
//!
//! Options serialize to/from TOML so a set of defaults can be stored as a
//! named preset and reloaded.

mod display;
mod geometry;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use display::DisplayOptions;
pub use geometry::GeometryOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MolGeomError;

/// File extension of stored presets.
const PRESET_EXTENSION: &str = "toml";

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[geometry]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Geometry building parameters.
    pub geometry: GeometryOptions,
    /// Display defaults.
    pub display: DisplayOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MolGeomError::OptionsParse`] on malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, MolGeomError> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MolGeomError::Io`] if the file cannot be read and
    /// [`MolGeomError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, MolGeomError> {
        let options = Self::from_toml(&std::fs::read_to_string(path)?)?;
        log::debug!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options as pretty-printed TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`MolGeomError::Io`] if the write fails.
    pub fn save(&self, path: &Path) -> Result<(), MolGeomError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        log::debug!("saved options to {}", path.display());
        Ok(())
    }

    /// Path of the preset called `name` inside `dir`.
    #[must_use]
    pub fn preset_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.{PRESET_EXTENSION}"))
    }

    /// Load the preset called `name` from `dir`.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn load_preset(dir: &Path, name: &str) -> Result<Self, MolGeomError> {
        Self::load(&Self::preset_path(dir, name))
    }

    /// Store these options as the preset called `name` in `dir`.
    ///
    /// # Errors
    ///
    /// As [`save`](Self::save).
    pub fn save_preset(
        &self,
        dir: &Path,
        name: &str,
    ) -> Result<(), MolGeomError> {
        self.save(&Self::preset_path(dir, name))
    }

    /// Overwrite `section.field` with a JSON value, as sent by an options
    /// panel. Unknown sections or fields leave the options untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MolGeomError::OptionsParse`] if `value` has the wrong type
    /// for the field.
    pub fn set_field(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), MolGeomError> {
        let mut root = serde_json::to_value(&*self)?;
        let Some(slot) = root.get_mut(section).and_then(|s| s.get_mut(field))
        else {
            log::debug!("ignoring unknown option {section}.{field}");
            return Ok(());
        };
        *slot = value;
        *self = serde_json::from_value(root)?;
        Ok(())
    }

    /// Sorted names of the presets stored in `dir`. A directory that does
    /// not exist holds no presets.
    ///
    /// # Errors
    ///
    /// Returns [`MolGeomError::Io`] if `dir` exists but cannot be listed.
    pub fn list_presets(dir: &Path) -> Result<Vec<String>, MolGeomError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != PRESET_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => names.push(stem.to_owned()),
                None => log::debug!("skipping preset {}", path.display()),
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}
