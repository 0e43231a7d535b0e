use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geom::ShowRelated;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Defaults applied to newly built geometry.
pub struct DisplayOptions {
    /// `"asym"` for the asymmetric unit, otherwise an assembly name.
    #[schemars(title = "Show Related")]
    pub show_related: String,
    /// Style name looked up in the shader catalog for the normal pass.
    #[schemars(title = "Style")]
    pub style: String,
    /// Whether the outline pass runs.
    #[schemars(title = "Outline")]
    pub outline: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_related: "asym".to_owned(),
            style: "default".to_owned(),
            outline: false,
        }
    }
}

impl DisplayOptions {
    /// Parsed show-related setting.
    pub fn show_related(&self) -> ShowRelated {
        ShowRelated::from_name(&self.show_related)
    }
}
