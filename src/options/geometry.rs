use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geom::MAX_SEGMENT_VERTS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Geometry", inline)]
#[serde(default)]
/// Geometry building options.
pub struct GeometryOptions {
    /// Bond line width in pixels.
    #[schemars(title = "Line Width", range(min = 0.5, max = 10.0), extend("step" = 0.5))]
    pub line_width: f32,
    /// Trace line width in pixels.
    #[schemars(title = "Trace Width", range(min = 0.5, max = 10.0), extend("step" = 0.5))]
    pub trace_line_width: f32,
    /// Half-length of the axis star drawn for unbonded atoms, in angstroms.
    #[schemars(title = "Star Size", range(min = 0.1, max = 1.0), extend("step" = 0.05))]
    pub star_size: f32,
    /// Atom sphere radius in angstroms.
    #[schemars(title = "Sphere Radius", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub sphere_radius: f32,
    /// Icosphere subdivision level (0 = icosahedron).
    #[schemars(title = "Sphere Detail", range(min = 0, max = 3))]
    pub sphere_detail: u32,
    /// Maximum vertices per segment. Values above 65536 are clamped.
    #[schemars(skip)]
    pub segment_vertex_cap: usize,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            trace_line_width: 3.0,
            star_size: 0.25,
            sphere_radius: 0.3,
            sphere_detail: 1,
            segment_vertex_cap: MAX_SEGMENT_VERTS,
        }
    }
}

impl GeometryOptions {
    /// Segment cap clamped to the 16-bit index range.
    pub fn segment_cap(&self) -> usize {
        self.segment_vertex_cap.min(MAX_SEGMENT_VERTS)
    }
}
