// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Batched molecular geometry for GPU rendering.
//!
//! molgeom turns molecular structures into vertex data that a GPU can draw
//! with 16-bit indices, however large the structure, and replays it under
//! crystallographic symmetry.
//!
//! # Key entry points
//!
//! - [`geom::LineGeom`] / [`geom::MeshGeom`] - containers owning the
//!   bounded vertex-array segments of one representation
//! - [`geom::Partitioner`] - splits a chain across segments of at most
//!   65536 vertices
//! - [`picking::IdPoolHandle`] - shared pool of 16-bit picking ids
//! - [`geom::symmetry`] - draw, bounds and iteration per symmetry transform
//! - [`renderer`] - builders for bond lines, traces and spheres
//! - [`scene::SceneNode`] - ordered, hideable tree of drawables
//! - [`options::Options`] - geometry and display defaults (TOML presets)
//!
//! # Architecture
//!
//! Geometry never talks to a graphics API directly. Everything is issued
//! through a [`gpu::RenderContext`]; the crate ships an in-memory
//! [`gpu::CommandRecorder`] and a wgpu-backed [`gpu::WgpuBackend`]. At draw
//! time a container resolves the structure's active assembly and draws each
//! segment once per transform, tagging the draw with the transform index so
//! the picking pass can tell symmetry copies apart.

pub mod camera;
pub mod color;
pub mod error;
pub mod geom;
pub mod gpu;
pub mod mol;
pub mod options;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod util;

pub use error::MolGeomError;
