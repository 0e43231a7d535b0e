//! Small shared helpers.

/// Possibly-empty scalar interval for projection bounds.
pub mod interval;

pub use interval::Interval;
