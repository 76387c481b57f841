//! Error types for shape construction.

use thiserror::Error;

/// Errors arising from shape construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A polygon was given no vertices.
    #[error("polygon must have at least one point")]
    EmptyPolygon,
}
