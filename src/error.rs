use thiserror::Error;

use crate::shape::ShapeId;

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors raised by the shape graph and the tools.
///
/// These are contract violations: the host or an upstream mutation broke an
/// invariant. Absent collaborators (no hit test, no style) are never errors.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A context that is scoped to a single figure refuses container reassignment
    #[error("cannot reassign the {container} container of a figure-scoped context")]
    ContainerReassignment { container: &'static str },

    /// The last shape of a figure is not a segment with an end point
    #[error("figure {figure} ends with a {kind} which has no last point")]
    MissingLastPoint { figure: ShapeId, kind: &'static str },

    /// The id does not refer to a shape that can hold other shapes
    #[error("shape {0} is not a container")]
    NotAContainer(ShapeId),

    /// The id is not present in the document
    #[error("shape not found: {0}")]
    ShapeNotFound(ShapeId),

    /// Tool name not known to the editor
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Undo/redo stack is empty
    #[error("nothing to {0}")]
    EmptyHistory(&'static str),

    /// Document or configuration (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a configuration file failed
    #[error("failed to access file: {0}")]
    Io(#[from] std::io::Error),
}
