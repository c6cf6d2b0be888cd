//! Error types for tree assembly and the write traversal.
//!
//! Structural misuse (duplicate names, attaching a node twice, querying a
//! path before a write) is reported eagerly, before any I/O happens. I/O
//! failures carry the filesystem path they occurred on. Errors from user
//! supplied byte sources and decorators are wrapped with the name of the
//! node they belong to, so a failed traversal points at the artifact that
//! caused it.

use std::io;
use std::path::PathBuf;
use crate::name::NodeName;

/// Boxed error type accepted from byte sources and file decorators.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by tree assembly, structural queries, or the write traversal.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// A node name failed validation.
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A `NodeId` does not refer to a node in this tree.
    #[error("unknown node id {index}")]
    UnknownNode { index: usize },

    /// A file operation was invoked on a directory node.
    #[error("node '{name}' is not a file")]
    NotAFile { name: NodeName },

    /// A directory operation was invoked on a file node.
    #[error("node '{name}' is not a directory")]
    NotADirectory { name: NodeName },

    /// A directory already has a child with this name.
    #[error("directory '{directory}' already contains a child named '{name}'")]
    DuplicateChild { directory: NodeName, name: NodeName },

    /// The node already has a parent and cannot be attached again.
    #[error("node '{name}' is already attached to a directory")]
    AlreadyAttached { name: NodeName },

    /// The node is already held by a decorator and cannot be used directly.
    #[error("node '{name}' is already wrapped by a decorator")]
    AlreadyWrapped { name: NodeName },

    /// Attaching the child would make a directory its own ancestor.
    #[error("attaching '{name}' to '{directory}' would create a cycle")]
    WouldCycle { directory: NodeName, name: NodeName },

    /// An on-disk path was queried before the node was written.
    #[error("node '{name}' has not been written to disk")]
    NotWritten { name: NodeName },

    /// An index file would shadow an existing child of the directory.
    #[error("directory '{directory}' already contains a child named '{name}', cannot emit index")]
    IndexCollision { directory: NodeName, name: NodeName },

    /// A byte source failed to produce content.
    #[error("content source for '{name}' failed")]
    ContentSource {
        name: NodeName,
        #[source]
        source: DynError,
    },

    /// A file decorator failed to transform content.
    #[error("decorator on '{name}' failed")]
    Decorator {
        name: NodeName,
        #[source]
        source: DynError,
    },

    /// A filesystem operation failed.
    #[error("i/o error at {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
