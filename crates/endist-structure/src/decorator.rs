//! # Decorators
//!
//! Behavior added to nodes without changing their structure. A decorator
//! wraps exactly one node; the wrapper answers every structural query
//! (name, parent, on-disk path) like the node it wraps, so parents and
//! siblings cannot tell a decorated node from a plain one. What changes
//! is the write step:
//!
//! - a [`FileDecorator`] transforms the bytes a file persists,
//! - a [`DirectoryDecorator`] takes over the write of a directory and
//!   may add to it, reorder it, or replace it entirely.
//!
//! Decorators stack: wrapping a wrapper applies the outer transformation
//! after the inner one. Behaviors are shared `Arc` values, so one
//! instance can wrap any number of nodes.

use tracing::debug;
use crate::error::{DynError, StructureError};
use crate::name::NodeName;
use crate::tree::DirectoryWrite;

/// Transforms the content bytes of a file node at write time.
///
/// Implementations receive the effective bytes of the wrapped node (its
/// source content with any inner decorators already applied) and return
/// the bytes to persist in their place. No I/O happens here; the
/// traversal persists the result atomically.
pub trait FileDecorator: Send + Sync {
    fn decorate(&self, payload: Vec<u8>) -> Result<Vec<u8>, DynError>;
}

/// Overrides the write step of a directory node.
///
/// The traversal hands the implementation a [`DirectoryWrite`] scope for
/// the wrapped directory. Calling [`DirectoryWrite::delegate`] runs the
/// standard recursive write; the implementation is free to surround that
/// with its own work or to skip it.
pub trait DirectoryDecorator: Send + Sync {
    fn write(&self, dir: DirectoryWrite<'_>) -> Result<(), StructureError>;
}

// ---------------------------------------------------------------------------
// Indexing decorator
// ---------------------------------------------------------------------------

const DEFAULT_INDEX_NAME: &str = "index";

/// Directory decorator that publishes a child listing next to the
/// directory's own content.
///
/// After the standard write of the wrapped directory, one extra file is
/// placed inside it: a JSON array of the child names, in insertion
/// order. Clients enumerate available artifacts from that file instead
/// of relying on directory listings. The listing file must not shadow a
/// real child; a directory that already contains a child with the
/// listing's name fails before anything is written.
pub struct IndexingDecorator {
    index_name: NodeName,
}

impl IndexingDecorator {
    /// Decorator emitting the listing as a file named `index`.
    pub fn new() -> Self {
        Self { index_name: NodeName::known(DEFAULT_INDEX_NAME) }
    }

    /// Decorator emitting the listing under a caller-chosen name.
    pub fn with_index_name(index_name: NodeName) -> Self {
        Self { index_name }
    }
}

impl Default for IndexingDecorator {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryDecorator for IndexingDecorator {
    fn write(&self, mut dir: DirectoryWrite<'_>) -> Result<(), StructureError> {
        let directory = dir.name()?;
        let names = dir.child_names()?;
        if names.contains(&self.index_name) {
            return Err(StructureError::IndexCollision {
                directory,
                name: self.index_name.clone(),
            });
        }
        dir.delegate()?;
        let listing = serde_json::to_vec(&names).map_err(|err| StructureError::Decorator {
            name: directory,
            source: Box::new(err),
        })?;
        let path = dir.emit_file(&self.index_name, &listing)?;
        debug!(path = %path.display(), entries = names.len(), "wrote index");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
