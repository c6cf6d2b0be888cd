//! # endist-structure — Artifact Tree Model & Write Traversal
//!
//! In-memory model of a distribution artifact tree and the traversal
//! that writes it to disk. A tree of named files and directories is
//! assembled first, decorators are layered onto nodes to change what
//! their write step produces, and one deterministic depth-first write
//! persists the whole structure under an output directory.
//!
//! ## Design
//!
//! 1. **Assembly is pure.** Building the tree performs no I/O; every
//!    filesystem effect happens inside [`Tree::write`], so a run that
//!    fails during assembly leaves no trace on disk.
//! 2. **Decorators are invisible to parents.** A directory holding a
//!    decorated node behaves exactly as if it held the plain node; only
//!    the bytes reaching disk differ. See [`decorator`].
//! 3. **Writes are atomic per file.** Content goes to a temporary file
//!    in the destination directory and is renamed into place, so no
//!    observer ever sees a truncated artifact at a final path.
//! 4. **Errors surface, always.** Structural misuse fails during
//!    assembly; content and I/O failures abort the traversal and carry
//!    the node name or path they belong to.
//!
//! ## Crate Policy
//!
//! - No `unsafe`.
//! - No panics in library code; all fallible paths return
//!   [`StructureError`].
//! - Structural validation happens at construction and attach time, not
//!   at write time, wherever the information exists early.

pub mod decorator;
pub mod error;
pub mod name;
pub mod source;
pub mod tree;

pub use decorator::{DirectoryDecorator, FileDecorator, IndexingDecorator};
pub use error::{DynError, StructureError};
pub use name::NodeName;
pub use source::{ByteSource, FnSource};
pub use tree::{DirectoryWrite, NodeId, Tree};
