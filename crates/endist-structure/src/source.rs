//! Byte sources: the content providers behind file nodes.
//!
//! A file node does not hold bytes directly; it holds a [`ByteSource`]
//! that produces them on demand during the write traversal. Fixed buffers
//! cover the common case, and [`FnSource`] defers production to a closure
//! for content that is expensive to build or not known at assembly time.

use crate::error::DynError;

/// Produces the content bytes of a file node.
///
/// Sources are queried once per write traversal. They must not perform
/// the persistence themselves; the traversal owns all disk I/O.
pub trait ByteSource: Send + Sync {
    /// Returns the file content.
    fn produce(&self) -> Result<Vec<u8>, DynError>;
}

impl ByteSource for Vec<u8> {
    fn produce(&self) -> Result<Vec<u8>, DynError> {
        Ok(self.clone())
    }
}

impl ByteSource for &'static [u8] {
    fn produce(&self) -> Result<Vec<u8>, DynError> {
        Ok(self.to_vec())
    }
}

/// Closure-backed byte source for deferred content production.
pub struct FnSource<F>(F);

impl<F> FnSource<F>
where
    F: Fn() -> Result<Vec<u8>, DynError> + Send + Sync,
{
    pub fn new(producer: F) -> Self {
        Self(producer)
    }
}

impl<F> ByteSource for FnSource<F>
where
    F: Fn() -> Result<Vec<u8>, DynError> + Send + Sync,
{
    fn produce(&self) -> Result<Vec<u8>, DynError> {
        (self.0)()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
