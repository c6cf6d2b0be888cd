//! # Node Names
//!
//! `NodeName` is the validated name of a file or directory inside an
//! artifact tree. Names become path components of the published CDN
//! layout, so anything that could escape or alias a directory level is
//! rejected at construction time. A `NodeName` held by any API in this
//! workspace is known to be safe to join onto an output directory.
//!
//! ## Validation Rules
//!
//! - must not be empty
//! - must not contain `/`, `\` or NUL
//! - must not be `.` or `..`

use std::fmt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::error::StructureError;

/// Validated name of a single tree node, used as one path component of
/// the written artifact layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(String);

impl NodeName {
    /// Validates `name` and wraps it. Fails with
    /// [`StructureError::InvalidName`] when the name cannot be used as a
    /// path component.
    pub fn new(name: impl Into<String>) -> Result<Self, StructureError> {
        let name = name.into();
        if let Some(reason) = Self::violation(&name) {
            return Err(StructureError::InvalidName { name, reason });
        }
        Ok(Self(name))
    }

    /// Constructs a name already known to satisfy the rules. Callers must
    /// only pass literals that `violation` accepts.
    pub(crate) fn known(name: &str) -> Self {
        debug_assert!(Self::violation(name).is_none());
        Self(name.to_owned())
    }

    fn violation(name: &str) -> Option<&'static str> {
        if name.is_empty() {
            return Some("must not be empty");
        }
        if name.contains(['/', '\\']) {
            return Some("must not contain path separators");
        }
        if name.contains('\0') {
            return Some("must not contain NUL");
        }
        if name == "." || name == ".." {
            return Some("must not alias the current or parent directory");
        }
        None
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NodeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NodeName::new(raw).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------
