//! # Artifact Tree
//!
//! The in-memory model of one distribution run: files, directories, and
//! the decorators layered on top of them, assembled first and written to
//! disk in a single traversal afterwards.
//!
//! ## Ownership Model
//!
//! All nodes live in one [`Tree`] arena and refer to each other through
//! copyable [`NodeId`] handles. The parent link is a plain back-reference
//! (an id), so a directory and its children never own each other and the
//! whole graph is dropped with the tree. Ids are only meaningful for the
//! tree that minted them.
//!
//! ## Decorator Transparency
//!
//! A decorator node carries the same name as the node it wraps, and
//! attaching it to a directory records the parent on every node of the
//! wrapped chain. Whichever handle a caller holds, inner or outer, it
//! observes the same name, the same parent, and after a write the same
//! on-disk path. Only the bytes that reach disk differ.
//!
//! ## Write Contract
//!
//! `write(node, target)` persists `node` at `target/<name>`: directories
//! become filesystem directories and recurse into their children in
//! insertion order, files produce their effective content and persist it.
//! File content goes to a temporary file in the destination directory
//! first and is renamed into place, so a crash or error mid-write never
//! leaves a truncated file at a final path. The first error aborts the
//! traversal.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::debug;
use crate::decorator::{DirectoryDecorator, FileDecorator};
use crate::error::StructureError;
use crate::name::NodeName;
use crate::source::ByteSource;

// ---------------------------------------------------------------------------
// Node storage
// ---------------------------------------------------------------------------

/// Handle to a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

enum NodeKind {
    File {
        source: Box<dyn ByteSource>,
    },
    Directory {
        children: IndexMap<NodeName, NodeId>,
    },
    DecoratedFile {
        inner: NodeId,
        behavior: Arc<dyn FileDecorator>,
    },
    DecoratedDirectory {
        inner: NodeId,
        behavior: Arc<dyn DirectoryDecorator>,
    },
}

struct Slot {
    name: NodeName,
    parent: Option<NodeId>,
    on_disk: Option<PathBuf>,
    /// Set when a decorator holds this node as its decoratee.
    wrapped: bool,
    kind: NodeKind,
}

/// Arena owning every node of one artifact tree.
///
/// Assembly is pure in-memory composition; nothing touches the
/// filesystem until [`Tree::write`] runs.
#[derive(Default)]
pub struct Tree {
    slots: Vec<Slot>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unattached file node with fixed content bytes.
    pub fn file(&mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Result<NodeId, StructureError> {
        self.file_with_source(name, bytes.into())
    }

    /// Creates an unattached file node backed by an arbitrary byte source.
    pub fn file_with_source(
        &mut self,
        name: &str,
        source: impl ByteSource + 'static,
    ) -> Result<NodeId, StructureError> {
        let name = NodeName::new(name)?;
        Ok(self.insert(Slot {
            name,
            parent: None,
            on_disk: None,
            wrapped: false,
            kind: NodeKind::File { source: Box::new(source) },
        }))
    }

    /// Creates an unattached, empty directory node.
    pub fn directory(&mut self, name: &str) -> Result<NodeId, StructureError> {
        let name = NodeName::new(name)?;
        Ok(self.insert(Slot {
            name,
            parent: None,
            on_disk: None,
            wrapped: false,
            kind: NodeKind::Directory { children: IndexMap::new() },
        }))
    }

    /// Wraps a file node in a content decorator and returns the wrapper.
    ///
    /// The wrapper answers structural queries exactly like the wrapped
    /// node; at write time the decorator transforms the node's bytes
    /// before they are persisted. Decorate first, then attach the wrapper
    /// to a parent: wrapping an already attached node is rejected, as is
    /// wrapping a node twice.
    pub fn decorate_file(
        &mut self,
        inner: NodeId,
        behavior: Arc<dyn FileDecorator>,
    ) -> Result<NodeId, StructureError> {
        let slot = self.slot(inner)?;
        if !matches!(&slot.kind, NodeKind::File { .. } | NodeKind::DecoratedFile { .. }) {
            return Err(StructureError::NotAFile { name: slot.name.clone() });
        }
        self.decorate(inner, |name| Slot {
            name,
            parent: None,
            on_disk: None,
            wrapped: false,
            kind: NodeKind::DecoratedFile { inner, behavior },
        })
    }

    /// Wraps a directory node in a write decorator and returns the wrapper.
    ///
    /// Same rules as [`Tree::decorate_file`], for directory nodes.
    pub fn decorate_directory(
        &mut self,
        inner: NodeId,
        behavior: Arc<dyn DirectoryDecorator>,
    ) -> Result<NodeId, StructureError> {
        let slot = self.slot(inner)?;
        if !matches!(&slot.kind, NodeKind::Directory { .. } | NodeKind::DecoratedDirectory { .. }) {
            return Err(StructureError::NotADirectory { name: slot.name.clone() });
        }
        self.decorate(inner, |name| Slot {
            name,
            parent: None,
            on_disk: None,
            wrapped: false,
            kind: NodeKind::DecoratedDirectory { inner, behavior },
        })
    }

    fn decorate(
        &mut self,
        inner: NodeId,
        make_slot: impl FnOnce(NodeName) -> Slot,
    ) -> Result<NodeId, StructureError> {
        let slot = self.slot(inner)?;
        if slot.wrapped {
            return Err(StructureError::AlreadyWrapped { name: slot.name.clone() });
        }
        if slot.parent.is_some() {
            return Err(StructureError::AlreadyAttached { name: slot.name.clone() });
        }
        let name = slot.name.clone();
        let id = self.insert(make_slot(name));
        self.slot_mut(inner)?.wrapped = true;
        Ok(id)
    }

    /// Adds a file node as a child of a directory.
    ///
    /// Resolves `directory` through any directory decorators, rejects
    /// duplicate child names before any I/O can happen, and records the
    /// parent on the child and on every node of its decorator chain.
    pub fn add_file(&mut self, directory: NodeId, child: NodeId) -> Result<(), StructureError> {
        let dir = self.resolve_directory(directory)?;
        let child_slot = self.slot(child)?;
        if !matches!(&child_slot.kind, NodeKind::File { .. } | NodeKind::DecoratedFile { .. }) {
            return Err(StructureError::NotAFile { name: child_slot.name.clone() });
        }
        self.attach(dir, child)
    }

    /// Adds a directory node as a child of a directory.
    ///
    /// Same contract as [`Tree::add_file`]; additionally rejects links
    /// that would make a directory its own ancestor.
    pub fn add_directory(&mut self, directory: NodeId, child: NodeId) -> Result<(), StructureError> {
        let dir = self.resolve_directory(directory)?;
        let child_slot = self.slot(child)?;
        if !matches!(&child_slot.kind, NodeKind::Directory { .. } | NodeKind::DecoratedDirectory { .. }) {
            return Err(StructureError::NotADirectory { name: child_slot.name.clone() });
        }
        let resolved_child = self.resolve_directory(child)?;
        let mut cursor = Some(dir);
        while let Some(ancestor) = cursor {
            if ancestor == resolved_child {
                return Err(StructureError::WouldCycle {
                    directory: self.slot(dir)?.name.clone(),
                    name: self.slot(child)?.name.clone(),
                });
            }
            cursor = self.slot(ancestor)?.parent;
        }
        self.attach(dir, child)
    }

    fn attach(&mut self, dir: NodeId, child: NodeId) -> Result<(), StructureError> {
        let child_slot = self.slot(child)?;
        if child_slot.wrapped {
            return Err(StructureError::AlreadyWrapped { name: child_slot.name.clone() });
        }
        if child_slot.parent.is_some() {
            return Err(StructureError::AlreadyAttached { name: child_slot.name.clone() });
        }
        let child_name = child_slot.name.clone();
        let dir_name = self.slot(dir)?.name.clone();

        let NodeKind::Directory { children } = &mut self.slot_mut(dir)?.kind else {
            return Err(StructureError::NotADirectory { name: dir_name });
        };
        if children.contains_key(&child_name) {
            return Err(StructureError::DuplicateChild { directory: dir_name, name: child_name });
        }
        children.insert(child_name, child);

        // The parent must be visible through every layer of the child's
        // decorator chain.
        let mut cursor = Some(child);
        while let Some(node) = cursor {
            let slot = self.slot_mut(node)?;
            slot.parent = Some(dir);
            cursor = match &slot.kind {
                NodeKind::DecoratedFile { inner, .. }
                | NodeKind::DecoratedDirectory { inner, .. } => Some(*inner),
                _ => None,
            };
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Structural queries
// ---------------------------------------------------------------------------

impl Tree {
    /// The node's name. Decorators report the wrapped node's name.
    pub fn name(&self, id: NodeId) -> Result<&NodeName, StructureError> {
        Ok(&self.slot(id)?.name)
    }

    /// The directory this node is attached to, or `None` for a root or a
    /// node that has not been attached yet.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, StructureError> {
        Ok(self.slot(id)?.parent)
    }

    /// The on-disk path of a written file node. Fails with
    /// [`StructureError::NotWritten`] before [`Tree::write`] has run.
    pub fn file_on_disk(&self, id: NodeId) -> Result<&Path, StructureError> {
        let slot = self.slot(id)?;
        if !matches!(&slot.kind, NodeKind::File { .. } | NodeKind::DecoratedFile { .. }) {
            return Err(StructureError::NotAFile { name: slot.name.clone() });
        }
        slot.on_disk
            .as_deref()
            .ok_or_else(|| StructureError::NotWritten { name: slot.name.clone() })
    }

    /// The on-disk path of a written directory node. Fails with
    /// [`StructureError::NotWritten`] before [`Tree::write`] has run.
    pub fn directory_on_disk(&self, id: NodeId) -> Result<&Path, StructureError> {
        let slot = self.slot(id)?;
        if !matches!(&slot.kind, NodeKind::Directory { .. } | NodeKind::DecoratedDirectory { .. }) {
            return Err(StructureError::NotADirectory { name: slot.name.clone() });
        }
        slot.on_disk
            .as_deref()
            .ok_or_else(|| StructureError::NotWritten { name: slot.name.clone() })
    }

    /// Child names of a directory, in insertion order.
    pub fn child_names(&self, id: NodeId) -> Result<Vec<NodeName>, StructureError> {
        let dir = self.resolve_directory(id)?;
        let slot = self.slot(dir)?;
        match &slot.kind {
            NodeKind::Directory { children } => Ok(children.keys().cloned().collect()),
            _ => Err(StructureError::NotADirectory { name: slot.name.clone() }),
        }
    }

    /// The bytes a file node would persist: its source content with every
    /// decorator of the chain applied, outermost last. Directories have
    /// no byte content.
    pub fn effective_bytes(&self, id: NodeId) -> Result<Vec<u8>, StructureError> {
        let slot = self.slot(id)?;
        match &slot.kind {
            NodeKind::File { source } => source
                .produce()
                .map_err(|err| StructureError::ContentSource { name: slot.name.clone(), source: err }),
            NodeKind::DecoratedFile { inner, behavior } => {
                let payload = self.effective_bytes(*inner)?;
                behavior
                    .decorate(payload)
                    .map_err(|err| StructureError::Decorator { name: slot.name.clone(), source: err })
            }
            NodeKind::Directory { .. } | NodeKind::DecoratedDirectory { .. } => {
                Err(StructureError::NotAFile { name: slot.name.clone() })
            }
        }
    }

    /// Follows directory decorators down to the underlying directory.
    fn resolve_directory(&self, id: NodeId) -> Result<NodeId, StructureError> {
        let mut current = id;
        loop {
            let slot = self.slot(current)?;
            match &slot.kind {
                NodeKind::Directory { .. } => return Ok(current),
                NodeKind::DecoratedDirectory { inner, .. } => current = *inner,
                _ => return Err(StructureError::NotADirectory { name: slot.name.clone() }),
            }
        }
    }

    fn insert(&mut self, slot: Slot) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(slot);
        id
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, StructureError> {
        self.slots.get(id.0).ok_or(StructureError::UnknownNode { index: id.0 })
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, StructureError> {
        self.slots.get_mut(id.0).ok_or(StructureError::UnknownNode { index: id.0 })
    }
}

// ---------------------------------------------------------------------------
// Write traversal
// ---------------------------------------------------------------------------

impl Tree {
    /// Writes the node under `target`, creating `target` if needed.
    ///
    /// Directories are created as `target/<name>` and recursed into in
    /// insertion order; files persist their effective content at
    /// `target/<name>`. The resolved path of every visited node becomes
    /// queryable through [`Tree::file_on_disk`] and
    /// [`Tree::directory_on_disk`] afterwards. The first structural,
    /// content, or I/O error aborts the traversal; file contents only
    /// ever appear at their final path complete.
    pub fn write(&mut self, node: NodeId, target: &Path) -> Result<(), StructureError> {
        let slot = self.slot(node)?;
        if slot.wrapped {
            return Err(StructureError::AlreadyWrapped { name: slot.name.clone() });
        }
        fs::create_dir_all(target)
            .map_err(|source| StructureError::Io { path: target.to_path_buf(), source })?;
        self.write_node(node, target)
    }

    fn write_node(&mut self, id: NodeId, target: &Path) -> Result<(), StructureError> {
        let slot = self.slot(id)?;
        match &slot.kind {
            NodeKind::File { .. } | NodeKind::DecoratedFile { .. } => {
                let name = slot.name.clone();
                let bytes = self.effective_bytes(id)?;
                let path = persist_bytes(target, &name, &bytes)?;
                debug!(path = %path.display(), bytes = bytes.len(), "persisted file");
                self.stamp_file_chain(id, path);
                Ok(())
            }
            NodeKind::Directory { children } => {
                let name = slot.name.clone();
                let child_ids: Vec<NodeId> = children.values().copied().collect();
                let path = target.join(name.as_str());
                fs::create_dir_all(&path)
                    .map_err(|source| StructureError::Io { path: path.clone(), source })?;
                debug!(path = %path.display(), children = child_ids.len(), "created directory");
                self.slot_mut(id)?.on_disk = Some(path.clone());
                for child in child_ids {
                    self.write_node(child, &path)?;
                }
                Ok(())
            }
            NodeKind::DecoratedDirectory { inner, behavior } => {
                let inner = *inner;
                let behavior = Arc::clone(behavior);
                behavior.write(DirectoryWrite { tree: self, inner, target })?;
                let inner_path = self.slot(inner)?.on_disk.clone();
                self.slot_mut(id)?.on_disk = inner_path;
                Ok(())
            }
        }
    }

    /// Records the written path on a file node and every decorator layer
    /// around it, so inner and outer handles resolve to the same path.
    fn stamp_file_chain(&mut self, id: NodeId, path: PathBuf) {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let Some(slot) = self.slots.get_mut(node.0) else { break };
            slot.on_disk = Some(path.clone());
            cursor = match &slot.kind {
                NodeKind::DecoratedFile { inner, .. } => Some(*inner),
                _ => None,
            };
        }
    }
}

/// Persists `bytes` as `dir/<name>` via a temporary file in `dir`,
/// renamed into place once fully written.
fn persist_bytes(dir: &Path, name: &NodeName, bytes: &[u8]) -> Result<PathBuf, StructureError> {
    let path = dir.join(name.as_str());
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|source| StructureError::Io { path: dir.to_path_buf(), source })?;
    tmp.write_all(bytes)
        .map_err(|source| StructureError::Io { path: path.clone(), source })?;
    tmp.persist(&path)
        .map_err(|err| StructureError::Io { path: path.clone(), source: err.error })?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Decorator write scope
// ---------------------------------------------------------------------------

/// Borrowed view handed to a [`DirectoryDecorator`] while its directory
/// is being written.
///
/// The decorator decides when (and whether) to run the standard write of
/// the wrapped directory via [`DirectoryWrite::delegate`], and may place
/// additional files into the written directory afterwards.
pub struct DirectoryWrite<'a> {
    tree: &'a mut Tree,
    inner: NodeId,
    target: &'a Path,
}

impl DirectoryWrite<'_> {
    /// The tree being written.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// The wrapped directory node.
    pub fn inner(&self) -> NodeId {
        self.inner
    }

    /// The destination the directory is being written under.
    pub fn target(&self) -> &Path {
        self.target
    }

    /// Name of the wrapped directory.
    pub fn name(&self) -> Result<NodeName, StructureError> {
        self.tree.name(self.inner).map(|name| name.clone())
    }

    /// Child names of the wrapped directory, in insertion order.
    pub fn child_names(&self) -> Result<Vec<NodeName>, StructureError> {
        self.tree.child_names(self.inner)
    }

    /// Runs the standard write of the wrapped directory.
    pub fn delegate(&mut self) -> Result<(), StructureError> {
        self.tree.write_node(self.inner, self.target)
    }

    /// On-disk path of the wrapped directory; available once
    /// [`DirectoryWrite::delegate`] has run.
    pub fn directory_path(&self) -> Result<PathBuf, StructureError> {
        self.tree.directory_on_disk(self.inner).map(Path::to_path_buf)
    }

    /// Atomically places an extra file into the written directory.
    pub fn emit_file(&mut self, name: &NodeName, bytes: &[u8]) -> Result<PathBuf, StructureError> {
        let dir = self.directory_path()?;
        let path = persist_bytes(&dir, name, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "emitted file");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use crate::error::DynError;
    use crate::source::FnSource;

    /// Test decorator that reverses the payload bytes.
    struct Reverse;

    impl FileDecorator for Reverse {
        fn decorate(&self, mut payload: Vec<u8>) -> Result<Vec<u8>, DynError> {
            payload.reverse();
            Ok(payload)
        }
    }

    /// Test decorator that always fails.
    struct Failing;

    impl FileDecorator for Failing {
        fn decorate(&self, _payload: Vec<u8>) -> Result<Vec<u8>, DynError> {
            Err(DynError::from("transformation unavailable"))
        }
    }

    #[test]
    fn test_invalid_names_are_rejected_at_creation() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.file("a/b", b"x".to_vec()),
            Err(StructureError::InvalidName { .. })
        ));
        assert!(matches!(
            tree.directory(""),
            Err(StructureError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_attaching_sets_the_parent_once() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let file = tree.file("version", b"v1".to_vec()).unwrap();

        assert_eq!(tree.parent(file).unwrap(), None);
        tree.add_file(root, file).unwrap();
        assert_eq!(tree.parent(file).unwrap(), Some(root));

        let other = tree.directory("other").unwrap();
        assert!(matches!(
            tree.add_file(other, file),
            Err(StructureError::AlreadyAttached { .. })
        ));
    }

    #[test]
    fn test_duplicate_child_names_fail_before_any_write() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let first = tree.file("export.bin", b"a".to_vec()).unwrap();
        let second = tree.file("export.bin", b"b".to_vec()).unwrap();

        tree.add_file(root, first).unwrap();
        let err = tree.add_file(root, second).unwrap_err();
        assert!(matches!(err, StructureError::DuplicateChild { .. }));

        // The rejected node is still unattached.
        assert_eq!(tree.parent(second).unwrap(), None);
    }

    #[test]
    fn test_kind_mismatches_are_structural_errors() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let dir = tree.directory("de").unwrap();
        let file = tree.file("version", b"v1".to_vec()).unwrap();

        assert!(matches!(tree.add_file(root, dir), Err(StructureError::NotAFile { .. })));
        assert!(matches!(
            tree.add_directory(root, file),
            Err(StructureError::NotADirectory { .. })
        ));
        assert!(matches!(
            tree.add_file(file, dir),
            Err(StructureError::NotADirectory { .. })
        ));
        assert!(matches!(tree.child_names(file), Err(StructureError::NotADirectory { .. })));
        assert!(matches!(tree.effective_bytes(root), Err(StructureError::NotAFile { .. })));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut tree = Tree::new();
        let a = tree.directory("a").unwrap();
        let b = tree.directory("b").unwrap();
        tree.add_directory(a, b).unwrap();

        assert!(matches!(tree.add_directory(b, a), Err(StructureError::WouldCycle { .. })));
        let c = tree.directory("c").unwrap();
        assert!(matches!(tree.add_directory(c, c), Err(StructureError::WouldCycle { .. })));
    }

    #[test]
    fn test_paths_are_unavailable_before_write() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let file = tree.file("version", b"v1".to_vec()).unwrap();
        tree.add_file(root, file).unwrap();

        assert!(matches!(tree.file_on_disk(file), Err(StructureError::NotWritten { .. })));
        assert!(matches!(
            tree.directory_on_disk(root),
            Err(StructureError::NotWritten { .. })
        ));
    }

    #[test]
    fn test_foreign_ids_are_unknown() {
        let mut big = Tree::new();
        for i in 0..4 {
            big.directory(&format!("d{i}")).unwrap();
        }
        let foreign = big.directory("last").unwrap();

        let small = Tree::new();
        assert!(matches!(small.name(foreign), Err(StructureError::UnknownNode { .. })));
    }

    #[test]
    fn test_write_mirrors_the_tree_on_disk() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let version = tree.file("version", b"v1".to_vec()).unwrap();
        let country = tree.directory("DE").unwrap();
        let hour = tree.file("04", b"exposure keys".to_vec()).unwrap();

        tree.add_file(root, version).unwrap();
        tree.add_directory(root, country).unwrap();
        tree.add_file(country, hour).unwrap();

        tree.write(root, out.path()).unwrap();

        let root_path = out.path().join("out");
        assert_eq!(tree.directory_on_disk(root).unwrap(), root_path);
        assert_eq!(fs::read(root_path.join("version")).unwrap(), b"v1");
        assert_eq!(fs::read(root_path.join("DE").join("04")).unwrap(), b"exposure keys");
        assert_eq!(tree.file_on_disk(hour).unwrap(), root_path.join("DE").join("04"));
    }

    #[test]
    fn test_a_file_can_be_written_as_the_root() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let file = tree.file("export.bin", b"payload".to_vec()).unwrap();

        tree.write(file, out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("export.bin")).unwrap(), b"payload");
    }

    #[test]
    fn test_decorated_file_replaces_bytes_but_nothing_else() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let inner = tree.file("export.bin", b"abc".to_vec()).unwrap();
        let outer = tree.decorate_file(inner, Arc::new(Reverse)).unwrap();
        tree.add_file(root, outer).unwrap();

        // Transparency before the write: same name, same parent, through
        // either handle.
        assert_eq!(tree.name(outer).unwrap(), tree.name(inner).unwrap());
        assert_eq!(tree.parent(outer).unwrap(), Some(root));
        assert_eq!(tree.parent(inner).unwrap(), Some(root));
        assert_eq!(tree.child_names(root).unwrap().len(), 1);

        tree.write(root, out.path()).unwrap();

        let path = out.path().join("out").join("export.bin");
        assert_eq!(fs::read(&path).unwrap(), b"cba");
        // Both handles resolve to the same written path.
        assert_eq!(tree.file_on_disk(outer).unwrap(), path);
        assert_eq!(tree.file_on_disk(inner).unwrap(), path);
    }

    #[test]
    fn test_decorators_stack_outermost_last() {
        let mut tree = Tree::new();
        let file = tree.file("data", b"ab".to_vec()).unwrap();
        let once = tree.decorate_file(file, Arc::new(Reverse)).unwrap();
        let twice = tree.decorate_file(once, Arc::new(Reverse)).unwrap();

        assert_eq!(tree.effective_bytes(once).unwrap(), b"ba");
        assert_eq!(tree.effective_bytes(twice).unwrap(), b"ab");
    }

    #[test]
    fn test_wrapped_nodes_cannot_be_attached_or_rewrapped() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let inner = tree.file("data", b"x".to_vec()).unwrap();
        let _outer = tree.decorate_file(inner, Arc::new(Reverse)).unwrap();

        assert!(matches!(
            tree.add_file(root, inner),
            Err(StructureError::AlreadyWrapped { .. })
        ));
        assert!(matches!(
            tree.decorate_file(inner, Arc::new(Reverse)),
            Err(StructureError::AlreadyWrapped { .. })
        ));

        let attached = tree.file("attached", b"y".to_vec()).unwrap();
        tree.add_file(root, attached).unwrap();
        assert!(matches!(
            tree.decorate_file(attached, Arc::new(Reverse)),
            Err(StructureError::AlreadyAttached { .. })
        ));
    }

    #[test]
    fn test_failing_decorator_aborts_and_leaves_no_file() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let inner = tree.file("data", b"x".to_vec()).unwrap();
        let outer = tree.decorate_file(inner, Arc::new(Failing)).unwrap();
        tree.add_file(root, outer).unwrap();

        let err = tree.write(root, out.path()).unwrap_err();
        assert!(matches!(err, StructureError::Decorator { .. }));
        assert!(!out.path().join("out").join("data").exists());
        assert!(matches!(tree.file_on_disk(outer), Err(StructureError::NotWritten { .. })));
    }

    #[test]
    fn test_failing_source_aborts_the_traversal() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let ok = tree.file("first", b"1".to_vec()).unwrap();
        let bad = tree
            .file_with_source("second", FnSource::new(|| Err(DynError::from("not ready"))))
            .unwrap();
        let never = tree.file("third", b"3".to_vec()).unwrap();

        tree.add_file(root, ok).unwrap();
        tree.add_file(root, bad).unwrap();
        tree.add_file(root, never).unwrap();

        let err = tree.write(root, out.path()).unwrap_err();
        assert!(matches!(err, StructureError::ContentSource { .. }));

        // Siblings before the failure were written, later ones were not.
        assert!(out.path().join("out").join("first").exists());
        assert!(!out.path().join("out").join("second").exists());
        assert!(!out.path().join("out").join("third").exists());
    }

    #[test]
    fn test_child_order_is_insertion_order() {
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        for name in ["zeta", "alpha", "mid"] {
            let file = tree.file(name, b"x".to_vec()).unwrap();
            tree.add_file(root, file).unwrap();
        }
        let names: Vec<String> =
            tree.child_names(root).unwrap().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_writing_twice_produces_the_same_layout() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let root = tree.directory("out").unwrap();
        let file = tree.file("stable", b"same bytes".to_vec()).unwrap();
        tree.add_file(root, file).unwrap();

        tree.write(root, out.path()).unwrap();
        let first = fs::read(out.path().join("out").join("stable")).unwrap();
        tree.write(root, out.path()).unwrap();
        let second = fs::read(out.path().join("out").join("stable")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_writing_a_wrapped_node_directly_is_rejected() {
        let out = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let inner = tree.file("data", b"x".to_vec()).unwrap();
        let _outer = tree.decorate_file(inner, Arc::new(Reverse)).unwrap();

        assert!(matches!(
            tree.write(inner, out.path()),
            Err(StructureError::AlreadyWrapped { .. })
        ));
    }
}
