//! End-to-end assembly test: build a realistic distribution layout,
//! write it, and check the on-disk mirror byte for byte.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use endist_structure::{IndexingDecorator, NodeId, Tree};

/// Collects every file under `root` as `relative path -> content`.
fn collect_layout(root: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap().to_string_lossy().into_owned();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

/// Builds the tree used by the tests and returns its root id.
///
/// Layout:
///
/// ```text
/// out/
///   version
///   DE/
///     date/            (indexed)
///       2020-05-01
///       2020-05-02
/// ```
fn build_distribution(tree: &mut Tree) -> NodeId {
    let root = tree.directory("out").unwrap();
    let version = tree.file("version", b"v1".to_vec()).unwrap();
    tree.add_file(root, version).unwrap();

    let country = tree.directory("DE").unwrap();
    tree.add_directory(root, country).unwrap();

    let dates = tree.directory("date").unwrap();
    for day in ["2020-05-01", "2020-05-02"] {
        let file = tree.file(day, format!("keys for {day}").into_bytes()).unwrap();
        tree.add_file(dates, file).unwrap();
    }
    let indexed = tree.decorate_directory(dates, Arc::new(IndexingDecorator::new())).unwrap();
    tree.add_directory(country, indexed).unwrap();

    root
}

// ---------------------------------------------------------------------------
// On-disk mirror
// ---------------------------------------------------------------------------

#[test]
fn test_written_layout_mirrors_the_tree() {
    let out = tempfile::tempdir().unwrap();
    let mut tree = Tree::new();
    let root = build_distribution(&mut tree);

    tree.write(root, out.path()).unwrap();

    let layout = collect_layout(out.path());
    let paths: Vec<&str> = layout.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        [
            "out/DE/date/2020-05-01",
            "out/DE/date/2020-05-02",
            "out/DE/date/index",
            "out/version",
        ]
    );
    assert_eq!(layout["out/version"], b"v1");
    assert_eq!(layout["out/DE/date/2020-05-01"], b"keys for 2020-05-01");

    let listing: Vec<String> = serde_json::from_slice(&layout["out/DE/date/index"]).unwrap();
    assert_eq!(listing, ["2020-05-01", "2020-05-02"]);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn test_two_writes_of_one_tree_are_identical() {
    let first_out = tempfile::tempdir().unwrap();
    let second_out = tempfile::tempdir().unwrap();

    let mut tree = Tree::new();
    let root = build_distribution(&mut tree);

    tree.write(root, first_out.path()).unwrap();
    tree.write(root, second_out.path()).unwrap();

    assert_eq!(collect_layout(first_out.path()), collect_layout(second_out.path()));
}

// ---------------------------------------------------------------------------
// Resolved paths
// ---------------------------------------------------------------------------

#[test]
fn test_resolved_paths_point_into_the_written_layout() {
    let out = tempfile::tempdir().unwrap();
    let mut tree = Tree::new();
    let root = build_distribution(&mut tree);

    tree.write(root, out.path()).unwrap();

    let root_path = tree.directory_on_disk(root).unwrap().to_path_buf();
    assert_eq!(root_path, out.path().join("out"));
    assert!(root_path.join("DE").join("date").join("index").exists());
}
