//! Tree builder: group locations by file path into a compressed
//! directory/file/reference-line tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::{Location, RefLine, TreeNode};

/// Intermediate nesting keyed by path segment. `BTreeMap` gives the
/// emitted tree a defined order regardless of input order.
enum Entry {
    Dir {
        children: BTreeMap<String, Entry>,
        path: PathBuf,
    },
    File {
        locations: Vec<Location>,
        path: PathBuf,
    },
}

/// Build the reference tree for a location list.
///
/// Deterministic given the input: siblings are ordered directories
/// first, then files, each group case-sensitive lexicographic by
/// label; single-child directory chains are merged into one node;
/// reference lines are sorted by ascending line, stable on ties.
/// Empty and `/`-only paths are dropped silently.
///
/// # Errors
///
/// Returns `Error::TreeBuild` when one path is used both as a file and
/// as a directory across the input.
pub fn build(locations: &[Location]) -> Result<Vec<TreeNode>, Error> {
    let mut root: BTreeMap<String, Entry> = BTreeMap::new();
    for location in locations {
        insert_location(&mut root, location)?;
    }
    return Ok(emit_children(&root));
}

/// Place one location under its ancestor directories.
fn insert_location(root: &mut BTreeMap<String, Entry>, location: &Location) -> Result<(), Error> {
    let raw = location.path.to_string_lossy();
    let absolute = raw.starts_with('/');
    let segments: Vec<&str> = raw.split('/').filter(|s| return !s.is_empty()).collect();
    if segments.is_empty() {
        return Ok(());
    }

    let mut level = root;
    for (depth, segment) in segments.iter().enumerate() {
        let prefix = join_segments(absolute, &segments[..=depth]);
        let is_file = depth + 1 == segments.len();

        let entry = level.entry((*segment).to_string()).or_insert_with(|| {
            if is_file {
                return Entry::File { locations: Vec::new(), path: location.path.clone() };
            }
            return Entry::Dir { children: BTreeMap::new(), path: prefix.clone() };
        });

        match entry {
            Entry::Dir { children, .. } => {
                if is_file {
                    return Err(Error::TreeBuild {
                        path: location.path.clone(),
                        reason: format!("{} is already a directory", prefix.display()),
                    });
                }
                level = children;
            },
            Entry::File { locations, .. } => {
                if !is_file {
                    return Err(Error::TreeBuild {
                        path: location.path.clone(),
                        reason: format!("{} is already a file", prefix.display()),
                    });
                }
                locations.push(location.clone());
                return Ok(());
            },
        }
    }
    return Ok(());
}

fn join_segments(absolute: bool, segments: &[&str]) -> PathBuf {
    let joined = segments.join("/");
    if absolute {
        return PathBuf::from(format!("/{joined}"));
    }
    return PathBuf::from(joined);
}

/// Emit a sibling group: directories first, then files; `BTreeMap`
/// iteration already yields lexicographic label order within each group.
fn emit_children(children: &BTreeMap<String, Entry>) -> Vec<TreeNode> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for (label, entry) in children {
        match entry {
            Entry::Dir { children, path } => dirs.push(emit_directory(label, path, children)),
            Entry::File { locations, path } => files.push(emit_file(label, path, locations)),
        }
    }
    dirs.extend(files);
    return dirs;
}

/// Emit a directory node, merging a chain of single-directory children
/// into one label and recording the deepest path reached.
fn emit_directory(label: &str, path: &Path, children: &BTreeMap<String, Entry>) -> TreeNode {
    let mut segments = vec![label.to_string()];
    let mut merged_path = path.to_path_buf();
    let mut current = children;

    while current.len() == 1 {
        let Some((child_label, Entry::Dir { children: grandchildren, path: child_path })) =
            current.iter().next()
        else {
            break;
        };
        segments.push(child_label.clone());
        merged_path = child_path.clone();
        current = grandchildren;
    }

    return TreeNode::Directory {
        children: emit_children(current),
        label: format!("{}/", segments.join("/")),
        merged_path,
    };
}

/// Emit a file node with one reference line per location, sorted by line.
fn emit_file(label: &str, path: &Path, locations: &[Location]) -> TreeNode {
    let mut reference_lines: Vec<RefLine> = locations.iter().map(ref_line).collect();
    reference_lines.sort_by_key(|r| return r.line);

    return TreeNode::File {
        label: label.to_string(),
        path: path.to_path_buf(),
        reference_lines,
    };
}

fn ref_line(location: &Location) -> RefLine {
    let line = location.range.start.line.saturating_add(1);
    let column = location.range.start.column.saturating_add(1);
    return RefLine {
        column,
        key: format!("{}#{line}:{column}", location.path.display()),
        line,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, Range};

    fn location(path: &str, line: u32, column: u32) -> Location {
        return Location {
            path: path.into(),
            range: Range {
                end: Position { column: column + 3, line },
                start: Position { column, line },
            },
        };
    }

    fn labels(nodes: &[TreeNode]) -> Vec<&str> {
        return nodes
            .iter()
            .map(|n| {
                return match n {
                    TreeNode::Directory { label, .. } | TreeNode::File { label, .. } => {
                        label.as_str()
                    },
                };
            })
            .collect();
    }

    #[test]
    fn single_child_directory_chains_are_compressed() {
        let locations =
            vec![location("/a/b/c/f1.go", 0, 0), location("/a/b/d/f2.go", 0, 0)];
        let tree = build(&locations).unwrap();

        assert_eq!(tree.len(), 1);
        let TreeNode::Directory { children, label, merged_path } = &tree[0] else {
            panic!("expected a directory root");
        };
        assert_eq!(label, "a/b/");
        assert_eq!(merged_path, &PathBuf::from("/a/b"));
        assert_eq!(labels(children), vec!["c/", "d/"]);

        let TreeNode::Directory { children: c_children, .. } = &children[0] else {
            panic!("expected c/ to be a directory");
        };
        assert_eq!(labels(c_children), vec!["f1.go"]);
    }

    #[test]
    fn directories_come_before_files_then_lexicographic() {
        let locations = vec![
            location("/p/zz.go", 0, 0),
            location("/p/sub/x.go", 0, 0),
            location("/p/aa.go", 0, 0),
        ];
        let tree = build(&locations).unwrap();

        let TreeNode::Directory { children, label, .. } = &tree[0] else {
            panic!("expected a directory root");
        };
        assert_eq!(label, "p/");
        assert_eq!(labels(children), vec!["sub/", "aa.go", "zz.go"]);
    }

    #[test]
    fn reference_lines_are_sorted_by_line_stable_on_ties() {
        let locations = vec![
            location("f.go", 9, 4),
            location("f.go", 2, 0),
            location("f.go", 9, 1),
        ];
        let tree = build(&locations).unwrap();

        let TreeNode::File { reference_lines, .. } = &tree[0] else {
            panic!("expected a file node");
        };
        let positions: Vec<(u32, u32)> =
            reference_lines.iter().map(|r| return (r.line, r.column)).collect();
        // Ties keep input order: 9:4 arrived before 9:1.
        assert_eq!(positions, vec![(3, 1), (10, 5), (10, 2)]);
        assert_eq!(reference_lines[0].key, "f.go#3:1");
    }

    #[test]
    fn rebuilding_yields_an_identical_tree() {
        let locations = vec![
            location("/a/b/one.go", 3, 0),
            location("/z/two.go", 1, 1),
            location("/a/b/one.go", 1, 0),
            location("/a/c.go", 0, 0),
        ];
        assert_eq!(build(&locations).unwrap(), build(&locations).unwrap());
    }

    #[test]
    fn ancestor_labels_reconstruct_a_path_prefix() {
        let locations = vec![location("/x/y/z/file.go", 0, 0), location("/x/other.go", 0, 0)];
        let tree = build(&locations).unwrap();

        let TreeNode::Directory { children, label: root_label, .. } = &tree[0] else {
            panic!("expected a directory root");
        };
        let TreeNode::Directory { children: inner, label: chain_label, .. } = &children[0] else {
            panic!("expected the compressed y/z chain");
        };
        let TreeNode::File { label: file_label, path, .. } = &inner[0] else {
            panic!("expected the file");
        };
        let joined = format!("/{root_label}{chain_label}{file_label}");
        assert_eq!(joined, "/x/y/z/file.go");
        assert_eq!(path, &PathBuf::from("/x/y/z/file.go"));
    }

    #[test]
    fn root_and_empty_paths_are_dropped() {
        let locations = vec![location("/", 0, 0), location("", 0, 0), location("ok.go", 0, 0)];
        let tree = build(&locations).unwrap();
        assert_eq!(labels(&tree), vec!["ok.go"]);
    }

    #[test]
    fn relative_paths_keep_relative_merged_paths() {
        let locations = vec![location("pkg/util/a.go", 0, 0), location("pkg/util/b.go", 0, 0)];
        let tree = build(&locations).unwrap();

        let TreeNode::Directory { label, merged_path, .. } = &tree[0] else {
            panic!("expected a directory root");
        };
        assert_eq!(label, "pkg/util/");
        assert_eq!(merged_path, &PathBuf::from("pkg/util"));
    }

    #[test]
    fn file_and_directory_collision_is_an_error() {
        let locations = vec![location("/a/b", 0, 0), location("/a/b/c.go", 0, 0)];
        assert!(matches!(build(&locations), Err(Error::TreeBuild { .. })));
    }

    #[test]
    fn empty_input_builds_an_empty_tree() {
        assert_eq!(build(&[]).unwrap(), Vec::new());
    }
}
