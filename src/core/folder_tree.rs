/*
 * Synchronizes the cached folder tree with fresh directory listings.
 *
 * The browser keeps one tree per chosen root folder. Directories are expanded
 * lazily: when the user opens one, its listing is fetched and patched into the
 * cache at the node addressed by the directory's path relative to the working
 * directory. All updates walk `&mut` borrows down the addressed path only, so
 * untouched siblings and subtrees are never rebuilt. A walk that cannot find
 * its target reports `FolderTreeError` and leaves the tree exactly as it was.
 */
use super::file_node::FileNode;
use super::path_segments::relative_segments;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderTreeError {
    PathNotFound(PathBuf),
    NodeNotFound { name: String, depth: usize },
}

impl std::fmt::Display for FolderTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderTreeError::PathNotFound(p) => {
                write!(f, "No node in the folder tree for path {p:?}")
            }
            FolderTreeError::NodeNotFound { name, depth } => {
                write!(f, "No node named '{name}' at depth {depth} in the folder tree")
            }
        }
    }
}

impl std::error::Error for FolderTreeError {}

pub type Result<T> = std::result::Result<T, FolderTreeError>;

/*
 * Places a freshly fetched listing into the tree.
 *
 * With `depth == 0` the listing is the root folder itself and replaces the
 * top-level sequence. Otherwise `target` is resolved against `working_dir` and
 * the matching node receives the listing as its children; its own `path` is
 * set to `target` and every other attribute, `expanded` included, is kept.
 * Each new child's `path` becomes `target/<child name>`.
 */
pub fn patch_subtree(
    nodes: &mut Vec<FileNode>,
    target: &Path,
    working_dir: &Path,
    new_children: Vec<FileNode>,
    depth: usize,
) -> Result<()> {
    let new_children = annotate_paths(new_children, target);

    if depth == 0 {
        log::debug!(
            "FolderTree: Replacing root listing with {} entries from {target:?}",
            new_children.len()
        );
        *nodes = new_children;
        return Ok(());
    }

    let segments = relative_segments(target, working_dir);
    let Some((last, parents)) = segments.split_last() else {
        return Err(FolderTreeError::PathNotFound(target.to_path_buf()));
    };

    let mut level = nodes;
    for segment in parents {
        level = &mut level
            .iter_mut()
            .find(|node| node.name == *segment)
            .ok_or_else(|| FolderTreeError::PathNotFound(target.to_path_buf()))?
            .children;
    }

    let node = level
        .iter_mut()
        .find(|node| node.name == *last)
        .ok_or_else(|| FolderTreeError::PathNotFound(target.to_path_buf()))?;

    log::debug!(
        "FolderTree: Patching {} children into {target:?} (depth {depth})",
        new_children.len()
    );
    node.path = target.to_path_buf();
    node.children = new_children;
    Ok(())
}

fn annotate_paths(children: Vec<FileNode>, parent: &Path) -> Vec<FileNode> {
    children
        .into_iter()
        .map(|mut child| {
            child.path = parent.join(&child.name);
            child
        })
        .collect()
}

/*
 * Flips the `expanded` flag of the first node, in pre-order, whose name and
 * depth both match. Names repeat across directories, which is why the depth
 * takes part in the match. Returns the node's new flag.
 */
pub fn toggle_expanded(nodes: &mut [FileNode], name: &str, depth: usize) -> Result<bool> {
    toggle_recursive(nodes, name, depth).ok_or_else(|| FolderTreeError::NodeNotFound {
        name: name.to_string(),
        depth,
    })
}

fn toggle_recursive(nodes: &mut [FileNode], name: &str, depth: usize) -> Option<bool> {
    for node in nodes.iter_mut() {
        if node.name == name && node.depth == depth {
            node.expanded = !node.expanded;
            return Some(node.expanded);
        }
        // Nothing below the target depth can match.
        if node.depth < depth && !node.children.is_empty() {
            if let Some(expanded) = toggle_recursive(&mut node.children, name, depth) {
                return Some(expanded);
            }
        }
    }
    None
}

/*
 * Flips the `expanded` flag of the node addressed by `target`. Unlike
 * `toggle_expanded` this cannot hit a same-named directory elsewhere in the
 * tree.
 */
pub fn toggle_expanded_at(nodes: &mut [FileNode], target: &Path, working_dir: &Path) -> Result<bool> {
    let node = find_node_mut(nodes, target, working_dir)
        .ok_or_else(|| FolderTreeError::PathNotFound(target.to_path_buf()))?;
    node.expanded = !node.expanded;
    Ok(node.expanded)
}

pub fn find_node<'a>(nodes: &'a [FileNode], target: &Path, working_dir: &Path) -> Option<&'a FileNode> {
    let segments = relative_segments(target, working_dir);
    let (first, rest) = segments.split_first()?;
    let mut node = nodes.iter().find(|n| n.name == *first)?;
    for segment in rest {
        node = node.children.iter().find(|n| n.name == *segment)?;
    }
    Some(node)
}

fn find_node_mut<'a>(
    nodes: &'a mut [FileNode],
    target: &Path,
    working_dir: &Path,
) -> Option<&'a mut FileNode> {
    let segments = relative_segments(target, working_dir);
    let (first, rest) = segments.split_first()?;
    let mut node = nodes.iter_mut().find(|n| n.name == *first)?;
    for segment in rest {
        node = node.children.iter_mut().find(|n| n.name == *segment)?;
    }
    Some(node)
}

/*
 * The rows a tree view shows: pre-order, descending only into expanded
 * directories.
 */
pub fn visible_rows(nodes: &[FileNode]) -> Vec<&FileNode> {
    fn recurse<'a>(nodes: &'a [FileNode], rows: &mut Vec<&'a FileNode>) {
        for node in nodes {
            rows.push(node);
            if node.is_dir && node.expanded {
                recurse(&node.children, rows);
            }
        }
    }

    let mut rows = Vec::new();
    recurse(nodes, &mut rows);
    rows
}
