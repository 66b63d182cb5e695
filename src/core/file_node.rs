use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/*
 * One entry as reported by the folder lister for a single directory.
 * It carries no position in the tree; `FileNode::from_entry` attaches the
 * absolute path and depth when the entry is placed under its parent.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct FolderEntry {
    pub name: String,
    pub is_dir: bool,
    pub size_bytes: u64,
    pub modified: Option<OffsetDateTime>,
}

impl FolderEntry {
    #[cfg(test)]
    pub fn new(name: &str, is_dir: bool) -> Self {
        FolderEntry {
            name: name.to_string(),
            is_dir,
            size_bytes: 0,
            modified: None,
        }
    }
}

/*
 * Represents a filesystem entry known to the folder browser.
 * `children` is populated lazily: it stays empty until the directory has been
 * expanded at least once, and a non-empty list says nothing about whether the
 * node is currently expanded. That is what `expanded` tracks, and it is purely
 * a UI flag.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub size_bytes: u64,
    pub modified: Option<OffsetDateTime>,
    pub depth: usize,
    pub children: Vec<FileNode>, // Sorted directories-first, each at depth + 1.
    pub expanded: bool,
}

impl FileNode {
    /*
     * Creates a collapsed node with no children.
     */
    pub fn new(path: PathBuf, name: String, is_dir: bool, depth: usize) -> Self {
        FileNode {
            path,
            name,
            is_dir,
            size_bytes: 0,
            modified: None,
            depth,
            children: Vec::new(),
            expanded: false,
        }
    }

    /*
     * Places a lister entry under `parent` at the given depth.
     */
    pub fn from_entry(entry: FolderEntry, parent: &Path, depth: usize) -> Self {
        FileNode {
            path: parent.join(&entry.name),
            name: entry.name,
            is_dir: entry.is_dir,
            size_bytes: entry.size_bytes,
            modified: entry.modified,
            depth,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn new_test(path: &str, is_dir: bool, depth: usize) -> Self {
        let path = PathBuf::from(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        FileNode::new(path, name, is_dir, depth)
    }

    #[cfg(test)]
    pub fn new_dir_with_children(path: &str, depth: usize, children: Vec<FileNode>) -> Self {
        FileNode {
            children,
            ..FileNode::new_test(path, true, depth)
        }
    }
}

/*
 * Orders sibling nodes: directories before files, then by name.
 * Names compare case-insensitively first so "apple" and "Banana" sort the way a
 * user expects; the case-sensitive comparison only breaks ties.
 */
pub fn compare_siblings(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
    }
}

pub fn sort_nodes(nodes: &mut [FileNode]) {
    nodes.sort_by(compare_siblings);
}
