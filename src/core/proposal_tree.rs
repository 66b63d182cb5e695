/*
 * Turns the flat list of changes proposed by the classification service into
 * the rows of the preview pane, tracks which rows the user accepted, and maps
 * the accepted rows back onto the proposals that should be committed.
 *
 * Destination paths are grouped segment by segment into a trie under a
 * synthetic `root` node; children keep the order in which their segment was
 * first seen, so the pre-order flattening is reproducible for a given input
 * order. Each row is named by its ancestors joined with `/`, starting at
 * `/root`, which is the key used by `AcceptedState`.
 */
use super::path_segments::split_destination;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const PREVIEW_ROOT_NAME: &str = "root";
const PREVIEW_ROOT_PREFIX: &str = "/root/";

/*
 * One relocation recommended by the classification service. Older service
 * builds name the fields `file_path`/`new_path`; both spellings are accepted.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    #[serde(alias = "file_path")]
    pub src_path: String,
    #[serde(alias = "new_path")]
    pub dst_path: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalNode {
    pub name: String,
    pub children: Vec<ProposalNode>,
}

impl ProposalNode {
    fn new(name: &str) -> Self {
        ProposalNode {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    fn child_mut_or_insert(&mut self, name: &str) -> &mut ProposalNode {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(ProposalNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub full_filename: String,
    pub name: String,
    // The synthetic root sits at -1 so top-level entries start at 0.
    pub depth: isize,
    pub is_leaf: bool,
}

impl PreviewRow {
    /*
     * The row's destination relative to the browsed folder, i.e. the full
     * filename without the synthetic `/root/` prefix.
     */
    pub fn destination(&self) -> Option<&str> {
        self.full_filename.strip_prefix(PREVIEW_ROOT_PREFIX)
    }
}

/*
 * The payload of one `/commit` request.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub base_path: String,
    pub src_path: String,
    pub dst_path: String,
}

pub fn build_tree(changes: &[ProposedChange]) -> ProposalNode {
    let mut root = ProposalNode::new(PREVIEW_ROOT_NAME);
    for change in changes {
        let mut node = &mut root;
        for segment in split_destination(&change.dst_path) {
            node = node.child_mut_or_insert(segment);
        }
    }
    root
}

/*
 * Pre-order walk of the trie: parent first, then children in insertion order.
 * The synthetic root is the first row; callers showing a preview drop it.
 */
pub fn flatten(root: &ProposalNode) -> Vec<PreviewRow> {
    fn recurse(node: &ProposalNode, prefix: &str, depth: isize, rows: &mut Vec<PreviewRow>) {
        let full_filename = format!("{prefix}/{}", node.name);
        rows.push(PreviewRow {
            full_filename: full_filename.clone(),
            name: node.name.clone(),
            depth,
            is_leaf: node.children.is_empty(),
        });
        for child in &node.children {
            recurse(child, &full_filename, depth + 1, rows);
        }
    }

    let mut rows = Vec::new();
    recurse(root, "", -1, &mut rows);
    rows
}

pub fn preview_rows(changes: &[ProposedChange]) -> Vec<PreviewRow> {
    flatten(&build_tree(changes)).into_iter().skip(1).collect()
}

/*
 * Per-row acceptance flags keyed by `PreviewRow::full_filename`. Every row
 * starts out rejected.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedState {
    accepted: HashMap<String, bool>,
}

impl AcceptedState {
    pub fn for_rows(rows: &[PreviewRow]) -> Self {
        AcceptedState {
            accepted: rows
                .iter()
                .map(|row| (row.full_filename.clone(), false))
                .collect(),
        }
    }

    pub fn is_accepted(&self, full_filename: &str) -> bool {
        self.accepted.get(full_filename).copied().unwrap_or(false)
    }

    pub fn set(&mut self, full_filename: &str, accepted: bool) {
        self.accepted.insert(full_filename.to_string(), accepted);
    }

    /*
     * Flips a known row and returns its new flag; unknown rows are ignored.
     */
    pub fn toggle(&mut self, full_filename: &str) -> Option<bool> {
        let flag = self.accepted.get_mut(full_filename)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn set_all(&mut self, accepted: bool) {
        for flag in self.accepted.values_mut() {
            *flag = accepted;
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.values().filter(|flag| **flag).count()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/*
 * Collects the commit requests for every accepted row that corresponds to a
 * proposal. Intermediate directory rows have no proposal of their own and
 * produce nothing. Destinations are compared after normalizing separators.
 */
pub fn select_accepted(
    rows: &[PreviewRow],
    accepted: &AcceptedState,
    changes: &[ProposedChange],
    base_path: &Path,
) -> Vec<CommitRequest> {
    let base_path = base_path.to_string_lossy().into_owned();
    rows.iter()
        .filter(|row| accepted.is_accepted(&row.full_filename))
        .filter_map(|row| {
            let destination = row.destination()?;
            changes
                .iter()
                .find(|change| normalized_destination(&change.dst_path) == destination)
        })
        .map(|change| CommitRequest {
            base_path: base_path.clone(),
            src_path: change.src_path.clone(),
            dst_path: change.dst_path.clone(),
        })
        .collect()
}

fn normalized_destination(dst_path: &str) -> String {
    split_destination(dst_path).join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(src: &str, dst: &str) -> ProposedChange {
        ProposedChange {
            src_path: src.to_string(),
            dst_path: dst.to_string(),
            summary: String::new(),
        }
    }

    fn sample_changes() -> Vec<ProposedChange> {
        vec![
            change("one.txt", "a/b.txt"),
            change("two.txt", "a/c.txt"),
            change("three.txt", "d.txt"),
        ]
    }

    #[test]
    fn test_preview_rows_are_pre_order_with_depths() {
        let rows = preview_rows(&sample_changes());

        let names: Vec<&str> = rows.iter().map(|r| r.full_filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["/root/a", "/root/a/b.txt", "/root/a/c.txt", "/root/d.txt"]
        );
        let depths: Vec<isize> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 0]);
        let leaves: Vec<bool> = rows.iter().map(|r| r.is_leaf).collect();
        assert_eq!(leaves, vec![false, true, true, true]);
    }

    #[test]
    fn test_flatten_emits_synthetic_root_first() {
        let rows = flatten(&build_tree(&sample_changes()));
        assert_eq!(rows[0].full_filename, "/root");
        assert_eq!(rows[0].depth, -1);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_build_tree_shares_repeated_prefixes_in_first_seen_order() {
        let changes = vec![
            change("1", "x/y/1.txt"),
            change("2", "a.txt"),
            change("3", "x/z.txt"),
            change("4", "x/y/2.txt"),
        ];
        let tree = build_tree(&changes);

        assert_eq!(tree.name, "root");
        let top: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(top, vec!["x", "a.txt"]);
        let under_x: Vec<&str> = tree.children[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(under_x, vec!["y", "z.txt"]);
        assert_eq!(tree.children[0].children[0].children.len(), 2);
    }

    #[test]
    fn test_preview_rows_are_reproducible() {
        let changes = sample_changes();
        assert_eq!(preview_rows(&changes), preview_rows(&changes));
    }

    #[test]
    fn test_accepted_state_defaults_to_false() {
        let rows = preview_rows(&sample_changes());
        let accepted = AcceptedState::for_rows(&rows);
        assert!(rows.iter().all(|r| !accepted.is_accepted(&r.full_filename)));
        assert_eq!(accepted.accepted_count(), 0);
    }

    #[test]
    fn test_accepted_state_toggle_and_set_all() {
        let rows = preview_rows(&sample_changes());
        let mut accepted = AcceptedState::for_rows(&rows);

        assert_eq!(accepted.toggle("/root/d.txt"), Some(true));
        assert_eq!(accepted.toggle("/root/unknown"), None);
        assert_eq!(accepted.accepted_count(), 1);

        accepted.set_all(true);
        assert_eq!(accepted.accepted_count(), 4);
        accepted.set_all(false);
        assert_eq!(accepted.accepted_count(), 0);
    }

    #[test]
    fn test_select_accepted_skips_directory_rows() {
        let changes = sample_changes();
        let rows = preview_rows(&changes);
        let mut accepted = AcceptedState::for_rows(&rows);
        accepted.set("/root/a", true);
        accepted.set("/root/a/c.txt", true);

        let selected = select_accepted(&rows, &accepted, &changes, Path::new("/home/me/inbox"));

        assert_eq!(
            selected,
            vec![CommitRequest {
                base_path: "/home/me/inbox".to_string(),
                src_path: "two.txt".to_string(),
                dst_path: "a/c.txt".to_string(),
            }]
        );
    }

    #[test]
    fn test_select_accepted_matches_backslash_destinations() {
        let changes = vec![change("scan.pdf", "docs\\2024\\scan.pdf")];
        let rows = preview_rows(&changes);
        let mut accepted = AcceptedState::for_rows(&rows);
        accepted.set("/root/docs/2024/scan.pdf", true);

        let selected = select_accepted(&rows, &accepted, &changes, Path::new("/base"));

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].dst_path, "docs\\2024\\scan.pdf");
    }

    #[test]
    fn test_select_accepted_nothing_accepted() {
        let changes = sample_changes();
        let rows = preview_rows(&changes);
        let accepted = AcceptedState::for_rows(&rows);
        assert!(select_accepted(&rows, &accepted, &changes, Path::new("/b")).is_empty());
    }

    #[test]
    fn test_proposed_change_accepts_legacy_field_names() {
        let json = r#"[
            {"file_path": "0.jpg", "new_path": "monochrome/images/2D World Building.jpg", "summary": "A building"},
            {"src_path": "1.txt", "dst_path": "notes/1.txt"}
        ]"#;
        let changes: Vec<ProposedChange> = serde_json::from_str(json).unwrap();
        assert_eq!(changes[0].src_path, "0.jpg");
        assert_eq!(changes[0].dst_path, "monochrome/images/2D World Building.jpg");
        assert_eq!(changes[0].summary, "A building");
        assert_eq!(changes[1].summary, "");
    }
}
