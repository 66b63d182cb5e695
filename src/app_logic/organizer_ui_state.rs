/*
 * This module defines the OrganizerUiState struct, which holds the per-session
 * state of the organizer window that is not persisted: the proposals returned
 * by the last classification, the rows of the preview pane and which of them
 * the user accepted, whether a classification is in flight, the selected file,
 * and the mapping from rendered tree rows back to paths.
 */
use crate::core::{AcceptedState, FileNode, PreviewRow, ProposedChange, format_modified, format_size};
use crate::platform_layer::{PreviewRowDescriptor, TreeItemId, TreeRowDescriptor};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct OrganizerUiState {
    /* True while a classification request is outstanding. */
    pub loading: bool,
    /* The proposals from the last successful classification, as received. */
    pub proposed_changes: Vec<ProposedChange>,
    /* Pre-ordered preview rows derived from `proposed_changes`. */
    pub preview_rows: Vec<PreviewRow>,
    pub accepted_state: AcceptedState,
    pub selected_file: Option<PathBuf>,
    /* Maps the rows of the last rendered tree to the paths they show. */
    tree_item_paths: HashMap<TreeItemId, PathBuf>,
    next_tree_item_id_counter: u64,
}

impl OrganizerUiState {
    pub fn new() -> Self {
        log::debug!("OrganizerUiState::new called");
        OrganizerUiState {
            next_tree_item_id_counter: 1,
            ..Default::default()
        }
    }

    pub fn set_proposals(&mut self, changes: Vec<ProposedChange>) {
        self.preview_rows = crate::core::preview_rows(&changes);
        self.accepted_state = AcceptedState::for_rows(&self.preview_rows);
        self.proposed_changes = changes;
    }

    pub fn clear_proposals(&mut self) {
        self.proposed_changes.clear();
        self.preview_rows.clear();
        self.accepted_state = AcceptedState::default();
    }

    pub fn has_proposals(&self) -> bool {
        !self.preview_rows.is_empty()
    }

    /*
     * Assigns fresh ids to the given visible rows, replacing the previous
     * mapping, and returns their descriptors.
     */
    pub fn assign_tree_items(&mut self, rows: &[&FileNode]) -> Vec<TreeRowDescriptor> {
        self.tree_item_paths.clear();
        rows.iter()
            .map(|node| {
                let id = TreeItemId(self.next_tree_item_id_counter);
                self.next_tree_item_id_counter += 1;
                self.tree_item_paths.insert(id, node.path.clone());
                TreeRowDescriptor {
                    id,
                    text: node.name.clone(),
                    depth: node.depth,
                    is_folder: node.is_dir,
                    expanded: node.expanded,
                    size: if node.is_dir {
                        String::new()
                    } else {
                        format_size(node.size_bytes)
                    },
                    modified: format_modified(node.modified),
                }
            })
            .collect()
    }

    pub fn path_for_tree_item(&self, item_id: TreeItemId) -> Option<&PathBuf> {
        self.tree_item_paths.get(&item_id)
    }

    pub fn preview_descriptors(&self) -> Vec<PreviewRowDescriptor> {
        self.preview_rows
            .iter()
            .enumerate()
            .map(|(index, row)| PreviewRowDescriptor {
                index,
                text: row.name.clone(),
                depth: row.depth.max(0) as usize,
                is_leaf: row.is_leaf,
                accepted: self.accepted_state.is_accepted(&row.full_filename),
            })
            .collect()
    }

    /*
     * Composes the tree pane title from the folder being organized.
     */
    pub fn compose_title(file_path: &str) -> String {
        if file_path.is_empty() {
            "File Organizer - [No Folder Open]".to_string()
        } else {
            format!("File Organizer - [{file_path}]")
        }
    }
}
