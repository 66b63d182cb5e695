/*
 * This module consolidates the core, platform-agnostic logic of the organizer.
 * It re-exports the folder tree model and its synchronization operations, the
 * proposal preview model, and the service abstractions the presenter depends
 * on (`FolderListerOperations`, `SettingsManagerOperations`,
 * `ClassificationServiceOperations`) together with their concrete
 * implementations.
 */
pub mod classifier;
pub mod file_node;
pub mod file_system;
pub mod folder_tree;
pub mod path_segments;
pub mod path_utils;
pub mod proposal_tree;
pub mod settings;

// Re-export key structures
pub use file_node::{FileNode, FolderEntry, sort_nodes};

// Re-export folder tree operations
pub use folder_tree::{
    FolderTreeError, find_node, patch_subtree, toggle_expanded, toggle_expanded_at, visible_rows,
};

// Re-export proposal preview items
pub use proposal_tree::{
    AcceptedState, CommitRequest, PreviewRow, ProposedChange, preview_rows, select_accepted,
};

// Re-export file system related items
pub use file_system::{
    CoreFolderLister, FileSystemError, FolderListerOperations, format_modified, format_size,
};

// Re-export settings related items
pub use settings::{
    CoreSettingsManager, ProcessAction, Settings, SettingsError, SettingsManagerOperations,
};

// Re-export classification service items
pub use classifier::{
    BatchRequest, ClassificationServiceOperations, CommitReport, HttpClassificationService,
    ServiceError,
};
