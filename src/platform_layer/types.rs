/*
 * This module defines the data types used for communication between the
 * application logic and the platform layer: identifiers for tree rows,
 * descriptors of what the folder and preview panes should show, the
 * platform-agnostic events the front end produces (`AppEvent`), the commands
 * the application logic sends back (`PlatformCommand`), and the
 * `PlatformEventHandler` trait the application logic implements.
 */

use crate::core::ProcessAction;
use std::path::PathBuf;

// An identifier for one row of the folder tree view.
//
// Generated by the application logic each time the tree is rendered; the
// front end hands it back when the user clicks that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeItemId(pub u64);

// Describes a single visible row of the folder tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRowDescriptor {
    pub id: TreeItemId,
    pub text: String,
    pub depth: usize,
    pub is_folder: bool,
    pub expanded: bool,
    pub size: String,
    pub modified: String,
}

// Describes a single row of the proposal preview pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRowDescriptor {
    pub index: usize,
    pub text: String,
    pub depth: usize,
    pub is_leaf: bool,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDetails {
    pub name: String,
    pub path: PathBuf,
    pub size: String,
    pub modified: String,
}

/*
 * A single change to the persistent settings made through the UI.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    Model(String),
    Instruction(String),
    GroqApiKey(String),
    AddFileFormat(String),
    RemoveFileFormat(usize),
    SelectFileFormat(usize),
    AdjustMaxTreeDepth(i32),
    ProcessAction(ProcessAction),
    DuplicatePath(String),
}

// --- Events from Platform to App Logic ---

/*
 * Represents platform-agnostic UI events. The platform layer translates user
 * input into these and hands them to the application logic. `Idle` is sent
 * periodically while nothing else happens so background work can be polled.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    // Signals that the front end is ready to render.
    MainWindowUISetupComplete,
    WindowCloseRequestedByUser,
    // Result of the folder picker; `None` means the user cancelled.
    FolderPickerDialogCompleted {
        path: Option<PathBuf>,
    },
    TreeItemClicked {
        item_id: TreeItemId,
    },
    RefreshRequested,
    SettingsEdited(SettingsEdit),
    SettingsRequested,
    OrganizeRequested {
        instruction: Option<String>,
    },
    PreviewRowToggled {
        index: usize,
    },
    AcceptAllChanged {
        accepted: bool,
    },
    ConfirmChangesRequested,
    DiscardChangesRequested,
    Idle,
}

// Defines the severity of a status message.
// Ordered from least to most severe for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

// Represents platform-agnostic commands sent from the application logic to the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    RenderFolderTree {
        title: String,
        rows: Vec<TreeRowDescriptor>,
    },
    RenderPreview {
        rows: Vec<PreviewRowDescriptor>,
        accepted_count: usize,
    },
    ShowFileDetails(FileDetails),
    ShowSettings {
        entries: Vec<(String, String)>,
    },
    SetLoading {
        loading: bool,
    },
    UpdateStatus {
        text: String,
        severity: MessageSeverity,
    },
    QuitApplication,
}

// --- Trait for App Logic to Handle Events ---

// A trait to be implemented by the application logic layer to handle UI events.
pub trait PlatformEventHandler: Send + 'static {
    // Handles one event and enqueues the resulting `PlatformCommand`s.
    fn handle_event(&mut self, event: AppEvent);

    // Called when the application is about to exit its main loop.
    fn on_quit(&mut self) {}

    // Attempts to dequeue a single `PlatformCommand` from the internal queue.
    // This is called by the platform layer's run loop.
    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
