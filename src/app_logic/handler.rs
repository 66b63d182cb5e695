use crate::app_logic::OrganizerUiState;
use crate::core::{
    BatchRequest, ClassificationServiceOperations, CommitReport, FileNode, FileSystemError,
    FolderListerOperations, ProposedChange, ServiceError, Settings, SettingsManagerOperations,
    find_node, format_modified, format_size, patch_subtree, select_accepted, sort_nodes,
    toggle_expanded_at, visible_rows,
};
use crate::platform_layer::{
    AppEvent, FileDetails, MessageSeverity, PlatformCommand, PlatformEventHandler, SettingsEdit,
    TreeItemId,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

type ClassificationResult = Result<Vec<ProposedChange>, ServiceError>;

/*
 * A classification in flight, tagged with the folder it was issued for.
 */
struct ClassificationJob {
    folder: String,
    receiver: Receiver<ClassificationResult>,
}

/*
 * Manages the organizer's state and UI logic in a platform-agnostic manner.
 * It processes UI events received from the platform layer and enqueues
 * commands to update the UI. The folder listing, the settings store and the
 * classification service are reached through their `*Operations` traits so
 * they can be replaced in tests.
 *
 * Classification runs on a worker thread. Its result is picked up when the
 * platform layer sends `AppEvent::Idle`; while it is outstanding the logic is
 * in the loading state and refuses to start another one.
 */
pub struct OrganizerLogic {
    pub(crate) settings: Settings,
    pub(crate) folder_contents: Vec<FileNode>,
    pub(crate) ui_state: OrganizerUiState,
    classification_job: Option<ClassificationJob>,
    settings_manager: Arc<dyn SettingsManagerOperations>,
    folder_lister: Arc<dyn FolderListerOperations>,
    classifier: Arc<dyn ClassificationServiceOperations>,
    command_queue: VecDeque<PlatformCommand>,
}

impl OrganizerLogic {
    pub fn new(
        settings: Settings,
        settings_manager: Arc<dyn SettingsManagerOperations>,
        folder_lister: Arc<dyn FolderListerOperations>,
        classifier: Arc<dyn ClassificationServiceOperations>,
    ) -> Self {
        OrganizerLogic {
            settings,
            folder_contents: Vec::new(),
            ui_state: OrganizerUiState::new(),
            classification_job: None,
            settings_manager,
            folder_lister,
            classifier,
            command_queue: VecDeque::new(),
        }
    }

    fn enqueue_command(&mut self, command: PlatformCommand) {
        self.command_queue.push_back(command);
    }

    fn update_status(&mut self, text: impl Into<String>, severity: MessageSeverity) {
        let text = text.into();
        match severity {
            MessageSeverity::Error => log::error!("AppLogic: {text}"),
            MessageSeverity::Warning => log::warn!("AppLogic: {text}"),
            MessageSeverity::Information => log::info!("AppLogic: {text}"),
        }
        self.enqueue_command(PlatformCommand::UpdateStatus { text, severity });
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings_manager.save_settings(&self.settings) {
            self.update_status(
                format!("Could not save settings: {e}"),
                MessageSeverity::Warning,
            );
        }
    }

    /*
     * Lists `dir` and turns its entries into sorted nodes at `depth`.
     */
    fn fetch_children(&self, dir: &Path, depth: usize) -> Result<Vec<FileNode>, FileSystemError> {
        let entries = self.folder_lister.list_folder(dir)?;
        let mut nodes: Vec<FileNode> = entries
            .into_iter()
            .map(|entry| FileNode::from_entry(entry, dir, depth))
            .collect();
        sort_nodes(&mut nodes);
        Ok(nodes)
    }

    fn render_folder_tree(&mut self) {
        let rows = visible_rows(&self.folder_contents);
        let rows = self.ui_state.assign_tree_items(&rows);
        let title = OrganizerUiState::compose_title(&self.settings.file_path);
        self.enqueue_command(PlatformCommand::RenderFolderTree { title, rows });
    }

    fn render_preview(&mut self) {
        let rows = self.ui_state.preview_descriptors();
        let accepted_count = self.ui_state.accepted_state.accepted_count();
        self.enqueue_command(PlatformCommand::RenderPreview {
            rows,
            accepted_count,
        });
    }

    fn render_settings(&mut self) {
        let entries = settings_entries(&self.settings);
        self.enqueue_command(PlatformCommand::ShowSettings { entries });
    }

    /*
     * Opens `path` as the folder to organize. Relative paths are resolved
     * against the current directory first. The listing becomes the whole
     * tree; on failure the previous tree and settings are kept. Switching to
     * a different folder abandons a running classification.
     */
    fn open_folder(&mut self, path: PathBuf) -> bool {
        let path = match std::path::absolute(&path) {
            Ok(path) => path,
            Err(e) => {
                self.update_status(
                    format!("Could not resolve folder {}: {e}", path.display()),
                    MessageSeverity::Error,
                );
                return false;
            }
        };
        let children = match self.fetch_children(&path, 0) {
            Ok(children) => children,
            Err(e) => {
                self.update_status(
                    format!("Could not read folder {}: {e}", path.display()),
                    MessageSeverity::Error,
                );
                return false;
            }
        };
        if let Err(e) = patch_subtree(&mut self.folder_contents, &path, &path, children, 0) {
            self.update_status(format!("Could not update the folder view: {e}"), MessageSeverity::Error);
            return false;
        }
        let file_path = path.to_string_lossy().into_owned();
        if file_path != self.settings.file_path {
            self.abandon_classification();
        }
        self.settings.file_path = file_path;
        self.settings.file_path_valid = true;
        self.ui_state.selected_file = None;
        self.persist_settings();
        self.render_folder_tree();
        true
    }

    fn on_main_window_setup_complete(&mut self) {
        log::debug!("AppLogic: UI setup complete, restoring last session.");
        self.render_settings();
        if self.settings.file_path.is_empty() {
            self.render_folder_tree();
            self.update_status("Open a folder to get started.", MessageSeverity::Information);
            return;
        }
        let path = self.settings.working_directory();
        if self.open_folder(path) {
            let text = format!("Opened {}.", self.settings.file_path);
            self.update_status(text, MessageSeverity::Information);
        } else {
            self.settings.file_path_valid = false;
            self.persist_settings();
            self.render_folder_tree();
        }
    }

    fn on_folder_picker_completed(&mut self, path: Option<PathBuf>) {
        let Some(path) = path else {
            log::debug!("AppLogic: Folder picker cancelled.");
            return;
        };
        if self.open_folder(path) {
            self.ui_state.clear_proposals();
            self.render_preview();
            let text = format!("Opened {}.", self.settings.file_path);
            self.update_status(text, MessageSeverity::Information);
        }
    }

    fn on_refresh_requested(&mut self) {
        if self.settings.file_path.is_empty() {
            self.update_status("No folder is open.", MessageSeverity::Warning);
            return;
        }
        let path = self.settings.working_directory();
        if self.open_folder(path) {
            self.update_status("Folder refreshed.", MessageSeverity::Information);
        }
    }

    /*
     * A click on a collapsed directory lists it, grafts the listing below it
     * and expands it. A click on an expanded directory only collapses it. A
     * click on a file selects it and shows its details.
     */
    fn on_tree_item_clicked(&mut self, item_id: TreeItemId) {
        let Some(path) = self.ui_state.path_for_tree_item(item_id).cloned() else {
            log::warn!("AppLogic: Click on unknown tree item {item_id:?}.");
            return;
        };
        let working_dir = self.settings.working_directory();
        let Some(node) = find_node(&self.folder_contents, &path, &working_dir) else {
            log::warn!("AppLogic: Tree item {item_id:?} refers to {path:?}, which is no longer in the tree.");
            return;
        };

        if !node.is_dir() {
            let details = FileDetails {
                name: node.name.clone(),
                path: node.path.clone(),
                size: format_size(node.size_bytes),
                modified: format_modified(node.modified),
            };
            self.ui_state.selected_file = Some(path);
            self.enqueue_command(PlatformCommand::ShowFileDetails(details));
            return;
        }

        if !node.expanded {
            let child_depth = node.depth + 1;
            let children = match self.fetch_children(&path, child_depth) {
                Ok(children) => children,
                Err(e) => {
                    self.update_status(
                        format!("Could not read folder {}: {e}", path.display()),
                        MessageSeverity::Error,
                    );
                    return;
                }
            };
            if let Err(e) = patch_subtree(
                &mut self.folder_contents,
                &path,
                &working_dir,
                children,
                child_depth,
            ) {
                self.update_status(format!("Could not update the folder view: {e}"), MessageSeverity::Error);
                return;
            }
        }

        if let Err(e) = toggle_expanded_at(&mut self.folder_contents, &path, &working_dir) {
            self.update_status(format!("Could not update the folder view: {e}"), MessageSeverity::Error);
            return;
        }
        self.render_folder_tree();
    }

    fn on_settings_edited(&mut self, edit: SettingsEdit) {
        let applied = match edit {
            SettingsEdit::Model(model) => {
                self.settings.model = model;
                true
            }
            SettingsEdit::Instruction(instruction) => {
                self.settings.instruction = instruction;
                true
            }
            SettingsEdit::GroqApiKey(key) => {
                self.settings.groq_api_key = key;
                true
            }
            SettingsEdit::AddFileFormat(format) => self.settings.add_file_format(&format),
            SettingsEdit::RemoveFileFormat(index) => self.settings.remove_file_format(index),
            SettingsEdit::SelectFileFormat(index) => self.settings.select_file_format(index),
            SettingsEdit::AdjustMaxTreeDepth(delta) => {
                self.settings.adjust_max_tree_depth(delta);
                true
            }
            SettingsEdit::ProcessAction(action) => {
                self.settings.process_action = action;
                true
            }
            SettingsEdit::DuplicatePath(path) => {
                self.settings.file_duplicate_path = path;
                true
            }
        };

        if !applied {
            self.update_status("That settings change is not allowed.", MessageSeverity::Warning);
            return;
        }
        self.persist_settings();
        self.render_settings();
    }

    fn on_organize_requested(&mut self, instruction: Option<String>) {
        if self.ui_state.loading {
            self.update_status(
                "A classification is already running.",
                MessageSeverity::Warning,
            );
            return;
        }
        if let Some(instruction) = instruction {
            self.settings.instruction = instruction;
            self.persist_settings();
        }
        if !self.settings.file_path_valid {
            self.update_status("Open a folder before organizing.", MessageSeverity::Warning);
            return;
        }

        let request = BatchRequest::from_settings(&self.settings);
        let classifier = Arc::clone(&self.classifier);
        let (sender, receiver) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("classification".to_string())
            .spawn(move || {
                let result = classifier.classify(&request);
                if sender.send(result).is_err() {
                    log::debug!("AppLogic: Classification finished after its receiver was dropped.");
                }
            });
        if let Err(e) = spawned {
            self.update_status(
                format!("Could not start classification: {e}"),
                MessageSeverity::Error,
            );
            return;
        }

        self.classification_job = Some(ClassificationJob {
            folder: self.settings.file_path.clone(),
            receiver,
        });
        self.ui_state.loading = true;
        self.enqueue_command(PlatformCommand::SetLoading { loading: true });
        let text = format!("Classifying {} with {}...", self.settings.file_path, self.settings.model);
        self.update_status(text, MessageSeverity::Information);
    }

    fn poll_classification(&mut self) {
        let Some(job) = &self.classification_job else {
            return;
        };
        let issued_for = job.folder.clone();
        let result = match job.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.finish_loading();
                self.update_status(
                    "The classification worker stopped without a result.",
                    MessageSeverity::Error,
                );
                return;
            }
        };

        self.finish_loading();
        if issued_for != self.settings.file_path {
            log::info!("AppLogic: Ignoring classification result for {issued_for}, now browsing {}.", self.settings.file_path);
            return;
        }
        match result {
            Ok(changes) if changes.is_empty() => {
                self.ui_state.clear_proposals();
                self.render_preview();
                self.update_status("The service proposed no changes.", MessageSeverity::Information);
            }
            Ok(changes) => {
                let count = changes.len();
                self.ui_state.set_proposals(changes);
                self.render_preview();
                self.update_status(
                    format!("Received {count} proposed changes."),
                    MessageSeverity::Information,
                );
            }
            Err(e) => {
                self.update_status(format!("Classification failed: {e}"), MessageSeverity::Error);
            }
        }
    }

    /*
     * Drops the running classification, if any. The worker still finishes,
     * but nobody receives its result.
     */
    fn abandon_classification(&mut self) {
        if let Some(job) = &self.classification_job {
            log::info!("AppLogic: Abandoning classification of {}.", job.folder);
            self.finish_loading();
            self.update_status("The running classification was cancelled.", MessageSeverity::Warning);
        }
    }

    fn finish_loading(&mut self) {
        self.classification_job = None;
        self.ui_state.loading = false;
        self.enqueue_command(PlatformCommand::SetLoading { loading: false });
    }

    fn on_preview_row_toggled(&mut self, index: usize) {
        let Some(row) = self.ui_state.preview_rows.get(index) else {
            log::warn!("AppLogic: Toggle of unknown preview row {index}.");
            return;
        };
        let full_filename = row.full_filename.clone();
        if self.ui_state.accepted_state.toggle(&full_filename).is_some() {
            self.render_preview();
        }
    }

    fn on_accept_all_changed(&mut self, accepted: bool) {
        if !self.ui_state.has_proposals() {
            self.update_status("There are no proposals to accept.", MessageSeverity::Warning);
            return;
        }
        self.ui_state.accepted_state.set_all(accepted);
        self.render_preview();
    }

    fn on_confirm_changes_requested(&mut self) {
        if self.ui_state.loading {
            self.update_status(
                "Wait for the running classification to finish.",
                MessageSeverity::Warning,
            );
            return;
        }
        let working_dir = self.settings.working_directory();
        let requests = select_accepted(
            &self.ui_state.preview_rows,
            &self.ui_state.accepted_state,
            &self.ui_state.proposed_changes,
            &working_dir,
        );
        if requests.is_empty() {
            self.update_status("No accepted changes to apply.", MessageSeverity::Warning);
            return;
        }

        log::info!("AppLogic: Committing {} accepted changes.", requests.len());
        let report = self.classifier.commit_all(&requests);
        self.ui_state.clear_proposals();
        self.render_preview();
        self.open_folder(working_dir);

        let (text, severity) = commit_summary(&report);
        self.update_status(text, severity);
    }

    fn on_discard_changes_requested(&mut self) {
        self.ui_state.clear_proposals();
        self.render_preview();
        self.update_status("Proposals discarded.", MessageSeverity::Information);
    }

    fn on_window_close_requested(&mut self) {
        self.persist_settings();
        self.enqueue_command(PlatformCommand::QuitApplication);
    }
}

/*
 * Settings as label/value pairs for display. The API key is masked.
 */
pub(crate) fn settings_entries(settings: &Settings) -> Vec<(String, String)> {
    let formats = settings
        .file_formats
        .iter()
        .enumerate()
        .map(|(i, format)| {
            let marker = if i == settings.file_format_index { "*" } else { " " };
            format!("{marker}{i}: {format}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    let api_key = if settings.groq_api_key.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    };
    vec![
        ("Folder".to_string(), settings.file_path.clone()),
        ("Model".to_string(), settings.model.clone()),
        ("Instruction".to_string(), settings.instruction.clone()),
        ("File formats".to_string(), formats),
        ("Max tree depth".to_string(), settings.max_tree_depth.to_string()),
        ("Process action".to_string(), settings.process_action.to_string()),
        ("Duplicate folder".to_string(), settings.file_duplicate_path.clone()),
        ("Groq API key".to_string(), api_key),
        ("Service URL".to_string(), settings.service_url.clone()),
    ]
}

pub(crate) fn commit_summary(report: &CommitReport) -> (String, MessageSeverity) {
    let succeeded = report.succeeded();
    let failed = report.failed();
    if failed == 0 {
        return (
            format!("{succeeded} succeeded, 0 failed."),
            MessageSeverity::Information,
        );
    }
    let first_error = report
        .failures()
        .next()
        .and_then(|outcome| outcome.result.as_ref().err())
        .map(|e| format!(" First error: {e}"))
        .unwrap_or_default();
    (
        format!("{succeeded} succeeded, {failed} failed.{first_error}"),
        MessageSeverity::Warning,
    )
}

impl PlatformEventHandler for OrganizerLogic {
    fn handle_event(&mut self, event: AppEvent) {
        if !matches!(event, AppEvent::Idle) {
            log::debug!("AppLogic: Handling {event:?}");
        }
        match event {
            AppEvent::MainWindowUISetupComplete => self.on_main_window_setup_complete(),
            AppEvent::WindowCloseRequestedByUser => self.on_window_close_requested(),
            AppEvent::FolderPickerDialogCompleted { path } => self.on_folder_picker_completed(path),
            AppEvent::TreeItemClicked { item_id } => self.on_tree_item_clicked(item_id),
            AppEvent::RefreshRequested => self.on_refresh_requested(),
            AppEvent::SettingsEdited(edit) => self.on_settings_edited(edit),
            AppEvent::SettingsRequested => self.render_settings(),
            AppEvent::OrganizeRequested { instruction } => self.on_organize_requested(instruction),
            AppEvent::PreviewRowToggled { index } => self.on_preview_row_toggled(index),
            AppEvent::AcceptAllChanged { accepted } => self.on_accept_all_changed(accepted),
            AppEvent::ConfirmChangesRequested => self.on_confirm_changes_requested(),
            AppEvent::DiscardChangesRequested => self.on_discard_changes_requested(),
            AppEvent::Idle => self.poll_classification(),
        }
    }

    fn on_quit(&mut self) {
        log::debug!("AppLogic: on_quit called.");
        if self.classification_job.is_some() {
            log::info!("AppLogic: Quitting with a classification still running; its result is dropped.");
        }
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.command_queue.pop_front()
    }
}
