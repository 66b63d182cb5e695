/*
 * The organizer's persistent settings: which folder is being organized, which
 * model and instruction to send to the classification service, the naming
 * formats offered for renamed files, and so on. `Settings` is a plain value
 * that the presenter owns and passes around explicitly; reading and writing it
 * happens only through `SettingsManagerOperations`, whose concrete
 * implementation (`CoreSettingsManager`) stores JSON in the per-user config
 * directory.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_TEMP_FILENAME: &str = "settings.json.tmp";

pub const MAX_TREE_DEPTH_LIMIT: u32 = 10;
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/*
 * What the service should do with classified files. Stored and sent on the
 * wire as an integer: 0 = move, 1 = duplicate.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProcessAction {
    Move,
    Duplicate,
}

impl From<ProcessAction> for u8 {
    fn from(action: ProcessAction) -> Self {
        match action {
            ProcessAction::Move => 0,
            ProcessAction::Duplicate => 1,
        }
    }
}

impl TryFrom<u8> for ProcessAction {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ProcessAction::Move),
            1 => Ok(ProcessAction::Duplicate),
            other => Err(format!("unknown process action {other}")),
        }
    }
}

impl std::fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessAction::Move => write!(f, "move"),
            ProcessAction::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub file_formats: Vec<String>,
    pub file_format_index: usize,
    pub groq_api_key: String,
    pub instruction: String,
    pub max_tree_depth: u32,
    pub process_action: ProcessAction,
    pub file_path: String,
    pub file_path_valid: bool,
    pub file_duplicate_path: String,
    pub service_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: "llama3".to_string(),
            file_formats: vec![
                "{Y}-{M}-{D}_{CONTENT}.{EXT}".to_string(),
                "{CONTENT}_{Y}-{M}-{D}.{EXT}".to_string(),
            ],
            file_format_index: 0,
            groq_api_key: String::new(),
            instruction: String::new(),
            max_tree_depth: 3,
            process_action: ProcessAction::Duplicate,
            file_path: String::new(),
            file_path_valid: false,
            file_duplicate_path: String::new(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn current_file_format(&self) -> Option<&str> {
        self.file_formats
            .get(self.file_format_index)
            .map(String::as_str)
    }

    /*
     * Appends a naming format. Blank formats are refused.
     */
    pub fn add_file_format(&mut self, format: &str) -> bool {
        let format = format.trim();
        if format.is_empty() {
            return false;
        }
        self.file_formats.push(format.to_string());
        true
    }

    /*
     * Removes the format at `index`. When the selected index falls off the end
     * it moves to the new last format. The last remaining format cannot be
     * removed, since a batch request always needs one.
     */
    pub fn remove_file_format(&mut self, index: usize) -> bool {
        if index >= self.file_formats.len() || self.file_formats.len() == 1 {
            return false;
        }
        self.file_formats.remove(index);
        if self.file_format_index >= self.file_formats.len() {
            self.file_format_index = self.file_formats.len() - 1;
        }
        true
    }

    pub fn select_file_format(&mut self, index: usize) -> bool {
        if index >= self.file_formats.len() {
            return false;
        }
        self.file_format_index = index;
        true
    }

    /*
     * Moves the maximum tree depth by `delta`, clamped to 0..=10, and returns
     * the new value.
     */
    pub fn adjust_max_tree_depth(&mut self, delta: i32) -> u32 {
        let adjusted = (self.max_tree_depth as i64 + delta as i64)
            .clamp(0, MAX_TREE_DEPTH_LIMIT as i64);
        self.max_tree_depth = adjusted as u32;
        self.max_tree_depth
    }

    pub fn working_directory(&self) -> PathBuf {
        PathBuf::from(&self.file_path)
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Serde(err)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Settings I/O error: {e}"),
            SettingsError::Serde(e) => write!(f, "Settings file is malformed: {e}"),
            SettingsError::NoConfigDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

pub trait SettingsManagerOperations: Send + Sync {
    fn load_settings(&self) -> Result<Settings>;
    fn save_settings(&self, settings: &Settings) -> Result<()>;
}

pub struct CoreSettingsManager {
    app_name: String,
    config_dir_override: Option<PathBuf>,
}

impl CoreSettingsManager {
    pub fn new(app_name: &str) -> Self {
        CoreSettingsManager {
            app_name: app_name.to_string(),
            config_dir_override: None,
        }
    }

    /*
     * A manager that reads and writes inside `config_dir` instead of the
     * per-user directory.
     */
    pub fn with_config_dir(app_name: &str, config_dir: &Path) -> Self {
        CoreSettingsManager {
            app_name: app_name.to_string(),
            config_dir_override: Some(config_dir.to_path_buf()),
        }
    }

    fn config_dir(&self) -> Result<PathBuf> {
        match &self.config_dir_override {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => path_utils::app_config_dir(&self.app_name).ok_or(SettingsError::NoConfigDirectory),
        }
    }
}

impl SettingsManagerOperations for CoreSettingsManager {
    /*
     * Reads `settings.json`. A missing file is not an error and yields the
     * defaults; fields absent from an older file take their default values.
     */
    fn load_settings(&self) -> Result<Settings> {
        let file_path = self.config_dir()?.join(SETTINGS_FILENAME);
        if !file_path.exists() {
            log::debug!("CoreSettingsManager: {file_path:?} does not exist, using defaults.");
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(&file_path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        log::debug!("CoreSettingsManager: Loaded settings from {file_path:?}.");
        Ok(settings)
    }

    /*
     * Writes through a temporary file and a rename so an interrupted save
     * never leaves a truncated settings file behind.
     */
    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let config_dir = self.config_dir()?;
        let file_path = config_dir.join(SETTINGS_FILENAME);
        let temp_path = config_dir.join(SETTINGS_TEMP_FILENAME);

        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &file_path)?;
        log::trace!("CoreSettingsManager: Saved settings to {file_path:?}.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_first_run_values() {
        let settings = Settings::default();
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.file_formats.len(), 2);
        assert_eq!(settings.current_file_format(), Some("{Y}-{M}-{D}_{CONTENT}.{EXT}"));
        assert_eq!(settings.max_tree_depth, 3);
        assert_eq!(settings.process_action, ProcessAction::Duplicate);
        assert!(!settings.file_path_valid);
        assert_eq!(settings.service_url, DEFAULT_SERVICE_URL);
    }

    #[test]
    fn test_adjust_max_tree_depth_clamps() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust_max_tree_depth(1), 4);
        assert_eq!(settings.adjust_max_tree_depth(100), 10);
        assert_eq!(settings.adjust_max_tree_depth(-3), 7);
        assert_eq!(settings.adjust_max_tree_depth(-20), 0);
    }

    #[test]
    fn test_remove_file_format_clamps_selected_index() {
        let mut settings = Settings::default();
        assert!(settings.add_file_format("{CONTENT}.{EXT}"));
        assert!(settings.select_file_format(2));

        assert!(settings.remove_file_format(2));
        assert_eq!(settings.file_formats.len(), 2);
        assert_eq!(settings.file_format_index, 1);

        assert!(settings.remove_file_format(0));
        assert_eq!(settings.file_format_index, 0);
        assert_eq!(settings.current_file_format(), Some("{CONTENT}_{Y}-{M}-{D}.{EXT}"));

        // The last format stays.
        assert!(!settings.remove_file_format(0));
        assert!(!settings.remove_file_format(7));
    }

    #[test]
    fn test_add_and_select_file_format_validation() {
        let mut settings = Settings::default();
        assert!(!settings.add_file_format("   "));
        assert!(!settings.select_file_format(5));
        assert_eq!(settings.file_format_index, 0);
    }

    #[test]
    fn test_process_action_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ProcessAction::Move).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ProcessAction::Duplicate).unwrap(), "1");
        let parsed: ProcessAction = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, ProcessAction::Move);
        assert!(serde_json::from_str::<ProcessAction>("2").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let manager = CoreSettingsManager::with_config_dir("AnyApp", dir.path());

        let mut settings = Settings::default();
        settings.model = "mixtral".to_string();
        settings.file_path = "/home/me/inbox".to_string();
        settings.file_path_valid = true;
        settings.process_action = ProcessAction::Move;
        manager.save_settings(&settings).unwrap();

        let loaded = manager.load_settings().unwrap();
        assert_eq!(loaded, settings);
        assert!(!dir.path().join(SETTINGS_TEMP_FILENAME).exists());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = CoreSettingsManager::with_config_dir("AnyApp", dir.path());
        assert_eq!(manager.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"model": "gemma", "max_tree_depth": 5}"#,
        )
        .unwrap();
        let manager = CoreSettingsManager::with_config_dir("AnyApp", dir.path());

        let loaded = manager.load_settings().unwrap();
        assert_eq!(loaded.model, "gemma");
        assert_eq!(loaded.max_tree_depth, 5);
        assert_eq!(loaded.file_formats, Settings::default().file_formats);
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), "{not json").unwrap();
        let manager = CoreSettingsManager::with_config_dir("AnyApp", dir.path());
        assert!(matches!(manager.load_settings(), Err(SettingsError::Serde(_))));
    }
}
