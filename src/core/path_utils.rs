/*
 * Resolves the per-user directory where the organizer keeps its settings and
 * log file. The location is platform specific (e.g. `~/.config/<app>` on
 * Linux, `AppData/Local/<app>/config` on Windows) and is created on demand.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Returns the application's local configuration directory, creating it if it
 * does not exist yet. `None` means no home directory could be determined or
 * the directory could not be created; the failure is logged.
 */
pub fn app_config_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving config dir for '{app_name}'");
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if !config_path.exists() {
        if let Err(e) = fs::create_dir_all(config_path) {
            log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory {config_path:?}");
    }
    Some(config_path.to_path_buf())
}
