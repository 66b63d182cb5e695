// src/main.rs

mod app_logic;
mod core;
mod platform_layer;

use crate::app_logic::OrganizerLogic;
use crate::core::classifier::DEFAULT_REQUEST_TIMEOUT;
use crate::core::{
    CoreFolderLister, CoreSettingsManager, HttpClassificationService, Settings,
    SettingsManagerOperations,
};
use crate::platform_layer::{ConsolePlatform, PlatformEventHandler};

use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

pub(crate) const APP_NAME: &str = "FileOrganizer";
const LOG_FILENAME: &str = "file_organizer.log";

/// Organize a folder with proposals from a classification service.
#[derive(Parser, Debug)]
#[command(name = "file-organizer", version, about)]
struct Cli {
    /// Folder to open on startup instead of the last one used.
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Base URL of the classification service. Remembered for later runs.
    #[arg(long)]
    service_url: Option<String>,

    /// Also print debug output on the terminal.
    #[arg(short, long)]
    verbose: bool,
}

/*
 * Warnings go to the terminal (everything with --verbose); the full debug
 * log goes to a file in the configuration directory.
 */
fn setup_logging(verbose: bool) {
    let term_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        term_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    match core::path_utils::app_config_dir(APP_NAME).map(|dir| dir.join(LOG_FILENAME)) {
        Some(log_path) => match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file)),
            Err(e) => eprintln!("Could not create log file {}: {e}", log_path.display()),
        },
        None => eprintln!("Could not determine the configuration directory; logging to the terminal only."),
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

#[cfg(test)]
pub(crate) fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::SimpleLogger::init(LevelFilter::Debug, Config::default());
    });
}

fn load_settings(settings_manager: &dyn SettingsManagerOperations) -> Settings {
    match settings_manager.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Main: Could not load settings, using defaults: {e}");
            Settings::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    log::info!("Main: Starting {APP_NAME}.");

    let settings_manager = Arc::new(CoreSettingsManager::new(APP_NAME));
    let mut settings = load_settings(settings_manager.as_ref());
    if let Some(service_url) = cli.service_url {
        settings.service_url = service_url;
    }
    if let Some(folder) = cli.folder {
        settings.file_path = folder.to_string_lossy().into_owned();
        settings.file_path_valid = false;
    }

    let classifier =
        match HttpClassificationService::new(&settings.service_url, DEFAULT_REQUEST_TIMEOUT) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                log::error!("Main: Could not create the classification client: {e}");
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        };

    let logic = OrganizerLogic::new(
        settings,
        settings_manager,
        Arc::new(CoreFolderLister::new()),
        classifier,
    );
    let event_handler: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(logic));

    match ConsolePlatform::default().run(event_handler) {
        Ok(()) => {
            log::info!("Main: Exited normally.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Main: Console loop failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
