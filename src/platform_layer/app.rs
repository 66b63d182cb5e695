use super::console_input::{ConsoleInput, HELP_TEXT, parse_command_line};
use super::console_renderer::render_command;
use super::error::{PlatformError, Result as PlatformResult};
use super::types::{AppEvent, PlatformCommand, PlatformEventHandler};

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(100);

/// The console front end.
///
/// Lines from standard input become `AppEvent`s; the commands the event
/// handler queues are printed to standard output. When no input arrives for
/// `idle_interval`, `AppEvent::Idle` is sent so the handler can pick up the
/// results of background work.
pub struct ConsolePlatform {
    idle_interval: Duration,
}

impl ConsolePlatform {
    pub fn new(idle_interval: Duration) -> Self {
        ConsolePlatform { idle_interval }
    }

    /*
     * Runs until the handler asks to quit or standard input is closed.
     * Standard input is read on its own thread so idle ticks keep flowing
     * while the user is not typing.
     */
    pub fn run(&self, event_handler: Arc<Mutex<dyn PlatformEventHandler>>) -> PlatformResult<()> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if sender.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::error!("Platform: Failed to read standard input: {e}");
                            break;
                        }
                    }
                }
                log::debug!("Platform: Console input thread finished.");
            })?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_input(event_handler, receiver, &mut out)
    }

    /*
     * The event loop proper, reading lines from `lines` and writing to `out`.
     * A disconnected input channel is treated as a request to close.
     */
    pub fn run_with_input(
        &self,
        event_handler: Arc<Mutex<dyn PlatformEventHandler>>,
        lines: Receiver<String>,
        out: &mut dyn Write,
    ) -> PlatformResult<()> {
        let mut quit = self.dispatch(&event_handler, AppEvent::MainWindowUISetupComplete, out)?;
        write_prompt(out)?;

        while !quit {
            let event = match lines.recv_timeout(self.idle_interval) {
                Ok(line) => match parse_command_line(&line) {
                    Ok(ConsoleInput::Event(event)) => Some(event),
                    Ok(ConsoleInput::Help) => {
                        for help_line in HELP_TEXT {
                            writeln!(out, "{help_line}")?;
                        }
                        None
                    }
                    Ok(ConsoleInput::Blank) => None,
                    Err(message) => {
                        writeln!(out, "{message}")?;
                        None
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    quit = self.dispatch(&event_handler, AppEvent::Idle, out)?;
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("Platform: Input closed, requesting shutdown.");
                    Some(AppEvent::WindowCloseRequestedByUser)
                }
            };

            if let Some(event) = event {
                quit = self.dispatch(&event_handler, event, out)?;
            }
            if !quit {
                write_prompt(out)?;
            }
        }

        lock_handler(&event_handler)?.on_quit();
        log::debug!("Platform: Event loop exited cleanly.");
        Ok(())
    }

    /*
     * Hands one event to the handler and prints every command it queued.
     * Returns true once the handler asked to quit.
     */
    fn dispatch(
        &self,
        event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
        event: AppEvent,
        out: &mut dyn Write,
    ) -> PlatformResult<bool> {
        let mut handler = lock_handler(event_handler)?;
        handler.handle_event(event);

        let mut quit = false;
        while let Some(command) = handler.try_dequeue_command() {
            if command == PlatformCommand::QuitApplication {
                quit = true;
            }
            for line in render_command(&command) {
                writeln!(out, "{line}")?;
            }
        }
        out.flush()?;
        Ok(quit)
    }
}

impl Default for ConsolePlatform {
    fn default() -> Self {
        ConsolePlatform::new(DEFAULT_IDLE_INTERVAL)
    }
}

fn lock_handler(
    event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
) -> PlatformResult<std::sync::MutexGuard<'_, dyn PlatformEventHandler + 'static>> {
    event_handler
        .lock()
        .map_err(|_| PlatformError::OperationFailed("event handler lock poisoned".to_string()))
}

fn write_prompt(out: &mut dyn Write) -> PlatformResult<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
