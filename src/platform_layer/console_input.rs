/*
 * Translates lines typed at the console into `AppEvent`s. Parsing is pure so
 * the run loop only has to read lines and dispatch the result.
 */
use super::types::{AppEvent, SettingsEdit, TreeItemId};
use crate::core::ProcessAction;
use std::path::PathBuf;

pub const HELP_TEXT: &[&str] = &[
    "Commands:",
    "  open <folder>            open a folder to organize",
    "  click <id>               expand/collapse a folder row or show a file's details",
    "  refresh                  re-read the open folder",
    "  organize [instruction]   ask the service for proposals",
    "  accept <row>             toggle acceptance of a preview row",
    "  accept-all | reject-all  accept or reject every preview row",
    "  commit                   apply the accepted proposals",
    "  discard                  drop the current proposals",
    "  model <name>             set the model",
    "  key <api key>            set the Groq API key",
    "  instruction <text>       set the default instruction",
    "  depth <+n|-n>            adjust the maximum tree depth",
    "  action <move|duplicate>  choose how accepted files are processed",
    "  duplicate-path [folder]  set the folder duplicates are written to",
    "  format add <pattern>     add a file name format",
    "  format remove <index>    remove a file name format",
    "  format use <index>       select a file name format",
    "  settings                 show the current settings",
    "  help                     show this text",
    "  quit                     save settings and exit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Event(AppEvent),
    Help,
    Blank,
}

fn required<'a>(argument: &'a str, usage: &str) -> Result<&'a str, String> {
    if argument.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(argument)
    }
}

fn parse_index(argument: &str, usage: &str) -> Result<usize, String> {
    required(argument, usage)?
        .parse::<usize>()
        .map_err(|_| format!("'{argument}' is not a valid number; usage: {usage}"))
}

fn parse_delta(argument: &str) -> Result<i32, String> {
    let usage = "depth <+n|-n>";
    let digits = required(argument, usage)?;
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    digits
        .parse::<i32>()
        .map_err(|_| format!("'{argument}' is not a valid depth change; usage: {usage}"))
}

fn parse_format(argument: &str) -> Result<SettingsEdit, String> {
    let usage = "format add <pattern> | format remove <index> | format use <index>";
    let (action, rest) = split_word(argument);
    match action {
        "add" => Ok(SettingsEdit::AddFileFormat(required(rest, usage)?.to_string())),
        "remove" => Ok(SettingsEdit::RemoveFileFormat(parse_index(rest, usage)?)),
        "use" => Ok(SettingsEdit::SelectFileFormat(parse_index(rest, usage)?)),
        _ => Err(format!("usage: {usage}")),
    }
}

/* Splits off the first word; the remainder keeps its inner spacing. */
fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

/*
 * Parses one console line. Unknown commands and malformed arguments produce
 * an error message for the user.
 */
pub fn parse_command_line(line: &str) -> Result<ConsoleInput, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleInput::Blank);
    }
    let (command, argument) = split_word(line);
    let event = match command.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(ConsoleInput::Help),
        "open" => AppEvent::FolderPickerDialogCompleted {
            path: Some(PathBuf::from(required(argument, "open <folder>")?)),
        },
        "click" => AppEvent::TreeItemClicked {
            item_id: TreeItemId(parse_index(argument, "click <id>")? as u64),
        },
        "refresh" => AppEvent::RefreshRequested,
        "organize" => AppEvent::OrganizeRequested {
            instruction: (!argument.is_empty()).then(|| argument.to_string()),
        },
        "accept" => AppEvent::PreviewRowToggled {
            index: parse_index(argument, "accept <row>")?,
        },
        "accept-all" => AppEvent::AcceptAllChanged { accepted: true },
        "reject-all" => AppEvent::AcceptAllChanged { accepted: false },
        "commit" => AppEvent::ConfirmChangesRequested,
        "discard" => AppEvent::DiscardChangesRequested,
        "model" => AppEvent::SettingsEdited(SettingsEdit::Model(
            required(argument, "model <name>")?.to_string(),
        )),
        "key" => AppEvent::SettingsEdited(SettingsEdit::GroqApiKey(argument.to_string())),
        "instruction" => AppEvent::SettingsEdited(SettingsEdit::Instruction(argument.to_string())),
        "depth" => AppEvent::SettingsEdited(SettingsEdit::AdjustMaxTreeDepth(parse_delta(argument)?)),
        "action" => {
            let action = match argument.to_ascii_lowercase().as_str() {
                "move" => ProcessAction::Move,
                "duplicate" => ProcessAction::Duplicate,
                _ => return Err("usage: action <move|duplicate>".to_string()),
            };
            AppEvent::SettingsEdited(SettingsEdit::ProcessAction(action))
        }
        "duplicate-path" => {
            AppEvent::SettingsEdited(SettingsEdit::DuplicatePath(argument.to_string()))
        }
        "format" => AppEvent::SettingsEdited(parse_format(argument)?),
        "settings" => AppEvent::SettingsRequested,
        "quit" | "exit" => AppEvent::WindowCloseRequestedByUser,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(ConsoleInput::Event(event))
}
