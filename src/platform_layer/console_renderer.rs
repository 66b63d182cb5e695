/*
 * Turns `PlatformCommand`s into the lines the console front end prints.
 * Folder rows carry the id to pass to `click`; preview rows carry the index to
 * pass to `accept`.
 */
use super::types::{MessageSeverity, PlatformCommand, PreviewRowDescriptor, TreeRowDescriptor};

const INDENT: &str = "  ";

fn tree_row_line(row: &TreeRowDescriptor) -> String {
    let indent = INDENT.repeat(row.depth);
    let marker = match (row.is_folder, row.expanded) {
        (true, true) => "[-] ",
        (true, false) => "[+] ",
        (false, _) => "    ",
    };
    let mut line = format!("{:>4} {indent}{marker}{}", row.id.0, row.text);
    if !row.is_folder {
        line.push_str(&format!("  ({}, {})", row.size, row.modified));
    }
    line
}

fn preview_row_line(row: &PreviewRowDescriptor) -> String {
    let indent = INDENT.repeat(row.depth);
    let check = if row.accepted { "[x]" } else { "[ ]" };
    let suffix = if row.is_leaf { "" } else { "/" };
    format!("{:>4} {indent}{check} {}{suffix}", row.index, row.text)
}

pub fn render_command(command: &PlatformCommand) -> Vec<String> {
    match command {
        PlatformCommand::RenderFolderTree { title, rows } => {
            let mut lines = vec![title.clone()];
            if rows.is_empty() {
                lines.push("     (empty)".to_string());
            }
            lines.extend(rows.iter().map(tree_row_line));
            lines
        }
        PlatformCommand::RenderPreview {
            rows,
            accepted_count,
        } => {
            if rows.is_empty() {
                return vec!["No proposed changes.".to_string()];
            }
            let mut lines = vec![format!(
                "Proposed changes ({accepted_count} of {} rows accepted):",
                rows.len()
            )];
            lines.extend(rows.iter().map(preview_row_line));
            lines
        }
        PlatformCommand::ShowFileDetails(details) => vec![
            format!("File: {}", details.name),
            format!("{INDENT}Path: {}", details.path.display()),
            format!("{INDENT}Size: {}", details.size),
            format!("{INDENT}Modified: {}", details.modified),
        ],
        PlatformCommand::ShowSettings { entries } => {
            let mut lines = vec!["Settings:".to_string()];
            lines.extend(
                entries
                    .iter()
                    .map(|(label, value)| format!("{INDENT}{label}: {value}")),
            );
            lines
        }
        PlatformCommand::SetLoading { loading: true } => vec!["Working...".to_string()],
        PlatformCommand::SetLoading { loading: false } => Vec::new(),
        PlatformCommand::UpdateStatus { text, severity } => {
            let prefix = match severity {
                MessageSeverity::Information => "",
                MessageSeverity::Warning => "warning: ",
                MessageSeverity::Error => "error: ",
            };
            vec![format!("{prefix}{text}")]
        }
        PlatformCommand::QuitApplication => Vec::new(),
    }
}
