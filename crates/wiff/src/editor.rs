//! External editor adapter: suspend the terminal, run the editor
//! attached to the real TTY, resume and force a full redraw.

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::Terminal;

pub type Tui = Terminal<CrosstermBackend<std::io::Stdout>>;

/// `$EDITOR`, then `$VISUAL`, then `vi`.
pub fn editor_command() -> String {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                return value;
            }
        }
    }
    "vi".to_string()
}

/// Open `path` in the user's editor, optionally at `line`, with the UI
/// suspended for the duration of the child process.
pub fn open_in_editor(terminal: &mut Tui, path: &Path, line: Option<u32>) -> Result<()> {
    let editor = editor_command();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    let mut cmd = Command::new(&editor);
    if let Some(line) = line.filter(|&l| l > 0) {
        cmd.arg(format!("+{line}"));
    }
    cmd.arg(path);
    let status = cmd.status();

    // Resume the UI before reporting anything.
    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    terminal.clear()?;

    let status = status.with_context(|| format!("failed to run {editor}"))?;
    if !status.success() {
        return Err(anyhow!("{editor} exited with {status}"));
    }
    Ok(())
}
