//! Diff loading, live-reload context preservation, and execution of the
//! effects the dispatcher returns.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use wiff_diff_viewer::{parse_diff, Effect, Hunk, LineStyle, ViewerState};

use crate::clipboard::copy_to_clipboard;
use crate::editor::{open_in_editor, Tui};
use crate::git::GitClient;
use crate::timer::LabelTimer;

/// Run the diff source and install the result. Errors leave the current
/// state untouched.
pub fn load_diff(state: &mut ViewerState, git: &GitClient) -> Result<()> {
    let raw = git
        .diff(&state.refs, state.context_lines, state.staged)
        .context("running git diff")?;
    let text = String::from_utf8_lossy(&raw);
    let hunks = parse_diff(&text, &state.alphabet).context("parsing diff")?;
    state.load_hunks(hunks);
    log::info!(
        "loaded diff: {} hunks, {} files",
        state.hunks.len(),
        state.unique_files()
    );
    Ok(())
}

/// `(file, old_start, new_start)` identity used by follow mode to spot
/// hunks that appeared since the last reload.
fn hunk_fingerprint(hunk: &Hunk) -> String {
    format!("{}:{}:{}", hunk.file, hunk.old_start, hunk.new_start)
}

/// Re-run the diff and rebuild while preserving the user's context: in
/// follow mode jump to the first new hunk, otherwise find the previous
/// file's header in the new build, otherwise keep the old scroll.
pub fn reload_diff(state: &mut ViewerState, git: &GitClient) {
    let prev_file = state.current_file();
    let prev_scroll = state.scroll;

    let old_fingerprints: HashSet<String> =
        state.hunks.iter().map(hunk_fingerprint).collect();
    let old_count = state.hunks.len();

    let raw = match git.diff(&state.refs, state.context_lines, state.staged) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("reload skipped, git diff failed: {err}");
            return;
        }
    };
    let text = String::from_utf8_lossy(&raw);
    let hunks = match parse_diff(&text, &state.alphabet) {
        Ok(hunks) => hunks,
        Err(err) => {
            log::warn!("reload skipped, parse failed: {err}");
            return;
        }
    };

    state.hunks = hunks;
    state.rebuild_tree();
    state.build_lines();

    if state.follow_mode && !state.hunks.is_empty() {
        let grown = state.hunks.len() as isize - old_count as isize;
        let first_new = state
            .hunks
            .iter()
            .position(|h| !old_fingerprints.contains(&hunk_fingerprint(h)));
        if let Some(idx) = first_new {
            if let Some(start) = state.hunks[idx].start_line {
                let file = state.hunks[idx].file.clone();
                state.scroll = start;
                state.clamp_scroll();
                let message = if grown > 0 {
                    format!("{grown} new hunks — {file}")
                } else {
                    format!("Changes in {file}")
                };
                state.show_flash(message, Duration::from_secs(2));
                return;
            }
        }
    }

    if let Some(prev) = prev_file {
        let header = state
            .lines
            .iter()
            .position(|l| l.style == LineStyle::FileHeader && l.text == prev);
        if let Some(idx) = header {
            state.scroll = idx;
            state.clamp_scroll();
            return;
        }
    }
    state.scroll = prev_scroll;
    state.clamp_scroll();
}

/// Execute dispatcher effects. Returns `true` when the viewer should
/// quit.
pub fn apply_effects(
    effects: Vec<Effect>,
    state: &mut ViewerState,
    terminal: &mut Tui,
    git: &GitClient,
    timer: &LabelTimer,
) -> bool {
    for effect in effects {
        match effect {
            Effect::Quit => return true,
            Effect::Reload => {
                if let Err(err) = load_diff(state, git) {
                    log::warn!("reload failed: {err:#}");
                }
            }
            Effect::CopyText {
                text,
                success,
                failure,
            } => {
                let message = if copy_to_clipboard(&text) {
                    success
                } else {
                    failure
                };
                state.show_flash(message, Duration::from_secs(2));
            }
            Effect::StageHunk { hunk_idx } => stage_hunk(state, git, hunk_idx),
            Effect::OpenEditor { file, line } => open_editor(state, terminal, git, &file, line),
            Effect::ArmLabelTimer => timer.arm(),
            Effect::CancelLabelTimer => timer.cancel(),
        }
    }
    false
}

fn stage_hunk(state: &mut ViewerState, git: &GitClient, hunk_idx: usize) {
    let Some(hunk) = state.hunks.get(hunk_idx) else {
        return;
    };
    let label = hunk.label.clone();
    let was_staged = hunk.staged;
    let patch = hunk.as_full_patch();
    let action = if was_staged { "Unstage" } else { "Stage" };

    match git.apply_cached(&patch, was_staged) {
        Ok(()) => {
            state.hunks[hunk_idx].staged = !was_staged;
            let message = if was_staged {
                format!("Unstaged hunk {label}")
            } else {
                format!("Staged hunk {label}")
            };
            log::info!("{action} hunk {label} ok");
            state.show_flash(message, Duration::from_secs(2));
        }
        Err(err) => {
            log::warn!("{action} hunk {label} failed: {err}");
            state.show_flash(
                format!("{action} failed for hunk {label}: {err}"),
                Duration::from_secs(2),
            );
        }
    }
}

fn open_editor(
    state: &mut ViewerState,
    terminal: &mut Tui,
    git: &GitClient,
    file: &str,
    line: Option<u32>,
) {
    let path = resolve_path(git, file);
    if !path.exists() {
        state.show_flash(format!("File not found: {file}"), Duration::from_secs(2));
        return;
    }

    log::info!("opening {} in editor", path.display());
    if let Err(err) = open_in_editor(terminal, &path, line) {
        state.show_flash(format!("Editor error: {err}"), Duration::from_secs(3));
    }
    if !state.pipe_mode {
        reload_diff(state, git);
    }
}

fn resolve_path(git: &GitClient, file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        return path;
    }
    match git.root() {
        Ok(root) => root.join(file),
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiff_diff_viewer::{DiffLine, ViewerOptions};

    fn hunk(label: &str, file: &str, old_start: u32, new_start: u32) -> Hunk {
        Hunk {
            label: label.to_string(),
            file: file.to_string(),
            raw_header: format!("@@ -{old_start},1 +{new_start},1 @@"),
            comment: String::new(),
            old_start,
            new_start,
            lines: vec![DiffLine::added("x")],
            start_line: None,
            staged: false,
        }
    }

    #[test]
    fn fingerprint_combines_file_and_positions() {
        let h = hunk("i", "src/a.rs", 3, 7);
        assert_eq!(hunk_fingerprint(&h), "src/a.rs:3:7");
    }

    #[test]
    fn fingerprints_distinguish_shifted_hunks() {
        let a = hunk("i", "src/a.rs", 3, 7);
        let b = hunk("i", "src/a.rs", 3, 9);
        assert_ne!(hunk_fingerprint(&a), hunk_fingerprint(&b));
    }

    /// The context-preservation scan `reload_diff` performs, exercised
    /// directly: the previous file's header is found in a fresh build.
    #[test]
    fn previous_file_header_is_recoverable_after_rebuild() {
        let mut state = ViewerState::for_tests(ViewerOptions::default());
        state.width = 100;
        state.height = 4;
        state.load_hunks(vec![hunk("i", "a.rs", 1, 1), hunk("l", "docs/n.txt", 1, 1)]);

        let header = state.hunks[1].start_line.unwrap() - 2;
        state.scroll_to(header);
        let prev_file = state.current_file();
        assert_eq!(prev_file.as_deref(), Some("docs/n.txt"));

        // Rebuild with an extra hunk ahead of the file the user was on.
        state.load_hunks(vec![
            hunk("i", "a.rs", 1, 1),
            hunk("l", "a.rs", 40, 40),
            hunk("m", "docs/n.txt", 1, 1),
        ]);
        let idx = state
            .lines
            .iter()
            .position(|l| l.style == LineStyle::FileHeader && l.text == "docs/n.txt")
            .unwrap();
        state.scroll = idx;
        state.clamp_scroll();
        assert_eq!(state.current_file().as_deref(), Some("docs/n.txt"));
    }
}
