//! Command-line options.

use clap::Parser;
use wiff_diff_viewer::DEFAULT_THEME;

/// A terminal diff viewer.
#[derive(Parser, Debug)]
#[command(
    name = "wiff",
    version,
    disable_version_flag = true,
    about = "wiff - a terminal diff viewer",
    after_help = "\
Examples:
  wiff              Show unstaged changes
  wiff HEAD         Diff against HEAD
  wiff HEAD~3       Diff against 3 commits ago
  wiff main feature Diff between branches
  wiff --staged     Show staged changes
  git diff | wiff   Read diff from pipe"
)]
pub struct Cli {
    /// Side-by-side mode
    #[arg(short = 's')]
    pub side_by_side: bool,

    /// Open the file explorer
    #[arg(short = 'e')]
    pub explorer: bool,

    /// Disable line numbers (on by default)
    #[arg(short = 'N')]
    pub no_line_numbers: bool,

    /// Disable line wrapping (on by default)
    #[arg(short = 'W')]
    pub no_wrap: bool,

    /// Disable diff background tints (on by default)
    #[arg(short = 'B')]
    pub no_diff_bg: bool,

    /// Disable syntax highlighting (on by default)
    #[arg(short = 'S')]
    pub no_syntax: bool,

    /// Context lines
    #[arg(short = 'U', value_name = "N", default_value_t = 3)]
    pub context_lines: u32,

    /// Color theme (env: WIFF_THEME)
    #[arg(short = 't', value_name = "NAME")]
    pub theme: Option<String>,

    /// Show staged changes (same as --cached)
    #[arg(long, visible_alias = "cached")]
    pub staged: bool,

    /// List available themes and exit
    #[arg(long)]
    pub themes: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Git refs to diff against (one ref, or two for a range)
    #[arg(value_name = "REF")]
    pub refs: Vec<String>,
}

impl Cli {
    /// Theme resolution order: `-t`, then `WIFF_THEME`, then the default.
    pub fn resolved_theme(&self) -> String {
        if let Some(theme) = &self.theme {
            return theme.clone();
        }
        match std::env::var("WIFF_THEME") {
            Ok(theme) if !theme.is_empty() => theme,
            _ => DEFAULT_THEME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_refs() {
        let cli = Cli::parse_from(["wiff", "-s", "-e", "-U5", "main", "feature"]);
        assert!(cli.side_by_side);
        assert!(cli.explorer);
        assert_eq!(cli.context_lines, 5);
        assert_eq!(cli.refs, vec!["main", "feature"]);
    }

    #[test]
    fn cached_is_an_alias_for_staged() {
        let cli = Cli::parse_from(["wiff", "--cached"]);
        assert!(cli.staged);
        let cli = Cli::parse_from(["wiff", "--staged"]);
        assert!(cli.staged);
    }

    #[test]
    fn defaults_match_the_viewer() {
        let cli = Cli::parse_from(["wiff"]);
        assert_eq!(cli.context_lines, 3);
        assert!(!cli.no_line_numbers);
        assert!(!cli.no_wrap);
        assert!(cli.refs.is_empty());
    }

    #[test]
    fn explicit_theme_wins_over_environment() {
        let cli = Cli::parse_from(["wiff", "-t", "InspiredGitHub"]);
        assert_eq!(cli.resolved_theme(), "InspiredGitHub");
    }
}
