//! UI theme derived from a named syntect style catalog.
//!
//! Added/removed stay semantic green/red regardless of theme; the accent
//! comes from the theme's keyword color and the highlight from its string
//! color. Background tints for diff rows are computed from the theme
//! background so they stay subtle on both dark and light themes.

use ratatui::style::{Color, Modifier, Style};
use syntect::highlighting::{Highlighter as ScopeStyles, Theme, ThemeSet};
use syntect::parsing::Scope;

/// Theme used when the requested name is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// All colors and styles the renderer needs, derived from one catalog entry.
#[derive(Debug, Clone)]
pub struct UiTheme {
    /// Name the theme was resolved to.
    pub name: String,

    // Raw colors, needed for dynamic composition in the tree sidebar.
    pub accent: Color,
    pub highlight: Color,
    pub added: Color,
    pub removed: Color,

    // Pre-built styles.
    pub default_style: Style,
    pub dim: Style,
    pub file_header: Style,
    pub hunk_header: Style,
    pub diff_added: Style,
    pub diff_removed: Style,
    pub label: Style,
    pub line_no: Style,
    pub status_bar: Style,
    pub search_current: Style,
    pub flash: Style,

    // Subtle diff background tints.
    pub bg_added: Color,
    pub bg_removed: Color,
}

impl Default for UiTheme {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl UiTheme {
    /// Build a theme from the named catalog entry, falling back to
    /// [`DEFAULT_THEME`] when the name is unknown.
    pub fn new(name: &str) -> Self {
        let themes = ThemeSet::load_defaults().themes;
        let (resolved, theme) = match themes.get(name) {
            Some(theme) => (name.to_string(), theme.clone()),
            None => (DEFAULT_THEME.to_string(), themes[DEFAULT_THEME].clone()),
        };
        Self::from_theme(resolved, &theme)
    }

    fn from_theme(name: String, theme: &Theme) -> Self {
        let accent = scope_color(theme, "keyword", Color::Cyan);
        let highlight = scope_color(theme, "string", Color::Yellow);
        let comment = scope_color(theme, "comment", Color::Cyan);
        let fg = theme
            .settings
            .foreground
            .map(to_color)
            .unwrap_or(Color::White);

        let added = Color::Green;
        let removed = Color::Red;

        let base = Style::default();
        let (bg_added, bg_removed) = diff_backgrounds(theme);

        Self {
            name,
            accent,
            highlight,
            added,
            removed,
            default_style: base,
            dim: base.add_modifier(Modifier::DIM),
            file_header: base.fg(fg).add_modifier(Modifier::BOLD),
            hunk_header: base.fg(comment),
            diff_added: base.fg(added),
            diff_removed: base.fg(removed),
            label: base.fg(highlight).add_modifier(Modifier::BOLD),
            line_no: base.add_modifier(Modifier::DIM),
            status_bar: base.bg(accent).fg(contrast_fg(accent)),
            search_current: base
                .bg(highlight)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            flash: base
                .fg(added)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            bg_added,
            bg_removed,
        }
    }
}

/// Names of all bundled themes, sorted.
pub fn theme_names() -> Vec<String> {
    let mut names: Vec<String> = ThemeSet::load_defaults().themes.keys().cloned().collect();
    names.sort();
    names
}

/// Foreground color a theme assigns to a scope, or `fallback` when the
/// theme has no rule for it.
fn scope_color(theme: &Theme, scope: &str, fallback: Color) -> Color {
    let Ok(scope) = Scope::new(scope) else {
        return fallback;
    };
    ScopeStyles::new(theme)
        .style_mod_for_stack(&[scope])
        .foreground
        .map(to_color)
        .unwrap_or(fallback)
}

fn to_color(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Subtle added/removed background tints: on dark themes shift the
/// background toward green/red, on light themes pull the opposing
/// channels down.
fn diff_backgrounds(theme: &Theme) -> (Color, Color) {
    let Some(bg) = theme.settings.background else {
        return (Color::Rgb(0x1a, 0x3a, 0x1a), Color::Rgb(0x3a, 0x1a, 0x1a));
    };

    if luminance(bg.r, bg.g, bg.b) < 128.0 {
        (
            Color::Rgb(bg.r, bg.g.saturating_add(32), bg.b),
            Color::Rgb(bg.r.saturating_add(32), bg.g, bg.b),
        )
    } else {
        (
            Color::Rgb(bg.r.saturating_sub(20), bg.g, bg.b.saturating_sub(20)),
            Color::Rgb(bg.r, bg.g.saturating_sub(20), bg.b.saturating_sub(20)),
        )
    }
}

/// Black or white, whichever contrasts better with `bg`.
fn contrast_fg(bg: Color) -> Color {
    let Color::Rgb(r, g, b) = bg else {
        return Color::White;
    };
    if luminance(r, g, b) > 128.0 {
        Color::Black
    } else {
        Color::White
    }
}

/// Perceived luminance (ITU-R BT.601).
fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_default() {
        let theme = UiTheme::new("no-such-theme");
        assert_eq!(theme.name, DEFAULT_THEME);
    }

    #[test]
    fn known_theme_keeps_its_name() {
        let theme = UiTheme::new("InspiredGitHub");
        assert_eq!(theme.name, "InspiredGitHub");
    }

    #[test]
    fn added_and_removed_are_semantic() {
        for name in ["InspiredGitHub", "base16-ocean.dark"] {
            let theme = UiTheme::new(name);
            assert_eq!(theme.added, Color::Green);
            assert_eq!(theme.removed, Color::Red);
        }
    }

    #[test]
    fn status_bar_foreground_contrasts_with_accent() {
        assert_eq!(contrast_fg(Color::Rgb(250, 250, 250)), Color::Black);
        assert_eq!(contrast_fg(Color::Rgb(10, 10, 40)), Color::White);
        // Pure green is bright under BT.601 weighting.
        assert_eq!(contrast_fg(Color::Rgb(0, 255, 0)), Color::Black);
    }

    #[test]
    fn dark_theme_tints_shift_toward_green_and_red() {
        let theme = UiTheme::new("base16-ocean.dark");
        let (Color::Rgb(_, ag, _), Color::Rgb(rr, _, _)) = (theme.bg_added, theme.bg_removed)
        else {
            panic!("tints must be rgb");
        };
        let bg = ThemeSet::load_defaults().themes["base16-ocean.dark"]
            .settings
            .background
            .unwrap();
        assert_eq!(ag, bg.g.saturating_add(32));
        assert_eq!(rr, bg.r.saturating_add(32));
    }

    #[test]
    fn theme_names_are_sorted_and_contain_default() {
        let names = theme_names();
        assert!(names.iter().any(|n| n == DEFAULT_THEME));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
