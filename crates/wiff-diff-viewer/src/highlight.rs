//! Syntax highlighting for diff content using syntect.
//!
//! Lexer lookups are cached per filename extension (falling back to the
//! basename for extensionless files like `Makefile`); misses are cached
//! too so repeated lookups stay O(1). Only foreground color and
//! bold/italic/underline are applied, leaving backgrounds to the diff-bg
//! layer.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use ratatui::style::{Color, Modifier, Style};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::theme::DEFAULT_THEME;

/// A run of text with one style applied. Concatenating a line's spans
/// reproduces the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }
}

/// Tokenizes single source lines and maps tokens to ratatui styles.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    /// Syntax index per extension/basename; `None` records a miss.
    syntax_cache: HashMap<String, Option<usize>>,
    /// Highlighted spans keyed by (path, content) hash.
    line_cache: HashMap<u64, Vec<StyledSpan>>,
    max_line_cache: usize,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("syntax_cache", &self.syntax_cache.len())
            .field("line_cache", &self.line_cache.len())
            .finish()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl Highlighter {
    /// Create a highlighter for the named theme, falling back to the
    /// default theme when unknown.
    pub fn new(theme_name: &str) -> Self {
        let themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .get(theme_name)
            .cloned()
            .unwrap_or_else(|| themes[DEFAULT_THEME].clone());
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            syntax_cache: HashMap::new(),
            line_cache: HashMap::new(),
            max_line_cache: 5000,
        }
    }

    /// Tokenize one line of `filename` and return styled spans whose
    /// concatenated text equals `text`. Without a matching lexer the
    /// whole line comes back as a single default-styled span.
    pub fn highlight(&mut self, filename: &str, text: &str) -> Vec<StyledSpan> {
        if text.is_empty() {
            return Vec::new();
        }

        let key = cache_key(filename, text);
        if let Some(spans) = self.line_cache.get(&key) {
            return spans.clone();
        }

        let spans = match self.syntax_index(filename) {
            Some(idx) => self.highlight_with_syntax(idx, text),
            None => vec![StyledSpan::plain(text)],
        };

        if self.line_cache.len() >= self.max_line_cache {
            let evict: Vec<u64> = self
                .line_cache
                .keys()
                .take(self.max_line_cache / 5)
                .copied()
                .collect();
            for k in evict {
                self.line_cache.remove(&k);
            }
        }
        self.line_cache.insert(key, spans.clone());
        spans
    }

    /// Cached lexer lookup. The cache key is the extension, or the
    /// basename for extensionless files.
    fn syntax_index(&mut self, filename: &str) -> Option<usize> {
        let path = Path::new(filename);
        let key = path
            .extension()
            .or_else(|| path.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_string();

        if let Some(&cached) = self.syntax_cache.get(&key) {
            return cached;
        }

        let found = self
            .syntax_set
            .find_syntax_by_extension(&key)
            .or_else(|| self.syntax_set.find_syntax_by_token(&key))
            .and_then(|syntax| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .position(|s| s.name == syntax.name)
            });

        self.syntax_cache.insert(key, found);
        found
    }

    fn highlight_with_syntax(&self, syntax_idx: usize, text: &str) -> Vec<StyledSpan> {
        let Some(syntax) = self.syntax_set.syntaxes().get(syntax_idx) else {
            return vec![StyledSpan::plain(text)];
        };

        let mut lines = HighlightLines::new(syntax, &self.theme);
        match lines.highlight_line(text, &self.syntax_set) {
            Ok(ranges) => ranges
                .iter()
                .filter(|(_, chunk)| !chunk.is_empty())
                .map(|(style, chunk)| StyledSpan {
                    text: (*chunk).to_string(),
                    style: token_style(*style),
                })
                .collect(),
            Err(_) => vec![StyledSpan::plain(text)],
        }
    }

    /// Number of cached highlighted lines.
    pub fn line_cache_size(&self) -> usize {
        self.line_cache.len()
    }
}

/// Map a syntect token style to ratatui. Foreground and font attributes
/// only; the background belongs to the diff layer.
fn token_style(style: syntect::highlighting::Style) -> Style {
    let mut out = Style::default().fg(Color::Rgb(
        style.foreground.r,
        style.foreground.g,
        style.foreground.b,
    ));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn cache_key(filename: &str, text: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    filename.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_concatenate_to_input() {
        let mut hl = Highlighter::default();
        let text = "fn main() { let x = 1; }";
        let spans = hl.highlight("test.rs", text);
        let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn rust_line_produces_multiple_spans() {
        let mut hl = Highlighter::default();
        let spans = hl.highlight("test.rs", "fn main() {}");
        assert!(spans.len() > 1);
    }

    #[test]
    fn unknown_extension_is_single_plain_span() {
        let mut hl = Highlighter::default();
        let spans = hl.highlight("data.xyzzy", "some content");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "some content");
    }

    #[test]
    fn empty_text_produces_no_spans() {
        let mut hl = Highlighter::default();
        assert!(hl.highlight("test.rs", "").is_empty());
    }

    #[test]
    fn extensionless_files_match_by_basename() {
        let mut hl = Highlighter::default();
        let spans = hl.highlight("Makefile", "all: build");
        let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "all: build");
    }

    #[test]
    fn misses_are_cached() {
        let mut hl = Highlighter::default();
        hl.highlight("data.xyzzy", "a");
        assert_eq!(hl.syntax_cache.get("xyzzy"), Some(&None));
        // Second lookup hits the negative cache.
        hl.highlight("other.xyzzy", "b");
        assert_eq!(hl.syntax_cache.len(), 1);
    }

    #[test]
    fn repeated_lines_hit_the_line_cache() {
        let mut hl = Highlighter::default();
        hl.highlight("test.rs", "let x = 1;");
        assert_eq!(hl.line_cache_size(), 1);
        hl.highlight("test.rs", "let x = 1;");
        assert_eq!(hl.line_cache_size(), 1);
        hl.highlight("test.rs", "let y = 2;");
        assert_eq!(hl.line_cache_size(), 2);
    }

    #[test]
    fn styles_carry_no_background() {
        let mut hl = Highlighter::default();
        for span in hl.highlight("test.rs", "fn main() {}") {
            assert!(span.style.bg.is_none());
        }
    }
}
