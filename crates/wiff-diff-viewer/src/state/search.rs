//! Case-insensitive substring search over display lines.

use crate::state::viewer_state::ViewerState;

impl ViewerState {
    /// Enter search mode with a fresh query.
    pub fn start_search(&mut self) {
        self.search.mode = true;
        self.search.query.clear();
        self.search.matches.clear();
        self.search.idx = None;
    }

    /// Leave search mode but keep matches highlighted.
    pub fn end_search(&mut self) {
        self.search.mode = false;
    }

    /// Drop the query, matches, and mode entirely.
    pub fn clear_search(&mut self) {
        self.search.mode = false;
        self.search.query.clear();
        self.search.matches.clear();
        self.search.idx = None;
    }

    /// Rescan display lines for the current query. A line matches when
    /// its text or either side-by-side half contains the query,
    /// case-insensitively.
    pub fn update_matches(&mut self) {
        self.search.matches.clear();
        self.search.idx = None;

        if self.search.query.is_empty() {
            return;
        }
        let query = self.search.query.to_lowercase();
        for (i, line) in self.lines.iter().enumerate() {
            let hit = line.text.to_lowercase().contains(&query)
                || (!line.left.text.is_empty()
                    && line.left.text.to_lowercase().contains(&query))
                || (!line.right.text.is_empty()
                    && line.right.text.to_lowercase().contains(&query));
            if hit {
                self.search.matches.push(i);
            }
        }
    }

    /// Move to the next match, wrapping around.
    pub fn next_match(&mut self) {
        if self.search.matches.is_empty() {
            return;
        }
        let next = match self.search.idx {
            Some(i) if i + 1 < self.search.matches.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.search.idx = Some(next);
        self.scroll_to(self.search.matches[next]);
    }

    /// Move to the previous match, wrapping around.
    pub fn prev_match(&mut self) {
        if self.search.matches.is_empty() {
            return;
        }
        let prev = match self.search.idx {
            Some(0) | None => self.search.matches.len() - 1,
            Some(i) => i - 1,
        };
        self.search.idx = Some(prev);
        self.scroll_to(self.search.matches[prev]);
    }

    /// Whether the given display line is the currently focused match.
    pub fn is_current_match(&self, line_idx: usize) -> bool {
        self.search
            .idx
            .and_then(|i| self.search.matches.get(i))
            .is_some_and(|&m| m == line_idx)
    }
}
