//! Hunk label allocation.
//!
//! Every key the dispatcher interprets is reserved so a hunk label can
//! never collide with a command. The remaining lowercase-then-uppercase
//! letters form the label alphabet.

/// A single application key binding.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub key: char,
    pub name: &'static str,
}

/// All application keybindings. Adding a key here automatically reserves
/// it so it won't be used as a hunk label.
pub const KEY_BINDINGS: &[KeyBinding] = &[
    // Navigation
    KeyBinding { key: 'j', name: "scroll down" },
    KeyBinding { key: 'k', name: "scroll up" },
    KeyBinding { key: 'd', name: "half page down" },
    KeyBinding { key: 'u', name: "half page up" },
    KeyBinding { key: 'g', name: "go to top" },
    KeyBinding { key: 'G', name: "go to bottom" },
    // Modes & toggles
    KeyBinding { key: 's', name: "side-by-side" },
    KeyBinding { key: 'n', name: "line numbers / next match" },
    KeyBinding { key: 'w', name: "wrap" },
    KeyBinding { key: 'e', name: "explorer" },
    KeyBinding { key: 'h', name: "syntax highlight" },
    KeyBinding { key: 'b', name: "diff background" },
    // Full file view
    KeyBinding { key: 'f', name: "toggle full file view" },
    // Yank / patch / copy (pending key prefixes)
    KeyBinding { key: 'y', name: "yank added" },
    KeyBinding { key: 'Y', name: "yank removed" },
    KeyBinding { key: 'p', name: "yank patch" },
    KeyBinding { key: 'c', name: "copy result" },
    // Staging
    KeyBinding { key: 'A', name: "stage/unstage hunk" },
    // Follow mode
    KeyBinding { key: 'F', name: "follow mode" },
    // Search
    KeyBinding { key: '/', name: "search" },
    KeyBinding { key: 'N', name: "prev search match" },
    // Hunk / file navigation (pending key prefixes)
    KeyBinding { key: ']', name: "next hunk/file" },
    KeyBinding { key: '[', name: "prev hunk/file" },
    // Tree mode
    KeyBinding { key: 'a', name: "show all (tree)" },
    // Help
    KeyBinding { key: '?', name: "help" },
    // Actions
    KeyBinding { key: 'o', name: "open in editor" },
    // Watch mode
    KeyBinding { key: 'W', name: "toggle watch mode" },
    // Misc
    KeyBinding { key: 'q', name: "quit" },
    KeyBinding { key: '+', name: "more context" },
    KeyBinding { key: '=', name: "more context" },
    KeyBinding { key: '-', name: "less context" },
];

/// The label alphabet: a-z then A-Z minus every reserved key, in that
/// order. Built once at startup and passed to the parser; never mutated.
#[derive(Debug, Clone)]
pub struct LabelAlphabet {
    chars: Vec<char>,
}

impl Default for LabelAlphabet {
    fn default() -> Self {
        Self::from_bindings(KEY_BINDINGS)
    }
}

impl LabelAlphabet {
    /// Build the alphabet from a keybinding table.
    pub fn from_bindings(bindings: &[KeyBinding]) -> Self {
        let reserved: Vec<char> = bindings.iter().map(|b| b.key).collect();
        let chars = ('a'..='z')
            .chain('A'..='Z')
            .filter(|c| !reserved.contains(c))
            .collect();
        Self { chars }
    }

    /// Number of single-character labels available.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Label for the hunk at `index`. The first `len()` hunks get a
    /// single character; later hunks get two-character labels.
    pub fn label_for(&self, index: usize) -> String {
        let n = self.chars.len();
        if index < n {
            return self.chars[index].to_string();
        }
        let over = index - n;
        let first = (over / n).min(n - 1);
        let second = over % n;
        let mut label = String::with_capacity(2);
        label.push(self.chars[first]);
        label.push(self.chars[second]);
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved_keys() -> Vec<char> {
        KEY_BINDINGS.iter().map(|b| b.key).collect()
    }

    #[test]
    fn single_char_labels_avoid_reserved_keys() {
        let alphabet = LabelAlphabet::default();
        let reserved = reserved_keys();
        for i in 0..alphabet.len() {
            let label = alphabet.label_for(i);
            assert_eq!(label.chars().count(), 1, "label {label:?} at {i}");
            assert!(
                !reserved.contains(&label.chars().next().unwrap()),
                "label {label:?} collides with a reserved key"
            );
        }
    }

    #[test]
    fn first_labels_are_first_unreserved_letters() {
        let alphabet = LabelAlphabet::default();
        // a-z minus reserved lowercase: i l m r t v x z
        assert_eq!(alphabet.label_for(0), "i");
        assert_eq!(alphabet.label_for(1), "l");
        assert_eq!(alphabet.label_for(2), "m");
    }

    #[test]
    fn overflow_labels_are_two_chars_from_alphabet() {
        let alphabet = LabelAlphabet::default();
        let n = alphabet.len();
        let valid: Vec<char> = (0..n)
            .map(|i| alphabet.label_for(i).chars().next().unwrap())
            .collect();
        for i in n..(2 * n * n).min(n + 500) {
            let label = alphabet.label_for(i);
            assert_eq!(label.chars().count(), 2, "label {label:?} at {i}");
            for c in label.chars() {
                assert!(valid.contains(&c));
            }
        }
        // First overflow label starts at the top of the alphabet.
        assert_eq!(alphabet.label_for(n), "ii");
        assert_eq!(alphabet.label_for(n + 1), "il");
    }

    #[test]
    fn labels_are_unique_within_range() {
        let alphabet = LabelAlphabet::default();
        let n = alphabet.len();
        let mut seen = std::collections::HashSet::new();
        for i in 0..(n + n * n) {
            assert!(seen.insert(alphabet.label_for(i)), "duplicate at {i}");
        }
    }
}
