//! Pending multi-key input as a pure state machine.
//!
//! A first key (`]`, `[`, `y`, `Y`, `p`, `c`, `A`) arms the machine;
//! further keys resolve it. Transitions are a pure function of the
//! current state, the key, and the live label set, so resolution is
//! unit-testable without a terminal. Time never enters the machine: the
//! ambiguity timeout is an external effect that calls
//! [`resolve_timeout`].

/// Direction for `]`/`[` navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketDir {
    Next,
    Prev,
}

/// A label-consuming command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelCmd {
    YankAdded,
    YankRemoved,
    YankPatch,
    CopyResult,
    Stage,
}

impl LabelCmd {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'y' => Some(LabelCmd::YankAdded),
            'Y' => Some(LabelCmd::YankRemoved),
            'p' => Some(LabelCmd::YankPatch),
            'c' => Some(LabelCmd::CopyResult),
            'A' => Some(LabelCmd::Stage),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            LabelCmd::YankAdded => 'y',
            LabelCmd::YankRemoved => 'Y',
            LabelCmd::YankPatch => 'p',
            LabelCmd::CopyResult => 'c',
            LabelCmd::Stage => 'A',
        }
    }
}

/// Dispatcher pending state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pending {
    #[default]
    None,
    /// `]` or `[` was pressed; the next key selects hunk or file motion.
    Bracket(BracketDir),
    /// A label command was pressed; `acc` holds accumulated label chars.
    Label { cmd: LabelCmd, acc: String },
}

impl Pending {
    pub fn is_none(&self) -> bool {
        matches!(self, Pending::None)
    }

    /// Status-bar text for the pending sequence, e.g. `y a`.
    pub fn display(&self) -> Option<String> {
        match self {
            Pending::None => None,
            Pending::Bracket(BracketDir::Next) => Some("]".to_string()),
            Pending::Bracket(BracketDir::Prev) => Some("[".to_string()),
            Pending::Label { cmd, acc } if acc.is_empty() => Some(cmd.key().to_string()),
            Pending::Label { cmd, acc } => Some(format!("{} {}", cmd.key(), acc)),
        }
    }
}

/// What a transition asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Execute `cmd` on the hunk labeled `label`.
    Run { cmd: LabelCmd, label: String },
    /// The key was accumulated; arm the ambiguity timer and wait.
    Wait,
    JumpHunk(BracketDir),
    JumpFile(BracketDir),
    /// Pending cleared with nothing to do.
    Dismiss,
}

/// Advance the machine by one key. `labels` is the current hunk label
/// set in hunk order.
pub fn step(pending: Pending, key: char, labels: &[&str]) -> (Pending, StepOutcome) {
    match pending {
        Pending::None => (Pending::None, StepOutcome::Dismiss),
        Pending::Bracket(dir) => {
            let outcome = match key {
                'c' => StepOutcome::JumpHunk(dir),
                'f' => StepOutcome::JumpFile(dir),
                _ => StepOutcome::Dismiss,
            };
            (Pending::None, outcome)
        }
        Pending::Label { cmd, acc } => {
            let mut candidate = acc.clone();
            candidate.push(key);

            // Unambiguous exact match: run now.
            if has_exact(labels, &candidate) && !has_strict_prefix(labels, &candidate) {
                return (
                    Pending::None,
                    StepOutcome::Run {
                        cmd,
                        label: candidate,
                    },
                );
            }
            // Exact match shadowed by longer labels, or a strict prefix:
            // accumulate and let the timeout break the tie.
            if has_strict_prefix(labels, &candidate) || has_exact(labels, &candidate) {
                return (
                    Pending::Label {
                        cmd,
                        acc: candidate,
                    },
                    StepOutcome::Wait,
                );
            }
            // Dead end; if what we had so far names a hunk, run on that
            // and drop the new key.
            if !acc.is_empty() && has_exact(labels, &acc) {
                return (Pending::None, StepOutcome::Run { cmd, label: acc });
            }
            (Pending::None, StepOutcome::Dismiss)
        }
    }
}

/// Resolve an ambiguous accumulated label when the timer fires.
pub fn resolve_timeout(pending: &Pending, labels: &[&str]) -> Option<(LabelCmd, String)> {
    match pending {
        Pending::Label { cmd, acc } if !acc.is_empty() && has_exact(labels, acc) => {
            Some((*cmd, acc.clone()))
        }
        _ => None,
    }
}

fn has_exact(labels: &[&str], candidate: &str) -> bool {
    labels.iter().any(|l| *l == candidate)
}

fn has_strict_prefix(labels: &[&str], prefix: &str) -> bool {
    labels
        .iter()
        .any(|l| l.len() > prefix.len() && l.starts_with(prefix))
}
