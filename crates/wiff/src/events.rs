//! Application events posted into the main loop's queue by background
//! tasks. Terminal input arrives separately through crossterm polling;
//! both are consumed serially on the main thread, so state mutations
//! have a single total order.

/// Events from the watcher debounce task and the pending-label timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The working tree changed; re-run the diff if watching is enabled.
    Reload,
    /// The pending-label ambiguity timer fired. Stale generations are
    /// ignored by the receiver.
    LabelTimeout(u64),
}
