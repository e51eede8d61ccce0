//! Cancelable one-shot timer for pending-label resolution.
//!
//! Arming bumps a generation counter and spawns a sleeper thread; the
//! thread only posts its event if the generation is still current when
//! it wakes, so cancel/re-arm races resolve to a no-op. The receiver
//! double-checks with [`LabelTimer::is_current`] since a fire can cross
//! a cancel in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use wiff_diff_viewer::LABEL_TIMEOUT;

use crate::events::AppEvent;

pub struct LabelTimer {
    tx: Sender<AppEvent>,
    generation: Arc<AtomicU64>,
}

impl LabelTimer {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start (or restart) the timeout.
    pub fn arm(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(LABEL_TIMEOUT);
            if guard.load(Ordering::SeqCst) == generation {
                let _ = tx.send(AppEvent::LabelTimeout(generation));
            }
        });
    }

    /// Invalidate any armed timeout.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether a delivered timeout is still the armed one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn armed_timer_fires_with_current_generation() {
        let (tx, rx) = mpsc::channel();
        let timer = LabelTimer::new(tx);
        timer.arm();
        let event = rx
            .recv_timeout(LABEL_TIMEOUT + Duration::from_millis(500))
            .expect("timer fires");
        let AppEvent::LabelTimeout(generation) = event else {
            panic!("unexpected event {event:?}");
        };
        assert!(timer.is_current(generation));
    }

    #[test]
    fn cancel_suppresses_the_fire() {
        let (tx, rx) = mpsc::channel();
        let timer = LabelTimer::new(tx);
        timer.arm();
        timer.cancel();
        match rx.recv_timeout(LABEL_TIMEOUT + Duration::from_millis(500)) {
            Err(_) => {}
            Ok(AppEvent::LabelTimeout(generation)) => {
                // The fire may have crossed the cancel; it must then be stale.
                assert!(!timer.is_current(generation));
            }
            Ok(event) => panic!("unexpected event {event:?}"),
        }
    }

    #[test]
    fn rearming_invalidates_the_previous_generation() {
        let (tx, rx) = mpsc::channel();
        let timer = LabelTimer::new(tx);
        timer.arm();
        timer.arm();
        let event = rx
            .recv_timeout(LABEL_TIMEOUT + Duration::from_millis(500))
            .expect("second timer fires");
        if let AppEvent::LabelTimeout(generation) = event {
            assert!(timer.is_current(generation));
        }
    }
}
