use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};

use crate::{RawMutex, SETTLE_DELAY};

/// Outcome of a debounce timer expiry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// The settled level differs from the recorded one, an event was raised
    Debounced,
    /// The line settled back to its recorded level
    Ignored,
    /// The line isn't debounce-eligible, nothing was sampled
    Skipped,
}

/// Per-line settle timer.
///
/// Every raw edge pushes the deadline to [`SETTLE_DELAY`] from now, so a burst
/// of bounces collapses into a single expiry once the line has been quiet for
/// the whole delay.
pub struct DebounceTimer {
    line: usize,
    deadline: Mutex<RawMutex, Cell<Option<Instant>>>,
    armed: Signal<RawMutex, ()>,
}

impl DebounceTimer {
    pub const fn new(line: usize) -> Self {
        Self {
            line,
            deadline: Mutex::new(Cell::new(None)),
            armed: Signal::new(),
        }
    }

    /// Index of the line owning this timer
    pub fn line(&self) -> usize {
        self.line
    }

    /// Replace any pending deadline by `now + SETTLE_DELAY`.
    ///
    /// Never blocks and never awaits, it's safe to call from interrupt context.
    pub fn rearm(&self) {
        let deadline = Instant::now() + SETTLE_DELAY;
        self.deadline.lock(|d| d.set(Some(deadline)));
        self.armed.signal(());
    }

    /// Drop the pending deadline, if any.
    pub fn disarm(&self) {
        self.deadline.lock(|d| d.set(None));
        self.armed.reset();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.lock(|d| d.get())
    }

    pub fn is_armed(&self) -> bool {
        self.deadline().is_some()
    }

    /// Wait until the timer expires, then disarm it.
    ///
    /// Dropping the returned future cancels the wait without firing.
    pub async fn expired(&self) {
        loop {
            let Some(deadline) = self.deadline() else {
                self.armed.wait().await;
                continue;
            };

            Timer::at(deadline).await;

            // A rearm during the sleep moved the deadline, keep waiting for that one
            let fired = self.deadline.lock(|d| {
                if d.get() == Some(deadline) {
                    d.set(None);
                    true
                } else {
                    false
                }
            });
            if fired {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_extends_deadline() {
        let timer = DebounceTimer::new(3);
        assert_eq!(timer.line(), 3);
        assert!(!timer.is_armed());

        timer.rearm();
        let first = timer.deadline().unwrap();
        timer.rearm();
        let second = timer.deadline().unwrap();
        assert!(second >= first);

        timer.disarm();
        assert!(!timer.is_armed());
    }
}
