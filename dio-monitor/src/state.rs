use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::RawMutex;

/// Complete set of confirmed input levels, one per line in index order.
///
/// `true` means the line is active (pressed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot<const N: usize> {
    levels: [bool; N],
}

impl<const N: usize> Snapshot<N> {
    pub const fn new(levels: [bool; N]) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[bool; N] {
        &self.levels
    }

    pub fn is_active(&self, line: usize) -> Option<bool> {
        self.levels.get(line).copied()
    }

    /// One ASCII character per line, `b'1'` for active and `b'0'` otherwise.
    pub fn to_ascii(&self) -> [u8; N] {
        self.levels.map(|active| if active { b'1' } else { b'0' })
    }

    /// Copy the ASCII form into `buf`, truncated to the shorter of the two.
    ///
    /// Returns the number of bytes written.
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let ascii = self.to_ascii();
        let len = buf.len().min(N);
        buf[..len].copy_from_slice(&ascii[..len]);
        len
    }
}

impl<const N: usize> Default for Snapshot<N> {
    fn default() -> Self {
        Self::new([false; N])
    }
}

impl<const N: usize> fmt::Display for Snapshot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for active in self.levels {
            f.write_str(if active { "1" } else { "0" })?;
        }
        Ok(())
    }
}

struct StoreState<const N: usize> {
    levels: [bool; N],
    event_pending: bool,
}

/// Authoritative debounced levels plus the single "new event" flag.
///
/// Only the debounce expiry path writes, through [`InputStateStore::update`].
/// The consumer side clears the flag and copies the levels inside the same
/// critical section, so an update racing with a read is either part of the
/// returned snapshot or leaves the flag set for the next read.
pub struct InputStateStore<const N: usize> {
    state: Mutex<RawMutex, RefCell<StoreState<N>>>,
    // Wakes the (single) consumer, may be stale: always re-check the flag
    notify: Signal<RawMutex, ()>,
}

impl<const N: usize> Default for InputStateStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> InputStateStore<N> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(StoreState {
                levels: [false; N],
                event_pending: false,
            })),
            notify: Signal::new(),
        }
    }

    /// Forget every level and any pending event.
    pub fn reset(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.levels = [false; N];
            s.event_pending = false;
        });
        self.notify.reset();
    }

    /// Record the settled level of `line`.
    ///
    /// If it differs from the recorded one the level is stored, the event flag
    /// is raised and the consumer is woken. Returns whether the level changed.
    pub fn update(&self, line: usize, active: bool) -> bool {
        let changed = self.state.lock(|s| {
            let s = &mut *s.borrow_mut();
            match s.levels.get_mut(line) {
                Some(level) if *level != active => {
                    *level = active;
                    s.event_pending = true;
                    true
                }
                _ => false,
            }
        });
        if changed {
            self.notify.signal(());
        }
        changed
    }

    pub fn event_pending(&self) -> bool {
        self.state.lock(|s| s.borrow().event_pending)
    }

    /// Current levels, without touching the event flag.
    pub fn snapshot(&self) -> Snapshot<N> {
        self.state.lock(|s| Snapshot::new(s.borrow().levels))
    }

    /// Clear the event flag and copy the levels, if an event is pending.
    pub fn try_take(&self) -> Option<Snapshot<N>> {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.event_pending {
                s.event_pending = false;
                Some(Snapshot::new(s.levels))
            } else {
                None
            }
        })
    }

    /// Wait until an event is pending, then clear it and return all levels.
    ///
    /// Wake-ups without a pending event go back to waiting.
    pub async fn wait_and_take(&self) -> Snapshot<N> {
        loop {
            if let Some(snapshot) = self.try_take() {
                return snapshot;
            }
            self.notify.wait().await;
        }
    }
}
