use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::join::join_array;
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::RawMutex;
use crate::config::LineConfig;
use crate::debounce::{DebounceState, DebounceTimer};
use crate::register::InputRegister;
use crate::state::{InputStateStore, Snapshot};

/// The input half of the device: edge dispatch, debounce scheduling and the
/// state store the consumer reads from.
///
/// The monitor is shared by reference between three contexts:
/// - the edge context (an interrupt handler or an edge watcher task) calling [`InputMonitor::on_edge`],
/// - the expiry context, a task driving [`InputMonitor::run`], which is the only writer of the store,
/// - the consumer awaiting [`InputMonitor::wait_and_read_snapshot`].
///
/// Activation and teardown are driven by [`IoDevice`](crate::IoDevice).
pub struct InputMonitor<R: InputRegister, const N: usize> {
    lines: [LineConfig; N],
    timers: [DebounceTimer; N],
    /// Raw edges seen on each line since activation
    edge_counts: Mutex<RawMutex, RefCell<[u32; N]>>,
    store: InputStateStore<N>,
    /// Only sampled from the expiry context
    inputs: Mutex<RawMutex, RefCell<R>>,
    active: AtomicBool,
    running: AtomicBool,
    stop: Signal<RawMutex, ()>,
    drained: Signal<RawMutex, ()>,
}

impl<R: InputRegister, const N: usize> InputMonitor<R, N> {
    pub fn new(lines: [LineConfig; N], inputs: R) -> Self {
        Self {
            lines,
            timers: core::array::from_fn(DebounceTimer::new),
            edge_counts: Mutex::new(RefCell::new([0; N])),
            store: InputStateStore::new(),
            inputs: Mutex::new(RefCell::new(inputs)),
            active: AtomicBool::new(false),
            running: AtomicBool::new(false),
            stop: Signal::new(),
            drained: Signal::new(),
        }
    }

    pub fn lines(&self) -> &[LineConfig; N] {
        &self.lines
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Raw edge on `line`, in either direction.
    ///
    /// Restarts the line's settle timer and counts the edge. It doesn't touch
    /// the registers nor block, so it can be called from interrupt context.
    pub fn on_edge(&self, line: usize) {
        let Some(timer) = self.timers.get(line) else {
            warn!("Edge on unknown input line {}", line);
            return;
        };
        timer.rearm();
        self.edge_counts.lock(|counts| {
            let mut counts = counts.borrow_mut();
            counts[line] = counts[line].wrapping_add(1);
        });
        trace!("Edge on input line {}", line);
    }

    /// The settle delay of `line` elapsed without further edges.
    ///
    /// Samples the line and records its level, lines are active low. An event
    /// is raised only if the settled level differs from the recorded one.
    pub fn on_timer_expiry(&self, line: usize) -> DebounceState {
        match self.lines.get(line) {
            Some(config) if config.debounce_eligible => {}
            _ => return DebounceState::Skipped,
        }

        let level = self.inputs.lock(|inputs| inputs.borrow_mut().read_input_bit(line));
        let down = !level;
        if self.store.update(line, down) {
            debug!("Input line {} settled, active: {}", line, down);
            DebounceState::Debounced
        } else {
            trace!("Input line {} settled back to its previous level", line);
            DebounceState::Ignored
        }
    }

    /// Process debounce expiries until the monitor is deactivated.
    ///
    /// Returns immediately if the monitor isn't active. Dropping this future
    /// also stops expiry processing.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        let _guard = RunGuard {
            running: &self.running,
            drained: &self.drained,
        };
        if !self.is_active() {
            warn!("Input monitor isn't active, nothing to run");
            return;
        }

        info!("Input monitor running, {} lines", N);
        let lines: [_; N] = core::array::from_fn(|line| self.run_line(line));
        // Stop first, so that no expiry due at the same time samples after teardown began
        select(self.stop.wait(), join_array(lines)).await;
        info!("Input monitor stopped");
    }

    async fn run_line(&self, line: usize) {
        let timer = &self.timers[line];
        loop {
            timer.expired().await;
            if !self.is_active() {
                return;
            }
            self.on_timer_expiry(line);
        }
    }

    /// Wait for the next input event and return the full input state.
    pub async fn wait_and_read_snapshot(&self) -> Snapshot<N> {
        let snapshot = self.store.wait_and_take().await;
        debug!("Read input snapshot");
        snapshot
    }

    /// Return the full input state if an event is pending, clearing it.
    pub fn try_read_snapshot(&self) -> Option<Snapshot<N>> {
        self.store.try_take()
    }

    /// Current input state, the pending event is left untouched.
    pub fn snapshot(&self) -> Snapshot<N> {
        self.store.snapshot()
    }

    pub fn event_pending(&self) -> bool {
        self.store.event_pending()
    }

    pub fn edge_count(&self, line: usize) -> Option<u32> {
        self.edge_counts.lock(|counts| counts.borrow().get(line).copied())
    }

    /// Bring all state back to defaults before an activation.
    pub(crate) fn reset(&self) {
        self.store.reset();
        for timer in self.timers.iter() {
            timer.disarm();
        }
        self.edge_counts.lock(|counts| *counts.borrow_mut() = [0; N]);
        self.stop.reset();
    }

    pub(crate) fn configure_inputs(&self) {
        self.inputs.lock(|inputs| inputs.borrow_mut().configure_inputs());
    }

    pub(crate) fn set_active(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Stop expiry processing and wait until no timer can fire anymore.
    pub(crate) async fn shutdown(&self) {
        self.drained.reset();
        self.active.store(false, Ordering::SeqCst);
        self.stop.signal(());
        if self.running.load(Ordering::SeqCst) {
            self.drained.wait().await;
        }
        for timer in self.timers.iter() {
            timer.disarm();
        }
    }
}

/// Marks the end of `run`, including when its future is dropped.
struct RunGuard<'a> {
    running: &'a AtomicBool,
    drained: &'a Signal<RawMutex, ()>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.drained.signal(());
    }
}
