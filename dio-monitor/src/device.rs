use heapless::Vec;

use crate::error::Error;
use crate::interrupt::{EdgeSource, Trigger};
use crate::monitor::InputMonitor;
use crate::output::{OutputCommand, OutputCommandHandler};
use crate::register::{InputRegister, OutputRegister};
use crate::state::Snapshot;

/// The device exposed to the consumer: `N` debounced inputs, `M` outputs and
/// the edge sources behind the inputs.
///
/// The [`InputMonitor`] is borrowed because the edge context needs to reach it
/// too, typically through a `static`. Its [`run`](InputMonitor::run) future
/// has to be driven by a task for input events to be produced.
pub struct IoDevice<'a, R, O, E, const N: usize, const M: usize>
where
    R: InputRegister,
    O: OutputRegister,
    E: EdgeSource,
{
    monitor: &'a InputMonitor<R, N>,
    outputs: OutputCommandHandler<O, M>,
    edges: E,
    /// Registered edge sources, in line order
    handles: Vec<E::Handle, N>,
}

impl<'a, R, O, E, const N: usize, const M: usize> IoDevice<'a, R, O, E, N, M>
where
    R: InputRegister,
    O: OutputRegister,
    E: EdgeSource,
{
    pub fn new(monitor: &'a InputMonitor<R, N>, outputs: O, edges: E) -> Self {
        Self {
            monitor,
            outputs: OutputCommandHandler::new(outputs),
            edges,
            handles: Vec::new(),
        }
    }

    pub fn monitor(&self) -> &'a InputMonitor<R, N> {
        self.monitor
    }

    pub fn is_active(&self) -> bool {
        self.monitor.is_active()
    }

    /// Reset the input state, configure the lines and register one edge source
    /// per input line.
    ///
    /// If any registration fails, the sources registered so far are released
    /// and the device stays inactive.
    pub fn activate(&mut self) -> Result<(), Error> {
        if self.monitor.is_active() {
            warn!("Device is already active");
            return Err(Error::AlreadyActive);
        }

        self.monitor.reset();
        self.monitor.configure_inputs();
        self.outputs.configure_outputs();

        let monitor = self.monitor;
        for (line, config) in monitor.lines().iter().enumerate() {
            match self.edges.register_edge_source(line, config.name, Trigger::Both) {
                Ok(handle) => {
                    if let Err(e) = self.track_handle(line, handle) {
                        self.release_edge_sources();
                        return Err(e);
                    }
                }
                Err(_) => {
                    error!("Failed to register edge source of input line {} ({})", line, config.name);
                    self.release_edge_sources();
                    return Err(Error::ResourceUnavailable { line });
                }
            }
        }

        self.monitor.set_active();
        info!("Device activated, {} inputs, {} outputs", N, M);
        Ok(())
    }

    /// Stop the debounce timers, wait until none of them can fire, then
    /// release the edge sources. Release errors are only logged.
    pub async fn deactivate(&mut self) {
        if !self.monitor.is_active() {
            warn!("Device isn't active");
            return;
        }

        self.monitor.shutdown().await;
        self.release_edge_sources();
        info!("Device deactivated");
    }

    /// Wait for the next input event, then return the state of every input.
    pub async fn wait_and_read_snapshot(&self) -> Snapshot<N> {
        self.monitor.wait_and_read_snapshot().await
    }

    pub fn try_read_snapshot(&self) -> Option<Snapshot<N>> {
        self.monitor.try_read_snapshot()
    }

    pub fn set_output(&mut self, line: usize, active: bool) -> Result<(), Error> {
        self.outputs.set_output(line, active)
    }

    pub fn execute(&mut self, command: OutputCommand) -> Result<(), Error> {
        self.outputs.execute(command)
    }

    pub fn is_output_active(&mut self, line: usize) -> Result<bool, Error> {
        self.outputs.is_output_active(line)
    }

    /// Keep `handle` for release, or give it back right away if there's no
    /// slot left for it.
    fn track_handle(&mut self, line: usize, handle: E::Handle) -> Result<(), Error> {
        if let Err(handle) = self.handles.push(handle) {
            error!("No slot left for the edge source of input line {}", line);
            if self.edges.unregister(handle).is_err() {
                warn!("Failed to release edge source of input line {}", line);
            }
            return Err(Error::ResourceUnavailable { line });
        }
        Ok(())
    }

    fn release_edge_sources(&mut self) {
        while let Some(handle) = self.handles.pop() {
            let line = self.handles.len();
            if self.edges.unregister(handle).is_err() {
                warn!("Failed to release edge source of input line {}", line);
            } else {
                trace!("Released edge source of input line {}", line);
            }
        }
    }
}
