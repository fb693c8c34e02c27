#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! Debounced, interrupt-driven digital input monitor.
//!
//! Raw edges are fed to [`InputMonitor::on_edge`] from interrupt context, the
//! monitor re-samples each line once it has been quiet for [`SETTLE_DELAY`],
//! and a single consumer picks up complete [`Snapshot`]s through
//! [`InputMonitor::wait_and_read_snapshot`]. Digital outputs are driven
//! synchronously through an [`OutputCommandHandler`]. [`IoDevice`] ties both
//! paths to an [`EdgeSource`] and owns the activate/deactivate lifecycle.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod debounce;
pub mod device;
pub mod error;
pub mod interrupt;
pub mod monitor;
pub mod output;
pub mod register;
pub mod state;

pub use config::LineConfig;
pub use device::IoDevice;
pub use embassy_time::Duration;
pub use error::Error;
pub use interrupt::{EdgeSource, Trigger, watch_pin_edges};
pub use monitor::InputMonitor;
pub use output::{CMD_OUTPUT_OFF, CMD_OUTPUT_ON, OutputCommand, OutputCommandHandler};
pub use register::{BitRegister, InputRegister, OutputRegister};
pub use state::{InputStateStore, Snapshot};

/// Mutex flavour used by every primitive shared with interrupt context.
pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Time a line must stay quiet after its last edge before it is sampled.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);
