//! Edge sources feeding [`InputMonitor::on_edge`].

use core::pin::pin;

use embassy_futures::select::select_slice;
use embassy_time::{Instant, Timer};
use embedded_hal_async::digital::Wait;

use crate::SETTLE_DELAY;
use crate::monitor::InputMonitor;
use crate::register::InputRegister;

/// Edge sensitivity of an interrupt source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    Rising,
    Falling,
    Both,
}

/// Platform facility for registering per-line edge interrupts.
///
/// The interrupt handler installed for a registered line must call
/// [`InputMonitor::on_edge`] with the line index and nothing else.
pub trait EdgeSource {
    /// Keeps the interrupt source alive until passed back to `unregister`
    type Handle;
    type Error;

    fn register_edge_source(
        &mut self,
        line: usize,
        name: &'static str,
        trigger: Trigger,
    ) -> Result<Self::Handle, Self::Error>;

    fn unregister(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;
}

/// Edge feed for pins that implement embedded-hal-async [`Wait`], pin `n`
/// drives line `n`.
///
/// Waits for an edge on any pin and dispatches it to the monitor, forever.
/// A pin whose wait fails is only waited on again after [`SETTLE_DELAY`], the
/// other pins are watched meanwhile. Drop the future to stop watching.
pub async fn watch_pin_edges<R: InputRegister, W: Wait, const N: usize>(
    monitor: &InputMonitor<R, N>,
    pins: &mut [W; N],
) {
    let mut retry_at: [Option<Instant>; N] = [None; N];
    loop {
        let mut index = 0;
        let futs = pins.each_mut().map(|pin| {
            let retry = retry_at[index];
            index += 1;
            async move {
                if let Some(at) = retry {
                    Timer::at(at).await;
                }
                pin.wait_for_any_edge().await
            }
        });
        let (result, line) = select_slice(pin!(futs)).await;
        if result.is_err() {
            warn!("Waiting for an edge on input line {} failed", line);
            retry_at[line] = Some(Instant::now() + SETTLE_DELAY);
            continue;
        }
        retry_at[line] = None;
        monitor.on_edge(line);
    }
}
