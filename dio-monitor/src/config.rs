/// Static description of one digital input line.
///
/// The line index is the position of the config in the array handed to
/// [`InputMonitor::new`](crate::InputMonitor::new).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineConfig {
    /// Diagnostic label, also passed to the edge source on registration
    pub name: &'static str,
    /// Only eligible lines are sampled after the settle delay and reported
    /// in snapshots. Other lines are edge-counted only.
    pub debounce_eligible: bool,
}

impl LineConfig {
    pub const fn eligible(name: &'static str) -> Self {
        Self {
            name,
            debounce_eligible: true,
        }
    }

    pub const fn diagnostic(name: &'static str) -> Self {
        Self {
            name,
            debounce_eligible: false,
        }
    }
}
