use core::fmt;

/// Errors surfaced by the monitor and the output command path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The edge source of `line` could not be acquired during activation.
    /// Every source registered before it has been released again.
    ResourceUnavailable { line: usize },
    /// Output line out of range, or an unknown command opcode.
    InvalidArgument,
    /// `activate()` was called on a device that is already active.
    AlreadyActive,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceUnavailable { line } => write!(f, "edge source for input line {} is unavailable", line),
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::AlreadyActive => f.write_str("device is already active"),
        }
    }
}

impl core::error::Error for Error {}
