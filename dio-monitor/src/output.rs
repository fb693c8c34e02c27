use crate::error::Error;
use crate::register::OutputRegister;

/// Opcode switching an output line on
pub const CMD_OUTPUT_ON: u32 = 1;
/// Opcode switching an output line off
pub const CMD_OUTPUT_OFF: u32 = 0;

/// Command accepted by the output path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputCommand {
    SetOutput { line: usize, active: bool },
}

impl OutputCommand {
    /// Decode a raw `(opcode, argument)` pair, the argument is the output line.
    ///
    /// Only the opcode is checked here, the line is validated against the
    /// output count when the command is executed.
    pub fn decode(opcode: u32, arg: usize) -> Result<Self, Error> {
        match opcode {
            CMD_OUTPUT_ON => Ok(OutputCommand::SetOutput { line: arg, active: true }),
            CMD_OUTPUT_OFF => Ok(OutputCommand::SetOutput { line: arg, active: false }),
            _ => {
                warn!("Unknown output opcode {}", opcode);
                Err(Error::InvalidArgument)
            }
        }
    }
}

/// Synchronous output path over `M` active-low output lines.
///
/// Activating a line clears its bit, deactivating sets it.
pub struct OutputCommandHandler<O: OutputRegister, const M: usize> {
    outputs: O,
}

impl<O: OutputRegister, const M: usize> OutputCommandHandler<O, M> {
    pub fn new(outputs: O) -> Self {
        Self { outputs }
    }

    pub fn execute(&mut self, command: OutputCommand) -> Result<(), Error> {
        match command {
            OutputCommand::SetOutput { line, active } => self.set_output(line, active),
        }
    }

    /// Activate or deactivate output `line`. Out of range lines are rejected
    /// without touching any output.
    pub fn set_output(&mut self, line: usize, active: bool) -> Result<(), Error> {
        Self::check_line(line)?;
        self.outputs.write_output_bit(line, !active);
        debug!("Output line {} active: {}", line, active);
        Ok(())
    }

    pub fn is_output_active(&mut self, line: usize) -> Result<bool, Error> {
        Self::check_line(line)?;
        Ok(!self.outputs.read_output_bit(line))
    }

    pub(crate) fn configure_outputs(&mut self) {
        self.outputs.configure_outputs();
    }

    fn check_line(line: usize) -> Result<(), Error> {
        if line < M {
            Ok(())
        } else {
            warn!("Output line {} out of range, {} outputs", line, M);
            Err(Error::InvalidArgument)
        }
    }
}
