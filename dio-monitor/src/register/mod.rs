//! Register-level access to the input and output lines.
//!
//! The monitor only ever needs per-bit access: [`InputRegister`] for the
//! debounce expiry path and [`OutputRegister`] for the command path. Both are
//! implemented for raw port registers ([`port`]) and for embedded-hal pins
//! ([`pin`]).

pub mod pin;
pub mod port;

pub use pin::{PinInputs, PinOutputs};
pub use port::{PortInputs, PortOutputs, PortRegisters};

/// Read access to the physical level of the input lines.
pub trait InputRegister {
    /// Put every line into input mode with pull resistors enabled.
    fn configure_inputs(&mut self) {}

    /// Physical level of `line`, `true` is electrically high.
    fn read_input_bit(&mut self, line: usize) -> bool;
}

/// Read/write access to the physical level of the output lines.
pub trait OutputRegister {
    /// Put every line into output mode.
    fn configure_outputs(&mut self) {}

    /// Physical level currently driven on `line`, `true` is electrically high.
    fn read_output_bit(&mut self, line: usize) -> bool;

    /// Drive `line` high (`true`) or low (`false`).
    fn write_output_bit(&mut self, line: usize, value: bool);
}

/// A 32-bit hardware register.
///
/// Every access is an effect on the hardware: implementations must not cache,
/// merge or reorder reads and writes.
pub trait BitRegister {
    fn read(&self) -> u32;
    fn write(&self, value: u32);
}

impl<T: BitRegister + ?Sized> BitRegister for &T {
    fn read(&self) -> u32 {
        (**self).read()
    }

    fn write(&self, value: u32) {
        (**self).write(value)
    }
}

/// Memory-mapped register accessed with volatile loads and stores.
pub struct MmioRegister {
    addr: *mut u32,
}

impl MmioRegister {
    /// Wrap an already mapped register address.
    ///
    /// # Safety
    ///
    /// `addr` must be a valid, 4-byte aligned pointer to a 32-bit register
    /// that stays mapped for as long as the returned value is used.
    pub const unsafe fn new(addr: *mut u32) -> Self {
        Self { addr }
    }
}

// The register is a fixed hardware location, not thread-owned memory.
unsafe impl Send for MmioRegister {}

impl BitRegister for MmioRegister {
    fn read(&self) -> u32 {
        // SAFETY: validity of `addr` is guaranteed by the caller of `new`
        unsafe { core::ptr::read_volatile(self.addr) }
    }

    fn write(&self, value: u32) {
        // SAFETY: validity of `addr` is guaranteed by the caller of `new`
        unsafe { core::ptr::write_volatile(self.addr, value) }
    }
}

/// Mask of `line` inside a 32-bit data register, 0 if the line doesn't fit.
pub(crate) fn bit(line: usize) -> u32 {
    u32::try_from(line)
        .ok()
        .and_then(|shift| 1u32.checked_shl(shift))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmio_register_reads_back_writes() {
        let mut word: u32 = 0;
        let reg = unsafe { MmioRegister::new(&mut word as *mut u32) };
        reg.write(0xA5);
        assert_eq!(reg.read(), 0xA5);
        reg.write(reg.read() & !1);
        assert_eq!(reg.read(), 0xA4);
    }

    #[test]
    fn bit_mask_saturates_past_register_width() {
        assert_eq!(bit(0), 1);
        assert_eq!(bit(7), 0x80);
        assert_eq!(bit(31), 0x8000_0000);
        assert_eq!(bit(32), 0);
    }
}
