use embedded_hal::digital::{InputPin, StatefulOutputPin};

use super::{InputRegister, OutputRegister};

/// Input lines backed by embedded-hal input pins, line `n` is `pins[n]`.
///
/// A failed or out-of-range read is reported as high, which is the idle
/// level of a pulled-up line.
pub struct PinInputs<P: InputPin, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> PinInputs<P, N> {
    /// Create from pins that are already configured as inputs with pull-ups.
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> InputRegister for PinInputs<P, N> {
    fn read_input_bit(&mut self, line: usize) -> bool {
        self.pins
            .get_mut(line)
            .map(|pin| pin.is_high().unwrap_or(true))
            .unwrap_or(true)
    }
}

/// Output lines backed by embedded-hal stateful output pins, line `n` is `pins[n]`.
pub struct PinOutputs<P: StatefulOutputPin, const M: usize> {
    pins: [P; M],
}

impl<P: StatefulOutputPin, const M: usize> PinOutputs<P, M> {
    pub fn new(pins: [P; M]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; M] {
        self.pins
    }
}

impl<P: StatefulOutputPin, const M: usize> OutputRegister for PinOutputs<P, M> {
    fn read_output_bit(&mut self, line: usize) -> bool {
        self.pins
            .get_mut(line)
            .map(|pin| pin.is_set_high().unwrap_or(true))
            .unwrap_or(true)
    }

    fn write_output_bit(&mut self, line: usize, value: bool) {
        if let Some(pin) = self.pins.get_mut(line) {
            if value {
                pin.set_high().ok();
            } else {
                pin.set_low().ok();
            }
        }
    }
}
