use super::{BitRegister, InputRegister, OutputRegister, bit};

/// Function select value putting every pin of a port into input mode.
/// The control register carries 4 bits per pin.
pub const CON_ALL_INPUT: u32 = 0x0000_0000;
/// Function select value putting every pin of a port into output mode.
pub const CON_ALL_OUTPUT: u32 = 0x1111_1111;
/// Pull select value enabling the pull-up of all 8 pins, 2 bits per pin.
pub const PUD_ALL_PULL_UP: u32 = 0xAAAA;

/// The registers of one GPIO port that the monitor touches.
pub struct PortRegisters<Reg: BitRegister> {
    /// Configuration (function select) register
    pub con: Reg,
    /// Data register, bit `n` is the level of pin `n`
    pub dat: Reg,
    /// Pull-up/down register
    pub pud: Reg,
}

/// Input lines backed by the data register of a GPIO port.
pub struct PortInputs<Reg: BitRegister> {
    port: PortRegisters<Reg>,
}

impl<Reg: BitRegister> PortInputs<Reg> {
    pub fn new(port: PortRegisters<Reg>) -> Self {
        Self { port }
    }
}

impl<Reg: BitRegister> InputRegister for PortInputs<Reg> {
    fn configure_inputs(&mut self) {
        self.port.con.write(CON_ALL_INPUT);
        self.port.pud.write(PUD_ALL_PULL_UP);
    }

    fn read_input_bit(&mut self, line: usize) -> bool {
        match bit(line) {
            // Not in the register, reads as idle
            0 => true,
            mask => self.port.dat.read() & mask != 0,
        }
    }
}

/// Output lines backed by the data register of a GPIO port.
///
/// Writes are read-modify-write on the data register, so only the addressed
/// bit changes.
pub struct PortOutputs<Reg: BitRegister> {
    port: PortRegisters<Reg>,
}

impl<Reg: BitRegister> PortOutputs<Reg> {
    pub fn new(port: PortRegisters<Reg>) -> Self {
        Self { port }
    }
}

impl<Reg: BitRegister> OutputRegister for PortOutputs<Reg> {
    fn configure_outputs(&mut self) {
        self.port.con.write(CON_ALL_OUTPUT);
    }

    fn read_output_bit(&mut self, line: usize) -> bool {
        self.port.dat.read() & bit(line) != 0
    }

    fn write_output_bit(&mut self, line: usize, value: bool) {
        let dat = self.port.dat.read();
        if value {
            self.port.dat.write(dat | bit(line));
        } else {
            self.port.dat.write(dat & !bit(line));
        }
    }
}
