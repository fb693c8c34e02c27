#![allow(dead_code)]

use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dio_monitor::register::{PortInputs, PortOutputs, PortRegisters};
use dio_monitor::{BitRegister, EdgeSource, InputMonitor, IoDevice, LineConfig, Trigger};
use embassy_time::{Duration, MockDriver};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Drive `fut` to completion on the mock clock.
///
/// Every time the future is pending, the clock advances by 1ms, so timers
/// fire deterministically and tests don't sleep for real. Panics after 10s of
/// simulated time.
pub fn test_block_on<F: Future>(fut: F) -> F::Output {
    const MAX_STEPS: u32 = 10_000;

    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    for _ in 0..MAX_STEPS {
        if let Poll::Ready(output) = fut.as_mut().poll(&mut cx) {
            return output;
        }
        MockDriver::get().advance(Duration::from_millis(1));
    }
    panic!("Test timeout reached");
}

/// Register backed by a shared word, clones see the same value.
#[derive(Clone, Default)]
pub struct SharedReg(Arc<AtomicU32>);

impl SharedReg {
    pub fn new(value: u32) -> Self {
        Self(Arc::new(AtomicU32::new(value)))
    }

    pub fn bit(&self, bit: usize) -> bool {
        self.read() & (1 << bit) != 0
    }

    pub fn set_bit(&self, bit: usize, high: bool) {
        if high {
            self.0.fetch_or(1 << bit, Ordering::SeqCst);
        } else {
            self.0.fetch_and(!(1 << bit), Ordering::SeqCst);
        }
    }
}

impl BitRegister for SharedReg {
    fn read(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn write(&self, value: u32) {
        self.0.store(value, Ordering::SeqCst)
    }
}

/// The three registers of a GPIO port, kept by the test to inspect and drive
/// the hardware side.
#[derive(Clone)]
pub struct FakePort {
    pub con: SharedReg,
    pub dat: SharedReg,
    pub pud: SharedReg,
}

impl FakePort {
    pub fn new(dat: u32) -> Self {
        Self {
            con: SharedReg::new(0xFFFF_FFFF),
            dat: SharedReg::new(dat),
            pud: SharedReg::new(0),
        }
    }

    pub fn registers(&self) -> PortRegisters<SharedReg> {
        PortRegisters {
            con: self.con.clone(),
            dat: self.dat.clone(),
            pud: self.pud.clone(),
        }
    }

    /// Physically press (pull low) or release (pull high) a line
    pub fn press(&self, line: usize, pressed: bool) {
        self.dat.set_bit(line, !pressed);
    }
}

#[derive(Debug, Default)]
pub struct EdgeLog {
    pub registered: Vec<(usize, &'static str, Trigger)>,
    pub unregistered: Vec<usize>,
    /// Registration of this line fails
    pub fail_register_at: Option<usize>,
    pub fail_unregister: bool,
}

/// Edge source recording registrations, the interrupts themselves are
/// simulated by calling `on_edge` from the test.
#[derive(Clone, Default)]
pub struct FakeEdgeSource {
    pub log: Rc<RefCell<EdgeLog>>,
}

#[derive(Debug)]
pub struct FakeEdgeError;

impl EdgeSource for FakeEdgeSource {
    type Handle = usize;
    type Error = FakeEdgeError;

    fn register_edge_source(&mut self, line: usize, name: &'static str, trigger: Trigger) -> Result<usize, FakeEdgeError> {
        let mut log = self.log.borrow_mut();
        if log.fail_register_at == Some(line) {
            return Err(FakeEdgeError);
        }
        log.registered.push((line, name, trigger));
        Ok(line)
    }

    fn unregister(&mut self, handle: usize) -> Result<(), FakeEdgeError> {
        let mut log = self.log.borrow_mut();
        log.unregistered.push(handle);
        if log.fail_unregister { Err(FakeEdgeError) } else { Ok(()) }
    }
}

pub const INPUT_NUM: usize = 8;
pub const OUTPUT_NUM: usize = 4;

pub type TestMonitor = InputMonitor<PortInputs<SharedReg>, INPUT_NUM>;
pub type TestDevice = IoDevice<'static, PortInputs<SharedReg>, PortOutputs<SharedReg>, FakeEdgeSource, INPUT_NUM, OUTPUT_NUM>;

/// 8 buttons, only the first 4 are debounced and reported
pub const LINES: [LineConfig; INPUT_NUM] = [
    LineConfig::eligible("KEY0"),
    LineConfig::eligible("KEY1"),
    LineConfig::eligible("KEY2"),
    LineConfig::eligible("KEY3"),
    LineConfig::diagnostic("KEY4"),
    LineConfig::diagnostic("KEY5"),
    LineConfig::diagnostic("KEY6"),
    LineConfig::diagnostic("KEY7"),
];

pub struct Bench {
    pub inputs: FakePort,
    pub outputs: FakePort,
    pub edges: FakeEdgeSource,
    pub monitor: &'static TestMonitor,
}

impl Bench {
    /// All buttons released, all outputs off
    pub fn new() -> Self {
        let inputs = FakePort::new(0xFF);
        let outputs = FakePort::new(0xF);
        // Box::leak is acceptable in tests
        let monitor = Box::leak(Box::new(InputMonitor::new(LINES, PortInputs::new(inputs.registers()))));
        Self {
            inputs,
            outputs,
            edges: FakeEdgeSource::default(),
            monitor,
        }
    }

    pub fn device(&self) -> TestDevice {
        IoDevice::new(self.monitor, PortOutputs::new(self.outputs.registers()), self.edges.clone())
    }

    pub fn active_device(&self) -> TestDevice {
        let mut device = self.device();
        device.activate().expect("activation should succeed");
        device
    }

    /// Change the level of a line and raise its edge interrupt
    pub fn edge(&self, line: usize, pressed: bool) {
        self.inputs.press(line, pressed);
        self.monitor.on_edge(line);
    }
}
