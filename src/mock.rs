// src/mock.rs

//! Scripted serial channel, delay and wake pin sharing one virtual clock.
//!
//! Every `flush()` of the driver (one per command line or raw payload) releases
//! the next scripted reply. Its bytes become readable at their scheduled virtual
//! times, and the clock only moves when the driver delays.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::common::hal_traits::ModemSerial;
use crate::modem::SyncModem;

const NS_PER_MS: u64 = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn now_ns(&self) -> u64 {
        self.0.get()
    }

    pub fn now_ms(&self) -> u64 {
        self.0.get() / NS_PER_MS
    }

    fn advance_ns(&self, ns: u64) {
        self.0.set(self.0.get().saturating_add(ns));
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

/// One scripted reply: chunks of bytes released `offset_ms` after the flush.
#[derive(Debug, Clone, Default)]
pub struct Script {
    chunks: Vec<(u64, Vec<u8>)>,
}

impl Script {
    pub fn silence() -> Self {
        Script::default()
    }

    pub fn now(bytes: &[u8]) -> Self {
        Script::default().then(0, bytes)
    }

    pub fn after(offset_ms: u64, bytes: &[u8]) -> Self {
        Script::default().then(offset_ms, bytes)
    }

    pub fn then(mut self, offset_ms: u64, bytes: &[u8]) -> Self {
        self.chunks.push((offset_ms, bytes.to_vec()));
        self
    }
}

#[derive(Debug)]
pub struct MockSerial {
    clock: Clock,
    incoming: VecDeque<(u64, u8)>,
    scripts: VecDeque<Script>,
    pub written: Vec<u8>,
    pub baud_rate: Option<u32>,
    pub closed: bool,
    pub fail_reads: bool,
    pub io_calls: usize,
}

impl MockSerial {
    pub fn new(clock: &Clock) -> Self {
        MockSerial {
            clock: clock.clone(),
            incoming: VecDeque::new(),
            scripts: VecDeque::new(),
            written: Vec::new(),
            baud_rate: None,
            closed: false,
            fail_reads: false,
            io_calls: 0,
        }
    }

    /// Queues the reply released by the next unanswered flush.
    pub fn script(&mut self, script: Script) {
        self.scripts.push_back(script);
    }

    pub fn reply(&mut self, bytes: &[u8]) {
        self.script(Script::now(bytes));
    }

    /// Bytes that are already waiting before anything is sent.
    pub fn stage_stale(&mut self, bytes: &[u8]) {
        let now = self.clock.now_ns();
        self.incoming.extend(bytes.iter().map(|&b| (now, b)));
    }

    pub fn written_str(&self) -> &str {
        std::str::from_utf8(&self.written).unwrap()
    }

    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    fn release_next_script(&mut self) {
        let Some(script) = self.scripts.pop_front() else {
            return;
        };
        let now = self.clock.now_ns();
        for (offset_ms, bytes) in script.chunks {
            let at = now + offset_ms * NS_PER_MS;
            self.incoming.extend(bytes.into_iter().map(|b| (at, b)));
        }
    }
}

impl ModemSerial for MockSerial {
    type Error = MockCommError;

    fn configure(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        self.io_calls += 1;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.io_calls += 1;
        if self.fail_reads {
            return Err(MockCommError);
        }
        let now = self.clock.now_ns();
        Ok(self.incoming.iter().take_while(|(at, _)| *at <= now).count())
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.io_calls += 1;
        if self.fail_reads {
            return Err(nb::Error::Other(MockCommError));
        }
        match self.incoming.front() {
            Some(&(at, byte)) if at <= self.clock.now_ns() => {
                self.incoming.pop_front();
                Ok(byte)
            }
            _ => Err(nb::Error::WouldBlock),
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        self.io_calls += 1;
        self.written.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.io_calls += 1;
        self.release_next_script();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[derive(Debug, Clone)]
pub struct MockDelay {
    clock: Clock,
}

impl MockDelay {
    pub fn new(clock: &Clock) -> Self {
        MockDelay { clock: clock.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockPinError;

impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Records `(level, time in ms)` for every transition.
#[derive(Debug, Clone)]
pub struct MockPin {
    clock: Clock,
    pub transitions: Rc<RefCell<Vec<(bool, u64)>>>,
    pub fail: bool,
}

impl MockPin {
    pub fn new(clock: &Clock) -> Self {
        MockPin { clock: clock.clone(), transitions: Rc::default(), fail: false }
    }

    fn record(&mut self, level: bool) -> Result<(), MockPinError> {
        if self.fail {
            return Err(MockPinError);
        }
        self.transitions.borrow_mut().push((level, self.clock.now_ms()));
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

// --- Modem constructors shared by the driver tests ---

pub type TestModem = SyncModem<MockSerial, MockDelay, MockPin>;

/// A modem wired without PSM_EINT; wakes go through the `AT` probe.
pub fn modem_without_pin(clock: &Clock) -> TestModem {
    SyncModem::new(MockSerial::new(clock), MockDelay::new(clock), None)
}

/// A modem with a wake pin. The returned handle sees every pin transition.
pub fn modem_with_pin(clock: &Clock) -> (TestModem, Rc<RefCell<Vec<(bool, u64)>>>) {
    let pin = MockPin::new(clock);
    let transitions = Rc::clone(&pin.transitions);
    (SyncModem::new(MockSerial::new(clock), MockDelay::new(clock), Some(pin)), transitions)
}
