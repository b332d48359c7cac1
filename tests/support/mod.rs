// tests/support/mod.rs

//! Scripted serial channel for driving `SyncModem` through its public API.
//!
//! Each flush by the driver releases the next scripted reply; its chunks become
//! readable at their offsets on a virtual clock that only the delay advances.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use bc660::common::ModemSerial;
use bc660::SyncModem;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

const NS_PER_MS: u64 = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn now_ms(&self) -> u64 {
        self.0.get() / NS_PER_MS
    }

    fn now_ns(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelError;

#[derive(Debug, Default)]
struct Channel {
    incoming: VecDeque<(u64, u8)>,
    scripts: VecDeque<Vec<(u64, Vec<u8>)>>,
    written: Vec<u8>,
}

/// Test-side view of the channel, usable while the modem owns the serial port.
#[derive(Debug, Clone)]
pub struct ChannelHandle(Rc<RefCell<Channel>>);

impl ChannelHandle {
    pub fn reply(&self, bytes: &[u8]) {
        self.reply_chunks(vec![(0, bytes.to_vec())]);
    }

    pub fn silence(&self) {
        self.reply_chunks(Vec::new());
    }

    /// `(offset_ms, bytes)` pairs released by one flush.
    pub fn reply_chunks(&self, chunks: Vec<(u64, Vec<u8>)>) {
        self.0.borrow_mut().scripts.push_back(chunks);
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().written).into_owned()
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().incoming.len()
    }
}

#[derive(Debug)]
pub struct ScriptedSerial {
    clock: Clock,
    channel: Rc<RefCell<Channel>>,
}

impl ModemSerial for ScriptedSerial {
    type Error = ChannelError;

    fn configure(&mut self, _baud_rate: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        let now = self.clock.now_ns();
        Ok(self.channel.borrow().incoming.iter().take_while(|(at, _)| *at <= now).count())
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        let now = self.clock.now_ns();
        let mut channel = self.channel.borrow_mut();
        match channel.incoming.front() {
            Some(&(at, byte)) if at <= now => {
                channel.incoming.pop_front();
                Ok(byte)
            }
            _ => Err(nb::Error::WouldBlock),
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        self.channel.borrow_mut().written.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        let now = self.clock.now_ns();
        let mut channel = self.channel.borrow_mut();
        if let Some(chunks) = channel.scripts.pop_front() {
            for (offset_ms, bytes) in chunks {
                let at = now + offset_ms * NS_PER_MS;
                channel.incoming.extend(bytes.into_iter().map(|b| (at, b)));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct VirtualDelay(Clock);

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0 .0.set(self.0.now_ns() + u64::from(ns));
    }
}

/// Wake pin recording `(level, ms)` per transition.
#[derive(Debug)]
pub struct RecordingPin {
    clock: Clock,
    pub log: Rc<RefCell<Vec<(bool, u64)>>>,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((false, self.clock.now_ms()));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((true, self.clock.now_ms()));
        Ok(())
    }
}

pub type TestModem = SyncModem<ScriptedSerial, VirtualDelay, RecordingPin>;

pub fn modem(clock: &Clock) -> (TestModem, ChannelHandle) {
    let channel = Rc::new(RefCell::new(Channel::default()));
    let serial = ScriptedSerial { clock: clock.clone(), channel: Rc::clone(&channel) };
    (SyncModem::new(serial, VirtualDelay(clock.clone()), None), ChannelHandle(channel))
}

pub fn modem_with_pin(clock: &Clock) -> (TestModem, ChannelHandle, Rc<RefCell<Vec<(bool, u64)>>>) {
    let channel = Rc::new(RefCell::new(Channel::default()));
    let serial = ScriptedSerial { clock: clock.clone(), channel: Rc::clone(&channel) };
    let log = Rc::new(RefCell::new(Vec::new()));
    let pin = RecordingPin { clock: clock.clone(), log: Rc::clone(&log) };
    (SyncModem::new(serial, VirtualDelay(clock.clone()), Some(pin)), ChannelHandle(channel), log)
}

/// A modem that has learned sleep is disabled, so later commands skip the wake step.
pub fn awake_modem(clock: &Clock) -> (TestModem, ChannelHandle) {
    let (mut modem, channel) = modem(clock);
    channel.reply(b"\r\n+QSCLK: 0\r\n\r\nOK\r\n");
    modem.query_sleep_mode().expect("sleep mode query");
    (modem, channel)
}

/// Milliseconds of virtual time passed since `start_ms`.
pub fn elapsed_since(clock: &Clock, start_ms: u64) -> u64 {
    clock.now_ms() - start_ms
}
