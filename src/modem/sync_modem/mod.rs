// src/modem/sync_modem/mod.rs

use crate::common::{
    config::ModemConfig,
    hal_traits::{ModemSerial, NoWakePin},
    response::EngineeringSnapshot,
    sleep::SleepMode,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

mod io_helpers;
mod network;
mod sockets;
mod transaction;
mod wake;

pub use sockets::HostName;
pub use transaction::{Completion, Exchange};

/// Represents a BC660 modem driven over a serial channel, for SYNCHRONOUS operations.
///
/// One instance owns the channel; exactly one command is in flight at a time and
/// every operation blocks the caller until its reply is complete or its budget
/// is spent.
#[derive(Debug)]
pub struct SyncModem<S, D, P = NoWakePin>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    serial: S,
    delay: D,
    wake_pin: Option<P>,
    config: ModemConfig,
    sleep_mode: SleepMode,
    /// Set once the lazy sleep mode query has run and failed.
    sleep_query_failed: bool,
    connect_id: u8,
    udp_remote: Option<(HostName, u16)>,
    engineering: EngineeringSnapshot,
}

impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    /// `wake_pin` is the output driving PSM_EINT; `None` wakes the modem with an
    /// `AT` probe instead.
    pub fn new(serial: S, delay: D, wake_pin: Option<P>) -> Self {
        Self::with_config(serial, delay, wake_pin, ModemConfig::default())
    }

    pub fn with_config(serial: S, delay: D, wake_pin: Option<P>, config: ModemConfig) -> Self {
        SyncModem {
            serial,
            delay,
            wake_pin,
            config,
            sleep_mode: SleepMode::Unknown,
            sleep_query_failed: false,
            connect_id: 0,
            udp_remote: None,
            engineering: EngineeringSnapshot::default(),
        }
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Last sleep mode read from or written to the modem.
    pub fn sleep_mode(&self) -> SleepMode {
        self.sleep_mode
    }

    /// Result of the last `engineering_data()` refresh.
    pub fn engineering(&self) -> &EngineeringSnapshot {
        &self.engineering
    }

    /// Gives the peripherals back.
    pub fn release(self) -> (S, D, Option<P>) {
        (self.serial, self.delay, self.wake_pin)
    }
}
