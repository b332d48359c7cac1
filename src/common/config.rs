// src/common/config.rs

use super::timing;

/// Tunables of a `SyncModem` instance.
///
/// `Default` gives the values the BC660 hardware guide recommends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModemConfig {
    /// Baud rate applied to the serial channel in `begin()`.
    pub baud_rate: u32,
    /// Delay between two polls of the channel; also the budget decrement per poll.
    pub poll_interval_ms: u32,
    /// How long the wake pin is held high.
    pub wake_pulse_ms: u32,
    /// Settle time after a wake, pin or probe.
    pub wake_settle_ms: u32,
    /// Budget for the wake probe and plain `OK` commands.
    pub default_timeout_ms: u32,
}

impl ModemConfig {
    pub const fn new() -> Self {
        ModemConfig {
            baud_rate: timing::BAUD_RATE,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            wake_pulse_ms: timing::WAKE_PIN_PULSE_MS,
            wake_settle_ms: timing::WAKE_SETTLE_MS,
            default_timeout_ms: timing::DEFAULT_TIMEOUT_MS,
        }
    }

    pub const fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// A zero interval would never consume the budget; it is clamped to 1 ms.
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = if poll_interval_ms == 0 { 1 } else { poll_interval_ms };
        self
    }

    pub const fn with_wake_timing(mut self, pulse_ms: u32, settle_ms: u32) -> Self {
        self.wake_pulse_ms = pulse_ms;
        self.wake_settle_ms = settle_ms;
        self
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self::new()
    }
}
