// src/modem/sync_modem/wake.rs

use super::SyncModem;
use crate::common::{
    command::Command,
    error::ModemError,
    hal_traits::ModemSerial,
    response::grammar,
    sleep::SleepMode,
    timing,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{trace, warn};

impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    /// Reads the sleep configuration with `AT+QSCLK?` and caches it.
    ///
    /// Does not wake the modem first; a sleeping modem simply does not answer,
    /// which leaves the cached mode untouched and yields `UnexpectedReply`.
    pub fn query_sleep_mode(&mut self) -> Result<SleepMode, ModemError<S::Error>> {
        let reply = self.query_reply(
            &Command::QuerySleepMode,
            self.config.default_timeout_ms,
            timing::QUERY_REPLY_LINES,
        )?;

        match grammar::QSCLK_MODE.extract_int(reply.as_str()).and_then(SleepMode::from_code) {
            Some(mode) => {
                self.sleep_mode = mode;
                Ok(mode)
            }
            None => {
                warn!("no sleep mode in reply: {}", reply.as_str());
                Err(ModemError::UnexpectedReply)
            }
        }
    }

    /// Makes sure the modem is listening before a command is sent.
    ///
    /// Returns `Ok(true)` when the modem is known to be awake (sleep disabled or
    /// pin pulse given) and otherwise the outcome of the `AT` probe.
    ///
    /// The sleep mode is queried on the first wake only. If that query goes
    /// unanswered the mode stays `Unknown` and every wake pulses or probes;
    /// `query_sleep_mode` or `set_sleep_mode` can still settle it later.
    pub fn wake(&mut self) -> Result<bool, ModemError<S::Error>> {
        if !self.sleep_mode.is_known() && !self.sleep_query_failed {
            match self.query_sleep_mode() {
                Ok(mode) => trace!("sleep mode is {:?}", mode),
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => {
                    warn!("sleep mode unknown ({}), waking anyway", e);
                    self.sleep_query_failed = true;
                }
            }
        }

        if !self.sleep_mode.needs_wake() {
            trace!("sleep disabled, no wake needed");
            return Ok(true);
        }

        if let Some(pin) = self.wake_pin.as_mut() {
            trace!("pulsing wake pin");
            pin.set_high().map_err(|_| ModemError::WakePin)?;
            self.delay.delay_ms(self.config.wake_pulse_ms);
            pin.set_low().map_err(|_| ModemError::WakePin)?;
            self.delay.delay_ms(self.config.wake_settle_ms);
            return Ok(true);
        }

        trace!("waking with AT probe");
        let probe = Command::Attention.format_into()?;
        let awake = self.send_and_check_reply(&probe, "OK", self.config.default_timeout_ms)?;
        self.delay.delay_ms(self.config.wake_settle_ms);
        Ok(awake)
    }

    /// Configures the sleep mode with `AT+QSCLK=<n>`; the cache follows only
    /// once the modem acknowledged.
    pub fn set_sleep_mode(&mut self, mode: SleepMode) -> Result<(), ModemError<S::Error>> {
        let command = Command::SetSleepMode(mode);
        // Rejects `Unknown` before anything is sent.
        command.format_into()?;
        self.wake()?;
        self.require_reply(&command, "OK", self.config.default_timeout_ms)?;
        self.sleep_mode = mode;
        Ok(())
    }
}
