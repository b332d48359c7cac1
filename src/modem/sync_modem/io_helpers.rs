// src/modem/sync_modem/io_helpers.rs

use super::transaction::{Completion, Exchange};
use super::SyncModem;
use crate::common::{buffer::ResponseBuffer, error::ModemError, hal_traits::ModemSerial, timing};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};
use nb::Result as NbResult;

/// What ends the polling of a reply.
#[derive(Debug, Copy, Clone)]
pub(super) enum StopCondition<'a> {
    /// This many logical lines have been stored.
    Lines(usize),
    /// The text occurs somewhere in the stored bytes.
    Substring(&'a [u8]),
}

impl StopCondition<'_> {
    fn is_met<const N: usize>(&self, buffer: &ResponseBuffer<N>) -> bool {
        match self {
            StopCondition::Lines(lines) => buffer.line_count() >= *lines,
            StopCondition::Substring(needle) => buffer.matches(needle),
        }
    }
}

// Implementation block for I/O related helpers
impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_budget<FN, T>(
        &mut self,
        budget_ms: u32,
        mut f: FN,
    ) -> Result<T, ModemError<S::Error>>
    where
        FN: FnMut(&mut S) -> NbResult<T, S::Error>,
    {
        let poll_ms = self.config.poll_interval_ms.max(1);
        let mut budget = budget_ms;

        loop {
            if self.serial.is_closed() {
                return Err(ModemError::ChannelClosed);
            }
            match f(&mut self.serial) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if budget == 0 {
                        return Err(ModemError::Timeout);
                    }
                    self.delay.delay_ms(poll_ms);
                    budget = budget.saturating_sub(poll_ms);
                }
                Err(nb::Error::Other(e)) => return Err(ModemError::Io(e)),
            }
        }
    }

    /// Throws away whatever the modem sent since the last transaction
    /// (late URCs, the tail of a timed-out reply).
    pub(super) fn discard_pending(&mut self) -> Result<(), ModemError<S::Error>> {
        let mut discarded = 0usize;
        loop {
            let available = self.serial.bytes_available().map_err(ModemError::Io)?;
            if available == 0 {
                break;
            }
            for _ in 0..available {
                match self.serial.read_byte() {
                    Ok(_) => discarded += 1,
                    Err(nb::Error::WouldBlock) => break,
                    Err(nb::Error::Other(e)) => return Err(ModemError::Io(e)),
                }
            }
        }
        if discarded > 0 {
            debug!("discarded {} stale bytes", discarded);
        }
        Ok(())
    }

    /// Writes raw bytes and waits for the transmit buffer to drain.
    pub(super) fn write_all(&mut self, bytes: &[u8]) -> Result<(), ModemError<S::Error>> {
        for &byte in bytes {
            self.execute_blocking_io_with_budget(timing::WRITE_TIMEOUT_MS, |serial| {
                serial.write_byte(byte)
            })?;
        }
        self.execute_blocking_io_with_budget(timing::WRITE_TIMEOUT_MS, |serial| serial.flush())
    }

    /// Sends one command line.
    pub(super) fn send_line(&mut self, command: &str) -> Result<(), ModemError<S::Error>> {
        debug!("--> {}", command);
        for &byte in command.as_bytes().iter().chain(b"\r\n") {
            self.execute_blocking_io_with_budget(timing::WRITE_TIMEOUT_MS, |serial| {
                serial.write_byte(byte)
            })?;
        }
        self.execute_blocking_io_with_budget(timing::WRITE_TIMEOUT_MS, |serial| serial.flush())
    }

    /// Collects a reply until `stop` holds, the buffer overflows or the budget runs out.
    ///
    /// The budget is decremented by `poll_interval_ms` per idle poll rather than
    /// compared against a clock, so a reply that never completes returns after
    /// `timeout_ms` of accumulated delay. Bytes are consumed one at a time and the
    /// stop condition is checked after each, so polling ends on the exact byte that
    /// completes it; anything after that byte stays in the channel.
    pub(super) fn poll_reply(
        &mut self,
        stop: StopCondition<'_>,
        timeout_ms: u32,
    ) -> Result<Exchange, ModemError<S::Error>> {
        let poll_ms = self.config.poll_interval_ms.max(1);
        let mut budget = timeout_ms;
        let mut buffer = ResponseBuffer::new();

        let completion = 'poll: loop {
            if self.serial.is_closed() {
                return Err(ModemError::ChannelClosed);
            }

            let available = self.serial.bytes_available().map_err(ModemError::Io)?;
            for _ in 0..available {
                let byte = match self.serial.read_byte() {
                    Ok(byte) => byte,
                    Err(nb::Error::WouldBlock) => break,
                    Err(nb::Error::Other(e)) => return Err(ModemError::Io(e)),
                };
                if buffer.append(byte).is_err() {
                    break 'poll Completion::Overflowed;
                }
                if stop.is_met(&buffer) {
                    break 'poll Completion::Complete;
                }
            }

            // Covers conditions that hold on an empty buffer (zero lines, empty needle).
            if stop.is_met(&buffer) {
                break Completion::Complete;
            }
            if budget == 0 {
                break Completion::TimedOut;
            }
            self.delay.delay_ms(poll_ms);
            budget = budget.saturating_sub(poll_ms);
        };

        let reply = buffer.seal();
        match completion {
            Completion::Complete => debug!("<-- {}", reply.as_str()),
            Completion::TimedOut => warn!("<-- (Timeout) {}", reply.as_str()),
            Completion::Overflowed => warn!("<-- (Overflow) {}", reply.as_str()),
        }
        Ok(Exchange { reply, completion })
    }
}
