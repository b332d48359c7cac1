// src/modem/sync_modem/transaction.rs

use super::io_helpers::StopCondition;
use super::SyncModem;
use crate::common::{
    buffer::{Reply, RESPONSE_CAPACITY},
    command::Command,
    error::ModemError,
    hal_traits::ModemSerial,
    timing,
};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

/// How a transaction's poll loop ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Completion {
    /// The stop condition was met.
    Complete,
    /// The budget ran out first; the reply holds whatever had arrived.
    TimedOut,
    /// The reply filled the buffer; the reply holds the truncated head.
    Overflowed,
}

/// A finished transaction: the reply as received plus how the loop ended.
#[derive(Debug, Clone)]
pub struct Exchange<const N: usize = RESPONSE_CAPACITY> {
    pub reply: Reply<N>,
    pub completion: Completion,
}

impl<const N: usize> Exchange<N> {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Complete
    }

    /// The reply, only if the stop condition was met.
    pub fn complete<E: Debug>(self) -> Result<Reply<N>, ModemError<E>> {
        match self.completion {
            Completion::Complete => Ok(self.reply),
            Completion::TimedOut => Err(ModemError::Timeout),
            Completion::Overflowed => Err(ModemError::Overflow { capacity: N }),
        }
    }

    /// The reply even if it timed out, for callers that parse whatever arrived.
    /// A truncated reply is still an error.
    pub fn best_effort<E: Debug>(self) -> Result<Reply<N>, ModemError<E>> {
        match self.completion {
            Completion::Overflowed => Err(ModemError::Overflow { capacity: N }),
            Completion::TimedOut => {
                warn!("parsing incomplete reply ({} lines)", self.reply.line_count());
                Ok(self.reply)
            }
            Completion::Complete => Ok(self.reply),
        }
    }
}

impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    // --- Raw transactions (no wake) ---

    /// Sends `command` and collects the reply until it holds `lines` lines.
    pub(crate) fn send_and_wait_for_lines(
        &mut self,
        command: &str,
        timeout_ms: u32,
        lines: usize,
    ) -> Result<Exchange, ModemError<S::Error>> {
        // 1. Forget whatever arrived since the last transaction
        self.discard_pending()?;
        // 2. Send command line
        self.send_line(command)?;
        // 3. Collect reply
        self.poll_reply(StopCondition::Lines(lines), timeout_ms)
    }

    /// Sends `command` and collects the reply until `target` shows up in it.
    pub(crate) fn send_and_wait_for(
        &mut self,
        command: &str,
        target: &str,
        timeout_ms: u32,
    ) -> Result<Exchange, ModemError<S::Error>> {
        self.discard_pending()?;
        self.send_line(command)?;
        self.poll_reply(StopCondition::Substring(target.as_bytes()), timeout_ms)
    }

    /// Sends `command` and reports whether its first line contains `expected`.
    ///
    /// A timeout and a wrong answer both give `Ok(false)`; only channel failures
    /// are errors.
    pub(crate) fn send_and_check_reply(
        &mut self,
        command: &str,
        expected: &str,
        timeout_ms: u32,
    ) -> Result<bool, ModemError<S::Error>> {
        let exchange = self.send_and_wait_for_lines(command, timeout_ms, timing::CHECK_REPLY_LINES)?;
        Ok(exchange.reply.contains(expected))
    }

    /// Collects a reply without sending anything first.
    pub(crate) fn read_reply(
        &mut self,
        timeout_ms: u32,
        lines: usize,
    ) -> Result<Exchange, ModemError<S::Error>> {
        self.poll_reply(StopCondition::Lines(lines), timeout_ms)
    }

    // --- Public transactions ---

    /// Wakes the modem, sends `command` and waits for `lines` reply lines.
    ///
    /// The exchange is returned as is; use [`Exchange::complete`] to treat a
    /// timeout as an error.
    pub fn command_lines(
        &mut self,
        command: &Command<'_>,
        timeout_ms: u32,
        lines: usize,
    ) -> Result<Exchange, ModemError<S::Error>> {
        let text = command.format_into()?;
        self.wake()?;
        self.send_and_wait_for_lines(&text, timeout_ms, lines)
    }

    /// Wakes the modem, sends `command` and waits until `target` occurs in the reply.
    pub fn command_until(
        &mut self,
        command: &Command<'_>,
        target: &str,
        timeout_ms: u32,
    ) -> Result<Exchange, ModemError<S::Error>> {
        let text = command.format_into()?;
        self.wake()?;
        self.send_and_wait_for(&text, target, timeout_ms)
    }

    /// Wakes the modem, sends `command` and checks its first reply line for `expected`.
    pub fn check_reply(
        &mut self,
        command: &Command<'_>,
        expected: &str,
        timeout_ms: u32,
    ) -> Result<bool, ModemError<S::Error>> {
        let text = command.format_into()?;
        self.wake()?;
        self.send_and_check_reply(&text, expected, timeout_ms)
    }

    /// Runs a query without waking and hands back whatever reply arrived.
    /// Only an overflowing reply is an error.
    pub(super) fn query_reply(
        &mut self,
        command: &Command<'_>,
        timeout_ms: u32,
        lines: usize,
    ) -> Result<Reply, ModemError<S::Error>> {
        let text = command.format_into()?;
        self.send_and_wait_for_lines(&text, timeout_ms, lines)?
            .best_effort::<S::Error>()
    }

    /// `check_reply` that turns a missing `expected` into [`ModemError::Rejected`].
    pub(super) fn require_reply(
        &mut self,
        command: &Command<'_>,
        expected: &str,
        timeout_ms: u32,
    ) -> Result<(), ModemError<S::Error>> {
        let text = command.format_into()?;
        if self.send_and_check_reply(&text, expected, timeout_ms)? {
            Ok(())
        } else {
            Err(ModemError::Rejected)
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::sleep::SleepMode;
    use crate::mock::{modem_without_pin, Clock, MockCommError, Script, TestModem};

    /// A modem that already knows sleep is disabled, so wakes do no I/O.
    fn awake_modem(clock: &Clock) -> TestModem {
        let mut modem = modem_without_pin(clock);
        modem.sleep_mode = SleepMode::Disabled;
        modem
    }

    #[test]
    fn test_exchange_complete_and_best_effort() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(b"\r\n+CSQ: 14,2\r\n");

        let exchange = modem.send_and_wait_for_lines("AT+CSQ", 1_000, 3).unwrap();
        assert!(!exchange.is_complete());
        assert!(matches!(exchange.clone().complete::<MockCommError>(), Err(ModemError::Timeout)));
        let reply = exchange.best_effort::<MockCommError>().unwrap();
        assert_eq!(reply.as_str(), "+CSQ: 14,2\n");
    }

    #[test]
    fn test_timeout_returns_after_budget() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.script(Script::silence());

        let exchange = modem.send_and_wait_for_lines("AT+CSQ", 1_000, 3).unwrap();
        assert_eq!(exchange.completion, Completion::TimedOut);
        assert!(exchange.reply.is_empty());
        // Budget of 1000 ms plus at most one poll interval of slack.
        assert!(clock.now_ms() >= 1_000 && clock.now_ms() <= 1_001);
    }

    #[test]
    fn test_stale_bytes_are_discarded_before_send() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.stage_stale(b"\r\n+CEREG: 1\r\n");
        modem.serial.reply(b"\r\nOK\r\n");

        let reply = modem.send_and_wait_for_lines("AT", 1_000, 1).unwrap().complete::<MockCommError>().unwrap();
        assert_eq!(reply.as_str(), "OK\n");
    }

    #[test]
    fn test_substring_stops_early() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(b"\r\n> tail");

        let exchange = modem.send_and_wait_for("AT+QISEND=0,\"h\",1,4", "> ", 5_000).unwrap();
        assert!(exchange.is_complete());
        assert_eq!(exchange.reply.as_str(), "> ");
        assert_eq!(modem.serial.pending(), "tail".len());
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_check_reply_is_repeatable() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(b"\r\nOK\r\n");
        modem.serial.reply(b"\r\nOK\r\n");

        assert!(modem.check_reply(&Command::Attention, "OK", 1_000).unwrap());
        assert!(modem.check_reply(&Command::Attention, "OK", 1_000).unwrap());
        assert_eq!(modem.serial.written_str(), "AT\r\nAT\r\n");
    }

    #[test]
    fn test_check_reply_false_on_error_or_silence() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(b"\r\nERROR\r\n");
        modem.serial.script(Script::silence());

        assert!(!modem.check_reply(&Command::EchoOff, "OK", 1_000).unwrap());
        assert!(!modem.check_reply(&Command::EchoOff, "OK", 1_000).unwrap());
    }

    #[test]
    fn test_require_reply_maps_to_rejected() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(b"\r\nERROR\r\n");
        let result = modem.require_reply(&Command::EchoOff, "OK", 1_000);
        assert!(matches!(result, Err(ModemError::Rejected)));
    }

    #[test]
    fn test_channel_closed_is_an_error() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.closed = true;
        let result = modem.command_lines(&Command::SignalQuality, 1_000, 3);
        assert!(matches!(result, Err(ModemError::ChannelClosed)));
    }

    #[test]
    fn test_io_error_is_propagated() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.fail_reads = true;
        let result = modem.check_reply(&Command::Attention, "OK", 1_000);
        assert!(matches!(result, Err(ModemError::Io(MockCommError))));
    }

    #[test]
    fn test_overflow_is_reported() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.reply(&[b'A'; 300]);
        let exchange = modem.command_lines(&Command::EngineeringData, 1_000, 3).unwrap();
        assert_eq!(exchange.completion, Completion::Overflowed);
        assert!(matches!(
            exchange.best_effort::<MockCommError>(),
            Err(ModemError::Overflow { capacity: RESPONSE_CAPACITY })
        ));
    }

    #[test]
    fn test_read_reply_does_not_send() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        modem.serial.stage_stale(b"\r\nSEND OK\r\n");
        let reply = modem.read_reply(5_000, 1).unwrap().complete::<MockCommError>().unwrap();
        assert_eq!(reply.as_str(), "SEND OK\n");
        assert!(modem.serial.written.is_empty());
    }

    #[test]
    fn test_unformattable_command_sends_nothing() {
        let clock = Clock::default();
        let mut modem = awake_modem(&clock);
        let result = modem.command_lines(&Command::SetSleepMode(SleepMode::Unknown), 1_000, 1);
        assert!(matches!(result, Err(ModemError::CommandFormat(_))));
        assert!(modem.serial.written.is_empty());
    }
}
