// src/modem/sync_modem/network.rs

//! Start-up, radio and network status queries.

use super::SyncModem;
use crate::common::{
    command::Command,
    error::ModemError,
    hal_traits::ModemSerial,
    response::{
        grammar, truncated, ClockText, EngineeringSnapshot, FieldSpec, FirmwareVersion, ModemClock,
        RegistrationStatus, SignalQuality,
    },
    timing,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    /// Brings the link up: applies the baud rate, wakes the modem (learning its
    /// sleep mode on the way) and switches command echo off.
    pub fn begin(&mut self) -> Result<(), ModemError<S::Error>> {
        self.serial.configure(self.config.baud_rate).map_err(ModemError::Io)?;
        self.wake()?;

        if !self.sleep_mode.is_known() {
            match self.query_sleep_mode() {
                Ok(_) => {}
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => warn!("sleep mode still unknown after wake: {}", e),
            }
        }

        self.require_reply(&Command::EchoOff, "OK", self.config.default_timeout_ms)?;
        info!("modem ready, sleep mode {:?}", self.sleep_mode);
        Ok(())
    }

    // --- Radio ---

    /// `AT+CSQ`. Fields missing from the reply read as 99 (not detectable).
    pub fn signal_quality(&mut self) -> Result<SignalQuality, ModemError<S::Error>> {
        self.wake()?;
        let reply = self.query_reply(
            &Command::SignalQuality,
            self.config.default_timeout_ms,
            timing::QUERY_REPLY_LINES,
        )?;
        let text = reply.as_str();

        let field = |spec: &FieldSpec| {
            spec.extract_int(text)
                .and_then(|value| u8::try_from(value).ok())
                .unwrap_or(SignalQuality::NOT_DETECTABLE)
        };
        let quality = SignalQuality { rssi_raw: field(&grammar::CSQ_RSSI), ber_raw: field(&grammar::CSQ_BER) };
        if quality == SignalQuality::UNKNOWN {
            warn!("no signal quality in reply: {}", text);
        }
        Ok(quality)
    }

    /// Received signal strength in dBm, `None` if not detectable.
    pub fn rssi(&mut self) -> Result<Option<i16>, ModemError<S::Error>> {
        Ok(self.signal_quality()?.rssi_dbm())
    }

    /// Channel bit error rate as RXQUAL 0..=7, `None` if not detectable.
    pub fn ber(&mut self) -> Result<Option<u8>, ModemError<S::Error>> {
        Ok(self.signal_quality()?.ber())
    }

    // --- Registration ---

    /// `AT+CEREG?`. A reply without `<stat>` gives [`RegistrationStatus::Unknown`].
    pub fn registration_status(&mut self) -> Result<RegistrationStatus, ModemError<S::Error>> {
        self.wake()?;
        let reply = self.query_reply(
            &Command::RegistrationStatus,
            self.config.default_timeout_ms,
            timing::QUERY_REPLY_LINES,
        )?;

        match grammar::CEREG_STAT.extract_int(reply.as_str()) {
            Some(code) => Ok(RegistrationStatus::from_code(code)),
            None => {
                warn!("no registration status in reply: {}", reply.as_str());
                Ok(RegistrationStatus::Unknown)
            }
        }
    }

    /// Polls the registration status up to `tries` times, `delay_ms` apart,
    /// until the modem is registered (home or roaming).
    pub fn registered(&mut self, tries: u8, delay_ms: u32) -> Result<bool, ModemError<S::Error>> {
        for attempt in 0..tries {
            let status = self.registration_status()?;
            debug!("registration attempt {}: {}", attempt + 1, status.describe());
            if status.is_registered() {
                return Ok(true);
            }
            if attempt + 1 < tries {
                self.delay.delay_ms(delay_ms);
            }
        }
        Ok(false)
    }

    /// `AT+COPS=<mode>`; 0 selects the operator automatically.
    pub fn set_operator(&mut self, mode: u8) -> Result<(), ModemError<S::Error>> {
        self.wake()?;
        self.require_reply(&Command::SelectOperator { mode }, "OK", self.config.default_timeout_ms)
    }

    // --- Identity and time ---

    /// Network time as reported by `AT+CCLK?`, e.g. `20/11/03,06:25:06+32`.
    pub fn date_and_time(&mut self) -> Result<ClockText, ModemError<S::Error>> {
        self.wake()?;
        self.read_clock_text()
    }

    /// [`date_and_time`](Self::date_and_time), parsed.
    pub fn clock(&mut self) -> Result<ModemClock, ModemError<S::Error>> {
        let text = self.date_and_time()?;
        ModemClock::parse(&text).ok_or(ModemError::UnexpectedReply)
    }

    /// Firmware revision from `AT+CGMR`, e.g. `BC660KGLAAR01A01`.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, ModemError<S::Error>> {
        self.wake()?;
        self.read_firmware_version()
    }

    /// Refreshes the engineering snapshot from `AT+QENG=0`, `AT+CGMR` and `AT+CCLK?`.
    ///
    /// All fields are cleared first, so anything the modem did not report this
    /// time is `None`. Only channel failures abort the refresh.
    pub fn engineering_data(&mut self) -> Result<&EngineeringSnapshot, ModemError<S::Error>> {
        self.engineering.clear();
        self.wake()?;

        let serving_cell = self.query_reply(
            &Command::EngineeringData,
            self.config.default_timeout_ms,
            timing::QUERY_REPLY_LINES,
        );
        match serving_cell {
            Ok(reply) => {
                let cell = |spec: &FieldSpec| {
                    spec.extract_int(reply.as_str()).and_then(|v| i16::try_from(v).ok())
                };
                self.engineering.rsrp = cell(&grammar::QENG_RSRP);
                self.engineering.rsrq = cell(&grammar::QENG_RSRQ);
                self.engineering.rssi = cell(&grammar::QENG_RSSI);
                self.engineering.sinr = cell(&grammar::QENG_SINR);
            }
            Err(e) if e.is_recoverable() => warn!("no serving cell data: {}", e),
            Err(e) => return Err(e),
        }

        self.engineering.firmware_version = match self.read_firmware_version() {
            Ok(version) => Some(version),
            Err(e) if e.is_recoverable() => None,
            Err(e) => return Err(e),
        };

        let clock = match self.read_clock_text() {
            Ok(text) => ModemClock::parse(&text),
            Err(e) if e.is_recoverable() => None,
            Err(e) => return Err(e),
        };
        if let Some(clock) = clock {
            self.engineering.timezone = Some(clock.zone_quarters);
            self.engineering.epoch = clock.epoch();
        }

        debug!("engineering data: {:?}", self.engineering);
        Ok(&self.engineering)
    }

    // --- Unwoken helpers ---

    fn read_clock_text(&mut self) -> Result<ClockText, ModemError<S::Error>> {
        let reply = self.query_reply(&Command::Clock, self.config.default_timeout_ms, timing::QUERY_REPLY_LINES)?;
        grammar::CCLK_TIME
            .extract(reply.as_str())
            .map(truncated)
            .ok_or(ModemError::UnexpectedReply)
    }

    fn read_firmware_version(&mut self) -> Result<FirmwareVersion, ModemError<S::Error>> {
        let reply = self.query_reply(
            &Command::FirmwareRevision,
            self.config.default_timeout_ms,
            timing::QUERY_REPLY_LINES,
        )?;
        grammar::CGMR_REVISION
            .extract(reply.as_str())
            .map(truncated)
            .ok_or(ModemError::UnexpectedReply)
    }
}
