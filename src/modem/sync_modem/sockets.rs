// src/modem/sync_modem/sockets.rs

//! MQTT client and UDP socket commands.
//!
//! The modem supports one connection of each kind through this driver; the
//! connect ID given to `open_*` is remembered for the commands that follow.

use super::SyncModem;
use crate::common::{
    buffer::Reply,
    command::{Command, CommandFormatError},
    error::ModemError,
    hal_traits::ModemSerial,
    response::{grammar, FieldSpec},
    timing,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

/// Remote host of the open UDP socket.
pub type HostName = heapless::String<40>;

/// Reads a `<result>` field that must be 0.
fn check_result_code<E: core::fmt::Debug>(reply: &Reply, spec: &FieldSpec) -> Result<(), ModemError<E>> {
    match spec.extract_int(reply.as_str()) {
        Some(0) => Ok(()),
        Some(code) => {
            warn!("modem returned result code {}", code);
            Err(ModemError::ResultCode(code))
        }
        None => {
            warn!("no result code in reply: {}", reply.as_str());
            Err(ModemError::UnexpectedReply)
        }
    }
}

impl<S, D, P> SyncModem<S, D, P>
where
    S: ModemSerial,
    D: DelayNs,
    P: OutputPin,
{
    // --- MQTT ---

    /// `AT+QMTOPEN`: opens the network connection to an MQTT broker and waits
    /// for the `+QMTOPEN` result.
    pub fn open_mqtt(&mut self, host: &str, port: u16, connect_id: u8) -> Result<(), ModemError<S::Error>> {
        let command = Command::MqttOpen { connect_id, host, port }.format_into()?;
        self.wake()?;

        let reply = self
            .send_and_wait_for_lines(&command, timing::MQTT_TIMEOUT_MS, timing::QUERY_REPLY_LINES)?
            .complete::<S::Error>()?;
        check_result_code::<S::Error>(&reply, &grammar::OPEN_RESULT)?;
        self.connect_id = connect_id;
        info!("MQTT connection {} open to {}:{}", connect_id, host, port);
        Ok(())
    }

    /// `AT+QMTCLOSE` for the connection opened last.
    pub fn close_mqtt(&mut self) -> Result<(), ModemError<S::Error>> {
        self.wake()?;
        let command = Command::MqttClose { connect_id: self.connect_id };
        self.require_reply(&command, "OK", self.config.default_timeout_ms)
    }

    /// `AT+QMTCONN`: connects the client to the broker. Both `<result>` and,
    /// when present, `<ret_code>` must be 0.
    pub fn connect_mqtt(&mut self, client_id: &str) -> Result<(), ModemError<S::Error>> {
        let command = Command::MqttConnect { connect_id: self.connect_id, client_id }.format_into()?;
        self.wake()?;

        let reply = self
            .send_and_wait_for_lines(&command, self.config.default_timeout_ms, timing::QUERY_REPLY_LINES)?
            .complete::<S::Error>()?;
        if reply.contains("ERROR") {
            return Err(ModemError::Rejected);
        }
        check_result_code::<S::Error>(&reply, &grammar::QMTCONN_RESULT)?;
        match grammar::QMTCONN_RET_CODE.extract_int(reply.as_str()) {
            Some(code) if code != 0 => Err(ModemError::ResultCode(code)),
            _ => Ok(()),
        }
    }

    /// `AT+QMTPUB`: publishes `message` on `topic`.
    pub fn publish_mqtt(
        &mut self,
        message: &str,
        topic: &str,
        msg_id: u16,
        qos: u8,
        retain: bool,
    ) -> Result<(), ModemError<S::Error>> {
        let command = Command::MqttPublish {
            connect_id: self.connect_id,
            msg_id,
            qos,
            retain,
            topic,
            payload: message,
        }
        .format_into()?;
        self.wake()?;

        let reply = self
            .send_and_wait_for_lines(&command, timing::MQTT_TIMEOUT_MS, timing::QUERY_REPLY_LINES)?
            .complete::<S::Error>()?;
        if reply.contains("ERROR") {
            return Err(ModemError::Rejected);
        }
        check_result_code::<S::Error>(&reply, &grammar::QMTPUB_RESULT)?;
        debug!("published {} bytes to {}", message.len(), topic);
        Ok(())
    }

    // --- UDP ---

    /// `AT+QIOPEN`: opens a UDP socket to `host:port`. Waits up to a minute for
    /// the `+QIOPEN` result while the modem brings up its data connection.
    pub fn open_udp(&mut self, host: &str, port: u16, connect_id: u8) -> Result<(), ModemError<S::Error>> {
        let remote = HostName::try_from(host).map_err(|_| CommandFormatError::TooLong)?;
        let command = Command::UdpOpen { connect_id, host, port }.format_into()?;
        self.wake()?;

        let reply = self
            .send_and_wait_for_lines(&command, timing::UDP_OPEN_TIMEOUT_MS, timing::QUERY_REPLY_LINES)?
            .complete::<S::Error>()?;
        check_result_code::<S::Error>(&reply, &grammar::OPEN_RESULT)?;
        self.connect_id = connect_id;
        self.udp_remote = Some((remote, port));
        info!("UDP socket {} open to {}:{}", connect_id, host, port);
        Ok(())
    }

    /// `AT+QICLOSE` for the socket opened last.
    pub fn close_udp(&mut self) -> Result<(), ModemError<S::Error>> {
        self.wake()?;
        let command = Command::UdpClose { connect_id: self.connect_id };
        self.require_reply(&command, "OK", self.config.default_timeout_ms)?;
        self.udp_remote = None;
        Ok(())
    }

    /// `AT+QISEND`: sends one datagram to the remote of the open socket.
    ///
    /// The payload is written raw after the `> ` prompt; the modem confirms
    /// with `SEND OK`.
    pub fn send_udp(&mut self, payload: &[u8]) -> Result<(), ModemError<S::Error>> {
        let (host, port) = self.udp_remote.clone().ok_or(ModemError::NotOpen)?;
        let command = Command::UdpSend { connect_id: self.connect_id, host: &host, port, len: payload.len() }
            .format_into()?;
        self.wake()?;

        // 1. Announce the datagram and wait for the prompt
        self.send_and_wait_for(&command, "> ", timing::UDP_SEND_TIMEOUT_MS)?
            .complete::<S::Error>()?;

        // 2. Payload
        debug!("--> {} payload bytes", payload.len());
        self.write_all(payload)?;

        // 3. Confirmation
        let reply = self
            .read_reply(timing::UDP_SEND_TIMEOUT_MS, timing::CHECK_REPLY_LINES)?
            .best_effort::<S::Error>()?;
        if reply.contains("SEND OK") {
            Ok(())
        } else {
            Err(ModemError::Rejected)
        }
    }
}
