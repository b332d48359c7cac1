// src/common/command.rs

//! AT command definitions for the BC660.
//!
//! See Quectel "BC660K-GL AT Commands Manual", chapters 2 (general), 4 (network),
//! 7 (TCP/IP) and 8 (MQTT).

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::sleep::SleepMode;

/// Longest command line the driver will send, terminator excluded.
pub const COMMAND_CAPACITY: usize = 255;

/// Formatted command text, ready to be written to the channel.
pub type CommandBuffer = ArrayString<COMMAND_CAPACITY>;

/// Why a [`Command`] could not be turned into text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandFormatError {
    /// The formatted line does not fit into [`COMMAND_CAPACITY`] bytes.
    #[error("command longer than 255 bytes")]
    TooLong,
    /// An argument has no wire representation (e.g. `SleepMode::Unknown`).
    #[error("argument cannot be encoded")]
    InvalidArgument,
}

/// Represents an AT command understood by the driver.
///
/// The `Display` implementation generates the command line without its `\r\n`
/// terminator (e.g. `AT+CSQ`, `AT+QMTOPEN=0,"broker",1883`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AT` - no-op probe, also used to wake the modem from light sleep.
    Attention,
    /// `ATE0` - disable command echo.
    EchoOff,
    /// `AT+QSCLK?` - read the configured sleep mode.
    QuerySleepMode,
    /// `AT+QSCLK=<n>` - configure the sleep mode.
    SetSleepMode(SleepMode),
    /// `AT+CSQ` - signal quality.
    SignalQuality,
    /// `AT+CEREG?` - EPS network registration status.
    RegistrationStatus,
    /// `AT+CCLK?` - network time.
    Clock,
    /// `AT+CGMR` - firmware revision.
    FirmwareRevision,
    /// `AT+QENG=0` - serving cell engineering data.
    EngineeringData,
    /// `AT+COPS=<mode>` - operator selection mode.
    SelectOperator { mode: u8 },

    /// `AT+QMTOPEN=<id>,"<host>",<port>`
    MqttOpen { connect_id: u8, host: &'a str, port: u16 },
    /// `AT+QMTCLOSE=<id>`
    MqttClose { connect_id: u8 },
    /// `AT+QMTCONN=<id>,"<client id>"`
    MqttConnect { connect_id: u8, client_id: &'a str },
    /// `AT+QMTPUB=<id>,<msg id>,<qos>,<retain>,"<topic>",<len>,"<payload>"`
    MqttPublish {
        connect_id: u8,
        msg_id: u16,
        qos: u8,
        retain: bool,
        topic: &'a str,
        payload: &'a str,
    },

    /// `AT+QIOPEN=0,<id>,"UDP","<host>",<port>`
    UdpOpen { connect_id: u8, host: &'a str, port: u16 },
    /// `AT+QICLOSE=<id>`
    UdpClose { connect_id: u8 },
    /// `AT+QISEND=<id>,"<host>",<port>,<len>` - the payload follows the `> ` prompt.
    UdpSend { connect_id: u8, host: &'a str, port: u16, len: usize },

    /// Any other command, sent verbatim.
    Raw(&'a str),
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Attention => f.write_str("AT"),
            Command::EchoOff => f.write_str("ATE0"),
            Command::QuerySleepMode => f.write_str("AT+QSCLK?"),
            Command::SetSleepMode(mode) => match mode.code() {
                Some(code) => write!(f, "AT+QSCLK={}", code),
                None => Err(fmt::Error),
            },
            Command::SignalQuality => f.write_str("AT+CSQ"),
            Command::RegistrationStatus => f.write_str("AT+CEREG?"),
            Command::Clock => f.write_str("AT+CCLK?"),
            Command::FirmwareRevision => f.write_str("AT+CGMR"),
            Command::EngineeringData => f.write_str("AT+QENG=0"),
            Command::SelectOperator { mode } => write!(f, "AT+COPS={}", mode),
            Command::MqttOpen { connect_id, host, port } => {
                write!(f, "AT+QMTOPEN={},\"{}\",{}", connect_id, host, port)
            }
            Command::MqttClose { connect_id } => write!(f, "AT+QMTCLOSE={}", connect_id),
            Command::MqttConnect { connect_id, client_id } => {
                write!(f, "AT+QMTCONN={},\"{}\"", connect_id, client_id)
            }
            Command::MqttPublish { connect_id, msg_id, qos, retain, topic, payload } => write!(
                f,
                "AT+QMTPUB={},{},{},{},\"{}\",{},\"{}\"",
                connect_id,
                msg_id,
                qos,
                u8::from(*retain),
                topic,
                payload.len(),
                payload
            ),
            Command::UdpOpen { connect_id, host, port } => {
                write!(f, "AT+QIOPEN=0,{},\"UDP\",\"{}\",{}", connect_id, host, port)
            }
            Command::UdpClose { connect_id } => write!(f, "AT+QICLOSE={}", connect_id),
            Command::UdpSend { connect_id, host, port, len } => {
                write!(f, "AT+QISEND={},\"{}\",{},{}", connect_id, host, port, len)
            }
            Command::Raw(text) => f.write_str(text),
        }
    }
}

impl Command<'_> {
    /// Formats the command into a fixed-capacity buffer.
    pub fn format_into(&self) -> Result<CommandBuffer, CommandFormatError> {
        if let Command::SetSleepMode(mode) = self {
            if mode.code().is_none() {
                return Err(CommandFormatError::InvalidArgument);
            }
        }
        let mut buffer = CommandBuffer::new();
        write!(buffer, "{}", self).map_err(|_| CommandFormatError::TooLong)?;
        Ok(buffer)
    }
}
