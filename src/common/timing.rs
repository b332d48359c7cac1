// src/common/timing.rs

// All values are in milliseconds; the poll loop counts its budget in these units.

// === Serial link ===

/// Baud rate the BC660 main UART runs at out of the box.
pub const BAUD_RATE: u32 = 115_200;

// === Polling ===

/// Delay between two polls of the serial channel inside a transaction.
pub const POLL_INTERVAL_MS: u32 = 1;
/// How long a single byte write or flush may stay blocked.
pub const WRITE_TIMEOUT_MS: u32 = 100;
/// Budget for ordinary commands (`AT`, `ATE0`, `AT+CSQ`, ...).
pub const DEFAULT_TIMEOUT_MS: u32 = 1_000;
/// Line count used by `send_and_check_reply`.
pub const CHECK_REPLY_LINES: usize = 1;
/// Most query replies are `<payload>`, an empty line and `OK`.
pub const QUERY_REPLY_LINES: usize = 3;

// === Wake sequencing ===

/// How long PSM_EINT is held high to wake the modem.
pub const WAKE_PIN_PULSE_MS: u32 = 300;
/// Settle time after either wake path before the first real command.
pub const WAKE_SETTLE_MS: u32 = 100;

// === Feature commands ===

/// `AT+QMTOPEN` / `AT+QMTPUB` wait for the URC following `OK`.
pub const MQTT_TIMEOUT_MS: u32 = 2_000;
/// `AT+QIOPEN` can take up to a minute while the PDN context comes up.
pub const UDP_OPEN_TIMEOUT_MS: u32 = 60_000;
/// Both the `> ` prompt and the `SEND OK` confirmation of `AT+QISEND`.
pub const UDP_SEND_TIMEOUT_MS: u32 = 5_000;
