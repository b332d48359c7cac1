// src/common/response/grammar.rs

//! Field layouts of the replies the driver understands.
//!
//! Reply shapes after `\r` removal (the leading `\n` is already swallowed):
//!
//! | Command      | Reply                                        |
//! |--------------|----------------------------------------------|
//! | `AT+CSQ`     | `+CSQ: <rssi>,<ber>\n\nOK\n`                 |
//! | `AT+CEREG?`  | `+CEREG: <n>,<stat>\n\nOK\n`                 |
//! | `AT+QSCLK?`  | `+QSCLK: <mode>\n\nOK\n`                     |
//! | `AT+CCLK?`   | `+CCLK: <yy/MM/dd,hh:mm:ss±zz>\n\nOK\n`      |
//! | `AT+CGMR`    | `Revision: <revision>\n\nOK\n`               |
//! | `AT+QMTOPEN` | `OK\n\n+QMTOPEN: <id>,<result>\n`            |
//! | `AT+QIOPEN`  | `OK\n\n+QIOPEN: <id>,<result>\n`             |
//! | `AT+QMTCONN` | `OK\n\n+QMTCONN: <id>,<result>[,<ret_code>]\n` |
//! | `AT+QMTPUB`  | `OK\n\n+QMTPUB: <id>,<msg_id>,<result>[,<value>]\n` |
//! | `AT+QENG=0`  | `+QENG: 0,<earfcn>,<offset>,<pci>,<cell id>,<rsrp>,<rsrq>,<rssi>,<sinr>,...` |

use super::parse::FieldSpec;

pub const CSQ_RSSI: FieldSpec = FieldSpec::new(&[" ", ","]);
pub const CSQ_BER: FieldSpec = FieldSpec::new(&[" ", ",", "\n"]);

pub const CEREG_STAT: FieldSpec = FieldSpec::new(&[" ", ",", "\n"]);

pub const QSCLK_MODE: FieldSpec = FieldSpec::new(&[" ", "\n"]);

/// Everything after `"+CCLK: "`.
pub const CCLK_TIME: FieldSpec = FieldSpec::new(&["\n"]).skipping(7);

/// Everything after `"Revision: "`.
pub const CGMR_REVISION: FieldSpec = FieldSpec::new(&["\n"]).skipping(10);

/// `<result>` of the `+QMTOPEN` / `+QIOPEN` URC that follows `OK`.
pub const OPEN_RESULT: FieldSpec = FieldSpec::new(&[",", "\n"]);

/// `<result>` of `+QMTCONN: <id>,<result>[,<ret_code>]`.
pub const QMTCONN_RESULT: FieldSpec = FieldSpec::new(&[",", "\n"]);
/// `<ret_code>` of `+QMTCONN: <id>,<result>,<ret_code>`.
pub const QMTCONN_RET_CODE: FieldSpec = FieldSpec::new(&[",", ",", "\n"]);

/// `<result>` of `+QMTPUB: <id>,<msg_id>,<result>[,<value>]`.
pub const QMTPUB_RESULT: FieldSpec = FieldSpec::new(&[",", ",", "\n"]);

// Serving cell fields of `+QENG: 0,...`, counted in comma separated tokens.
pub const QENG_RSRP: FieldSpec = FieldSpec::new(&[","; 6]);
pub const QENG_RSRQ: FieldSpec = FieldSpec::new(&[","; 7]);
pub const QENG_RSSI: FieldSpec = FieldSpec::new(&[","; 8]);
pub const QENG_SINR: FieldSpec = FieldSpec::new(&[","; 9]);
