// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod common;
pub mod modem;

#[cfg(test)]
mod mock;

// Re-export key types for convenience
pub use common::{Command, ModemConfig, ModemError, Reply, SleepMode};
pub use modem::{Completion, Exchange, SyncModem};
