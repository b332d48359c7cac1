// src/modem/mod.rs

pub mod sync_modem;

// Re-export the public SyncModem struct
pub use sync_modem::{Completion, Exchange, SyncModem};
