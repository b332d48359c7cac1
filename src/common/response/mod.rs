// src/common/response/mod.rs

pub mod grammar;
pub mod parse; // Make parse functions public
mod types;

// Re-export items for external use
pub use parse::{parse_int, parse_int_or, FieldSpec, Tokenizer};
pub use types::{
    ClockText, EngineeringSnapshot, FirmwareVersion, ModemClock, RegistrationStatus, SignalQuality,
    CLOCK_TEXT_CAPACITY, FIRMWARE_CAPACITY,
};

pub(crate) use types::truncated;
