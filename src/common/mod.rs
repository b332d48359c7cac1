// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod buffer;
pub mod command;
pub mod config;
pub mod error;
pub mod hal_traits;
pub mod response;
pub mod sleep;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From buffer.rs
pub use buffer::{BufferOverflow, Reply, ResponseBuffer, RESPONSE_CAPACITY};

// From command.rs
pub use command::{Command, CommandBuffer, CommandFormatError, COMMAND_CAPACITY};

// From config.rs
pub use config::ModemConfig;

// From error.rs
pub use error::ModemError;

// From hal_traits.rs
pub use hal_traits::{ModemSerial, NoWakePin};

// From response/mod.rs
pub use response::{
    EngineeringSnapshot, FieldSpec, ModemClock, RegistrationStatus, SignalQuality,
};

// From sleep.rs
pub use sleep::SleepMode;
