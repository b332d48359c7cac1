// src/common/hal_traits.rs

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_hal::digital::{ErrorType, OutputPin};

/// Abstraction for the serial link to the modem.
///
/// The driver treats it as a lossless, ordered byte stream. Delays are not part
/// of this trait; they come from `embedded_hal::delay::DelayNs`.
pub trait ModemSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Applies the line settings (8N1 at the given baud rate).
    fn configure(&mut self, baud_rate: u32) -> Result<(), Self::Error>;

    /// Number of received bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Attempts to read a single byte from the serial interface.
    ///
    /// Returns `Ok(byte)` if a byte was read, or `Err(nb::Error::WouldBlock)`
    /// if no byte is available yet. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte to the serial interface.
    ///
    /// Returns `Ok(())` if the byte was accepted for transmission, or `Err(nb::Error::WouldBlock)`
    /// if the write buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer, ensuring all written bytes have been sent.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Whether the other end has gone away (USB-serial unplugged, pipe closed...).
    ///
    /// UARTs never close, hence the default.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Placeholder for modems wired without a PSM_EINT wake pin.
///
/// `SyncModem::new(serial, delay, None::<NoWakePin>)` selects the AT-probe wake path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakePin;

impl ErrorType for NoWakePin {
    type Error = Infallible;
}

impl OutputPin for NoWakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
