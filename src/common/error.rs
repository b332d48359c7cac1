// src/common/error.rs

use super::command::CommandFormatError;

#[derive(Debug, thiserror::Error)]
pub enum ModemError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the serial channel. Fatal for the modem instance.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The serial channel reported that it has been closed.
    #[error("Serial channel closed")]
    ChannelClosed,

    /// The stop condition of a transaction was not met within its budget.
    #[error("Operation timed out")]
    Timeout,

    /// The reply did not fit into the response buffer; it was truncated.
    #[error("Response overflow: reply exceeded {capacity} bytes")]
    Overflow { capacity: usize },

    /// Driving the hardware wake pin failed.
    #[error("Wake pin could not be driven")]
    WakePin,

    /// The command could not be formatted.
    #[error("Command format error: {0}")]
    CommandFormat(CommandFormatError),

    /// The modem answered, but without the expected success token.
    #[error("Command rejected by modem")]
    Rejected,

    /// The modem reported a non-zero result code.
    #[error("Modem returned result code {0}")]
    ResultCode(i32),

    /// A field the operation cannot do without was missing from the reply.
    #[error("Unexpected reply format")]
    UnexpectedReply,

    /// Data was sent on a socket that has not been opened.
    #[error("Socket not open")]
    NotOpen,
}

impl<E: core::fmt::Debug> From<CommandFormatError> for ModemError<E> {
    fn from(e: CommandFormatError) -> Self {
        ModemError::CommandFormat(e)
    }
}

impl<E: core::fmt::Debug> ModemError<E> {
    /// Whether the caller may reasonably retry the operation (after a back-off).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ModemError::Io(_) | ModemError::ChannelClosed)
    }
}
