pub mod atcmd;
pub mod interface;
#[allow(clippy::module_inception)]
pub mod modem;
pub mod power;
pub mod response;
pub mod status;

use core::fmt;

pub use atcmd::{AtCommandEngine, CommandOutcome};
pub use interface::{ModemPort, Response, SerialChannel, WatchdogCounter};
pub use modem::ModemController;
pub use power::PowerLines;
pub use status::{CallStatus, ModemSnapshot, ModemState, RegistrationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// Caller supplied a value the module cannot accept (e.g. a dial string
    /// without the international `+` prefix).
    InvalidArgument(&'static str),
    /// The formatted command does not fit the command buffer.
    CommandTooLong,
    /// The UART reported a transport error.
    Serial(embedded_io::ErrorKind),
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModemError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            ModemError::CommandTooLong => write!(f, "command exceeds buffer capacity"),
            ModemError::Serial(kind) => write!(f, "serial transport error: {kind:?}"),
        }
    }
}

impl core::error::Error for ModemError {}
