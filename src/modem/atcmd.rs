use crate::cfg::modem_cfg::{ModemTimings, COMMAND_CAPACITY};
use crate::modem::interface::{ModemPort, Response, SerialChannel};
use crate::modem::ModemError;
use core::fmt::{self, Write as _};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Duration;
use heapless::String;
use log::{error, trace};

/// A formatted AT command line, without its terminator.
pub type Command = String<COMMAND_CAPACITY>;

/// Result of one AT exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The reply was exactly the expected text.
    Matched(Response),
    /// Nothing arrived before the timeout.
    Timeout,
    /// Something else came back; structured queries inspect it themselves.
    Mismatch(Response),
}

impl CommandOutcome {
    /// Empty means timeout. Otherwise the reply must equal `expected` once the
    /// CR/LF framing the module puts around every answer is stripped.
    pub fn classify(response: Response, expected: &str) -> Self {
        if response.is_empty() {
            CommandOutcome::Timeout
        } else if response.trim_matches(['\r', '\n']) == expected {
            CommandOutcome::Matched(response)
        } else {
            CommandOutcome::Mismatch(response)
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, CommandOutcome::Matched(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandOutcome::Timeout)
    }

    /// Raw reply text, empty on timeout.
    pub fn text(&self) -> &str {
        match self {
            CommandOutcome::Matched(raw) | CommandOutcome::Mismatch(raw) => raw.as_str(),
            CommandOutcome::Timeout => "",
        }
    }

    pub fn into_text(self) -> Response {
        match self {
            CommandOutcome::Matched(raw) | CommandOutcome::Mismatch(raw) => raw,
            CommandOutcome::Timeout => Response::new(),
        }
    }
}

/// Formats a command line into a fixed buffer, rejecting anything that does
/// not fit before it can reach the wire.
pub fn format_command(args: fmt::Arguments<'_>) -> Result<Command, ModemError> {
    let mut command = Command::new();
    command
        .write_fmt(args)
        .map_err(|_| ModemError::CommandTooLong)?;
    Ok(command)
}

/// Serializes every AT exchange onto the one [`SerialChannel`].
///
/// The lock covers a single send/receive cycle, so callers queue per command
/// rather than per high-level operation.
pub struct AtCommandEngine<P> {
    channel: Mutex<CriticalSectionRawMutex, SerialChannel<P>>,
    default_timeout: Duration,
}

impl<P: ModemPort> AtCommandEngine<P> {
    pub fn new(port: P, timings: &ModemTimings) -> Self {
        Self {
            channel: Mutex::new(SerialChannel::new(port, timings.quiet_period)),
            default_timeout: timings.response_timeout,
        }
    }

    pub async fn execute(&self, command: &str, expected: &str, timeout: Duration) -> CommandOutcome {
        let response = {
            let mut channel = self.channel.lock().await;
            channel.send(command, timeout).await
        };
        match response {
            Ok(response) => {
                let outcome = CommandOutcome::classify(response, expected);
                trace!("[atcmd] {command} -> {outcome:?}");
                outcome
            }
            Err(e) => {
                error!("[atcmd] {command} failed: {e}");
                CommandOutcome::Timeout
            }
        }
    }

    /// Runs a structured query and hands back the raw reply for parsing.
    pub async fn query(&self, command: &str, timeout: Duration) -> Response {
        self.execute(command, "", timeout).await.into_text()
    }

    /// Fire-and-forget exchange with the default timeout.
    pub async fn send(&self, command: &str) -> Response {
        self.query(command, self.default_timeout).await
    }

    /// See [`SerialChannel::watchdog_tick`].
    pub async fn watchdog_tick(&self) -> bool {
        self.channel.lock().await.watchdog_tick()
    }

    pub async fn idle_ticks(&self) -> u32 {
        self.channel.lock().await.watchdog().idle_ticks()
    }
}
