use crate::cfg::modem_cfg::{RESPONSE_CAPACITY, WATCHDOG_IDLE_THRESHOLD};
use crate::modem::ModemError;
use embassy_time::{with_timeout, Duration};
use embedded_io::{Error as _, ReadReady};
use embedded_io_async::{Read, Write};
use heapless::String;
use log::{debug, trace, warn};

const CR: u8 = 13;
const LF: u8 = 10;
const READ_CHUNK: usize = 32;
const STALE_PREVIEW: usize = 64;

/// Accumulated response text of one exchange.
pub type Response = String<RESPONSE_CAPACITY>;

/// Transport the modem is wired to: an async UART plus a non-blocking check
/// for bytes already sitting in the receive FIFO.
pub trait ModemPort: Read + Write + ReadReady {}

impl<T: Read + Write + ReadReady> ModemPort for T {}

/// Consecutive watchdog ticks that found the receive side silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogCounter {
    idle_ticks: u32,
    threshold: u32,
}

impl WatchdogCounter {
    pub const fn new(threshold: u32) -> Self {
        Self {
            idle_ticks: 0,
            threshold,
        }
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Any byte seen on the line starts the count over.
    pub fn record_activity(&mut self) {
        self.idle_ticks = 0;
    }

    /// Counts one idle tick. Returns `true` when the threshold is reached;
    /// the counter is back at zero when that happens.
    pub fn record_idle(&mut self) -> bool {
        self.idle_ticks += 1;
        if self.idle_ticks >= self.threshold {
            self.idle_ticks = 0;
            true
        } else {
            false
        }
    }
}

impl Default for WatchdogCounter {
    fn default() -> Self {
        Self::new(WATCHDOG_IDLE_THRESHOLD)
    }
}

/// Sole owner of the modem UART.
///
/// One call to [`SerialChannel::send`] is one complete exchange: stale input
/// is flushed, the command goes out with a CR terminator, and the reply is
/// collected until the line has been quiet for `quiet_period`.
pub struct SerialChannel<P> {
    port: P,
    quiet_period: Duration,
    watchdog: WatchdogCounter,
}

impl<P: ModemPort> SerialChannel<P> {
    pub fn new(port: P, quiet_period: Duration) -> Self {
        Self {
            port,
            quiet_period,
            watchdog: WatchdogCounter::default(),
        }
    }

    pub fn watchdog(&self) -> &WatchdogCounter {
        &self.watchdog
    }

    /// Sends `command` and returns whatever printable text came back.
    ///
    /// An empty response means nothing arrived within `timeout`.
    pub async fn send(&mut self, command: &str, timeout: Duration) -> Result<Response, ModemError> {
        self.discard_stale().await?;

        debug!("[serial] >> {command}");
        self.port
            .write_all(command.as_bytes())
            .await
            .map_err(serial_error)?;
        self.port.write_all(&[CR]).await.map_err(serial_error)?;
        self.port.flush().await.map_err(serial_error)?;

        let mut response = Response::new();
        let mut chunk = [0u8; READ_CHUNK];

        let mut read = match with_timeout(timeout, self.port.read(&mut chunk)).await {
            Ok(result) => result.map_err(serial_error)?,
            Err(_) => {
                debug!(
                    "[serial] No response to {command} within {} ms",
                    timeout.as_millis()
                );
                return Ok(response);
            }
        };

        let mut overflowed = false;
        while read > 0 {
            self.watchdog.record_activity();
            for &byte in &chunk[..read] {
                if !is_response_byte(byte) {
                    continue;
                }
                if response.push(byte as char).is_err() && !overflowed {
                    warn!("[serial] Response to {command} exceeds {RESPONSE_CAPACITY} bytes, truncating");
                    overflowed = true;
                }
            }

            read = match with_timeout(self.quiet_period, self.port.read(&mut chunk)).await {
                Ok(result) => result.map_err(serial_error)?,
                Err(_) => break,
            };
        }

        trace!("[serial] << {response:?}");
        Ok(response)
    }

    /// One watchdog observation. Returns `true` when the idle threshold was
    /// just reached and the module should be power cycled.
    pub fn watchdog_tick(&mut self) -> bool {
        match self.port.read_ready() {
            Ok(true) => {
                self.watchdog.record_activity();
                false
            }
            Ok(false) => self.watchdog.record_idle(),
            Err(e) => {
                warn!("[serial] Receive status unavailable: {:?}", e.kind());
                self.watchdog.record_idle()
            }
        }
    }

    async fn discard_stale(&mut self) -> Result<(), ModemError> {
        let mut preview: String<STALE_PREVIEW> = String::new();
        let mut discarded = 0usize;
        let mut chunk = [0u8; READ_CHUNK];

        while self.port.read_ready().map_err(serial_error)? {
            let read = self.port.read(&mut chunk).await.map_err(serial_error)?;
            if read == 0 {
                break;
            }
            discarded += read;
            for &byte in chunk[..read].iter().filter(|b| is_response_byte(**b)) {
                let _ = preview.push(byte as char);
            }
        }

        if discarded > 0 {
            self.watchdog.record_activity();
            warn!("[serial] Discarded {discarded} stale bytes before send: {preview:?}");
        }
        Ok(())
    }
}

fn is_response_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | CR | LF)
}

fn serial_error<E: embedded_io::Error>(e: E) -> ModemError {
    ModemError::Serial(e.kind())
}
