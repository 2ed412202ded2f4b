//! Scripted stand-ins for the UART, the control lines and a notification
//! subscriber, used by the unit tests.

use crate::cfg::modem_cfg::ModemTimings;
use crate::modem::{AtCommandEngine, ModemController, ModemState, PowerLines, RegistrationStatus};
use crate::task::events::{ModemEvent, ModemObserver};
use core::convert::Infallible;
use embassy_time::{Duration, Instant, Timer};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Traffic seen on the wire, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Tx(String),
    Rx(String),
}

#[derive(Default)]
struct PortState {
    replies: HashMap<String, VecDeque<Vec<(Duration, Vec<u8>)>>>,
    scheduled: VecDeque<(Instant, Vec<u8>)>,
    rx: VecDeque<u8>,
    line: Vec<u8>,
    written: Vec<u8>,
    wire: Vec<Wire>,
}

impl PortState {
    fn promote_due(&mut self) {
        let now = Instant::now();
        while self.scheduled.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, bytes)) = self.scheduled.pop_front() {
                self.rx.extend(bytes);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct MockPort {
    state: Rc<RefCell<PortState>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the next `command` with `reply`, delivered at once.
    pub fn reply(&self, command: &str, reply: &str) {
        self.reply_bytes(command, reply.as_bytes());
    }

    pub fn reply_bytes(&self, command: &str, reply: &[u8]) {
        self.reply_chunks(command, &[(Duration::from_millis(0), reply)]);
    }

    /// Answers the next `command` with chunks arriving at the given offsets
    /// from the moment the terminating CR was written.
    pub fn reply_chunks(&self, command: &str, chunks: &[(Duration, &[u8])]) {
        let chunks = chunks
            .iter()
            .map(|(delay, bytes)| (*delay, bytes.to_vec()))
            .collect();
        self.state
            .borrow_mut()
            .replies
            .entry(command.to_string())
            .or_default()
            .push_back(chunks);
    }

    /// Unsolicited bytes, readable immediately.
    pub fn inject(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn has_unread(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.promote_due();
        !state.rx.is_empty()
    }

    /// Commands written so far, without their terminator.
    pub fn sent(&self) -> Vec<String> {
        self.state
            .borrow()
            .wire
            .iter()
            .filter_map(|w| match w {
                Wire::Tx(command) => Some(command.clone()),
                Wire::Rx(_) => None,
            })
            .collect()
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    pub fn wire(&self) -> Vec<Wire> {
        self.state.borrow().wire.clone()
    }
}

impl embedded_io::ErrorType for MockPort {
    type Error = Infallible;
}

impl embedded_io::ReadReady for MockPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.has_unread())
    }
}

impl embedded_io_async::Write for MockPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        state.written.extend_from_slice(buf);
        for &byte in buf {
            if byte != b'\r' {
                state.line.push(byte);
                continue;
            }
            let command = String::from_utf8_lossy(&state.line).into_owned();
            state.line.clear();
            state.wire.push(Wire::Tx(command.clone()));
            let now = Instant::now();
            let reply = state
                .replies
                .get_mut(&command)
                .and_then(VecDeque::pop_front);
            if let Some(chunks) = reply {
                for (delay, bytes) in chunks {
                    state.scheduled.push_back((now + delay, bytes));
                }
            }
        }
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io_async::Read for MockPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            let next_due = {
                let mut state = self.state.borrow_mut();
                state.promote_due();
                if !state.rx.is_empty() {
                    let count = buf.len().min(state.rx.len());
                    for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..count)) {
                        *slot = byte;
                    }
                    let text = String::from_utf8_lossy(&buf[..count]).into_owned();
                    state.wire.push(Wire::Rx(text));
                    return Ok(count);
                }
                state.scheduled.front().map(|(at, _)| *at)
            };
            match next_due {
                Some(at) => Timer::at(at).await,
                None => core::future::pending::<()>().await,
            }
        }
    }
}

/// Level change on a control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub line: &'static str,
    pub high: bool,
    pub at: Instant,
}

#[derive(Clone)]
pub struct MockPin {
    line: &'static str,
    edges: Rc<RefCell<Vec<Edge>>>,
}

impl MockPin {
    fn record(&self, high: bool) {
        self.edges.borrow_mut().push(Edge {
            line: self.line,
            high,
            at: Instant::now(),
        });
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

/// Power and reset lines sharing one edge log.
pub fn control_lines() -> (MockPin, MockPin, Rc<RefCell<Vec<Edge>>>) {
    let edges = Rc::new(RefCell::new(Vec::new()));
    let power = MockPin {
        line: "power",
        edges: edges.clone(),
    };
    let reset = MockPin {
        line: "reset",
        edges: edges.clone(),
    };
    (power, reset, edges)
}

/// `(line, level)` pairs of an edge log, timestamps dropped.
pub fn levels(edges: &Rc<RefCell<Vec<Edge>>>) -> Vec<(&'static str, bool)> {
    edges.borrow().iter().map(|e| (e.line, e.high)).collect()
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: RefCell<Vec<ModemEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ModemEvent> {
        self.events.borrow().clone()
    }
}

impl ModemObserver for RecordingObserver {
    fn on_registration_changed(&self, status: RegistrationStatus) {
        self.events
            .borrow_mut()
            .push(ModemEvent::RegistrationChanged(status));
    }

    fn on_signal_strength_changed(&self, signal: u8) {
        self.events
            .borrow_mut()
            .push(ModemEvent::SignalStrengthChanged(signal));
    }
}

/// Timing contracts compressed to a few milliseconds.
pub fn fast_timings() -> ModemTimings {
    ModemTimings {
        response_timeout: Duration::from_millis(30),
        liveness_timeout: Duration::from_millis(30),
        signal_query_timeout: Duration::from_millis(30),
        quiet_period: Duration::from_millis(8),
        status_period: Duration::from_millis(5),
        signal_period: Duration::from_millis(5),
        watchdog_period: Duration::from_millis(5),
        watchdog_first_tick: Duration::from_millis(1),
        power_pulse: Duration::from_millis(6),
        power_cycle_gap: Duration::from_millis(6),
        reset_pulse: Duration::from_millis(3),
        recovery_hold: Duration::from_millis(6),
    }
}

/// Engine, control lines and state wired to one [`MockPort`].
pub struct ModemRig {
    pub port: MockPort,
    pub engine: AtCommandEngine<MockPort>,
    pub power: PowerLines<MockPin, MockPin>,
    pub state: ModemState,
    pub edges: Rc<RefCell<Vec<Edge>>>,
    pub timings: ModemTimings,
}

impl ModemRig {
    pub fn new() -> Self {
        let timings = fast_timings();
        let port = MockPort::new();
        let (power, reset, edges) = control_lines();
        Self {
            engine: AtCommandEngine::new(port.clone(), &timings),
            power: PowerLines::new(power, reset, &timings),
            state: ModemState::new(),
            port,
            edges,
            timings,
        }
    }

    pub fn controller(&self) -> ModemController<'_, MockPort, MockPin, MockPin> {
        ModemController::new(&self.engine, &self.power, &self.state, &self.timings)
    }
}
