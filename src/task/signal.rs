use crate::cfg::modem_cfg::ModemTimings;
use crate::modem::response::parse_signal_quality;
use crate::modem::{AtCommandEngine, ModemPort, ModemState};
use crate::task::events::ModemObserver;
use embassy_time::{Duration, Ticker};
use log::{info, trace};

/// Tracks signal strength with a periodic `AT+CSQ`, published on a 0..=10
/// scale.
pub struct SignalPoller<'a, P, O> {
    engine: &'a AtCommandEngine<P>,
    state: &'a ModemState,
    observer: O,
    period: Duration,
    query_timeout: Duration,
}

impl<'a, P: ModemPort, O: ModemObserver> SignalPoller<'a, P, O> {
    pub fn new(
        engine: &'a AtCommandEngine<P>,
        state: &'a ModemState,
        observer: O,
        timings: &ModemTimings,
    ) -> Self {
        Self {
            engine,
            state,
            observer,
            period: timings.signal_period,
            query_timeout: timings.signal_query_timeout,
        }
    }

    /// One poll. Returns the new strength when it changed.
    pub async fn tick(&self) -> Option<u8> {
        let response = self.engine.query("AT+CSQ", self.query_timeout).await;
        let Some(quality) = parse_signal_quality(&response) else {
            trace!("[signal] No +CSQ in reply, skipping");
            return None;
        };

        let signal = quality.strength();
        if self.state.replace_signal_strength(signal) == signal {
            return None;
        }
        info!("[signal] Strength {signal}/10 ({quality:?})");
        self.observer.on_signal_strength_changed(signal);
        Some(signal)
    }

    pub async fn run(&self) -> ! {
        info!("[signal] Polling signal every {} ms", self.period.as_millis());
        let mut ticker = Ticker::every(self.period);
        loop {
            self.tick().await;
            ticker.next().await;
        }
    }
}
