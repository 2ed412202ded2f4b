use crate::cfg::modem_cfg::ModemTimings;
use crate::modem::response::parse_registration;
use crate::modem::{AtCommandEngine, ModemPort, ModemState, RegistrationStatus};
use crate::task::events::ModemObserver;
use embassy_time::{Duration, Ticker};
use log::{debug, info};

/// Tracks network registration with a periodic `AT+CREG?`.
pub struct StatusPoller<'a, P, O> {
    engine: &'a AtCommandEngine<P>,
    state: &'a ModemState,
    observer: O,
    period: Duration,
}

impl<'a, P: ModemPort, O: ModemObserver> StatusPoller<'a, P, O> {
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
            period: timings.status_period,
        }
    }

    /// One poll. Returns the new status when it changed.
    pub async fn tick(&self) -> Option<RegistrationStatus> {
        let response = self.engine.send("AT+CREG?").await;
        let Some(status) = parse_registration(&response, self.state.registration()) else {
            // No marker: forget the last known state, but quietly
            let previous = self.state.replace_registration(RegistrationStatus::Unknown);
            if previous != RegistrationStatus::Unknown {
                debug!("[status] No +CREG in reply, registration now unknown");
            }
            return None;
        };

        let previous = self.state.replace_registration(status);
        if previous == status {
            return None;
        }
        info!("[status] Registration {previous:?} -> {status:?}");
        self.observer.on_registration_changed(status);
        Some(status)
    }

    pub async fn run(&self) -> ! {
        info!("[status] Polling registration every {} ms", self.period.as_millis());
        let mut ticker = Ticker::every(self.period);
        loop {
            self.tick().await;
            ticker.next().await;
        }
    }
}
