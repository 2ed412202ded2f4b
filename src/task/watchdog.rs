use crate::cfg::modem_cfg::ModemTimings;
use crate::modem::{AtCommandEngine, ModemPort, PowerLines};
use embassy_time::{Duration, Ticker, Timer};
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

/// Power cycles the module after the receive line has stayed silent for too
/// many consecutive ticks.
pub struct Watchdog<'a, P, PWR, RST> {
    engine: &'a AtCommandEngine<P>,
    power: &'a PowerLines<PWR, RST>,
    period: Duration,
    first_tick: Duration,
    recovery_hold: Duration,
}

impl<'a, P, PWR, RST> Watchdog<'a, P, PWR, RST>
where
    P: ModemPort,
    PWR: OutputPin,
    RST: OutputPin,
{
    pub fn new(
        engine: &'a AtCommandEngine<P>,
        power: &'a PowerLines<PWR, RST>,
        timings: &ModemTimings,
    ) -> Self {
        Self {
            engine,
            power,
            period: timings.watchdog_period,
            first_tick: timings.watchdog_first_tick,
            recovery_hold: timings.recovery_hold,
        }
    }

    /// One observation. Returns `true` if a recovery cycle ran.
    pub async fn tick(&self) -> bool {
        if !self.engine.watchdog_tick().await {
            let idle = self.engine.idle_ticks().await;
            debug!("[watchdog] Idle ticks: {idle}");
            return false;
        }
        warn!("[watchdog] Module silent, power cycling");
        self.power.power_cycle().await;
        Timer::after(self.recovery_hold).await;
        info!("[watchdog] Recovery hold over");
        true
    }

    pub async fn run(&self) -> ! {
        Timer::after(self.first_tick).await;
        let mut ticker = Ticker::every(self.period);
        loop {
            self.tick().await;
            ticker.next().await;
        }
    }
}
