use crate::cfg::modem_cfg::ModemTimings;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{Error as _, OutputPin};
use log::{info, warn};

struct Lines<PWR, RST> {
    power: PWR,
    reset: RST,
}

/// Power-enable and reset lines of the module.
///
/// A high pulse on the power line toggles the module on or off; a high
/// pulse on the reset line restarts it. Pin errors are logged and otherwise
/// ignored, these are best-effort hardware actions.
pub struct PowerLines<PWR, RST> {
    lines: Mutex<CriticalSectionRawMutex, Lines<PWR, RST>>,
    power_pulse: Duration,
    power_cycle_gap: Duration,
    reset_pulse: Duration,
}

impl<PWR: OutputPin, RST: OutputPin> PowerLines<PWR, RST> {
    pub fn new(power: PWR, reset: RST, timings: &ModemTimings) -> Self {
        Self {
            lines: Mutex::new(Lines { power, reset }),
            power_pulse: timings.power_pulse,
            power_cycle_gap: timings.power_cycle_gap,
            reset_pulse: timings.reset_pulse,
        }
    }

    pub async fn pulse_power(&self) {
        info!("[power] Toggling module power");
        let mut lines = self.lines.lock().await;
        pulse(&mut lines.power, self.power_pulse).await;
    }

    pub async fn pulse_reset(&self) {
        info!("[power] Resetting module");
        let mut lines = self.lines.lock().await;
        pulse(&mut lines.reset, self.reset_pulse).await;
    }

    /// Off then on again: two power pulses separated by the cycle gap.
    pub async fn power_cycle(&self) {
        info!("[power] Power cycling module");
        let mut lines = self.lines.lock().await;
        pulse(&mut lines.power, self.power_pulse).await;
        Timer::after(self.power_cycle_gap).await;
        pulse(&mut lines.power, self.power_pulse).await;
    }
}

async fn pulse<P: OutputPin>(pin: &mut P, width: Duration) {
    if let Err(e) = pin.set_high() {
        warn!("[power] Failed to drive line high: {:?}", e.kind());
    }
    Timer::after(width).await;
    if let Err(e) = pin.set_low() {
        warn!("[power] Failed to drive line low: {:?}", e.kind());
    }
}
