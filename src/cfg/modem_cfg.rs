use embassy_time::Duration;

// UART configuration constants
pub const MODEM_BAUD_RATE: u32 = 115_200;
pub const RESPONSE_CAPACITY: usize = 256;
pub const COMMAND_CAPACITY: usize = 64;
pub const OPERATOR_NAME_CAPACITY: usize = 32;
pub const MAX_PHONE_LENGTH: usize = 20;

// Exchange timing (milliseconds)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 500;
pub const LIVENESS_TIMEOUT_MS: u64 = 500;
pub const SIGNAL_QUERY_TIMEOUT_MS: u64 = 1000;
pub const QUIET_PERIOD_MS: u64 = 100;

// Periodic task schedule (milliseconds)
pub const STATUS_POLL_PERIOD_MS: u64 = 1000;
pub const SIGNAL_POLL_PERIOD_MS: u64 = 1000;
pub const WATCHDOG_PERIOD_MS: u64 = 5000;
pub const WATCHDOG_FIRST_TICK_MS: u64 = 2;
pub const WATCHDOG_IDLE_THRESHOLD: u32 = 10;

// Control line pulses (milliseconds)
pub const POWER_PULSE_MS: u64 = 1200;
pub const POWER_CYCLE_GAP_MS: u64 = 1200;
pub const RESET_PULSE_MS: u64 = 500;
pub const RECOVERY_HOLD_MS: u64 = 5000;

// Event and action queue depths
pub const EVENT_QUEUE_DEPTH: usize = 16;
pub const ACTION_QUEUE_DEPTH: usize = 4;

// Front panel buttons
pub const BUTTON_DEBOUNCE_MS: u64 = 200;

/// Every timing contract of the modem stack in one place.
///
/// `Default` yields the production values. Tests build
/// a compressed copy so that full recovery sequences run in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemTimings {
    pub response_timeout: Duration,
    pub liveness_timeout: Duration,
    pub signal_query_timeout: Duration,
    pub quiet_period: Duration,
    pub status_period: Duration,
    pub signal_period: Duration,
    pub watchdog_period: Duration,
    pub watchdog_first_tick: Duration,
    pub power_pulse: Duration,
    pub power_cycle_gap: Duration,
    pub reset_pulse: Duration,
    pub recovery_hold: Duration,
}

impl Default for ModemTimings {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            liveness_timeout: Duration::from_millis(LIVENESS_TIMEOUT_MS),
            signal_query_timeout: Duration::from_millis(SIGNAL_QUERY_TIMEOUT_MS),
            quiet_period: Duration::from_millis(QUIET_PERIOD_MS),
            status_period: Duration::from_millis(STATUS_POLL_PERIOD_MS),
            signal_period: Duration::from_millis(SIGNAL_POLL_PERIOD_MS),
            watchdog_period: Duration::from_millis(WATCHDOG_PERIOD_MS),
            watchdog_first_tick: Duration::from_millis(WATCHDOG_FIRST_TICK_MS),
            power_pulse: Duration::from_millis(POWER_PULSE_MS),
            power_cycle_gap: Duration::from_millis(POWER_CYCLE_GAP_MS),
            reset_pulse: Duration::from_millis(RESET_PULSE_MS),
            recovery_hold: Duration::from_millis(RECOVERY_HOLD_MS),
        }
    }
}
