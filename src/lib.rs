#![cfg_attr(not(test), no_std)]

//! AT-command control of a GSM voice modem over a UART.
//!
//! [`modem`] owns the serial exchange, the command engine, response parsing
//! and the controller operations. [`task`] holds the periodic pollers, the
//! watchdog and the action/event queues that the firmware spawns as embassy
//! tasks.

pub mod cfg;
pub mod modem;
pub mod task;

#[cfg(test)]
mod mock;

pub use cfg::modem_cfg::ModemTimings;
pub use modem::{
    AtCommandEngine, CallStatus, CommandOutcome, ModemController, ModemError, ModemSnapshot,
    ModemState, PowerLines, RegistrationStatus,
};
pub use task::{ModemAction, ModemEvent, ModemObserver, SignalPoller, StatusPoller, Watchdog};
