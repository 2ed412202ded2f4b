// src/task/mod.rs
pub mod action;
pub mod events;
pub mod signal;
pub mod status;
pub mod watchdog;

pub use action::{action_handler, dispatch, ModemAction, MODEM_ACTION_CHAN};
pub use events::{ModemEvent, ModemObserver, MODEM_EVENT_CHAN};
pub use signal::SignalPoller;
pub use status::StatusPoller;
pub use watchdog::Watchdog;
