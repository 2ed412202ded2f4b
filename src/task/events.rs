use crate::cfg::modem_cfg::EVENT_QUEUE_DEPTH;
use crate::modem::RegistrationStatus;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use log::warn;
use serde::{Deserialize, Serialize};

/// State changes published by the pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModemEvent {
    RegistrationChanged(RegistrationStatus),
    /// Normalized strength, 0..=10.
    SignalStrengthChanged(u8),
}

/// Subscriber for poller notifications.
///
/// Called synchronously on the polling task, so implementations must not
/// block.
pub trait ModemObserver {
    fn on_registration_changed(&self, status: RegistrationStatus);
    fn on_signal_strength_changed(&self, signal: u8);
}

impl<T: ModemObserver + ?Sized> ModemObserver for &T {
    fn on_registration_changed(&self, status: RegistrationStatus) {
        (**self).on_registration_changed(status)
    }

    fn on_signal_strength_changed(&self, signal: u8) {
        (**self).on_signal_strength_changed(signal)
    }
}

impl<M: RawMutex, const N: usize> ModemObserver for Channel<M, ModemEvent, N> {
    fn on_registration_changed(&self, status: RegistrationStatus) {
        publish(self, ModemEvent::RegistrationChanged(status));
    }

    fn on_signal_strength_changed(&self, signal: u8) {
        publish(self, ModemEvent::SignalStrengthChanged(signal));
    }
}

fn publish<M: RawMutex, const N: usize>(chan: &Channel<M, ModemEvent, N>, event: ModemEvent) {
    if chan.try_send(event).is_err() {
        warn!("[events] Queue full, dropping {event:?}");
    }
}

pub type ModemEventChannel = Channel<CriticalSectionRawMutex, ModemEvent, EVENT_QUEUE_DEPTH>;

pub static MODEM_EVENT_CHAN: ModemEventChannel = Channel::new();
