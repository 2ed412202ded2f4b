use core::cell::Cell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use serde::{Deserialize, Serialize};

/// Network registration state as reported by `+CREG:`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    NotRegisteredIdle,
    Registered,
    NotRegisteredSearching,
    RegistrationDenied,
    RegisteredRoaming,
    #[default]
    Unknown,
}

impl RegistrationStatus {
    pub fn is_registered(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Registered | RegistrationStatus::RegisteredRoaming
        )
    }
}

/// Phone activity as reported by `+CPAS:`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    Ready,
    Unavailable,
    #[default]
    StatusUnknown,
    Ringing,
    CallInProgress,
    Asleep,
}

/// Latest known module state, shared between the pollers and the controller.
pub struct ModemState {
    registration: Mutex<CriticalSectionRawMutex, Cell<RegistrationStatus>>,
    signal: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    call: Mutex<CriticalSectionRawMutex, Cell<CallStatus>>,
}

impl ModemState {
    pub const fn new() -> Self {
        Self {
            registration: Mutex::new(Cell::new(RegistrationStatus::Unknown)),
            signal: Mutex::new(Cell::new(0)),
            call: Mutex::new(Cell::new(CallStatus::StatusUnknown)),
        }
    }

    pub fn registration(&self) -> RegistrationStatus {
        self.registration.lock(Cell::get)
    }

    /// Stores `status` and returns the value it replaced.
    pub fn replace_registration(&self, status: RegistrationStatus) -> RegistrationStatus {
        self.registration.lock(|cell| cell.replace(status))
    }

    pub fn signal_strength(&self) -> u8 {
        self.signal.lock(Cell::get)
    }

    pub fn replace_signal_strength(&self, signal: u8) -> u8 {
        self.signal.lock(|cell| cell.replace(signal))
    }

    pub fn call_status(&self) -> CallStatus {
        self.call.lock(Cell::get)
    }

    pub fn set_call_status(&self, status: CallStatus) {
        self.call.lock(|cell| cell.set(status));
    }

    pub fn snapshot(&self) -> ModemSnapshot {
        ModemSnapshot {
            registration: self.registration(),
            signal_strength: self.signal_strength(),
            call_status: self.call_status(),
        }
    }
}

impl Default for ModemState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view handed to display and relay consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModemSnapshot {
    pub registration: RegistrationStatus,
    pub signal_strength: u8,
    pub call_status: CallStatus,
}

impl ModemSnapshot {
    /// Renders the snapshot as JSON into `buf`. `None` if `buf` is too small.
    pub fn to_json<'b>(&self, buf: &'b mut [u8]) -> Option<&'b str> {
        let len = serde_json_core::to_slice(self, buf).ok()?;
        core::str::from_utf8(&buf[..len]).ok()
    }
}
