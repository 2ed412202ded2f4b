//! Parsers for the module's free-form replies.
//!
//! The wire protocol has no framing beyond markers such as `+CREG:`, so each
//! parser searches for its marker and reads the fields that follow it. None
//! of them fail hard: a missing marker is reported as `None` or a neutral
//! default and the caller decides what that means for its state.

use crate::modem::status::{CallStatus, RegistrationStatus};

pub const CREG_MARKER: &str = "+CREG:";
pub const CSQ_MARKER: &str = "+CSQ:";
pub const CPAS_MARKER: &str = "+CPAS:";
pub const ADC_MARKER: &str = "#ADC:";
const ADC_TRAILER: &str = "OK";

const CSQ_RAW_MAX: u32 = 31;
const SIGNAL_SCALE_MAX: u32 = 10;
const ADC_OFFSET: i32 = 600;
const ADC_SCALE: f32 = 10.0;

/// Registration status from an `AT+CREG?` reply.
///
/// `None` when the reply carries no `+CREG:` marker. Stat 4 ("unknown" in the
/// module's own table) yields `previous` so that a known state is not lost.
pub fn parse_registration(
    text: &str,
    previous: RegistrationStatus,
) -> Option<RegistrationStatus> {
    let fields = fields_after(text, CREG_MARKER)?;
    let mut parts = fields.split(',');
    let first = parts.next().unwrap_or_default();
    // `+CREG: <n>,<stat>[,<lac>,<ci>]` in query form, `+CREG: <stat>` unsolicited
    let stat = parts.next().unwrap_or(first);

    Some(match leading_digit(stat) {
        Some(0) => RegistrationStatus::NotRegisteredIdle,
        Some(1) => RegistrationStatus::Registered,
        Some(2) => RegistrationStatus::NotRegisteredSearching,
        Some(3) => RegistrationStatus::RegistrationDenied,
        Some(4) => previous,
        Some(5) => RegistrationStatus::RegisteredRoaming,
        _ => RegistrationStatus::Unknown,
    })
}

/// `<rssi>` field of a `+CSQ:` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    /// Raw reading, 0..31 or 99 for unknown.
    Raw(u8),
    /// Field present but empty or not a number.
    Unreadable,
}

impl SignalQuality {
    /// Strength on the 0..=10 scale; an unreadable field is no signal.
    pub fn strength(self) -> u8 {
        match self {
            SignalQuality::Raw(raw) => normalize_signal(raw),
            SignalQuality::Unreadable => 0,
        }
    }
}

/// `<rssi>` from an `AT+CSQ` reply, `None` without the `+CSQ:` marker.
pub fn parse_signal_quality(text: &str) -> Option<SignalQuality> {
    let fields = fields_after(text, CSQ_MARKER)?;
    let rssi = fields.split(',').next().unwrap_or_default();
    Some(match leading_number(rssi) {
        Some(raw) => SignalQuality::Raw(raw.min(u8::MAX as u32) as u8),
        None => SignalQuality::Unreadable,
    })
}

/// Remaps a raw reading onto 0..10 with the module's inverted convention:
/// `10 - floor(raw * 10 / 31)`. Readings above 31 count as 31.
pub fn normalize_signal(raw: u8) -> u8 {
    let raw = (raw as u32).min(CSQ_RAW_MAX);
    (SIGNAL_SCALE_MAX - raw * SIGNAL_SCALE_MAX / CSQ_RAW_MAX) as u8
}

/// Phone activity from an `AT+CPAS` reply.
pub fn parse_call_status(text: &str) -> CallStatus {
    let Some(fields) = fields_after(text, CPAS_MARKER) else {
        return CallStatus::StatusUnknown;
    };
    match leading_digit(fields) {
        Some(0) => CallStatus::Ready,
        Some(1) => CallStatus::Unavailable,
        Some(3) => CallStatus::Ringing,
        Some(4) => CallStatus::CallInProgress,
        Some(5) => CallStatus::Asleep,
        _ => CallStatus::StatusUnknown,
    }
}

/// Temperature from an `AT#ADC=2,2,0` reply, e.g. `#ADC: 846OK` is 24.6.
///
/// 0.0 when the marker is missing or the payload is not a number.
pub fn parse_temperature(text: &str) -> f32 {
    let Some(start) = text.find(ADC_MARKER) else {
        return 0.0;
    };
    let rest = &text[start + ADC_MARKER.len()..];
    let payload = match rest.find(ADC_TRAILER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    match payload.trim().parse::<i32>().map(|raw| raw.checked_sub(ADC_OFFSET)) {
        Ok(Some(offset)) => offset as f32 / ADC_SCALE,
        _ => 0.0,
    }
}

/// Operator name: the text inside the first pair of double quotes.
pub fn parse_network_name(text: &str) -> &str {
    let Some(open) = text.find('"') else {
        return "";
    };
    let rest = &text[open + 1..];
    match rest.find('"') {
        Some(close) => &rest[..close],
        None => "",
    }
}

/// The rest of the line following `marker`, trimmed.
fn fields_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let line = text[start..].split(['\r', '\n']).next().unwrap_or_default();
    Some(line.trim())
}

fn leading_digit(field: &str) -> Option<u32> {
    field.trim_start().chars().next()?.to_digit(10)
}

fn leading_number(field: &str) -> Option<u32> {
    let field = field.trim_start();
    let end = field
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(field.len());
    field[..end].parse().ok()
}
