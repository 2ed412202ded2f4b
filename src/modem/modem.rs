use crate::cfg::modem_cfg::{ModemTimings, MAX_PHONE_LENGTH, OPERATOR_NAME_CAPACITY};
use crate::modem::atcmd::{format_command, AtCommandEngine};
use crate::modem::interface::ModemPort;
use crate::modem::power::PowerLines;
use crate::modem::response::{parse_call_status, parse_network_name, parse_temperature};
use crate::modem::status::{CallStatus, ModemSnapshot, ModemState, RegistrationStatus};
use crate::modem::ModemError;
use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use heapless::String;
use log::{debug, info, warn};

/// Module setup sent once after power-up. Replies are not checked.
pub const INIT_COMMANDS: [&str; 9] = [
    // Audio codec full rate (DTMF needs it)
    "AT#CODEC=1",
    // Hands-free audio path
    "AT#CAP=1",
    // Echo canceller
    "AT#SHFEC=1",
    // Ringer tone
    "AT#SRS=26,0",
    // Microphone gain (0 to 7)
    "AT#HFMICG=7",
    // SMS text mode
    "AT+CMGF=1",
    // Ringer path to hands-free
    "AT#SRP=1",
    // Ringer sound level
    "AT+CRSL=2",
    // Phonebook on the SIM
    "AT+CPBS=\"SM\"",
];

/// Public face of the modem: power control, calls and one-shot queries.
///
/// Every operation is a short orchestration over the shared
/// [`AtCommandEngine`], so it queues behind whatever exchange a poller has
/// in flight.
pub struct ModemController<'a, P, PWR, RST> {
    engine: &'a AtCommandEngine<P>,
    power: &'a PowerLines<PWR, RST>,
    state: &'a ModemState,
    liveness_timeout: Duration,
}

impl<'a, P, PWR, RST> ModemController<'a, P, PWR, RST>
where
    P: ModemPort,
    PWR: OutputPin,
    RST: OutputPin,
{
    pub fn new(
        engine: &'a AtCommandEngine<P>,
        power: &'a PowerLines<PWR, RST>,
        state: &'a ModemState,
        timings: &ModemTimings,
    ) -> Self {
        Self {
            engine,
            power,
            state,
            liveness_timeout: timings.liveness_timeout,
        }
    }

    /// Pulses the power line unless the module already answers `OK`.
    pub async fn turn_on(&self) {
        info!("[modem] Turn on");
        let probe = self
            .engine
            .execute("AT", "OK", self.liveness_timeout)
            .await;
        if probe.is_matched() {
            info!("[modem] Module already on");
            return;
        }
        debug!("[modem] Liveness probe: {probe:?}");
        self.power.pulse_power().await;
    }

    /// Pulses the power line if the module answers at all.
    pub async fn turn_off(&self) {
        info!("[modem] Turn off");
        let probe = self
            .engine
            .execute("AT", "OK", self.liveness_timeout)
            .await;
        if probe.is_timeout() {
            info!("[modem] Module already off");
            return;
        }
        self.power.pulse_power().await;
    }

    pub async fn reset(&self) {
        self.power.pulse_reset().await;
    }

    /// Dials `number`, which must be in international format (`+44...`).
    pub async fn call(&self, number: &str) -> Result<(), ModemError> {
        if !number.starts_with('+') {
            warn!("[modem] Refusing to dial {number}: missing '+' prefix");
            return Err(ModemError::InvalidArgument("number must start with '+'"));
        }
        if number.len() > MAX_PHONE_LENGTH {
            warn!("[modem] Refusing to dial {number}: longer than {MAX_PHONE_LENGTH}");
            return Err(ModemError::InvalidArgument("number too long"));
        }
        let command = format_command(format_args!("ATD{number};"))?;
        info!("[modem] Calling {number}");
        self.engine.send(&command).await;
        Ok(())
    }

    pub async fn answer(&self) {
        info!("[modem] Answer");
        let response = self.engine.send("ATA").await;
        debug!("[modem] ATA -> {response:?}");
    }

    pub async fn hangup(&self) {
        info!("[modem] Hang up");
        self.engine.send("ATH").await;
    }

    /// Answer after `rings` rings; 0 turns auto-answer off.
    pub async fn auto_answer(&self, rings: u8) -> Result<(), ModemError> {
        info!("[modem] Auto answer after {rings} rings");
        let command = format_command(format_args!("ATS0={rings}"))?;
        self.engine.send(&command).await;
        Ok(())
    }

    /// Module temperature in degrees Celsius, 0.0 if unavailable.
    pub async fn temperature(&self) -> f32 {
        let response = self.engine.send("AT#ADC=2,2,0").await;
        parse_temperature(&response)
    }

    /// Registered operator name, empty if unavailable.
    pub async fn network_name(&self) -> String<OPERATOR_NAME_CAPACITY> {
        let response = self.engine.send("AT+COPS?").await;
        let mut name = String::new();
        for c in parse_network_name(&response).chars() {
            if name.push(c).is_err() {
                warn!("[modem] Operator name truncated to {OPERATOR_NAME_CAPACITY} bytes");
                break;
            }
        }
        name
    }

    /// Probes phone activity with `AT+CPAS` and records the result.
    pub async fn call_status(&self) -> CallStatus {
        let response = self.engine.send("AT+CPAS").await;
        let status = parse_call_status(&response);
        info!("[modem] Call status: {status:?}");
        self.state.set_call_status(status);
        status
    }

    /// Turns command echo off so liveness probes see a bare `OK`.
    pub async fn disable_echo(&self) {
        info!("[modem] Disable echo");
        let response = self.engine.send("ATE0").await;
        debug!("[modem] ATE0 -> {response:?}");
    }

    pub async fn initialize(&self) {
        info!("[modem] Sending {} setup commands", INIT_COMMANDS.len());
        for command in INIT_COMMANDS {
            self.engine.send(command).await;
        }
        info!("[modem] Setup complete");
    }

    pub fn registration_status(&self) -> RegistrationStatus {
        self.state.registration()
    }

    pub fn signal_strength(&self) -> u8 {
        self.state.signal_strength()
    }

    pub fn snapshot(&self) -> ModemSnapshot {
        self.state.snapshot()
    }
}
