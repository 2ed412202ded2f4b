use crate::cfg::modem_cfg::{ACTION_QUEUE_DEPTH, MAX_PHONE_LENGTH};
use crate::modem::{ModemController, ModemError, ModemPort};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use embedded_hal::digital::OutputPin;
use heapless::String;
use log::{info, warn};

pub type PhoneNumber = String<MAX_PHONE_LENGTH>;

/// Requests from buttons and other interrupt-style producers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemAction {
    TurnOn,
    TurnOff,
    Reset,
    Call(PhoneNumber),
    Answer,
    Hangup,
    AutoAnswer(u8),
    QueryCallStatus,
}

impl ModemAction {
    pub fn call(number: &str) -> Result<Self, ModemError> {
        PhoneNumber::try_from(number)
            .map(ModemAction::Call)
            .map_err(|_| ModemError::InvalidArgument("number too long"))
    }
}

pub type ModemActionChannel = Channel<CriticalSectionRawMutex, ModemAction, ACTION_QUEUE_DEPTH>;

pub static MODEM_ACTION_CHAN: ModemActionChannel = Channel::new();

/// Runs the controller operation matching `action`.
pub async fn dispatch<P, PWR, RST>(
    controller: &ModemController<'_, P, PWR, RST>,
    action: &ModemAction,
) -> Result<(), ModemError>
where
    P: ModemPort,
    PWR: OutputPin,
    RST: OutputPin,
{
    info!("[action] {action:?}");
    match action {
        ModemAction::TurnOn => controller.turn_on().await,
        ModemAction::TurnOff => controller.turn_off().await,
        ModemAction::Reset => controller.reset().await,
        ModemAction::Call(number) => controller.call(number).await?,
        ModemAction::Answer => controller.answer().await,
        ModemAction::Hangup => controller.hangup().await,
        ModemAction::AutoAnswer(rings) => controller.auto_answer(*rings).await?,
        ModemAction::QueryCallStatus => {
            controller.call_status().await;
        }
    }
    Ok(())
}

/// Drains `actions` forever, one at a time.
pub async fn action_handler<P, PWR, RST, M, const N: usize>(
    controller: &ModemController<'_, P, PWR, RST>,
    actions: &Channel<M, ModemAction, N>,
) -> !
where
    P: ModemPort,
    PWR: OutputPin,
    RST: OutputPin,
    M: RawMutex,
{
    loop {
        let action = actions.receive().await;
        if let Err(e) = dispatch(controller, &action).await {
            warn!("[action] {action:?} rejected: {e}");
        }
    }
}
