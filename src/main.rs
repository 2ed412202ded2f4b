#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
#[cfg(feature = "wdg")]
use esp_hal::rtc_cntl::{Rtc, RwdtStage};
#[cfg(feature = "wdg")]
use esp_hal::time::ExtU64;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    timer::timg::TimerGroup,
    uart::{Config, RxConfig, Uart},
    Async,
};
use gsm_modem::cfg::modem_cfg::{BUTTON_DEBOUNCE_MS, MODEM_BAUD_RATE};
use gsm_modem::modem::{AtCommandEngine, ModemController, ModemState, PowerLines};
use gsm_modem::task::action::{action_handler, ModemAction, MODEM_ACTION_CHAN};
use gsm_modem::task::events::{ModemEvent, ModemEventChannel, MODEM_EVENT_CHAN};
use gsm_modem::task::{SignalPoller, StatusPoller, Watchdog};
use gsm_modem::ModemTimings;
use log::{info, warn};

type ModemUart = Uart<'static, Async>;
type ModemEngine = AtCommandEngine<ModemUart>;
type ModemLines = PowerLines<Output<'static>, Output<'static>>;
type Controller = ModemController<'static, ModemUart, Output<'static>, Output<'static>>;

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

// Front panel: answer, hang up, restart the module, query call status
static ANSWER_BUTTON: [ModemAction; 1] = [ModemAction::Answer];
static HANGUP_BUTTON: [ModemAction; 1] = [ModemAction::Hangup];
static RESTART_BUTTON: [ModemAction; 2] = [ModemAction::Reset, ModemAction::TurnOn];
static STATUS_BUTTON: [ModemAction; 1] = [ModemAction::QueryCallStatus];

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init({
        let config = esp_hal::Config::default();
        config.with_cpu_clock(CpuClock::max())
    });
    info!("GSM modem control started");
    let timg1 = TimerGroup::new(peripherals.TIMG1);
    esp_hal_embassy::init(timg1.timer0);

    #[cfg(feature = "wdg")]
    let mut rtc = {
        let mut rtc = Rtc::new(peripherals.LPWR);
        rtc.rwdt.enable();
        rtc.rwdt.set_timeout(RwdtStage::Stage0, 5.secs());
        rtc
    };

    let uart_tx_pin = peripherals.GPIO23;
    let uart_rx_pin = peripherals.GPIO15;
    // Both lines idle low, a high pulse is the action
    let power_pin = Output::new(peripherals.GPIO21, Level::Low, OutputConfig::default());
    let reset_pin = Output::new(peripherals.GPIO22, Level::Low, OutputConfig::default());

    let config = Config::default()
        .with_baudrate(MODEM_BAUD_RATE)
        .with_rx(RxConfig::default().with_fifo_full_threshold(64));
    // SAFETY: UART0 is guaranteed to be available and the pins are correctly configured.
    // If this fails, it's a hardware configuration error, and we cannot proceed.
    let uart0 = Uart::new(peripherals.UART0, config)
        .expect("UART0 initialization failed: check hardware configuration")
        .with_rx(uart_rx_pin)
        .with_tx(uart_tx_pin)
        .into_async();

    let timings = ModemTimings::default();
    let engine = &*mk_static!(ModemEngine, AtCommandEngine::new(uart0, &timings));
    let lines = &*mk_static!(ModemLines, PowerLines::new(power_pin, reset_pin, &timings));
    let state = &*mk_static!(ModemState, ModemState::new());
    let controller = &*mk_static!(
        Controller,
        ModemController::new(engine, lines, state, &timings)
    );

    controller.turn_on().await;
    controller.disable_echo().await;
    controller.initialize().await;

    spawner
        .spawn(status_task(StatusPoller::new(
            engine,
            state,
            &MODEM_EVENT_CHAN,
            &timings,
        )))
        .ok();
    spawner
        .spawn(signal_task(SignalPoller::new(
            engine,
            state,
            &MODEM_EVENT_CHAN,
            &timings,
        )))
        .ok();
    spawner
        .spawn(watchdog_task(Watchdog::new(engine, lines, &timings)))
        .ok();
    spawner.spawn(action_task(controller)).ok();
    spawner.spawn(event_logger()).ok();

    let answer = Input::new(peripherals.GPIO4, pull_up());
    let hangup = Input::new(peripherals.GPIO5, pull_up());
    let restart = Input::new(peripherals.GPIO6, pull_up());
    let status = Input::new(peripherals.GPIO7, pull_up());
    spawner.spawn(button_task(answer, &ANSWER_BUTTON)).ok();
    spawner.spawn(button_task(hangup, &HANGUP_BUTTON)).ok();
    spawner.spawn(button_task(restart, &RESTART_BUTTON)).ok();
    spawner.spawn(button_task(status, &STATUS_BUTTON)).ok();

    let operator = controller.network_name().await;
    let temperature = controller.temperature().await;
    info!("[main] Operator: {operator}, temperature: {temperature} C");

    // WDG feed task
    let mut json = [0u8; 128];
    loop {
        Timer::after_secs(2).await;
        #[cfg(feature = "wdg")]
        rtc.rwdt.feed();
        if let Some(snapshot) = controller.snapshot().to_json(&mut json) {
            info!("[main] {snapshot}");
        }
    }
}

fn pull_up() -> InputConfig {
    InputConfig::default().with_pull(Pull::Up)
}

#[embassy_executor::task]
async fn status_task(poller: StatusPoller<'static, ModemUart, &'static ModemEventChannel>) -> ! {
    poller.run().await
}

#[embassy_executor::task]
async fn signal_task(poller: SignalPoller<'static, ModemUart, &'static ModemEventChannel>) -> ! {
    poller.run().await
}

#[embassy_executor::task]
async fn watchdog_task(watchdog: Watchdog<'static, ModemUart, Output<'static>, Output<'static>>) -> ! {
    watchdog.run().await
}

#[embassy_executor::task]
async fn action_task(controller: &'static Controller) -> ! {
    action_handler(controller, &MODEM_ACTION_CHAN).await
}

#[embassy_executor::task]
async fn event_logger() -> ! {
    loop {
        match MODEM_EVENT_CHAN.receive().await {
            ModemEvent::RegistrationChanged(status) => {
                info!("[events] Registration changed to {status:?}")
            }
            ModemEvent::SignalStrengthChanged(signal) => {
                info!("[events] Signal changed to {signal}/10")
            }
        }
    }
}

#[embassy_executor::task(pool_size = 4)]
async fn button_task(mut button: Input<'static>, actions: &'static [ModemAction]) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        for action in actions {
            if MODEM_ACTION_CHAN.try_send(action.clone()).is_err() {
                warn!("[button] Action queue full, dropping {action:?}");
            }
        }
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
    }
}
