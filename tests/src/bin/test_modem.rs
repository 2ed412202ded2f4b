#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    timer::timg::TimerGroup,
    uart::{Config, Uart},
};
use gsm_modem::cfg::modem_cfg::MODEM_BAUD_RATE;
use gsm_modem::modem::{AtCommandEngine, CommandOutcome, ModemController, ModemState, PowerLines};
use gsm_modem::task::{ModemObserver, SignalPoller, StatusPoller};
use gsm_modem::{ModemTimings, RegistrationStatus};
use log::{error, info, warn};

struct LogObserver;

impl ModemObserver for LogObserver {
    fn on_registration_changed(&self, status: RegistrationStatus) {
        info!("Registration changed to {status:?}");
    }

    fn on_signal_strength_changed(&self, signal: u8) {
        info!("Signal changed to {signal}/10");
    }
}

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) -> ! {
    // Initialize ESP HAL for ESP32C6
    esp_println::logger::init_logger_from_env();
    info!("Initializing HAL...");
    let peripherals = esp_hal::init({
        let config = esp_hal::Config::default();
        config.with_cpu_clock(CpuClock::max())
    });
    let timg1 = TimerGroup::new(peripherals.TIMG1);
    esp_hal_embassy::init(timg1.timer0);

    let power_pin = Output::new(peripherals.GPIO21, Level::Low, OutputConfig::default());
    let reset_pin = Output::new(peripherals.GPIO22, Level::Low, OutputConfig::default());
    let uart0 = Uart::new(
        peripherals.UART0,
        Config::default().with_baudrate(MODEM_BAUD_RATE),
    )
    .unwrap()
    .with_rx(peripherals.GPIO15)
    .with_tx(peripherals.GPIO23)
    .into_async();

    let timings = ModemTimings::default();
    let engine = AtCommandEngine::new(uart0, &timings);
    let lines = PowerLines::new(power_pin, reset_pin, &timings);
    let state = ModemState::new();
    let controller = ModemController::new(&engine, &lines, &state, &timings);

    info!("=== Power up ===");
    controller.turn_on().await;
    // Give the module time to boot before probing it
    Timer::after(Duration::from_secs(5)).await;

    match engine.execute("AT", "OK", timings.liveness_timeout).await {
        CommandOutcome::Matched(_) => info!("✓ Module answers AT"),
        CommandOutcome::Mismatch(raw) => warn!("⚠ Unexpected reply to AT: {raw:?}"),
        CommandOutcome::Timeout => {
            error!("✗ Module silent after power up");
            panic!("Cannot continue without a responsive module");
        }
    }

    info!("=== Setup sequence ===");
    controller.disable_echo().await;
    controller.initialize().await;
    match engine.execute("AT", "OK", timings.liveness_timeout).await {
        CommandOutcome::Matched(_) => info!("✓ Echo disabled, bare OK"),
        other => warn!("⚠ Liveness probe after setup: {other:?}"),
    }

    info!("=== Queries ===");
    let status = StatusPoller::new(&engine, &state, LogObserver, &timings);
    let signal = SignalPoller::new(&engine, &state, LogObserver, &timings);
    for _ in 0..10 {
        status.tick().await;
        signal.tick().await;
        if state.registration().is_registered() {
            break;
        }
        Timer::after(Duration::from_secs(1)).await;
    }
    info!("Registration: {:?}", controller.registration_status());
    info!("Signal: {}/10", controller.signal_strength());
    info!("Operator: {:?}", controller.network_name().await);
    info!("Temperature: {} C", controller.temperature().await);
    info!("Call status: {:?}", controller.call_status().await);

    info!("=== Argument validation ===");
    match controller.call("0000").await {
        Err(e) => info!("✓ Rejected local number: {e}"),
        Ok(()) => error!("✗ Local number was dialled"),
    }

    info!("=== Modem smoke test completed ===");

    loop {
        Timer::after(Duration::from_secs(5)).await;
        status.tick().await;
        signal.tick().await;
    }
}
