mod console;
mod http_client;
mod power;
mod runtime_diagnostics;
mod storage;
mod time_sync;
mod watchdog;
mod wifi;

use core::cell::RefCell;
use std::io::ErrorKind;
use std::time::Instant;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::{
    delay::FreeRtos,
    gpio::{AnyIOPin, PinDriver},
    peripherals::Peripherals,
    spi::{config::Config, SpiDeviceDriver, SpiDriver, SpiDriverConfig},
    units::Hertz,
};

use satori_screen::aggregator::{Aggregator, AggregatorConfig};
use satori_screen::clock::{Clock, SystemClock};
use satori_screen::detector::{ChangeDetector, RetentionPolicy};
use satori_screen::eink::PanelPresenter;
use satori_screen::gate::{FileGateStore, RefreshGate, DEFAULT_MIN_INTERVAL_SECS};
use satori_screen::history::FileHistoryStore;
use satori_screen::keepalive::KeepAlive;
use satori_screen::session::Session;
use satori_screen::settings::{provision, Settings, SETTINGS_FILE_NAME};
use satori_screen::thresholds::ChangeThresholds;
use satori_screen::{CycleOutcome, Orchestrator, OrchestratorConfig};
use ssd1680::{Builder, Display, FrameBuffer, Interface};

use console::SerialConsole;
use http_client::EspFetcher;
use runtime_diagnostics::{log_heap, log_reset_reason};
use watchdog::TaskWatchdog;
use wifi::WifiLink;

/// Panel SPI clock
const PANEL_SPI_HZ: u32 = 4_000_000;

const BANNER: &[&str] = &[
    "+----------------------------------------------+",
    "|           Welcome to Satori Screen           |",
    "|               www.satorinet.io               |",
    "+----------------------------------------------+",
];

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log_reset_reason();
    log_heap("startup");

    match run() {
        Ok(()) => log::info!("Hourly restart"),
        Err(err) => log::error!("Runtime error: {}", err),
    }
    power::restart();
}

fn run() -> Result<(), String> {
    let booted = Instant::now();
    let session = Session::default();
    let peripherals =
        Peripherals::take().map_err(|err| format!("peripherals unavailable: {}", err))?;
    let sys_loop =
        EspSystemEventLoop::take().map_err(|err| format!("event loop unavailable: {}", err))?;

    storage::mount()?;
    let settings = load_settings()?;

    let mut wifi = WifiLink::new(peripherals.modem, sys_loop)?;
    wifi.connect(&settings.wifi_ssid, &settings.wifi_password)?;
    log_heap("wifi_up");

    let mut watchdog = TaskWatchdog::new(!storage::exists(storage::NO_WATCHDOG_FILE))?;
    watchdog.feed();
    let _sntp = time_sync::sync(&mut watchdog)?;

    // Waveshare 2.9" V2 on SPI2: SCLK 8, MOSI 10, CS 21, DC 4, RST 5, BUSY 6
    let spi = SpiDriver::new(
        peripherals.spi2,
        peripherals.pins.gpio8,
        peripherals.pins.gpio10,
        None::<AnyIOPin>,
        &SpiDriverConfig::default(),
    )
    .map_err(|err| format!("spi init failed: {}", err))?;
    let spi_config = Config::default()
        .baudrate(Hertz(PANEL_SPI_HZ))
        .data_mode(embedded_hal::spi::MODE_0);
    let spi_device = SpiDeviceDriver::new(spi, Some(peripherals.pins.gpio21), &spi_config)
        .map_err(|err| format!("spi device init failed: {}", err))?;

    let pin_err = |err| format!("panel pin init failed: {}", err);
    let dc = PinDriver::output(peripherals.pins.gpio4).map_err(pin_err)?;
    let rst = PinDriver::output(peripherals.pins.gpio5).map_err(pin_err)?;
    let busy = PinDriver::input(peripherals.pins.gpio6).map_err(pin_err)?;

    let panel_config = Builder::waveshare_2in9()
        .build()
        .map_err(|err| format!("panel config invalid: {}", err))?;
    let dimensions = panel_config.dimensions;
    let display = Display::new(Interface::new(spi_device, dc, rst, busy), panel_config);
    let presenter = PanelPresenter::new(display, FreeRtos);

    let frame = FrameBuffer::new(vec![0xFF; dimensions.buffer_size()], dimensions)
        .map_err(|err| err.to_string())?;

    let clock = SystemClock;
    let now = clock.now();
    let mut detector = ChangeDetector::load(
        FileHistoryStore::new(storage::path(storage::HISTORY_FILE)),
        ChangeThresholds::default(),
        RetentionPolicy::default(),
        now,
    );
    // The device restarts hourly, so prune once per boot as well
    if let Err(err) = detector.prune(now) {
        log::warn!("History prune not saved: {}", err);
    }
    let gate = RefreshGate::new(
        FileGateStore::new(storage::path(storage::LAST_UPDATE_FILE)),
        DEFAULT_MIN_INTERVAL_SECS,
    );

    let fetcher = EspFetcher::new().map_err(|err| err.to_string())?;
    let aggregator = Aggregator::new(fetcher, FreeRtos, AggregatorConfig::default());

    let config = OrchestratorConfig::default();
    let tick_ms = config.tick_ms;
    let mut orchestrator = Orchestrator::new(
        aggregator, detector, gate, presenter, frame, settings, config,
    );
    log_heap("ready");

    loop {
        watchdog.feed();
        if session.is_over(booted.elapsed()) {
            log::info!("Session over without a screen update");
            break;
        }
        match orchestrator.run_cycle(clock.now(), &mut watchdog) {
            Ok(CycleOutcome::Refreshed { kind }) => {
                log::info!("Screen updated ({:?} refresh)", kind);
                break;
            }
            Ok(CycleOutcome::GateClosed { remaining_secs }) => {
                log::debug!("{} s before the screen may update", remaining_secs);
            }
            Ok(_) => {}
            Err(err) => return Err(err.to_string()),
        }
        FreeRtos::delay_ms(tick_ms);
    }
    log_heap("session_end");

    wifi.shutdown();
    power::reduce_cpu_frequency();
    let remaining = session.remaining(booted.elapsed());
    log::info!("Low power until restart in {} s", remaining.as_secs());
    for _ in 0..remaining.as_secs() {
        watchdog.feed();
        FreeRtos::delay_ms(1_000);
    }
    watchdog.cleanup();
    Ok(())
}

/// Settings from flash, or from the console on first boot. An invalid file
/// is deleted so the next boot asks again.
fn load_settings() -> Result<Settings, String> {
    let path = storage::path(SETTINGS_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(text) => match Settings::parse(&text) {
            Ok(settings) => {
                log::info!("Settings loaded");
                for line in settings.summary() {
                    log::info!("  {}", line);
                }
                Ok(settings)
            }
            Err(err) => {
                log::error!("{}. Deleting the settings file.", err);
                if let Err(remove_err) = storage::remove(SETTINGS_FILE_NAME) {
                    log::warn!("{}", remove_err);
                }
                Err(err.to_string())
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let settings = provision_over_console()?;
            std::fs::write(&path, settings.to_file_contents())
                .map_err(|err| format!("settings not saved: {}", err))?;
            log::info!("Settings saved");
            Ok(settings)
        }
        Err(err) => Err(format!("settings unreadable: {}", err)),
    }
}

fn provision_over_console() -> Result<Settings, String> {
    let console = RefCell::new(SerialConsole::new());
    for line in BANNER {
        console.borrow().write_line(line);
    }
    console
        .borrow()
        .write_line("Settings file not found. Please provide the settings:");

    provision(
        |prompt| console.borrow_mut().ask(prompt),
        |line| console.borrow().write_line(line),
    )
    .ok_or_else(|| String::from("settings not saved, restart to enter them again"))
}
