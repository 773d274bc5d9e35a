//! Kettle bridge firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink   NvsAdapter    SystemClock │
//! │  (Sensor+DigitalIo)   (EventSink)    (Storage+Config)          │
//! │  LogProtocol                                                   │
//! │  (ProtocolPort)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            KettleService (pure logic)                  │    │
//! │  │  FSM · SensorPipeline · ReportGate · Scheduler         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use kettlebridge::adapters::hardware::HardwareAdapter;
use kettlebridge::adapters::log_sink::LogEventSink;
use kettlebridge::adapters::nvs::NvsAdapter;
use kettlebridge::adapters::protocol::LogProtocol;
use kettlebridge::adapters::time::SystemClock;
use kettlebridge::app::ports::ConfigPort;
use kettlebridge::app::service::KettleService;
use kettlebridge::config::KettleConfig;
use kettlebridge::drivers::adc::OneshotAdc;
use kettlebridge::error::Error;
use kettlebridge::events::Event;
use kettlebridge::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("KettleBridge v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().unwrap_or_else(|e| {
        warn!("NVS init failed ({e}), running without persistence");
        NvsAdapter::unavailable()
    });
    let config = match ConfigPort::load(&nvs) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({e}), using defaults");
            KettleConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;

    let adc = OneshotAdc::new().map_err(Error::from)?;

    // Pin numbers: see `pins`.
    let heating = PinDriver::input(io.gpio4)?;
    let mut pairing = PinDriver::input(io.gpio9)?;
    pairing.set_pull(Pull::Up)?;
    let kettle_button = PinDriver::output(io.gpio5)?;
    let led = PinDriver::output(io.gpio8)?;
    info!(
        "GPIO: heating={} kettle_button={} led={} pairing={}",
        pins::HEATING_STATE_GPIO,
        pins::KETTLE_BUTTON_GPIO,
        pins::STATUS_LED_GPIO,
        pins::PAIRING_BUTTON_GPIO
    );

    let mut hw = HardwareAdapter::new(adc, heating, Some(pairing), Some(kettle_button), Some(led))
        .with_pairing_active_low(pins::PAIRING_BUTTON_ACTIVE_LOW);

    // ── 4. Service ────────────────────────────────────────────
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut protocol = LogProtocol::new();
    let mut service = KettleService::new(config);

    service.start(clock.now_ms(), &mut hw, &mut protocol, &mut nvs, &mut sink)?;
    protocol.start();

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        if let Some(joined) = protocol.take_network_change() {
            service.push(Event::Network { joined });
        }

        service.poll(clock.now_ms(), &mut hw, &mut protocol, &mut nvs, &mut sink);

        FreeRtos::delay_ms(service.poll_interval_ms());
    }
}
