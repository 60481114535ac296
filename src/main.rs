//! Potentiostat firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  UartTransport          LogEventSink                     │
//! │  (CommandTransport)     (EventSink)                      │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │        Instrument (classify · execute · reply)           │
//! │                                                          │
//! │  SoftI2c over OpenDrainLine ── MAX5217 DAC, MCP3422 ADC  │
//! │  FrontEnd ── cell relay, mode switch, range select       │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use potentiostat::adapters::log_sink::LogEventSink;
use potentiostat::adapters::uart_transport::UartTransport;
use potentiostat::app::service::Instrument;
use potentiostat::config::SystemConfig;
use potentiostat::drivers::front_end::FrontEnd;
use potentiostat::drivers::line::OpenDrainLine;
use potentiostat::drivers::soft_i2c::SoftI2c;
use potentiostat::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("potentiostat v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config: {e}"))?;
    info!(
        "bus: half-bit {} ns (~{} Hz)",
        config.bit_delay_ns,
        config.nominal_clock_hz()
    );

    let peripherals = Peripherals::take()?;

    // ── 2. Two-wire bus ───────────────────────────────────────
    // SAFETY: each GPIO number in `pins` is claimed exactly once below.
    let scl = PinDriver::input_output_od(unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) })?;
    let sda = PinDriver::input_output_od(unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) })?;
    let link = SoftI2c::new(
        OpenDrainLine::new("scl", scl),
        OpenDrainLine::new("sda", sda),
        Ets,
        config.bit_delay_ns,
    );

    // ── 3. Analog front end ───────────────────────────────────
    let output = |gpio: i32| PinDriver::output(unsafe { AnyOutputPin::new(gpio) });
    let front_end = FrontEnd::new(
        output(pins::CELL_ENABLE_GPIO)?,
        output(pins::MODE_GPIO)?,
        [
            output(pins::RANGE_GPIOS[0])?,
            output(pins::RANGE_GPIOS[1])?,
            output(pins::RANGE_GPIOS[2])?,
            output(pins::RANGE_GPIOS[3])?,
        ],
    );

    // ── 4. Host link ──────────────────────────────────────────
    let uart = UartDriver::new(
        peripherals.uart1,
        unsafe { AnyIOPin::new(pins::UART_TX_GPIO) },
        unsafe { AnyIOPin::new(pins::UART_RX_GPIO) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::UART_BAUD)),
    )?;
    let mut transport = UartTransport::new(uart);

    // ── 5. Serve ──────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut instrument = Instrument::new(&config, link, front_end);
    instrument.start(&mut sink);

    info!("ready");
    loop {
        if let Err(e) = instrument.serve_once(&mut transport, &mut sink) {
            warn!("serve: {}", e);
        }
    }
}
