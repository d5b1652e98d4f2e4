//! Plunger - Syringe Pump Firmware
//!
//! Main firmware binary for RP2040-based syringe pumps. A host sets the
//! syringe geometry and flow rate over UART0; the firmware turns them into
//! evenly spaced step pulses on a step/dir driver.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use plunger_core::config::PinConfig;
use plunger_core::PumpConfig;
use plunger_drivers::StepDirDriver;
use plunger_hal::adapter::HalPin;
use plunger_hal::SerialConfig;
use plunger_hal_rp2040::pins::{BoardPeripherals, PinBank, PinError};
use plunger_hal_rp2040::serial::{uart_config, RpSerial};
use plunger_hal_rp2040::time::pulse_delay;

use crate::config::load_config;
use crate::tasks::PumpDriver;

/// Embedded configuration (compiled into firmware)
/// Edit pump.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../pump.toml");

mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Plunger firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut config = load_config(EMBEDDED_CONFIG);
    let BoardPeripherals {
        mut bank,
        uart0,
        uart_tx,
        uart_rx,
    } = BoardPeripherals::split(p);

    // GPIO0/1 belong to the host UART
    if !pins_available(&bank, &config) {
        error!("Configured stepper pins unavailable, using default pins");
        config.pins = PumpConfig::default().pins;
    }

    info!(
        "Device {}, {} pulses/rev, {} mm/rev, {} us pulses",
        config.device_id,
        config.stepper.pulses_per_rev,
        config.stepper.mm_per_rev,
        config.stepper.pulse_width_us
    );

    // Host link
    let line = SerialConfig::new(config.serial.baud_rate);
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(uart0, uart_tx, uart_rx, uart_config(&line));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let serial = RpSerial::new(uart);

    info!(
        "UART0 at {} baud ({} us/byte), frame timeout {} ms",
        line.baudrate,
        line.byte_time_us(),
        config.serial.frame_timeout_ms
    );

    let driver = unwrap!(take_driver(&mut bank, &config));
    info!("Stepper driver initialized");

    unwrap!(spawner.spawn(tasks::pump_task(serial, driver, config)));

    info!("Pump task spawned, firmware running");
}

fn pins_available(bank: &PinBank, config: &PumpConfig) -> bool {
    config
        .pins
        .all()
        .iter()
        .all(|pin| bank.is_available(pin.pin))
}

/// Claim the step, dir and enable outputs
///
/// Each output starts at its inactive level so the driver is not enabled
/// before the control loop asks for it.
fn take_driver(bank: &mut PinBank, config: &PumpConfig) -> Result<PumpDriver, PinError> {
    let pins = &config.pins;
    let mut take = |pin: PinConfig| -> Result<HalPin<Output<'static>>, PinError> {
        let output = bank.take_output(pin.pin, pin.inverted)?;
        Ok(HalPin::new(output, pin.inverted))
    };
    let step = take(pins.step)?;
    let dir = take(pins.dir)?;
    let enable = take(pins.enable)?;

    Ok(StepDirDriver::new(step, dir, enable, pulse_delay(), pins))
}
