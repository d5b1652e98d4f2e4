//! Pump control task
//!
//! One cooperative loop: drain buffered serial bytes through the frame
//! assembler, answer each complete frame, then give the step clock a
//! chance to pulse. The loop yields to the executor on every iteration and
//! never awaits a timer, so step timing resolution is the loop time.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;

use plunger_core::{ControlLoop, DispatchError, PumpConfig, PumpState};
use plunger_drivers::StepDirDriver;
use plunger_hal::adapter::HalPin;
use plunger_hal::{MonotonicClock, SerialRx, SerialTx};
use plunger_hal_rp2040::serial::RpSerial;
use plunger_hal_rp2040::time::{EmbassyClock, PulseDelay};
use plunger_protocol::Response;

/// Step/dir driver on RP2040 outputs
pub type PumpDriver =
    StepDirDriver<HalPin<Output<'static>>, HalPin<Output<'static>>, HalPin<Output<'static>>, PulseDelay>;

/// Pump control task
#[embassy_executor::task]
pub async fn pump_task(mut serial: RpSerial, mut driver: PumpDriver, config: PumpConfig) {
    info!("Pump task started");

    let clock = EmbassyClock;
    let mut control = ControlLoop::new(&config, clock.now_us());
    control.begin(&mut driver);

    loop {
        if let Some(err) = control.expire_stale_frame(clock.now_us()) {
            warn!("Dropped partial frame: {:?}", err);
        }

        // Drain everything already buffered
        loop {
            let byte = match serial.try_read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(e) => {
                    warn!("UART read error: {:?}", e);
                    break;
                }
            };

            let before = *control.pump();
            if let Some(outcome) = control.feed_byte(byte, clock.now_us()) {
                respond(&mut serial, outcome);
                log_state_change(&before, control.pump());
            }
        }

        control.tick(clock.now_us(), &mut driver);
        yield_now().await;
    }
}

/// Send the reply owed for a frame, if any
fn respond(serial: &mut RpSerial, outcome: Result<Response, DispatchError>) {
    let reply = match outcome {
        Ok(response) => {
            trace!("Reply: {:?}", response);
            Some(response)
        }
        Err(e) => {
            warn!("Frame rejected: {:?}", e);
            e.reply()
        }
    };

    if let Some(response) = reply {
        if let Err(e) = serial.write_all(&response.encode()) {
            warn!("UART write error: {:?}", e);
        }
    }
}

fn log_state_change(before: &PumpState, after: &PumpState) {
    if before.run_state != after.run_state || before.period != after.period {
        debug!(
            "Pump {:?}, period {:?} us",
            after.run_state,
            after.period.map(|p| p.as_us())
        );
    }
    if before.direction != after.direction {
        debug!("Direction {:?}", after.direction);
    }
}
