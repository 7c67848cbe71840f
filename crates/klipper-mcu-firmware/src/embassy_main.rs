//! # Embassy Main
//!
//! Entry point for the firmware when using the Embassy executor: brings up
//! the board's clocks/pins, builds the concrete `Adc`/`Pwm` adapters
//! `motion_control` needs, and spawns the heater and watchdog tasks. All of
//! the actual control-loop logic — PID, sampling, supervisory timeouts,
//! the limit-switch latch — lives in `motion_control`; this file is wiring.

use crate::{hardware, heater, safety};
use boards::stm32f407::pins::BoardPins;
use embassy_executor::Spawner;
use embassy_stm32::adc::Adc as StmAdc;
use embassy_stm32::gpio::{Input, Pull};
use embassy_stm32::peripherals::{ADC1, TIM3};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::Channel;
use embassy_stm32::time::Hertz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Config;

use motion_control::external::LimitSwitch;
use motion_control::sensor::Calibration;

/// Extruder setpoint, in degrees Celsius. `0.0` means off. A real build
/// has the command dispatcher's G-code/JSON parsers write this; wiring
/// those up is out of scope for this crate.
static EXTRUDER_SETPOINT: heater::HeaterSetpoint = heater::HeaterSetpoint::new();

/// The extruder thermistor's affine calibration, `T = raw * slope + offset`,
/// as `motion_control::sensor` specifies.
const EXTRUDER_CALIBRATION: Calibration = Calibration {
    slope: 0.1,
    offset: -20.0,
};

/// The main asynchronous function that sets up and runs the firmware.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("Initializing Klipper MCU Firmware...");

    let config = Config::default();
    let p = embassy_stm32::init(config);
    let board_pins = BoardPins::new(p);

    let adc = hardware::ThermistorAdc::new(
        StmAdc::new(p.ADC1),
        board_pins.temp_extruder.into(),
    );
    let pwm_pin = PwmPin::new_ch1(board_pins.heater_extruder, embassy_stm32::gpio::OutputType::PushPull);
    let pwm = SimplePwm::new(
        p.TIM3,
        Some(pwm_pin),
        None,
        None,
        None,
        Hertz(1_000),
        Default::default(),
    );
    let heater_pwm = hardware::HeaterPwm::new(pwm, Channel::Ch1, 10);

    let extruder = heater::build_heater(adc, 0, EXTRUDER_CALIBRATION, heater_pwm, 10);

    let endstop = hardware::EndstopInput::new(Input::new(board_pins.endstop_x, Pull::Up), false);
    defmt::info!("X endstop triggered at boot: {}", endstop.is_triggered());

    let watchdog = safety::WatchdogFeeder::new(IndependentWatchdog::new(p.IWDG, 2_000_000));

    spawner.spawn(extruder_heater_task(extruder)).unwrap();
    spawner.spawn(safety::watchdog_task(watchdog)).unwrap();
    spawner.spawn(led_task(board_pins.led)).unwrap();

    defmt::info!("Initialization complete. All tasks are running.");
}

/// Thin, non-generic wrapper around [`heater::heater_task`] — Embassy's
/// task macro requires a concrete signature, so the generic driver lives
/// in `heater` and this per-heater instantiation lives here.
#[embassy_executor::task]
async fn extruder_heater_task(
    extruder: motion_control::heater::Heater<
        hardware::ThermistorAdc<'static, ADC1>,
        hardware::HeaterPwm<'static, TIM3>,
    >,
) {
    heater::heater_task(extruder, &EXTRUDER_SETPOINT).await
}

/// A simple task to blink the LED, indicating that the firmware is running.
#[embassy_executor::task]
async fn led_task(led_pin: embassy_stm32::gpio::AnyPin) {
    use embassy_stm32::gpio::{Level, Output, Speed};
    use embassy_time::{Duration, Timer};
    let mut led = Output::new(led_pin, Level::High, Speed::Low);

    loop {
        led.toggle();
        Timer::after(Duration::from_millis(500)).await;
    }
}
