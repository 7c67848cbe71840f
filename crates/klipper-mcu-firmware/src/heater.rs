//! Embassy glue for the heater supervisor: owns one
//! [`motion_control::heater::Heater`] per hotend/bed and drives it from a
//! 10 ms software tick, matching the cadence `motion_control::tick`
//! specifies for the sensor sampler.
//!
//! The PID loop, sampling/outlier rejection, and supervisory timeouts all
//! live in `motion_control`; this module only supplies the board-specific
//! `Adc`/`Pwm` adapters (see [`crate::hardware`]) and the async task
//! skeleton that ticks the shared state on a fixed schedule.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};

use motion_control::external::{Adc, Pwm};
use motion_control::heater::{Heater, HeaterThresholds};
use motion_control::pid::Pid;
use motion_control::sensor::Calibration;
use motion_control::sensor::Sensor;
use motion_control::tick::TickSource;

/// Setpoint in degrees Celsius, shared with whatever sets it (the command
/// dispatcher's G-code/JSON parsers, out of scope for this crate).
pub struct HeaterSetpoint(pub Mutex<CriticalSectionRawMutex, f32>);

impl HeaterSetpoint {
    pub const fn new() -> Self {
        Self(Mutex::new(0.0))
    }
}

/// Runs one heater's 10 ms sensor tick / 100 ms PID+PWM tick forever.
/// A `setpoint` of `0.0` is treated as "heater off".
pub async fn heater_task<A: Adc, P: Pwm>(
    mut heater: Heater<A, P>,
    setpoint: &'static HeaterSetpoint,
) -> ! {
    let tick = TickSource::new();
    let mut ticker = Ticker::every(Duration::from_millis(10));
    let mut last_setpoint = 0.0f32;

    loop {
        ticker.next().await;
        tick.isr_tick();

        let target = *setpoint.0.lock().await;
        if target != last_setpoint {
            if target > 0.0 {
                heater.on(target);
            } else {
                heater.off(
                    motion_control::heater::HeaterRunState::Off,
                    motion_control::heater::HeaterCode::Normal,
                );
            }
            last_setpoint = target;
        }

        let _ = tick.tick_callback(&mut heater);
    }
}

/// Builds a hotend/bed [`Heater`] from board-level constants. Gains and
/// thresholds are compile-time defaults (configuration files are out of
/// scope — see `motion_control`'s external-interface boundary); a real
/// board swaps these for values read from its own config surface.
pub fn build_heater<A: Adc, P: Pwm>(
    adc: A,
    adc_channel: u8,
    calibration: Calibration,
    pwm: P,
    pwm_freq_hz: u32,
) -> Heater<A, P> {
    let sensor = Sensor::new(
        adc,
        adc_channel,
        calibration,
        /* samples_per_reading */ 4,
        /* variance_threshold */ 1000.0,
        /* disconnect_temp */ 400.0,
        /* no_power_temp */ -10.0,
        /* retries */ 2,
    );
    let pid = Pid::new(
        /* kp */ 20.0,
        /* ki */ 0.8,
        /* kd */ 80.0,
        motion_control::heater::HEATER_TICK_S,
        /* output_min */ 0.0,
        /* output_max */ 100.0,
    );
    let thresholds = HeaterThresholds {
        ambient_timeout_s: 20.0,
        regulation_timeout_s: 600.0,
        ambient_temperature: 40.0,
        overheat_temperature: 285.0,
    };
    Heater::new(pid, sensor, pwm, thresholds, pwm_freq_hz)
}
