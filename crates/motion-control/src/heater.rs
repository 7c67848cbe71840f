//! Heater supervisor: drives PID output to a PWM on each 100 ms tick,
//! enforces ambient/regulation timeouts, and enters a sticky shutdown
//! on any fault.

use crate::error::ControlError;
use crate::external::{Adc, Pwm};
use crate::pid::Pid;
use crate::sensor::{Sensor, SensorRunState};
use crate::status::Status;
use crate::tick::TickConsumer;

/// The 100 ms tick period, in seconds, used to advance the regulation
/// timer.
pub const HEATER_TICK_S: f32 = 0.1;

/// Run state of the heater supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterRunState {
    Off,
    Heating,
    AtTarget,
    Shutdown,
}

/// Diagnostic subreason for the current [`HeaterRunState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterCode {
    Normal,
    AmbientTimedOut,
    RegulationTimedOut,
    SensorUnavailable,
}

/// Configured thresholds a heater checks against.
#[derive(Debug, Clone, Copy)]
pub struct HeaterThresholds {
    pub ambient_timeout_s: f32,
    pub regulation_timeout_s: f32,
    pub ambient_temperature: f32,
    pub overheat_temperature: f32,
}

/// Drives a [`Pid`] against a [`Sensor`] reading and a [`Pwm`] output,
/// enforcing the supervisory timeouts. Once shut down (by timeout or by
/// the sensor itself failing), only `on` can re-enable — shutdown is
/// sticky.
pub struct Heater<A: Adc, P: Pwm> {
    state: HeaterRunState,
    code: HeaterCode,
    setpoint: f32,
    current_temp: f32,
    regulation_timer_s: f32,
    thresholds: HeaterThresholds,
    pwm_freq_hz: u32,

    pid: Pid,
    sensor: Sensor<A>,
    pwm: P,
}

impl<A: Adc, P: Pwm> Heater<A, P> {
    pub fn new(pid: Pid, sensor: Sensor<A>, pwm: P, thresholds: HeaterThresholds, pwm_freq_hz: u32) -> Self {
        Self {
            state: HeaterRunState::Off,
            code: HeaterCode::Normal,
            setpoint: 0.0,
            current_temp: 0.0,
            regulation_timer_s: 0.0,
            thresholds,
            pwm_freq_hz,
            pid,
            sensor,
            pwm,
        }
    }

    pub fn get_state(&self) -> HeaterRunState {
        self.state
    }

    pub fn get_code(&self) -> HeaterCode {
        self.code
    }

    pub fn get_setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn get_current_temp(&self) -> f32 {
        self.current_temp
    }

    pub fn sensor(&self) -> &Sensor<A> {
        &self.sensor
    }

    /// Commands the heater on at `setpoint`. No-op if already
    /// [`HeaterRunState::Heating`] or [`HeaterRunState::AtTarget`].
    pub fn on(&mut self, setpoint: f32) {
        if matches!(self.state, HeaterRunState::Heating | HeaterRunState::AtTarget) {
            return;
        }
        self.sensor.on();
        self.sensor.start_reading();
        self.pid.reset();
        self.pwm.on(self.pwm_freq_hz, 0);
        self.setpoint = setpoint;
        self.regulation_timer_s = 0.0;
        self.code = HeaterCode::Normal;
        self.state = HeaterRunState::Heating;
    }

    /// Disables PWM and the sensor, and records `(state, code)`. Used
    /// for both a normal off and a fault shutdown.
    pub fn off(&mut self, new_state: HeaterRunState, code: HeaterCode) {
        self.pwm.off();
        self.sensor.off();
        self.state = new_state;
        self.code = code;
    }

    /// 100 ms tick body. Invariant: `Heating` never coexists with the
    /// sensor being `Off`/`Shutdown` — enforced here because `on`
    /// always re-enables the sensor first.
    fn tick_body(&mut self) -> Status {
        if matches!(self.state, HeaterRunState::Off | HeaterRunState::Shutdown) {
            return Status::Noop;
        }

        self.sensor.start_reading();

        if self.sensor.get_state() != SensorRunState::HasData {
            return Status::Noop;
        }

        self.current_temp = self.sensor.get_temperature();
        let duty = self.pid.calculate(self.setpoint, self.current_temp);
        self.pwm.set_duty(duty_to_pct(duty));

        if self.current_temp >= self.thresholds.overheat_temperature {
            self.off(HeaterRunState::Shutdown, HeaterCode::Normal);
            return Status::Err(ControlError::SensorDisconnected);
        }

        if self.state == HeaterRunState::Heating {
            self.regulation_timer_s += HEATER_TICK_S;

            if self.current_temp < self.thresholds.ambient_temperature
                && self.regulation_timer_s > self.thresholds.ambient_timeout_s
            {
                self.off(HeaterRunState::Shutdown, HeaterCode::AmbientTimedOut);
                return Status::Err(ControlError::AmbientTimedOut);
            }

            if self.current_temp < self.setpoint
                && self.regulation_timer_s > self.thresholds.regulation_timeout_s
            {
                self.off(HeaterRunState::Shutdown, HeaterCode::RegulationTimedOut);
                return Status::Err(ControlError::RegulationTimedOut);
            }

            if self.current_temp >= self.setpoint {
                self.state = HeaterRunState::AtTarget;
            }
        }

        Status::Ok
    }
}

/// Maps a PID output assumed to be in `[0.0, 100.0]` to a clamped
/// `u8` PWM duty percentage.
fn duty_to_pct(duty: f32) -> u8 {
    duty.clamp(0.0, 100.0) as u8
}

impl<A: Adc, P: Pwm> TickConsumer for Heater<A, P> {
    fn tick_10ms(&mut self) {
        self.sensor.tick_10ms();
    }

    fn tick_100ms(&mut self) {
        let _ = self.tick_body();
    }

    fn tick_1sec(&mut self) {}
}
