//! PID regulator.
//!
//! A pure function of (setpoint, measured) producing a bounded duty-cycle
//! output, with anti-windup. Modeled on `thermal::pid::Pid` but adds the
//! `On`/`Off` run state and the epsilon-gated integration the spec calls
//! for, rather than thermal's unconditional integral accumulation.

/// Below this error magnitude the integral term is not updated, and a
/// freshly-reset controller driven at its own setpoint reports zero
/// output.
pub const EPSILON: f32 = 1e-6;

/// Run state of the PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidRunState {
    On,
    Off,
}

/// A PID controller with anti-windup and output saturation.
#[derive(Debug, Clone, Copy)]
pub struct Pid {
    pub state: PidRunState,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub dt: f32,
    pub output_min: f32,
    pub output_max: f32,
    /// When `true`, integration is additionally suppressed while the
    /// previous output sat within [`EPSILON`] of `output_max` and the
    /// error is signed the same way as the saturation — the stricter
    /// anti-windup form the original firmware carries commented out.
    /// Disabled by default; the plain epsilon-gated form above is the
    /// one actually exercised in production.
    pub anti_windup_saturation_guard: bool,

    last_output: f32,
    error: f32,
    previous_error: f32,
    derivative: f32,
    integral: f32,
}

impl Pid {
    pub fn new(kp: f32, ki: f32, kd: f32, dt: f32, output_min: f32, output_max: f32) -> Self {
        Self {
            state: PidRunState::On,
            kp,
            ki,
            kd,
            dt,
            output_min,
            output_max,
            anti_windup_saturation_guard: false,
            last_output: 0.0,
            error: 0.0,
            previous_error: 0.0,
            derivative: 0.0,
            integral: 0.0,
        }
    }

    /// Zeroes the integral and previous error. Called on each
    /// `HEATER_ON` transition.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }

    /// Computes the next bounded output for `(setpoint, measured)`.
    pub fn calculate(&mut self, setpoint: f32, measured: f32) -> f32 {
        if self.state == PidRunState::Off {
            return 0.0;
        }

        self.error = setpoint - measured;

        if self.error.abs() > EPSILON {
            let saturated_high = (self.last_output - self.output_max).abs() < EPSILON;
            let windup_guard_trips =
                self.anti_windup_saturation_guard && saturated_high && self.error > 0.0;
            if !windup_guard_trips {
                self.integral += self.error * self.dt;
            }
        }

        self.derivative = (self.error - self.previous_error) / self.dt;

        let raw = self.kp * self.error + self.ki * self.integral + self.kd * self.derivative;
        let output = raw.clamp(self.output_min, self.output_max);

        self.previous_error = self.error;
        self.last_output = output;
        output
    }
}
