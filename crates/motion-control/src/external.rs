//! Narrow trait interfaces to everything this crate treats as an
//! external collaborator: the G-code parser, JSON/text command parsers,
//! the motion planner, the stepper DDA interrupt, the line reader, the
//! configuration store, and the ADC/PWM/GPIO drivers.
//!
//! This crate never reaches past these interfaces. Concrete
//! implementations live in the firmware or host binaries that wire this
//! crate up to real hardware or a simulation harness.

use crate::error::ControlError;
use crate::status::Status;

/// A single analog-to-digital channel, as consumed by the sensor
/// sampler. `channel` is a driver-defined index (e.g. which thermistor).
pub trait Adc {
    fn read_raw(&mut self, channel: u8) -> u16;
}

/// A PWM output, as driven by the heater supervisor.
///
/// Frequency is clamped to `[min_res, max_res]` and duty to `[0, 100]`
/// by implementations; `0` drives the output low, `100` drives it high.
pub trait Pwm {
    fn on(&mut self, freq_hz: u32, duty_pct: u8);
    fn off(&mut self);
    fn set_freq(&mut self, freq_hz: u32);
    fn set_duty(&mut self, duty_pct: u8);
}

/// Result of asking an [`InputSource`] for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// The line is not yet complete; call again next cycle.
    Pending,
    /// A full line of `len` bytes was written into the caller's buffer.
    Line(usize),
    /// The input source is exhausted.
    Eof,
}

/// A non-blocking line reader (the XIO layer, out of scope for this
/// crate). `read_line` must never block.
pub trait InputSource {
    fn read_line(&mut self, buf: &mut [u8]) -> LineStatus;
    /// Reset this source to its default/idle state, e.g. after EOF.
    fn reset(&mut self);
}

/// The G-code parser, invoked with a line that is *not* `!`/`%`/`~` and
/// does not start with `$`/`?`/`H`/`{`.
pub trait GCodeParser {
    fn parse_and_execute(&mut self, line: &str) -> Result<(), ControlError>;
}

/// The text-mode admin parser, invoked for lines starting with
/// `$`/`?`/`H`.
pub trait TextParser {
    fn parse_and_execute(&mut self, line: &str) -> Result<(), ControlError>;
}

/// The JSON command parser, invoked for lines starting with `{`, and
/// for G-code wrapped as `{"gc":"..."}` while in JSON mode.
pub trait JsonParser {
    fn parse_and_execute(&mut self, line: &str) -> Result<(), ControlError>;
}

/// Where the command dispatcher and parsers write responses.
pub trait ResponseSink {
    fn emit_text(&mut self, s: &str);
    fn emit_json_exception(&mut self, message: &str);
    /// A plain informational line to stderr (used for the text-mode EOF
    /// notice).
    fn emit_stderr(&mut self, s: &str);
}

/// Requests the command dispatcher hands off to the motion planner:
/// feedhold, queue flush, and cycle start. The planner's own state
/// machine is out of scope for this crate.
pub trait MotionRequests {
    fn request_feedhold(&mut self);
    fn request_queue_flush(&mut self);
    fn request_cycle_start(&mut self);
}

/// The limit-switch GPIO bank, debounced and latched by the driver
/// layer (out of scope here); the motion dispatcher only asks whether
/// any limit is currently thrown.
pub trait LimitSwitch {
    fn is_triggered(&self) -> bool;
}

/// Free-slot accounting for the motion planner's bounded queue. The
/// sync-to-planner handler refuses to let the command dispatcher run
/// while free buffers fall below the configured headroom.
pub trait PlannerBackpressure {
    fn free_buffers(&self) -> usize;
}

/// Serial TX occupancy accounting. The sync-to-TX handler refuses to let
/// the baud-rate/command handlers run while the TX buffer is too full.
pub trait TxBackpressure {
    fn occupancy(&self) -> usize;
}

/// A single entry in the HSM dispatcher's priority list that this crate
/// does not itself implement: feedhold sequencing/planning, stepper
/// motor power, status/queue reports, the arc generator, homing,
/// jogging, probing, and baud-rate updates. Each is polled once per
/// dispatcher cycle in strict priority order.
pub trait CooperativeHandler {
    fn poll(&mut self) -> Status;
}

/// A [`CooperativeHandler`] that always reports nothing to do. Useful as
/// a placeholder for priority-list slots not wired to a real subsystem
/// yet (the same role the teacher's `GpioProxy` no-op plays for an
/// unfinished RTIC bring-up).
pub struct NoopHandler;

impl CooperativeHandler for NoopHandler {
    fn poll(&mut self) -> Status {
        Status::Noop
    }
}
