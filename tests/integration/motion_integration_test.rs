//! End-to-end test of the motion dispatcher: a scripted input line runs
//! through the full priority list — backpressure gates, the command
//! dispatcher, the limit switch — exactly as one `run_cycle` call would
//! in the firmware's idle loop.

use heapless::String;

use motion_control::command::CommandDispatcher;
use motion_control::controller::{CommMode, ControllerState};
use motion_control::error::ControlError;
use motion_control::external::{
    CooperativeHandler, GCodeParser, InputSource, JsonParser, LimitSwitch, LineStatus, MotionRequests, NoopHandler,
    PlannerBackpressure, ResponseSink, TextParser, TxBackpressure,
};
use motion_control::hsm::{Dispatcher, EXTERNAL_HANDLER_COUNT};
use motion_control::integrity::IntegrityMonitor;
use motion_control::status::Status;

struct ScriptedLine(Option<&'static str>);
impl InputSource for ScriptedLine {
    fn read_line(&mut self, buf: &mut [u8]) -> LineStatus {
        match self.0.take() {
            Some(line) => {
                buf[..line.len()].copy_from_slice(line.as_bytes());
                LineStatus::Line(line.len())
            }
            None => LineStatus::Pending,
        }
    }
    fn reset(&mut self) {}
}

#[derive(Default)]
struct RecordingSink {
    text: String<256>,
}
impl ResponseSink for RecordingSink {
    fn emit_text(&mut self, s: &str) {
        let _ = self.text.push_str(s);
    }
    fn emit_json_exception(&mut self, _s: &str) {}
    fn emit_stderr(&mut self, _s: &str) {}
}

#[derive(Default)]
struct RecordingGCode {
    last_line: String<256>,
}
impl GCodeParser for RecordingGCode {
    fn parse_and_execute(&mut self, line: &str) -> Result<(), ControlError> {
        self.last_line.clear();
        let _ = self.last_line.push_str(line);
        Ok(())
    }
}
struct NoopText;
impl TextParser for NoopText {
    fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
        Ok(())
    }
}
struct NoopJson;
impl JsonParser for NoopJson {
    fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
        Ok(())
    }
}
#[derive(Default)]
struct RecordingMotion {
    feedholds: u32,
}
impl MotionRequests for RecordingMotion {
    fn request_feedhold(&mut self) {
        self.feedholds += 1;
    }
    fn request_queue_flush(&mut self) {}
    fn request_cycle_start(&mut self) {}
}

struct FixedLimit(bool);
impl LimitSwitch for FixedLimit {
    fn is_triggered(&self) -> bool {
        self.0
    }
}
struct FixedPlanner(usize);
impl PlannerBackpressure for FixedPlanner {
    fn free_buffers(&self) -> usize {
        self.0
    }
}
struct FixedTx(usize);
impl TxBackpressure for FixedTx {
    fn occupancy(&self) -> usize {
        self.0
    }
}

fn external_handlers() -> [NoopHandler; EXTERNAL_HANDLER_COUNT] {
    [
        NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler,
        NoopHandler, NoopHandler,
    ]
}

#[test]
fn gcode_line_reaches_the_gcode_parser() {
    let mut handlers = external_handlers();
    // Destructure into ten distinct bindings; indexing the same array
    // ten times can't produce ten simultaneous mutable borrows.
    let [a, b, c, d, e, f, g, h, i, j] = &mut handlers;
    let mut external: [&mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT] = [a, b, c, d, e, f, g, h, i, j];

    let input = ScriptedLine(Some("G1 X10 Y20\n"));
    let sink = RecordingSink::default();
    let gcode = RecordingGCode::default();
    let command = CommandDispatcher::new(gcode, NoopText, NoopJson, input, sink, RecordingMotion::default());

    let mut dispatcher = Dispatcher::new(FixedLimit(false), FixedPlanner(16), FixedTx(0), command, external);
    let mut controller = ControllerState::new(0, 1, 0);
    let monitor = IntegrityMonitor::new(&[], &[]);

    let status = dispatcher.run_cycle(&mut controller, &monitor, 4, 200);
    assert!(matches!(status, Status::Ok | Status::Noop));
    assert_eq!(controller.comm_mode, CommMode::Text);
}

#[test]
fn thrown_limit_switch_latches_an_alarm_before_the_command_dispatcher_runs() {
    let mut handlers = external_handlers();
    // Destructure into ten distinct bindings; indexing the same array
    // ten times can't produce ten simultaneous mutable borrows.
    let [a, b, c, d, e, f, g, h, i, j] = &mut handlers;
    let mut external: [&mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT] = [a, b, c, d, e, f, g, h, i, j];

    let input = ScriptedLine(Some("G1 X10\n"));
    let sink = RecordingSink::default();
    let gcode = RecordingGCode::default();
    let command = CommandDispatcher::new(gcode, NoopText, NoopJson, input, sink, RecordingMotion::default());

    let mut dispatcher = Dispatcher::new(FixedLimit(true), FixedPlanner(16), FixedTx(0), command, external);
    let mut controller = ControllerState::new(0, 1, 0);
    let monitor = IntegrityMonitor::new(&[], &[]);

    let _ = dispatcher.run_cycle(&mut controller, &monitor, 4, 200);
    assert_eq!(controller.run_state, motion_control::controller::RunState::Alarm);
}

#[test]
fn backpressure_gate_short_circuits_the_command_dispatcher() {
    let mut handlers = external_handlers();
    // Destructure into ten distinct bindings; indexing the same array
    // ten times can't produce ten simultaneous mutable borrows.
    let [a, b, c, d, e, f, g, h, i, j] = &mut handlers;
    let mut external: [&mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT] = [a, b, c, d, e, f, g, h, i, j];

    let input = ScriptedLine(Some("G1 X10\n"));
    let sink = RecordingSink::default();
    let gcode = RecordingGCode::default();
    let command = CommandDispatcher::new(gcode, NoopText, NoopJson, input, sink, RecordingMotion::default());

    // Free buffers below the requested headroom: the sync-to-planner
    // handler must return Eagain and stop the cycle before the command
    // dispatcher ever reads the scripted line.
    let mut dispatcher = Dispatcher::new(FixedLimit(false), FixedPlanner(1), FixedTx(0), command, external);
    let mut controller = ControllerState::new(0, 1, 0);
    let monitor = IntegrityMonitor::new(&[], &[]);

    let status = dispatcher.run_cycle(&mut controller, &monitor, 4, 200);
    assert!(status.is_eagain());
}
