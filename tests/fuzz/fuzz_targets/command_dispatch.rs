#![no_main]

use libfuzzer_sys::fuzz_target;

use motion_control::command::CommandDispatcher;
use motion_control::controller::ControllerState;
use motion_control::error::ControlError;
use motion_control::external::{GCodeParser, InputSource, JsonParser, LineStatus, MotionRequests, ResponseSink, TextParser};

struct OneShotLine<'a>(Option<&'a [u8]>);
impl<'a> InputSource for OneShotLine<'a> {
    fn read_line(&mut self, buf: &mut [u8]) -> LineStatus {
        match self.0.take() {
            Some(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                LineStatus::Line(n)
            }
            None => LineStatus::Eof,
        }
    }
    fn reset(&mut self) {}
}

struct DropSink;
impl ResponseSink for DropSink {
    fn emit_text(&mut self, _s: &str) {}
    fn emit_json_exception(&mut self, _s: &str) {}
    fn emit_stderr(&mut self, _s: &str) {}
}

struct NoopGCode;
impl GCodeParser for NoopGCode {
    fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
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
struct NoopMotion;
impl MotionRequests for NoopMotion {
    fn request_feedhold(&mut self) {}
    fn request_queue_flush(&mut self) {}
    fn request_cycle_start(&mut self) {}
}

// Feeds arbitrary bytes in as one input line, covering the first-byte
// routing (`!%~$?H{`), the sticky text/JSON mode toggle, and the
// G-code-wrapped-as-JSON relay — all of it is meant to reject malformed
// input without panicking, never to require well-formed G-code/JSON.
fuzz_target!(|data: &[u8]| {
    if data.len() >= motion_control::MAX_LINE {
        return;
    }

    let mut controller = ControllerState::new(0, 1, 0);
    let mut command = CommandDispatcher::new(NoopGCode, NoopText, NoopJson, OneShotLine(Some(data)), DropSink, NoopMotion);
    let _ = command.run(&mut controller);
});
