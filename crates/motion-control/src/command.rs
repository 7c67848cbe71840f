//! Command dispatcher: reads one line, detects the response mode, and
//! routes the first character to the right parser.

use heapless::String;

use crate::controller::{CommMode, ControllerState};
use crate::error::ControlError;
use crate::external::{GCodeParser, InputSource, JsonParser, LineStatus, MotionRequests, ResponseSink, TextParser};
use crate::status::Status;
use crate::MAX_LINE;

/// Wrapper characters the command dispatcher adds when relaying a raw
/// G-code line through the JSON parser while in JSON mode.
const JSON_GCODE_PREFIX: &str = "{\"gc\":\"";
const JSON_GCODE_SUFFIX: &str = "\"}";

/// Routes one input line per cycle to the right parser, tracking the
/// sticky text/JSON communication mode.
pub struct CommandDispatcher<GP, TP, JP, IS, RS, MR> {
    gcode: GP,
    text: TP,
    json: JP,
    input: IS,
    sink: RS,
    motion: MR,
}

impl<GP, TP, JP, IS, RS, MR> CommandDispatcher<GP, TP, JP, IS, RS, MR>
where
    GP: GCodeParser,
    TP: TextParser,
    JP: JsonParser,
    IS: InputSource,
    RS: ResponseSink,
    MR: MotionRequests,
{
    pub fn new(gcode: GP, text: TP, json: JP, input: IS, sink: RS, motion: MR) -> Self {
        Self { gcode, text, json, input, sink, motion }
    }

    /// One command-dispatch cycle, exactly per spec §4.7.
    pub fn run(&mut self, controller: &mut ControllerState) -> Status {
        match self.input.read_line(&mut controller.line_buf) {
            LineStatus::Pending => return Status::Eagain,
            LineStatus::Eof => {
                self.input.reset();
                match controller.comm_mode {
                    CommMode::Text => self.sink.emit_stderr("end of file"),
                    CommMode::Json => self.sink.emit_json_exception("eof"),
                }
                return Status::Eof;
            }
            LineStatus::Line(len) => {
                controller.line_len = len;
            }
        }

        controller.save_last_line();

        let status = self.dispatch_line(controller);
        if !status.is_err() {
            controller.note_successful_command();
        }
        status
    }

    fn dispatch_line(&mut self, controller: &mut ControllerState) -> Status {
        let raw = &controller.line_buf[..controller.line_len];
        let line = match core::str::from_utf8(raw) {
            Ok(s) => s,
            Err(_) => return Status::Err(ControlError::ParserError),
        };
        let trimmed = line.trim_end_matches(['\r', '\n']);

        let Some(first) = trimmed.chars().next() else {
            return match controller.comm_mode {
                CommMode::Text => {
                    self.sink.emit_text("ok");
                    Status::Ok
                }
                CommMode::Json => Status::Noop,
            };
        };

        match first {
            '!' => {
                self.motion.request_feedhold();
                Status::Ok
            }
            '%' => {
                self.motion.request_queue_flush();
                Status::Ok
            }
            '~' => {
                self.motion.request_cycle_start();
                Status::Ok
            }
            '$' | '?' | 'H' | 'h' => {
                controller.comm_mode = CommMode::Text;
                let rest = &trimmed[first.len_utf8()..];
                self.run_text(rest)
            }
            '{' => {
                controller.comm_mode = CommMode::Json;
                self.run_json(trimmed)
            }
            _ => self.run_gcode(controller, trimmed),
        }
    }

    fn run_text(&mut self, rest: &str) -> Status {
        match self.text.parse_and_execute(rest) {
            Ok(()) => {
                self.sink.emit_text("ok");
                Status::Ok
            }
            Err(e) => {
                self.sink.emit_text("error");
                Status::Err(e)
            }
        }
    }

    fn run_json(&mut self, line: &str) -> Status {
        match self.json.parse_and_execute(line) {
            Ok(()) => Status::Ok,
            Err(e) => {
                self.sink.emit_json_exception("parse error");
                Status::Err(e)
            }
        }
    }

    fn run_gcode(&mut self, controller: &mut ControllerState, line: &str) -> Status {
        if controller.comm_mode == CommMode::Json {
            let mut wrapped: String<MAX_LINE> = String::new();
            if wrapped.push_str(JSON_GCODE_PREFIX).is_err()
                || wrapped.push_str(line).is_err()
                || wrapped.push_str(JSON_GCODE_SUFFIX).is_err()
            {
                return Status::Err(ControlError::LineTooLong);
            }
            self.run_json(&wrapped)
        } else {
            match self.gcode.parse_and_execute(line) {
                Ok(()) => {
                    self.sink.emit_text("ok");
                    Status::Ok
                }
                Err(e) => {
                    self.sink.emit_text("error");
                    Status::Err(e)
                }
            }
        }
    }
}
