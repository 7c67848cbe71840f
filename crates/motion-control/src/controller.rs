//! Process-wide controller state for the motion control dispatcher.

use crate::integrity::SentinelPair;
use crate::MAX_LINE;

/// Observed run state of the motion controller. `Ready`/`Cycle` and the
/// transitions between them are driven by external collaborators (the
/// planner, the jogging/homing/probing handlers); this crate only
/// records and gates on the state, it does not own the `Cycle` half of
/// the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Startup,
    Ready,
    Alarm,
    Shutdown,
}

/// A fixed-size communication mode: sticky until the opposite
/// mode-trigger is seen on the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommMode {
    Text,
    Json,
}

/// Process-wide singleton state for the motion controller. Zero-
/// initialized at boot, then given defaults; destroyed only by process
/// termination or reset. No dynamic allocation.
pub struct ControllerState {
    pub run_state: RunState,
    pub comm_mode: CommMode,

    pub primary_source: u8,
    pub secondary_source: u8,
    pub default_source: u8,

    pub line_buf: [u8; MAX_LINE],
    pub line_len: usize,
    pub last_line: [u8; MAX_LINE],
    pub last_line_len: usize,

    pub hard_reset_requested: bool,
    pub bootloader_requested: bool,

    pub led_timer: u32,

    pub integrity: SentinelPair,
}

impl ControllerState {
    pub const fn new(primary_source: u8, secondary_source: u8, default_source: u8) -> Self {
        Self {
            run_state: RunState::Startup,
            comm_mode: CommMode::Text,
            primary_source,
            secondary_source,
            default_source,
            line_buf: [0u8; MAX_LINE],
            line_len: 0,
            last_line: [0u8; MAX_LINE],
            last_line_len: 0,
            hard_reset_requested: false,
            bootloader_requested: false,
            led_timer: 0,
            integrity: SentinelPair::new(),
        }
    }

    /// Raises a hard (unrecoverable-without-reset) alarm. Called by the
    /// [`crate::emergency!`] macro on any integrity failure, and
    /// directly by the limit-switch handler.
    pub fn raise_hard_alarm(&mut self) {
        if self.run_state != RunState::Alarm && self.run_state != RunState::Shutdown {
            self.run_state = RunState::Alarm;
        }
    }

    /// Once `Alarm` is entered, a further fault escalates to `Shutdown`,
    /// which is terminal until reset.
    pub fn escalate_to_shutdown(&mut self) {
        self.run_state = RunState::Shutdown;
    }

    /// First successful command transitions `Startup` to `Ready`. No-op
    /// otherwise (in particular, never regresses out of `Alarm` or
    /// `Shutdown` — only an explicit reset does that).
    pub fn note_successful_command(&mut self) {
        if self.run_state == RunState::Startup {
            self.run_state = RunState::Ready;
        }
    }

    pub fn save_last_line(&mut self) {
        self.last_line[..self.line_len].copy_from_slice(&self.line_buf[..self.line_len]);
        self.last_line_len = self.line_len;
    }
}
