//! The motion controller's cooperative HSM dispatcher: a fixed,
//! 19-entry priority list walked once per main-loop iteration. `Eagain`
//! from any handler short-circuits the remainder of the cycle; `Ok`,
//! `Noop`, and errors fall through to the next handler.
//!
//! Nine of the nineteen entries are internal to this crate (reset,
//! bootloader, the two idlers, limit switch, system assertions, and the
//! two backpressure gates) and run as a hardcoded sequence of method
//! calls — there's no aliasing hazard since each borrows
//! [`ControllerState`] in turn rather than simultaneously. The other
//! ten are genuinely external subsystems (feedhold, stepper power,
//! status/queue reports, arc generation, homing, jogging, probing,
//! baud-rate updates) and are held as a fixed array of
//! [`CooperativeHandler`] trait objects, interspersed into the sequence
//! at the positions the priority list requires.

use crate::command::CommandDispatcher;
use crate::controller::ControllerState;
use crate::emergency;
use crate::external::{
    CooperativeHandler, GCodeParser, InputSource, JsonParser, LimitSwitch, MotionRequests, PlannerBackpressure,
    ResponseSink, TextParser, TxBackpressure,
};
use crate::integrity::IntegrityMonitor;
use crate::safety::{bootloader_handler, hard_reset_handler, limit_switch_handler, normal_idler, shutdown_idler};
use crate::status::Status;

/// Indices into the external-handler array, named after the priority
/// slot each fills. Kept in this module since they're meaningless
/// outside the fixed sequence [`Dispatcher::run_cycle`] walks.
pub const EXT_FEEDHOLD_SEQUENCING: usize = 0;
pub const EXT_FEEDHOLD_PLANNING: usize = 1;
pub const EXT_STEPPER_POWER: usize = 2;
pub const EXT_STATUS_REPORT: usize = 3;
pub const EXT_QUEUE_REPORT: usize = 4;
pub const EXT_ARC_GENERATOR: usize = 5;
pub const EXT_HOMING: usize = 6;
pub const EXT_JOGGING: usize = 7;
pub const EXT_PROBE: usize = 8;
pub const EXT_BAUD_RATE_UPDATE: usize = 9;

/// Number of slots in the external-handler array.
pub const EXTERNAL_HANDLER_COUNT: usize = 10;

/// The full motion dispatcher: internal safety/backpressure handlers,
/// the command dispatcher, and the ten externally-supplied handlers,
/// walked in the exact priority order §4.6 specifies.
pub struct Dispatcher<'a, L, PB, TB, GP, TP, JP, IS, RS, MR> {
    limit_switch: L,
    planner_backpressure: PB,
    tx_backpressure: TB,
    command: CommandDispatcher<GP, TP, JP, IS, RS, MR>,
    external: [&'a mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT],
    /// Name of the priority-list entry reached on the most recent call
    /// to [`Self::run_cycle`], kept for test observability — mirrors the
    /// diagnostic "last handler index" field the teacher's RTIC idle
    /// loop keeps for the same reason.
    last_cycle_reached: &'static str,
}

impl<'a, L, PB, TB, GP, TP, JP, IS, RS, MR> Dispatcher<'a, L, PB, TB, GP, TP, JP, IS, RS, MR>
where
    L: LimitSwitch,
    PB: PlannerBackpressure,
    TB: TxBackpressure,
    GP: GCodeParser,
    TP: TextParser,
    JP: JsonParser,
    IS: InputSource,
    RS: ResponseSink,
    MR: MotionRequests,
{
    pub fn new(
        limit_switch: L,
        planner_backpressure: PB,
        tx_backpressure: TB,
        command: CommandDispatcher<GP, TP, JP, IS, RS, MR>,
        external: [&'a mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT],
    ) -> Self {
        Self {
            limit_switch,
            planner_backpressure,
            tx_backpressure,
            command,
            external,
            last_cycle_reached: "none",
        }
    }

    pub fn last_cycle_reached(&self) -> &'static str {
        self.last_cycle_reached
    }

    /// One full pass over the priority list. `planner_headroom` and
    /// `tx_low_water` are the thresholds the sync handlers gate on
    /// (§4.6 items 15-16); they're supplied per call rather than stored
    /// since they're configuration, not dispatcher state.
    ///
    /// EAGAIN is the only status that stops the walk early. OK, NOOP,
    /// EOF, and plain errors all fall through to the next handler — an
    /// operational fault (limit switch, sensor) latches a state
    /// transition that later cycles' `shutdown_idler` picks up, rather
    /// than aborting the cycle that raised it. System assertions are
    /// the one deliberate exception: they're wrapped in
    /// [`crate::emergency!`], which raises a hard alarm and returns
    /// immediately on any failure, since a corrupted sentinel means the
    /// rest of this cycle's state can no longer be trusted.
    pub fn run_cycle(
        &mut self,
        controller: &mut ControllerState,
        monitor: &IntegrityMonitor<'_>,
        planner_headroom: usize,
        tx_low_water: usize,
    ) -> Status {
        macro_rules! step {
            ($name:literal, $status:expr) => {{
                self.last_cycle_reached = $name;
                let status = $status;
                if status.is_eagain() {
                    return status;
                }
                if !matches!(status, Status::Ok | Status::Noop) {
                    outcome = status;
                }
            }};
        }

        let mut outcome = Status::Noop;

        step!("hard_reset", hard_reset_handler(controller));
        step!("bootloader", bootloader_handler(controller));
        step!("shutdown_idler", shutdown_idler(controller));
        step!("limit_switch", limit_switch_handler(controller, &self.limit_switch));
        step!("feedhold_sequencing", self.external[EXT_FEEDHOLD_SEQUENCING].poll());
        step!("feedhold_planning", self.external[EXT_FEEDHOLD_PLANNING].poll());

        self.last_cycle_reached = "system_assertions";
        emergency!(controller, monitor.check());

        step!("stepper_power", self.external[EXT_STEPPER_POWER].poll());
        step!("status_report", self.external[EXT_STATUS_REPORT].poll());
        step!("queue_report", self.external[EXT_QUEUE_REPORT].poll());
        step!("arc_generator", self.external[EXT_ARC_GENERATOR].poll());
        step!("homing", self.external[EXT_HOMING].poll());
        step!("jogging", self.external[EXT_JOGGING].poll());
        step!("probe", self.external[EXT_PROBE].poll());
        step!("sync_to_planner", self.sync_to_planner(planner_headroom));
        step!("sync_to_tx", self.sync_to_tx(tx_low_water));
        step!("baud_rate_update", self.external[EXT_BAUD_RATE_UPDATE].poll());
        step!("command_dispatcher", self.command.run(controller));

        self.last_cycle_reached = "normal_idler";
        let idle = normal_idler(controller);
        if matches!(idle, Status::Ok | Status::Noop) {
            outcome
        } else {
            idle
        }
    }

    fn sync_to_planner(&self, headroom: usize) -> Status {
        if self.planner_backpressure.free_buffers() < headroom {
            Status::Eagain
        } else {
            Status::Noop
        }
    }

    fn sync_to_tx(&self, low_water: usize) -> Status {
        if self.tx_backpressure.occupancy() >= low_water {
            Status::Eagain
        } else {
            Status::Noop
        }
    }
}
