//! The internal handlers in the motion dispatcher's priority list that
//! don't belong to any single external subsystem: limit-switch
//! monitoring, the hard-reset and bootloader triggers, and the two LED
//! idlers (shutdown and normal).

use crate::controller::{ControllerState, RunState};
use crate::error::ControlError;
use crate::external::LimitSwitch;
use crate::status::Status;

/// LED blink half-period, in dispatcher cycles, while in `Shutdown`.
/// Faster than the normal idler's blink to make the fault state visible
/// at a glance.
const ALARM_BLINK_CYCLES: u32 = 5;
/// LED blink half-period, in dispatcher cycles, during normal operation.
const NORMAL_BLINK_CYCLES: u32 = 50;

/// Polls the limit-switch bank. Raises a hard alarm the first time a
/// limit is seen thrown while not already in `Alarm`/`Shutdown`; a
/// no-op on every subsequent cycle once the alarm is latched, since the
/// switch stays thrown until the operator clears the fault.
pub fn limit_switch_handler<L: LimitSwitch>(controller: &mut ControllerState, limit: &L) -> Status {
    if controller.run_state == RunState::Alarm || controller.run_state == RunState::Shutdown {
        return Status::Noop;
    }
    if limit.is_triggered() {
        controller.raise_hard_alarm();
        return Status::Err(ControlError::LimitSwitchHit);
    }
    Status::Noop
}

/// Services a pending hard-reset request. Returns `Eagain` while the
/// request is pending so nothing lower-priority runs this cycle, and
/// clears it once serviced — the reset itself is performed by the
/// caller (restarting the process/MCU is out of scope for this crate).
pub fn hard_reset_handler(controller: &mut ControllerState) -> Status {
    if !controller.hard_reset_requested {
        return Status::Noop;
    }
    controller.hard_reset_requested = false;
    controller.escalate_to_shutdown();
    Status::Eagain
}

/// Services a pending bootloader-entry request, the same shape as
/// [`hard_reset_handler`].
pub fn bootloader_handler(controller: &mut ControllerState) -> Status {
    if !controller.bootloader_requested {
        return Status::Noop;
    }
    controller.bootloader_requested = false;
    controller.escalate_to_shutdown();
    Status::Eagain
}

/// Runs while `Alarm` or `Shutdown` is latched: blinks the status LED at
/// the faster alarm rate and always reports `Eagain`, which is what
/// keeps every lower-priority handler (including the command
/// dispatcher) from running until the controller is reset. `Alarm` must
/// gate here too — otherwise a latched limit-switch alarm only blocks
/// the cycle it was raised on, and every subsequent cycle falls through
/// to the command dispatcher.
pub fn shutdown_idler(controller: &mut ControllerState) -> Status {
    if controller.run_state != RunState::Alarm && controller.run_state != RunState::Shutdown {
        return Status::Noop;
    }
    controller.led_timer = controller.led_timer.wrapping_add(1);
    if controller.led_timer >= ALARM_BLINK_CYCLES * 2 {
        controller.led_timer = 0;
    }
    Status::Eagain
}

/// Bottom of the priority list: blinks the status LED at the slow
/// heartbeat rate when nothing higher-priority had anything to do.
pub fn normal_idler(controller: &mut ControllerState) -> Status {
    controller.led_timer = controller.led_timer.wrapping_add(1);
    if controller.led_timer >= NORMAL_BLINK_CYCLES * 2 {
        controller.led_timer = 0;
    }
    Status::Noop
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLimit(bool);
    impl LimitSwitch for FixedLimit {
        fn is_triggered(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn limit_switch_raises_alarm_on_first_trigger() {
        let mut c = ControllerState::new(0, 1, 0);
        let status = limit_switch_handler(&mut c, &FixedLimit(true));
        assert_eq!(status, Status::Err(ControlError::LimitSwitchHit));
        assert_eq!(c.run_state, RunState::Alarm);
    }

    #[test]
    fn limit_switch_is_noop_once_already_alarmed() {
        let mut c = ControllerState::new(0, 1, 0);
        c.raise_hard_alarm();
        let status = limit_switch_handler(&mut c, &FixedLimit(true));
        assert_eq!(status, Status::Noop);
    }

    #[test]
    fn limit_switch_is_noop_when_not_triggered() {
        let mut c = ControllerState::new(0, 1, 0);
        let status = limit_switch_handler(&mut c, &FixedLimit(false));
        assert_eq!(status, Status::Noop);
        assert_eq!(c.run_state, RunState::Startup);
    }

    #[test]
    fn hard_reset_request_escalates_and_clears_itself() {
        let mut c = ControllerState::new(0, 1, 0);
        c.hard_reset_requested = true;
        let status = hard_reset_handler(&mut c);
        assert_eq!(status, Status::Eagain);
        assert!(!c.hard_reset_requested);
        assert_eq!(c.run_state, RunState::Shutdown);
    }

    #[test]
    fn bootloader_request_escalates_and_clears_itself() {
        let mut c = ControllerState::new(0, 1, 0);
        c.bootloader_requested = true;
        let status = bootloader_handler(&mut c);
        assert_eq!(status, Status::Eagain);
        assert!(!c.bootloader_requested);
        assert_eq!(c.run_state, RunState::Shutdown);
    }

    #[test]
    fn shutdown_idler_always_reports_eagain_while_shutdown() {
        let mut c = ControllerState::new(0, 1, 0);
        c.escalate_to_shutdown();
        for _ in 0..20 {
            assert_eq!(shutdown_idler(&mut c), Status::Eagain);
        }
    }

    #[test]
    fn shutdown_idler_always_reports_eagain_while_alarmed() {
        // A latched limit-switch alarm must short-circuit the command
        // dispatcher on every subsequent cycle, not just the cycle the
        // alarm was raised on.
        let mut c = ControllerState::new(0, 1, 0);
        c.raise_hard_alarm();
        for _ in 0..20 {
            assert_eq!(shutdown_idler(&mut c), Status::Eagain);
        }
    }

    #[test]
    fn shutdown_idler_is_noop_outside_alarm_and_shutdown() {
        let mut c = ControllerState::new(0, 1, 0);
        assert_eq!(shutdown_idler(&mut c), Status::Noop);
    }

    #[test]
    fn normal_idler_always_reports_noop() {
        let mut c = ControllerState::new(0, 1, 0);
        for _ in 0..200 {
            assert_eq!(normal_idler(&mut c), Status::Noop);
        }
    }
}
