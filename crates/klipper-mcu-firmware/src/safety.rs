//! Hardware-level safety plumbing that sits outside `motion_control`'s
//! scope: feeding the independent watchdog timer.
//!
//! Limit-switch handling, ambient/regulation timeouts, and the overheat
//! cutoff are all `motion_control`'s job now (its HSM dispatcher's
//! limit-switch handler and the heater supervisor's sticky shutdown) — this
//! module used to duplicate that logic in a parallel `SafetyMonitor`; it no
//! longer does, since a corrupted sentinel or a thrown limit switch already
//! latches an alarm the idle loop's shutdown idler reacts to every cycle.

use embassy_stm32::wdg::IndependentWatchdog;

/// Feeds the MCU's independent watchdog on a fixed schedule. Must be driven
/// from a task that only stalls if the executor itself has wedged — the
/// whole point of an IWDG is to reset the part when cooperative scheduling
/// has stopped running at all.
pub struct WatchdogFeeder<'a> {
    watchdog: IndependentWatchdog<'a>,
}

impl<'a> WatchdogFeeder<'a> {
    /// Starts the watchdog immediately; it must be fed within
    /// `timeout_us` microseconds or the MCU resets.
    pub fn new(mut watchdog: IndependentWatchdog<'a>) -> Self {
        watchdog.unleash();
        Self { watchdog }
    }

    #[inline]
    pub fn feed(&mut self) {
        self.watchdog.feed();
    }
}

#[embassy_executor::task]
pub async fn watchdog_task(mut feeder: WatchdogFeeder<'static>) {
    let mut ticker = embassy_time::Ticker::every(embassy_time::Duration::from_millis(250));
    loop {
        ticker.next().await;
        feeder.feed();
    }
}
