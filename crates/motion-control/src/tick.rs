//! Tick source: a periodic interrupt fans out into coarser cadences.
//!
//! The interrupt handler itself does nothing but set a flag and return —
//! all real work happens in [`TickSource::tick_callback`], invoked from
//! cooperative (non-interrupt) context. This keeps the ISR minimal and
//! predictable, per the concurrency model: ISRs touch only volatile
//! flags and small atomically-updateable counters, never complex state.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::status::Status;

/// Number of 10 ms ticks in a 100 ms window.
pub const TICKS_PER_100MS: u32 = 10;
/// Number of 100 ms windows in a 1 s window.
pub const HUNDREDS_PER_SEC: u32 = 10;

/// Receives the cascaded tick callbacks. Implemented by whatever owns
/// the 10 ms / 100 ms / 1 s periodic work (the sensor sampler, the
/// heater supervisor, the LED blinker, ...).
pub trait TickConsumer {
    fn tick_10ms(&mut self);
    fn tick_100ms(&mut self);
    fn tick_1sec(&mut self);
}

/// A volatile flag set by the tick ISR, and the down-counters that
/// cascade a 10 ms tick into 100 ms and 1 s ticks.
pub struct TickSource {
    flag: AtomicBool,
    counter_100ms: AtomicU32,
    counter_1s: AtomicU32,
}

impl TickSource {
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            counter_100ms: AtomicU32::new(TICKS_PER_100MS),
            counter_1s: AtomicU32::new(HUNDREDS_PER_SEC),
        }
    }

    /// Called from interrupt context at the 10 ms rate. Does nothing but
    /// set the flag — no other work may occur here.
    #[inline]
    pub fn isr_tick(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Called from the dispatcher's cooperative context. Clears the
    /// flag and cascades into the 10 ms / 100 ms / 1 s callbacks as the
    /// down-counters roll over.
    ///
    /// Returns [`Status::Noop`] if no tick had occurred since the last
    /// call, [`Status::Ok`] otherwise.
    pub fn tick_callback(&self, consumer: &mut impl TickConsumer) -> Status {
        if !self.flag.swap(false, Ordering::SeqCst) {
            return Status::Noop;
        }

        consumer.tick_10ms();

        let remaining_100 = self.counter_100ms.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining_100 == 0 {
            self.counter_100ms.store(TICKS_PER_100MS, Ordering::SeqCst);
            consumer.tick_100ms();

            let remaining_1s = self.counter_1s.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining_1s == 0 {
                self.counter_1s.store(HUNDREDS_PER_SEC, Ordering::SeqCst);
                consumer.tick_1sec();
            }
        }

        Status::Ok
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Counts {
        ten: u32,
        hundred: u32,
        sec: u32,
    }

    struct Recorder(RefCell<Counts>);

    impl TickConsumer for Recorder {
        fn tick_10ms(&mut self) {
            self.0.borrow_mut().ten += 1;
        }
        fn tick_100ms(&mut self) {
            self.0.borrow_mut().hundred += 1;
        }
        fn tick_1sec(&mut self) {
            self.0.borrow_mut().sec += 1;
        }
    }

    #[test]
    fn noop_without_isr_tick() {
        let src = TickSource::new();
        let mut rec = Recorder(RefCell::new(Counts::default()));
        assert_eq!(src.tick_callback(&mut rec), Status::Noop);
        assert_eq!(rec.0.borrow().ten, 0);
    }

    #[test]
    fn cascades_100ms_after_ten_ticks() {
        let src = TickSource::new();
        let mut rec = Recorder(RefCell::new(Counts::default()));
        for _ in 0..9 {
            src.isr_tick();
            assert_eq!(src.tick_callback(&mut rec), Status::Ok);
        }
        assert_eq!(rec.0.borrow().hundred, 0);

        src.isr_tick();
        assert_eq!(src.tick_callback(&mut rec), Status::Ok);
        assert_eq!(rec.0.borrow().ten, 10);
        assert_eq!(rec.0.borrow().hundred, 1);
        assert_eq!(rec.0.borrow().sec, 0);
    }

    #[test]
    fn cascades_1sec_after_hundred_ticks() {
        let src = TickSource::new();
        let mut rec = Recorder(RefCell::new(Counts::default()));
        for _ in 0..99 {
            src.isr_tick();
            src.tick_callback(&mut rec);
        }
        assert_eq!(rec.0.borrow().sec, 0);
        src.isr_tick();
        src.tick_callback(&mut rec);
        assert_eq!(rec.0.borrow().ten, 100);
        assert_eq!(rec.0.borrow().hundred, 10);
        assert_eq!(rec.0.borrow().sec, 1);
    }
}
