//! The thermal controller's device-level state and its mini-HSM.
//!
//! The thermal controller is a parallel mini-HSM driven by the same tick
//! source as the motion controller, but dispatched through its own
//! short, fixed list rather than the 19-entry motion priority list.

use crate::error::ControlError;
use crate::external::{Adc, Pwm};
use crate::heater::Heater;
use crate::integrity::SentinelPair;
use crate::status::Status;
use crate::tick::{TickConsumer, TickSource};

/// Process-wide device state for the thermal controller: PWM frequency,
/// the ISR-set tick flag (owned by [`TickSource`]), and the 100 ms/1 s
/// down-counters (also owned by [`TickSource`]).
pub struct DeviceState {
    pub pwm_freq_hz: u32,
    pub integrity: SentinelPair,
}

impl DeviceState {
    pub const fn new(pwm_freq_hz: u32) -> Self {
        Self {
            pwm_freq_hz,
            integrity: SentinelPair::new(),
        }
    }
}

/// Drives one or more heaters from a shared [`TickSource`], running the
/// integrity check once per cycle ahead of any heater work — the same
/// "assert before you act" discipline the motion dispatcher uses.
pub struct ThermalDispatcher<A: Adc, P: Pwm, const N: usize> {
    tick: TickSource,
    heaters: [Heater<A, P>; N],
    device: DeviceState,
}

impl<A: Adc, P: Pwm, const N: usize> ThermalDispatcher<A, P, N> {
    pub fn new(heaters: [Heater<A, P>; N], device: DeviceState) -> Self {
        Self {
            tick: TickSource::new(),
            heaters,
            device,
        }
    }

    /// Called from interrupt context at the 10 ms rate.
    pub fn isr_tick(&self) {
        self.tick.isr_tick();
    }

    pub fn heater(&self, index: usize) -> &Heater<A, P> {
        &self.heaters[index]
    }

    pub fn heater_mut(&mut self, index: usize) -> &mut Heater<A, P> {
        &mut self.heaters[index]
    }

    /// One cooperative cycle: checks device integrity, then cascades the
    /// tick across every heater in order. Returns the first non-OK
    /// status from the integrity check (if any) or the tick cascade.
    pub fn run_cycle(&mut self) -> Status {
        if !self.device.integrity.is_valid() {
            return Status::Err(ControlError::Assertion("thermal-device-sentinel"));
        }

        let mut all_tickers = HeaterTickAll { heaters: &mut self.heaters };
        self.tick.tick_callback(&mut all_tickers)
    }
}

/// Adapts an array of heaters into a single [`TickConsumer`] so the
/// shared [`TickSource`] can cascade into every heater in the array
/// without the dispatcher needing to special-case the heater count.
struct HeaterTickAll<'a, A: Adc, P: Pwm, const N: usize> {
    heaters: &'a mut [Heater<A, P>; N],
}

impl<'a, A: Adc, P: Pwm, const N: usize> TickConsumer for HeaterTickAll<'a, A, P, N> {
    fn tick_10ms(&mut self) {
        for h in self.heaters.iter_mut() {
            h.tick_10ms();
        }
    }
    fn tick_100ms(&mut self) {
        for h in self.heaters.iter_mut() {
            h.tick_100ms();
        }
    }
    fn tick_1sec(&mut self) {
        for h in self.heaters.iter_mut() {
            h.tick_1sec();
        }
    }
}
