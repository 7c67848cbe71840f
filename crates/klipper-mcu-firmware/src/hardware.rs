//! Concrete hardware adapters wiring `motion_control`'s narrow trait
//! interfaces (`Adc`, `Pwm`, `LimitSwitch`) to this board's embassy-stm32
//! peripherals. `motion_control` itself never sees an `embassy_stm32` type;
//! everything below this module is the "driver layer" the crate's docs
//! describe as out of scope for the control core proper.

use embassy_stm32::adc::{Adc as StmAdc, AnyAdcChannel, Instance as AdcInstance};
use embassy_stm32::gpio::{Input, Pull};
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::{Channel, GeneralInstance4Channel};

use motion_control::external::{Adc, LimitSwitch, Pwm};

/// One ADC peripheral sampling a single thermistor channel.
///
/// `channel` is fixed at construction (one `ThermistorAdc` per heater); the
/// `channel: u8` parameter `motion_control::Sensor` passes through
/// `Adc::read_raw` is unused here since the peripheral is already bound to a
/// single input pin, but is kept in the trait for boards that mux several
/// thermistors through one converter.
pub struct ThermistorAdc<'a, T: AdcInstance> {
    adc: StmAdc<'a, T>,
    pin: AnyAdcChannel<T>,
}

impl<'a, T: AdcInstance> ThermistorAdc<'a, T> {
    pub fn new(adc: StmAdc<'a, T>, pin: AnyAdcChannel<T>) -> Self {
        Self { adc, pin }
    }
}

impl<'a, T: AdcInstance> Adc for ThermistorAdc<'a, T> {
    fn read_raw(&mut self, _channel: u8) -> u16 {
        self.adc.blocking_read(&mut self.pin)
    }
}

/// One PWM channel driving a heater's solid-state relay / MOSFET gate.
pub struct HeaterPwm<'a, T: GeneralInstance4Channel> {
    pwm: SimplePwm<'a, T>,
    channel: Channel,
}

impl<'a, T: GeneralInstance4Channel> HeaterPwm<'a, T> {
    pub fn new(mut pwm: SimplePwm<'a, T>, channel: Channel, freq_hz: u32) -> Self {
        pwm.set_frequency(embassy_stm32::time::Hertz(freq_hz));
        Self { pwm, channel }
    }
}

impl<'a, T: GeneralInstance4Channel> Pwm for HeaterPwm<'a, T> {
    fn on(&mut self, freq_hz: u32, duty_pct: u8) {
        self.set_freq(freq_hz);
        self.pwm.enable(self.channel);
        self.set_duty(duty_pct);
    }

    fn off(&mut self) {
        self.set_duty(0);
        self.pwm.disable(self.channel);
    }

    fn set_freq(&mut self, freq_hz: u32) {
        self.pwm.set_frequency(embassy_stm32::time::Hertz(freq_hz));
    }

    fn set_duty(&mut self, duty_pct: u8) {
        let max_duty = self.pwm.get_max_duty();
        let duty = (max_duty as u32 * duty_pct.clamp(0, 100) as u32) / 100;
        self.pwm.set_duty(self.channel, duty as u16);
    }
}

/// A single limit-switch/endstop input, debounced by the GPIO's Schmitt
/// trigger and pull configuration; `motion_control`'s dispatcher only asks
/// whether it is currently thrown.
pub struct EndstopInput<'a> {
    pin: Input<'a>,
    active_low: bool,
}

impl<'a> EndstopInput<'a> {
    pub fn new(pin: Input<'a>, active_low: bool) -> Self {
        Self { pin, active_low }
    }
}

impl<'a> LimitSwitch for EndstopInput<'a> {
    fn is_triggered(&self) -> bool {
        self.pin.is_high() != self.active_low
    }
}

/// Convenience re-export so callers only need `Pull` from this module when
/// constructing an [`EndstopInput`]'s underlying pin.
pub type EndstopPull = Pull;
