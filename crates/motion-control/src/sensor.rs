//! Sensor sampler: accumulates N ADC samples into one filtered
//! temperature reading, with one-deep variance-based outlier rejection.

use crate::external::Adc;
use crate::tick::TickConsumer;

/// Deliberately far above any real overheat threshold. Returned by
/// [`Sensor::get_temperature`] whenever the last reading is untrustworthy,
/// guaranteeing the heater supervisor shuts down on its next tick rather
/// than coasting on a stale or absent value.
///
/// The original firmware's source comments call this `ABSOLUTE_ZERO`
/// while the code returns a hot sentinel; the code, not the comment, is
/// the contract — failing hot is the only safe default for a heater
/// control loop.
pub const HOT_SENTINEL_C: f32 = 5000.0;

/// Run state of the sensor sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRunState {
    Off,
    NoData,
    Reading,
    HasData,
    Shutdown,
}

/// Diagnostic subreason for the current [`SensorRunState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCode {
    ReadingComplete,
    ReadingFailedBadReadings,
    ReadingFailedDisconnected,
    ReadingFailedNoPower,
}

/// Affine ADC-to-temperature calibration: `T = raw * slope + offset`.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub slope: f32,
    pub offset: f32,
}

/// Accumulates ADC samples into one filtered reading per
/// `samples_per_reading` ticks, with disconnect/no-power/overheat
/// classification on completion.
pub struct Sensor<A: Adc> {
    adc: A,
    channel: u8,
    calibration: Calibration,

    state: SensorRunState,
    code: SensorCode,

    samples_per_reading: u32,
    samples: u32,
    accumulator: f32,
    filtered_temp: f32,
    previous_sample: f32,

    variance_threshold: f32,
    disconnect_temp: f32,
    no_power_temp: f32,
    retries: u32,
}

impl<A: Adc> Sensor<A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        adc: A,
        channel: u8,
        calibration: Calibration,
        samples_per_reading: u32,
        variance_threshold: f32,
        disconnect_temp: f32,
        no_power_temp: f32,
        retries: u32,
    ) -> Self {
        assert!(samples_per_reading >= 1, "samples_per_reading must be >= 1");
        Self {
            adc,
            channel,
            calibration,
            state: SensorRunState::Off,
            code: SensorCode::ReadingComplete,
            samples_per_reading,
            samples: 0,
            accumulator: 0.0,
            filtered_temp: HOT_SENTINEL_C,
            previous_sample: 0.0,
            variance_threshold,
            disconnect_temp,
            no_power_temp,
            retries,
        }
    }

    pub fn get_state(&self) -> SensorRunState {
        self.state
    }

    pub fn get_code(&self) -> SensorCode {
        self.code
    }

    /// Enables the sensor. Does not itself start a reading; the first
    /// `start_reading` call (or sticky carry-over from `NoData`) does
    /// that on the next tick.
    pub fn on(&mut self) {
        if self.state == SensorRunState::Off || self.state == SensorRunState::Shutdown {
            self.state = SensorRunState::NoData;
        }
    }

    /// Disables the sensor. Used for both normal off and fault shutdown.
    pub fn off(&mut self) {
        self.state = SensorRunState::Shutdown;
    }

    /// Resets the sample counter to 0, requesting a fresh reading.
    /// Idempotent.
    pub fn start_reading(&mut self) {
        self.samples = 0;
    }

    /// Returns the last filtered reading if [`SensorRunState::HasData`];
    /// otherwise returns [`HOT_SENTINEL_C`] to guarantee downstream
    /// shutdown.
    pub fn get_temperature(&self) -> f32 {
        if self.state == SensorRunState::HasData {
            self.filtered_temp
        } else {
            HOT_SENTINEL_C
        }
    }

    fn draw_calibrated_sample(&mut self) -> f32 {
        let raw = self.adc.read_raw(self.channel);
        raw as f32 * self.calibration.slope + self.calibration.offset
    }

    /// Per-10ms-tick sampling algorithm. See module docs for the full
    /// state machine.
    fn sample_once(&mut self) {
        if self.state == SensorRunState::Off || self.state == SensorRunState::Shutdown {
            return;
        }
        if self.code == SensorCode::ReadingComplete && self.samples == self.samples_per_reading {
            return;
        }

        let new_period = self.samples == 0;
        if new_period {
            self.accumulator = 0.0;
            self.state = SensorRunState::Reading;
        }

        let sample = if new_period {
            let s = self.draw_calibrated_sample();
            self.previous_sample = s;
            s
        } else {
            let mut accepted = None;
            for _ in 0..=self.retries {
                let candidate = self.draw_calibrated_sample();
                if (candidate - self.previous_sample).abs() < self.variance_threshold {
                    accepted = Some(candidate);
                    break;
                }
            }
            match accepted {
                Some(s) => {
                    self.previous_sample = s;
                    s
                }
                None => {
                    self.state = SensorRunState::NoData;
                    self.code = SensorCode::ReadingFailedBadReadings;
                    self.filtered_temp = HOT_SENTINEL_C;
                    return;
                }
            }
        };

        self.accumulator += sample;
        self.samples += 1;

        if self.samples == self.samples_per_reading {
            let filtered = self.accumulator / self.samples as f32;
            self.filtered_temp = filtered;
            if filtered > self.disconnect_temp {
                self.code = SensorCode::ReadingFailedDisconnected;
                self.state = SensorRunState::NoData;
            } else if filtered < self.no_power_temp {
                self.code = SensorCode::ReadingFailedNoPower;
                self.state = SensorRunState::NoData;
            } else {
                self.code = SensorCode::ReadingComplete;
                self.state = SensorRunState::HasData;
            }
        }
    }
}

impl<A: Adc> TickConsumer for Sensor<A> {
    fn tick_10ms(&mut self) {
        self.sample_once();
    }
    fn tick_100ms(&mut self) {}
    fn tick_1sec(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdc {
        values: std::collections::VecDeque<u16>,
        last: u16,
    }

    impl FixedAdc {
        fn new(values: &[u16]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                last: values.first().copied().unwrap_or(0),
            }
        }
    }

    impl Adc for FixedAdc {
        fn read_raw(&mut self, _channel: u8) -> u16 {
            match self.values.pop_front() {
                Some(v) => {
                    self.last = v;
                    v
                }
                None => self.last,
            }
        }
    }

    fn calibration_identity() -> Calibration {
        Calibration { slope: 1.0, offset: 0.0 }
    }

    fn sensor_with(values: &[u16], samples_per_reading: u32) -> Sensor<FixedAdc> {
        let mut s = Sensor::new(
            FixedAdc::new(values),
            0,
            calibration_identity(),
            samples_per_reading,
            /* variance_threshold */ 5.0,
            /* disconnect_temp */ 400.0,
            /* no_power_temp */ -10.0,
            /* retries */ 2,
        );
        s.on();
        s
    }

    #[test]
    fn samples_in_range_0_to_samples_per_reading() {
        let mut s = sensor_with(&[20, 21, 19, 20, 22], 5);
        for _ in 0..5 {
            assert!(s.samples <= s.samples_per_reading);
            s.tick_10ms();
        }
        assert_eq!(s.samples, s.samples_per_reading);
    }

    #[test]
    fn single_sample_reading_completes_in_one_tick() {
        let mut s = sensor_with(&[21], 1);
        s.tick_10ms();
        assert_eq!(s.get_state(), SensorRunState::HasData);
        assert_eq!(s.get_code(), SensorCode::ReadingComplete);
        assert_eq!(s.get_temperature(), 21.0);
    }

    #[test]
    fn get_temperature_is_hot_sentinel_before_has_data() {
        let s = sensor_with(&[21], 1);
        assert_eq!(s.get_temperature(), HOT_SENTINEL_C);
    }

    #[test]
    fn filtered_average_of_identical_samples() {
        let mut s = sensor_with(&[20, 20, 20, 20], 4);
        for _ in 0..4 {
            s.tick_10ms();
        }
        assert_eq!(s.get_temperature(), 20.0);
    }

    #[test]
    fn disconnect_above_threshold_sets_no_data() {
        let mut s = sensor_with(&[1000], 1);
        s.tick_10ms();
        assert_eq!(s.get_state(), SensorRunState::NoData);
        assert_eq!(s.get_code(), SensorCode::ReadingFailedDisconnected);
        assert_eq!(s.get_temperature(), HOT_SENTINEL_C);
    }

    #[test]
    fn no_power_below_threshold_sets_no_data() {
        // A calibration offset that maps a zero raw reading to a clearly
        // sub-threshold temperature, simulating a sensor circuit with no
        // power applied.
        let mut s = Sensor::new(
            FixedAdc::new(&[0]),
            0,
            Calibration { slope: 1.0, offset: -50.0 },
            1,
            5.0,
            400.0,
            -10.0,
            2,
        );
        s.on();
        s.tick_10ms();
        assert_eq!(s.get_state(), SensorRunState::NoData);
        assert_eq!(s.get_code(), SensorCode::ReadingFailedNoPower);
    }

    #[test]
    fn variance_rejection_redraws_within_retry_budget() {
        // new-period sample accepted unconditionally at 20; next sample
        // jumps to 40 (rejected, > variance of 5), retry draws 21 (accepted).
        let mut s = sensor_with(&[20, 40, 21], 2);
        s.tick_10ms();
        s.tick_10ms();
        assert_eq!(s.get_state(), SensorRunState::HasData);
        assert_eq!(s.get_temperature(), (20.0 + 21.0) / 2.0);
    }

    #[test]
    fn variance_exhaustion_returns_hot_sentinel_and_shuts_reading() {
        // retries = 2 -> 3 total draws allowed for the rejected sample;
        // all three (40, 41, 42) stay far from previous_sample (20).
        let mut s = sensor_with(&[20, 40, 41, 42], 3);
        s.tick_10ms(); // new period, accepts 20
        s.tick_10ms(); // all retries rejected
        assert_eq!(s.get_state(), SensorRunState::NoData);
        assert_eq!(s.get_code(), SensorCode::ReadingFailedBadReadings);
        assert_eq!(s.get_temperature(), HOT_SENTINEL_C);
    }

    #[test]
    fn start_reading_is_idempotent() {
        let mut s = sensor_with(&[20, 20, 20, 20], 4);
        s.tick_10ms();
        s.start_reading();
        s.start_reading();
        assert_eq!(s.samples, 0);
    }

    #[test]
    fn off_then_off_is_equivalent_to_off() {
        let mut s = sensor_with(&[20], 1);
        s.off();
        s.off();
        assert_eq!(s.get_state(), SensorRunState::Shutdown);
    }

    #[test]
    fn off_sensor_ignores_ticks() {
        let mut s = sensor_with(&[20, 20], 2);
        s.off();
        s.tick_10ms();
        assert_eq!(s.samples, 0);
        assert_eq!(s.get_state(), SensorRunState::Shutdown);
    }
}
