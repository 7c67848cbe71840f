//! Error taxonomy for the control core.
//!
//! Transient conditions (`EAGAIN`, `NOOP`) are not errors and never appear
//! here — they live in [`crate::status::Status`] directly. This enum is
//! reserved for operational faults (latching, require explicit reset) and
//! integrity faults (fatal until reset).

/// Operational and integrity faults raised by the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// A sentinel or per-subsystem assertion failed. Carries a short,
    /// static description of which check failed.
    Assertion(&'static str),
    /// A limit switch tripped.
    LimitSwitchHit,
    /// The thermocouple reading indicates a disconnected sensor.
    SensorDisconnected,
    /// The thermocouple reading indicates no power to the sensor circuit.
    SensorNoPower,
    /// Variance-rejected samples never converged within the retry budget.
    SensorVarianceExhausted,
    /// The heater was commanded on while the sensor was off or shut down.
    HeaterSensorUnavailable,
    /// Heater failed to reach ambient temperature within the configured
    /// timeout.
    AmbientTimedOut,
    /// Heater failed to reach setpoint within the configured timeout.
    RegulationTimedOut,
    /// An external parser (G-code, text, or JSON) reported a failure.
    /// The parser's own error detail is out of scope for this crate; only
    /// the fact of failure propagates.
    ParserError,
    /// The input line exceeded the fixed line buffer.
    LineTooLong,
}

#[cfg(feature = "std")]
impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControlError {}
