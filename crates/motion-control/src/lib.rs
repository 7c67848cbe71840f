#![cfg_attr(not(feature = "std"), no_std)]

//! # Motion/Thermal Control Core
//!
//! The cooperative scheduling heart of a small CNC/3D-printer firmware
//! stack: a priority-ordered dispatcher for motion control (feedhold,
//! homing, probing continuations, planner backpressure, safety events)
//! and a periodic PID loop regulating a heater against a thermocouple
//! reading.
//!
//! Everything outside this crate — the G-code parser, JSON/text command
//! parsers, the motion planner, the stepper DDA interrupt, the line
//! reader, the configuration store, and the ADC/PWM/GPIO drivers — is
//! consumed only through the narrow trait interfaces in [`external`].
//! This crate never reaches across that boundary.
//!
//! `no_std` by default once the `std` feature is dropped, so it runs
//! unmodified on the MCU and under `cargo test` on the host.

pub mod command;
pub mod controller;
pub mod device;
pub mod error;
pub mod external;
pub mod heater;
pub mod hsm;
pub mod integrity;
pub mod pid;
pub mod safety;
pub mod sensor;
pub mod status;
pub mod tick;

pub use controller::{ControllerState, RunState};
pub use error::ControlError;
pub use external::CooperativeHandler;
pub use heater::{Heater, HeaterCode, HeaterRunState};
pub use hsm::Dispatcher;
pub use pid::Pid;
pub use sensor::{Sensor, SensorCode, SensorRunState};
pub use status::Status;

/// Magic sentinel value used to guard every long-lived state block.
///
/// Chosen to look deliberately implausible as a legitimate data value,
/// the same intent as the teacher's pattern of using an out-of-band
/// constant to catch a stray write before it does real damage.
pub const INTEGRITY_MAGIC: u32 = 0xDEAD_CAFE;

/// Maximum length, in bytes, of a single input command line.
///
/// Sized to leave headroom for the `{"gc":"` / `"}` wrapper the command
/// dispatcher applies when a G-code line is relayed in JSON mode (see
/// [`command`]).
pub const MAX_LINE: usize = 256;
