#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

use defmt_rtt as _; // global logger
use panic_probe as _;

// Application Modules
#[cfg(feature = "embassy-rt")]
#[path = "../boards/mod.rs"]
pub mod boards;
#[cfg(feature = "embassy-rt")]
pub mod hardware;
#[cfg(feature = "embassy-rt")]
pub mod heater;
#[cfg(feature = "embassy-rt")]
pub mod safety;

#[cfg(feature = "embassy-rt")]
mod embassy_main;
#[cfg(feature = "embassy-rt")]
use embassy_main as _;

#[cfg(feature = "rtic-rt")]
mod rtic_main;
#[cfg(feature = "rtic-rt")]
use rtic_main as _;
