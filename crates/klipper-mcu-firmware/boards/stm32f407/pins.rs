//! Pin mappings for the MKS SKIPR board.
//! This is a starting point and may need to be adjusted based on your specific setup.

use embassy_stm32::gpio::{AnyPin, Pin};

/// Struct to hold the board pins this firmware actually drives: the status
/// LED, one extruder thermistor/heater pair, and one X-axis endstop. The
/// stepper DDA and host-protocol UART are external collaborators (see
/// `motion_control`'s scope notes) and are wired up by whatever binary
/// embeds that functionality, not by this pin map.
pub struct BoardPins {
    pub led: AnyPin,
    pub temp_extruder: AnyPin,
    pub heater_extruder: AnyPin,
    pub endstop_x: AnyPin,
}

impl BoardPins {
    /// Creates a new BoardPins struct for the MKS SKIPR.
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        use embassy_stm32::gpio::Pin as _;

        // Note: These are example pins. You will need to verify them against the MKS SKIPR schematic.
        Self {
            led: p.PB1.degrade(),
            temp_extruder: p.PA0.degrade(),
            heater_extruder: p.PC8.degrade(),
            endstop_x: p.PE5.degrade(),
        }
    }
}
