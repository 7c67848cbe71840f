//! Host-side simulator for the heater supervisor: a thermal plant model
//! (Newton's law of cooling, heater power proportional to PWM duty,
//! Gaussian-ish sensor noise) stands in for the real ADC/PWM peripherals,
//! so `motion_control::heater::Heater` can be driven and observed without
//! any hardware. Prints one CSV line per simulated second: elapsed time,
//! setpoint, measured temperature, and the supervisor's run state.

use std::cell::Cell;
use std::rc::Rc;

use clap::Parser;
use rand::Rng;

use motion_control::heater::{Heater, HeaterThresholds};
use motion_control::pid::Pid;
use motion_control::sensor::{Calibration, Sensor};
use motion_control::tick::TickSource;

#[derive(Parser)]
#[command(about = "Simulates motion-control's heater supervisor against a virtual thermistor")]
struct Args {
    /// Target temperature in degrees Celsius.
    #[arg(long, default_value_t = 200.0)]
    setpoint: f32,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120)]
    seconds: u32,

    /// Ambient (room) temperature the plant cools toward.
    #[arg(long, default_value_t = 22.0)]
    ambient: f32,
}

/// A crude lumped thermal model: temperature rises in proportion to
/// applied heater power and falls in proportion to the gap against
/// ambient, matching the shape (not the exact constants) of a real
/// hotend's thermal response.
struct ThermalPlant {
    temp_c: f32,
    ambient_c: f32,
    heat_coefficient: f32,
    cooling_coefficient: f32,
}

impl ThermalPlant {
    fn new(ambient_c: f32) -> Self {
        Self {
            temp_c: ambient_c,
            ambient_c,
            heat_coefficient: 0.6,
            cooling_coefficient: 0.02,
        }
    }

    /// Advances the plant by one 10 ms step given the heater's current
    /// PWM duty (0-100).
    fn step_10ms(&mut self, duty_pct: u8) {
        const DT_S: f32 = 0.010;
        let heating = self.heat_coefficient * (duty_pct as f32 / 100.0);
        let cooling = self.cooling_coefficient * (self.temp_c - self.ambient_c);
        self.temp_c += (heating - cooling) * DT_S;
    }
}

/// Reads the plant's true temperature through the same affine
/// calibration `Sensor` inverts, plus measurement noise — the
/// simulator's stand-in for a real thermistor and its signal chain.
struct PlantAdc {
    plant_temp: Rc<Cell<f32>>,
    calibration: Calibration,
}

impl motion_control::external::Adc for PlantAdc {
    fn read_raw(&mut self, _channel: u8) -> u16 {
        let noise: f32 = rand::thread_rng().gen_range(-0.3..0.3);
        let raw = (self.plant_temp.get() + noise - self.calibration.offset) / self.calibration.slope;
        raw.clamp(0.0, u16::MAX as f32) as u16
    }
}

/// Records the duty the heater last commanded so the plant model can
/// read it back on its next step.
struct PlantPwm {
    duty_pct: Rc<Cell<u8>>,
    enabled: bool,
}

impl motion_control::external::Pwm for PlantPwm {
    fn on(&mut self, _freq_hz: u32, duty_pct: u8) {
        self.enabled = true;
        self.duty_pct.set(duty_pct);
    }
    fn off(&mut self) {
        self.enabled = false;
        self.duty_pct.set(0);
    }
    fn set_freq(&mut self, _freq_hz: u32) {}
    fn set_duty(&mut self, duty_pct: u8) {
        if self.enabled {
            self.duty_pct.set(duty_pct);
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let calibration = Calibration {
        slope: 0.1,
        offset: -20.0,
    };

    let mut plant = ThermalPlant::new(args.ambient);
    let plant_temp = Rc::new(Cell::new(plant.temp_c));
    let commanded_duty = Rc::new(Cell::new(0u8));

    let adc = PlantAdc {
        plant_temp: Rc::clone(&plant_temp),
        calibration,
    };
    let pwm = PlantPwm {
        duty_pct: Rc::clone(&commanded_duty),
        enabled: false,
    };

    let sensor = Sensor::new(adc, 0, calibration, 4, 1000.0, 400.0, -10.0, 2);
    let pid = Pid::new(20.0, 0.8, 80.0, motion_control::heater::HEATER_TICK_S, 0.0, 100.0);
    let thresholds = HeaterThresholds {
        ambient_timeout_s: 20.0,
        regulation_timeout_s: 600.0,
        ambient_temperature: args.ambient + 15.0,
        overheat_temperature: 285.0,
    };
    let mut heater = Heater::new(pid, sensor, pwm, thresholds, 10);
    heater.on(args.setpoint);

    let tick = TickSource::new();
    println!("time_s,setpoint_c,temp_c,state");

    let total_10ms_steps = args.seconds * 100;
    for step in 0..total_10ms_steps {
        plant_temp.set(plant.temp_c);

        tick.isr_tick();
        let _ = tick.tick_callback(&mut heater);

        plant.step_10ms(commanded_duty.get());

        if step % 100 == 0 {
            println!(
                "{},{:.1},{:.2},{:?}",
                step / 100,
                args.setpoint,
                plant.temp_c,
                heater.get_state()
            );
        }
    }

    Ok(())
}
