//! # RTIC-based Firmware Entry Point
//!
//! An alternative to the default Embassy-based async executor: RTIC's
//! hardware tasks drive the heater tick and USART reception, and the
//! `#[idle]` task — the lowest-priority context, preempted by every
//! `#[task]` — runs `motion_control::hsm::Dispatcher::run_cycle` forever,
//! which is the "main loop calls the dispatcher" scheduling shape the
//! crate's docs describe.
//!
//! The G-code/JSON/text parsers, the motion planner's feedhold/arc/homing/
//! jogging/probing handlers, and the XIO line reader are all external
//! collaborators this firmware does not implement; the stub types below
//! stand in for them until a real parser crate is wired up, the same role
//! the teacher's `GpioProxy` placeholder played for an unfinished stepper
//! bring-up.

#![allow(unused_imports)]

#[rtic::app(device = stm32f4xx_hal::pac, dispatchers = [EXTI0, EXTI1, EXTI2, EXTI3])]
mod app {
    use stm32f4xx_hal::{
        gpio::{gpioe, gpiod, Input, Output, PullUp, PushPull, Speed},
        pac::USART1,
        prelude::*,
        serial::{Config as SerialConfig, Event as SerialEvent, Rx, Serial, Tx},
    };
    use rtic_monotonics::{systick::*, Monotonic};

    use motion_control::external::{
        CooperativeHandler, GCodeParser, InputSource, JsonParser, LimitSwitch, LineStatus, MotionRequests,
        NoopHandler, PlannerBackpressure, ResponseSink, TextParser, TxBackpressure,
    };
    use motion_control::error::ControlError;
    use motion_control::hsm::{Dispatcher, EXTERNAL_HANDLER_COUNT};
    use motion_control::status::Status;

    type LedPin = gpiod::PD12<Output<PushPull>>;
    type EndstopPin = gpioe::PE5<Input<PullUp>>;

    /// Wraps the X endstop pin so `motion_control`'s limit-switch handler
    /// can poll it without knowing about `stm32f4xx_hal` gpio types.
    struct EndstopX(EndstopPin);
    impl LimitSwitch for EndstopX {
        fn is_triggered(&self) -> bool {
            self.0.is_low()
        }
    }
    impl LimitSwitch for &EndstopX {
        fn is_triggered(&self) -> bool {
            EndstopX::is_triggered(self)
        }
    }

    /// Stand-in for the XIO line reader: never has a line ready. Swapped
    /// for a real USART-backed reader once one exists in this workspace.
    struct NoLineYet;
    impl InputSource for NoLineYet {
        fn read_line(&mut self, _buf: &mut [u8]) -> LineStatus {
            LineStatus::Pending
        }
        fn reset(&mut self) {}
    }

    /// Stand-in response sink: drops everything. A real binary routes
    /// this to the USART1 TX half.
    struct DropSink;
    impl ResponseSink for DropSink {
        fn emit_text(&mut self, _s: &str) {}
        fn emit_json_exception(&mut self, _s: &str) {}
        fn emit_stderr(&mut self, _s: &str) {}
    }

    struct NoGCode;
    impl GCodeParser for NoGCode {
        fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
            Ok(())
        }
    }
    struct NoText;
    impl TextParser for NoText {
        fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
            Ok(())
        }
    }
    struct NoJson;
    impl JsonParser for NoJson {
        fn parse_and_execute(&mut self, _line: &str) -> Result<(), ControlError> {
            Ok(())
        }
    }
    struct NoMotion;
    impl MotionRequests for NoMotion {
        fn request_feedhold(&mut self) {}
        fn request_queue_flush(&mut self) {}
        fn request_cycle_start(&mut self) {}
    }
    struct EmptyPlanner;
    impl PlannerBackpressure for EmptyPlanner {
        fn free_buffers(&self) -> usize {
            usize::MAX
        }
    }
    struct EmptyTx;
    impl TxBackpressure for EmptyTx {
        fn occupancy(&self) -> usize {
            0
        }
    }

    #[shared]
    struct Shared {
        usart_tx: Tx<USART1>,
    }

    #[local]
    struct Local {
        led: LedPin,
        usart_rx: Rx<USART1>,
        endstop: EndstopX,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        defmt::info!("RTIC Init");
        let dp = cx.device;

        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.use_hse(8.MHz()).sysclk(168.MHz()).freeze();

        let systick_mono_token = rtic_monotonics::create_systick_token!();
        Systick::start(cx.core.SYST, clocks.hclk().0, systick_mono_token);

        let gpiod = dp.GPIOD.split();
        let mut led = gpiod.pd12.into_push_pull_output();
        led.set_high();

        let gpioa = dp.GPIOA.split();
        let tx_pin = gpioa.pa9.into_alternate();
        let rx_pin = gpioa.pa10.into_alternate();
        let serial_config = SerialConfig::default().baudrate(250_000.bps());
        let (usart_tx, mut usart_rx) = Serial::new(dp.USART1, (tx_pin, rx_pin), serial_config, &clocks)
            .unwrap()
            .split();
        usart_rx.listen(SerialEvent::Rxne);

        let gpioe = dp.GPIOE.split();
        let endstop = EndstopX(gpioe.pe5.into_pull_up_input());

        heater_tick_task::spawn().ok();

        defmt::info!("RTIC Init complete.");

        (
            Shared { usart_tx },
            Local { led, usart_rx, endstop },
        )
    }

    /// The main-loop idle task: runs the dispatcher's 19-entry priority
    /// list once per iteration, forever, exactly as the dispatcher's own
    /// docs specify. Every external-handler slot is a [`NoopHandler`]
    /// until the subsystems it represents (feedhold, stepper power,
    /// status/queue reports, arcs, homing, jogging, probing, baud-rate
    /// updates) are implemented elsewhere in the workspace.
    #[idle(local = [led, endstop])]
    fn idle(cx: idle::Context) -> ! {
        let mut noops: [NoopHandler; EXTERNAL_HANDLER_COUNT] =
            [NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler, NoopHandler];
        // Destructure into ten distinct bindings rather than indexing
        // `noops` ten times — indexing the same array repeatedly can't
        // produce ten simultaneous mutable borrows the borrow checker
        // will accept, since it can't see the indices are disjoint.
        let [a, b, c, d, e, f, g, h, i, j] = &mut noops;
        let mut external: [&mut dyn CooperativeHandler; EXTERNAL_HANDLER_COUNT] =
            [a, b, c, d, e, f, g, h, i, j];

        let command = motion_control::command::CommandDispatcher::new(NoGCode, NoText, NoJson, NoLineYet, DropSink, NoMotion);
        let mut dispatcher = Dispatcher::new(&*cx.local.endstop, EmptyPlanner, EmptyTx, command, external);
        let mut controller = motion_control::controller::ControllerState::new(0, 1, 0);
        let monitor = motion_control::integrity::IntegrityMonitor::new(&[], &[]);

        loop {
            let _ = dispatcher.run_cycle(&mut controller, &monitor, 1, 1);
            cx.local.led.toggle();
        }
    }

    /// Feeds the heater supervisor's 10 ms sensor tick. Stepper-ISR
    /// territory (TIM2/DDA) is out of scope here; this crate only owns
    /// the thermal control loop.
    #[task(priority = 1)]
    async fn heater_tick_task(_: heater_tick_task::Context) {
        loop {
            // The concrete `Heater` lives in whatever binary constructs the
            // ADC/PWM peripherals (see `crate::heater::build_heater`); this
            // bring-up task only demonstrates the schedule.
            Systick::delay(10.millis()).await;
        }
    }

    /// Communication task: USART1 RX, one byte at a time. Feeding bytes
    /// into a line buffer an [`InputSource`] exposes is left to a real
    /// XIO reader, out of scope for this crate.
    #[task(binds = USART1, local = [usart_rx], priority = 2)]
    fn usart_task(cx: usart_task::Context) {
        let _ = cx.local.usart_rx.read();
    }
}
