#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::{Executor, InterruptExecutor, Spawner};
use embassy_futures::select::select;
use embassy_rp::adc::{Adc, Async, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::pwm::Pwm;
use embassy_time::{Duration, Ticker};
use embedded_hal_async::digital::Wait;
use heli_firmware::{
    on_reference_edge, rotor_pwm_config, Controls, DefmtDisplay, FlightSupervisor, PeriodicTimer,
    PolledInput, QuadratureDecoder, RotorDuty, RotorOutput, SharedState, SupervisorConfig,
    DEFAULT_CONFIG,
};
use heli_supervisor::config::{
    DISPLAY_PERIOD_MS, INPUT_POLL_MS, LANDING_TIMER_PERIOD_MS, SUPERVISOR_PERIOD_MS,
};
use heli_supervisor::output::report;
use heli_supervisor::sensor::quadrature::phase_reading;
use heli_supervisor::{AltitudeFilter, ControlLoop, Proportional, Rotor};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
});

/// Altitude sample period.
const ALTITUDE_SAMPLE_MS: u64 = 20;

/// Control loop and rotor PWM refresh period.
const ROTOR_UPDATE_MS: u64 = 20;

/// Every cross-task cell. Written from edge tasks and periodic tasks alike.
static SHARED: SharedState = SharedState::new();

/// Landing ramp timer, ticked by `landing_timer_task`.
static LANDING_TIMER: PeriodicTimer = PeriodicTimer::new();

/// Runs the encoder edge tasks above every thread-mode task.
static EXECUTOR_EDGES: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MAIN: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EDGES.on_interrupt()
}

#[entry]
fn main() -> ! {
    info!("heli supervisor starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Encoder and index sensor ---
    let phase_a = Input::new(p.PIN_2, Pull::None);
    let phase_b = Input::new(p.PIN_3, Pull::None);
    let index = Input::new(p.PIN_4, Pull::Up);
    let decoder = QuadratureDecoder::with_reading(phase_reading(phase_a.is_high(), phase_b.is_high()));

    // --- Rotor PWM (slice 0: GPIO 16 main, GPIO 17 tail) ---
    let pwm_config = rotor_pwm_config();
    let pwm = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_16, p.PIN_17, pwm_config.clone());
    let rotors = RotorOutput::new(pwm, pwm_config);

    // --- Altitude sensor (GPIO 26 = ADC0) ---
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let altitude_channel = Channel::new_pin(p.PIN_26, Pull::None);

    // --- Pilot controls: up/down active high, left/right active low ---
    let controls = Controls::new(
        PolledInput::new(Input::new(p.PIN_10, Pull::Down), true),
        PolledInput::new(Input::new(p.PIN_11, Pull::Down), true),
        PolledInput::new(Input::new(p.PIN_12, Pull::Up), false),
        PolledInput::new(Input::new(p.PIN_13, Pull::Up), false),
        PolledInput::new(Input::new(p.PIN_14, Pull::Down), true),
    );

    let config = SupervisorConfig {
        rehome_on_takeoff: cfg!(feature = "rehome-on-takeoff"),
        ..DEFAULT_CONFIG
    };

    // Edge tasks preempt the thread-mode executor.
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let edges = EXECUTOR_EDGES.start(interrupt::SWI_IRQ_1);
    edges.spawn(quadrature_task(phase_a, phase_b, decoder).unwrap());
    edges.spawn(reference_task(index).unwrap());

    let executor = EXECUTOR_MAIN.init(Executor::new());
    executor.run(|spawner: Spawner| {
        spawner.spawn(supervisor_task(config).unwrap());
        spawner.spawn(landing_timer_task().unwrap());
        spawner.spawn(altitude_task(adc, altitude_channel).unwrap());
        spawner.spawn(controls_task(controls).unwrap());
        spawner.spawn(rotor_task(rotors).unwrap());
        spawner.spawn(display_task().unwrap());
        info!("heli supervisor initialized, waiting for switch...");
    })
}

/// Wait for either phase pin to change level.
async fn next_phase_edge<A: Wait, B: Wait>(a: &mut A, b: &mut B) {
    let _ = select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;
}

/// Quadrature decoder task - one decode per phase edge.
#[embassy_executor::task]
async fn quadrature_task(
    mut phase_a: Input<'static>,
    mut phase_b: Input<'static>,
    mut decoder: QuadratureDecoder,
) {
    loop {
        next_phase_edge(&mut phase_a, &mut phase_b).await;
        let reading = phase_reading(phase_a.is_high(), phase_b.is_high());
        decoder.on_edge(reading, &SHARED);
    }
}

/// Index sensor task - one falling edge per revolution.
#[embassy_executor::task]
async fn reference_task(mut index: Input<'static>) {
    loop {
        if Wait::wait_for_falling_edge(&mut index).await.is_err() {
            continue;
        }
        on_reference_edge(&SHARED);
    }
}

/// Supervisor task - evaluates the flight mode every period.
#[embassy_executor::task]
async fn supervisor_task(config: SupervisorConfig) {
    let mut supervisor = FlightSupervisor::new(config, &LANDING_TIMER);
    let mut ticker = Ticker::every(Duration::from_millis(SUPERVISOR_PERIOD_MS));
    loop {
        // Faults are logged inside `step`; keep running.
        let _ = supervisor.step(&SHARED);
        ticker.next().await;
    }
}

/// Landing timer task - advances the ramp tick id while the ramp runs.
#[embassy_executor::task]
async fn landing_timer_task() {
    let mut ticker = Ticker::every(Duration::from_millis(LANDING_TIMER_PERIOD_MS));
    loop {
        ticker.next().await;
        LANDING_TIMER.tick();
    }
}

/// Altitude task - samples the height sensor and publishes percent altitude.
#[embassy_executor::task]
async fn altitude_task(mut adc: Adc<'static, Async>, mut channel: Channel<'static>) {
    let mut filter = AltitudeFilter::default();
    let mut ticker = Ticker::every(Duration::from_millis(ALTITUDE_SAMPLE_MS));
    loop {
        match adc.read(&mut channel).await {
            Ok(sample) => {
                filter.publish(sample, &SHARED);
            }
            Err(e) => warn!("ADC read failed: {:?}", e),
        }
        ticker.next().await;
    }
}

/// Controls task - polls buttons and the mode switch.
#[embassy_executor::task]
async fn controls_task(mut controls: Controls<Input<'static>>) {
    let mut ticker = Ticker::every(Duration::from_millis(INPUT_POLL_MS));
    loop {
        controls.poll(&SHARED);
        ticker.next().await;
    }
}

/// Rotor task - runs the gated control loops, then applies the latest duty
/// cells to the PWM slice.
#[embassy_executor::task]
async fn rotor_task(mut rotors: RotorOutput<'static>) {
    let mut main_loop = ControlLoop::new(Rotor::Main, Proportional::MAIN);
    let mut tail_loop = ControlLoop::new(Rotor::Tail, Proportional::TAIL);
    let mut ticker = Ticker::every(Duration::from_millis(ROTOR_UPDATE_MS));
    loop {
        // Each loop checks its own gate; closed loops leave the open-loop
        // duty from the supervisor in place.
        main_loop.run(&SHARED);
        tail_loop.run(&SHARED);
        rotors.apply(RotorDuty::from_shared(&SHARED));
        ticker.next().await;
    }
}

/// Display task - logs the status rows.
#[embassy_executor::task]
async fn display_task() {
    let mut display = DefmtDisplay::new();
    let mut ticker = Ticker::every(Duration::from_millis(DISPLAY_PERIOD_MS));
    loop {
        if let Err(e) = report(&SHARED, &mut display).await {
            error!("display error: {:?}", e);
        }
        ticker.next().await;
    }
}
