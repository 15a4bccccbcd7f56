//! Tritone is [Embassy](https://embassy.dev)-based firmware for a small keyboard: twelve momentary buttons, two
//! rotary encoders for transposition, and three piezo buzzers, so that up to three notes sound at once. Every note
//! played is also reported as a MIDI NoteOn/NoteOff message over a serial port, so the keyboard can drive a
//! synthesizer as well. The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series STM32
//! microcontroller.
//!
//! The first encoder shifts the keyboard by octaves and the second by half steps. The user button selects how the
//! encoders combine when both are turned at once (see [`EncoderPolicy`][tritone_lib::configuration::EncoderPolicy]),
//! and a stop switch releases every note and silences the buzzers.

#![no_std]
#![no_main]

mod buttons;
mod control;
mod encoder_policy;
mod encoders;
mod midi_out;
mod voices;

use crate::{
    buttons::BUTTON_STATES_SYNC, control::INPUTS, encoder_policy::ENCODER_POLICY_SYNC,
    midi_out::MIDI_QUEUE, voices::Buzzers,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    exti::ExtiInput,
    gpio::{Level, Output, OutputType, Pull, Speed},
    time::Hertz,
    timer::{
        low_level::CountingMode,
        qei::{Qei, QeiPin},
        simple_pwm::{PwmPin, SimplePwm},
    },
    usart::{self, UartTx},
};
use embassy_time::Duration;
use static_cell::StaticCell;
use tritone_lib::{configuration::ControllerConfig, controller::Controller};

use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Tritone");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            divq: None,
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    let p = embassy_stm32::init(config);

    let controller_config = ControllerConfig::default();

    // buttons are wired active high; each needs an EXTI line of its own, hence pins 0 through 11 of a single port
    let buttons = [
        ExtiInput::new(p.PF0, p.EXTI0, Pull::Down),
        ExtiInput::new(p.PF1, p.EXTI1, Pull::Down),
        ExtiInput::new(p.PF2, p.EXTI2, Pull::Down),
        ExtiInput::new(p.PF3, p.EXTI3, Pull::Down),
        ExtiInput::new(p.PF4, p.EXTI4, Pull::Down),
        ExtiInput::new(p.PF5, p.EXTI5, Pull::Down),
        ExtiInput::new(p.PF6, p.EXTI6, Pull::Down),
        ExtiInput::new(p.PF7, p.EXTI7, Pull::Down),
        ExtiInput::new(p.PF8, p.EXTI8, Pull::Down),
        ExtiInput::new(p.PF9, p.EXTI9, Pull::Down),
        ExtiInput::new(p.PF10, p.EXTI10, Pull::Down),
        ExtiInput::new(p.PF11, p.EXTI11, Pull::Down),
    ];
    unwrap!(spawner.spawn(buttons::buttons(
        buttons,
        BUTTON_STATES_SYNC.sender(),
        INPUTS.sender()
    )));

    // per RM0410, TIM2 and TIM5 channels 1 and 2 can decode quadrature input
    let octave_encoder = Qei::new(p.TIM2, QeiPin::new_ch1(p.PA15), QeiPin::new_ch2(p.PB3));
    let semitone_encoder = Qei::new(p.TIM5, QeiPin::new_ch1(p.PA0), QeiPin::new_ch2(p.PA1));
    // the library measures time with its own copy of embassy-time, so the interval is handed over in microseconds
    let poll_interval = Duration::from_micros(controller_config.poll_interval.as_micros());
    unwrap!(spawner.spawn(encoders::encoders(
        octave_encoder,
        semitone_encoder,
        poll_interval,
        INPUTS.sender()
    )));

    // one timer per buzzer: channels of the same timer share a period and so could not play different notes
    let buzzers = Buzzers::new(
        SimplePwm::new(
            p.TIM3,
            Some(PwmPin::new_ch1(p.PA6, OutputType::PushPull)),
            None,
            None,
            None,
            Hertz(1),
            CountingMode::EdgeAlignedUp,
        ),
        SimplePwm::new(
            p.TIM4,
            Some(PwmPin::new_ch1(p.PD12, OutputType::PushPull)),
            None,
            None,
            None,
            Hertz(1),
            CountingMode::EdgeAlignedUp,
        ),
        SimplePwm::new(
            p.TIM1,
            Some(PwmPin::new_ch1(p.PE9, OutputType::PushPull)),
            None,
            None,
            None,
            Hertz(1),
            CountingMode::EdgeAlignedUp,
        ),
    );

    let mut uart_config = usart::Config::default();
    uart_config.baudrate = midi_out::MIDI_BAUD_RATE;
    // USART2 transmits on port D, pin 5; DMA1 stream 6 serves its TX requests
    let uart = unwrap!(UartTx::new(p.USART2, p.PD5, p.DMA1_CH6, uart_config));
    unwrap!(spawner.spawn(midi_out::midi_out(uart, MIDI_QUEUE.receiver())));

    // the blue user LED shows which encoder policy is selected
    let policy_button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(encoder_policy::select_encoder_policy(
        policy_button,
        blue_led,
        ENCODER_POLICY_SYNC.sender()
    )));

    let stop_switch = ExtiInput::new(p.PG14, p.EXTI14, Pull::Down);
    unwrap!(spawner.spawn(control::stop_switch(stop_switch, INPUTS.sender())));

    static CONTROLLER: StaticCell<Controller> = StaticCell::new();
    let controller = CONTROLLER.init(Controller::new(controller_config));
    unwrap!(spawner.spawn(control::controller(
        controller,
        buzzers,
        INPUTS.receiver(),
        BUTTON_STATES_SYNC.anon_receiver(),
        ENCODER_POLICY_SYNC.anon_receiver(),
        MIDI_QUEUE.sender()
    )));
}
