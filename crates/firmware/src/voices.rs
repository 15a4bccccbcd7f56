//! Drives the piezo buzzers, one PWM timer per voice so that each can run at its own frequency.

use defmt::warn;
use embassy_stm32::{
    peripherals::{TIM1, TIM3, TIM4},
    time::Hertz,
    timer::{GeneralInstance4Channel, simple_pwm::SimplePwm},
};
use tritone_lib::voicing::{DutyCycle, Frequency, ToneOutput, whole_hertz};

fn drive<T: GeneralInstance4Channel>(
    pwm: &mut SimplePwm<'static, T>,
    frequency: Frequency,
    duty_cycle: DutyCycle,
) {
    pwm.set_frequency(Hertz(whole_hertz(frequency)));
    let mut channel = pwm.ch1();
    // the duty cycle is relative to the period, so it has to be reapplied after the frequency changes
    channel.set_duty_cycle_percent(duty_cycle.percent());
    channel.enable();
}

fn stop<T: GeneralInstance4Channel>(pwm: &mut SimplePwm<'static, T>) {
    let mut channel = pwm.ch1();
    channel.set_duty_cycle_fully_off();
    channel.disable();
}

/// The three buzzers, each wired to channel 1 of its own timer.
pub struct Buzzers {
    first: SimplePwm<'static, TIM3>,
    second: SimplePwm<'static, TIM4>,
    third: SimplePwm<'static, TIM1>,
}

impl Buzzers {
    pub fn new(
        first: SimplePwm<'static, TIM3>,
        second: SimplePwm<'static, TIM4>,
        third: SimplePwm<'static, TIM1>,
    ) -> Self {
        Self {
            first,
            second,
            third,
        }
    }
}

impl ToneOutput for Buzzers {
    fn set_channel(&mut self, voice: usize, frequency: Frequency, duty_cycle: DutyCycle) {
        match voice {
            0 => drive(&mut self.first, frequency, duty_cycle),
            1 => drive(&mut self.second, frequency, duty_cycle),
            2 => drive(&mut self.third, frequency, duty_cycle),
            _ => warn!("No buzzer is wired to voice {}", voice),
        }
    }

    fn stop_channel(&mut self, voice: usize) {
        match voice {
            0 => stop(&mut self.first),
            1 => stop(&mut self.second),
            2 => stop(&mut self.third),
            _ => warn!("No buzzer is wired to voice {}", voice),
        }
    }
}
