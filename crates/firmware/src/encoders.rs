//! Samples the transposition encoders.

use crate::control::{Input, InputSender};
use defmt::*;
use embassy_stm32::{
    peripherals::{TIM2, TIM5},
    timer::qei::Qei,
};
use embassy_time::{Duration, Ticker};
use tritone_lib::encoder::EncoderPosition;

/// Task responsible for polling both encoders, reporting only when at least one of them moved.
///
/// Rotation is counted by the timers in quadrature mode, so nothing is lost between polls; polling merely bounds
/// how quickly a turn takes effect.
#[embassy_executor::task]
pub async fn encoders(
    octave: Qei<'static, TIM2>,
    semitone: Qei<'static, TIM5>,
    poll_interval: Duration,
    inputs: InputSender<'static>,
) -> ! {
    let mut octave_position = EncoderPosition::new(octave.count());
    let mut semitone_position = EncoderPosition::new(semitone.count());
    let mut ticker = Ticker::every(poll_interval);

    loop {
        ticker.next().await;
        let octave_delta = octave_position.update(octave.count());
        let semitone_delta = semitone_position.update(semitone.count());

        if octave_delta != 0 || semitone_delta != 0 {
            debug!(
                "Encoders moved: octave {}, semitone {}",
                octave_delta, semitone_delta
            );
            inputs
                .send(Input::Encoders {
                    octave: octave_delta,
                    semitone: semitone_delta,
                })
                .await;
        }
    }
}
