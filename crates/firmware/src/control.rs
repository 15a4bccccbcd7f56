//! The controller task, sole owner of the note state and the buzzers.
//!
//! Button interrupts and encoder polls arrive from separate tasks. Rather than share the note state between them,
//! they queue [`Input`]s, which the controller applies one at a time.

use crate::{
    buttons::ButtonStatesSpy,
    encoder_policy::EncoderPolicySpy,
    midi_out::{MidiQueueSender, QueueSink},
    voices::Buzzers,
};
use defmt::*;
use embassy_stm32::exti::ExtiInput;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use tritone_lib::controller::Controller;

/// Something the performer did.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub enum Input {
    /// A button was pressed or released.
    Edge { button: usize, pressed: bool },
    /// One or both encoders turned since the last poll; positive values are clockwise.
    Encoders { octave: i16, semitone: i16 },
    /// The stop switch was thrown.
    Shutdown,
}

const INPUT_QUEUE_LEN: usize = 16;
/// Inputs waiting to be applied by the controller.
pub static INPUTS: Channel<CriticalSectionRawMutex, Input, INPUT_QUEUE_LEN> = Channel::new();
pub type InputSender<'a> = Sender<'a, CriticalSectionRawMutex, Input, INPUT_QUEUE_LEN>;
pub type InputReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, Input, INPUT_QUEUE_LEN>;

/// Task responsible for applying inputs to the note state, voicing the result and reporting it over MIDI.
///
/// Once the stop switch is thrown every buzzer is stopped for good. Inputs are still drained afterwards, so the
/// button and encoder tasks never wait on a full queue, but the controller ignores them.
#[embassy_executor::task]
pub async fn controller(
    controller: &'static mut Controller,
    mut buzzers: Buzzers,
    inputs: InputReceiver<'static>,
    mut button_states: ButtonStatesSpy<'static>,
    mut encoder_policy: EncoderPolicySpy<'static>,
    midi: MidiQueueSender<'static>,
) -> ! {
    let mut sink = QueueSink::new(midi);
    controller.refresh(&mut buzzers);
    info!(
        "Ready; leftmost button plays {}",
        controller.low_note().to_str()
    );

    loop {
        let changes = match inputs.receive().await {
            Input::Edge { button, pressed } => controller.handle_edge(button, pressed, &mut buzzers),
            Input::Encoders { octave, semitone } => {
                if let Some(policy) = encoder_policy.try_get() {
                    controller.set_encoder_policy(policy);
                }
                let buttons = button_states
                    .try_get()
                    .expect("Button state should never be uninitialized");
                controller.handle_encoders(octave.into(), semitone.into(), buttons, &mut buzzers)
            }
            Input::Shutdown if controller.is_stopped() => continue,
            Input::Shutdown => {
                let changes = controller.teardown(&mut buzzers);
                controller.forward(&changes, &mut sink);
                info!(
                    "Shut down with all voices silenced; {} MIDI messages were dropped while running",
                    controller.dropped_messages()
                );
                continue;
            }
        };
        controller.forward(&changes, &mut sink);
    }
}

/// Task responsible for the stop switch, which ends play for good.
#[embassy_executor::task]
pub async fn stop_switch(mut switch: ExtiInput<'static>, inputs: InputSender<'static>) {
    switch.wait_for_rising_edge().await;
    info!("Stop switch thrown");
    inputs.send(Input::Shutdown).await;
}
