//! Watches the keyboard's buttons.

use crate::control::{Input, InputSender};
use defmt::*;
use embassy_futures::select::select_array;
use embassy_stm32::exti::ExtiInput;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{AnonReceiver, Sender, Watch},
};
use tritone_lib::note_state::{BUTTON_CNT, ButtonStates};

const BUTTON_STATES_RECEIVER_CNT: usize = 0;
/// Syncs the most recent snapshot of every button's level across tasks.
pub static BUTTON_STATES_SYNC: Watch<
    CriticalSectionRawMutex,
    ButtonStates,
    BUTTON_STATES_RECEIVER_CNT,
> = Watch::new_with(ButtonStates::none());
pub type ButtonStatesSender<'a> =
    Sender<'a, CriticalSectionRawMutex, ButtonStates, BUTTON_STATES_RECEIVER_CNT>;
pub type ButtonStatesSpy<'a> =
    AnonReceiver<'a, CriticalSectionRawMutex, ButtonStates, BUTTON_STATES_RECEIVER_CNT>;

fn sample(buttons: &[ExtiInput<'static>; BUTTON_CNT]) -> ButtonStates {
    ButtonStates::from(core::array::from_fn(|button| buttons[button].is_high()))
}

/// Task responsible for turning button interrupts into [`Input::Edge`]s.
///
/// The snapshot is published before the edge is queued, so a transposition processed in between already accounts
/// for the button; the edge then arrives as a no-op.
#[embassy_executor::task]
pub async fn buttons(
    mut buttons: [ExtiInput<'static>; BUTTON_CNT],
    states: ButtonStatesSender<'static>,
    inputs: InputSender<'static>,
) -> ! {
    states.send(sample(&buttons));
    loop {
        let (_, button) =
            select_array(buttons.each_mut().map(|input| input.wait_for_any_edge())).await;

        let snapshot = sample(&buttons);
        states.send(snapshot);

        let pressed = snapshot.is_pressed(button);
        debug!("Button {} is {}", button, if pressed { "down" } else { "up" });
        inputs.send(Input::Edge { button, pressed }).await;
    }
}
