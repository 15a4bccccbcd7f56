//! Tasks and types related to the [`EncoderPolicy`] configuration.

use defmt::info;
use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{AnonReceiver, Sender, Watch},
};
use tritone_lib::configuration::{CycleConfig, EncoderPolicy};

const ENCODER_POLICY_RECEIVER_CNT: usize = 0;
/// Syncs [encoder policy](`EncoderPolicy`) config across tasks.
pub static ENCODER_POLICY_SYNC: Watch<
    CriticalSectionRawMutex,
    EncoderPolicy,
    ENCODER_POLICY_RECEIVER_CNT,
> = Watch::new_with(EncoderPolicy::Independent);
pub type EncoderPolicySender<'a> =
    Sender<'a, CriticalSectionRawMutex, EncoderPolicy, ENCODER_POLICY_RECEIVER_CNT>;
pub type EncoderPolicySpy<'a> =
    AnonReceiver<'a, CriticalSectionRawMutex, EncoderPolicy, ENCODER_POLICY_RECEIVER_CNT>;

/// Handles button presses, cycling through the [`EncoderPolicy`] configurations.
///
/// The LED is dark while both encoders are honored independently and lit while only the first is.
#[embassy_executor::task]
pub async fn select_encoder_policy(
    mut button: ExtiInput<'static>,
    mut led: Output<'static>,
    encoder_policy: EncoderPolicySender<'static>,
) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let new_state = encoder_policy
            .try_get()
            .expect("Encoder policy state should never be uninitialized")
            .cycle();
        encoder_policy.send(new_state);
        info!("Selected encoder policy {}", new_state);

        match new_state {
            EncoderPolicy::Independent => {
                led.set_low();
            }
            EncoderPolicy::FirstMatch => {
                led.set_high();
            }
        }
    }
}
