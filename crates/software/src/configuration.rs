//! This module contains both user-configurable settings (implemented as enums) and traits to make them easier to work
//! with in code, as well as the [`ControllerConfig`] which gathers the settings fixed at startup.

mod encoder_policy;
pub use encoder_policy::*;

use embassy_time::Duration;
use measurements::Frequency;
use num_traits::{FromPrimitive, ToPrimitive};
use wmidi::{Channel, Note, U7, Velocity};

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let index = self
            .to_u8()
            .expect("enum variants should be castable to u8");
        match <Self as FromPrimitive>::from_u8(index + 1) {
            Some(new_selection) => new_selection,
            None => FromPrimitive::from_u8(0).expect("enum should not be empty"),
        }
    }
}

/// Settings the controller is constructed with.
///
/// The defaults mirror the prototype this device grew out of: the leftmost button starts on C2, messages go out on
/// MIDI channel 1 at a fixed velocity of 1, and the encoders are sampled twenty times per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    /// The note assigned to the leftmost button at power-up. Clamped into the transposable range.
    pub initial_low_note: Note,
    /// How simultaneous movement of both encoders is resolved.
    pub encoder_policy: EncoderPolicy,
    /// The channel on which NoteOn and NoteOff messages are sent.
    pub midi_channel: Channel,
    /// Buttons are not velocity sensitive, so every message carries this value.
    pub velocity: Velocity,
    /// The pitch of A4, from which every other frequency is derived.
    pub reference_pitch: Frequency,
    /// How often the encoders are sampled.
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_low_note: Note::C2,
            encoder_policy: EncoderPolicy::default(),
            midi_channel: Channel::Ch1,
            velocity: U7::from_u8_lossy(1),
            reference_pitch: Frequency::from_hertz(440.0),
            poll_interval: Duration::from_millis(50),
        }
    }
}
