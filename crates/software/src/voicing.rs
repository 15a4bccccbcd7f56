//! Assigns sounding notes to the buzzers which voice them.

mod frequency_table;
pub use frequency_table::*;

pub use measurements::Frequency;

use crate::note_state::SoundingNotes;
use wmidi::Note;

/// The number of buzzers, i.e., how many notes can be heard at once.
pub const VOICE_CNT: usize = 3;

/// The frequency an idle voice is parked at. PWM peripherals cannot be set to 0 Hz.
pub const IDLE_FREQUENCY_HZ: f64 = 1.0;

/// The proportion of each period a PWM output spends high, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(u8);

impl DutyCycle {
    /// Silent.
    pub const OFF: Self = Self(0);
    /// A square wave, the loudest a piezo buzzer gets.
    pub const SQUARE: Self = Self(50);

    /// Getter.
    pub fn percent(&self) -> u8 {
        self.0
    }
}

/// Rounds `frequency` to the nearest whole hertz, never below 1 Hz, for timers which can only be set in whole hertz.
///
/// Below C0 adjacent notes can collide (e.g., 8.66 Hz and 9.18 Hz both become 9 Hz).
pub fn whole_hertz(frequency: Frequency) -> u32 {
    libm::round(frequency.as_hertz()).max(1.0) as u32
}

/// A bank of tone generators, one per voice.
pub trait ToneOutput {
    /// Drive the voice's output at `frequency`.
    fn set_channel(&mut self, voice: usize, frequency: Frequency, duty_cycle: DutyCycle);

    /// Shut the voice's output down entirely.
    fn stop_channel(&mut self, voice: usize);
}

/// Maps sounding notes onto voices.
///
/// Voices are bound positionally: voice `i` plays the `i`th oldest sounding note. Nothing is remembered between
/// calls, so when a note is released every younger note may shift to a different buzzer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoiceAllocator {
    frequencies: FrequencyTable,
}

impl VoiceAllocator {
    /// Constructs a `VoiceAllocator`.
    pub fn new(frequencies: FrequencyTable) -> Self {
        Self { frequencies }
    }

    /// Returns an [`Iterator`] over the notes which will actually be heard. Notes beyond [`VOICE_CNT`] keep sounding
    /// as far as MIDI is concerned but get no buzzer.
    pub fn voiced<'a>(&self, notes: &'a SoundingNotes) -> impl Iterator<Item = Note> + 'a {
        notes.iter().take(VOICE_CNT)
    }

    /// Commands every voice: bound voices play their note as a square wave; the rest are muted.
    pub fn apply<O: ToneOutput>(&self, notes: &SoundingNotes, output: &mut O) {
        let mut voiced = self.voiced(notes);
        for voice in 0..VOICE_CNT {
            match voiced.next() {
                Some(note) => {
                    output.set_channel(voice, self.frequencies.frequency(note), DutyCycle::SQUARE)
                }
                None => output.set_channel(
                    voice,
                    Frequency::from_hertz(IDLE_FREQUENCY_HZ),
                    DutyCycle::OFF,
                ),
            }
        }
    }

    /// Stops every voice.
    pub fn silence<O: ToneOutput>(&self, output: &mut O) {
        for voice in 0..VOICE_CNT {
            output.stop_channel(voice);
        }
    }
}
