//! Provides the [`TranspositionTracker`], which turns encoder movement into the note played by the leftmost button.

use crate::{configuration::EncoderPolicy, note_state::BUTTON_CNT};
use wmidi::Note;

/// Half steps in an octave.
pub const OCTAVE: u8 = 12;

/// The highest note the leftmost button may play such that the rightmost button still plays a valid MIDI note.
pub const MAX_LOW_NOTE: u8 = 127 - BUTTON_CNT as u8;

/// Tracks the transposition of the keyboard, expressed as the note assigned to the leftmost button.
///
/// The first encoder shifts by octaves and the second by half steps. Turning either encoder clockwise (i.e., an
/// increasing count) lowers the keyboard. Only the direction of movement within a poll matters; each encoder moves
/// the keyboard at most one step per poll. Shifts that would carry any button outside the MIDI range are ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranspositionTracker {
    low_note: Note,
    policy: EncoderPolicy,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TranspositionTracker {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TranspositionTracker {{ low_note: {}, policy: {} }}",
            self.low_note.to_str(),
            self.policy
        );
    }
}

impl TranspositionTracker {
    /// Constructs a `TranspositionTracker`, clamping `low_note` into the transposable range.
    pub fn new(low_note: Note, policy: EncoderPolicy) -> Self {
        Self {
            low_note: Note::from_u8_lossy(u8::from(low_note).min(MAX_LOW_NOTE)),
            policy,
        }
    }

    /// The note played by the leftmost button.
    pub fn low_note(&self) -> Note {
        self.low_note
    }

    /// Getter.
    pub fn policy(&self) -> EncoderPolicy {
        self.policy
    }

    /// Setter.
    pub fn set_policy(&mut self, policy: EncoderPolicy) {
        self.policy = policy;
    }

    /// Applies one poll's worth of encoder movement. Returns the resulting low note and whether it changed.
    pub fn update(&mut self, octave_delta: i32, semitone_delta: i32) -> (Note, bool) {
        let before = u8::from(self.low_note);
        let after = match self.policy {
            EncoderPolicy::Independent => {
                let low = octave_step(before, octave_delta).unwrap_or(before);
                semitone_step(low, semitone_delta).unwrap_or(low)
            }
            EncoderPolicy::FirstMatch => octave_step(before, octave_delta)
                .or_else(|| semitone_step(before, semitone_delta))
                .unwrap_or(before),
        };

        self.low_note = Note::from_u8_lossy(after);
        (self.low_note, after != before)
    }
}

fn octave_step(low: u8, delta: i32) -> Option<u8> {
    match delta.signum() {
        1 if low >= OCTAVE => Some(low - OCTAVE),
        -1 if low <= MAX_LOW_NOTE - OCTAVE => Some(low + OCTAVE),
        _ => None,
    }
}

fn semitone_step(low: u8, delta: i32) -> Option<u8> {
    match delta.signum() {
        1 if low > 0 => Some(low - 1),
        -1 if low < MAX_LOW_NOTE => Some(low + 1),
        _ => None,
    }
}
