//! The destination of the note messages the keyboard emits.

use wmidi::MidiMessage;

/// Reasons a message could not be handed to a [`NoteSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The sink cannot accept more messages right now.
    Full,
}

/// Accepts MIDI messages, fire and forget.
///
/// Implementations must not block: the keyboard keeps sounding and reconciling notes whether or not anyone hears
/// about it, so a slow transport should buffer and refuse rather than wait.
pub trait NoteSink {
    /// Hand a message over for delivery.
    fn send(&mut self, message: MidiMessage<'static>) -> Result<(), SinkError>;
}
