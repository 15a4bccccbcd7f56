//! Provides the [`Controller`], the single owner of the keyboard's note state.

use crate::{
    configuration::{ControllerConfig, EncoderPolicy},
    note_state::{ButtonStates, NoteChanges, Reconciler, SoundingNotes},
    sink::NoteSink,
    transposition::TranspositionTracker,
    voicing::{FrequencyTable, ToneOutput, VoiceAllocator},
};
use wmidi::Note;

/// Ties transposition, note reconciliation and voice allocation together.
///
/// Every change to the sounding notes passes through a `Controller`, so callers serialize access to it (e.g., by
/// owning it from a single task) and the notes can never be mutated by two inputs at once. Each handler updates the
/// voices itself and returns the resulting [`NoteChanges`], which the caller passes to [`forward`][Self::forward].
#[derive(Clone, Debug)]
pub struct Controller {
    config: ControllerConfig,
    transposition: TranspositionTracker,
    reconciler: Reconciler,
    voices: VoiceAllocator,
    dropped_messages: u32,
    stopped: bool,
}

impl Controller {
    /// Constructs a `Controller` with nothing sounding.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            transposition: TranspositionTracker::new(
                config.initial_low_note,
                config.encoder_policy,
            ),
            reconciler: Reconciler::new(),
            voices: VoiceAllocator::new(FrequencyTable::equal_tempered(config.reference_pitch)),
            dropped_messages: 0,
            stopped: false,
        }
    }

    /// Returns `true` once [`teardown`][Self::teardown] has run.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The note played by the leftmost button.
    pub fn low_note(&self) -> Note {
        self.transposition.low_note()
    }

    /// The sounding notes, oldest first.
    pub fn sounding(&self) -> &SoundingNotes {
        self.reconciler.sounding()
    }

    /// How many messages the sink has refused so far.
    pub fn dropped_messages(&self) -> u32 {
        self.dropped_messages
    }

    /// Change how simultaneous encoder movement is resolved.
    pub fn set_encoder_policy(&mut self, policy: EncoderPolicy) {
        if self.transposition.policy() != policy {
            info!("Encoder policy is now {}", policy);
            self.transposition.set_policy(policy);
        }
    }

    /// Brings the voices in line with the sounding notes, e.g., after power-up.
    pub fn refresh<O: ToneOutput>(&self, output: &mut O) {
        self.voices.apply(self.reconciler.sounding(), output);
    }

    /// Handles a single button being pressed or released.
    pub fn handle_edge<O: ToneOutput>(
        &mut self,
        button: usize,
        pressed: bool,
        output: &mut O,
    ) -> NoteChanges {
        if self.stopped {
            return NoteChanges::default();
        }

        let changes = self
            .reconciler
            .on_button_edge(self.transposition.low_note(), button, pressed);
        if changes.is_empty() {
            debug!("Ignoring redundant edge on button {} (pressed: {})", button, pressed);
        }
        self.refresh(output);
        changes
    }

    /// Handles one poll's worth of encoder movement, with `buttons` holding the current level of every button.
    ///
    /// When the keyboard is transposed, every held button is reconciled against its new note. Otherwise, nothing
    /// changes and the voices are left alone.
    pub fn handle_encoders<O: ToneOutput>(
        &mut self,
        octave_delta: i32,
        semitone_delta: i32,
        buttons: ButtonStates,
        output: &mut O,
    ) -> NoteChanges {
        if self.stopped {
            return NoteChanges::default();
        }

        let (low_note, changed) = self.transposition.update(octave_delta, semitone_delta);
        if !changed {
            return NoteChanges::default();
        }

        info!("Leftmost button now plays {}", low_note.to_str());
        let changes = self.reconciler.rescan(low_note, buttons);
        self.refresh(output);
        changes
    }

    /// Releases every note and stops every voice. Run before the device powers down.
    ///
    /// Afterwards, button edges and encoder movement are ignored.
    pub fn teardown<O: ToneOutput>(&mut self, output: &mut O) -> NoteChanges {
        self.stopped = true;
        let changes = self.reconciler.release_all();
        self.voices.silence(output);
        changes
    }

    /// Sends `changes` to the sink as MIDI messages, releases first.
    ///
    /// Failures are logged and counted but otherwise ignored; a missing listener must not interrupt playing.
    /// Returns the number of messages the sink accepted.
    pub fn forward<S: NoteSink>(&mut self, changes: &NoteChanges, sink: &mut S) -> usize {
        let mut sent = 0;
        for event in changes.events() {
            let message = event.to_midi(self.config.midi_channel, self.config.velocity);
            match sink.send(message) {
                Ok(()) => {
                    debug!("Sent {}", event);
                    sent += 1;
                }
                Err(error) => {
                    self.dropped_messages = self.dropped_messages.saturating_add(1);
                    warn!(
                        "Could not send {}: {} ({} dropped so far)",
                        event, error, self.dropped_messages
                    );
                }
            }
        }
        sent
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
