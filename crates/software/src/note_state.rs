mod button_states;
pub use button_states::*;

mod sounding_notes;
pub use sounding_notes::*;

use wmidi::{Channel, MidiMessage, Note, Velocity};

/// The number of momentary buttons on the keyboard.
pub const BUTTON_CNT: usize = 12;

/// Returns the [`Note`] a button plays when the leftmost button plays `low_note`, or `None` for buttons that do not
/// exist or would land above the MIDI range.
pub fn pitch(low_note: Note, button: usize) -> Option<Note> {
    if button >= BUTTON_CNT {
        return None;
    }
    Note::try_from(u8::from(low_note) + button as u8).ok()
}

/// A change in whether a [`Note`] is sounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    /// The note began sounding.
    On(Note),
    /// The note stopped sounding.
    Off(Note),
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            NoteEvent::On(note) => defmt::write!(fmt, "On({})", note.to_str()),
            NoteEvent::Off(note) => defmt::write!(fmt, "Off({})", note.to_str()),
        }
    }
}

impl NoteEvent {
    /// Expresses the event as a MIDI message.
    pub fn to_midi(self, channel: Channel, velocity: Velocity) -> MidiMessage<'static> {
        match self {
            NoteEvent::On(note) => MidiMessage::NoteOn(channel, note, velocity),
            NoteEvent::Off(note) => MidiMessage::NoteOff(channel, note, velocity),
        }
    }
}

/// The difference between the sounding notes before and after a reconciliation.
///
/// A note is never both released and struck by the same reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoteChanges {
    released: SoundingNotes,
    struck: SoundingNotes,
}

impl NoteChanges {
    /// Notes which stopped sounding, in the order they had been struck.
    pub fn released(&self) -> &SoundingNotes {
        &self.released
    }

    /// Notes which began sounding.
    pub fn struck(&self) -> &SoundingNotes {
        &self.struck
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.struck.is_empty()
    }

    /// Returns an [`Iterator`] over the changes as events: every [`NoteEvent::Off`] precedes every [`NoteEvent::On`],
    /// so a receiver never sees more notes held than the keyboard has buttons.
    pub fn events(&self) -> impl Iterator<Item = NoteEvent> + '_ {
        self.released
            .iter()
            .map(NoteEvent::Off)
            .chain(self.struck.iter().map(NoteEvent::On))
    }
}

/// Keeps the set of sounding notes in step with the buttons.
///
/// Notes are reconciled one of two ways. Individual button edges are applied incrementally; an edge which the state
/// already reflects (e.g., a contact bouncing and firing twice) changes nothing. After a transposition every button
/// maps to a new note, so the whole set is recomputed from a snapshot of the buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reconciler {
    sounding: SoundingNotes,
}

impl Reconciler {
    /// Construct a `Reconciler` with nothing sounding.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sounding notes, oldest first.
    pub fn sounding(&self) -> &SoundingNotes {
        &self.sounding
    }

    /// Applies a single button edge, where the leftmost button currently plays `low_note`.
    pub fn on_button_edge(&mut self, low_note: Note, button: usize, pressed: bool) -> NoteChanges {
        let mut changes = NoteChanges::default();
        let Some(note) = pitch(low_note, button) else {
            return changes;
        };

        if pressed {
            if self.sounding.add(note) {
                changes.struck.add(note);
            }
        } else if self.sounding.remove(note) {
            changes.released.add(note);
        }
        changes
    }

    /// Recomputes the sounding notes from every button's level, where the leftmost button now plays `low_note`.
    ///
    /// Notes that no longer belong are released in the order they were struck; notes that newly belong are struck
    /// from left to right. Afterward, the sounding notes are ordered left to right.
    pub fn rescan(&mut self, low_note: Note, buttons: ButtonStates) -> NoteChanges {
        let mut desired = SoundingNotes::new();
        for note in buttons.pressed().filter_map(|button| pitch(low_note, button)) {
            desired.add(note);
        }

        let mut changes = NoteChanges::default();
        for note in self.sounding.iter().filter(|&note| !desired.contains(note)) {
            changes.released.add(note);
        }
        for note in desired.iter().filter(|&note| !self.sounding.contains(note)) {
            changes.struck.add(note);
        }

        self.sounding = desired;
        changes
    }

    /// Releases every sounding note.
    pub fn release_all(&mut self) -> NoteChanges {
        let changes = NoteChanges {
            released: self.sounding,
            struck: SoundingNotes::new(),
        };
        self.sounding.clear();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{vec, vec::Vec};

    fn notes(numbers: &[u8]) -> Vec<Note> {
        numbers.iter().map(|&n| Note::from_u8_lossy(n)).collect()
    }

    fn buttons(held: &[usize]) -> ButtonStates {
        let mut states = ButtonStates::none();
        for &button in held {
            states.set(button, true);
        }
        states
    }

    fn events(changes: &NoteChanges) -> Vec<NoteEvent> {
        changes.events().collect()
    }

    #[test]
    fn pitch_offsets_from_low_note() {
        assert_eq!(Some(Note::C2), pitch(Note::C2, 0), "Expected left but got right");
        assert_eq!(Some(Note::B2), pitch(Note::C2, 11), "Expected left but got right");
        assert_eq!(None, pitch(Note::C2, BUTTON_CNT), "Expected left but got right");
        assert_eq!(None, pitch(Note::G9, 1), "Expected left but got right");
    }

    #[test]
    fn press_strikes_note() {
        let mut reconciler = Reconciler::new();
        let changes = reconciler.on_button_edge(Note::C2, 2, true);

        assert_eq!(vec![NoteEvent::On(Note::D2)], events(&changes));
        assert_eq!(notes(&[38]), reconciler.sounding().iter().collect::<Vec<_>>());
    }

    #[test]
    fn release_releases_note() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 2, true);
        let changes = reconciler.on_button_edge(Note::C2, 2, false);

        assert_eq!(vec![NoteEvent::Off(Note::D2)], events(&changes));
        assert!(reconciler.sounding().is_empty());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 1, true);
        let before = reconciler;

        let changes = reconciler.on_button_edge(Note::C2, 0, false);

        assert!(changes.is_empty(), "False edge should not emit anything");
        assert_eq!(before, reconciler, "Expected left but got right");
    }

    #[test]
    fn repeated_press_is_ignored() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 5, true);
        let changes = reconciler.on_button_edge(Note::C2, 5, true);

        assert!(changes.is_empty(), "Duplicate edge should not emit anything");
        assert_eq!(1, reconciler.sounding().len(), "Expected left but got right");
    }

    #[test]
    fn nonexistent_button_is_ignored() {
        let mut reconciler = Reconciler::new();
        let changes = reconciler.on_button_edge(Note::C2, BUTTON_CNT, true);

        assert!(changes.is_empty());
        assert!(reconciler.sounding().is_empty());
    }

    #[test]
    fn edges_never_duplicate_notes() {
        // a fixed pseudo-random walk over presses, releases and bounces
        let mut reconciler = Reconciler::new();
        let mut held = ButtonStates::none();
        let mut seed: u32 = 0x2090;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let button = (seed >> 16) as usize % BUTTON_CNT;
            let pressed = (seed >> 8) & 1 == 1;
            reconciler.on_button_edge(Note::C2, button, pressed);
            held.set(button, pressed);

            let sounding = reconciler.sounding();
            assert_eq!(held.count(), sounding.len(), "Expected left but got right");
            let mut seen = ButtonStates::none();
            for note in sounding.iter() {
                let button = (u8::from(note) - u8::from(Note::C2)) as usize;
                assert!(!seen.is_pressed(button), "Duplicate note {:?}", note);
                assert!(held.is_pressed(button), "Stale note {:?}", note);
                seen.set(button, true);
            }
        }
    }

    #[test]
    fn notes_keep_order_of_first_press() {
        let mut reconciler = Reconciler::new();
        for button in [3, 0, 7] {
            reconciler.on_button_edge(Note::C2, button, true);
        }

        assert_eq!(
            notes(&[39, 36, 43]),
            reconciler.sounding().iter().collect::<Vec<_>>(),
            "Expected left but got right"
        );
    }

    #[test]
    fn press_four_buttons() {
        let mut reconciler = Reconciler::new();
        for button in 0..4 {
            reconciler.on_button_edge(Note::C2, button, true);
        }

        assert_eq!(
            notes(&[36, 37, 38, 39]),
            reconciler.sounding().iter().collect::<Vec<_>>(),
            "Expected left but got right"
        );
    }

    #[test]
    fn octave_rescan_releases_then_strikes() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 0, true);
        reconciler.on_button_edge(Note::C2, 1, true);

        let changes = reconciler.rescan(Note::C1, buttons(&[0, 1]));

        assert_eq!(
            vec![
                NoteEvent::Off(Note::C2),
                NoteEvent::Off(Note::Db2),
                NoteEvent::On(Note::C1),
                NoteEvent::On(Note::Db1),
            ],
            events(&changes),
            "Expected left but got right"
        );
        assert_eq!(
            notes(&[24, 25]),
            reconciler.sounding().iter().collect::<Vec<_>>(),
            "Expected left but got right"
        );
    }

    #[test]
    fn rescan_keeps_notes_that_still_belong() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 0, true);
        reconciler.on_button_edge(Note::C2, 4, true);

        // a semitone up: button 4 was E2 and is now F2, but button 3 (newly held) plays E2
        let changes = reconciler.rescan(Note::Db2, buttons(&[3, 4]));

        assert_eq!(
            vec![NoteEvent::Off(Note::C2), NoteEvent::On(Note::F2)],
            events(&changes),
            "E2 should neither be released nor struck again"
        );
        assert_eq!(
            notes(&[40, 41]),
            reconciler.sounding().iter().collect::<Vec<_>>(),
            "Expected left but got right"
        );
    }

    #[test]
    fn rescan_without_transposition_changes_nothing() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 2, true);
        reconciler.on_button_edge(Note::C2, 9, true);

        let changes = reconciler.rescan(Note::C2, buttons(&[2, 9]));

        assert!(changes.is_empty(), "Nothing should be resent");
    }

    #[test]
    fn rescan_diff_is_exact_for_every_button_combination() {
        let low_notes = [Note::C2, Note::C1, Note::Db2, Note::CMinus1, Note::G8];
        for combination in 0..(1_u16 << BUTTON_CNT) {
            let mut reconciler = Reconciler::new();
            // begin from an unrelated chord held under C2
            for button in [1, 5, 6] {
                reconciler.on_button_edge(Note::C2, button, true);
            }

            let low_note = low_notes[combination as usize % low_notes.len()];
            let mut held = ButtonStates::none();
            for button in 0..BUTTON_CNT {
                held.set(button, combination & (1 << button) != 0);
            }

            let old = *reconciler.sounding();
            let changes = reconciler.rescan(low_note, held);
            let new = *reconciler.sounding();

            let expected: Vec<Note> = held
                .pressed()
                .filter_map(|button| pitch(low_note, button))
                .collect();
            assert_eq!(expected, new.iter().collect::<Vec<_>>(), "Expected left but got right");

            let released: Vec<Note> = old.iter().filter(|&n| !new.contains(n)).collect();
            let struck: Vec<Note> = new.iter().filter(|&n| !old.contains(n)).collect();
            assert_eq!(released, changes.released().iter().collect::<Vec<_>>());
            assert_eq!(struck, changes.struck().iter().collect::<Vec<_>>());
            assert!(
                changes.released().iter().all(|n| !changes.struck().contains(n)),
                "No note may be both released and struck"
            );
        }
    }

    #[test]
    fn release_all() {
        let mut reconciler = Reconciler::new();
        reconciler.on_button_edge(Note::C2, 4, true);
        reconciler.on_button_edge(Note::C2, 2, true);

        let changes = reconciler.release_all();

        assert_eq!(
            vec![NoteEvent::Off(Note::E2), NoteEvent::Off(Note::D2)],
            events(&changes),
            "Expected left but got right"
        );
        assert!(reconciler.sounding().is_empty());
    }

    #[test]
    fn event_to_midi() {
        let velocity = wmidi::U7::from_u8_lossy(1);
        assert_eq!(
            MidiMessage::NoteOn(Channel::Ch1, Note::A4, velocity),
            NoteEvent::On(Note::A4).to_midi(Channel::Ch1, velocity),
            "Expected left but got right"
        );
        assert_eq!(
            MidiMessage::NoteOff(Channel::Ch2, Note::A4, velocity),
            NoteEvent::Off(Note::A4).to_midi(Channel::Ch2, velocity),
            "Expected left but got right"
        );
    }
}
