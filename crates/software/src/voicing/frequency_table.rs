use measurements::Frequency;
use wmidi::Note;

/// The number of notes with a tabulated frequency, i.e., every MIDI note except G9.
pub const TABULATED_NOTE_CNT: usize = 127;

/// Equal-tempered frequencies for MIDI notes, computed once and never modified.
///
/// Values are rounded to hundredths of a hertz, well beyond what a PWM timer can reproduce.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
    hertz: [f64; TABULATED_NOTE_CNT],
}

impl FrequencyTable {
    /// Tabulates frequencies relative to `reference`, the pitch of A4.
    pub fn equal_tempered(reference: Frequency) -> Self {
        // A4 is 69, so C-1 sits five octaves and nine half steps below it
        let lowest_a = reference.as_hertz() / 32.0;
        Self {
            hertz: core::array::from_fn(|note| {
                let hertz = lowest_a * libm::pow(2.0, (note as f64 - 9.0) / 12.0);
                libm::round(hertz * 100.0) / 100.0
            }),
        }
    }

    /// Returns the frequency of a [`Note`].
    ///
    /// # Panics
    ///
    /// Panics for G9, the one MIDI note without a tabulated frequency. The transposition range keeps every button
    /// below it, so reaching this is a bug.
    pub fn frequency(&self, note: Note) -> Frequency {
        match self.hertz.get(usize::from(u8::from(note))) {
            Some(&hertz) => Frequency::from_hertz(hertz),
            None => panic!("No frequency is tabulated for {}", note.to_str()),
        }
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::equal_tempered(Frequency::from_hertz(440.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_pitch() {
        let table = FrequencyTable::default();
        assert_eq!(440.0, table.frequency(Note::A4).as_hertz(), "Expected left but got right");
        assert_eq!(220.0, table.frequency(Note::A3).as_hertz(), "Expected left but got right");
    }

    #[test]
    fn values_are_rounded_to_hundredths() {
        let table = FrequencyTable::default();
        assert_eq!(8.18, table.frequency(Note::CMinus1).as_hertz(), "Expected left but got right");
        assert_eq!(65.41, table.frequency(Note::C2).as_hertz(), "Expected left but got right");
        assert_eq!(261.63, table.frequency(Note::C4).as_hertz(), "Expected left but got right");
    }

    #[test]
    fn highest_tabulated_note() {
        let table = FrequencyTable::default();
        assert_eq!(11839.82, table.frequency(Note::Gb9).as_hertz(), "Expected left but got right");
    }

    #[test]
    fn alternate_reference() {
        let table = FrequencyTable::equal_tempered(Frequency::from_hertz(432.0));
        assert_eq!(432.0, table.frequency(Note::A4).as_hertz(), "Expected left but got right");
    }

    #[test]
    #[should_panic]
    fn g9_is_not_tabulated() {
        FrequencyTable::default().frequency(Note::G9);
    }
}
