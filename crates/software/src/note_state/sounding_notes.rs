//! Provides a struct [`SoundingNotes`] for tracking the notes an instrument is currently playing. "Sounding" is meant
//! logically: every note here has been reported to the MIDI sink, whether or not a buzzer is free to voice it.

use super::BUTTON_CNT;
use tinyvec::ArrayVec;
use wmidi::{Note, U7};

/// An insertion-ordered set of [`Note`]s.
///
/// Order matters because voices are assigned positionally, so the sequence is kept in a fixed-capacity vector.
/// Membership is answered by a companion bitmask with one bit per MIDI note number rather than by scanning the vector.
///
/// Internally, this struct uses the [`U7`] type because [`tinyvec`] requires that `Items` implement [`Default`].
/// However, [`U7`] can be a bit unwieldy, so public interfaces will deal with the related [`Note`] type instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundingNotes<const N: usize = BUTTON_CNT> {
    /// [`U7`] representations of the sounding notes, oldest first
    data: ArrayVec<[U7; N]>,
    /// bit `n` is set if and only if note number `n` is in `data`
    presence: u128,
}

impl Default for SoundingNotes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for SoundingNotes<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "SoundingNotes {{ ");
        defmt::write!(fmt, "data: [");
        for (i, &note) in self.data.iter().enumerate() {
            if i == 0 {
                defmt::write!(fmt, " ");
            } else {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{} ({})", Note::from(note).to_str(), u8::from(note));
        }
        defmt::write!(fmt, " ]");
        defmt::write!(fmt, " }}");
    }
}

impl<const N: usize> SoundingNotes<N> {
    /// Construct an empty `SoundingNotes`.
    pub fn new() -> Self {
        Self {
            data: ArrayVec::new(),
            presence: 0,
        }
    }

    fn mask(note: Note) -> u128 {
        1 << u8::from(note)
    }

    /// Returns `true` if the [`Note`] is sounding.
    pub fn contains(&self, note: Note) -> bool {
        self.presence & Self::mask(note) != 0
    }

    /// Append a [`Note`]. Returns `false`, leaving the set untouched, if the note is already present or there is no
    /// room for it.
    pub fn add(&mut self, note: Note) -> bool {
        if self.contains(note) || self.data.len() == self.data.capacity() {
            return false;
        }
        self.data.push(U7::from_u8_lossy(note as u8));
        self.presence |= Self::mask(note);
        true
    }

    /// Remove a [`Note`], preserving the order of those remaining. Returns `false` if the note was not present.
    pub fn remove(&mut self, note: Note) -> bool {
        if !self.contains(note) {
            return false;
        }
        let u7 = U7::from_u8_lossy(note as u8);
        self.data.retain(|&n| n != u7);
        self.presence &= !Self::mask(note);
        true
    }

    /// Remove every [`Note`].
    pub fn clear(&mut self) {
        self.data.clear();
        self.presence = 0;
    }

    /// Returns the `index`th oldest [`Note`], if there are that many.
    pub fn get(&self, index: usize) -> Option<Note> {
        self.data.get(index).map(|&n| Note::from(n))
    }

    /// The number of sounding [`Note`]s.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determine if any [`Note`]s are sounding.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an [`Iterator`] over the sounding [`Note`]s.
    ///
    /// Order is preserved; e.g., the first performed `Note` can be accessed via the first call to `.next()`, and the
    /// last performed `Note` is accessible via `.last()`.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.data.iter().map(|&n| Note::from(n))
    }
}
