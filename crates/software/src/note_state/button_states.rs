//! Provides [`ButtonStates`], a snapshot of every button's level.

use super::BUTTON_CNT;

const _: () = assert!(BUTTON_CNT <= u16::BITS as usize);

/// One bit per button, set while the button is held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonStates(u16);

impl ButtonStates {
    /// A snapshot in which no button is held.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Returns `true` if the button is held. Buttons beyond [`BUTTON_CNT`] are never held.
    pub fn is_pressed(&self, button: usize) -> bool {
        button < BUTTON_CNT && self.0 & (1 << button) != 0
    }

    /// Record the level of one button; out-of-range buttons are ignored.
    pub fn set(&mut self, button: usize, pressed: bool) {
        if button >= BUTTON_CNT {
            return;
        }
        if pressed {
            self.0 |= 1 << button;
        } else {
            self.0 &= !(1 << button);
        }
    }

    /// Returns an [`Iterator`] over the indices of held buttons, leftmost first.
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BUTTON_CNT).filter(|&button| self.is_pressed(button))
    }

    /// The number of held buttons.
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }
}

impl From<[bool; BUTTON_CNT]> for ButtonStates {
    fn from(levels: [bool; BUTTON_CNT]) -> Self {
        let mut states = Self::none();
        for (button, pressed) in levels.into_iter().enumerate() {
            states.set(button, pressed);
        }
        states
    }
}
