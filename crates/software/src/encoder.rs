//! Converts the absolute counts reported by a quadrature encoder into movement since the previous sample.

/// The last count read from an encoder.
///
/// Hardware counters are 16 bits wide and wrap silently, so counts are compared with wrapping arithmetic: a
/// counter rolling over from `u16::MAX` to `0` reads as one step forward, not sixty-five thousand steps back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderPosition {
    count: u16,
}

impl EncoderPosition {
    /// Begin tracking from the encoder's current count.
    pub fn new(count: u16) -> Self {
        Self { count }
    }

    /// Record a new count, returning the signed distance travelled since the last one.
    pub fn update(&mut self, count: u16) -> i16 {
        let delta = count.wrapping_sub(self.count) as i16;
        self.count = count;
        delta
    }
}
