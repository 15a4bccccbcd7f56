use num_derive::{FromPrimitive, ToPrimitive};

/// Determines how the transposition encoders are read when both have moved since the last poll.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderPolicy {
    /// Both encoders are honored within the same poll: an octave shift and a half step shift may combine.
    #[default]
    Independent,
    /// Only the first applicable shift is honored, checked in the order octave down, octave up, half step down,
    /// half step up. A shift that would leave the playable range does not count as applicable.
    FirstMatch,
}
impl super::CycleConfig for EncoderPolicy {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CycleConfig;

    #[test]
    fn cycles_through_both_policies() {
        assert_eq!(EncoderPolicy::FirstMatch, EncoderPolicy::Independent.cycle());
        assert_eq!(EncoderPolicy::Independent, EncoderPolicy::FirstMatch.cycle());
    }
}
