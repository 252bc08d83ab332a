//! Playback context tags
//!
//! A small bitmask classifying the requested mood: a mode axis (standard,
//! combat, threat) in the low two bits and a daytime axis in bit 2. Callers
//! combine one value from each axis when selecting a theme. The render core
//! records the applied tags for external queries but never consumes them.

use std::ops::BitOr;

/// Bitmask classifying the requested playback context.
///
/// Stored as a single byte so the currently applied tags can be published
/// through an atomic for cross-thread queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tags(u8);

impl Tags {
    /// Default gameplay mode (exploration, dialogue).
    pub const STANDARD: Tags = Tags(0);
    /// Active combat.
    pub const COMBAT: Tags = Tags(1);
    /// Enemies nearby but not yet engaged.
    pub const THREAT: Tags = Tags(2);
    /// Daytime variant.
    pub const DAY: Tags = Tags(0 << 2);
    /// Nighttime variant.
    pub const NIGHT: Tags = Tags(1 << 2);

    /// Combine one value from the daytime axis with one from the mode axis.
    pub fn combine(daytime: Tags, mode: Tags) -> Tags {
        daytime | mode
    }

    /// Raw bit pattern, for atomic storage.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reconstruct from a raw bit pattern produced by [`Tags::bits`].
    pub fn from_bits(bits: u8) -> Tags {
        Tags(bits)
    }
}

impl Default for Tags {
    fn default() -> Self {
        Tags::combine(Tags::DAY, Tags::STANDARD)
    }
}

impl BitOr for Tags {
    type Output = Tags;

    fn bitor(self, rhs: Tags) -> Tags {
        Tags(self.0 | rhs.0)
    }
}
