//! The six-word chant cycled through while fingers are counted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six fixed chant words.
///
/// The chant is purely presentational: players may bet on the word the
/// count lands on, but resolution never consults it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum ChantWord {
    /// "Si"
    Si,
    /// "Kwali"
    Kwali,
    /// "Hindu"
    Hindu,
    /// "Pak"
    Pak,
    /// "Tempe"
    Tempe,
    /// "Reket"
    Reket,
}

impl ChantWord {
    /// All chant words in chant order.
    pub const ALL: [Self; 6] = [
        Self::Si,
        Self::Kwali,
        Self::Hindu,
        Self::Pak,
        Self::Tempe,
        Self::Reket,
    ];

    /// Number of words in the chant cycle.
    pub const COUNT: usize = Self::ALL.len();

    /// The word at a cyclic position in the chant.
    #[must_use]
    pub const fn from_index(index: usize,) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// The word label.
    #[must_use]
    pub const fn label(&self,) -> &'static str {
        match self {
            Self::Si => "Si",
            Self::Kwali => "Kwali",
            Self::Hindu => "Hindu",
            Self::Pak => "Pak",
            Self::Tempe => "Tempe",
            Self::Reket => "Reket",
        }
    }
}

impl Default for ChantWord {
    fn default() -> Self {
        Self::Si
    }
}

impl fmt::Display for ChantWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        f.write_str(self.label(),)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chant_cycles_modulo_six() {
        assert_eq!(ChantWord::from_index(0), ChantWord::Si);
        assert_eq!(ChantWord::from_index(5), ChantWord::Reket);
        assert_eq!(ChantWord::from_index(6), ChantWord::Si);
        assert_eq!(ChantWord::from_index(13), ChantWord::Kwali);
    }
}
