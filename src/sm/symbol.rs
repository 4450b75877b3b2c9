//! Characters of the note grid.

/// A cell of a note grid row.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteSymbol {
    /// `0`, nothing on this lane.
    Empty,
    /// `1`, a plain tap.
    Tap,
    /// `2`, the head of a hold.
    HoldStart,
    /// `3`, the tail of a hold or roll.
    HoldEnd,
    /// `4`, the head of a roll.
    RollStart,
    /// `M`, a mine.
    Mine,
    /// `L`, a lift.
    Lift,
    /// `F`, a fake note.
    Fake,
    /// `K`, an automatic keysound.
    KeySound,
    /// Any other character.
    Other(char),
}

impl NoteSymbol {
    /// Whether the cell produces no event at all.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether the note event generator turns this symbol into a tap note.
    #[must_use]
    pub const fn is_convertible(self) -> bool {
        matches!(self, Self::Tap | Self::HoldStart | Self::HoldEnd)
    }

    /// The character as written in the grid.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Tap => '1',
            Self::HoldStart => '2',
            Self::HoldEnd => '3',
            Self::RollStart => '4',
            Self::Mine => 'M',
            Self::Lift => 'L',
            Self::Fake => 'F',
            Self::KeySound => 'K',
            Self::Other(c) => c,
        }
    }
}

impl From<char> for NoteSymbol {
    fn from(value: char) -> Self {
        match value {
            '0' => Self::Empty,
            '1' => Self::Tap,
            '2' => Self::HoldStart,
            '3' => Self::HoldEnd,
            '4' => Self::RollStart,
            'M' => Self::Mine,
            'L' => Self::Lift,
            'F' => Self::Fake,
            'K' => Self::KeySound,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for NoteSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_mapping() {
        for c in ['0', '1', '2', '3', '4', 'M', 'L', 'F', 'K', 'x'] {
            assert_eq!(NoteSymbol::from(c).as_char(), c);
        }
        assert_eq!(NoteSymbol::from('m'), NoteSymbol::Other('m'));
        assert!(NoteSymbol::from('0').is_empty());
        assert!(NoteSymbol::from('2').is_convertible());
        assert!(!NoteSymbol::from('4').is_convertible());
    }
}
