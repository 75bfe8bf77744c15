use super::State;

/// Packed representation of one cell of an affine-gap traceback matrix.
///
/// For each of the three DP states that can end at a cell, the cell remembers the state of the
/// predecessor cell that produced the winning value:
/// - bits 0-1 are for the `Match` state (predecessor is any [`State`], `Zero` for a local restart)
/// - bits 2-3 are for the `GapInQuery` state (predecessor is `Match` or `GapInQuery`)
/// - bits 4-5 are for the `GapInSubject` state (predecessor is `Match` or `GapInSubject`)
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct Cell {
    tb: u8,
}

// Traceback bit positions (LSB)
const TB_MATCH_POS: u8 = 0; // Meaning bits 0,1 corresponds to Match and so on
const TB_GAP_IN_QUERY_POS: u8 = 2;
const TB_GAP_IN_SUBJECT_POS: u8 = 4;
const TB_MASK: u8 = 0b11;

impl Cell {
    /// Sets 2 bits [pos, pos+2) with the 2 LSBs of value
    #[inline(always)]
    fn set_tb(&mut self, pos: u8, value: u8) {
        debug_assert!(value <= TB_MASK, "Expected a two-bit traceback value");
        let bits: u8 = TB_MASK << pos;
        self.tb = (self.tb & !bits) // First clear the bits
              | (value << pos) // And set the bits
    }

    // Gets 2 bits [pos, pos+2) of v
    #[inline(always)]
    fn get_tb(self, pos: u8) -> u8 {
        (self.tb >> pos) & TB_MASK
    }

    #[inline(always)]
    fn pos(state: State) -> u8 {
        match state {
            State::Match => TB_MATCH_POS,
            State::GapInQuery => TB_GAP_IN_QUERY_POS,
            State::GapInSubject => TB_GAP_IN_SUBJECT_POS,
            State::Zero => unreachable!("the zero state has no predecessor"),
        }
    }

    /// Records that `state` at this cell was reached from `from` in the predecessor cell.
    #[inline(always)]
    pub fn set(&mut self, state: State, from: State) {
        debug_assert!(
            matches!(
                (state, from),
                (State::Match, _)
                    | (State::GapInQuery, State::Match | State::GapInQuery)
                    | (State::GapInSubject, State::Match | State::GapInSubject)
            ),
            "{state:?} cannot follow {from:?}"
        );
        self.set_tb(Self::pos(state), from as u8);
    }

    /// The predecessor state of `state` at this cell.
    #[inline(always)]
    pub fn from(self, state: State) -> State {
        State::from_bits(self.get_tb(Self::pos(state)))
    }
}
