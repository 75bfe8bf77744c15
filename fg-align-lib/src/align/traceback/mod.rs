pub(crate) mod cell;
pub(crate) mod layout;

use log::trace;

use self::{cell::Cell, layout::Layout};
use crate::align::cigar::{Cigar, CigarOp, Kind};

/// The dynamic programming states of the affine-gap recurrence.  The discriminants are the
/// two-bit codes stored in a traceback [`Cell`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub(crate) enum State {
    /// The alignment ends with a query base aligned to a subject base
    Match = 0,
    /// The alignment ends with a subject base aligned to a gap in the query (a `D`)
    GapInQuery = 1,
    /// The alignment ends with a query base aligned to a gap in the subject (an `I`)
    GapInSubject = 2,
    /// A local alignment starts here
    Zero = 3,
}

impl State {
    /// Traceback preference when several predecessors give the same value.
    pub const PREFERENCE: [State; 4] = [
        State::Match,
        State::GapInQuery,
        State::GapInSubject,
        State::Zero,
    ];

    #[inline(always)]
    pub fn from_bits(bits: u8) -> Self {
        Self::PREFERENCE[bits as usize]
    }
}

/// Internal traceback over the cells described by a [`Layout`].
#[derive(Clone, Debug)]
pub(crate) struct Traceback<L: Layout> {
    layout: L,
    matrix: Vec<Cell>,
}

impl<L: Layout> Traceback<L> {
    pub fn new(layout: L) -> Self {
        let matrix = vec![Cell::default(); layout.len()];
        Traceback { layout, matrix }
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, v: Cell) {
        let index = self.layout.index(i, j);
        self.matrix[index] = v;
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> &Cell {
        &self.matrix[self.layout.index(i, j)]
    }

    /// Walks back from `state` at cell `(i, j)` to the start of the alignment, building the CIGAR
    /// front to back as it goes.  `(i, j)` are matrix coordinates, so the alignment ends at query
    /// offset `i - 1` and subject offset `j - 1`.
    pub fn traceback(&self, i: usize, j: usize, state: State) -> Cigar {
        let (mut i, mut j, mut state) = (i, j, state);
        let mut cigar = Cigar::new(i as i32 - 1, j as i32 - 1);
        loop {
            match state {
                State::Zero => break,
                State::Match => {
                    // the origin is the only reachable match cell on the matrix boundary
                    if i == 0 || j == 0 {
                        break;
                    }
                    cigar.push_front(CigarOp::new(1, Kind::Match));
                    state = self.get(i, j).from(State::Match);
                    i -= 1;
                    j -= 1;
                }
                State::GapInQuery => {
                    cigar.push_front(CigarOp::new(1, Kind::Deletion));
                    state = self.get(i, j).from(State::GapInQuery);
                    j -= 1;
                }
                State::GapInSubject => {
                    cigar.push_front(CigarOp::new(1, Kind::Insertion));
                    state = self.get(i, j).from(State::GapInSubject);
                    i -= 1;
                }
            }
        }
        trace!("Traced back to ({i}, {j}): {cigar}");
        cigar
    }
}
