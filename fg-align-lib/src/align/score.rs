use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign},
};

use super::{
    aligners::constants::MIN_SCORE,
    error::{AlignError, Result},
};

/// An alignment score packed together with a secondary tie-breaker.
///
/// The primary score occupies the upper 32 bits and the tie-breaker the lower 32 bits of a
/// single `i64`, so that one integer comparison orders first by score and then, for equal
/// scores, by tie-breaker.  The aligners use query coverage as the tie-breaker, which makes
/// them prefer the alignment covering more of the query when scores are equal.
///
/// The tie-breaker must be non-negative, otherwise it borrows from the score bits.  This is a
/// precondition of [`Score::new`] and is only checked in debug builds since the value is built
/// for every cell of the dynamic programming matrix.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Score(i64);

/// The value of a disallowed dynamic programming cell.  Real alignment scores never reach it,
/// and sums involving it are clamped back up to it.
pub(crate) const NEG_INFINITY: Score = Score((MIN_SCORE as i64) << 32);

impl Score {
    /// The score of an empty alignment.
    pub const ZERO: Score = Score(0);

    #[inline(always)]
    pub fn new(score: i32, tiebreaker: i32) -> Self {
        debug_assert!(tiebreaker >= 0, "tiebreaker must be non-negative: {tiebreaker}");
        Score((i64::from(score) << 32) + i64::from(tiebreaker))
    }

    /// The primary alignment score.
    #[inline(always)]
    pub fn score(self) -> i32 {
        (self.0 >> 32) as i32
    }

    /// The secondary tie-breaker.
    #[inline(always)]
    pub fn tiebreaker(self) -> i32 {
        (self.0 & 0xFFFF_FFFF) as i32
    }

    /// Adds two scores, failing if either component leaves its 32-bit range.
    pub fn checked_add(self, other: Score) -> Result<Score> {
        let score = i64::from(self.score()) + i64::from(other.score());
        let tiebreaker = i64::from(self.tiebreaker()) + i64::from(other.tiebreaker());
        if score < i64::from(i32::MIN) || score > i64::from(i32::MAX) {
            return Err(AlignError::ScoreOverflow(format!(
                "score {score} does not fit in 32 bits"
            )));
        }
        if tiebreaker > i64::from(i32::MAX) {
            return Err(AlignError::ScoreOverflow(format!(
                "tiebreaker {tiebreaker} does not fit in 31 bits"
            )));
        }
        Ok(Score::new(score as i32, tiebreaker as i32))
    }
}

impl Add for Score {
    type Output = Score;

    #[inline(always)]
    fn add(self, other: Score) -> Score {
        Score(self.0 + other.0)
    }
}

impl AddAssign for Score {
    #[inline(always)]
    fn add_assign(&mut self, other: Score) {
        self.0 += other.0;
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({}, {})", self.score(), self.tiebreaker())
    }
}

/// Returns the greater of the candidates, keeping the earliest on ties.  The index of the winner
/// is returned alongside its value.
#[inline(always)]
pub(crate) fn max_first<const N: usize>(candidates: [Score; N]) -> (usize, Score) {
    let mut best = (0, candidates[0]);
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.cmp(&best.1) == Ordering::Greater {
            best = (index, *candidate);
        }
    }
    best
}
