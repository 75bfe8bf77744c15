use std::mem;

use log::trace;

use crate::align::{
    cigar::Cigar,
    score::{max_first, Score, NEG_INFINITY},
    scoring::SubstitutionMatrix,
    traceback::{cell::Cell, layout::Layout, State, Traceback},
};

/// Which ends of the alignment are forced to the ends of both sequences.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Ends {
    /// Start at the first base of both sequences (no local restarts)
    pub pin_left: bool,
    /// End at the last base of both sequences
    pub pin_right: bool,
}

impl Ends {
    pub const LOCAL: Ends = Ends {
        pin_left: false,
        pin_right: false,
    };
    pub const GLOBAL: Ends = Ends {
        pin_left: true,
        pin_right: true,
    };
}

/// The best score of each state ending at one cell.
#[derive(Copy, Clone, Debug)]
struct Scores {
    matched: Score,
    gap_in_query: Score,
    gap_in_subject: Score,
}

impl Scores {
    const NONE: Scores = Scores {
        matched: NEG_INFINITY,
        gap_in_query: NEG_INFINITY,
        gap_in_subject: NEG_INFINITY,
    };
}

/// The scores of the stored cells of one matrix row, starting at column `lo`.
#[derive(Debug, Default)]
struct Row {
    lo: usize,
    values: Vec<Scores>,
}

impl Row {
    fn reset(&mut self, lo: usize) {
        self.lo = lo;
        self.values.clear();
    }

    /// The scores at column `j`, or disallowed if the cell is not stored.
    #[inline(always)]
    fn get(&self, j: usize) -> Scores {
        if j < self.lo {
            return Scores::NONE;
        }
        self.values.get(j - self.lo).copied().unwrap_or(Scores::NONE)
    }
}

/// Fills the cells of `layout` with the three-state affine-gap recurrence and traces back the
/// optimal alignment, returning it along with its score.
///
/// `Match` cells take the substitution score plus the best of the three states on the diagonal
/// (or a fresh start, unless the left end is pinned).  Gaps open from `Match` and extend from
/// themselves: `GapInQuery` moves along the subject (left), `GapInSubject` along the query (up).
/// Every step that consumes a query base adds one to the tie-breaker, so equal scores resolve
/// to the alignment covering more of the query.
///
/// With `pin_right` the optimum is read from cell `(m, n)`, which the layout must store;
/// otherwise it is the first best `Match` cell in row-major order, or the empty alignment at
/// the origin if no cell beats it on score and then query coverage.
pub(crate) fn align<L: Layout>(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    matrix: &SubstitutionMatrix,
    layout: L,
    ends: Ends,
) -> (Cigar, i32) {
    let (m, n) = (query.len(), subject.len());
    let open = Score::new(-gap_open, 0);
    let extend = Score::new(-gap_extend, 0);
    let consumes_query = Score::new(0, 1);
    let restart = if ends.pin_left {
        NEG_INFINITY
    } else {
        Score::ZERO
    };

    let mut traceback = Traceback::new(layout);
    let mut prev = Row::default();
    let mut curr = Row::default();
    let mut best = (Score::ZERO, 0, 0);

    for i in 0..=m {
        let (lo, hi) = traceback.layout().span(i);
        curr.reset(lo);
        for j in lo..=hi {
            let mut cell = Cell::default();

            let matched = if i == 0 || j == 0 {
                if i == 0 && j == 0 {
                    Score::ZERO
                } else {
                    NEG_INFINITY
                }
            } else {
                let diag = prev.get(j - 1);
                let (index, from) = max_first([
                    diag.matched,
                    diag.gap_in_query,
                    diag.gap_in_subject,
                    restart,
                ]);
                cell.set(State::Match, State::PREFERENCE[index]);
                let substitution = Score::new(matrix.score(query[i - 1], subject[j - 1]), 1);
                (from + substitution).max(NEG_INFINITY)
            };

            let left = if j > lo {
                curr.values[j - 1 - lo]
            } else {
                Scores::NONE
            };
            let (index, gap_in_query) =
                max_first([left.matched + open, left.gap_in_query + extend]);
            cell.set(State::GapInQuery, [State::Match, State::GapInQuery][index]);

            let up = prev.get(j);
            let (index, gap_in_subject) =
                max_first([up.matched + open, up.gap_in_subject + extend]);
            cell.set(
                State::GapInSubject,
                [State::Match, State::GapInSubject][index],
            );

            curr.values.push(Scores {
                matched,
                gap_in_query: gap_in_query.max(NEG_INFINITY),
                gap_in_subject: (gap_in_subject + consumes_query).max(NEG_INFINITY),
            });
            traceback.set(i, j, cell);

            if matched > best.0 {
                best = (matched, i, j);
            }
        }
        mem::swap(&mut prev, &mut curr);
    }

    // `prev` now holds the last row
    let (state, score, i, j) = if ends.pin_right {
        debug_assert!(traceback.layout().contains(m, n), "({m}, {n}) is not stored");
        let last = prev.get(n);
        let (index, score) = max_first([last.matched, last.gap_in_query, last.gap_in_subject]);
        (State::PREFERENCE[index], score, m, n)
    } else {
        (State::Match, best.0, best.1, best.2)
    };
    trace!(
        "Optimum {state:?} at ({i}, {j}) with score {} covering {} query bases",
        score.score(),
        score.tiebreaker()
    );
    (traceback.traceback(i, j, state), score.score())
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::{align, Ends};
    use crate::align::{
        scoring::SubstitutionMatrix,
        traceback::layout::{FixedBand, Full},
    };

    fn run(query: &str, subject: &str, ends: Ends) -> (String, i32) {
        let matrix = SubstitutionMatrix::dna(1, -3);
        let (q, s) = (query.as_bytes(), subject.as_bytes());
        let (cigar, score) = align(q, s, 5, 2, &matrix, Full::new(q.len(), s.len()), ends);
        (cigar.to_string(), score)
    }

    #[rstest]
    #[case("ACGT", "ACGT", "4M", 4)]
    #[case("AACCGGTT", "AACCGTTT", "8M", 4)]
    #[case("AACCGTT", "AACCGGTT", "4M1D3M", 2)]
    #[case("AACCGGTT", "AACCGTT", "4M1I3M", 2)]
    #[case("ATTTTTTTTTTT", "TTTTTTTTTTT", "1I11M", 6)]
    #[case("A", "C", "1M", -3)]
    #[case("A", "CCC", "2D1M", -5 - 2 - 3)]
    fn test_global(
        #[case] query: &str,
        #[case] subject: &str,
        #[case] cigar: &str,
        #[case] score: i32,
    ) {
        assert_eq!(run(query, subject, Ends::GLOBAL), (cigar.to_string(), score));
    }

    #[rstest]
    fn test_local_restarts() {
        assert_eq!(
            run("GGGGACGTACGTGGGG", "CCACGTACGTCC", Ends::LOCAL),
            ("8M".to_string(), 8)
        );
        assert_eq!(run("AAAA", "CCCC", Ends::LOCAL), (String::new(), 0));
    }

    #[rstest]
    #[case(false, false, "4M", 4)]
    #[case(true, false, "4M", 4)]
    #[case(false, true, "5M", 1)]
    #[case(true, true, "5M", 1)]
    fn test_pinned_ends(
        #[case] pin_left: bool,
        #[case] pin_right: bool,
        #[case] cigar: &str,
        #[case] score: i32,
    ) {
        let ends = Ends {
            pin_left,
            pin_right,
        };
        assert_eq!(run("ACGTA", "ACGTC", ends), (cigar.to_string(), score));
    }

    #[rstest]
    fn test_fixed_band_restricts_diagonals() {
        let matrix = SubstitutionMatrix::dna(1, -3);
        let (q, s) = (b"ACGTACGTAC", b"ACGTTACGTAC");
        let (cigar, score) = align(q, s, 5, 2, &matrix, FixedBand::new(10, 11, 0), Ends::LOCAL);
        assert_eq!((cigar.to_string(), score), ("4M".to_string(), 4));
        assert_eq!(cigar.query_range(), (0, 3));
        let (cigar, score) = align(q, s, 5, 2, &matrix, FixedBand::new(10, 11, 1), Ends::LOCAL);
        assert_eq!((cigar.to_string(), score), ("7M".to_string(), 7));
        assert_eq!(cigar.query_range(), (3, 9));
        assert_eq!(cigar.subject_range(), (4, 10));
    }
}
