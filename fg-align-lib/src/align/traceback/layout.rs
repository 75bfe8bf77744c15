use crate::align::{
    error::{AlignError, Result},
    Range,
};

/// Describes which cells of the `(m + 1) x (n + 1)` dynamic programming matrix are materialized
/// and where each lives in flat storage.  Row `i` covers query prefix `query[..i]` and column `j`
/// covers subject prefix `subject[..j]`.
pub(crate) trait Layout {
    /// The inclusive column span `(lo, hi)` of row `i`.
    fn span(&self, i: usize) -> (usize, usize);

    /// The storage offset of cell `(i, j)`, which must lie within the span of row `i`.
    fn index(&self, i: usize, j: usize) -> usize;

    /// The number of stored cells.
    fn len(&self) -> usize;

    /// The number of rows, `m + 1`.
    fn rows(&self) -> usize;

    #[inline(always)]
    fn contains(&self, i: usize, j: usize) -> bool {
        if i >= self.rows() {
            return false;
        }
        let (lo, hi) = self.span(i);
        lo <= j && j <= hi
    }
}

/// Every cell of the matrix.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Full {
    rows: usize,
    cols: usize,
}

impl Full {
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            rows: m + 1,
            cols: n + 1,
        }
    }
}

impl Layout for Full {
    #[inline(always)]
    fn span(&self, _i: usize) -> (usize, usize) {
        (0, self.cols - 1)
    }

    #[inline(always)]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows);
        debug_assert!(j < self.cols);
        i * self.cols + j
    }

    fn len(&self) -> usize {
        self.rows * self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

/// Cells whose diagonal offset `j - i` lies in `[-band, band]`.  Storage is addressed by row and
/// offset within the band, so each row holds exactly `2 * band + 1` cells.  Rows past
/// `n + band` have an empty span and are not stored.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedBand {
    rows: usize,
    n: usize,
    band: usize,
}

impl FixedBand {
    /// A band wider than both sequences covers the whole matrix, so it is narrowed to that.
    pub fn new(m: usize, n: usize, band: usize) -> Self {
        Self {
            rows: m + 1,
            n,
            band: band.min(m.max(n)),
        }
    }

    #[inline(always)]
    fn width(&self) -> usize {
        2 * self.band + 1
    }
}

impl Layout for FixedBand {
    #[inline(always)]
    fn span(&self, i: usize) -> (usize, usize) {
        (i.saturating_sub(self.band), (i + self.band).min(self.n))
    }

    #[inline(always)]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(self.contains(i, j), "({i}, {j}) is outside the band");
        i * self.width() + (j + self.band - i)
    }

    fn len(&self) -> usize {
        self.rows.min(self.n + self.band + 1) * self.width()
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

/// Cells within a caller-supplied subject interval per query position.  Row zero holds only the
/// origin; every other row holds just its own interval.
#[derive(Debug, Clone)]
pub(crate) struct VariableBand {
    spans: Vec<(usize, usize)>,
    offsets: Vec<usize>,
    len: usize,
}

impl VariableBand {
    /// Builds the layout from inclusive, zero-based subject limits, one per query position.
    /// Intervals that overhang the subject are clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::BandOutOfRange`] if an interval is inverted or does not intersect
    /// `[0, n)`, and [`AlignError::InvalidInput`] if the number of limits is not `m`.
    pub fn new(m: usize, n: usize, subject_limits: &[Range]) -> Result<Self> {
        if subject_limits.len() != m {
            return Err(AlignError::InvalidInput(format!(
                "expected {m} subject limits (one per query position), found {}",
                subject_limits.len()
            )));
        }
        let mut spans = Vec::with_capacity(m + 1);
        let mut offsets = Vec::with_capacity(m + 1);
        spans.push((0, 0));
        offsets.push(0);
        let mut len = 1;
        for (query_pos, &(from, to)) in subject_limits.iter().enumerate() {
            if from > to || to < 0 || i64::from(from) >= n as i64 {
                return Err(AlignError::BandOutOfRange {
                    query_pos,
                    from,
                    to,
                    subject_len: n,
                });
            }
            // shift to one-based matrix columns
            let lo = from.max(0) as usize + 1;
            let hi = (to as usize).min(n - 1) + 1;
            spans.push((lo, hi));
            offsets.push(len);
            len += hi - lo + 1;
        }
        Ok(Self {
            spans,
            offsets,
            len,
        })
    }
}

impl Layout for VariableBand {
    #[inline(always)]
    fn span(&self, i: usize) -> (usize, usize) {
        self.spans[i]
    }

    #[inline(always)]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(self.contains(i, j), "({i}, {j}) is outside the band");
        self.offsets[i] + (j - self.spans[i].0)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn rows(&self) -> usize {
        self.spans.len()
    }
}
