pub(crate) mod affine;
pub mod constants;

use derive_builder::Builder;
use derive_getters::Getters;
use log::debug;

use self::{
    affine::Ends,
    constants::{DEFAULT_GAP_EXTEND, DEFAULT_GAP_OPEN, MIN_SCORE},
};
use crate::align::{
    cigar::Cigar,
    error::{AlignError, Result},
    scoring::SubstitutionMatrix,
    traceback::layout::{FixedBand, Full, Layout, VariableBand},
    Range,
};

/// Gap penalties and substitution scores shared by every alignment an [`Aligner`] computes.
/// Gap penalties are non-negative costs: a gap of `len` columns costs
/// `gap_open + gap_extend * (len - 1)`.
#[derive(Clone, Debug, Builder, Getters)]
#[builder(
    name = "Builder",
    build_fn(name = "build_options", validate = "Self::validate")
)]
pub struct Options {
    #[builder(default = "DEFAULT_GAP_OPEN")]
    gap_open: i32,
    #[builder(default = "DEFAULT_GAP_EXTEND")]
    gap_extend: i32,
    #[builder(default)]
    matrix: SubstitutionMatrix,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gap_open: DEFAULT_GAP_OPEN,
            gap_extend: DEFAULT_GAP_EXTEND,
            matrix: SubstitutionMatrix::default(),
        }
    }
}

impl Builder {
    fn validate(&self) -> std::result::Result<(), String> {
        for (name, value) in [("gap_open", self.gap_open), ("gap_extend", self.gap_extend)] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(format!("{name} must be non-negative, found {value}"));
                }
            }
        }
        Ok(())
    }

    /// Builds an [`Aligner`] from the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidInput`] if a gap penalty is negative.
    pub fn build(&self) -> Result<Aligner> {
        let options = self
            .build_options()
            .map_err(|e| AlignError::InvalidInput(e.to_string()))?;
        Ok(Aligner { options })
    }
}

/// Pairwise aligner with affine gap penalties.
///
/// Every method allocates its dynamic programming matrix for the duration of the call only, so
/// one aligner can be shared between threads.  Each returns the optimal alignment as a
/// [`Cigar`] whose coordinates are zero-based offsets into the query and subject; use
/// [`Aligner::score`] or [`Cigar::score`] to recover its score.
#[derive(Clone, Debug, Default)]
pub struct Aligner {
    options: Options,
}

impl Aligner {
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Global (Needleman-Wunsch) alignment: every base of both sequences is aligned.
    ///
    /// # Errors
    ///
    /// Fails if either sequence is empty, contains a byte outside the matrix alphabet, or is
    /// long enough that scores could overflow.
    pub fn global(&self, query: &[u8], subject: &[u8]) -> Result<Cigar> {
        self.check(query, subject)?;
        debug!(
            "Global alignment of {} query bases against {} subject bases",
            query.len(),
            subject.len()
        );
        let layout = Full::new(query.len(), subject.len());
        Ok(self.run(query, subject, layout, Ends::GLOBAL))
    }

    /// Local (Smith-Waterman) alignment.  The result is empty only if no cell beats the empty
    /// alignment; since equal scores favour the alignment covering more of the query, a
    /// zero-scoring pair of bases is still reported.
    ///
    /// # Errors
    ///
    /// As for [`Aligner::global`].
    pub fn local(&self, query: &[u8], subject: &[u8]) -> Result<Cigar> {
        self.local_pinned(query, subject, false, false)
    }

    /// Local alignment with either end optionally pinned.  `pin_left` forces the alignment to
    /// start at the first base of both sequences and `pin_right` forces it to end at the last
    /// base of both; an unpinned end is free, as in [`Aligner::local`].  Pinning both ends is a
    /// global alignment.
    ///
    /// # Errors
    ///
    /// As for [`Aligner::global`].
    pub fn local_pinned(
        &self,
        query: &[u8],
        subject: &[u8],
        pin_left: bool,
        pin_right: bool,
    ) -> Result<Cigar> {
        self.check(query, subject)?;
        debug!(
            "Local alignment (pin_left={pin_left}, pin_right={pin_right}) of {} query bases \
             against {} subject bases",
            query.len(),
            subject.len()
        );
        let layout = Full::new(query.len(), subject.len());
        let ends = Ends {
            pin_left,
            pin_right,
        };
        Ok(self.run(query, subject, layout, ends))
    }

    /// Local alignment restricted, for each query position `i`, to the inclusive subject
    /// interval `subject_limits[i]`.  Only the cells inside the intervals are stored.
    ///
    /// # Errors
    ///
    /// As for [`Aligner::global`], plus [`AlignError::InvalidInput`] if there is not exactly one
    /// interval per query base and [`AlignError::BandOutOfRange`] if an interval is inverted or
    /// lies wholly outside the subject.
    pub fn variable_band(
        &self,
        query: &[u8],
        subject: &[u8],
        subject_limits: &[Range],
    ) -> Result<Cigar> {
        self.check(query, subject)?;
        let layout = VariableBand::new(query.len(), subject.len(), subject_limits)?;
        debug!(
            "Variable band alignment of {} query bases against {} subject bases over {} cells",
            query.len(),
            subject.len(),
            layout.len()
        );
        Ok(self.run(query, subject, layout, Ends::LOCAL))
    }

    /// Local alignment restricted to cells within `band` diagonals of the main diagonal, that is
    /// query offset `i` may only align to subject offsets `i - band ..= i + band`.
    ///
    /// # Errors
    ///
    /// As for [`Aligner::global`].
    pub fn fixed_band(&self, query: &[u8], subject: &[u8], band: usize) -> Result<Cigar> {
        self.check(query, subject)?;
        debug!(
            "Fixed band alignment of {} query bases against {} subject bases with band {band}",
            query.len(),
            subject.len()
        );
        let layout = FixedBand::new(query.len(), subject.len(), band);
        Ok(self.run(query, subject, layout, Ends::LOCAL))
    }

    /// Scores `cigar` against the sequences it was aligned from, with this aligner's options.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ScoreOverflow`] if the score leaves the 32-bit range.
    pub fn score(&self, cigar: &Cigar, query: &[u8], subject: &[u8]) -> Result<i32> {
        cigar.score(
            query,
            subject,
            self.options.gap_open,
            self.options.gap_extend,
            &self.options.matrix,
        )
    }

    fn run<L: Layout>(&self, query: &[u8], subject: &[u8], layout: L, ends: Ends) -> Cigar {
        let (cigar, score) = affine::align(
            query,
            subject,
            self.options.gap_open,
            self.options.gap_extend,
            &self.options.matrix,
            layout,
            ends,
        );
        debug_assert_eq!(
            self.score(&cigar, query, subject).ok(),
            Some(score),
            "traceback disagrees with the matrix for {cigar}"
        );
        debug!("Aligned with score {score}: {cigar}");
        cigar
    }

    /// Validates the sequences before any matrix is allocated.
    fn check(&self, query: &[u8], subject: &[u8]) -> Result<()> {
        if query.is_empty() {
            return Err(AlignError::InvalidInput("the query is empty".to_string()));
        }
        if subject.is_empty() {
            return Err(AlignError::InvalidInput("the subject is empty".to_string()));
        }
        self.options.matrix.validate(query)?;
        self.options.matrix.validate(subject)?;

        // the worst and best possible scores must stay clear of the sentinel
        let (m, n) = (query.len() as i128, subject.len() as i128);
        let bound = i128::from(self.options.matrix.max_abs_score()) * m.min(n)
            + 2 * i128::from(self.options.gap_open)
            + i128::from(self.options.gap_extend) * (m + n);
        if bound >= -i128::from(MIN_SCORE) || m + n > i128::from(i32::MAX) {
            return Err(AlignError::ScoreOverflow(format!(
                "aligning {m} query bases against {n} subject bases could reach a score of \
                 {bound}"
            )));
        }
        Ok(())
    }
}

fn aligner(gap_open: i32, gap_extend: i32, matrix: &SubstitutionMatrix) -> Result<Aligner> {
    Builder::default()
        .gap_open(gap_open)
        .gap_extend(gap_extend)
        .matrix(matrix.clone())
        .build()
}

/// See [`Aligner::global`].
pub fn align_global(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    matrix: &SubstitutionMatrix,
) -> Result<Cigar> {
    aligner(gap_open, gap_extend, matrix)?.global(query, subject)
}

/// See [`Aligner::local`].
pub fn align_local(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    matrix: &SubstitutionMatrix,
) -> Result<Cigar> {
    aligner(gap_open, gap_extend, matrix)?.local(query, subject)
}

/// See [`Aligner::local_pinned`].
pub fn align_local_pinned(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    pin_left: bool,
    pin_right: bool,
    matrix: &SubstitutionMatrix,
) -> Result<Cigar> {
    aligner(gap_open, gap_extend, matrix)?.local_pinned(query, subject, pin_left, pin_right)
}

/// See [`Aligner::variable_band`].
pub fn align_variable_band(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    matrix: &SubstitutionMatrix,
    subject_limits: &[Range],
) -> Result<Cigar> {
    aligner(gap_open, gap_extend, matrix)?.variable_band(query, subject, subject_limits)
}

/// See [`Aligner::fixed_band`].
pub fn align_fixed_band(
    query: &[u8],
    subject: &[u8],
    gap_open: i32,
    gap_extend: i32,
    matrix: &SubstitutionMatrix,
    band: usize,
) -> Result<Cigar> {
    aligner(gap_open, gap_extend, matrix)?.fixed_band(query, subject, band)
}
