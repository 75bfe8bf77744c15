//! Errors raised while configuring an aligner, aligning, or replaying a CIGAR.
use thiserror::Error;

/// Result type alias for alignment operations.
pub type Result<T> = std::result::Result<T, AlignError>;

/// The ways an alignment request can fail.  Every failure is detected before a partial result
/// is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    /// The query or subject is empty, or a parameter is out of its domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A sequence byte has no entry in the substitution matrix alphabet.
    #[error("Invalid symbol 0x{symbol:02x} at position {position}")]
    InvalidSymbol {
        /// The offending byte
        symbol: u8,
        /// Zero-based offset in the sequence that contained it
        position: usize,
    },

    /// A variable band interval does not intersect the subject.
    #[error("Band interval [{from}, {to}] for query position {query_pos} is outside subject [0, {subject_len})")]
    BandOutOfRange {
        query_pos: usize,
        from: i32,
        to: i32,
        subject_len: usize,
    },

    /// Two CIGARs were spliced that do not abut in query and subject coordinates.
    #[error("Cannot splice CIGAR ending at query {left_query_to}/subject {left_subject_to} before CIGAR starting at query {right_query_from}/subject {right_subject_from}")]
    InconsistentSplice {
        left_query_to: i32,
        left_subject_to: i32,
        right_query_from: i32,
        right_subject_from: i32,
    },

    /// A score or tie-breaker left its packed 32-bit range.
    #[error("Score overflow: {0}")]
    ScoreOverflow(String),

    /// The substitution table is not symmetric.
    #[error("Asymmetric substitution scores for 0x{a:02x} and 0x{b:02x}")]
    AsymmetricScores { a: u8, b: u8 },

    /// CIGAR text could not be parsed.
    #[error("Invalid CIGAR '{cigar}': {reason}")]
    InvalidCigar { cigar: String, reason: String },
}
