use std::{fmt, sync::Arc};

use bio::alignment::pairwise::MatchFunc;
use lazy_static::lazy_static;

use super::{
    aligners::constants::{DEFAULT_MATCH_SCORE, DEFAULT_MISMATCH_SCORE},
    error::{AlignError, Result},
};

/// The nucleotide alphabet scored by [`SubstitutionMatrix::dna`].
pub const DNA_ALPHABET: &[u8] = b"ACGTNacgtn";

/// The amino-acid alphabet scored by [`SubstitutionMatrix::blosum62`].
pub const PROTEIN_ALPHABET: &[u8] = b"ARNDCQEGHILKMFPSTWYVBZX*arndcqeghilkmfpstwyvbzx";

lazy_static! {
    static ref BLOSUM62: SubstitutionMatrix = SubstitutionMatrix::from_fn(PROTEIN_ALPHABET, |a, b| {
        bio::scores::blosum62(a.to_ascii_uppercase(), b.to_ascii_uppercase()) as i8
    })
    .unwrap_or_else(|_| unreachable!("BLOSUM62 is symmetric"));
}

struct Table {
    scores: [[i8; 256]; 256],
    alphabet: [bool; 256],
}

/// Substitution scores for every pair of byte values, plus the alphabet of bytes that have
/// meaningful scores.
///
/// The table is indexed directly by the two raw bytes so that lookups on the alignment hot path
/// are two array offsets.  It is reference counted and immutable, so cloning is cheap and a
/// single matrix can be shared by aligners running on different threads.
///
/// Gaps are scored separately with an affine model, see [`gap_cost`].
#[derive(Clone)]
pub struct SubstitutionMatrix {
    table: Arc<Table>,
}

impl SubstitutionMatrix {
    /// Builds a matrix over `alphabet`, scoring each pair of alphabet bytes with `score_fn`.
    /// Pairs involving a byte outside the alphabet score zero and are rejected by
    /// [`SubstitutionMatrix::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::AsymmetricScores`] if `score_fn(a, b) != score_fn(b, a)` for any
    /// pair of alphabet bytes.
    pub fn from_fn<F>(alphabet: &[u8], score_fn: F) -> Result<Self>
    where
        F: Fn(u8, u8) -> i8,
    {
        let mut table = Table {
            scores: [[0; 256]; 256],
            alphabet: [false; 256],
        };
        for &a in alphabet {
            table.alphabet[a as usize] = true;
        }
        for &a in alphabet {
            for &b in alphabet {
                let score = score_fn(a, b);
                if score != score_fn(b, a) {
                    return Err(AlignError::AsymmetricScores { a, b });
                }
                table.scores[a as usize][b as usize] = score;
            }
        }
        Ok(Self {
            table: Arc::new(table),
        })
    }

    /// A nucleotide matrix scoring `match_score` for identical bases (ignoring case) and
    /// `mismatch_score` otherwise.  `N` mismatches every base, itself included.
    pub fn dna(match_score: i8, mismatch_score: i8) -> Self {
        Self::from_fn(DNA_ALPHABET, |a, b| {
            let (a, b) = (a.to_ascii_uppercase(), b.to_ascii_uppercase());
            if a == b && a != b'N' {
                match_score
            } else {
                mismatch_score
            }
        })
        .unwrap_or_else(|_| unreachable!("DNA scores are symmetric"))
    }

    /// The BLOSUM62 protein matrix (case-insensitive).
    pub fn blosum62() -> Self {
        BLOSUM62.clone()
    }

    /// Returns the score for aligning `a` against `b` without checking the alphabet.
    #[inline(always)]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        i32::from(self.table.scores[a as usize][b as usize])
    }

    /// Returns the score for aligning `a` against `b`, failing if either is outside the alphabet.
    pub fn checked_score(&self, a: u8, b: u8) -> Result<i32> {
        if !self.contains(a) {
            return Err(AlignError::InvalidSymbol {
                symbol: a,
                position: 0,
            });
        }
        if !self.contains(b) {
            return Err(AlignError::InvalidSymbol {
                symbol: b,
                position: 0,
            });
        }
        Ok(self.score(a, b))
    }

    /// True if `symbol` is in the alphabet of this matrix.
    #[inline(always)]
    pub fn contains(&self, symbol: u8) -> bool {
        self.table.alphabet[symbol as usize]
    }

    /// Checks that every byte of `seq` is in the alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidSymbol`] for the first offending byte.
    pub fn validate(&self, seq: &[u8]) -> Result<()> {
        match seq.iter().position(|&symbol| !self.contains(symbol)) {
            None => Ok(()),
            Some(position) => Err(AlignError::InvalidSymbol {
                symbol: seq[position],
                position,
            }),
        }
    }

    /// The largest absolute score in the alphabet, used to bound alignment scores.
    pub fn max_abs_score(&self) -> i32 {
        let alphabet = self.alphabet();
        alphabet
            .iter()
            .flat_map(|&a| alphabet.iter().map(move |&b| (a, b)))
            .map(|(a, b)| self.score(a, b).abs())
            .max()
            .unwrap_or(0)
    }

    /// The bytes for which this matrix has scores.
    pub fn alphabet(&self) -> Vec<u8> {
        (0..=255u8).filter(|&symbol| self.contains(symbol)).collect()
    }
}

impl Default for SubstitutionMatrix {
    fn default() -> Self {
        Self::dna(DEFAULT_MATCH_SCORE, DEFAULT_MISMATCH_SCORE)
    }
}

impl fmt::Debug for SubstitutionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstitutionMatrix")
            .field("alphabet", &String::from_utf8_lossy(&self.alphabet()))
            .finish()
    }
}

impl MatchFunc for SubstitutionMatrix {
    #[inline]
    fn score(&self, a: u8, b: u8) -> i32 {
        SubstitutionMatrix::score(self, a, b)
    }
}

/// Cost of a gap of `len` columns under the affine model: `open + extend * (len - 1)`.  Costs
/// are positive and are subtracted from alignment scores.
///
/// # Errors
///
/// Returns [`AlignError::ScoreOverflow`] if the cost does not fit in an `i32`.
pub fn gap_cost(open: i32, extend: i32, len: usize) -> Result<i32> {
    debug_assert!(len > 0, "gap length must be positive");
    let cost = i128::from(open) + i128::from(extend) * (len as i128 - 1);
    i32::try_from(cost).map_err(|_| {
        AlignError::ScoreOverflow(format!("cost {cost} of a {len} column gap"))
    })
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::{gap_cost, SubstitutionMatrix, DNA_ALPHABET, PROTEIN_ALPHABET};
    use crate::align::error::AlignError;

    #[rstest]
    #[case(b'A', b'A', 2)]
    #[case(b'a', b'A', 2)]
    #[case(b'c', b'g', -3)]
    #[case(b'N', b'N', -3)]
    #[case(b'N', b'A', -3)]
    #[case(b'T', b't', 2)]
    fn test_dna_scores(#[case] a: u8, #[case] b: u8, #[case] expected: i32) {
        let matrix = SubstitutionMatrix::dna(2, -3);
        assert_eq!(matrix.score(a, b), expected);
        assert_eq!(matrix.score(b, a), expected);
        assert_eq!(matrix.checked_score(a, b), Ok(expected));
    }

    #[rstest]
    #[case(b'W', b'W', 11)]
    #[case(b'A', b'A', 4)]
    #[case(b'A', b'R', -1)]
    #[case(b'w', b'c', -2)]
    #[case(b'*', b'A', -4)]
    fn test_blosum62_scores(#[case] a: u8, #[case] b: u8, #[case] expected: i32) {
        let matrix = SubstitutionMatrix::blosum62();
        assert_eq!(matrix.score(a, b), expected);
        assert_eq!(matrix.score(b, a), expected);
    }

    #[rstest]
    fn test_alphabets() {
        assert_eq!(SubstitutionMatrix::dna(1, -1).alphabet().len(), DNA_ALPHABET.len());
        assert_eq!(SubstitutionMatrix::blosum62().alphabet().len(), PROTEIN_ALPHABET.len());
    }

    #[rstest]
    fn test_symbols_outside_alphabet_are_rejected() {
        let matrix = SubstitutionMatrix::dna(1, -1);
        assert_eq!(
            matrix.checked_score(b'A', b'X'),
            Err(AlignError::InvalidSymbol {
                symbol: b'X',
                position: 0
            })
        );
        assert_eq!(matrix.validate(b"ACGTNacgtn"), Ok(()));
        assert_eq!(
            matrix.validate(b"ACG-T"),
            Err(AlignError::InvalidSymbol {
                symbol: b'-',
                position: 3
            })
        );
    }

    #[rstest]
    fn test_asymmetric_table_is_rejected() {
        let result = SubstitutionMatrix::from_fn(b"AB", |a, b| if a < b { 1 } else { 0 });
        assert!(matches!(result, Err(AlignError::AsymmetricScores { .. })));
    }

    #[rstest]
    fn test_max_abs_score() {
        assert_eq!(SubstitutionMatrix::dna(2, -5).max_abs_score(), 5);
        assert_eq!(SubstitutionMatrix::blosum62().max_abs_score(), 11);
    }

    #[rstest]
    #[case(5, 2, 1, 5)]
    #[case(5, 2, 2, 7)]
    #[case(5, 2, 10, 23)]
    #[case(0, 1, 3, 2)]
    fn test_gap_cost(#[case] open: i32, #[case] extend: i32, #[case] len: usize, #[case] cost: i32) {
        assert_eq!(gap_cost(open, extend, len), Ok(cost));
    }

    #[rstest]
    fn test_gap_cost_overflow() {
        assert!(matches!(
            gap_cost(5, i32::MAX, 3),
            Err(AlignError::ScoreOverflow(_))
        ));
        assert_eq!(gap_cost(i32::MAX, 0, 1_000), Ok(i32::MAX));
    }
}
