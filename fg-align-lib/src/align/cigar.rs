use std::{collections::VecDeque, fmt, io, str::FromStr};

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    error::{AlignError, Result},
    score::Score,
    scoring::{gap_cost, SubstitutionMatrix},
    Range,
};

/// The character used for gap columns in [`Cigar::to_align`] and [`Cigar::write_align`].
pub const GAP: u8 = b'-';

/// The number of alignment columns per block in [`Cigar::write_align`].
const ALIGN_LINE_LENGTH: usize = 100;

/// The kind of a CIGAR operation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum Kind {
    Match,     // Consumes one query and one subject base, which may or may not be equal
    Insertion, // Consumes a single query base
    Deletion,  // Consumes a single subject base
}

impl Kind {
    pub fn as_char(self) -> char {
        match self {
            Kind::Match => 'M',
            Kind::Insertion => 'I',
            Kind::Deletion => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Kind> {
        match c {
            'M' => Some(Kind::Match),
            'I' => Some(Kind::Insertion),
            'D' => Some(Kind::Deletion),
            _ => None,
        }
    }

    pub fn consumes_query(self) -> bool {
        matches!(self, Kind::Match | Kind::Insertion)
    }

    pub fn consumes_subject(self) -> bool {
        matches!(self, Kind::Match | Kind::Deletion)
    }
}

/// A run of `len` operations of the same kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct CigarOp {
    pub len: usize,
    pub kind: Kind,
}

impl CigarOp {
    pub fn new(len: usize, kind: Kind) -> Self {
        Self { len, kind }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind.as_char())
    }
}

/// One column of an alignment replayed against its sequences.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
enum Column {
    Aligned(u8, u8),
    Inserted(u8),
    Deleted(u8),
}

/// A pairwise alignment: the run-length encoded operations plus the inclusive, zero-based span
/// of the query and subject that they align.  Query bases outside the span are unaligned
/// (soft-clipped).
///
/// Adjacent operations of the same kind are always merged.  An alignment with no operations has
/// `query_to < query_from` (and likewise for the subject).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct Cigar {
    ops: VecDeque<CigarOp>,
    query_from: i32,
    query_to: i32,
    subject_from: i32,
    subject_to: i32,
}

impl Default for Cigar {
    fn default() -> Self {
        Self::new(-1, -1)
    }
}

impl Cigar {
    /// An empty alignment that ends at (and will grow backwards from) `query_to` and
    /// `subject_to`.
    pub fn new(query_to: i32, subject_to: i32) -> Self {
        Self {
            ops: VecDeque::new(),
            query_from: query_to + 1,
            query_to,
            subject_from: subject_to + 1,
            subject_to,
        }
    }

    /// Prepends an operation, merging it with the first operation if they have the same kind.
    pub fn push_front(&mut self, op: CigarOp) {
        if op.len == 0 {
            return;
        }
        if op.kind.consumes_query() {
            self.query_from -= op.len as i32;
        }
        if op.kind.consumes_subject() {
            self.subject_from -= op.len as i32;
        }
        match self.ops.front_mut() {
            Some(first) if first.kind == op.kind => first.len += op.len,
            _ => self.ops.push_front(op),
        }
    }

    /// Appends an operation, merging it with the last operation if they have the same kind.
    pub fn push_back(&mut self, op: CigarOp) {
        if op.len == 0 {
            return;
        }
        if op.kind.consumes_query() {
            self.query_to += op.len as i32;
        }
        if op.kind.consumes_subject() {
            self.subject_to += op.len as i32;
        }
        match self.ops.back_mut() {
            Some(last) if last.kind == op.kind => last.len += op.len,
            _ => self.ops.push_back(op),
        }
    }

    /// Splices `other` in front of this alignment, for example to join two independently
    /// computed segments.  `other` must end immediately before this alignment starts in both the
    /// query and the subject.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InconsistentSplice`] if the two alignments do not abut.
    pub fn push_front_cigar(&mut self, other: &Cigar) -> Result<()> {
        if other.query_to + 1 != self.query_from || other.subject_to + 1 != self.subject_from {
            return Err(AlignError::InconsistentSplice {
                left_query_to: other.query_to,
                left_subject_to: other.subject_to,
                right_query_from: self.query_from,
                right_subject_from: self.subject_from,
            });
        }
        for op in other.ops.iter().rev() {
            self.push_front(*op);
        }
        debug_assert_eq!(self.query_from, other.query_from);
        debug_assert_eq!(self.subject_from, other.subject_from);
        Ok(())
    }

    /// The inclusive aligned query span.
    pub fn query_range(&self) -> Range {
        (self.query_from, self.query_to)
    }

    /// The inclusive aligned subject span.
    pub fn subject_range(&self) -> Range {
        (self.subject_from, self.subject_to)
    }

    pub fn ops(&self) -> impl Iterator<Item = &CigarOp> + '_ {
        self.ops.iter()
    }

    /// The number of (merged) operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Renders the operations as CIGAR text, soft-clipping the query bases outside the aligned
    /// span.  The query occupies `[query_start, query_start + query_len)` in the coordinates of
    /// this alignment.
    pub fn cigar_string(&self, query_start: i32, query_len: i32) -> String {
        let (leading, trailing) = self.soft_clips(query_start, query_len);
        let mut cigar = String::new();
        if leading > 0 {
            cigar.push_str(&format!("{leading}S"));
        }
        cigar.push_str(&self.to_string());
        if trailing > 0 {
            cigar.push_str(&format!("{trailing}S"));
        }
        cigar
    }

    /// Like [`Cigar::cigar_string`], but with match operations split into runs of identical
    /// (`=`) and different (`X`) bases, and with insertion and deletion operations followed by
    /// the inserted or deleted bases, e.g. `5=1X2IAC3=1DG`.  Soft clips are only rendered when
    /// `include_soft_clip` is set.
    ///
    /// # Panics
    ///
    /// Panics if the aligned spans lie outside `query` or `subject`.
    pub fn detailed_cigar_string(
        &self,
        query_start: i32,
        query_len: i32,
        query: &[u8],
        subject: &[u8],
        include_soft_clip: bool,
    ) -> String {
        let mut cigar = String::new();
        let (leading, trailing) = self.soft_clips(query_start, query_len);
        if include_soft_clip && leading > 0 {
            cigar.push_str(&format!("{leading}S"));
        }
        let mut query_offset = self.query_from as usize;
        let mut subject_offset = self.subject_from as usize;
        for op in &self.ops {
            match op.kind {
                Kind::Match => {
                    let query_bases = &query[query_offset..query_offset + op.len];
                    let subject_bases = &subject[subject_offset..subject_offset + op.len];
                    for (is_match, group) in &query_bases
                        .iter()
                        .zip(subject_bases)
                        .group_by(|(q, s)| q == s)
                    {
                        let code = if is_match { '=' } else { 'X' };
                        cigar.push_str(&format!("{}{code}", group.count()));
                    }
                    query_offset += op.len;
                    subject_offset += op.len;
                }
                Kind::Insertion => {
                    let bases = &query[query_offset..query_offset + op.len];
                    cigar.push_str(&format!("{op}{}", String::from_utf8_lossy(bases)));
                    query_offset += op.len;
                }
                Kind::Deletion => {
                    let bases = &subject[subject_offset..subject_offset + op.len];
                    cigar.push_str(&format!("{op}{}", String::from_utf8_lossy(bases)));
                    subject_offset += op.len;
                }
            }
        }
        if include_soft_clip && trailing > 0 {
            cigar.push_str(&format!("{trailing}S"));
        }
        cigar
    }

    /// Renders the alignment in BLAST trace-back operations (BTOP) format: the lengths of runs of
    /// identical bases alternating with a query/subject character pair for every mismatch or gap
    /// column, e.g. `7AG3-T`.
    ///
    /// # Panics
    ///
    /// Panics if the aligned spans lie outside `query` or `subject`.
    pub fn btop_string(&self, query: &[u8], subject: &[u8]) -> String {
        let mut btop = String::new();
        let mut identical = 0;
        for column in self.columns(query, subject) {
            let (q, s) = match column {
                Column::Aligned(q, s) if q == s => {
                    identical += 1;
                    continue;
                }
                Column::Aligned(q, s) => (q, s),
                Column::Inserted(q) => (q, GAP),
                Column::Deleted(s) => (GAP, s),
            };
            if identical > 0 {
                btop.push_str(&identical.to_string());
                identical = 0;
            }
            btop.push(char::from(q));
            btop.push(char::from(s));
        }
        if identical > 0 {
            btop.push_str(&identical.to_string());
        }
        btop
    }

    /// Returns the query and subject rows of the alignment, with [`GAP`] in gap columns.
    ///
    /// # Panics
    ///
    /// Panics if the aligned spans lie outside `query` or `subject`.
    pub fn to_align(&self, query: &[u8], subject: &[u8]) -> (String, String) {
        let (query_row, subject_row) = self.rows(query, subject);
        (
            query_row.into_iter().map(char::from).collect(),
            subject_row.into_iter().map(char::from).collect(),
        )
    }

    /// The number of aligned columns with identical bases.
    pub fn matches(&self, query: &[u8], subject: &[u8]) -> usize {
        self.columns(query, subject)
            .filter(|column| matches!(column, Column::Aligned(q, s) if q == s))
            .count()
    }

    /// The edit distance implied by the alignment: mismatched columns plus gap columns.
    pub fn distance(&self, query: &[u8], subject: &[u8]) -> usize {
        self.columns(query, subject)
            .filter(|column| !matches!(column, Column::Aligned(q, s) if q == s))
            .count()
    }

    /// Scores the alignment: substitution scores for aligned columns, minus the affine
    /// [`gap_cost`] of every insertion and deletion run.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ScoreOverflow`] if the total leaves the 32-bit range.
    pub fn score(
        &self,
        query: &[u8],
        subject: &[u8],
        gap_open: i32,
        gap_extend: i32,
        matrix: &SubstitutionMatrix,
    ) -> Result<i32> {
        let mut total = Score::ZERO;
        let mut query_offset = self.query_from as usize;
        let mut subject_offset = self.subject_from as usize;
        for op in &self.ops {
            let score = match op.kind {
                Kind::Match => {
                    let score: i64 = query[query_offset..query_offset + op.len]
                        .iter()
                        .zip(&subject[subject_offset..subject_offset + op.len])
                        .map(|(&q, &s)| i64::from(matrix.score(q, s)))
                        .sum();
                    i32::try_from(score).map_err(|_| {
                        AlignError::ScoreOverflow(format!("match run score {score}"))
                    })?
                }
                Kind::Insertion | Kind::Deletion => {
                    let cost = gap_cost(gap_open, gap_extend, op.len)?;
                    cost.checked_neg().ok_or_else(|| {
                        AlignError::ScoreOverflow(format!("gap cost {cost}"))
                    })?
                }
            };
            if op.kind.consumes_query() {
                query_offset += op.len;
            }
            if op.kind.consumes_subject() {
                subject_offset += op.len;
            }
            total = total.checked_add(Score::new(score, 0))?;
        }
        Ok(total.score())
    }

    /// Writes a human-readable rendering of the alignment in blocks of 100 columns: the query
    /// row, a line marking identities (`|`) and positive-scoring substitutions (`+`), and the
    /// subject row, each sequence row labelled with one-based start and end positions.
    pub fn write_align<W: io::Write>(
        &self,
        query: &[u8],
        subject: &[u8],
        matrix: &SubstitutionMatrix,
        writer: &mut W,
    ) -> io::Result<()> {
        let (query_row, subject_row) = self.rows(query, subject);
        let width = (self.query_to + 1)
            .max(self.subject_to + 1)
            .max(1)
            .to_string()
            .len();
        let mut query_pos = self.query_from as usize + 1;
        let mut subject_pos = self.subject_from as usize + 1;
        for (query_line, subject_line) in query_row
            .chunks(ALIGN_LINE_LENGTH)
            .zip_eq(subject_row.chunks(ALIGN_LINE_LENGTH))
        {
            let markup: Vec<u8> = query_line
                .iter()
                .zip(subject_line)
                .map(|(&q, &s)| {
                    if q == GAP || s == GAP {
                        b' '
                    } else if q == s {
                        b'|'
                    } else if matrix.score(q, s) > 0 {
                        b'+'
                    } else {
                        b' '
                    }
                })
                .collect();
            let query_bases = query_line.iter().filter(|&&b| b != GAP).count();
            let subject_bases = subject_line.iter().filter(|&&b| b != GAP).count();
            write!(writer, "Query  {query_pos:>width$} ")?;
            writer.write_all(query_line)?;
            writeln!(writer, " {}", query_pos + query_bases - 1)?;
            write!(writer, "       {:>width$} ", "")?;
            writer.write_all(&markup)?;
            writeln!(writer)?;
            write!(writer, "Sbjct  {subject_pos:>width$} ")?;
            writer.write_all(subject_line)?;
            writeln!(writer, " {}", subject_pos + subject_bases - 1)?;
            writeln!(writer)?;
            query_pos += query_bases;
            subject_pos += subject_bases;
        }
        Ok(())
    }

    /// The number of query bases before and after the aligned span.
    fn soft_clips(&self, query_start: i32, query_len: i32) -> (i32, i32) {
        (
            self.query_from - query_start,
            query_start + query_len - 1 - self.query_to,
        )
    }

    /// Replays the operations against the sequences, one column at a time.
    fn columns<'a>(
        &'a self,
        query: &'a [u8],
        subject: &'a [u8],
    ) -> impl Iterator<Item = Column> + 'a {
        let mut query_offset = self.query_from as usize;
        let mut subject_offset = self.subject_from as usize;
        self.ops.iter().flat_map(move |op| {
            let (q, s) = (query_offset, subject_offset);
            if op.kind.consumes_query() {
                query_offset += op.len;
            }
            if op.kind.consumes_subject() {
                subject_offset += op.len;
            }
            let kind = op.kind;
            (0..op.len).map(move |k| match kind {
                Kind::Match => Column::Aligned(query[q + k], subject[s + k]),
                Kind::Insertion => Column::Inserted(query[q + k]),
                Kind::Deletion => Column::Deleted(subject[s + k]),
            })
        })
    }

    /// The gapped query and subject rows.
    fn rows(&self, query: &[u8], subject: &[u8]) -> (Vec<u8>, Vec<u8>) {
        self.columns(query, subject)
            .map(|column| match column {
                Column::Aligned(q, s) => (q, s),
                Column::Inserted(q) => (q, GAP),
                Column::Deleted(s) => (GAP, s),
            })
            .unzip()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ops.iter().join(""))
    }
}

impl FromStr for Cigar {
    type Err = AlignError;

    /// Parses CIGAR text with `M`, `I` and `D` operations, optionally bracketed by soft clips.
    /// The subject span starts at zero and the query span starts after the leading soft clip.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| AlignError::InvalidCigar {
            cigar: s.to_string(),
            reason: reason.to_string(),
        };
        let mut tokens: Vec<(usize, char)> = Vec::new();
        let mut len: Option<usize> = None;
        for c in s.chars() {
            if let Some(digit) = c.to_digit(10) {
                let value = len
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|value| value.checked_add(digit as usize))
                    .ok_or_else(|| invalid("operation length overflows"))?;
                len = Some(value);
            } else {
                let op_len = len.take().ok_or_else(|| invalid("operation without a length"))?;
                if op_len == 0 {
                    return Err(invalid("zero-length operation"));
                }
                tokens.push((op_len, c));
            }
        }
        if len.is_some() {
            return Err(invalid("trailing length without an operation"));
        }

        let last = tokens.len().saturating_sub(1);
        let mut leading = 0;
        let mut ops = Vec::with_capacity(tokens.len());
        for (index, &(op_len, c)) in tokens.iter().enumerate() {
            match (c, Kind::from_char(c)) {
                ('S', _) if index == 0 => leading = op_len,
                ('S', _) if index == last => (),
                ('S', _) => return Err(invalid("soft clip inside the alignment")),
                (_, Some(kind)) => ops.push(CigarOp::new(op_len, kind)),
                (_, None) => return Err(invalid(&format!("unknown operation '{c}'"))),
            }
        }
        let mut cigar = Cigar::new(leading as i32 - 1, -1);
        for op in ops {
            cigar.push_back(op);
        }
        Ok(cigar)
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::{Cigar, CigarOp, Kind};
    use crate::align::{error::AlignError, scoring::SubstitutionMatrix};

    /// Builds a cigar from text starting at the given query and subject offsets.
    fn cigar_at(text: &str, query_from: i32, subject_from: i32) -> Cigar {
        let mut cigar = Cigar::new(query_from - 1, subject_from - 1);
        for op in text.parse::<Cigar>().unwrap().ops() {
            cigar.push_back(*op);
        }
        cigar
    }

    #[rstest]
    fn test_empty() {
        let cigar = Cigar::new(4, 9);
        assert!(cigar.is_empty());
        assert_eq!(cigar.len(), 0);
        assert_eq!(cigar.query_range(), (5, 4));
        assert_eq!(cigar.subject_range(), (10, 9));
        assert_eq!(cigar.to_string(), "");
    }

    #[rstest]
    fn test_push_front_merges_and_updates_starts() {
        let mut cigar = Cigar::new(9, 19);
        cigar.push_front(CigarOp::new(3, Kind::Match));
        cigar.push_front(CigarOp::new(2, Kind::Match));
        cigar.push_front(CigarOp::new(1, Kind::Insertion));
        cigar.push_front(CigarOp::new(4, Kind::Deletion));
        cigar.push_front(CigarOp::new(0, Kind::Match));
        assert_eq!(cigar.to_string(), "4D1I5M");
        assert_eq!(cigar.len(), 3);
        assert_eq!(cigar.query_range(), (4, 9));
        assert_eq!(cigar.subject_range(), (11, 19));
    }

    #[rstest]
    fn test_push_back_merges_and_updates_ends() {
        let mut cigar = Cigar::new(-1, 4);
        cigar.push_back(CigarOp::new(2, Kind::Match));
        cigar.push_back(CigarOp::new(2, Kind::Deletion));
        cigar.push_back(CigarOp::new(1, Kind::Deletion));
        cigar.push_back(CigarOp::new(6, Kind::Match));
        assert_eq!(cigar.to_string(), "2M3D6M");
        assert_eq!(cigar.query_range(), (0, 7));
        assert_eq!(cigar.subject_range(), (5, 15));
    }

    #[rstest]
    fn test_push_front_cigar() {
        let mut right = cigar_at("3M2I", 5, 10);
        let left = cigar_at("1D5M", 0, 4);
        right.push_front_cigar(&left).unwrap();
        assert_eq!(right.to_string(), "1D8M2I");
        assert_eq!(right.query_range(), (0, 9));
        assert_eq!(right.subject_range(), (4, 12));
    }

    #[rstest]
    fn test_push_front_empty_cigar() {
        let mut right = cigar_at("3M", 5, 10);
        right.push_front_cigar(&Cigar::new(4, 9)).unwrap();
        assert_eq!(right.to_string(), "3M");
        assert_eq!(right.query_range(), (5, 7));
        assert_eq!(right.subject_range(), (10, 12));
    }

    #[rstest]
    #[case(4, 3)]
    #[case(3, 4)]
    #[case(5, 5)]
    fn test_push_front_cigar_must_abut(#[case] query_from: i32, #[case] subject_from: i32) {
        let mut right = cigar_at("3M", query_from, subject_from);
        let before = right.clone();
        let left = cigar_at("4M", 0, 0);
        assert_eq!(
            right.push_front_cigar(&left),
            Err(AlignError::InconsistentSplice {
                left_query_to: 3,
                left_subject_to: 3,
                right_query_from: query_from,
                right_subject_from: subject_from,
            })
        );
        assert_eq!(right, before);
    }

    #[rstest]
    #[case("4M", 0, 4, 0, "4M")]
    #[case("4M", 0, 5, 0, "4M1S")]
    #[case("4M", 2, 8, 0, "2S4M2S")]
    #[case("2M1I2M", 1, 6, 0, "1S2M1I2M")]
    #[case("3M", 12, 5, 10, "2S3M")]
    fn test_cigar_string(
        #[case] text: &str,
        #[case] query_from: i32,
        #[case] query_len: i32,
        #[case] query_start: i32,
        #[case] expected: &str,
    ) {
        let cigar = cigar_at(text, query_from, 0);
        assert_eq!(cigar.cigar_string(query_start, query_len), expected);
    }

    // query:   AC-GTTAC
    // subject: ACTGATA-
    fn gapped() -> (Vec<u8>, Vec<u8>, Cigar) {
        let query = b"ACGTTAC".to_vec();
        let subject = b"ACTGATA".to_vec();
        let cigar = cigar_at("2M1D4M1I", 0, 0);
        (query, subject, cigar)
    }

    #[rstest]
    fn test_detailed_cigar_string() {
        let (query, subject, cigar) = gapped();
        assert_eq!(
            cigar.detailed_cigar_string(0, 7, &query, &subject, true),
            "2=1DT1=1X2=1IC"
        );
        let query = b"GGACGTTACGG".to_vec();
        let cigar = cigar_at("2M1D4M1I", 2, 0);
        assert_eq!(
            cigar.detailed_cigar_string(0, 11, &query, &subject, true),
            "2S2=1DT1=1X2=1IC2S"
        );
        assert_eq!(
            cigar.detailed_cigar_string(0, 11, &query, &subject, false),
            "2=1DT1=1X2=1IC"
        );
    }

    #[rstest]
    fn test_btop_string() {
        let (query, subject, cigar) = gapped();
        assert_eq!(cigar.btop_string(&query, &subject), "2-T1TA2C-");
        let cigar = cigar_at("4M", 0, 0);
        assert_eq!(cigar.btop_string(b"ACGT", b"ACGT"), "4");
        assert_eq!(cigar.btop_string(b"ACGT", b"TCGA"), "AT2TA");
        let cigar = cigar_at("1M3I", 0, 0);
        assert_eq!(cigar.btop_string(b"AGGG", b"A"), "1G-G-G-");
    }

    #[rstest]
    fn test_to_align() {
        let (query, subject, cigar) = gapped();
        let (query_row, subject_row) = cigar.to_align(&query, &subject);
        assert_eq!(query_row, "AC-GTTAC");
        assert_eq!(subject_row, "ACTGATA-");
    }

    #[rstest]
    fn test_matches_and_distance() {
        let (query, subject, cigar) = gapped();
        assert_eq!(cigar.matches(&query, &subject), 5);
        assert_eq!(cigar.distance(&query, &subject), 3);
        let empty = Cigar::default();
        assert_eq!(empty.matches(&query, &subject), 0);
        assert_eq!(empty.distance(&query, &subject), 0);
    }

    #[rstest]
    fn test_score() {
        let (query, subject, cigar) = gapped();
        let matrix = SubstitutionMatrix::dna(2, -3);
        // 5 identities, 1 mismatch, two single-base gaps
        assert_eq!(
            cigar.score(&query, &subject, 5, 2, &matrix),
            Ok(5 * 2 - 3 - 5 - 5)
        );
        let cigar = cigar_at("2M3D2M", 0, 0);
        assert_eq!(
            cigar.score(b"ACGT", b"ACTTTGT", 5, 2, &matrix),
            Ok(4 * 2 - (5 + 2 * 2))
        );
    }

    #[rstest]
    fn test_score_overflow() {
        let cigar = cigar_at("1D", 0, 0);
        let matrix = SubstitutionMatrix::dna(1, -1);
        let result = cigar.score(b"", b"A", i32::MAX, 0, &matrix);
        assert_eq!(result, Ok(-i32::MAX));
        let cigar = cigar_at("1D1I", 0, 0);
        let result = cigar.score(b"A", b"A", i32::MAX, 0, &matrix);
        assert!(matches!(result, Err(AlignError::ScoreOverflow(_))));
        let cigar = cigar_at("3D", 0, 0);
        let result = cigar.score(b"", b"AAA", 5, i32::MAX, &matrix);
        assert!(matches!(result, Err(AlignError::ScoreOverflow(_))));
    }

    #[rstest]
    fn test_write_align() {
        let (query, subject, cigar) = gapped();
        let mut out = Vec::new();
        cigar
            .write_align(&query, &subject, &SubstitutionMatrix::dna(1, -1), &mut out)
            .unwrap();
        let expected = [
            "Query  1 AC-GTTAC 7",
            "         || | || ",
            "Sbjct  1 ACTGATA- 7",
            "",
        ]
        .join("\n")
            + "\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[rstest]
    fn test_write_align_blocks() {
        let query = vec![b'A'; 150];
        let cigar = cigar_at("150M", 0, 0);
        let mut out = Vec::new();
        cigar
            .write_align(&query, &query, &SubstitutionMatrix::dna(1, -1), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Query    1 AAAA"));
        assert!(lines[0].ends_with(" 100"));
        assert!(lines[4].starts_with("Query  101 AAAA"));
        assert!(lines[6].ends_with(" 150"));
    }

    #[rstest]
    #[case("10M", 0, "10M")]
    #[case("3S2M1I4M2D3M", 3, "2M1I4M2D3M")]
    #[case("2M1I4M2D3M5S", 0, "2M1I4M2D3M")]
    #[case("", 0, "")]
    fn test_from_str(#[case] text: &str, #[case] query_from: i32, #[case] ops: &str) {
        let cigar: Cigar = text.parse().unwrap();
        assert_eq!(cigar.to_string(), ops);
        assert_eq!(cigar.query_range().0, query_from);
        assert_eq!(cigar.subject_range().0, 0);
    }

    #[rstest]
    #[case("M")]
    #[case("3")]
    #[case("0M")]
    #[case("3Q")]
    #[case("2M3S1M")]
    #[case("99999999999999999999999M")]
    fn test_from_str_invalid(#[case] text: &str) {
        assert!(matches!(
            text.parse::<Cigar>(),
            Err(AlignError::InvalidCigar { .. })
        ));
    }
}
