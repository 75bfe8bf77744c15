pub mod aligners;
pub mod cigar;
pub mod error;
pub mod score;
pub mod scoring;
pub(crate) mod traceback;

/// An inclusive `(from, to)` coordinate interval.  An interval with `to < from` is empty.
pub type Range = (i32, i32);
