/// Value to use as a 'negative infinity' score. Should be close to `i32::MIN`,
/// but avoid underflow when adding gap penalties or substitution scores to it.
/// Use ~ `0.4 * i32::MIN`
pub const MIN_SCORE: i32 = -858_993_459;

pub const DEFAULT_GAP_OPEN: i32 = 5;
pub const DEFAULT_GAP_EXTEND: i32 = 2;
pub const DEFAULT_MATCH_SCORE: i8 = 1;
pub const DEFAULT_MISMATCH_SCORE: i8 = -3;
