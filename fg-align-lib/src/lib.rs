#![deny(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub mod align;

pub use align::{
    aligners::{
        align_fixed_band, align_global, align_local, align_local_pinned, align_variable_band,
        Aligner, Builder, Options,
    },
    cigar::{Cigar, CigarOp, Kind},
    error::{AlignError, Result},
    score::Score,
    scoring::{gap_cost, SubstitutionMatrix},
};
