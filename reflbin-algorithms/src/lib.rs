//! reflbin-algorithms: Point combination for reflectometry reduction.
//!
//! This crate turns groups of measurement records into combined records:
//! - **Extraction** - flattens records into a column bundle
//! - **Sorting** - brings near-duplicate points together
//! - **Tolerance merge** - joins points measured at the same configuration
//! - **Q rebin** - combines points onto a fixed Q grid
//!
#![warn(missing_docs)]

mod build;
mod extract;
mod merge;
mod processing;
mod rebin;
pub mod sort;

pub use build::{build_record, join_formula};
pub use extract::{check_norm_basis, extract_columns};
pub use merge::ToleranceMerge;
pub use processing::{
    combine_group, join_records, nobin, rebin, rebin_banks, rebin_centers, sort_records,
    RecordOrder,
};
pub use rebin::QRebin;
pub use sort::{sort_bundle, sort_bundle_by_names, sort_order};

// Re-export core combination traits
pub use reflbin_core::{CombineStatistics, PointCombiner};
