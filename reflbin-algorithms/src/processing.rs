//! High-level processing helpers that combine extraction, sorting and
//! point combination into one record.

use crate::build::build_record;
use crate::extract::extract_columns;
use crate::merge::ToleranceMerge;
use crate::rebin::QRebin;
use crate::sort::sort_bundle;
use log::debug;
use rayon::prelude::*;
use reflbin_core::{
    BinEdges, Column, Error, MeasurementRecord, MergeConfig, PointCombiner, RebinConfig, Result,
};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extracts one bank of `group`, sorts it by the head's intent keys and
/// combines it with `combiner`.
pub fn combine_group(
    group: &[MeasurementRecord],
    combiner: &dyn PointCombiner,
    bank: usize,
) -> Result<MeasurementRecord> {
    let head = group.first().ok_or(Error::EmptyGroup)?;
    let columns = extract_columns(group, Some(bank))?;
    let sorted = sort_bundle(&columns, head.intent.sort_keys());
    let combined = combiner.combine(&sorted, head.norm_basis)?;
    debug!(
        "{} on {}: {} -> {} points (bank {bank})",
        combiner.name(),
        head.label(),
        columns.len(),
        combined.len()
    );
    Ok(build_record(group, combined, bank))
}

/// Joins records of the same intent and cross section into one, merging
/// points measured at the same configuration.
pub fn join_records(
    group: &[MeasurementRecord],
    config: &MergeConfig,
) -> Result<MeasurementRecord> {
    let head = group.first().ok_or(Error::EmptyGroup)?;
    let merger = ToleranceMerge::new(config.clone(), head.intent);
    combine_group(group, &merger, 0)
}

/// Rebins the configured detector bank onto `edges`.
pub fn rebin(
    group: &[MeasurementRecord],
    edges: &BinEdges,
    config: &RebinConfig,
) -> Result<MeasurementRecord> {
    let rebinner = QRebin::new(edges.clone(), config.clone());
    combine_group(group, &rebinner, config.bank)
}

/// Rebins onto bins centered on `centers`, with catch-all bins beyond
/// either end.
pub fn rebin_centers(
    group: &[MeasurementRecord],
    centers: &[f64],
    config: &RebinConfig,
) -> Result<MeasurementRecord> {
    let edges = BinEdges::from_centers(centers, true)?;
    rebin(group, &edges, config)
}

/// Rebins every detector bank, one record per bank.
///
/// Banks are processed in parallel; the bank setting in `config` is ignored.
pub fn rebin_banks(
    group: &[MeasurementRecord],
    edges: &BinEdges,
    config: &RebinConfig,
) -> Result<Vec<MeasurementRecord>> {
    if group.is_empty() {
        return Err(Error::EmptyGroup);
    }
    let banks = group
        .iter()
        .map(MeasurementRecord::bank_count)
        .max()
        .unwrap_or(1);
    let rebinner = QRebin::new(edges.clone(), config.clone());
    (0..banks)
        .into_par_iter()
        .map(|bank| combine_group(group, &rebinner, bank))
        .collect()
}

/// Flattens one bank of `group` into a record sorted by Q with no
/// combination.
pub fn nobin(group: &[MeasurementRecord], bank: usize) -> Result<MeasurementRecord> {
    let columns = extract_columns(group, Some(bank))?;
    let sorted = sort_bundle(&columns, &[Column::Q]);
    Ok(build_record(group, sorted, bank))
}

/// Ordering applied to records before they are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RecordOrder {
    /// By record name.
    File,
    /// By scan start time; records without one go last.
    Time,
    /// By first sample angle, then first detector angle.
    Theta,
    /// By first slit 1 opening, then slit 2.
    Slit,
    /// Keep the given order.
    #[default]
    None,
}

impl RecordOrder {
    /// Name used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Time => "time",
            Self::Theta => "theta",
            Self::Slit => "slit",
            Self::None => "none",
        }
    }
}

impl fmt::Display for RecordOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "time" => Ok(Self::Time),
            "theta" => Ok(Self::Theta),
            "slit" => Ok(Self::Slit),
            "none" => Ok(Self::None),
            other => Err(Error::UnknownRecordOrder(other.to_string())),
        }
    }
}

fn first(values: &[f64]) -> f64 {
    values.first().copied().unwrap_or(f64::NAN)
}

/// Sorts records in place. The sort is stable.
pub fn sort_records(records: &mut [MeasurementRecord], order: RecordOrder) {
    let pair = |a: (f64, f64), b: (f64, f64)| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1));
    match order {
        RecordOrder::None => {}
        RecordOrder::File => records.sort_by(|a, b| a.name.cmp(&b.name)),
        RecordOrder::Time => records.sort_by(|a, b| {
            let key = |data: &MeasurementRecord| data.start_time.unwrap_or(f64::INFINITY);
            key(a).total_cmp(&key(b))
        }),
        RecordOrder::Theta => records.sort_by(|a, b| {
            let key = |data: &MeasurementRecord| {
                (first(&data.sample_angle), first(&data.detector_angle))
            };
            pair(key(a), key(b))
        }),
        RecordOrder::Slit => records.sort_by(|a, b| {
            let key = |data: &MeasurementRecord| (first(&data.slit1), first(&data.slit2));
            pair(key(a), key(b))
        }),
    }
}
