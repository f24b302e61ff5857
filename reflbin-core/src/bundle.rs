//! Column bundle: Structure of Arrays working storage for merge and rebin.
//!
//! Every point of every input record becomes one row. Columns are kept in
//! parallel vectors so sorting and filtering can be applied to all of them
//! with a single index list.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed set of named columns in a [`ColumnBundle`].
///
/// Sample environment columns are keyed by their field name instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    /// Incident (sample) angle `Ti`.
    SampleAngle,
    /// Detector angle `Td`.
    DetectorAngle,
    /// Angular resolution `dT` (1-sigma).
    AngularResolution,
    /// Wavelength `L`.
    Wavelength,
    /// Wavelength spread `dL` (1-sigma).
    WavelengthResolution,
    /// Slit 1 opening `s1`.
    Slit1,
    /// Slit 2 opening `s2`.
    Slit2,
    /// Momentum transfer `Q`.
    Q,
    /// Q resolution `dQ` (1-sigma).
    QResolution,
    /// Intensity `v`.
    Intensity,
    /// Intensity uncertainty `dv` (1-sigma).
    IntensityError,
    /// Integration time `time`.
    CountTime,
    /// Monitor counts `monitor`.
    Monitor,
}

impl Column {
    /// All fixed columns in storage order.
    pub const ALL: [Column; 13] = [
        Column::SampleAngle,
        Column::DetectorAngle,
        Column::AngularResolution,
        Column::Wavelength,
        Column::WavelengthResolution,
        Column::Slit1,
        Column::Slit2,
        Column::Q,
        Column::QResolution,
        Column::Intensity,
        Column::IntensityError,
        Column::CountTime,
        Column::Monitor,
    ];

    /// Short column name used in sort key lists.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Column::SampleAngle => "Ti",
            Column::DetectorAngle => "Td",
            Column::AngularResolution => "dT",
            Column::Wavelength => "L",
            Column::WavelengthResolution => "dL",
            Column::Slit1 => "s1",
            Column::Slit2 => "s2",
            Column::Q => "Q",
            Column::QResolution => "dQ",
            Column::Intensity => "v",
            Column::IntensityError => "dv",
            Column::CountTime => "time",
            Column::Monitor => "monitor",
        }
    }

    /// Looks up a column by its short name.
    pub fn from_name(name: &str) -> Result<Self> {
        Column::ALL
            .into_iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| Error::UnknownSortKey(name.to_string()))
    }

    /// Totals are summed when points combine rather than averaged.
    #[must_use]
    pub fn is_total(self) -> bool {
        matches!(self, Column::CountTime | Column::Monitor)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Column::from_name(s)
    }
}

/// A set of equal-length point columns in Structure of Arrays layout.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnBundle {
    pub ti: Vec<f64>,
    pub td: Vec<f64>,
    pub dt: Vec<f64>,
    pub l: Vec<f64>,
    pub dl: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub q: Vec<f64>,
    pub dq: Vec<f64>,
    pub v: Vec<f64>,
    pub dv: Vec<f64>,
    pub time: Vec<f64>,
    pub monitor: Vec<f64>,
    /// Sample environment averages, one column per field.
    pub environment: BTreeMap<String, Vec<f64>>,
}

impl ColumnBundle {
    /// Creates an empty bundle with the given environment columns.
    #[must_use]
    pub fn with_capacity<S: AsRef<str>>(capacity: usize, environment: &[S]) -> Self {
        let column = || Vec::with_capacity(capacity);
        Self {
            ti: column(),
            td: column(),
            dt: column(),
            l: column(),
            dl: column(),
            s1: column(),
            s2: column(),
            q: column(),
            dq: column(),
            v: column(),
            dv: column(),
            time: column(),
            monitor: column(),
            environment: environment
                .iter()
                .map(|name| (name.as_ref().to_string(), column()))
                .collect(),
        }
    }

    /// Creates an empty bundle with the same environment columns as `self`.
    #[must_use]
    pub fn empty_like(&self, capacity: usize) -> Self {
        let names: Vec<&str> = self.environment.keys().map(String::as_str).collect();
        Self::with_capacity(capacity, &names)
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.v.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// Borrows a fixed column.
    #[must_use]
    pub fn column(&self, column: Column) -> &[f64] {
        match column {
            Column::SampleAngle => &self.ti,
            Column::DetectorAngle => &self.td,
            Column::AngularResolution => &self.dt,
            Column::Wavelength => &self.l,
            Column::WavelengthResolution => &self.dl,
            Column::Slit1 => &self.s1,
            Column::Slit2 => &self.s2,
            Column::Q => &self.q,
            Column::QResolution => &self.dq,
            Column::Intensity => &self.v,
            Column::IntensityError => &self.dv,
            Column::CountTime => &self.time,
            Column::Monitor => &self.monitor,
        }
    }

    /// Mutably borrows a fixed column.
    pub fn column_mut(&mut self, column: Column) -> &mut Vec<f64> {
        match column {
            Column::SampleAngle => &mut self.ti,
            Column::DetectorAngle => &mut self.td,
            Column::AngularResolution => &mut self.dt,
            Column::Wavelength => &mut self.l,
            Column::WavelengthResolution => &mut self.dl,
            Column::Slit1 => &mut self.s1,
            Column::Slit2 => &mut self.s2,
            Column::Q => &mut self.q,
            Column::QResolution => &mut self.dq,
            Column::Intensity => &mut self.v,
            Column::IntensityError => &mut self.dv,
            Column::CountTime => &mut self.time,
            Column::Monitor => &mut self.monitor,
        }
    }

    /// Looks up a column by short name or environment field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        match Column::from_name(name) {
            Ok(column) => Some(self.column(column)),
            Err(_) => self.environment.get(name).map(Vec::as_slice),
        }
    }

    /// True when every column has the same length.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        let n = self.len();
        Column::ALL
            .iter()
            .all(|&column| self.column(column).len() == n)
            && self.environment.values().all(|values| values.len() == n)
    }

    /// Builds a new bundle from the rows at `indices`, in that order.
    ///
    /// Used for both permutation (sorting) and filtering.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |values: &[f64]| indices.iter().map(|&i| values[i]).collect::<Vec<f64>>();
        let mut out = Self::default();
        for column in Column::ALL {
            *out.column_mut(column) = pick(self.column(column));
        }
        out.environment = self
            .environment
            .iter()
            .map(|(name, values)| (name.clone(), pick(values)))
            .collect();
        out
    }

    /// Keeps the rows where `keep` is true.
    #[must_use]
    pub fn filter(&self, keep: &[bool]) -> Self {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        self.select(&indices)
    }

    /// Copies row `index` of `other` onto the end of this bundle.
    ///
    /// Environment columns absent from `self` are ignored.
    pub fn push_row(&mut self, other: &ColumnBundle, index: usize) {
        for column in Column::ALL {
            self.column_mut(column).push(other.column(column)[index]);
        }
        for (name, values) in &mut self.environment {
            if let Some(source) = other.environment.get(name) {
                values.push(source[index]);
            }
        }
    }

    /// Appends all rows from another bundle with the same environment columns.
    pub fn append(&mut self, other: &ColumnBundle) {
        for column in Column::ALL {
            self.column_mut(column)
                .extend_from_slice(other.column(column));
        }
        for (name, values) in &mut self.environment {
            if let Some(source) = other.environment.get(name) {
                values.extend_from_slice(source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ColumnBundle {
        let mut bundle = ColumnBundle::with_capacity(3, &["temperature"]);
        for i in 0..3 {
            let x = f64::from(i);
            for column in Column::ALL {
                bundle.column_mut(column).push(x);
            }
            bundle
                .environment
                .get_mut("temperature")
                .unwrap()
                .push(300.0 + x);
        }
        bundle
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()).unwrap(), column);
        }
        assert_eq!(
            Column::from_name("Qx"),
            Err(Error::UnknownSortKey("Qx".to_string()))
        );
    }

    #[test]
    fn test_select_moves_every_column() {
        let bundle = sample();
        let reordered = bundle.select(&[2, 0, 1]);
        assert!(reordered.is_uniform());
        assert_eq!(reordered.ti, vec![2.0, 0.0, 1.0]);
        assert_eq!(reordered.monitor, vec![2.0, 0.0, 1.0]);
        assert_eq!(reordered.environment["temperature"], vec![302.0, 300.0, 301.0]);
    }

    #[test]
    fn test_filter_and_push_row() {
        let bundle = sample();
        let kept = bundle.filter(&[true, false, true]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.get("temperature").unwrap(), &[300.0, 302.0]);

        let mut rows = bundle.empty_like(1);
        rows.push_row(&bundle, 1);
        assert!(rows.is_uniform());
        assert_eq!(rows.get("L").unwrap(), &[1.0]);
        assert_eq!(rows.get("temperature").unwrap(), &[301.0]);
    }

    #[test]
    fn test_append() {
        let mut bundle = sample();
        let other = sample();
        bundle.append(&other);
        assert_eq!(bundle.len(), 6);
        assert!(bundle.is_uniform());
        assert!(ColumnBundle::default().is_empty());
    }
}
