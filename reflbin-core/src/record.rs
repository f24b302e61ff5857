//! Measurement records produced by instrument loaders.
#![allow(clippy::doc_markdown)]

use crate::bundle::Column;
use crate::error::{Error, Result};
use crate::intent::{Intent, NormBasis};
use crate::resolution::{dq_from, q_from};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One logged sample environment quantity, such as temperature or field.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Environment {
    /// Units of `average`.
    pub units: String,
    /// Value per point, or a single value for the whole scan.
    pub average: Vec<f64>,
}

impl Environment {
    /// Creates an environment field.
    pub fn new(units: impl Into<String>, average: Vec<f64>) -> Self {
        Self {
            units: units.into(),
            average,
        }
    }
}

/// A single scan after loading and the standard corrections.
///
/// Per-point vectors hold either one value per point or a single value
/// shared by every point. Angles are in degrees; wavelengths and Q use the
/// loader's length unit consistently.
///
/// The angles, wavelength, both resolutions, `monitor`, `count_time` and
/// `dv` have no default and must be supplied; an empty vector fails
/// extraction with [`Error::ColumnLengthMismatch`]. Slit openings default to
/// zero and every point to bank 0.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeasurementRecord {
    pub name: String,
    pub entry: String,
    pub polarization: String,
    /// Sample description, joined across files when records merge.
    pub formula: String,
    pub intent: Intent,
    pub norm_basis: NormBasis,
    /// Start of the scan in seconds since the epoch.
    pub start_time: Option<f64>,
    /// Incident angle `Ti`.
    pub sample_angle: Vec<f64>,
    /// Detector angle `Td`.
    pub detector_angle: Vec<f64>,
    /// Angular resolution `dT` (1-sigma).
    pub angular_resolution: Vec<f64>,
    /// Wavelength `L`.
    pub wavelength: Vec<f64>,
    /// Wavelength spread `dL` (1-sigma).
    pub wavelength_resolution: Vec<f64>,
    pub slit1: Vec<f64>,
    pub slit2: Vec<f64>,
    pub monitor: Vec<f64>,
    pub count_time: Vec<f64>,
    /// Normalized intensity.
    pub v: Vec<f64>,
    /// 1-sigma uncertainty of `v`.
    pub dv: Vec<f64>,
    /// Points to keep; `None` keeps every point with finite intensity.
    pub mask: Option<Vec<bool>>,
    /// Detector bank of each point.
    pub bank: Vec<usize>,
    /// Precomputed Q; derived from angle and wavelength when absent.
    pub q: Option<Vec<f64>>,
    /// Precomputed Q resolution; derived from the resolutions when absent.
    pub dq: Option<Vec<f64>>,
    pub environment: BTreeMap<String, Environment>,
}

impl Default for MeasurementRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            entry: String::new(),
            polarization: String::new(),
            formula: String::new(),
            intent: Intent::default(),
            norm_basis: NormBasis::default(),
            start_time: None,
            sample_angle: Vec::new(),
            detector_angle: Vec::new(),
            angular_resolution: Vec::new(),
            wavelength: Vec::new(),
            wavelength_resolution: Vec::new(),
            slit1: vec![0.0],
            slit2: vec![0.0],
            monitor: Vec::new(),
            count_time: Vec::new(),
            v: Vec::new(),
            dv: Vec::new(),
            mask: None,
            bank: vec![0],
            q: None,
            dq: None,
            environment: BTreeMap::new(),
        }
    }
}

/// Expands `values` to length `n`, repeating a single value.
pub fn broadcast<T: Copy>(values: &[T], n: usize, field: &str, record: &str) -> Result<Vec<T>> {
    match values.len() {
        len if len == n => Ok(values.to_vec()),
        1 => Ok(vec![values[0]; n]),
        found => Err(Error::ColumnLengthMismatch {
            field: field.to_string(),
            record: record.to_string(),
            expected: n,
            found,
        }),
    }
}

impl MeasurementRecord {
    /// Creates an empty record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of points, set by the intensity vector.
    #[must_use]
    pub fn points(&self) -> usize {
        self.v.len()
    }

    /// Name and cross section, used in error messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.polarization)
    }

    /// Number of detector banks.
    #[must_use]
    pub fn bank_count(&self) -> usize {
        self.bank.iter().copied().max().map_or(1, |bank| bank + 1)
    }

    /// Per-point detector bank.
    pub fn banks(&self) -> Result<Vec<usize>> {
        broadcast(&self.bank, self.points(), "bank", &self.label())
    }

    /// Per-point keep mask: the explicit mask, or finite intensities.
    pub fn point_mask(&self) -> Result<Vec<bool>> {
        match &self.mask {
            Some(mask) => broadcast(mask, self.points(), "mask", &self.label()),
            None => Ok(self.v.iter().map(|v| v.is_finite()).collect()),
        }
    }

    /// Per-point values of a fixed column.
    pub fn column(&self, column: Column) -> Result<Vec<f64>> {
        let values = match column {
            Column::SampleAngle => &self.sample_angle,
            Column::DetectorAngle => &self.detector_angle,
            Column::AngularResolution => &self.angular_resolution,
            Column::Wavelength => &self.wavelength,
            Column::WavelengthResolution => &self.wavelength_resolution,
            Column::Slit1 => &self.slit1,
            Column::Slit2 => &self.slit2,
            Column::Q => return self.q_values(),
            Column::QResolution => return self.dq_values(),
            Column::Intensity => &self.v,
            Column::IntensityError => &self.dv,
            Column::CountTime => &self.count_time,
            Column::Monitor => &self.monitor,
        };
        broadcast(values, self.points(), column.name(), &self.label())
    }

    /// Q for each point, `4π/L·sin(Ti)` unless precomputed.
    pub fn q_values(&self) -> Result<Vec<f64>> {
        let n = self.points();
        if let Some(q) = &self.q {
            return broadcast(q, n, "Q", &self.label());
        }
        let theta = self.column(Column::SampleAngle)?;
        let wavelength = self.column(Column::Wavelength)?;
        Ok(theta
            .iter()
            .zip(&wavelength)
            .map(|(&t, &l)| q_from(t, l))
            .collect())
    }

    /// Q resolution for each point unless precomputed.
    pub fn dq_values(&self) -> Result<Vec<f64>> {
        let n = self.points();
        if let Some(dq) = &self.dq {
            return broadcast(dq, n, "dQ", &self.label());
        }
        let theta = self.column(Column::SampleAngle)?;
        let dtheta = self.column(Column::AngularResolution)?;
        let wavelength = self.column(Column::Wavelength)?;
        let dwavelength = self.column(Column::WavelengthResolution)?;
        Ok((0..n)
            .map(|i| dq_from(theta[i], dtheta[i], wavelength[i], dwavelength[i]))
            .collect())
    }

    /// Shifts the sample angle by `offset` and the detector angle the other way.
    pub fn apply_theta_offset(&mut self, offset: f64) {
        self.sample_angle.iter_mut().for_each(|t| *t += offset);
        self.detector_angle.iter_mut().for_each(|t| *t -= offset);
        self.q = None;
    }

    /// Flips both angles for points measured at negative sample angle.
    ///
    /// Single angles are broadcast to the point count first; any other
    /// length is a [`Error::ColumnLengthMismatch`] and leaves the record
    /// untouched.
    pub fn apply_absolute_angle(&mut self) -> Result<()> {
        if !self.sample_angle.iter().any(|&t| t < 0.0) {
            return Ok(());
        }
        let mut sample = self.column(Column::SampleAngle)?;
        let mut detector = self.column(Column::DetectorAngle)?;
        for (ti, td) in sample.iter_mut().zip(&mut detector) {
            if *ti < 0.0 {
                *ti = -*ti;
                *td = -*td;
            }
        }
        self.sample_angle = sample;
        self.detector_angle = detector;
        self.q = None;
        Ok(())
    }

    /// Flips the sign of both angles for back reflection geometry.
    pub fn apply_back_reflection(&mut self) {
        self.sample_angle.iter_mut().for_each(|t| *t = -*t);
        self.detector_angle.iter_mut().for_each(|t| *t = -*t);
        self.q = None;
    }
}
