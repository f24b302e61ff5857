//! Q rebinning onto a fixed edge grid.
//!
//! Combined values per bin, with unit weights `<x> = Σx/n`:
//!
//! ```text
//! [q]   = <q>
//! [Δq]² = <Δq² + q²> - [q]²
//! [λ]   = 1/<1/λ>
//! [Δλ]² = <Δλ² + λ²> - <λ>²
//! [θ]   = arcsin([q][λ]/4π)
//! [Δθ]² = <Δθ²>
//! ```
//!
//! With an angle offset δ the reported Q is `4π/[λ]·sin([θ] + δ)`. With a
//! sample broadening ω, `[Δq]² += ([q]/tan[θ])²·(2ω[Δθ] + ω²)` and
//! `[Δθ] += ω`.

use log::debug;
use reflbin_core::resolution::{q_from, theta_from, FOUR_PI};
use reflbin_core::{
    BinEdges, Column, ColumnBundle, CombineStatistics, NormBasis, PoissonAccumulator,
    PointCombiner, RebinConfig, Result,
};

/// Unit-weight mean of `f` over the points of one bin.
#[allow(clippy::cast_precision_loss)]
fn average(members: &[usize], f: impl Fn(usize) -> f64) -> f64 {
    members.iter().map(|&i| f(i)).sum::<f64>() / members.len() as f64
}

/// Combines points falling in the same Q bin.
#[derive(Clone, Debug)]
pub struct QRebin {
    edges: BinEdges,
    config: RebinConfig,
}

impl QRebin {
    /// Creates a rebinner for the given edges and corrections.
    #[must_use]
    pub fn new(edges: BinEdges, config: RebinConfig) -> Self {
        Self { edges, config }
    }

    /// Returns the bin edges.
    #[must_use]
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RebinConfig {
        &self.config
    }

    /// Indices of the points in each bin, in input order.
    fn assign(&self, q: &[f64]) -> (Vec<Vec<usize>>, usize) {
        let mut members = vec![Vec::new(); self.edges.bin_count()];
        let mut outside = 0;
        for (i, &value) in q.iter().enumerate() {
            match self.edges.bin_index(value) {
                Some(bin) => members[bin].push(i),
                None => outside += 1,
            }
        }
        (members, outside)
    }

    /// Rebins a flattened single-bank bundle.
    ///
    /// Produces one point per occupied bin in increasing Q. Points outside
    /// the edges and points in sentinel bins are discarded.
    #[must_use]
    pub fn rebin(&self, bundle: &ColumnBundle, basis: NormBasis) -> ColumnBundle {
        self.rebin_with_stats(bundle, basis).0
    }

    /// Like [`rebin`](Self::rebin), also returning point counts.
    #[must_use]
    pub fn rebin_with_stats(
        &self,
        bundle: &ColumnBundle,
        basis: NormBasis,
    ) -> (ColumnBundle, CombineStatistics) {
        let (members, mut discarded) = self.assign(&bundle.q);
        let mut out = bundle.empty_like(members.len());

        for (bin, points) in members.iter().enumerate() {
            if points.is_empty() {
                continue;
            }
            if self.edges.is_sentinel(bin) {
                discarded += points.len();
                continue;
            }
            self.combine_bin(bundle, points, basis, &mut out);
        }

        let stats = CombineStatistics {
            points_in: bundle.len(),
            points_out: out.len(),
            discarded,
        };
        debug!(
            "rebinned {} points into {} of {} bins, {} discarded",
            stats.points_in,
            stats.points_out,
            self.edges.bin_count(),
            stats.discarded
        );
        (out, stats)
    }

    fn combine_bin(
        &self,
        bundle: &ColumnBundle,
        points: &[usize],
        basis: NormBasis,
        out: &mut ColumnBundle,
    ) {
        let mut acc = PoissonAccumulator::new(basis);
        for &i in points {
            acc.add(bundle.v[i], bundle.dv[i]);
        }
        let (v, dv) = acc.finish();

        let q_bar = average(points, |i| bundle.q[i]);
        let q_second = average(points, |i| bundle.dq[i].powi(2) + bundle.q[i].powi(2));
        let mut dq = (q_second - q_bar * q_bar).max(0.0).sqrt();

        let wavelength = 1.0 / average(points, |i| 1.0 / bundle.l[i]);
        let l_mean = average(points, |i| bundle.l[i]);
        let l_second = average(points, |i| bundle.dl[i].powi(2) + bundle.l[i].powi(2));
        let dwavelength = (l_second - l_mean * l_mean).max(0.0).sqrt();

        let theta_bar = theta_from(q_bar, wavelength);
        let dtheta_bar = average(points, |i| bundle.dt[i].powi(2)).sqrt();

        let mut q = q_bar;
        let mut theta = theta_bar;
        let mut dtheta = dtheta_bar;
        if let Some(offset) = self.config.theta_offset {
            theta += offset;
            q = q_from(theta, wavelength);
        }
        if let Some(broadening) = self.config.sample_broadening {
            // q/tan(θ) written so that it stays finite at θ = 0
            let slope = FOUR_PI / wavelength * theta_bar.to_radians().cos();
            let omega = broadening.to_radians();
            let extra = slope * slope * (2.0 * omega * dtheta_bar.to_radians() + omega * omega);
            dq = (dq * dq + extra).max(0.0).sqrt();
            dtheta += broadening;
        }

        for column in Column::ALL {
            let value = match column {
                Column::Q => q,
                Column::QResolution => dq,
                Column::Intensity => v,
                Column::IntensityError => dv,
                Column::SampleAngle => theta,
                Column::AngularResolution => dtheta,
                Column::Wavelength => wavelength,
                Column::WavelengthResolution => dwavelength,
                summed if summed.is_total() => {
                    let values = bundle.column(summed);
                    points.iter().map(|&i| values[i]).sum()
                }
                other => {
                    let values = bundle.column(other);
                    average(points, |i| values[i])
                }
            };
            out.column_mut(column).push(value);
        }
        for (name, values) in &mut out.environment {
            if let Some(source) = bundle.environment.get(name) {
                values.push(average(points, |i| source[i]));
            }
        }
    }
}

impl PointCombiner for QRebin {
    fn combine(&self, bundle: &ColumnBundle, basis: NormBasis) -> Result<ColumnBundle> {
        Ok(self.rebin(bundle, basis))
    }

    fn name(&self) -> &'static str {
        "QRebin"
    }
}
