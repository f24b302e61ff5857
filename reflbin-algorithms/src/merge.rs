//! Tolerance merge: collapses runs of sorted points taken at the same
//! instrument configuration.
//!
//! The scan keeps a run anchor and compares every following point against
//! the anchor only. Widths are fractions of the anchor's own resolution, so
//! a run can drift no further than one window from where it started.

use log::debug;
use reflbin_core::{
    Column, ColumnBundle, CombineStatistics, Error, Intent, MergeConfig, NormBasis,
    PoissonAccumulator, PointCombiner, Result,
};
use std::ops::Range;

/// Merges adjacent points whose geometry agrees within tolerance.
#[derive(Clone, Debug)]
pub struct ToleranceMerge {
    config: MergeConfig,
    intent: Intent,
}

impl ToleranceMerge {
    /// Creates a merge for data taken with the given scan intent.
    #[must_use]
    pub fn new(config: MergeConfig, intent: Intent) -> Self {
        Self { config, intent }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Returns the scan intent.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// True if point `i` belongs to the run anchored at `anchor`.
    fn same_configuration(&self, bundle: &ColumnBundle, anchor: usize, i: usize) -> bool {
        let q_tol = self.config.q_tolerance;
        let dq_tol = self.config.dq_tolerance;
        let t_width = q_tol * bundle.dt[anchor];
        let l_width = q_tol * bundle.dl[anchor];
        let dt_width = dq_tol * bundle.dt[anchor];
        let dl_width = dq_tol * bundle.dl[anchor];

        // <= so that zero tolerance still joins exact duplicates
        let close = |values: &[f64], width: f64| (values[i] - values[anchor]).abs() <= width;

        let resolution = close(&bundle.dt, dt_width)
            && close(&bundle.dl, dl_width)
            && close(&bundle.l, l_width);
        if self.intent.is_slit() {
            resolution
        } else {
            resolution && close(&bundle.ti, t_width) && close(&bundle.td, t_width)
        }
    }

    /// Merges a bundle already ordered by the intent's sort keys.
    ///
    /// Single-point runs are copied unchanged. Longer runs combine `v`/`dv`
    /// with the Poisson average, sum `time` and `monitor`, and take the
    /// weighted mean of every other column.
    pub fn merge(&self, bundle: &ColumnBundle, basis: NormBasis) -> Result<ColumnBundle> {
        Ok(self.merge_with_stats(bundle, basis)?.0)
    }

    /// Like [`merge`](Self::merge), also returning point counts.
    pub fn merge_with_stats(
        &self,
        bundle: &ColumnBundle,
        basis: NormBasis,
    ) -> Result<(ColumnBundle, CombineStatistics)> {
        let n = bundle.len();
        let mut out = bundle.empty_like(n);
        let mut anchor = 0;

        // one past the end flushes the final run
        for i in 1..=n {
            if i < n && self.same_configuration(bundle, anchor, i) {
                continue;
            }
            if i == anchor + 1 {
                out.push_row(bundle, anchor);
            } else {
                self.combine_run(bundle, anchor..i, basis, &mut out)?;
            }
            anchor = i;
        }

        let stats = CombineStatistics {
            points_in: n,
            points_out: out.len(),
            discarded: 0,
        };
        debug!(
            "merged {} points into {} ({} intent, {} weight)",
            stats.points_in,
            stats.points_out,
            self.intent,
            self.config.weight.column(basis)
        );
        Ok((out, stats))
    }

    fn combine_run(
        &self,
        bundle: &ColumnBundle,
        run: Range<usize>,
        basis: NormBasis,
        out: &mut ColumnBundle,
    ) -> Result<()> {
        let weight_column = self.config.weight.column(basis);
        let weights = &bundle.column(weight_column)[run.clone()];
        if let Some(k) = weights.iter().position(|&w| w <= 0.0 || !w.is_finite()) {
            return Err(Error::NonPositiveWeight {
                column: weight_column.name(),
                index: run.start + k,
                weight: weights[k],
            });
        }
        let total: f64 = weights.iter().sum();
        let mean = |values: &[f64]| {
            values[run.clone()]
                .iter()
                .zip(weights)
                .map(|(x, w)| x * w)
                .sum::<f64>()
                / total
        };

        let mut acc = PoissonAccumulator::new(basis);
        for k in run.clone() {
            acc.add(bundle.v[k], bundle.dv[k]);
        }
        let (v, dv) = acc.finish();

        for column in Column::ALL {
            let value = match column {
                Column::Intensity => v,
                Column::IntensityError => dv,
                summed if summed.is_total() => bundle.column(summed)[run.clone()].iter().sum(),
                other => mean(bundle.column(other)),
            };
            out.column_mut(column).push(value);
        }
        for (name, values) in &mut out.environment {
            if let Some(source) = bundle.environment.get(name) {
                values.push(mean(source));
            }
        }
        Ok(())
    }
}

impl Default for ToleranceMerge {
    fn default() -> Self {
        Self::new(MergeConfig::default(), Intent::default())
    }
}

impl PointCombiner for ToleranceMerge {
    fn combine(&self, bundle: &ColumnBundle, basis: NormBasis) -> Result<ColumnBundle> {
        self.merge(bundle, basis)
    }

    fn name(&self) -> &'static str {
        "ToleranceMerge"
    }
}
