//! Point combination traits and statistics.

use crate::bundle::ColumnBundle;
use crate::error::Result;
use crate::intent::NormBasis;

/// Counts from one combination pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineStatistics {
    /// Points offered to the combiner.
    pub points_in: usize,
    /// Points produced.
    pub points_out: usize,
    /// Input points that fell outside every output group.
    pub discarded: usize,
}

impl CombineStatistics {
    /// Input points per output point, or zero when nothing was produced.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction(&self) -> f64 {
        if self.points_out == 0 {
            0.0
        } else {
            self.points_in as f64 / self.points_out as f64
        }
    }
}

/// Trait for algorithms that collapse a sorted bundle into fewer points.
///
/// Implementations read only their arguments, so one combiner may be shared
/// between threads working on different bundles.
pub trait PointCombiner: Send + Sync {
    /// Combines the points of `bundle`, whose intensities were normalized by
    /// `basis`.
    fn combine(&self, bundle: &ColumnBundle, basis: NormBasis) -> Result<ColumnBundle>;

    /// Returns the name of the algorithm.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction() {
        let stats = CombineStatistics {
            points_in: 12,
            points_out: 4,
            discarded: 0,
        };
        assert!((stats.reduction() - 3.0).abs() < f64::EPSILON);
        assert!(CombineStatistics::default().reduction().abs() < f64::EPSILON);
    }
}
