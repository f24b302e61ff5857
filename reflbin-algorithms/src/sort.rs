//! Lexicographic point sorting.
//!
//! Keys follow the multi-key sort convention where the last key listed is
//! the primary key. The sort is stable, so ties keep their original order.

use reflbin_core::{Column, ColumnBundle, Result};
use std::cmp::Ordering;

/// Stable permutation ordering the bundle by `keys`, last key primary.
#[must_use]
pub fn sort_order(bundle: &ColumnBundle, keys: &[Column]) -> Vec<usize> {
    let columns: Vec<&[f64]> = keys.iter().rev().map(|&key| bundle.column(key)).collect();
    let mut index: Vec<usize> = (0..bundle.len()).collect();
    index.sort_by(|&a, &b| {
        columns
            .iter()
            .map(|values| values[a].total_cmp(&values[b]))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    index
}

/// Reorders every column of the bundle by `keys`.
#[must_use]
pub fn sort_bundle(bundle: &ColumnBundle, keys: &[Column]) -> ColumnBundle {
    bundle.select(&sort_order(bundle, keys))
}

/// Reorders the bundle by column names such as `["dT", "dL", "L"]`.
///
/// Fails with [`reflbin_core::Error::UnknownSortKey`] before any reordering
/// if a name is not a fixed column.
pub fn sort_bundle_by_names<S: AsRef<str>>(
    bundle: &ColumnBundle,
    names: &[S],
) -> Result<ColumnBundle> {
    let keys = names
        .iter()
        .map(|name| Column::from_name(name.as_ref()))
        .collect::<Result<Vec<Column>>>()?;
    Ok(sort_bundle(bundle, &keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflbin_core::{Error, Intent};

    #[allow(clippy::cast_precision_loss)]
    fn bundle(l: &[f64], dt: &[f64], ti: &[f64]) -> ColumnBundle {
        let mut bundle = ColumnBundle::with_capacity(l.len(), &[] as &[&str]);
        for i in 0..l.len() {
            for column in Column::ALL {
                let value = match column {
                    Column::Wavelength => l[i],
                    Column::AngularResolution => dt[i],
                    Column::SampleAngle => ti[i],
                    Column::Intensity => i as f64,
                    _ => 0.0,
                };
                bundle.column_mut(column).push(value);
            }
        }
        bundle
    }

    #[test]
    fn test_last_key_is_primary() {
        let data = bundle(&[5.0, 4.0, 5.0, 4.0], &[0.2, 0.1, 0.1, 0.2], &[0.0; 4]);
        let sorted = sort_bundle(&data, &[Column::AngularResolution, Column::Wavelength]);
        assert_eq!(sorted.l, vec![4.0, 4.0, 5.0, 5.0]);
        assert_eq!(sorted.dt, vec![0.1, 0.2, 0.1, 0.2]);
        assert_eq!(sorted.v, vec![1.0, 3.0, 2.0, 0.0]);
    }

    #[test]
    fn test_stable_for_ties() {
        let data = bundle(&[1.0; 4], &[0.1; 4], &[0.0; 4]);
        let sorted = sort_bundle(&data, Intent::Specular.sort_keys());
        assert_eq!(sorted.v, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_intent_keys_group_wavelength_first() {
        let data = bundle(&[5.0, 4.0, 5.0], &[0.1; 3], &[2.0, 1.0, 1.0]);
        let sorted = sort_bundle(&data, Intent::Specular.sort_keys());
        assert_eq!(sorted.l, vec![4.0, 5.0, 5.0]);
        assert_eq!(sorted.ti, vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sort_by_names() {
        let data = bundle(&[2.0, 1.0], &[0.1; 2], &[0.0; 2]);
        let sorted = sort_bundle_by_names(&data, &["dT", "L"]).unwrap();
        assert_eq!(sorted.l, vec![1.0, 2.0]);
        assert_eq!(
            sort_bundle_by_names(&data, &["dT", "theta"]),
            Err(Error::UnknownSortKey("theta".to_string()))
        );
    }
}
