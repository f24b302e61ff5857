//! Column extraction: flattens a group of records into one bundle.

use log::{debug, warn};
use reflbin_core::record::broadcast;
use reflbin_core::units::convert;
use reflbin_core::{Column, ColumnBundle, Error, MeasurementRecord, Result};

/// Checks that every record in the group shares the head's normalization.
pub fn check_norm_basis(group: &[MeasurementRecord]) -> Result<()> {
    let head = group.first().ok_or(Error::EmptyGroup)?;
    match group.iter().find(|data| data.norm_basis != head.norm_basis) {
        Some(data) => Err(Error::MixedNormBasis {
            record: data.label(),
            expected: head.norm_basis.to_string(),
            found: data.norm_basis.to_string(),
        }),
        None => Ok(()),
    }
}

/// Environment fields present in every record, converted to the head's units.
///
/// Returns one entry per surviving field with one value vector per record.
fn environment_columns(group: &[MeasurementRecord]) -> Vec<(String, Vec<Vec<f64>>)> {
    let Some(head) = group.first() else {
        return Vec::new();
    };
    let mut columns = Vec::with_capacity(head.environment.len());
    'fields: for (name, reference) in &head.environment {
        let mut parts = Vec::with_capacity(group.len());
        for data in group {
            let Some(env) = data.environment.get(name) else {
                debug!("dropping environment field {name}: missing from {}", data.label());
                continue 'fields;
            };
            let Some(values) = convert(&env.average, &env.units, &reference.units) else {
                warn!(
                    "dropping environment field {name}: cannot convert {} to {} in {}",
                    env.units,
                    reference.units,
                    data.label()
                );
                continue 'fields;
            };
            parts.push(values);
        }
        columns.push((name.clone(), parts));
    }
    columns
}

/// Gathers the columns of `group` into a single bundle.
///
/// Scalars and length-1 vectors are broadcast to each record's point count,
/// records are concatenated in order, and each record's mask is applied
/// (finite intensities when it has none). With `bank`, only points from
/// that detector bank are kept.
///
/// Fails without returning a partial bundle if any field length is
/// inconsistent or the records are normalized differently.
pub fn extract_columns(group: &[MeasurementRecord], bank: Option<usize>) -> Result<ColumnBundle> {
    check_norm_basis(group)?;
    let environment = environment_columns(group);
    let names: Vec<&str> = environment.iter().map(|(name, _)| name.as_str()).collect();
    let total: usize = group.iter().map(MeasurementRecord::points).sum();
    let mut bundle = ColumnBundle::with_capacity(total, &names);

    for (k, data) in group.iter().enumerate() {
        let n = data.points();
        let label = data.label();

        let mut part = ColumnBundle::with_capacity(n, &names);
        for column in Column::ALL {
            *part.column_mut(column) = data.column(column)?;
        }
        for (name, parts) in &environment {
            let values = broadcast(&parts[k], n, name, &label)?;
            part.environment.insert(name.clone(), values);
        }

        let mut keep = data.point_mask()?;
        if let Some(bank) = bank {
            let banks = data.banks()?;
            keep.iter_mut()
                .zip(&banks)
                .for_each(|(keep, &b)| *keep &= b == bank);
        }
        bundle.append(&part.filter(&keep));
    }

    debug!(
        "extracted {} of {} points from {} record(s)",
        bundle.len(),
        total,
        group.len()
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflbin_core::{Environment, NormBasis};

    fn record(name: &str, ti: Vec<f64>) -> MeasurementRecord {
        let n = ti.len();
        MeasurementRecord {
            sample_angle: ti,
            detector_angle: vec![0.0],
            angular_resolution: vec![0.01],
            wavelength: vec![4.75],
            wavelength_resolution: vec![0.02],
            monitor: vec![100.0],
            count_time: vec![1.0],
            v: vec![1.0; n],
            dv: vec![0.1; n],
            ..MeasurementRecord::new(name)
        }
    }

    #[test]
    fn test_concatenates_and_broadcasts() {
        let group = vec![record("a", vec![1.0, 2.0]), record("b", vec![3.0])];
        let bundle = extract_columns(&group, None).unwrap();
        assert_eq!(bundle.len(), 3);
        assert!(bundle.is_uniform());
        assert_eq!(bundle.ti, vec![1.0, 2.0, 3.0]);
        assert_eq!(bundle.monitor, vec![100.0; 3]);
    }

    #[test]
    fn test_masks_applied_per_record() {
        let mut a = record("a", vec![1.0, 2.0]);
        a.v[0] = f64::INFINITY;
        let mut b = record("b", vec![3.0, 4.0]);
        b.mask = Some(vec![false, true]);
        let bundle = extract_columns(&[a, b], None).unwrap();
        assert_eq!(bundle.ti, vec![2.0, 4.0]);
    }

    #[test]
    fn test_length_mismatch_aborts() {
        let mut bad = record("b", vec![1.0, 2.0, 3.0]);
        bad.wavelength = vec![4.0, 5.0];
        let err = extract_columns(&[record("a", vec![1.0]), bad], None).unwrap_err();
        assert_eq!(
            err,
            Error::ColumnLengthMismatch {
                field: "L".to_string(),
                record: "b".to_string(),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_missing_required_field_named() {
        let mut bad = record("b", vec![1.0, 2.0]);
        bad.detector_angle = Vec::new();
        let err = extract_columns(&[bad], None).unwrap_err();
        assert_eq!(
            err,
            Error::ColumnLengthMismatch {
                field: "Td".to_string(),
                record: "b".to_string(),
                expected: 2,
                found: 0,
            }
        );

        let mut sparse = MeasurementRecord::new("c");
        sparse.v = vec![1.0];
        assert!(matches!(
            extract_columns(&[sparse], None),
            Err(Error::ColumnLengthMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn test_mixed_norm_basis() {
        let a = record("a", vec![1.0]);
        let mut b = record("b", vec![2.0]);
        b.norm_basis = NormBasis::Time;
        assert!(matches!(
            extract_columns(&[a, b], None),
            Err(Error::MixedNormBasis { .. })
        ));
        assert_eq!(extract_columns(&[], None), Err(Error::EmptyGroup));
    }

    #[test]
    fn test_environment_kept_only_when_everywhere() {
        let mut a = record("a", vec![1.0, 2.0]);
        let mut b = record("b", vec![3.0]);
        a.environment
            .insert("temperature".into(), Environment::new("K", vec![300.0]));
        b.environment
            .insert("temperature".into(), Environment::new("degC", vec![26.85]));
        a.environment
            .insert("field".into(), Environment::new("T", vec![1.0, 2.0]));
        let bundle = extract_columns(&[a, b], None).unwrap();
        assert!(bundle.environment.get("field").is_none());
        let temperature = &bundle.environment["temperature"];
        assert_eq!(temperature.len(), 3);
        assert!((temperature[2] - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_bank_selection() {
        let mut a = record("a", vec![1.0, 2.0, 3.0]);
        a.bank = vec![0, 1, 0];
        let bundle = extract_columns(&[a], Some(1)).unwrap();
        assert_eq!(bundle.ti, vec![2.0]);
    }
}
