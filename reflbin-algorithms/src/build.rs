//! Turns combined columns back into a measurement record.

use reflbin_core::{ColumnBundle, Environment, MeasurementRecord};

/// Formula for a record joined from `group`.
///
/// Returns the common prefix of the group's formulas followed by the
/// differing suffixes, as in `"Si<1,2,3>"`. A common prefix of two
/// characters or fewer is not worth factoring out and is dropped.
#[must_use]
pub fn join_formula(group: &[MeasurementRecord]) -> String {
    let Some(head) = group.first() else {
        return String::new();
    };
    let head_chars: Vec<char> = head.formula.chars().collect();
    let mut prefix = 0;
    if group.len() > 1 {
        prefix = group[1..].iter().fold(head_chars.len(), |common, data| {
            data.formula
                .chars()
                .zip(&head_chars)
                .take(common)
                .take_while(|(a, b)| a == *b)
                .count()
        });
    }
    if prefix <= 2 {
        prefix = 0;
    }

    let common: String = head_chars[..prefix].iter().collect();
    let suffixes: Vec<String> = group
        .iter()
        .map(|data| data.formula.chars().skip(prefix).collect())
        .collect();
    format!("{common}<{}>", suffixes.join(","))
}

/// Builds a record from combined columns.
///
/// Metadata is taken from the head of the group. Q and its resolution are
/// stored explicitly since the combined values are not recomputable from
/// the averaged angle and wavelength. The start time is cleared and the
/// record carries no mask. Environment fields keep the head's units.
#[must_use]
pub fn build_record(
    group: &[MeasurementRecord],
    columns: ColumnBundle,
    bank: usize,
) -> MeasurementRecord {
    let head = group.first().cloned().unwrap_or_default();
    let formula = if group.len() > 1 {
        join_formula(group)
    } else {
        head.formula.clone()
    };

    let environment = columns
        .environment
        .into_iter()
        .map(|(name, average)| {
            let units = head
                .environment
                .get(&name)
                .map(|env| env.units.clone())
                .unwrap_or_default();
            (name, Environment::new(units, average))
        })
        .collect();

    MeasurementRecord {
        name: head.name,
        entry: head.entry,
        polarization: head.polarization,
        formula,
        intent: head.intent,
        norm_basis: head.norm_basis,
        start_time: None,
        sample_angle: columns.ti,
        detector_angle: columns.td,
        angular_resolution: columns.dt,
        wavelength: columns.l,
        wavelength_resolution: columns.dl,
        slit1: columns.s1,
        slit2: columns.s2,
        monitor: columns.monitor,
        count_time: columns.time,
        v: columns.v,
        dv: columns.dv,
        mask: None,
        bank: vec![bank],
        q: Some(columns.q),
        dq: Some(columns.dq),
        environment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflbin_core::{Column, Intent};

    fn named(formula: &str) -> MeasurementRecord {
        MeasurementRecord {
            formula: formula.to_string(),
            ..MeasurementRecord::new(formula)
        }
    }

    #[test]
    fn test_join_formula_common_prefix() {
        let group = vec![named("NiTi_run1"), named("NiTi_run2"), named("NiTi_run10")];
        assert_eq!(join_formula(&group), "NiTi_run<1,2,10>");
    }

    #[test]
    fn test_join_formula_short_prefix_dropped() {
        let group = vec![named("SiO"), named("SiN")];
        assert_eq!(join_formula(&group), "<SiO,SiN>");
    }

    #[test]
    fn test_join_formula_prefix_limited_by_shortest() {
        let group = vec![named("sample"), named("sample_b")];
        assert_eq!(join_formula(&group), "sample<,_b>");
    }

    #[test]
    fn test_build_record_from_columns() {
        let mut head = named("d2o");
        head.intent = Intent::Specular;
        head.start_time = Some(1.0e9);
        head.environment.insert(
            "temperature".to_string(),
            Environment::new("K", vec![300.0]),
        );

        let mut columns = ColumnBundle::with_capacity(2, &["temperature"]);
        for column in Column::ALL {
            columns.column_mut(column).extend([1.0, 2.0]);
        }
        columns
            .environment
            .get_mut("temperature")
            .unwrap()
            .extend([300.0, 301.0]);

        let data = build_record(&[head], columns, 1);
        assert_eq!(data.formula, "d2o");
        assert_eq!(data.points(), 2);
        assert_eq!(data.start_time, None);
        assert_eq!(data.bank, vec![1]);
        assert_eq!(data.q_values().unwrap(), vec![1.0, 2.0]);
        assert_eq!(data.environment["temperature"].units, "K");
        assert_eq!(data.environment["temperature"].average, vec![300.0, 301.0]);
    }
}
