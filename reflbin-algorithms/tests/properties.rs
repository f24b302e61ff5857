#![allow(
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::unreadable_literal
)]
use reflbin_algorithms::{extract_columns, sort_bundle, QRebin, ToleranceMerge};
use reflbin_core::{
    BinEdges, ColumnBundle, Environment, Intent, MeasurementRecord, MergeConfig, NormBasis,
    RebinConfig,
};

/// Synthetic scan with repeated angles and whole-number totals, so sums are
/// exact in any order.
fn synthetic_scan(n: usize, seed: u64) -> MeasurementRecord {
    let mut rng_seed = seed;
    let mut rand = || {
        rng_seed = (rng_seed.wrapping_mul(1103515245).wrapping_add(12345)) & 0x7fffffff;
        rng_seed
    };

    let mut data = MeasurementRecord::new("synthetic");
    for _ in 0..n {
        let step = (rand() % 40) as f64;
        data.sample_angle.push(0.1 + 0.05 * step);
        data.detector_angle.push(0.2 + 0.1 * step);
        data.angular_resolution.push(0.01);
        data.wavelength.push(4.75);
        data.wavelength_resolution.push(0.02);
        data.monitor.push((1000 + rand() % 9000) as f64);
        data.count_time.push((1 + rand() % 60) as f64);
        let counts = (rand() % 500) as f64;
        data.v.push(counts / 1000.0);
        data.dv.push(counts.max(1.0).sqrt() / 1000.0);
    }
    data.environment.insert(
        "temperature".to_string(),
        Environment::new("K", vec![295.0]),
    );
    data
}

fn sorted_bundle(seed: u64) -> ColumnBundle {
    let bundle = extract_columns(&[synthetic_scan(400, seed)], None).unwrap();
    sort_bundle(&bundle, Intent::Specular.sort_keys())
}

fn total(values: &[f64]) -> f64 {
    values.iter().sum()
}

#[test]
fn test_merge_output_uniform_and_totals_exact() {
    for seed in [1, 7, 42] {
        let bundle = sorted_bundle(seed);
        let merged = ToleranceMerge::new(MergeConfig::default(), Intent::Specular)
            .merge(&bundle, NormBasis::Monitor)
            .unwrap();
        assert!(merged.is_uniform());
        assert!(merged.len() <= 40);
        assert_eq!(total(&merged.monitor), total(&bundle.monitor));
        assert_eq!(total(&merged.time), total(&bundle.time));
        assert_eq!(merged.environment["temperature"].len(), merged.len());
    }
}

#[test]
fn test_merge_idempotent_on_random_scan() {
    let merger = ToleranceMerge::new(MergeConfig::default(), Intent::Specular);
    let once = merger.merge(&sorted_bundle(3), NormBasis::Monitor).unwrap();
    let again = merger
        .merge(&sort_bundle(&once, Intent::Specular.sort_keys()), NormBasis::Monitor)
        .unwrap();
    assert_eq!(once, again);
}

#[test]
fn test_rebin_output_uniform_and_totals_exact() {
    let bundle = sorted_bundle(11);
    let q_max = bundle.q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let centers = reflbin_core::linear_centers(0.0, q_max + 0.01, 0.005);
    let edges = BinEdges::from_centers(&centers, true).unwrap();

    let (binned, stats) =
        QRebin::new(edges, RebinConfig::default()).rebin_with_stats(&bundle, NormBasis::Time);
    assert!(binned.is_uniform());
    assert_eq!(stats.discarded, 0);
    assert_eq!(total(&binned.monitor), total(&bundle.monitor));
    assert_eq!(total(&binned.time), total(&bundle.time));
    assert!(binned.q.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_zero_tolerance_keeps_distinct_points() {
    let bundle = sorted_bundle(5);
    let merger = ToleranceMerge::new(MergeConfig::exact(), Intent::Specular);
    let merged = merger.merge(&bundle, NormBasis::Monitor).unwrap();
    // Angles repeat on a 40-step grid, so exact duplicates collapse
    // to exactly one point per distinct angle.
    let mut angles = bundle.ti.clone();
    angles.dedup();
    assert_eq!(merged.len(), angles.len());
}
