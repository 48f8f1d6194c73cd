//! Property tests for the statistics reducer.
//!
//! Covers:
//! - repetition 0 never influences min/avg/max
//! - min <= avg <= max over the retained samples
//! - best rate equals bytes * 1e-6 / min_time for every kernel

use membench_kernels::{summarize, KernelSet, TimingMatrix, WorkspaceLayout};
use proptest::prelude::*;

fn timing_rows(kernels: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..=12).prop_flat_map(move |ntimes| {
        prop::collection::vec(prop::collection::vec(1e-6f64..10.0, ntimes), kernels)
    })
}

// ── warm-up exclusion ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_warm_up_sample_never_read(
        rows in timing_rows(4),
        warm_up in prop::collection::vec(0.0f64..1e6, 4),
    ) {
        let set = KernelSet::new(&WorkspaceLayout::primary(1000, 0), 8);
        let baseline = summarize(&set, TimingMatrix::from_rows(rows.clone()).unwrap());

        let mut perturbed = rows;
        for (row, w) in perturbed.iter_mut().zip(&warm_up) {
            row[0] = *w;
        }
        let stats = summarize(&set, TimingMatrix::from_rows(perturbed).unwrap());
        prop_assert_eq!(baseline, stats);
    }

    #[test]
    fn prop_min_avg_max_ordered(rows in timing_rows(4)) {
        let set = KernelSet::new(&WorkspaceLayout::primary(1000, 0), 4);
        for s in summarize(&set, TimingMatrix::from_rows(rows).unwrap()) {
            prop_assert!(s.min_time <= s.avg_time, "{:?}", s);
            prop_assert!(s.avg_time <= s.max_time, "{:?}", s);
        }
    }
}

// ── bandwidth formula ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_best_rate_matches_formula(
        n in 1usize..50_000_000,
        wide in any::<bool>(),
        rows in timing_rows(4),
    ) {
        let elem = if wide { 8 } else { 4 };
        let set = KernelSet::new(&WorkspaceLayout::primary(n, 0), elem);
        let stats = summarize(&set, TimingMatrix::from_rows(rows).unwrap());
        for (s, factor) in stats.iter().zip([2u64, 2, 3, 3]) {
            let bytes = factor * elem as u64 * n as u64;
            prop_assert_eq!(s.bytes, bytes);
            let expected = 1e-6 * bytes as f64 / s.min_time;
            let rate = s.best_rate_mb_s.unwrap();
            prop_assert!((rate - expected).abs() <= expected * 1e-12, "{} vs {}", rate, expected);
        }
    }
}
