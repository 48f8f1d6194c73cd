//! Full benchmark runs through the public driver.

use membench_common::{BenchConfig, ElementType, IndexedKernels};
use membench_kernels::{
    estimate_granularity, run_benchmark, BenchThreadPool, ExpectedValues, KernelSet,
    MonotonicClock, TrialRunner, Workspace, WorkspaceLayout,
};

#[test]
fn million_element_f64_run_matches_recurrence() {
    let n = 1_000_000;
    let layout = WorkspaceLayout::primary(n, 0);
    let pool = BenchThreadPool::with_threads(None).unwrap();
    let mut ws = pool.install(|| Workspace::<f64>::allocate(layout)).unwrap();
    pool.install(|| ws.warm_up());

    let clock = MonotonicClock::new();
    let set = KernelSet::new(&layout, 8);
    let mut runner = TrialRunner::new(&clock, &set, 10);
    runner.run(&mut ws, &pool).unwrap();

    let expected = ExpectedValues::replay::<f64>(10, false, false);
    assert_eq!(expected.a, 2.0 * 15f64.powi(10));
    assert_eq!(expected.b, 6.0 * 15f64.powi(9));
    assert_eq!(expected.c, 8.0 * 15f64.powi(9));

    let report = membench_kernels::validate(&ws, 10);
    assert!(report.passed, "{report:?}");
    assert_eq!(report.epsilon, 1e-13);
    for check in &report.arrays {
        assert!(check.avg_rel_error <= 1e-13, "{check:?}");
    }
    assert!(ws.a().iter().all(|&x| x == expected.a));
}

#[test]
fn fixed_seed_runs_are_reproducible() {
    let config = BenchConfig {
        array_size: 20_000,
        index_array_size: 30_000,
        ntimes: 3,
        kernels: IndexedKernels::all(),
        permute_index: true,
        seed: Some(0xC0FFEE),
        threads: Some(2),
        ..Default::default()
    };
    let first = run_benchmark(&config).unwrap();
    let second = run_benchmark(&config).unwrap();

    assert_eq!(first.run.permutation_seed, Some(0xC0FFEE));
    assert_eq!(first.run.permutation_seed, second.run.permutation_seed);
    assert_eq!(first.validation.passed, second.validation.passed);
    assert!(first.validation.passed);
    assert_eq!(first.validation.dot, second.validation.dot);

    let layout = WorkspaceLayout::from_config(&config);
    let mut a = Workspace::<f64>::allocate(layout).unwrap();
    let mut b = Workspace::<f64>::allocate(layout).unwrap();
    a.permute_index(0xC0FFEE);
    b.permute_index(0xC0FFEE);
    assert_eq!(a.index(), b.index());
}

#[test]
fn report_lists_kernels_in_fixed_order() {
    let config = BenchConfig {
        array_size: 10_000,
        index_array_size: 10_000,
        element_type: ElementType::F32,
        ntimes: 2,
        kernels: IndexedKernels { gather: true, scatter: true, indirect_dot: false },
        threads: Some(1),
        ..Default::default()
    };
    let report = run_benchmark(&config).unwrap();
    let labels: Vec<_> = report.kernels.iter().map(|k| k.label.as_str()).collect();
    assert_eq!(labels, ["Copy", "Scale", "Add", "Triad", "Gather", "Scatter"]);
    assert!(report.validation.passed);
    assert!(report.kernel("Scatter").is_some());
    assert!(report.validation.dot.is_none());
}

#[test]
fn calibrator_is_stable_across_runs() {
    let clock = MonotonicClock::new();
    let first = estimate_granularity(&clock);
    let second = estimate_granularity(&clock);
    let (lo, hi) = {
        let (a, b) = (first.effective_micros(), second.effective_micros());
        (a.min(b), a.max(b))
    };
    assert!(hi <= lo * 100, "granularity drifted from {lo} to {hi}");
}
