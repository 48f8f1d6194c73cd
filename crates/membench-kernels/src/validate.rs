//! Result validator.
//!
//! Replays the kernel recurrence on scalars, in the element type under test,
//! and compares the workspace contents against the replayed values. A kernel
//! that was skipped or computed the wrong thing shows up as a relative
//! average error above the element type's epsilon.

use crate::element::StreamElement;
use crate::workspace::{dot_chunk, Workspace};
use membench_common::{epsilon_for_width, DOT_CHUNK, SCALAR};
use serde::{Deserialize, Serialize};

/// Offending elements logged per array on failure.
const MAX_LOGGED_ERRORS: usize = 10;

/// Value every live element of each array should hold after the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedValues {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl ExpectedValues {
    /// Replay the warm-up doubling and `ntimes` repetitions of the kernel
    /// sequence, starting from `a = 1`, `b = 2`, `c = 0`, `d = 1`, `e = 0`.
    pub fn replay<T: StreamElement>(ntimes: usize, gather: bool, scatter: bool) -> Self {
        let scalar = T::from_f64(SCALAR);
        let mut a = T::from_f64(1.0);
        let mut b = T::from_f64(2.0);
        let mut c = T::from_f64(0.0);
        let mut d = T::from_f64(1.0);
        let mut e = T::from_f64(0.0);

        a = T::from_f64(2.0) * a;
        for _ in 0..ntimes {
            c = a;
            b = scalar * c;
            c = a + b;
            a = b + scalar * c;
            if gather {
                d = a;
            }
            if scatter {
                e = d;
            }
        }

        Self { a: a.to_f64(), b: b.to_f64(), c: c.to_f64(), d: d.to_f64(), e: e.to_f64() }
    }
}

/// Outcome of checking one array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayCheck {
    pub name: String,
    pub expected: f64,
    pub avg_abs_error: f64,
    pub avg_rel_error: f64,
    /// Elements off by more than epsilon; counted only when the check fails.
    pub error_count: Option<usize>,
    pub passed: bool,
}

/// Outcome of checking the indirect dot product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotCheck {
    pub expected: f64,
    pub observed: f64,
    pub rel_error: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub epsilon: f64,
    pub expected: ExpectedValues,
    pub arrays: Vec<ArrayCheck>,
    pub dot: Option<DotCheck>,
    pub passed: bool,
}

impl ValidationReport {
    /// Names of the arrays (and `x` for the dot product) that failed.
    pub fn failures(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.arrays.iter().filter(|a| !a.passed).map(|a| a.name.as_str()).collect();
        if self.dot.as_ref().is_some_and(|d| !d.passed) {
            names.push("x");
        }
        names
    }
}

/// Check the workspace after `ntimes` repetitions.
pub fn validate<T: StreamElement>(workspace: &Workspace<T>, ntimes: usize) -> ValidationReport {
    let layout = *workspace.layout();
    let epsilon = epsilon_for_width(std::mem::size_of::<T>());
    let expected = ExpectedValues::replay::<T>(ntimes, layout.gather, layout.scatter);

    let mut arrays = vec![
        check_array("a", workspace.a().iter().map(|x| x.to_f64()), expected.a, epsilon),
        check_array("b", workspace.b().iter().map(|x| x.to_f64()), expected.b, epsilon),
        check_array("c", workspace.c().iter().map(|x| x.to_f64()), expected.c, epsilon),
    ];
    if layout.gather {
        arrays.push(check_array("d", workspace.d().iter().map(|x| x.to_f64()), expected.d, epsilon));
    }
    if layout.scatter {
        let observed = workspace
            .index()
            .iter()
            .map(|&i| workspace.e(i as usize).map_or(f64::NAN, T::to_f64));
        arrays.push(check_array("e", observed, expected.e, epsilon));
    }

    let dot = layout.indirect_dot.then(|| check_dot(workspace, epsilon));

    let passed = arrays.iter().all(|a| a.passed) && dot.as_ref().map_or(true, |d| d.passed);
    if passed {
        tracing::info!(epsilon, "solution validates");
    }

    ValidationReport { epsilon, expected, arrays, dot, passed }
}

/// Exact matches count as zero error, so overflowed arrays holding the
/// same infinity as the replay still validate.
fn abs_error(observed: f64, expected: f64) -> f64 {
    if observed == expected { 0.0 } else { (observed - expected).abs() }
}

fn relative(error: f64, expected: f64) -> f64 {
    if expected == 0.0 { error.abs() } else { (error / expected).abs() }
}

fn check_array<I>(name: &str, observed: I, expected: f64, epsilon: f64) -> ArrayCheck
where
    I: Iterator<Item = f64> + Clone,
{
    let (sum, count) = observed
        .clone()
        .fold((0.0f64, 0usize), |(sum, n), x| (sum + abs_error(x, expected), n + 1));
    let avg_abs_error = if count == 0 { 0.0 } else { sum / count as f64 };
    let avg_rel_error = relative(avg_abs_error, expected);
    // NaN compares false, so test for "not within" rather than "above".
    let passed = avg_rel_error <= epsilon;

    let error_count = (!passed).then(|| {
        let mut errors = 0;
        for (j, x) in observed.enumerate() {
            let rel = relative(abs_error(x, expected), expected);
            if rel.is_nan() || rel > epsilon {
                errors += 1;
                if errors <= MAX_LOGGED_ERRORS {
                    tracing::debug!(
                        array = name,
                        index = j,
                        expected,
                        observed = x,
                        "element mismatch"
                    );
                }
            }
        }
        errors
    });

    if !passed {
        tracing::warn!(
            array = name,
            expected,
            avg_abs_error,
            avg_rel_error,
            epsilon,
            errors = error_count.unwrap_or(0),
            "validation failed"
        );
    }

    ArrayCheck {
        name: name.to_string(),
        expected,
        avg_abs_error,
        avg_rel_error,
        error_count,
        passed,
    }
}

fn check_dot<T: StreamElement>(workspace: &Workspace<T>, epsilon: f64) -> DotCheck {
    let (d, index, b) = (workspace.d(), workspace.index(), workspace.b());
    let expected = d
        .chunks(DOT_CHUNK)
        .zip(index.chunks(DOT_CHUNK))
        .fold(T::default(), |acc, (d, index)| acc + dot_chunk(d, index, b))
        .to_f64();
    let observed = workspace.dot().to_f64();
    let rel_error = relative(abs_error(observed, expected), expected);
    let passed = rel_error <= epsilon;
    if !passed {
        tracing::warn!(expected, observed, rel_error, epsilon, "indirect dot product failed validation");
    }
    DotCheck { expected, observed, rel_error, passed }
}
