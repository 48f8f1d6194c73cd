//! Report rendering.
//!
//! - `text`: the classic human-readable report
//! - `json`: the full [`BenchmarkReport`] as pretty JSON
//! - `csv`: one row per kernel

use anyhow::Result;
use console::style;
use membench_kernels::BenchmarkReport;
use std::io::Write;

const HLINE: &str = "-------------------------------------------------------------";

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
    /// One CSV row per kernel.
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format '{other}'. Expected one of: text, json, csv")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Render `report` to `out`. `color` only affects the text format.
pub fn write_report(
    report: &BenchmarkReport,
    format: OutputFormat,
    out: &mut dyn Write,
    color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(report, out)?,
        OutputFormat::Text => write_text(report, out, color)?,
    }
    out.flush()?;
    Ok(())
}

fn emphasize(text: &str, color: bool) -> String {
    if color { style(text).bold().to_string() } else { text.to_string() }
}

fn write_text(report: &BenchmarkReport, out: &mut dyn Write, color: bool) -> Result<()> {
    let run = &report.run;
    let cal = &report.calibration;
    let mib = 1024.0 * 1024.0;

    writeln!(out, "{HLINE}")?;
    writeln!(out, "{}", emphasize(&format!("membench version {}", report.version), color))?;
    writeln!(out, "{HLINE}")?;
    writeln!(out, "This system uses {} bytes per array element.", run.element_bytes)?;
    if run.indexed_kernels {
        writeln!(out, "Also, this system uses {} bytes per array index.", run.index_bytes)?;
    }
    writeln!(out, "{HLINE}")?;
    writeln!(out, "Array size = {} (elements), Offset = {} (elements)", run.array_size, run.offset)?;
    writeln!(
        out,
        "Memory per array = {:.1} MiB (= {:.1} GiB).",
        run.array_mib,
        run.array_mib / 1024.0
    )?;
    if run.indexed_kernels {
        let indexed = (run.element_bytes * run.index_array_size) as f64 / mib;
        let index = (run.index_bytes * run.index_array_size) as f64 / mib;
        writeln!(
            out,
            "Index array size = {} (elements), Offset = {} (elements)",
            run.index_array_size, run.offset
        )?;
        writeln!(out, "Memory per indexed array = {:.1} MiB (= {:.1} GiB).", indexed, indexed / 1024.0)?;
        writeln!(out, "Memory per index array = {:.1} MiB (= {:.1} GiB).", index, index / 1024.0)?;
    }
    writeln!(
        out,
        "Total memory required = {:.1} MiB (= {:.1} GiB).",
        run.total_mib,
        run.total_gib()
    )?;
    writeln!(out, "Each kernel will be executed {} times.", run.ntimes)?;
    writeln!(out, " The *best* time for each kernel (excluding the first iteration)")?;
    writeln!(out, " will be used to compute the reported bandwidth.")?;
    writeln!(out, "{HLINE}")?;
    writeln!(out, "Number of Threads = {}", report.system.worker_threads)?;
    if let Some(seed) = run.permutation_seed {
        writeln!(out, "The index array is randomly permuted (seed = {seed})")?;
    }
    writeln!(out, "{HLINE}")?;

    if cal.stalled {
        writeln!(out, "The clock did not advance during calibration; timings are unreliable.")?;
    } else if cal.sub_microsecond {
        writeln!(out, "Your clock granularity appears to be less than one microsecond.")?;
    } else {
        writeln!(out, "Your clock granularity/precision appears to be {} microseconds.", cal.granularity_us)?;
    }
    writeln!(
        out,
        "Each test below will take on the order of {:.0} microseconds.",
        cal.test_time_us
    )?;
    writeln!(out, "   (= {:.0} clock ticks)", cal.ticks_per_test)?;
    writeln!(out, "Increase the size of the arrays if this shows that")?;
    writeln!(out, "you are not getting at least 20 clock ticks per test.")?;
    if !cal.timer_adequate {
        let warning = "WARNING: fewer than 20 clock ticks per test; results may be unreliable.";
        writeln!(out, "{}", if color { style(warning).yellow().to_string() } else { warning.into() })?;
    }
    writeln!(out, "{HLINE}")?;
    for note in &report.notes {
        writeln!(out, "Note: {note}")?;
    }
    if !report.notes.is_empty() {
        writeln!(out, "{HLINE}")?;
    }

    writeln!(out, "Function    Best Rate MB/s  Avg time     Min time     Max time")?;
    for k in &report.kernels {
        let rate = k.best_rate_mb_s.map_or_else(|| format!("{:>12}", "n/a"), |r| format!("{r:12.1}"));
        writeln!(
            out,
            "{:<12}{}  {:11.6}  {:11.6}  {:11.6}",
            format!("{}:", k.label),
            rate,
            k.avg_time,
            k.min_time,
            k.max_time
        )?;
    }
    writeln!(out, "{HLINE}")?;

    let v = &report.validation;
    for check in v.arrays.iter().filter(|c| !c.passed) {
        let line = format!(
            "Failed Validation on array {}[], AvgRelAbsErr > epsilon ({:e})",
            check.name, v.epsilon
        );
        writeln!(out, "{}", if color { style(line).red().to_string() } else { line })?;
        writeln!(
            out,
            "     Expected Value: {:e}, AvgAbsErr: {:e}, AvgRelAbsErr: {:e}",
            check.expected, check.avg_abs_error, check.avg_rel_error
        )?;
        if let Some(errors) = check.error_count {
            writeln!(out, "     For array {}[], {} errors were found.", check.name, errors)?;
        }
    }
    if let Some(dot) = v.dot.as_ref().filter(|d| !d.passed) {
        writeln!(out, "Failed Validation on value x, RelErr > epsilon ({:e})", v.epsilon)?;
        writeln!(
            out,
            "     Expected Value: {:e}, Observed: {:e}, RelErr: {:e}",
            dot.expected, dot.observed, dot.rel_error
        )?;
    }
    if v.passed {
        let line = format!("Solution Validates: avg error less than {:e} on all arrays", v.epsilon);
        writeln!(out, "{}", if color { style(line).green().to_string() } else { line })?;
    }
    writeln!(out, "{HLINE}")?;
    Ok(())
}

fn write_csv(report: &BenchmarkReport, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "function,bytes,best_rate_mb_s,avg_time_s,min_time_s,max_time_s")?;
    for k in &report.kernels {
        writeln!(
            out,
            "{},{},{},{:.9},{:.9},{:.9}",
            k.label,
            k.bytes,
            k.best_rate_mb_s.map(|r| format!("{r:.3}")).unwrap_or_default(),
            k.avg_time,
            k.min_time,
            k.max_time
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use membench_common::BenchConfig;
    use membench_kernels::run_benchmark;

    fn small_report() -> BenchmarkReport {
        let config = BenchConfig { array_size: 2048, ntimes: 2, threads: Some(1), ..Default::default() };
        run_benchmark(&config).unwrap()
    }

    fn render(report: &BenchmarkReport, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(report, format, &mut buf, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "text");
    }

    #[test]
    fn test_text_report_layout() {
        let text = render(&small_report(), OutputFormat::Text);
        assert!(text.contains("Function    Best Rate MB/s  Avg time     Min time     Max time"));
        for label in ["Copy:", "Scale:", "Add:", "Triad:"] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("Solution Validates"));
        assert!(text.contains("Array size = 2048 (elements), Offset = 0 (elements)"));
    }

    #[test]
    fn test_text_report_lists_failed_arrays() {
        let mut report = small_report();
        report.validation.passed = false;
        let check = &mut report.validation.arrays[1];
        check.passed = false;
        check.avg_rel_error = 0.5;
        check.error_count = Some(2048);

        let text = render(&report, OutputFormat::Text);
        assert!(text.contains("Function    Best Rate MB/s  Avg time     Min time     Max time"));
        assert!(text.contains("Failed Validation on array b[], AvgRelAbsErr > epsilon (1e-13)"));
        assert!(text.contains("For array b[], 2048 errors were found."));
        assert!(!text.contains("Failed Validation on array a[]"));
        assert!(!text.contains("Solution Validates"));
    }

    #[test]
    fn test_csv_has_row_per_kernel() {
        let csv = render(&small_report(), OutputFormat::Csv);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("function,bytes,"));
        assert!(lines[1].starts_with("Copy,32768,"));
        assert!(lines[4].starts_with("Triad,49152,"));
    }

    #[test]
    fn test_json_round_trips() {
        let report = small_report();
        let json = render(&report, OutputFormat::Json);
        let parsed: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kernels.len(), 4);
        assert_eq!(parsed.run, report.run);
        assert!(parsed.validation.passed);
    }
}
