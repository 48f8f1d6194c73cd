//! `membench info`: host summary relevant to bandwidth measurements.

use anyhow::Result;
use console::style;
use membench_kernels::SystemInfo;

/// Show system information
pub fn show_system_info() -> Result<()> {
    let info = SystemInfo::collect(rayon::current_num_threads());
    let gib = |bytes: u64| bytes as f64 / (1024.0 * 1024.0 * 1024.0);

    println!("{}", style("membench System Information").bold().cyan());
    println!();

    println!("{}", style("Version:").bold());
    println!("  membench: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("{}", style("System:").bold());
    match &info.os_version {
        Some(version) => println!("  OS: {} {}", info.os, version),
        None => println!("  OS: {}", info.os),
    }
    println!("  Architecture: {}", info.arch);
    println!("  Logical CPUs: {}", info.logical_cpus);
    println!("  Physical CPUs: {}", info.physical_cpus);
    println!("  Default worker threads: {}", info.worker_threads);
    println!();

    println!("{}", style("Memory:").bold());
    println!("  Total: {:.1} GiB", gib(info.total_memory_bytes));
    println!("  Available: {:.1} GiB", gib(info.available_memory_bytes));

    Ok(())
}
