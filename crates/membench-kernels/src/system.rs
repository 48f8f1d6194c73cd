//! Host description for the report and the memory preflight.

use membench_common::{MembenchError, Result};
use serde::{Deserialize, Serialize};
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: Option<String>,
    pub arch: String,
    pub logical_cpus: usize,
    pub physical_cpus: usize,
    pub worker_threads: usize,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
}

impl SystemInfo {
    pub fn collect(worker_threads: usize) -> Self {
        let sys = memory_snapshot();
        Self {
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_version: System::os_version(),
            arch: std::env::consts::ARCH.to_string(),
            logical_cpus: num_cpus::get(),
            physical_cpus: num_cpus::get_physical(),
            worker_threads,
            total_memory_bytes: sys.total_memory(),
            available_memory_bytes: sys.available_memory(),
        }
    }
}

fn memory_snapshot() -> System {
    let mut sys =
        System::new_with_specifics(RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()));
    sys.refresh_memory();
    sys
}

/// Refuse to allocate more than the host reports as available.
///
/// Hosts that report no available memory (some containers) are not checked.
pub fn preflight_memory(required: u64) -> Result<()> {
    check_memory(required, memory_snapshot().available_memory())
}

fn check_memory(required: u64, available: u64) -> Result<()> {
    if available == 0 {
        tracing::debug!(required, "available memory unknown, skipping preflight");
        return Ok(());
    }
    if required > available {
        return Err(MembenchError::InsufficientMemory { required, available });
    }
    tracing::debug!(required, available, "memory preflight passed");
    Ok(())
}
