//! Element, index and clock descriptors shared by configuration and kernels.

use serde::{Deserialize, Serialize};

/// Byte width of one index-array entry.
///
/// Indices are stored as `u32`, the same 4-byte word the classic benchmark
/// uses for its index array, so byte accounting stays comparable.
pub const INDEX_BYTES: usize = std::mem::size_of::<u32>();

/// Elements per partial sum in the indirect dot product reduction.
pub const DOT_CHUNK: usize = 4096;

/// Scalar used by Scale and Triad and by the validator recurrence.
pub const SCALAR: f64 = 3.0;

/// Floating-point precision of the arrays under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    F32,
    #[default]
    F64,
}

impl ElementType {
    /// Size of one array element in bytes.
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::F32 => std::mem::size_of::<f32>(),
            Self::F64 => std::mem::size_of::<f64>(),
        }
    }

    /// Validation tolerance for this element width.
    pub const fn epsilon(self) -> f64 {
        epsilon_for_width(self.size_bytes())
    }
}

/// Relative-error tolerance keyed on element byte width.
pub const fn epsilon_for_width(bytes: usize) -> f64 {
    match bytes {
        4 => 1.0e-6,
        8 => 1.0e-13,
        _ => 1.0e-6,
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl std::str::FromStr for ElementType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "single" => Ok(Self::F32),
            "f64" | "double" => Ok(Self::F64),
            other => Err(format!("unknown element type: {other}")),
        }
    }
}

/// Time source backing the clock abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockSource {
    /// Monotonic clock, immune to wall-clock adjustments.
    #[default]
    Monotonic,
    /// Calendar clock. Accepted as a fallback; adjustments can skew calibration.
    Wall,
}

impl std::fmt::Display for ClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monotonic => write!(f, "monotonic"),
            Self::Wall => write!(f, "wall"),
        }
    }
}

impl std::str::FromStr for ClockSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monotonic" => Ok(Self::Monotonic),
            "wall" | "realtime" => Ok(Self::Wall),
            other => Err(format!("unknown clock source: {other}")),
        }
    }
}
