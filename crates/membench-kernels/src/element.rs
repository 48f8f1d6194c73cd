//! Element types the kernels operate on.
//!
//! [`StreamElement`] is implemented for `f32` and `f64`. Each element type
//! also names an atomic slot type used by the Scatter target array, so that
//! concurrent writes through duplicate indices stay well-defined.

use membench_common::ElementType;
use std::fmt::Debug;
use std::ops::{Add, Mul};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// A floating-point element of the arrays under test.
pub trait StreamElement:
    Copy + Default + Debug + PartialEq + Send + Sync + Add<Output = Self> + Mul<Output = Self> + 'static
{
    /// Atomic cell holding one element, for scatter targets.
    type Slot: AtomicSlot<Self>;

    /// Runtime descriptor matching this type.
    const ELEMENT_TYPE: ElementType;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

/// Interior-mutable storage for one element with relaxed atomic access.
pub trait AtomicSlot<T>: Send + Sync {
    fn new(value: T) -> Self;
    fn load(&self) -> T;
    fn store(&self, value: T);
}

impl StreamElement for f32 {
    type Slot = F32Slot;
    const ELEMENT_TYPE: ElementType = ElementType::F32;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl StreamElement for f64 {
    type Slot = F64Slot;
    const ELEMENT_TYPE: ElementType = ElementType::F64;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// `f32` stored as its bit pattern.
#[derive(Debug)]
pub struct F32Slot(AtomicU32);

impl AtomicSlot<f32> for F32Slot {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// `f64` stored as its bit pattern.
#[derive(Debug)]
pub struct F64Slot(AtomicU64);

impl AtomicSlot<f64> for F64Slot {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}
