//! Array workspace.
//!
//! Owns the buffers under test: the primary arrays A, B and C, and, when
//! indexed kernels are enabled, the gather target D, the index array I and
//! the scatter target E. Every array carries `offset` padding elements in
//! front of its live region; kernels only touch the live region.
//!
//! Buffers are reserved fallibly and first touched by the worker threads
//! that later run the kernels.

use crate::element::{AtomicSlot, StreamElement};
use membench_common::{BenchConfig, MembenchError, Result, DOT_CHUNK};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::ops::Range;

/// Shape of a workspace: sizes plus which secondary arrays exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub array_size: usize,
    pub index_array_size: usize,
    pub offset: usize,
    pub gather: bool,
    pub scatter: bool,
    pub indirect_dot: bool,
}

impl WorkspaceLayout {
    /// Layout with only the primary arrays.
    pub fn primary(array_size: usize, offset: usize) -> Self {
        Self {
            array_size,
            index_array_size: 0,
            offset,
            gather: false,
            scatter: false,
            indirect_dot: false,
        }
    }

    pub fn from_config(config: &BenchConfig) -> Self {
        let indexed = config.kernels.any();
        Self {
            array_size: config.array_size,
            index_array_size: if indexed { config.index_array_size } else { 0 },
            offset: config.offset,
            gather: config.kernels.gather,
            scatter: config.kernels.scatter,
            indirect_dot: config.kernels.indirect_dot,
        }
    }

    /// Whether D and I are allocated.
    pub fn has_index(&self) -> bool {
        self.gather || self.scatter || self.indirect_dot
    }

    fn live(&self) -> Range<usize> {
        self.offset..self.offset + self.array_size
    }

    fn index_live(&self) -> Range<usize> {
        self.offset..self.offset + self.index_array_size
    }
}

/// The arrays under test for one run.
pub struct Workspace<T: StreamElement> {
    layout: WorkspaceLayout,
    a: Vec<T>,
    b: Vec<T>,
    c: Vec<T>,
    d: Vec<T>,
    index: Vec<u32>,
    e: Vec<T::Slot>,
    partials: Vec<T>,
    dot: T,
}

impl<T: StreamElement> std::fmt::Debug for Workspace<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("layout", &self.layout)
            .field("element", &T::ELEMENT_TYPE)
            .finish_non_exhaustive()
    }
}

impl<T: StreamElement> Workspace<T> {
    /// Allocate and initialise every array the layout requires.
    ///
    /// Live primary elements start as `A = 1`, `B = 2`, `C = 0`; D starts
    /// at 1, E at 0, and `I[k] = k mod array_size`.
    ///
    /// # Errors
    ///
    /// Returns [`MembenchError::Allocation`] if any buffer cannot be reserved.
    pub fn allocate(layout: WorkspaceLayout) -> Result<Self> {
        let primary_len = layout.offset + layout.array_size;
        let indexed_len = if layout.has_index() { layout.offset + layout.index_array_size } else { 0 };
        let scatter_len = if layout.scatter { primary_len } else { 0 };
        let partial_len =
            if layout.indirect_dot { layout.index_array_size.div_ceil(DOT_CHUNK) } else { 0 };

        let one = T::from_f64(1.0);
        let two = T::from_f64(2.0);
        let zero = T::from_f64(0.0);

        let a = alloc_filled("a", primary_len, one)?;
        let b = alloc_filled("b", primary_len, two)?;
        let c = alloc_filled("c", primary_len, zero)?;
        let d = alloc_filled("d", indexed_len, one)?;
        let index = alloc_index("i", indexed_len, layout)?;
        let e = alloc_slots("e", scatter_len, zero)?;
        let partials = alloc_filled("partials", partial_len, zero)?;

        tracing::debug!(
            array_size = layout.array_size,
            index_array_size = layout.index_array_size,
            offset = layout.offset,
            "workspace allocated"
        );

        Ok(Self { layout, a, b, c, d, index, e, partials, dot: zero })
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Shuffle the live index entries with a Fisher-Yates pass seeded by `seed`.
    pub fn permute_index(&mut self, seed: u64) {
        let range = self.layout.index_live();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        fisher_yates(&mut self.index[range], &mut rng);
        tracing::info!(seed, "index array randomly permuted");
    }

    /// Double every live element of A ahead of the timed loop.
    pub fn warm_up(&mut self) {
        let two = T::from_f64(2.0);
        let live = self.layout.live();
        self.a[live].par_iter_mut().for_each(|x| *x = two * *x);
    }

    // -----------------------------------------------------------------------
    // Kernels
    // -----------------------------------------------------------------------

    /// `C[k] = A[k]`
    pub fn copy(&mut self) {
        let r = self.layout.live();
        let a = &self.a[r.clone()];
        self.c[r].par_iter_mut().zip(a.par_iter()).for_each(|(c, &a)| *c = a);
    }

    /// `B[k] = scalar * C[k]`
    pub fn scale(&mut self, scalar: T) {
        let r = self.layout.live();
        let c = &self.c[r.clone()];
        self.b[r].par_iter_mut().zip(c.par_iter()).for_each(|(b, &c)| *b = scalar * c);
    }

    /// `C[k] = A[k] + B[k]`
    pub fn add(&mut self) {
        let r = self.layout.live();
        let a = &self.a[r.clone()];
        let b = &self.b[r.clone()];
        self.c[r]
            .par_iter_mut()
            .zip(a.par_iter().zip(b.par_iter()))
            .for_each(|(c, (&a, &b))| *c = a + b);
    }

    /// `A[k] = B[k] + scalar * C[k]`
    pub fn triad(&mut self, scalar: T) {
        let r = self.layout.live();
        let b = &self.b[r.clone()];
        let c = &self.c[r.clone()];
        self.a[r]
            .par_iter_mut()
            .zip(b.par_iter().zip(c.par_iter()))
            .for_each(|(a, (&b, &c))| *a = b + scalar * c);
    }

    /// `D[k] = A[I[k]]`
    pub fn gather(&mut self) {
        let (r, ri) = (self.layout.live(), self.layout.index_live());
        let a = &self.a[r];
        let index = &self.index[ri.clone()];
        self.d[ri]
            .par_iter_mut()
            .zip(index.par_iter())
            .for_each(|(d, &i)| *d = a[i as usize]);
    }

    /// `E[I[k]] = D[k]`
    pub fn scatter(&mut self) {
        let (r, ri) = (self.layout.live(), self.layout.index_live());
        let e = &self.e[r];
        let d = &self.d[ri.clone()];
        self.index[ri]
            .par_iter()
            .zip(d.par_iter())
            .for_each(|(&i, &d)| e[i as usize].store(d));
    }

    /// `X = sum(D[k] * B[I[k]])`, reduced in fixed [`DOT_CHUNK`] chunks.
    pub fn indirect_dot(&mut self) {
        let (r, ri) = (self.layout.live(), self.layout.index_live());
        let b = &self.b[r];
        let d = &self.d[ri.clone()];
        let index = &self.index[ri];
        self.partials
            .par_iter_mut()
            .zip(d.par_chunks(DOT_CHUNK).zip(index.par_chunks(DOT_CHUNK)))
            .for_each(|(p, (d, index))| *p = dot_chunk(d, index, b));
        self.dot = self.partials.iter().fold(T::default(), |acc, &p| acc + p);
    }

    // -----------------------------------------------------------------------
    // Live views
    // -----------------------------------------------------------------------

    pub fn a(&self) -> &[T] {
        &self.a[self.layout.live()]
    }

    pub fn b(&self) -> &[T] {
        &self.b[self.layout.live()]
    }

    pub fn c(&self) -> &[T] {
        &self.c[self.layout.live()]
    }

    /// Live gather target; empty without indexed kernels.
    pub fn d(&self) -> &[T] {
        if self.d.is_empty() {
            return &[];
        }
        &self.d[self.layout.index_live()]
    }

    /// Live index entries; empty without indexed kernels.
    pub fn index(&self) -> &[u32] {
        if self.index.is_empty() {
            return &[];
        }
        &self.index[self.layout.index_live()]
    }

    /// Current value of live scatter target element `k`.
    pub fn e(&self, k: usize) -> Option<T> {
        if self.e.is_empty() {
            return None;
        }
        self.e.get(self.layout.offset + k).map(|slot| slot.load())
    }

    /// Result of the most recent indirect dot product.
    pub fn dot(&self) -> T {
        self.dot
    }

    /// Padding elements in front of A's live region.
    pub fn a_padding(&self) -> &[T] {
        &self.a[..self.layout.offset]
    }
}

/// One partial sum of the indirect dot product, accumulated left to right.
pub fn dot_chunk<T: StreamElement>(d: &[T], index: &[u32], b: &[T]) -> T {
    d.iter().zip(index).fold(T::default(), |acc, (&d, &i)| acc + d * b[i as usize])
}

/// Unbiased in-place Fisher-Yates shuffle.
///
/// Each of the first `len - 1` positions is swapped with a uniformly chosen
/// position at or after it.
pub fn fisher_yates<R: Rng>(values: &mut [u32], rng: &mut R) {
    let len = values.len();
    if len < 2 {
        return;
    }
    for j in 0..len - 1 {
        let k = rng.random_range(j..len);
        values.swap(j, k);
    }
}

/// Seed derived from the current time, for runs without a configured seed.
pub fn seed_from_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn reserve<U>(array: &'static str, len: usize) -> Result<Vec<U>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| MembenchError::Allocation {
        array,
        bytes: len.saturating_mul(std::mem::size_of::<U>()),
    })?;
    Ok(v)
}

fn alloc_filled<T: Copy + Send + Sync>(array: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut v = reserve(array, len)?;
    v.par_extend((0..len).into_par_iter().map(|_| value));
    Ok(v)
}

fn alloc_slots<T: StreamElement>(array: &'static str, len: usize, value: T) -> Result<Vec<T::Slot>> {
    let mut v = reserve(array, len)?;
    v.par_extend((0..len).into_par_iter().map(|_| T::Slot::new(value)));
    Ok(v)
}

fn alloc_index(array: &'static str, len: usize, layout: WorkspaceLayout) -> Result<Vec<u32>> {
    let mut v = reserve(array, len)?;
    let n = layout.array_size.max(1);
    let offset = layout.offset;
    // Padding entries are never read; live entries wrap around the primary arrays.
    v.par_extend(
        (0..len)
            .into_par_iter()
            .map(|j| if j < offset { 0 } else { ((j - offset) % n) as u32 }),
    );
    Ok(v)
}
