//! The ordered set of timed kernels.
//!
//! Copy, Scale, Add and Triad are always present, in that order; Gather,
//! Scatter and the indirect dot product are appended when enabled. The
//! position of a kernel in the set is its row in the timing matrix.

use crate::element::StreamElement;
use crate::workspace::{Workspace, WorkspaceLayout};
use membench_common::{INDEX_BYTES, SCALAR};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    Copy,
    Scale,
    Add,
    Triad,
    Gather,
    Scatter,
    IndirectDot,
}

impl KernelKind {
    /// Report label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Scale => "Scale",
            Self::Add => "Add",
            Self::Triad => "Triad",
            Self::Gather => "Gather",
            Self::Scatter => "Scatter",
            Self::IndirectDot => "Ind.dot",
        }
    }

    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::Gather | Self::Scatter | Self::IndirectDot)
    }

    /// Run this kernel once over the workspace.
    pub fn execute<T: StreamElement>(self, ws: &mut Workspace<T>) {
        let scalar = T::from_f64(SCALAR);
        match self {
            Self::Copy => ws.copy(),
            Self::Scale => ws.scale(scalar),
            Self::Add => ws.add(),
            Self::Triad => ws.triad(scalar),
            Self::Gather => ws.gather(),
            Self::Scatter => ws.scatter(),
            Self::IndirectDot => ws.indirect_dot(),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timed operation and the bytes it is credited with moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KernelDescriptor {
    pub kind: KernelKind,
    pub label: &'static str,
    pub bytes: u64,
}

impl KernelDescriptor {
    pub fn new(kind: KernelKind, layout: &WorkspaceLayout, element_bytes: usize) -> Self {
        Self { kind, label: kind.label(), bytes: bytes_moved(kind, layout, element_bytes) }
    }
}

/// Bytes credited to one execution of `kind`.
///
/// Streaming kernels move two or three full arrays. The indexed kernels use
/// the historical accounting `elem * min(N, NI) + elem * NI + index * NI`,
/// kept as-is so results stay comparable with published numbers.
pub fn bytes_moved(kind: KernelKind, layout: &WorkspaceLayout, element_bytes: usize) -> u64 {
    let elem = element_bytes as u64;
    let n = layout.array_size as u64;
    let ni = layout.index_array_size as u64;
    match kind {
        KernelKind::Copy | KernelKind::Scale => 2 * elem * n,
        KernelKind::Add | KernelKind::Triad => 3 * elem * n,
        KernelKind::Gather | KernelKind::Scatter | KernelKind::IndirectDot => {
            elem * n.min(ni) + elem * ni + INDEX_BYTES as u64 * ni
        }
    }
}

/// Ordered, fixed collection of kernels for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSet {
    kernels: Vec<KernelDescriptor>,
}

impl KernelSet {
    pub fn new(layout: &WorkspaceLayout, element_bytes: usize) -> Self {
        let mut kinds = vec![KernelKind::Copy, KernelKind::Scale, KernelKind::Add, KernelKind::Triad];
        if layout.gather {
            kinds.push(KernelKind::Gather);
        }
        if layout.scatter {
            kinds.push(KernelKind::Scatter);
        }
        if layout.indirect_dot {
            kinds.push(KernelKind::IndirectDot);
        }
        let kernels = kinds
            .into_iter()
            .map(|kind| KernelDescriptor::new(kind, layout, element_bytes))
            .collect();
        Self { kernels }
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KernelDescriptor> {
        self.kernels.iter()
    }

    pub fn get(&self, index: usize) -> Option<&KernelDescriptor> {
        self.kernels.get(index)
    }

    pub fn contains(&self, kind: KernelKind) -> bool {
        self.kernels.iter().any(|k| k.kind == kind)
    }
}

impl<'a> IntoIterator for &'a KernelSet {
    type Item = &'a KernelDescriptor;
    type IntoIter = std::slice::Iter<'a, KernelDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
