use crate::session::InspectSession;
use crate::value::{ChildValue, Field};

pub mod pair;
pub mod string;
pub mod vector;

pub use string::StringView;
pub use vector::VectorView;

/// The inspected process may contain uninitialized or corrupt container
/// headers, and a "size" field read from one can be arbitrary. Content
/// reads are therefore capped so a single query never does unbounded
/// work.
const LEN_GUARD: u64 = 10_000;

fn guard_len(len: u64) -> u64 {
    if len > LEN_GUARD { LEN_GUARD } else { len }
}

/// How many elements of a sequence to expose when the display limit is
/// applied. A presentation bound, not a correctness bound.
pub const DEFAULT_ELEMENT_LIMIT: usize = 200;

/// Decoder configuration, owned by the caller and passed at view
/// construction. `element_limit: None` disables the display cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub element_limit: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            element_limit: Some(DEFAULT_ELEMENT_LIMIT),
        }
    }
}

/// A refreshed child-enumeration view over one of the supported
/// container layouts, behind a single host-facing surface.
pub enum ContainerView<'a, S: InspectSession> {
    Vector(VectorView<'a, S>),
    String(StringView<'a, S>),
}

impl<'a, S: InspectSession> ContainerView<'a, S> {
    /// Re-read the defining fields of the underlying region. Queries
    /// answer from the refreshed state; the inspected process may have
    /// mutated memory between top-level invocations, so a view must be
    /// refreshed before it is trusted.
    pub fn refresh(&mut self) {
        match self {
            ContainerView::Vector(view) => view.refresh(),
            ContainerView::String(view) => view.refresh(),
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            ContainerView::Vector(view) => view.child_count(true),
            ContainerView::String(view) => view.child_count(),
        }
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        match self {
            ContainerView::Vector(view) => view.child_index(name),
            ContainerView::String(view) => view.child_index(name),
        }
    }

    pub fn child_at(&self, index: usize) -> Option<ChildValue> {
        match self {
            ContainerView::Vector(view) => view.child_at(index),
            ContainerView::String(view) => view.child_at(index),
        }
    }
}

/// Name of the size type both decoders use for synthetic counters.
pub(crate) const SIZE_TYPE: &str = "eastl_size_t";

pub(crate) fn make_view<'a, S: InspectSession>(
    session: &'a S,
    region: Field,
    config: &DecoderConfig,
    kind: ViewKind,
) -> ContainerView<'a, S> {
    match kind {
        ViewKind::Vector => ContainerView::Vector(VectorView::new(session, region, config)),
        ViewKind::String => ContainerView::String(StringView::new(session, region)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewKind {
    Vector,
    String,
}
