//! Decoder for the `eastl::VectorBase` layout: three pointer-valued
//! members (`mpBegin`, `mpEnd`, `mCapacityAllocator.mFirst`) delimiting
//! the used and allocated element ranges.

use crate::decoder::{DecoderConfig, SIZE_TYPE};
use crate::error::{AssumeError, DecodeError};
use crate::session::{encode_u32, InspectSession, TypeId};
use crate::value::{ChildValue, Field};
use crate::weak_error;
use anyhow::Context;

/// Raw geometry captured by one refresh pass. Never persisted across
/// refreshes.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    begin: u64,
    end: u64,
    capacity_end: u64,
    element_type: TypeId,
    element_size: u64,
}

/// An indexable view over a `VectorBase` region: the logical elements
/// plus two synthetic trailing children, `size` and `capacity`.
pub struct VectorView<'a, S: InspectSession> {
    session: &'a S,
    region: Field,
    element_limit: Option<usize>,
    geometry: Option<Geometry>,
}

impl<'a, S: InspectSession> VectorView<'a, S> {
    pub fn new(session: &'a S, region: Field, config: &DecoderConfig) -> Self {
        Self {
            session,
            region,
            element_limit: config.element_limit,
            geometry: None,
        }
    }

    /// Re-read the three range pointers and the element type. On any
    /// resolution error the cached geometry is cleared and the view
    /// reports zero children until the next refresh.
    pub fn refresh(&mut self) {
        self.geometry = weak_error!(
            self.read_geometry()
                .context("VectorBase geometry interpretation")
        );
    }

    fn read_geometry(&self) -> Result<Geometry, DecodeError> {
        let begin = self.region.member(self.session, "mpBegin")?;
        let end = self.region.member(self.session, "mpEnd")?;
        let capacity_end = self
            .region
            .member(self.session, "mCapacityAllocator")?
            .member(self.session, "mFirst")?;

        let element_type = self
            .session
            .pointee(begin.type_id)
            .ok_or(AssumeError::NotAPointer("mpBegin"))?;
        let element_size = self
            .session
            .type_size(element_type)
            .ok_or(AssumeError::UnknownSize(element_type))?;

        Ok(Geometry {
            begin: begin.read_unsigned(self.session)?,
            end: end.read_unsigned(self.session)?,
            capacity_end: capacity_end.read_unsigned(self.session)?,
            element_type,
            element_size,
        })
    }

    /// True child count (elements plus the two synthetic children), or
    /// zero if any structural invariant fails. All-or-nothing: a view
    /// over corrupt memory exposes no elements at all.
    fn child_count_impl(&self) -> usize {
        let Some(geometry) = self.geometry else {
            return 0;
        };
        if geometry.element_size == 0 {
            return 0;
        }
        if geometry.begin > geometry.end {
            return 0;
        }
        if geometry.capacity_end < geometry.end {
            return 0;
        }
        let byte_range = geometry.end - geometry.begin;
        if byte_range % geometry.element_size != 0 {
            return 0;
        }
        (byte_range / geometry.element_size) as usize + 2
    }

    /// Child count as presented to the host. With `apply_limit` the
    /// result is clamped by the configured display bound; the bound
    /// keeps enumeration of huge arrays responsive and never affects
    /// the synthetic `size`/`capacity` values.
    pub fn child_count(&self, apply_limit: bool) -> usize {
        let count = self.child_count_impl();
        if apply_limit {
            if let Some(limit) = self.element_limit {
                return count.min(limit + 2);
            }
        }
        count
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        child_index(name)
    }

    /// Child by index, bounds-checked against the unbounded true count.
    pub fn child_at(&self, index: usize) -> Option<ChildValue> {
        let count = self.child_count_impl();
        if index >= count {
            return None;
        }
        let geometry = self.geometry?;

        match index {
            0 => self.materialize_counter("size", (count - 2) as u64),
            1 => {
                let capacity =
                    (geometry.capacity_end - geometry.begin) / geometry.element_size;
                self.materialize_counter("capacity", capacity)
            }
            _ => {
                let element = (index - 2) as u64;
                Some(ChildValue::Reference {
                    name: format!("[{}]", index - 2),
                    address: geometry.begin + element * geometry.element_size,
                    type_id: geometry.element_type,
                })
            }
        }
    }

    /// One-line summary. An uninitialized or corrupt region yields an
    /// empty string rather than a negative size.
    pub fn summary(&self) -> String {
        let elements = self.child_count_impl() as i64 - 2;
        if elements < 0 {
            return String::new();
        }
        format!("size={elements}")
    }

    fn materialize_counter(&self, name: &str, value: u64) -> Option<ChildValue> {
        let type_id = weak_error!(self
            .session
            .find_type(SIZE_TYPE)
            .ok_or(AssumeError::TypeNotFound(SIZE_TYPE)))?;
        Some(ChildValue::Data {
            name: name.to_string(),
            data: encode_u32(self.session, value as u32),
            type_id,
        })
    }
}

/// `"size"` and `"capacity"` name the synthetic children; `"[i]"`
/// names element `i`. Malformed bracket text resolves to nothing.
fn child_index(name: &str) -> Option<usize> {
    match name {
        "size" => Some(0),
        "capacity" => Some(1),
        _ => {
            let index = name.strip_prefix('[')?.strip_suffix(']')?;
            index.parse::<usize>().ok().map(|i| i + 2)
        }
    }
}

/// Summary producer registered for `eastl::VectorBase` patterns.
pub fn summarize<S: InspectSession>(session: &S, region: Field, config: &DecoderConfig) -> String {
    let mut view = VectorView::new(session, region, config);
    view.refresh();
    view.summary()
}
