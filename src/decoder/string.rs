//! Decoder for the `eastl::basic_string` layout: a two-mode union
//! (`sso` inline buffer / `heap` record) discriminated by one bit of
//! the shared `mnRemainingSize` counter. The bit position depends on
//! the storage byte order, so both probes are two-branch tables keyed
//! by `ByteOrder`, never a single constant.

use crate::decoder::{guard_len, SIZE_TYPE};
use crate::error::{AssumeError, DecodeError};
use crate::session::{encode_c_string, encode_u32, ByteOrder, InspectSession, TypeId};
use crate::value::{ChildValue, Field};
use crate::weak_error;
use anyhow::Context;
use bytes::Bytes;

/// Substituted for the string content when a read fails.
const READ_FAILURE_PLACEHOLDER: &str = "Error reading characters of string";

/// Inline-vs-heap discriminator bit inside `mnRemainingSize`.
fn sso_mask(byte_order: ByteOrder) -> u64 {
    match byte_order {
        ByteOrder::Little => 0x80,
        ByteOrder::Big => 0x1,
    }
}

/// Flag bit stored in the heap record's `mnCapacity`, computed from the
/// field width (`~(size_type(~0) >> 1)`). Distinct from [`sso_mask`].
fn heap_capacity_mask(byte_order: ByteOrder, field_bytes: usize) -> u64 {
    match byte_order {
        ByteOrder::Little => 1u64 << (field_bytes.clamp(1, 8) * 8 - 1),
        ByteOrder::Big => 0x1,
    }
}

/// Union members and type constants captured by one refresh pass. The
/// storage mode is deliberately absent: it is recomputed from current
/// memory on every query.
struct StringParts {
    sso: Field,
    heap: Field,
    element_type: TypeId,
    element_size: u64,
    inline_capacity: u64,
}

/// A four-child view over a `basic_string` region: `length`,
/// `capacity`, `uses_heap` and `value`, in that fixed order.
pub struct StringView<'a, S: InspectSession> {
    session: &'a S,
    region: Field,
    parts: Option<StringParts>,
}

impl<'a, S: InspectSession> StringView<'a, S> {
    pub fn new(session: &'a S, region: Field) -> Self {
        Self {
            session,
            region,
            parts: None,
        }
    }

    /// Locate the two-mode union and the element type. Does not probe
    /// the storage mode.
    pub fn refresh(&mut self) {
        self.parts = weak_error!(
            self.read_parts()
                .context("basic_string layout interpretation")
        );
    }

    fn read_parts(&self) -> Result<StringParts, DecodeError> {
        let layout = self
            .region
            .member(self.session, "mPair")?
            .member(self.session, "mFirst")?;
        let sso = layout.member(self.session, "sso")?;
        let heap = layout.member(self.session, "heap")?;

        let element_type = self
            .session
            .template_argument(self.region.type_id, 0)
            .ok_or(AssumeError::TemplateArgNotFound(0))?;
        let element_size = self
            .session
            .type_size(element_type)
            .ok_or(AssumeError::UnknownSize(element_type))?;
        if element_size == 0 {
            return Err(AssumeError::ZeroSizedElement.into());
        }

        // Both union members span the whole buffer, so the heap record
        // size is the total inline buffer size. One byte is the control
        // byte holding the remaining-size counter.
        let buffer_size = heap.byte_size(self.session)?;
        let inline_capacity = buffer_size.saturating_sub(1) / element_size;

        Ok(StringParts {
            sso,
            heap,
            element_type,
            element_size,
            inline_capacity,
        })
    }

    fn parts(&self) -> Result<&StringParts, DecodeError> {
        self.parts
            .as_ref()
            .ok_or(DecodeError::Assume(AssumeError::IncompleteInterp(
                "basic_string",
            )))
    }

    fn read_remaining(&self) -> Result<u64, DecodeError> {
        self.parts()?
            .sso
            .member(self.session, "mRemainingSizeField")?
            .member(self.session, "mnRemainingSize")?
            .read_unsigned(self.session)
    }

    fn read_is_heap(&self) -> Result<bool, DecodeError> {
        let remaining = self.read_remaining()?;
        Ok(remaining & sso_mask(self.session.byte_order()) != 0)
    }

    fn read_length(&self) -> Result<u64, DecodeError> {
        if self.read_is_heap()? {
            return self
                .parts()?
                .heap
                .member(self.session, "mnSize")?
                .read_unsigned(self.session);
        }
        // Inline mode leaves the discriminator bit clear, so the raw
        // counter is the remaining capacity.
        let remaining = self.read_remaining()?;
        Ok(self.parts()?.inline_capacity.saturating_sub(remaining))
    }

    fn read_capacity(&self) -> Result<u64, DecodeError> {
        if !self.read_is_heap()? {
            return Ok(self.parts()?.inline_capacity);
        }
        let capacity = self.parts()?.heap.member(self.session, "mnCapacity")?;
        let field_bytes = capacity.byte_size(self.session)? as usize;
        let raw = capacity.read_unsigned(self.session)?;
        Ok(raw & !heap_capacity_mask(self.session.byte_order(), field_bytes))
    }

    fn read_value(&self) -> Result<ChildValue, DecodeError> {
        let parts = self.parts()?;
        let length = guard_len(self.read_length()?);
        let byte_len = (length * parts.element_size) as usize;

        let data_addr = if self.read_is_heap()? {
            parts
                .heap
                .member(self.session, "mpBegin")?
                .read_unsigned(self.session)?
        } else {
            parts.sso.member(self.session, "mData")?.address
        };

        let data = self.session.read_memory(data_addr, byte_len)?;
        let array_type = self
            .session
            .array_of(parts.element_type, length as usize)
            .ok_or(AssumeError::ArrayTypeUnavailable(parts.element_type))?;

        Ok(ChildValue::Data {
            name: "value".to_string(),
            data: Bytes::from(data),
            type_id: array_type,
        })
    }

    /// Current storage mode, recomputed from memory. `false` when the
    /// discriminator cannot be read.
    pub fn is_heap(&self) -> bool {
        weak_error!(self.read_is_heap().context("basic_string mode probe")).unwrap_or(false)
    }

    /// Logical length, zero on failure.
    pub fn length(&self) -> u64 {
        weak_error!(self.read_length().context("basic_string length")).unwrap_or(0)
    }

    /// Logical capacity, zero on failure.
    pub fn capacity(&self) -> u64 {
        weak_error!(self.read_capacity().context("basic_string capacity")).unwrap_or(0)
    }

    /// The string content as an element-array value of exactly
    /// `length()` elements. A failed read yields a descriptive
    /// placeholder instead of fabricated content.
    pub fn value(&self) -> Option<ChildValue> {
        match self.read_value() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(target: "eastl", "basic_string value: {e:#}");
                self.placeholder()
            }
        }
    }

    fn placeholder(&self) -> Option<ChildValue> {
        let char_type = weak_error!(self
            .session
            .find_type("char")
            .ok_or(AssumeError::TypeNotFound("char")))?;
        let array_type = weak_error!(self
            .session
            .array_of(char_type, READ_FAILURE_PLACEHOLDER.len() + 1)
            .ok_or(AssumeError::ArrayTypeUnavailable(char_type)))?;
        Some(ChildValue::Data {
            name: "value".to_string(),
            data: encode_c_string(self.session, READ_FAILURE_PLACEHOLDER),
            type_id: array_type,
        })
    }

    pub fn child_count(&self) -> usize {
        4
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        child_index(name)
    }

    pub fn child_at(&self, index: usize) -> Option<ChildValue> {
        match index {
            0 => self.materialize_counter("length", self.length()),
            1 => self.materialize_counter("capacity", self.capacity()),
            2 => self.materialize_flag("uses_heap", self.is_heap()),
            3 => self.value(),
            _ => None,
        }
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

    fn materialize_flag(&self, name: &str, value: bool) -> Option<ChildValue> {
        let type_id = weak_error!(self
            .session
            .find_type("bool")
            .ok_or(AssumeError::TypeNotFound("bool")))?;
        Some(ChildValue::Data {
            name: name.to_string(),
            data: encode_u32(self.session, u32::from(value)),
            type_id,
        })
    }
}

fn child_index(name: &str) -> Option<usize> {
    match name {
        "length" => Some(0),
        "capacity" => Some(1),
        "uses_heap" => Some(2),
        "value" => Some(3),
        _ => None,
    }
}
