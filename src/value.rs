use crate::error::{AssumeError, DecodeError};
use crate::session::{ByteOrder, InspectSession, TypeId};
use bytes::Bytes;

/// A typed region of the inspected address space: a container instance
/// or one of its members. Not owned by a decoder; only valid within the
/// refresh cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub address: u64,
    pub type_id: TypeId,
}

impl Field {
    pub fn new(address: u64, type_id: TypeId) -> Self {
        Self { address, type_id }
    }

    /// Resolve a named member as a new field.
    pub fn member<S: InspectSession + ?Sized>(
        &self,
        session: &S,
        name: &'static str,
    ) -> Result<Field, AssumeError> {
        let layout = session
            .member_layout(self.type_id, name)
            .ok_or(AssumeError::FieldNotFound(name))?;
        Ok(Field {
            address: self.address + layout.offset,
            type_id: layout.type_id,
        })
    }

    pub fn byte_size<S: InspectSession + ?Sized>(
        &self,
        session: &S,
    ) -> Result<u64, AssumeError> {
        session
            .type_size(self.type_id)
            .ok_or(AssumeError::UnknownSize(self.type_id))
    }

    /// Read this field as an unsigned integer in the session byte order.
    pub fn read_unsigned<S: InspectSession + ?Sized>(
        &self,
        session: &S,
    ) -> Result<u64, DecodeError> {
        let size = self.byte_size(session)? as usize;
        if size == 0 || size > 8 {
            return Err(AssumeError::UnexpectedBinaryRepr("unsigned field", 8, size).into());
        }

        let data = session.read_memory(self.address, size)?;
        let mut value = 0u64;
        match session.byte_order() {
            ByteOrder::Little => {
                for byte in data.iter().rev() {
                    value = (value << 8) | u64::from(*byte);
                }
            }
            ByteOrder::Big => {
                for byte in data.iter() {
                    value = (value << 8) | u64::from(*byte);
                }
            }
        }
        Ok(value)
    }
}

/// A decoded child of a container view, materialized lazily.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildValue {
    /// A value built from an encoded buffer (synthetic counters, inline
    /// string content, placeholders). Corresponds to the host
    /// `materialize(name, buffer, type)` primitive.
    Data {
        name: String,
        data: Bytes,
        type_id: TypeId,
    },
    /// An addressable value the host reads on demand (array elements).
    Reference {
        name: String,
        address: u64,
        type_id: TypeId,
    },
}

impl ChildValue {
    pub fn name(&self) -> &str {
        match self {
            ChildValue::Data { name, .. } => name,
            ChildValue::Reference { name, .. } => name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            ChildValue::Data { type_id, .. } => *type_id,
            ChildValue::Reference { type_id, .. } => *type_id,
        }
    }
}
