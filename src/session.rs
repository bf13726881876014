use crate::value::Field;
use bytes::Bytes;
use std::fmt::{Display, Formatter};

/// Byte order of the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Pointer width of the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    Four,
    Eight,
}

impl AddressWidth {
    pub fn bytes(self) -> usize {
        match self {
            AddressWidth::Four => 4,
            AddressWidth::Eight => 8,
        }
    }
}

/// Opaque handle into the host type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Offset and type of a named member inside a composite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLayout {
    pub offset: u64,
    pub type_id: TypeId,
}

/// A byte-range read from the inspected process failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot read {len} bytes at {addr:#x}")]
pub struct ReadError {
    pub addr: u64,
    pub len: usize,
}

/// Boundary to the host inspection environment: one paused process
/// image plus its debug-information type system.
///
/// All operations are synchronous queries. Type lookups return `None`
/// for unknown names or handles, a normal outcome for optional or
/// newer ABI fields, never an error.
pub trait InspectSession {
    fn byte_order(&self) -> ByteOrder;
    fn address_width(&self) -> AddressWidth;

    /// Read `len` raw bytes at `addr` from the inspected process image.
    fn read_memory(&self, addr: u64, len: usize) -> Result<Vec<u8>, ReadError>;

    /// Resolve a type by its declared name.
    fn find_type(&self, name: &str) -> Option<TypeId>;

    /// Size of a type in bytes, if known.
    fn type_size(&self, type_id: TypeId) -> Option<u64>;

    /// Layout of a named member of a composite type.
    fn member_layout(&self, type_id: TypeId, name: &str) -> Option<MemberLayout>;

    /// Pointee type of a pointer type.
    fn pointee(&self, type_id: TypeId) -> Option<TypeId>;

    /// N-th template (generic) argument of an instantiated type.
    fn template_argument(&self, type_id: TypeId, index: usize) -> Option<TypeId>;

    /// An array type of `len` elements of `element`.
    fn array_of(&self, element: TypeId, len: usize) -> Option<TypeId>;

    /// Host-default textual rendering of a field value.
    fn render_field(&self, field: &Field) -> Result<String, ReadError>;
}

/// Encode an unsigned 32-bit value in the session byte order.
pub fn encode_u32<S: InspectSession + ?Sized>(session: &S, value: u32) -> Bytes {
    match session.byte_order() {
        ByteOrder::Little => Bytes::copy_from_slice(&value.to_le_bytes()),
        ByteOrder::Big => Bytes::copy_from_slice(&value.to_be_bytes()),
    }
}

/// Encode a text as a NUL-terminated narrow string.
pub fn encode_c_string<S: InspectSession + ?Sized>(_session: &S, text: &str) -> Bytes {
    let mut buf = Vec::with_capacity(text.len() + 1);
    buf.extend_from_slice(text.as_bytes());
    buf.push(0);
    Bytes::from(buf)
}
