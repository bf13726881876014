#![allow(dead_code)]

//! In-memory inspection session for decoder tests: a handful of mapped
//! byte segments plus a hand-built type table, standing in for a paused
//! process and its debug information.

use eastl_lens::{
    AddressWidth, ByteOrder, Field, InspectSession, MemberLayout, ReadError, TypeId,
};
use std::cell::RefCell;

struct TypeDef {
    name: String,
    size: u64,
    members: Vec<(String, u64, TypeId)>,
    pointee: Option<TypeId>,
    template_args: Vec<TypeId>,
}

pub struct ImageSession {
    byte_order: ByteOrder,
    width: AddressWidth,
    segments: Vec<(u64, Vec<u8>)>,
    types: RefCell<Vec<TypeDef>>,
}

impl ImageSession {
    pub fn new(byte_order: ByteOrder, width: AddressWidth) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            byte_order,
            width,
            segments: vec![],
            types: RefCell::new(vec![]),
        }
    }

    pub fn define_type(&self, name: &str, size: u64) -> TypeId {
        let mut types = self.types.borrow_mut();
        types.push(TypeDef {
            name: name.to_string(),
            size,
            members: vec![],
            pointee: None,
            template_args: vec![],
        });
        TypeId((types.len() - 1) as u32)
    }

    pub fn add_member(&self, composite: TypeId, name: &str, offset: u64, member: TypeId) {
        self.types.borrow_mut()[composite.0 as usize]
            .members
            .push((name.to_string(), offset, member));
    }

    pub fn set_pointee(&self, pointer: TypeId, pointee: TypeId) {
        self.types.borrow_mut()[pointer.0 as usize].pointee = Some(pointee);
    }

    pub fn add_template_arg(&self, composite: TypeId, arg: TypeId) {
        self.types.borrow_mut()[composite.0 as usize]
            .template_args
            .push(arg);
    }

    pub fn map(&mut self, addr: u64, bytes: Vec<u8>) {
        self.segments.push((addr, bytes));
    }

    /// Overwrite previously mapped bytes, simulating debugee mutation
    /// between two top-level invocations.
    pub fn patch(&mut self, addr: u64, bytes: &[u8]) {
        for (base, data) in self.segments.iter_mut() {
            let end = *base + data.len() as u64;
            if addr >= *base && addr + bytes.len() as u64 <= end {
                let offset = (addr - *base) as usize;
                data[offset..offset + bytes.len()].copy_from_slice(bytes);
                return;
            }
        }
        panic!("patch outside mapped segments: {addr:#x}");
    }

    pub fn encode_ptr(&self, value: u64) -> Vec<u8> {
        encode_unsigned(self.byte_order, value, self.width.bytes())
    }
}

pub fn encode_unsigned(byte_order: ByteOrder, value: u64, len: usize) -> Vec<u8> {
    let le = value.to_le_bytes();
    match byte_order {
        ByteOrder::Little => le[..len].to_vec(),
        ByteOrder::Big => {
            let mut bytes = le[..len].to_vec();
            bytes.reverse();
            bytes
        }
    }
}

impl InspectSession for ImageSession {
    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    fn address_width(&self) -> AddressWidth {
        self.width
    }

    fn read_memory(&self, addr: u64, len: usize) -> Result<Vec<u8>, ReadError> {
        if len == 0 {
            return Ok(vec![]);
        }
        for (base, data) in &self.segments {
            let end = *base + data.len() as u64;
            if addr >= *base && addr + len as u64 <= end {
                let offset = (addr - *base) as usize;
                return Ok(data[offset..offset + len].to_vec());
            }
        }
        Err(ReadError { addr, len })
    }

    fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .borrow()
            .iter()
            .position(|t| t.name == name)
            .map(|i| TypeId(i as u32))
    }

    fn type_size(&self, type_id: TypeId) -> Option<u64> {
        self.types
            .borrow()
            .get(type_id.0 as usize)
            .map(|t| t.size)
    }

    fn member_layout(&self, type_id: TypeId, name: &str) -> Option<MemberLayout> {
        self.types
            .borrow()
            .get(type_id.0 as usize)?
            .members
            .iter()
            .find(|(member, _, _)| member == name)
            .map(|&(_, offset, member_type)| MemberLayout {
                offset,
                type_id: member_type,
            })
    }

    fn pointee(&self, type_id: TypeId) -> Option<TypeId> {
        self.types.borrow().get(type_id.0 as usize)?.pointee
    }

    fn template_argument(&self, type_id: TypeId, index: usize) -> Option<TypeId> {
        self.types
            .borrow()
            .get(type_id.0 as usize)?
            .template_args
            .get(index)
            .copied()
    }

    fn array_of(&self, element: TypeId, len: usize) -> Option<TypeId> {
        let (element_name, element_size) = {
            let types = self.types.borrow();
            let def = types.get(element.0 as usize)?;
            (def.name.clone(), def.size)
        };
        Some(self.define_type(
            &format!("{element_name}[{len}]"),
            element_size * len as u64,
        ))
    }

    fn render_field(&self, field: &Field) -> Result<String, ReadError> {
        let size = self.type_size(field.type_id).unwrap_or(0) as usize;
        if size == 0 || size > 8 {
            return Err(ReadError {
                addr: field.address,
                len: size,
            });
        }
        let data = self.read_memory(field.address, size)?;
        if size == 1 {
            return Ok((data[0] as char).to_string());
        }
        let mut value = 0u64;
        let iter: Box<dyn Iterator<Item = &u8>> = match self.byte_order {
            ByteOrder::Little => Box::new(data.iter().rev()),
            ByteOrder::Big => Box::new(data.iter()),
        };
        for byte in iter {
            value = (value << 8) | u64::from(*byte);
        }
        Ok(value.to_string())
    }
}

// ---------------------------------- VectorBase fixture ----------------------------------

pub const VECTOR_REGION: u64 = 0x100;
pub const VECTOR_ELEMENT_SIZE: u64 = 8;

/// A mapped `eastl::VectorBase<unsigned long>` header with the given
/// range pointers, over a little-endian 64-bit session.
pub fn vector_fixture(begin: u64, end: u64, capacity_end: u64) -> (ImageSession, Field) {
    let mut session = ImageSession::new(ByteOrder::Little, AddressWidth::Eight);

    let element = session.define_type("unsigned long", VECTOR_ELEMENT_SIZE);
    let pointer = session.define_type("unsigned long *", 8);
    session.set_pointee(pointer, element);
    session.define_type("eastl_size_t", 4);

    let capacity_allocator = session.define_type("eastl::compressed_pair", 8);
    session.add_member(capacity_allocator, "mFirst", 0, pointer);

    let vector = session.define_type("eastl::VectorBase<unsigned long, eastl::allocator>", 24);
    session.add_member(vector, "mpBegin", 0, pointer);
    session.add_member(vector, "mpEnd", 8, pointer);
    session.add_member(vector, "mCapacityAllocator", 16, capacity_allocator);

    let mut header = vec![];
    header.extend_from_slice(&session.encode_ptr(begin));
    header.extend_from_slice(&session.encode_ptr(end));
    header.extend_from_slice(&session.encode_ptr(capacity_end));
    session.map(VECTOR_REGION, header);

    (session, Field::new(VECTOR_REGION, vector))
}

// ---------------------------------- basic_string fixture ----------------------------------

pub const STRING_REGION: u64 = 0x200;
pub const STRING_HEAP_DATA: u64 = 0x4000;
/// `(sizeof(HeapLayout) - 1) / sizeof(char)` with a 24-byte layout.
pub const SSO_CAPACITY: u64 = 23;

pub struct StringFixture {
    pub session: ImageSession,
    pub region: Field,
}

fn string_types(session: &ImageSession) -> TypeId {
    let char_type = session.define_type("char", 1);
    let char_pointer = session.define_type("char *", 8);
    session.set_pointee(char_pointer, char_type);
    let size_type = session.define_type("size_type", 8);
    session.define_type("eastl_size_t", 4);
    session.define_type("bool", 1);

    let sso_size = session.define_type("SSOSize", 1);
    session.add_member(sso_size, "mnRemainingSize", 0, char_type);

    let char_array = session.define_type("char[23]", SSO_CAPACITY);
    let sso_layout = session.define_type("SSOLayout", 24);
    session.add_member(sso_layout, "mData", 0, char_array);
    session.add_member(sso_layout, "mRemainingSizeField", SSO_CAPACITY, sso_size);

    let heap_layout = session.define_type("HeapLayout", 24);
    session.add_member(heap_layout, "mpBegin", 0, char_pointer);
    session.add_member(heap_layout, "mnSize", 8, size_type);
    session.add_member(heap_layout, "mnCapacity", 16, size_type);

    let layout = session.define_type("Layout", 24);
    session.add_member(layout, "sso", 0, sso_layout);
    session.add_member(layout, "heap", 0, heap_layout);

    let pair = session.define_type("eastl::compressed_pair<Layout>", 24);
    session.add_member(pair, "mFirst", 0, layout);

    let string = session.define_type("eastl::basic_string<char>", 24);
    session.add_member(string, "mPair", 0, pair);
    session.add_template_arg(string, char_type);

    string
}

/// An inline (SSO) string holding `content`, little-endian.
pub fn inline_string_fixture(content: &str) -> StringFixture {
    assert!(content.len() as u64 <= SSO_CAPACITY);
    let mut session = ImageSession::new(ByteOrder::Little, AddressWidth::Eight);
    let string = string_types(&session);

    let mut buffer = vec![0u8; 24];
    buffer[..content.len()].copy_from_slice(content.as_bytes());
    buffer[SSO_CAPACITY as usize] = (SSO_CAPACITY - content.len() as u64) as u8;
    session.map(STRING_REGION, buffer);

    StringFixture {
        session,
        region: Field::new(STRING_REGION, string),
    }
}

/// A heap string of `content` with the given stored capacity (the heap
/// flag bit is set on both the discriminator and the capacity field).
pub fn heap_string_fixture(content: &str, capacity: u64) -> StringFixture {
    let mut session = ImageSession::new(ByteOrder::Little, AddressWidth::Eight);
    let string = string_types(&session);

    let mut buffer = vec![0u8; 24];
    buffer[..8].copy_from_slice(&session.encode_ptr(STRING_HEAP_DATA));
    buffer[8..16].copy_from_slice(&encode_unsigned(
        ByteOrder::Little,
        content.len() as u64,
        8,
    ));
    buffer[16..24].copy_from_slice(&encode_unsigned(
        ByteOrder::Little,
        capacity | (1 << 63),
        8,
    ));
    buffer[SSO_CAPACITY as usize] = 0x80;
    session.map(STRING_REGION, buffer);
    session.map(STRING_HEAP_DATA, content.as_bytes().to_vec());

    StringFixture {
        session,
        region: Field::new(STRING_REGION, string),
    }
}

/// A string fixture with only the discriminator byte populated, for
/// storage-mode classification under a chosen byte order.
pub fn discriminator_fixture(byte_order: ByteOrder, discriminator: u8) -> StringFixture {
    let mut session = ImageSession::new(byte_order, AddressWidth::Eight);
    let string = string_types(&session);

    let mut buffer = vec![0u8; 24];
    buffer[SSO_CAPACITY as usize] = discriminator;
    session.map(STRING_REGION, buffer);

    StringFixture {
        session,
        region: Field::new(STRING_REGION, string),
    }
}

// ---------------------------------- pair fixture ----------------------------------

pub const PAIR_REGION: u64 = 0x300;

/// An `eastl::pair<char, char>` region holding two rendered-as-char
/// members.
pub fn pair_fixture(first: u8, second: u8) -> (ImageSession, Field) {
    let mut session = ImageSession::new(ByteOrder::Little, AddressWidth::Eight);

    let char_type = session.define_type("char", 1);
    let pair = session.define_type("eastl::pair<char, char>", 2);
    session.add_member(pair, "first", 0, char_type);
    session.add_member(pair, "second", 1, char_type);

    session.map(PAIR_REGION, vec![first, second]);

    (session, Field::new(PAIR_REGION, pair))
}
