//! Defensive decoders for EASTL container memory layouts.
//!
//! Given a paused process image behind an [`session::InspectSession`],
//! the crate reconstructs the logical contents of `eastl::VectorBase`,
//! `eastl::basic_string` and `eastl::pair` instances from raw bytes:
//! size and capacity from range pointers, inline-vs-heap string storage
//! from a byte-order-dependent discriminator bit, elements as an
//! addressable, lazily-materialized tree of named children.
//!
//! Decoders never execute code in and never mutate the inspected
//! process, tolerate corrupt or uninitialized memory by degrading to
//! empty or placeholder results, and bound every query so an
//! attacker-or-bug-controlled size field cannot trigger unbounded work.

pub mod decoder;
pub mod error;
pub mod registry;
pub mod session;
pub mod value;

pub use decoder::{ContainerView, DecoderConfig, StringView, VectorView, DEFAULT_ELEMENT_LIMIT};
pub use error::{AssumeError, DecodeError};
pub use registry::{DecoderKind, FormatterEntry, FormatterRegistry, EASTL_CATEGORY};
pub use session::{
    AddressWidth, ByteOrder, InspectSession, MemberLayout, ReadError, TypeId,
};
pub use value::{ChildValue, Field};
