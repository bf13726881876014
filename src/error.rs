use crate::session::{ReadError, TypeId};

/// Errors that occur while interpreting debug information about a
/// container layout: missing members, missing types, unusable sizes.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AssumeError {
    #[error("field `{0}` not found")]
    FieldNotFound(&'static str),
    #[error("type `{0}` not found")]
    TypeNotFound(&'static str),
    #[error("`{0}` is not a pointer type")]
    NotAPointer(&'static str),
    #[error("undefined size of type {0}")]
    UnknownSize(TypeId),
    #[error("template argument {0} not found")]
    TemplateArgNotFound(usize),
    #[error("zero-sized element type")]
    ZeroSizedElement,
    #[error("cannot construct an array type for {0}")]
    ArrayTypeUnavailable(TypeId),
    #[error("incomplete interpretation of `{0}`")]
    IncompleteInterp(&'static str),
    #[error("unexpected binary representation of {0}, expect at most {1} got {2} bytes")]
    UnexpectedBinaryRepr(&'static str, usize, usize),
}

/// Any error a decoder operation can hit. Recoverable at the operation
/// boundary: the public accessors map every variant into the degraded
/// presentation (zero count, empty string, placeholder value).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Assume(#[from] AssumeError),
    #[error("error while reading inspected memory: {0}")]
    ReadMemory(#[from] ReadError),
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "eastl", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "eastl", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}
