//! Membuffers codec errors

use thiserror::Error;

use super::FieldType;

/// Failures raised while writing or reading a membuffers message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A read or write would run past the end of the buffer.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Offset one past the last byte touched
        needed: usize,
        /// Buffer length
        got: usize,
    },

    /// Content is longer than a 4-byte length prefix can describe.
    #[error("length overflow: {len} bytes does not fit a u32 prefix")]
    LengthOverflow {
        /// Offending content length
        len: usize,
    },

    /// Walking the scheme did not end exactly at the end of the buffer.
    #[error("message structure is invalid: scheme ends at {end}, buffer has {len} bytes")]
    InvalidStructure {
        /// Cursor after the last field
        end: usize,
        /// Buffer length
        len: usize,
    },

    /// Field index is outside the scheme.
    #[error("field {field} is not part of the scheme ({fields} fields)")]
    FieldOutOfRange {
        /// Requested field index
        field: usize,
        /// Number of fields in the scheme
        fields: usize,
    },

    /// Field exists but is not of the requested kind.
    #[error("field {field} is {actual}, not {expected}")]
    FieldTypeMismatch {
        /// Requested field index
        field: usize,
        /// Kind the caller asked for
        expected: FieldType,
        /// Kind declared by the scheme
        actual: FieldType,
    },

    /// Union selector does not name a declared variant.
    #[error("union selector {index} out of range ({variants} variants)")]
    UnknownUnionVariant {
        /// Selector read from the wire
        index: u16,
        /// Number of declared variants
        variants: usize,
    },

    /// Scheme has a union field without a matching variant list.
    #[error("no variant list declared for union #{union_num}")]
    MissingUnionDescriptor {
        /// Ordinal of the union field within the scheme
        union_num: usize,
    },

    /// Field is absent from the buffer and cannot be written in place.
    #[error("field {field} is absent from the buffer")]
    FieldAbsent {
        /// Requested field index
        field: usize,
    },

    /// String content is not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// In-place write of a dynamic field with a different length.
    #[error("cannot resize field in place: has {existing} bytes, got {given}")]
    SizeMismatch {
        /// Current content length
        existing: usize,
        /// Length of the replacement
        given: usize,
    },
}
