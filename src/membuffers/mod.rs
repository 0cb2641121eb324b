//! Membuffers wire format
//!
//! Positional, schema-driven binary encoding. A message is a sequence of
//! fields laid out in scheme order with no tags:
//!
//! - Fixed-width fields are little-endian and aligned to their own width,
//!   capped at 4 bytes.
//! - Dynamic fields (bytes, strings, nested messages, arrays) carry a 4-byte
//!   length prefix holding the content byte count.
//! - Unions carry a 2-byte selector followed by the selected variant only.
//! - Trailing fields may be omitted; readers treat them as zero or empty.
//!
//! Writing goes through [`Encodable`] and [`Builder`]; reading goes through
//! [`InternalMessage`], which computes offsets lazily on every access.

mod builder;
mod error;
mod message;
mod types;

pub use builder::{Builder, Encodable, build, calc_required_size};
pub use error::CodecError;
pub use message::{ArrayElement, ArrayIter, InternalMessage, NO_UNIONS, RawMessage};
pub use types::{
    FieldType, LENGTH_PREFIX_SIZE, MAX_ALIGNMENT, Scheme, UNION_SELECTOR_SIZE, Unions,
    align_dynamic_field_content_offset, align_offset_to_type,
};
