//! Membuffers field kinds and their layout rules.

use std::fmt;

/// Largest alignment any field is ever padded to.
pub const MAX_ALIGNMENT: usize = 4;

/// Width of the length prefix that precedes every dynamic field.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Width of the selector that precedes a union's active variant.
pub const UNION_SELECTOR_SIZE: usize = 2;

/// Positional list of field kinds describing one message layout.
pub type Scheme = &'static [FieldType];

/// Per-union lists of candidate variant kinds, in union field order.
pub type Unions = &'static [&'static [FieldType]];

/// Primitive kind of a single membuffers field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Nested message, length prefixed.
    Message,
    /// Raw bytes, length prefixed.
    Bytes,
    /// UTF-8 string, length prefixed.
    String,
    /// Tagged union selector followed by the active variant.
    Union,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// Single byte boolean.
    Bool,
    /// 256-bit unsigned integer, 32 little-endian bytes.
    Uint256,
    /// Fixed 20-byte blob.
    Bytes20,
    /// Fixed 32-byte blob.
    Bytes32,
    /// Array of nested messages.
    MessageArray,
    /// Array of byte blobs.
    BytesArray,
    /// Array of strings.
    StringArray,
    /// Array of `Uint8`.
    Uint8Array,
    /// Array of `Uint16`.
    Uint16Array,
    /// Array of `Uint32`.
    Uint32Array,
    /// Array of `Uint64`.
    Uint64Array,
    /// Array of `Bool`.
    BoolArray,
    /// Array of `Uint256`.
    Uint256Array,
    /// Array of `Bytes20`.
    Bytes20Array,
    /// Array of `Bytes32`.
    Bytes32Array,
}

impl FieldType {
    /// Bytes occupied on the wire by the fixed part of the field.
    ///
    /// For dynamic fields this is the length prefix only.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Uint8 | Self::Bool => 1,
            Self::Uint16 => 2,
            Self::Union => UNION_SELECTOR_SIZE,
            Self::Uint32 => 4,
            Self::Uint64 => 8,
            Self::Bytes20 => 20,
            Self::Uint256 | Self::Bytes32 => 32,
            Self::Message
            | Self::Bytes
            | Self::String
            | Self::MessageArray
            | Self::BytesArray
            | Self::StringArray
            | Self::Uint8Array
            | Self::Uint16Array
            | Self::Uint32Array
            | Self::Uint64Array
            | Self::BoolArray
            | Self::Uint256Array
            | Self::Bytes20Array
            | Self::Bytes32Array => LENGTH_PREFIX_SIZE,
        }
    }

    /// Alignment of the field start: its own width, capped at [`MAX_ALIGNMENT`].
    #[must_use]
    pub const fn alignment(self) -> usize {
        let size = self.size();
        if size > MAX_ALIGNMENT { MAX_ALIGNMENT } else { size }
    }

    /// Whether the field carries a length prefix.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        self.element().is_some() || matches!(self, Self::Message | Self::Bytes | Self::String)
    }

    /// Element kind for array fields.
    #[must_use]
    pub const fn element(self) -> Option<Self> {
        match self {
            Self::MessageArray => Some(Self::Message),
            Self::BytesArray => Some(Self::Bytes),
            Self::StringArray => Some(Self::String),
            Self::Uint8Array => Some(Self::Uint8),
            Self::Uint16Array => Some(Self::Uint16),
            Self::Uint32Array => Some(Self::Uint32),
            Self::Uint64Array => Some(Self::Uint64),
            Self::BoolArray => Some(Self::Bool),
            Self::Uint256Array => Some(Self::Uint256),
            Self::Bytes20Array => Some(Self::Bytes20),
            Self::Bytes32Array => Some(Self::Bytes32),
            _ => None,
        }
    }

    /// Alignment of the content that follows a length prefix.
    ///
    /// Raw bytes and strings are byte aligned, nested messages are word
    /// aligned, arrays follow their element kind.
    #[must_use]
    pub const fn content_alignment(self) -> usize {
        match self {
            Self::Bytes | Self::String => 1,
            Self::Message => MAX_ALIGNMENT,
            _ => match self.element() {
                Some(element) => element.alignment(),
                None => 0,
            },
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Round `offset` up to the alignment of `field`.
#[inline]
#[must_use]
pub const fn align_offset_to_type(offset: usize, field: FieldType) -> usize {
    align_to(offset, field.alignment())
}

/// Round `offset` up to the content alignment of the dynamic `field`.
#[inline]
#[must_use]
pub const fn align_dynamic_field_content_offset(offset: usize, field: FieldType) -> usize {
    align_to(offset, field.content_alignment())
}

#[inline]
const fn align_to(offset: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return offset;
    }
    offset.div_ceil(alignment) * alignment
}
