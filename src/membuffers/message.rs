//! Lazy membuffers reader.
//!
//! [`InternalMessage`] never builds an offset table. Every accessor walks the
//! scheme from the start of the buffer, sizing each preceding field (fixed
//! fields by width, dynamic fields by their length prefix) until it reaches
//! the requested one. Raw sub-buffers can therefore be sliced out and hashed
//! without decoding their contents.

use std::marker::PhantomData;

use primitive_types::U256;
use tracing::trace;

use super::types::{
    LENGTH_PREFIX_SIZE, UNION_SELECTOR_SIZE, align_dynamic_field_content_offset,
    align_offset_to_type,
};
use super::{CodecError, FieldType, Scheme, Unions};

/// Union list for schemes without union fields.
pub const NO_UNIONS: Unions = &[];

/// Location of one field inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSpan {
    /// Kind of the stored value; for unions, the active variant's kind.
    kind: FieldType,
    /// First byte of the field, including any prefix or selector.
    header: usize,
    /// Content range.
    start: usize,
    end: usize,
    /// For unions: selector and offset of the variant value.
    variant: Option<(u16, usize)>,
}

fn ensure_len(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if needed > buf.len() {
        return Err(CodecError::BufferTooSmall {
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], CodecError> {
    ensure_len(buf, offset + N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    Ok(out)
}

/// Span of a non-union value of `kind` starting at or after `offset`.
fn value_span(buf: &[u8], offset: usize, kind: FieldType) -> Result<FieldSpan, CodecError> {
    let header = align_offset_to_type(offset, kind);
    let (start, end) = if kind.is_dynamic() {
        let len = u32::from_le_bytes(read_array(buf, header)?) as usize;
        let start = align_dynamic_field_content_offset(header + LENGTH_PREFIX_SIZE, kind);
        (start, start + len)
    } else {
        (header, header + kind.size())
    };
    ensure_len(buf, end)?;
    Ok(FieldSpan {
        kind,
        header,
        start,
        end,
        variant: None,
    })
}

/// Read-only (or in-place writable) view over one encoded message.
#[derive(Debug, Clone)]
pub struct InternalMessage<B> {
    buf: B,
    scheme: Scheme,
    unions: Unions,
}

impl<B: AsRef<[u8]>> InternalMessage<B> {
    /// Wrap `buf` with the layout described by `scheme` and `unions`.
    pub fn new(buf: B, scheme: Scheme, unions: Unions) -> Self {
        Self {
            buf,
            scheme,
            unions,
        }
    }

    /// Give the underlying buffer back.
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// The whole encoded message.
    #[must_use]
    pub fn raw_buffer(&self) -> &[u8] {
        self.buf.as_ref()
    }

    fn union_span(
        &self,
        buf: &[u8],
        offset: usize,
        union_num: usize,
    ) -> Result<FieldSpan, CodecError> {
        let header = align_offset_to_type(offset, FieldType::Union);
        let index = u16::from_le_bytes(read_array(buf, header)?);
        let variants = self
            .unions
            .get(union_num)
            .ok_or(CodecError::MissingUnionDescriptor { union_num })?;
        let kind = variants
            .get(usize::from(index))
            .copied()
            .ok_or(CodecError::UnknownUnionVariant {
                index,
                variants: variants.len(),
            })?;
        let value = value_span(buf, header + UNION_SELECTOR_SIZE, kind)?;
        Ok(FieldSpan {
            header,
            variant: Some((index, value.header)),
            ..value
        })
    }

    /// Walk the scheme. `visit` sees each present field and may stop the walk
    /// by returning `Some`. Returns the visitor's result, or the cursor after
    /// the last present field.
    fn walk<T>(
        &self,
        mut visit: impl FnMut(usize, FieldSpan) -> Option<T>,
    ) -> Result<Result<T, usize>, CodecError> {
        let buf = self.buf.as_ref();
        let mut offset = 0;
        let mut union_num = 0;
        for (field, &kind) in self.scheme.iter().enumerate() {
            if offset == buf.len() {
                // trailing fields omitted by an older writer
                break;
            }
            let span = if kind == FieldType::Union {
                union_num += 1;
                self.union_span(buf, offset, union_num - 1)?
            } else {
                value_span(buf, offset, kind)?
            };
            if let Some(found) = visit(field, span) {
                return Ok(Ok(found));
            }
            offset = span.end;
        }
        Ok(Err(offset))
    }

    fn locate(&self, field: usize) -> Result<Option<FieldSpan>, CodecError> {
        if field >= self.scheme.len() {
            return Err(CodecError::FieldOutOfRange {
                field,
                fields: self.scheme.len(),
            });
        }
        Ok(self
            .walk(|index, span| (index == field).then_some(span))?
            .ok())
    }

    fn locate_typed(
        &self,
        field: usize,
        expected: FieldType,
    ) -> Result<Option<FieldSpan>, CodecError> {
        match self.scheme.get(field) {
            Some(&actual) if actual != expected => Err(CodecError::FieldTypeMismatch {
                field,
                expected,
                actual,
            }),
            _ => self.locate(field),
        }
    }

    /// Structural scan: every field must fit and the walk must end exactly
    /// at the end of the buffer.
    pub fn validate(&self) -> Result<(), CodecError> {
        let len = self.buf.as_ref().len();
        let end = match self.walk(|_, _| None::<()>) {
            Ok(Err(end)) => end,
            Ok(Ok(())) => len,
            Err(err) => {
                trace!(error = %err, len, "membuffers scan failed");
                return Err(err);
            }
        };
        if end != len {
            trace!(end, len, "membuffers scan did not consume the buffer");
            return Err(CodecError::InvalidStructure { end, len });
        }
        Ok(())
    }

    /// Whether [`validate`](Self::validate) succeeds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn fixed<const N: usize>(&self, field: usize, kind: FieldType) -> Result<[u8; N], CodecError> {
        match self.locate_typed(field, kind)? {
            Some(span) => read_array(self.buf.as_ref(), span.start),
            None => Ok([0u8; N]),
        }
    }

    fn content(&self, field: usize, kind: FieldType) -> Result<&[u8], CodecError> {
        Ok(match self.locate_typed(field, kind)? {
            Some(span) => &self.buf.as_ref()[span.start..span.end],
            None => &[],
        })
    }

    /// Content of a field without its length prefix. Empty when absent.
    pub fn raw_buffer_for_field(&self, field: usize) -> Result<&[u8], CodecError> {
        Ok(match self.locate(field)? {
            Some(span) => &self.buf.as_ref()[span.start..span.end],
            None => &[],
        })
    }

    /// Field bytes including its length prefix, so the slice is itself a
    /// self-describing encoded region. Empty when absent.
    pub fn raw_buffer_with_header_for_field(&self, field: usize) -> Result<&[u8], CodecError> {
        Ok(match self.locate(field)? {
            Some(span) => &self.buf.as_ref()[span.header..span.end],
            None => &[],
        })
    }

    /// Read a `Uint8` field.
    pub fn get_u8(&self, field: usize) -> Result<u8, CodecError> {
        Ok(self.fixed::<1>(field, FieldType::Uint8)?[0])
    }

    /// Read a `Uint16` field.
    pub fn get_u16(&self, field: usize) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.fixed(field, FieldType::Uint16)?))
    }

    /// Read a `Uint32` field.
    pub fn get_u32(&self, field: usize) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.fixed(field, FieldType::Uint32)?))
    }

    /// Read a `Uint64` field.
    pub fn get_u64(&self, field: usize) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.fixed(field, FieldType::Uint64)?))
    }

    /// Read a `Bool` field.
    pub fn get_bool(&self, field: usize) -> Result<bool, CodecError> {
        Ok(self.fixed::<1>(field, FieldType::Bool)?[0] != 0)
    }

    /// Read a `Uint256` field.
    pub fn get_uint256(&self, field: usize) -> Result<U256, CodecError> {
        let bytes: [u8; 32] = self.fixed(field, FieldType::Uint256)?;
        Ok(U256::from_little_endian(&bytes))
    }

    /// Read a `Bytes20` field.
    pub fn get_bytes20(&self, field: usize) -> Result<[u8; 20], CodecError> {
        self.fixed(field, FieldType::Bytes20)
    }

    /// Read a `Bytes32` field.
    pub fn get_bytes32(&self, field: usize) -> Result<[u8; 32], CodecError> {
        self.fixed(field, FieldType::Bytes32)
    }

    /// Borrow a `Bytes` field.
    pub fn get_bytes(&self, field: usize) -> Result<&[u8], CodecError> {
        self.content(field, FieldType::Bytes)
    }

    /// Borrow a `String` field.
    pub fn get_string(&self, field: usize) -> Result<&str, CodecError> {
        std::str::from_utf8(self.content(field, FieldType::String)?)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    /// Borrow the encoded content of a nested `Message` field.
    pub fn get_message(&self, field: usize) -> Result<&[u8], CodecError> {
        self.content(field, FieldType::Message)
    }

    /// Selector of a union field; zero when absent.
    pub fn get_union_index(&self, field: usize) -> Result<u16, CodecError> {
        Ok(self
            .locate_typed(field, FieldType::Union)?
            .and_then(|span| span.variant)
            .map_or(0, |(index, _)| index))
    }

    /// If the union `field` holds `variant`, the offset of its value for use
    /// with the `*_in_offset` readers.
    pub fn is_union_index(&self, field: usize, variant: u16) -> Result<Option<usize>, CodecError> {
        Ok(self
            .locate_typed(field, FieldType::Union)?
            .and_then(|span| span.variant)
            .and_then(|(index, offset)| (index == variant).then_some(offset)))
    }

    fn span_in_offset(&self, offset: usize, kind: FieldType) -> Result<FieldSpan, CodecError> {
        value_span(self.buf.as_ref(), offset, kind)
    }

    fn fixed_in_offset<const N: usize>(
        &self,
        offset: usize,
        kind: FieldType,
    ) -> Result<[u8; N], CodecError> {
        let span = self.span_in_offset(offset, kind)?;
        read_array(self.buf.as_ref(), span.start)
    }

    fn content_in_offset(&self, offset: usize, kind: FieldType) -> Result<&[u8], CodecError> {
        let span = self.span_in_offset(offset, kind)?;
        Ok(&self.buf.as_ref()[span.start..span.end])
    }

    /// Read a `Uint8` at a union variant offset.
    pub fn get_u8_in_offset(&self, offset: usize) -> Result<u8, CodecError> {
        Ok(self.fixed_in_offset::<1>(offset, FieldType::Uint8)?[0])
    }

    /// Read a `Uint16` at a union variant offset.
    pub fn get_u16_in_offset(&self, offset: usize) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.fixed_in_offset(offset, FieldType::Uint16)?))
    }

    /// Read a `Uint32` at a union variant offset.
    pub fn get_u32_in_offset(&self, offset: usize) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.fixed_in_offset(offset, FieldType::Uint32)?))
    }

    /// Read a `Uint64` at a union variant offset.
    pub fn get_u64_in_offset(&self, offset: usize) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.fixed_in_offset(offset, FieldType::Uint64)?))
    }

    /// Read a `Bool` at a union variant offset.
    pub fn get_bool_in_offset(&self, offset: usize) -> Result<bool, CodecError> {
        Ok(self.fixed_in_offset::<1>(offset, FieldType::Bool)?[0] != 0)
    }

    /// Read a `Uint256` at a union variant offset.
    pub fn get_uint256_in_offset(&self, offset: usize) -> Result<U256, CodecError> {
        let bytes: [u8; 32] = self.fixed_in_offset(offset, FieldType::Uint256)?;
        Ok(U256::from_little_endian(&bytes))
    }

    /// Read a `Bytes20` at a union variant offset.
    pub fn get_bytes20_in_offset(&self, offset: usize) -> Result<[u8; 20], CodecError> {
        self.fixed_in_offset(offset, FieldType::Bytes20)
    }

    /// Read a `Bytes32` at a union variant offset.
    pub fn get_bytes32_in_offset(&self, offset: usize) -> Result<[u8; 32], CodecError> {
        self.fixed_in_offset(offset, FieldType::Bytes32)
    }

    /// Borrow `Bytes` at a union variant offset.
    pub fn get_bytes_in_offset(&self, offset: usize) -> Result<&[u8], CodecError> {
        self.content_in_offset(offset, FieldType::Bytes)
    }

    /// Borrow a `String` at a union variant offset.
    pub fn get_string_in_offset(&self, offset: usize) -> Result<&str, CodecError> {
        std::str::from_utf8(self.content_in_offset(offset, FieldType::String)?)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    /// Borrow a nested `Message` at a union variant offset.
    pub fn get_message_in_offset(&self, offset: usize) -> Result<&[u8], CodecError> {
        self.content_in_offset(offset, FieldType::Message)
    }

    /// Lazy iterator over the array `field`.
    pub fn array_iter<'s, T: ArrayElement<'s>>(
        &'s self,
        field: usize,
    ) -> Result<ArrayIter<'s, T>, CodecError> {
        let actual = *self.scheme.get(field).ok_or(CodecError::FieldOutOfRange {
            field,
            fields: self.scheme.len(),
        })?;
        if actual.element() != Some(T::KIND) {
            return Err(CodecError::FieldTypeMismatch {
                field,
                expected: T::ARRAY,
                actual,
            });
        }
        let buf = self.buf.as_ref();
        Ok(match self.locate(field)? {
            Some(span) => ArrayIter::new(buf, span.start, span.end),
            None => ArrayIter::new(buf, 0, 0),
        })
    }

    /// Lazy iterator over an array stored at a union variant offset.
    pub fn array_iter_in_offset<'s, T: ArrayElement<'s>>(
        &'s self,
        offset: usize,
    ) -> Result<ArrayIter<'s, T>, CodecError> {
        let span = self.span_in_offset(offset, T::ARRAY)?;
        Ok(ArrayIter::new(self.buf.as_ref(), span.start, span.end))
    }

    /// Iterator over the encoded content of each message in a `MessageArray`.
    pub fn get_message_array_iter(
        &self,
        field: usize,
    ) -> Result<ArrayIter<'_, RawMessage<'_>>, CodecError> {
        self.array_iter(field)
    }

    /// Iterator over a `BytesArray` field.
    pub fn get_bytes_array_iter(&self, field: usize) -> Result<ArrayIter<'_, &[u8]>, CodecError> {
        self.array_iter(field)
    }

    /// Iterator over a `StringArray` field.
    pub fn get_string_array_iter(&self, field: usize) -> Result<ArrayIter<'_, &str>, CodecError> {
        self.array_iter(field)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> InternalMessage<B> {
    fn existing(&self, field: usize, kind: FieldType) -> Result<FieldSpan, CodecError> {
        self.locate_typed(field, kind)?
            .ok_or(CodecError::FieldAbsent { field })
    }

    fn overwrite(&mut self, field: usize, kind: FieldType, bytes: &[u8]) -> Result<(), CodecError> {
        let span = self.existing(field, kind)?;
        let existing = span.end - span.start;
        if existing != bytes.len() {
            return Err(CodecError::SizeMismatch {
                existing,
                given: bytes.len(),
            });
        }
        self.buf.as_mut()[span.start..span.end].copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrite a `Uint8` field in place.
    pub fn set_u8(&mut self, field: usize, v: u8) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Uint8, &[v])
    }

    /// Overwrite a `Uint16` field in place.
    pub fn set_u16(&mut self, field: usize, v: u16) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Uint16, &v.to_le_bytes())
    }

    /// Overwrite a `Uint32` field in place.
    pub fn set_u32(&mut self, field: usize, v: u32) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Uint32, &v.to_le_bytes())
    }

    /// Overwrite a `Uint64` field in place.
    pub fn set_u64(&mut self, field: usize, v: u64) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Uint64, &v.to_le_bytes())
    }

    /// Overwrite a `Bool` field in place.
    pub fn set_bool(&mut self, field: usize, v: bool) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Bool, &[u8::from(v)])
    }

    /// Overwrite a `Bytes` field in place; the length must not change.
    pub fn set_bytes(&mut self, field: usize, v: &[u8]) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::Bytes, v)
    }

    /// Overwrite a `String` field in place; the byte length must not change.
    pub fn set_string(&mut self, field: usize, v: &str) -> Result<(), CodecError> {
        self.overwrite(field, FieldType::String, v.as_bytes())
    }

    /// View a nested `Message` field mutably, for in-place edits inside it.
    pub fn get_message_mut(&mut self, field: usize) -> Result<&mut [u8], CodecError> {
        let span = self.existing(field, FieldType::Message)?;
        Ok(&mut self.buf.as_mut()[span.start..span.end])
    }
}

/// Content of one nested message inside a `MessageArray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage<'a>(pub &'a [u8]);

impl<'a> RawMessage<'a> {
    /// Encoded message bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }
}

impl super::Encodable for RawMessage<'_> {
    fn write(&self, builder: &mut super::Builder<'_>) -> Result<(), CodecError> {
        builder.write_raw(self.0)
    }
}

/// A value that can be read as one element of a membuffers array.
pub trait ArrayElement<'a>: Sized {
    /// Element kind.
    const KIND: FieldType;
    /// Array kind holding elements of [`Self::KIND`].
    const ARRAY: FieldType;
    /// Decode from the element's content bytes.
    fn decode(content: &'a [u8]) -> Result<Self, CodecError>;
}

macro_rules! fixed_element {
    ($ty:ty, $kind:ident, $array:ident, $n:literal, |$bytes:ident| $decode:expr) => {
        impl<'a> ArrayElement<'a> for $ty {
            const KIND: FieldType = FieldType::$kind;
            const ARRAY: FieldType = FieldType::$array;
            fn decode(content: &'a [u8]) -> Result<Self, CodecError> {
                let $bytes: [u8; $n] = read_array(content, 0)?;
                Ok($decode)
            }
        }
    };
}

fixed_element!(u8, Uint8, Uint8Array, 1, |b| b[0]);
fixed_element!(u16, Uint16, Uint16Array, 2, |b| u16::from_le_bytes(b));
fixed_element!(u32, Uint32, Uint32Array, 4, |b| u32::from_le_bytes(b));
fixed_element!(u64, Uint64, Uint64Array, 8, |b| u64::from_le_bytes(b));
fixed_element!(bool, Bool, BoolArray, 1, |b| b[0] != 0);
fixed_element!(U256, Uint256, Uint256Array, 32, |b| U256::from_little_endian(&b));
fixed_element!([u8; 20], Bytes20, Bytes20Array, 20, |b| b);
fixed_element!([u8; 32], Bytes32, Bytes32Array, 32, |b| b);

impl<'a> ArrayElement<'a> for &'a [u8] {
    const KIND: FieldType = FieldType::Bytes;
    const ARRAY: FieldType = FieldType::BytesArray;
    fn decode(content: &'a [u8]) -> Result<Self, CodecError> {
        Ok(content)
    }
}

impl<'a> ArrayElement<'a> for &'a str {
    const KIND: FieldType = FieldType::String;
    const ARRAY: FieldType = FieldType::StringArray;
    fn decode(content: &'a [u8]) -> Result<Self, CodecError> {
        std::str::from_utf8(content).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<'a> ArrayElement<'a> for RawMessage<'a> {
    const KIND: FieldType = FieldType::Message;
    const ARRAY: FieldType = FieldType::MessageArray;
    fn decode(content: &'a [u8]) -> Result<Self, CodecError> {
        Ok(RawMessage(content))
    }
}

/// Lazy iterator over the elements of an array region.
///
/// Elements are sized one at a time; a malformed element yields an error and
/// ends the iteration.
#[derive(Debug, Clone)]
pub struct ArrayIter<'a, T> {
    /// Buffer truncated to the end of the array region. Offsets stay
    /// relative to the message start so alignment is preserved.
    region: &'a [u8],
    offset: usize,
    _marker: PhantomData<T>,
}

impl<'a, T> ArrayIter<'a, T> {
    fn new(buf: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            region: &buf[..end],
            offset: start,
            _marker: PhantomData,
        }
    }

    /// Whether another element remains.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.offset < self.region.len()
    }
}

impl<'a, T: ArrayElement<'a>> Iterator for ArrayIter<'a, T> {
    type Item = Result<T, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        match value_span(self.region, self.offset, T::KIND) {
            Ok(span) => {
                self.offset = span.end;
                Some(T::decode(&self.region[span.start..span.end]))
            }
            Err(err) => {
                self.offset = self.region.len();
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membuffers::{Builder, Encodable, build};

    static RECORD_SCHEME: &[FieldType] = &[
        FieldType::Uint32,
        FieldType::String,
        FieldType::Uint64,
        FieldType::Bytes,
        FieldType::Uint16,
    ];

    struct Record<'a> {
        id: u32,
        name: &'a str,
        stamp: u64,
        blob: &'a [u8],
        flags: u16,
    }

    impl Encodable for Record<'_> {
        fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
            builder.write_u32(self.id)?;
            builder.write_string(self.name)?;
            builder.write_u64(self.stamp)?;
            builder.write_bytes(self.blob)?;
            builder.write_u16(self.flags)
        }
    }

    fn sample() -> Vec<u8> {
        build(&Record {
            id: 7,
            name: "hello",
            stamp: 1_234_567_890_123,
            blob: &[1, 2, 3],
            flags: 0xBEEF,
        })
        .unwrap()
    }

    #[test]
    fn test_reads_fields_by_index() {
        let buf = sample();
        let msg = InternalMessage::new(buf.as_slice(), RECORD_SCHEME, NO_UNIONS);
        assert!(msg.is_valid());
        assert_eq!(msg.get_u32(0).unwrap(), 7);
        assert_eq!(msg.get_string(1).unwrap(), "hello");
        assert_eq!(msg.get_u64(2).unwrap(), 1_234_567_890_123);
        assert_eq!(msg.get_bytes(3).unwrap(), &[1, 2, 3]);
        assert_eq!(msg.get_u16(4).unwrap(), 0xBEEF);
    }

    #[test]
    fn test_raw_buffer_with_and_without_header() {
        let buf = sample();
        let msg = InternalMessage::new(buf.as_slice(), RECORD_SCHEME, NO_UNIONS);
        assert_eq!(msg.raw_buffer_for_field(3).unwrap(), &[1, 2, 3]);
        assert_eq!(
            msg.raw_buffer_with_header_for_field(3).unwrap(),
            &[3, 0, 0, 0, 1, 2, 3]
        );
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let buf = sample();
        for cut in 1..buf.len() {
            let msg = InternalMessage::new(&buf[..cut], RECORD_SCHEME, NO_UNIONS);
            let absent_tail = matches!(cut, 4 | 13 | 24 | 31);
            assert_eq!(msg.is_valid(), absent_tail, "cut at {cut}");
        }
    }

    #[test]
    fn test_overlong_buffer_is_rejected() {
        let mut buf = sample();
        buf.extend_from_slice(&[0, 0]);
        let msg = InternalMessage::new(buf.as_slice(), RECORD_SCHEME, NO_UNIONS);
        assert!(matches!(
            msg.validate(),
            Err(CodecError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn test_absent_trailing_fields_read_as_empty() {
        let buf = 9u32.to_le_bytes();
        let msg = InternalMessage::new(&buf[..], RECORD_SCHEME, NO_UNIONS);
        assert!(msg.is_valid());
        assert_eq!(msg.get_u32(0).unwrap(), 9);
        assert_eq!(msg.get_string(1).unwrap(), "");
        assert_eq!(msg.get_u64(2).unwrap(), 0);
        assert!(msg.raw_buffer_with_header_for_field(3).unwrap().is_empty());
    }

    #[test]
    fn test_getter_checks_declared_type() {
        let buf = sample();
        let msg = InternalMessage::new(buf.as_slice(), RECORD_SCHEME, NO_UNIONS);
        assert!(matches!(
            msg.get_u64(0),
            Err(CodecError::FieldTypeMismatch { field: 0, .. })
        ));
        assert!(matches!(
            msg.get_u32(9),
            Err(CodecError::FieldOutOfRange { field: 9, .. })
        ));
    }

    #[test]
    fn test_set_in_place() {
        let mut buf = sample();
        let mut msg = InternalMessage::new(buf.as_mut_slice(), RECORD_SCHEME, NO_UNIONS);
        msg.set_u32(0, 99).unwrap();
        msg.set_bytes(3, &[9, 9, 9]).unwrap();
        assert!(matches!(
            msg.set_bytes(3, &[1]),
            Err(CodecError::SizeMismatch {
                existing: 3,
                given: 1
            })
        ));
        assert_eq!(msg.get_u32(0).unwrap(), 99);
        assert_eq!(msg.get_bytes(3).unwrap(), &[9, 9, 9]);
    }

    static CHOICE_SCHEME: &[FieldType] = &[FieldType::Union, FieldType::Uint8];
    static CHOICE_UNIONS: Unions = &[&[
        FieldType::Uint32,
        FieldType::String,
        FieldType::Uint64Array,
    ]];

    struct Choice;

    impl Encodable for Choice {
        fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
            builder.write_union_index(2)?;
            builder.write_uint64_array(&[10, 20, 30])?;
            builder.write_u8(1)
        }
    }

    #[test]
    fn test_union_variant_and_array_iteration() {
        let buf = build(&Choice).unwrap();
        let msg = InternalMessage::new(buf.as_slice(), CHOICE_SCHEME, CHOICE_UNIONS);
        assert!(msg.is_valid());
        assert_eq!(msg.get_union_index(0).unwrap(), 2);
        assert_eq!(msg.is_union_index(0, 0).unwrap(), None);
        let offset = msg.is_union_index(0, 2).unwrap().expect("variant 2 selected");
        let values: Vec<u64> = msg
            .array_iter_in_offset::<u64>(offset)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(msg.get_u8(1).unwrap(), 1);
    }

    #[test]
    fn test_unknown_union_selector_is_rejected() {
        let mut buf = build(&Choice).unwrap();
        buf[0] = 7;
        let msg = InternalMessage::new(buf.as_slice(), CHOICE_SCHEME, CHOICE_UNIONS);
        assert!(matches!(
            msg.validate(),
            Err(CodecError::UnknownUnionVariant { index: 7, .. })
        ));
    }

    #[test]
    fn test_message_array_iteration() {
        static LIST_SCHEME: &[FieldType] = &[FieldType::MessageArray];

        struct Item(u32);
        impl Encodable for Item {
            fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
                builder.write_u32(self.0)
            }
        }
        struct List(Vec<Item>);
        impl Encodable for List {
            fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
                builder.write_message_array(&self.0)
            }
        }

        let buf = build(&List(vec![Item(1), Item(2), Item(3)])).unwrap();
        let msg = InternalMessage::new(buf.as_slice(), LIST_SCHEME, NO_UNIONS);
        assert!(msg.is_valid());
        let items: Vec<u32> = msg
            .get_message_array_iter(0)
            .unwrap()
            .map(|raw| {
                let raw = raw.unwrap();
                InternalMessage::new(raw.as_bytes(), &[FieldType::Uint32], NO_UNIONS)
                    .get_u32(0)
                    .unwrap()
            })
            .collect();
        assert_eq!(items, vec![1, 2, 3]);
    }
}
