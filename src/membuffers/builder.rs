//! Two-pass membuffers writer.
//!
//! Every message is written by a single [`Encodable::write`] routine. Run
//! against a [`Builder`] without a buffer it only advances the cursor, which
//! yields the exact encoded size; run again against a buffer of that size it
//! fills the bytes. Sizing and writing can therefore never disagree.

use primitive_types::U256;

use super::types::{LENGTH_PREFIX_SIZE, align_dynamic_field_content_offset, align_offset_to_type};
use super::{CodecError, FieldType};

/// A message that knows how to lay itself out through a [`Builder`].
pub trait Encodable {
    /// Write all fields, in scheme order, through `builder`.
    fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError>;
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
        (**self).write(builder)
    }
}

/// `None` encodes as a message with no fields.
impl<T: Encodable> Encodable for Option<T> {
    fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
        match self {
            Some(msg) => msg.write(builder),
            None => Ok(()),
        }
    }
}

/// Cursor over an optional output buffer.
///
/// Offsets are relative to the start of the message being written; nested
/// messages get a child builder whose offset zero is their content start.
#[derive(Debug)]
pub struct Builder<'a> {
    buf: Option<&'a mut [u8]>,
    size: usize,
}

impl Builder<'static> {
    /// Builder that only measures.
    #[must_use]
    pub const fn sizer() -> Self {
        Self { buf: None, size: 0 }
    }
}

impl<'a> Builder<'a> {
    /// Builder that writes into `buf`, starting at offset zero.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf: Some(buf),
            size: 0,
        }
    }

    /// Bytes written (or measured) so far.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether this pass only measures.
    #[must_use]
    pub const fn is_sizing(&self) -> bool {
        self.buf.is_none()
    }

    fn put(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CodecError> {
        if let Some(buf) = self.buf.as_deref_mut() {
            let got = buf.len();
            let needed = offset + bytes.len();
            buf.get_mut(offset..needed)
                .ok_or(CodecError::BufferTooSmall { needed, got })?
                .copy_from_slice(bytes);
        }
        Ok(())
    }

    /// Advance the cursor to `offset`, zeroing the padding in between.
    fn pad_to(&mut self, offset: usize) -> Result<(), CodecError> {
        if offset > self.size {
            if let Some(buf) = self.buf.as_deref_mut() {
                let got = buf.len();
                buf.get_mut(self.size..offset)
                    .ok_or(CodecError::BufferTooSmall {
                        needed: offset,
                        got,
                    })?
                    .fill(0);
            }
            self.size = offset;
        }
        Ok(())
    }

    fn write_fixed(&mut self, field: FieldType, bytes: &[u8]) -> Result<(), CodecError> {
        debug_assert_eq!(bytes.len(), field.size());
        self.pad_to(align_offset_to_type(self.size, field))?;
        self.put(self.size, bytes)?;
        self.size += bytes.len();
        Ok(())
    }

    fn patch_length(&mut self, prefix_offset: usize, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
        self.put(prefix_offset, &len.to_le_bytes())
    }

    /// Align, reserve the length prefix and align the content start.
    /// Returns the prefix offset.
    fn open_dynamic(&mut self, field: FieldType) -> Result<usize, CodecError> {
        self.pad_to(align_offset_to_type(self.size, field))?;
        let prefix_offset = self.size;
        self.put(prefix_offset, &[0; LENGTH_PREFIX_SIZE])?;
        self.size += LENGTH_PREFIX_SIZE;
        self.pad_to(align_dynamic_field_content_offset(self.size, field))?;
        Ok(prefix_offset)
    }

    fn write_array<T>(
        &mut self,
        field: FieldType,
        items: &[T],
        mut write_item: impl FnMut(&mut Self, &T) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        let prefix_offset = self.open_dynamic(field)?;
        let content_start = self.size;
        for item in items {
            write_item(self, item)?;
        }
        self.patch_length(prefix_offset, self.size - content_start)
    }

    /// Write an 8-bit unsigned integer.
    pub fn write_u8(&mut self, v: u8) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Uint8, &[v])
    }

    /// Write a 16-bit unsigned integer.
    pub fn write_u16(&mut self, v: u16) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Uint16, &v.to_le_bytes())
    }

    /// Write a 32-bit unsigned integer.
    pub fn write_u32(&mut self, v: u32) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Uint32, &v.to_le_bytes())
    }

    /// Write a 64-bit unsigned integer.
    pub fn write_u64(&mut self, v: u64) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Uint64, &v.to_le_bytes())
    }

    /// Write a boolean as a single byte.
    pub fn write_bool(&mut self, v: bool) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Bool, &[u8::from(v)])
    }

    /// Write a 256-bit unsigned integer.
    pub fn write_uint256(&mut self, v: &U256) -> Result<(), CodecError> {
        let mut bytes = [0u8; 32];
        v.to_little_endian(&mut bytes);
        self.write_fixed(FieldType::Uint256, &bytes)
    }

    /// Write a fixed 20-byte blob.
    pub fn write_bytes20(&mut self, v: &[u8; 20]) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Bytes20, v)
    }

    /// Write a fixed 32-byte blob.
    pub fn write_bytes32(&mut self, v: &[u8; 32]) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Bytes32, v)
    }

    /// Write length-prefixed raw bytes.
    pub fn write_bytes(&mut self, v: &[u8]) -> Result<(), CodecError> {
        let prefix_offset = self.open_dynamic(FieldType::Bytes)?;
        self.put(self.size, v)?;
        self.size += v.len();
        self.patch_length(prefix_offset, v.len())
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, v: &str) -> Result<(), CodecError> {
        self.write_bytes(v.as_bytes())
    }

    /// Write a union selector; the caller writes the chosen variant next.
    pub fn write_union_index(&mut self, index: u16) -> Result<(), CodecError> {
        self.write_fixed(FieldType::Union, &index.to_le_bytes())
    }

    /// Write an array of `u8`.
    pub fn write_uint8_array(&mut self, v: &[u8]) -> Result<(), CodecError> {
        self.write_array(FieldType::Uint8Array, v, |b, x| b.write_u8(*x))
    }

    /// Write an array of `u16`.
    pub fn write_uint16_array(&mut self, v: &[u16]) -> Result<(), CodecError> {
        self.write_array(FieldType::Uint16Array, v, |b, x| b.write_u16(*x))
    }

    /// Write an array of `u32`.
    pub fn write_uint32_array(&mut self, v: &[u32]) -> Result<(), CodecError> {
        self.write_array(FieldType::Uint32Array, v, |b, x| b.write_u32(*x))
    }

    /// Write an array of `u64`.
    pub fn write_uint64_array(&mut self, v: &[u64]) -> Result<(), CodecError> {
        self.write_array(FieldType::Uint64Array, v, |b, x| b.write_u64(*x))
    }

    /// Write an array of booleans.
    pub fn write_bool_array(&mut self, v: &[bool]) -> Result<(), CodecError> {
        self.write_array(FieldType::BoolArray, v, |b, x| b.write_bool(*x))
    }

    /// Write an array of 256-bit integers.
    pub fn write_uint256_array(&mut self, v: &[U256]) -> Result<(), CodecError> {
        self.write_array(FieldType::Uint256Array, v, Self::write_uint256)
    }

    /// Write an array of 20-byte blobs.
    pub fn write_bytes20_array(&mut self, v: &[[u8; 20]]) -> Result<(), CodecError> {
        self.write_array(FieldType::Bytes20Array, v, Self::write_bytes20)
    }

    /// Write an array of 32-byte blobs.
    pub fn write_bytes32_array(&mut self, v: &[[u8; 32]]) -> Result<(), CodecError> {
        self.write_array(FieldType::Bytes32Array, v, Self::write_bytes32)
    }

    /// Write an array of byte blobs.
    pub fn write_bytes_array<B: AsRef<[u8]>>(&mut self, v: &[B]) -> Result<(), CodecError> {
        self.write_array(FieldType::BytesArray, v, |b, x| b.write_bytes(x.as_ref()))
    }

    /// Write an array of strings.
    pub fn write_string_array<S: AsRef<str>>(&mut self, v: &[S]) -> Result<(), CodecError> {
        self.write_array(FieldType::StringArray, v, |b, x| b.write_string(x.as_ref()))
    }

    /// Write a nested message; its length prefix is patched once it is written.
    pub fn write_message<E: Encodable + ?Sized>(&mut self, msg: &E) -> Result<(), CodecError> {
        let prefix_offset = self.open_dynamic(FieldType::Message)?;
        let content_start = self.size;
        let child_buf = match self.buf.as_deref_mut() {
            Some(buf) => {
                let got = buf.len();
                Some(buf.get_mut(content_start..).ok_or(CodecError::BufferTooSmall {
                    needed: content_start,
                    got,
                })?)
            }
            None => None,
        };
        let mut child = Builder {
            buf: child_buf,
            size: 0,
        };
        msg.write(&mut child)?;
        let content_size = child.size;
        self.size += content_size;
        self.patch_length(prefix_offset, content_size)
    }

    /// Copy already-encoded message content verbatim at the cursor.
    pub fn write_raw(&mut self, content: &[u8]) -> Result<(), CodecError> {
        self.put(self.size, content)?;
        self.size += content.len();
        Ok(())
    }

    /// Write an array of nested messages.
    pub fn write_message_array<E: Encodable>(&mut self, v: &[E]) -> Result<(), CodecError> {
        self.write_array(FieldType::MessageArray, v, |b, m| b.write_message(m))
    }
}

/// Exact encoded length of `msg`, computed without allocating.
pub fn calc_required_size<E: Encodable + ?Sized>(msg: &E) -> Result<usize, CodecError> {
    let mut builder = Builder::sizer();
    msg.write(&mut builder)?;
    Ok(builder.size())
}

/// Encode `msg`: one sizing pass, then one writing pass into an exact buffer.
pub fn build<E: Encodable + ?Sized>(msg: &E) -> Result<Vec<u8>, CodecError> {
    let size = calc_required_size(msg)?;
    let mut buf = vec![0u8; size];
    let mut builder = Builder::new(&mut buf);
    msg.write(&mut builder)?;
    debug_assert_eq!(builder.size(), size, "sizing pass diverged from write pass");
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        flag: u8,
        value: u32,
    }

    impl Encodable for Pair {
        fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
            builder.write_u8(self.flag)?;
            builder.write_u32(self.value)
        }
    }

    struct Named<'a> {
        name: &'a str,
        inner: Pair,
        tail: u16,
    }

    impl Encodable for Named<'_> {
        fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
            builder.write_string(self.name)?;
            builder.write_message(&self.inner)?;
            builder.write_u16(self.tail)
        }
    }

    #[test]
    fn test_scalar_alignment_padding() {
        let bytes = build(&Pair {
            flag: 0xAB,
            value: 0x0102_0304,
        })
        .unwrap();
        assert_eq!(bytes, [0xAB, 0, 0, 0, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_nested_message_layout() {
        let bytes = build(&Named {
            name: "abc",
            inner: Pair { flag: 1, value: 2 },
            tail: 7,
        })
        .unwrap();
        assert_eq!(
            bytes,
            [
                3, 0, 0, 0, b'a', b'b', b'c', 0, // string + pad
                8, 0, 0, 0, // message prefix
                1, 0, 0, 0, 2, 0, 0, 0, // message content
                7, 0, // tail
            ]
        );
    }

    #[test]
    fn test_size_pass_matches_write_pass() {
        let msg = Named {
            name: "sizing",
            inner: Pair { flag: 9, value: 9 },
            tail: 1,
        };
        let size = calc_required_size(&msg).unwrap();
        assert_eq!(build(&msg).unwrap().len(), size);
    }

    #[test]
    fn test_scalar_array_stores_byte_count() {
        struct Values;
        impl Encodable for Values {
            fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
                builder.write_u8(5)?;
                builder.write_uint64_array(&[1, 2])
            }
        }
        let bytes = build(&Values).unwrap();
        assert_eq!(&bytes[..8], &[5, 0, 0, 0, 16, 0, 0, 0]);
        assert_eq!(bytes.len(), 8 + 16);
        assert_eq!(&bytes[8..16], &1u64.to_le_bytes());
    }

    #[test]
    fn test_string_array_patches_region_size() {
        struct Names;
        impl Encodable for Names {
            fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
                builder.write_string_array(&["a", "bc"])
            }
        }
        let bytes = build(&Names).unwrap();
        // "a" occupies 4 + 1, pad to 8, "bc" occupies 4 + 2
        assert_eq!(
            bytes,
            [14, 0, 0, 0, 1, 0, 0, 0, b'a', 0, 0, 0, 2, 0, 0, 0, b'b', b'c']
        );
    }

    #[test]
    fn test_union_writes_only_selected_variant() {
        struct Choice;
        impl Encodable for Choice {
            fn write(&self, builder: &mut Builder<'_>) -> Result<(), CodecError> {
                builder.write_union_index(1)?;
                builder.write_u64(3)
            }
        }
        let bytes = build(&Choice).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_write_into_short_buffer_fails() {
        let mut buf = [0u8; 3];
        let mut builder = Builder::new(&mut buf);
        let err = builder.write_u32(1).unwrap_err();
        assert!(matches!(err, CodecError::BufferTooSmall { needed: 4, got: 3 }));
    }

    #[test]
    fn test_padding_is_zeroed_in_reused_buffer() {
        let mut buf = [0xFFu8; 8];
        let mut builder = Builder::new(&mut buf);
        Pair { flag: 1, value: 2 }.write(&mut builder).unwrap();
        assert_eq!(buf, [1, 0, 0, 0, 2, 0, 0, 0]);
    }
}
