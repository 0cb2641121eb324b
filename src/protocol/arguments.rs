//! Method arguments
//!
//! Arguments travel as a packed `ArgumentArray`: the content of its single
//! message-array field, without the length prefix. Each element is an
//! `Argument` message holding one union whose selector is the argument tag.

use primitive_types::U256;
use tracing::trace;

use crate::membuffers::{
    ArrayElement, Builder, CodecError, Encodable, InternalMessage, NO_UNIONS, build,
};

use super::schemes::{ARGUMENT_ARRAY_SCHEME, ARGUMENT_SCHEME, ARGUMENT_UNIONS};
use super::{Error, Result};

/// A typed contract method argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Argument {
    /// Tag 0
    Uint32(u32),
    /// Tag 1
    Uint64(u64),
    /// Tag 2
    String(String),
    /// Tag 3
    Bytes(Vec<u8>),
    /// Tag 4
    Bool(bool),
    /// Tag 5
    Uint256(U256),
    /// Tag 6
    Bytes20([u8; 20]),
    /// Tag 7
    Bytes32([u8; 32]),
    /// Tag 8
    Uint32Array(Vec<u32>),
    /// Tag 9
    Uint64Array(Vec<u64>),
    /// Tag 10
    StringArray(Vec<String>),
    /// Tag 11
    BytesArray(Vec<Vec<u8>>),
    /// Tag 12
    BoolArray(Vec<bool>),
    /// Tag 13
    Uint256Array(Vec<U256>),
    /// Tag 14
    Bytes20Array(Vec<[u8; 20]>),
    /// Tag 15
    Bytes32Array(Vec<[u8; 32]>),
}

impl Argument {
    /// Union selector written on the wire.
    #[must_use]
    pub const fn tag(&self) -> u16 {
        match self {
            Self::Uint32(_) => 0,
            Self::Uint64(_) => 1,
            Self::String(_) => 2,
            Self::Bytes(_) => 3,
            Self::Bool(_) => 4,
            Self::Uint256(_) => 5,
            Self::Bytes20(_) => 6,
            Self::Bytes32(_) => 7,
            Self::Uint32Array(_) => 8,
            Self::Uint64Array(_) => 9,
            Self::StringArray(_) => 10,
            Self::BytesArray(_) => 11,
            Self::BoolArray(_) => 12,
            Self::Uint256Array(_) => 13,
            Self::Bytes20Array(_) => 14,
            Self::Bytes32Array(_) => 15,
        }
    }
}

impl Encodable for Argument {
    fn write(&self, builder: &mut Builder<'_>) -> std::result::Result<(), CodecError> {
        builder.write_union_index(self.tag())?;
        match self {
            Self::Uint32(v) => builder.write_u32(*v),
            Self::Uint64(v) => builder.write_u64(*v),
            Self::String(v) => builder.write_string(v),
            Self::Bytes(v) => builder.write_bytes(v),
            Self::Bool(v) => builder.write_bool(*v),
            Self::Uint256(v) => builder.write_uint256(v),
            Self::Bytes20(v) => builder.write_bytes20(v),
            Self::Bytes32(v) => builder.write_bytes32(v),
            Self::Uint32Array(v) => builder.write_uint32_array(v),
            Self::Uint64Array(v) => builder.write_uint64_array(v),
            Self::StringArray(v) => builder.write_string_array(v),
            Self::BytesArray(v) => builder.write_bytes_array(v),
            Self::BoolArray(v) => builder.write_bool_array(v),
            Self::Uint256Array(v) => builder.write_uint256_array(v),
            Self::Bytes20Array(v) => builder.write_bytes20_array(v),
            Self::Bytes32Array(v) => builder.write_bytes32_array(v),
        }
    }
}

/// `ArgumentArray` message wrapping a list of arguments.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentArray<'a>(pub &'a [Argument]);

impl Encodable for ArgumentArray<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> std::result::Result<(), CodecError> {
        builder.write_message_array(self.0)
    }
}

/// Pack arguments for a transaction or query envelope.
pub fn packed_arguments_encode(args: &[Argument]) -> std::result::Result<Vec<u8>, CodecError> {
    let buf = build(&ArgumentArray(args))?;
    let msg = InternalMessage::new(buf.as_slice(), ARGUMENT_ARRAY_SCHEME, NO_UNIONS);
    Ok(msg.raw_buffer_for_field(0)?.to_vec())
}

fn collect<'a, T: ArrayElement<'a>>(
    msg: &'a InternalMessage<&[u8]>,
    offset: usize,
) -> std::result::Result<Vec<T>, CodecError> {
    msg.array_iter_in_offset::<T>(offset)?.collect()
}

fn decode_argument(index: usize, buf: &[u8]) -> Result<Argument> {
    let unknown_tag = move |err: CodecError| match err {
        CodecError::UnknownUnionVariant { index: tag, .. } => {
            Error::UnknownArgumentType { index, tag }
        }
        other => Error::Codec(other),
    };
    let msg = InternalMessage::new(buf, ARGUMENT_SCHEME, ARGUMENT_UNIONS);
    msg.validate().map_err(unknown_tag)?;
    let tag = msg.get_union_index(0).map_err(unknown_tag)?;
    let Some(offset) = msg.is_union_index(0, tag)? else {
        return Err(Error::UnknownArgumentType { index, tag });
    };
    let arg = match tag {
        0 => Argument::Uint32(msg.get_u32_in_offset(offset)?),
        1 => Argument::Uint64(msg.get_u64_in_offset(offset)?),
        2 => Argument::String(msg.get_string_in_offset(offset)?.to_owned()),
        3 => Argument::Bytes(msg.get_bytes_in_offset(offset)?.to_vec()),
        4 => Argument::Bool(msg.get_bool_in_offset(offset)?),
        5 => Argument::Uint256(msg.get_uint256_in_offset(offset)?),
        6 => Argument::Bytes20(msg.get_bytes20_in_offset(offset)?),
        7 => Argument::Bytes32(msg.get_bytes32_in_offset(offset)?),
        8 => Argument::Uint32Array(collect(&msg, offset)?),
        9 => Argument::Uint64Array(collect(&msg, offset)?),
        10 => Argument::StringArray(
            collect::<&str>(&msg, offset)?
                .into_iter()
                .map(str::to_owned)
                .collect(),
        ),
        11 => Argument::BytesArray(
            collect::<&[u8]>(&msg, offset)?
                .into_iter()
                .map(<[u8]>::to_vec)
                .collect(),
        ),
        12 => Argument::BoolArray(collect(&msg, offset)?),
        13 => Argument::Uint256Array(collect(&msg, offset)?),
        14 => Argument::Bytes20Array(collect(&msg, offset)?),
        15 => Argument::Bytes32Array(collect(&msg, offset)?),
        _ => return Err(Error::UnknownArgumentType { index, tag }),
    };
    Ok(arg)
}

/// Unpack an argument array.
///
/// `buf` is the packed array including its length prefix, as returned by
/// `raw_buffer_with_header_for_field`. An empty buffer is an empty list.
pub fn packed_arguments_decode(buf: &[u8]) -> Result<Vec<Argument>> {
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    let msg = InternalMessage::new(buf, ARGUMENT_ARRAY_SCHEME, NO_UNIONS);
    msg.validate()?;
    let args = msg
        .get_message_array_iter(0)?
        .enumerate()
        .map(|(index, raw)| decode_argument(index, raw?.as_bytes()))
        .collect::<Result<Vec<_>>>()?;
    trace!(count = args.len(), bytes = buf.len(), "decoded packed arguments");
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(packed: &[u8]) -> Vec<u8> {
        let mut buf = u32::try_from(packed.len()).unwrap().to_le_bytes().to_vec();
        buf.extend_from_slice(packed);
        buf
    }

    fn every_kind() -> Vec<Argument> {
        vec![
            Argument::Uint32(7),
            Argument::Uint64(1 << 40),
            Argument::String("hello".into()),
            Argument::Bytes(vec![1, 2, 3]),
            Argument::Bool(true),
            Argument::Uint256(U256([1, 2, 3, 4])),
            Argument::Bytes20([0x11; 20]),
            Argument::Bytes32([0x22; 32]),
            Argument::Uint32Array(vec![1, 2, 3]),
            Argument::Uint64Array(vec![u64::MAX, 0]),
            Argument::StringArray(vec!["a".into(), String::new(), "abc".into()]),
            Argument::BytesArray(vec![vec![9], vec![]]),
            Argument::BoolArray(vec![true, false, true]),
            Argument::Uint256Array(vec![U256::one(), U256::MAX]),
            Argument::Bytes20Array(vec![[1; 20], [2; 20]]),
            Argument::Bytes32Array(vec![[3; 32]]),
        ]
    }

    #[test]
    fn test_tags_follow_variant_order() {
        for (expected, arg) in every_kind().iter().enumerate() {
            assert_eq!(usize::from(arg.tag()), expected);
        }
    }

    #[test]
    fn test_every_kind_survives_packing() {
        let args = every_kind();
        let packed = packed_arguments_encode(&args).unwrap();
        assert_eq!(packed_arguments_decode(&with_header(&packed)).unwrap(), args);
    }

    #[test]
    fn test_packed_uint32_layout() {
        let packed = packed_arguments_encode(&[Argument::Uint32(0x0A0B_0C0D)]).unwrap();
        // message prefix, selector 0, pad, value
        assert_eq!(packed, [8, 0, 0, 0, 0, 0, 0, 0, 0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(packed_arguments_encode(&[]).unwrap().is_empty());
        assert!(packed_arguments_decode(&[]).unwrap().is_empty());
        assert!(packed_arguments_decode(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_tag_names_the_argument() {
        let mut packed =
            packed_arguments_encode(&[Argument::Uint32(1), Argument::Uint32(2)]).unwrap();
        // selector of the second argument
        packed[16] = 99;
        let err = packed_arguments_decode(&with_header(&packed)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownArgumentType { index: 1, tag: 99 }
        ));
    }

    #[test]
    fn test_overlong_argument_is_rejected() {
        // a Uint32 argument is 8 bytes, this one declares 12
        let buf = [
            16, 0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0xDE, 0xAD, 0xBE, 0xEF,
        ];
        assert!(matches!(
            packed_arguments_decode(&buf),
            Err(Error::Codec(CodecError::InvalidStructure { end: 8, len: 12 }))
        ));
    }

    #[test]
    fn test_truncated_array_is_an_error() {
        let packed = packed_arguments_encode(&[Argument::String("truncate me".into())]).unwrap();
        let mut buf = with_header(&packed);
        buf.truncate(buf.len() - 3);
        assert!(packed_arguments_decode(&buf).is_err());
    }
}
