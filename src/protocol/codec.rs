//! Plumbing shared by the per-operation encoders and decoders

use tracing::{debug, trace};

use crate::crypto::{
    ED25519_PUBLIC_KEY_SIZE_BYTES, SHA256_HASH_SIZE_BYTES, TX_ID_SIZE_BYTES, extract_tx_id,
};
use crate::membuffers::{InternalMessage, NO_UNIONS, Scheme, Unions};

use super::arguments::{Argument, packed_arguments_decode};
use super::events::{Event, packed_events_decode};
use super::messages::{EdDsa01Signer, RequestResult, Signer, Transaction};
use super::metrics::Metrics;
use super::ops::Operation;
use super::schemes::{QUERY_RESULT_SCHEME, REQUEST_RESULT_SCHEME, TRANSACTION_RECEIPT_SCHEME};
use super::types::{ExecutionResult, NetworkType, RequestStatus};
use super::{Error, PROTOCOL_VERSION, Result};

pub(crate) fn check_protocol_version(found: u32) -> Result<()> {
    if found != PROTOCOL_VERSION {
        return Err(Error::InvalidProtocolVersion {
            expected: PROTOCOL_VERSION,
            found,
        });
    }
    Ok(())
}

pub(crate) fn check_length(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::InvalidLength {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// Split a tx id into hash and timestamp, reporting a bad length as a
/// request error.
pub(crate) fn split_tx_id(tx_id: &[u8]) -> Result<([u8; SHA256_HASH_SIZE_BYTES], u64)> {
    check_length("tx id", TX_ID_SIZE_BYTES, tx_id.len())?;
    Ok(extract_tx_id(tx_id)?)
}

/// Fields common to transaction and query envelopes.
pub(crate) struct Envelope<'a> {
    pub protocol_version: u32,
    pub virtual_chain_id: u32,
    pub timestamp: u64,
    pub network_type: NetworkType,
    pub public_key: &'a [u8],
    pub contract_name: &'a str,
    pub method_name: &'a str,
    pub input_argument_array: &'a [u8],
}

impl<'a> Envelope<'a> {
    pub(crate) fn transaction(&self) -> Result<Transaction<'a>> {
        check_protocol_version(self.protocol_version)?;
        check_length(
            "public key",
            ED25519_PUBLIC_KEY_SIZE_BYTES,
            self.public_key.len(),
        )?;
        Ok(Transaction {
            protocol_version: self.protocol_version,
            virtual_chain_id: self.virtual_chain_id,
            timestamp: self.timestamp,
            signer: Signer::Eddsa(EdDsa01Signer {
                network_type: self.network_type,
                public_key: self.public_key,
            }),
            contract_name: self.contract_name,
            method_name: self.method_name,
            input_argument_array: self.input_argument_array,
        })
    }
}

/// Wrap a response and run the structural scan before any field is read.
pub(crate) fn open_response(buf: &[u8], scheme: Scheme) -> Result<InternalMessage<&[u8]>> {
    let msg = InternalMessage::new(buf, scheme, NO_UNIONS);
    if let Err(err) = msg.validate() {
        trace!(error = %err, len = buf.len(), "structural scan failed");
        return Err(Error::CorruptResponse);
    }
    Ok(msg)
}

/// Wrap a message carried inside another one. The scan must end at its
/// last byte, like the top-level body.
pub(crate) fn open_nested<'a>(
    buf: &'a [u8],
    scheme: Scheme,
    unions: Unions,
) -> Result<InternalMessage<&'a [u8]>> {
    let msg = InternalMessage::new(buf, scheme, unions);
    msg.validate()?;
    Ok(msg)
}

/// Open a response body and hand it to `read`, keeping the codec counters.
pub(crate) fn decode_response<T>(
    op: Operation,
    buf: &[u8],
    scheme: Scheme,
    read: impl FnOnce(&InternalMessage<&[u8]>) -> Result<T>,
) -> Result<T> {
    let result = open_response(buf, scheme).and_then(|msg| read(&msg));
    match &result {
        Ok(_) => Metrics::record_decoded(buf.len()),
        Err(err) => {
            Metrics::record_decode_failure();
            debug!(%op, error = %err, len = buf.len(), "rejecting response");
        }
    }
    result
}

/// Count an encoded request body.
pub(crate) fn finish_request(op: Operation, buf: Vec<u8>) -> Vec<u8> {
    Metrics::record_encoded(op, buf.len());
    trace!(%op, len = buf.len(), "encoded request");
    buf
}

/// Decode the `RequestResult` carried at `field`.
pub(crate) fn decode_request_result(
    response: &InternalMessage<&[u8]>,
    field: usize,
) -> Result<RequestResult> {
    let msg = open_nested(response.get_message(field)?, REQUEST_RESULT_SCHEME, NO_UNIONS)?;
    let result = RequestResult {
        request_status: RequestStatus::decode(msg.get_u16(0)?)?,
        block_height: msg.get_u64(1)?,
        block_timestamp: msg.get_u64(2)?,
    };
    trace!(
        status = %result.request_status,
        block_height = result.block_height,
        "decoded request result"
    );
    Ok(result)
}

/// Execution outcome shared by receipts and query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub tx_hash: Vec<u8>,
    pub execution_result: ExecutionResult,
    pub output_arguments: Vec<Argument>,
    pub output_events: Vec<Event>,
}

/// Decode a `TransactionReceipt`. An empty receipt means the transaction was
/// not executed.
pub(crate) fn decode_receipt(buf: &[u8]) -> Result<Outcome> {
    let msg = open_nested(buf, TRANSACTION_RECEIPT_SCHEME, NO_UNIONS)?;
    let execution_result = if buf.is_empty() {
        ExecutionResult::NotExecuted
    } else {
        ExecutionResult::decode(msg.get_u16(1)?)?
    };
    Ok(Outcome {
        tx_hash: msg.get_bytes(0)?.to_vec(),
        execution_result,
        output_arguments: packed_arguments_decode(msg.raw_buffer_with_header_for_field(2)?)?,
        output_events: packed_events_decode(msg.raw_buffer_with_header_for_field(3)?)?,
    })
}

/// Decode a `QueryResult`. An empty result means the query was not executed.
pub(crate) fn decode_query_result(buf: &[u8]) -> Result<Outcome> {
    let msg = open_nested(buf, QUERY_RESULT_SCHEME, NO_UNIONS)?;
    let execution_result = if buf.is_empty() {
        ExecutionResult::NotExecuted
    } else {
        ExecutionResult::decode(msg.get_u16(0)?)?
    };
    Ok(Outcome {
        tx_hash: Vec::new(),
        execution_result,
        output_arguments: packed_arguments_decode(msg.raw_buffer_with_header_for_field(1)?)?,
        output_events: packed_events_decode(msg.raw_buffer_with_header_for_field(2)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membuffers::{CodecError, build};
    use crate::protocol::arguments::packed_arguments_encode;
    use crate::protocol::messages::TransactionReceipt;
    use crate::protocol::schemes::SEND_TRANSACTION_RESPONSE_SCHEME;

    #[test]
    fn test_protocol_version_is_enforced() {
        assert!(check_protocol_version(1).is_ok());
        assert!(matches!(
            check_protocol_version(2),
            Err(Error::InvalidProtocolVersion {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_split_tx_id_length() {
        assert!(split_tx_id(&[0u8; 40]).is_ok());
        assert!(matches!(
            split_tx_id(&[0u8; 12]),
            Err(Error::InvalidLength {
                what: "tx id",
                expected: 40,
                found: 12
            })
        ));
    }

    #[test]
    fn test_empty_receipt_is_not_executed() {
        let outcome = decode_receipt(&[]).unwrap();
        assert_eq!(outcome.execution_result, ExecutionResult::NotExecuted);
        assert!(outcome.tx_hash.is_empty());
        assert!(outcome.output_arguments.is_empty());
        assert!(outcome.output_events.is_empty());
    }

    #[test]
    fn test_receipt_outputs_are_unpacked() {
        let args = packed_arguments_encode(&[Argument::String("ok".into())]).unwrap();
        let buf = build(&TransactionReceipt {
            tx_hash: &[7; 32],
            execution_result: ExecutionResult::ErrorSmartContract,
            output_argument_array: &args,
            output_events_array: &[],
        })
        .unwrap();
        let outcome = decode_receipt(&buf).unwrap();
        assert_eq!(outcome.tx_hash, vec![7; 32]);
        assert_eq!(outcome.execution_result, ExecutionResult::ErrorSmartContract);
        assert_eq!(outcome.output_arguments, vec![Argument::String("ok".into())]);
    }

    #[test]
    fn test_receipt_with_trailing_bytes_is_rejected() {
        let mut buf = build(&TransactionReceipt {
            tx_hash: &[7; 32],
            execution_result: ExecutionResult::Success,
            output_argument_array: &[],
            output_events_array: &[],
        })
        .unwrap();
        let len = buf.len();
        buf.extend_from_slice(&[0xEE; 4]);
        assert!(matches!(
            decode_receipt(&buf),
            Err(Error::Codec(CodecError::InvalidStructure { end, len: found }))
                if end == len && found == len + 4
        ));
    }

    #[test]
    fn test_corrupt_response_is_rejected() {
        assert!(matches!(
            open_response(&[1, 2, 3], SEND_TRANSACTION_RESPONSE_SCHEME),
            Err(Error::CorruptResponse)
        ));
    }

    #[test]
    fn test_failed_reads_are_counted() {
        let before = crate::protocol::metrics();
        let result: Result<()> = decode_response(
            Operation::RunQuery,
            &[9, 9],
            SEND_TRANSACTION_RESPONSE_SCHEME,
            |_| Ok(()),
        );
        assert!(matches!(result, Err(Error::CorruptResponse)));
        assert!(crate::protocol::metrics().decode_failures > before.decode_failures);
    }
}
