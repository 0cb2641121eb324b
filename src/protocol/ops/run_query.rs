//! Run-query: unsigned read-only calls

use tracing::instrument;

use crate::crypto::Signer;
use crate::membuffers::build;

use super::super::arguments::{Argument, packed_arguments_encode};
use super::super::codec::{
    Envelope, check_protocol_version, decode_query_result, decode_request_result,
    decode_response, finish_request,
};
use super::super::events::Event;
use super::super::messages as wire;
use super::super::schemes::RUN_QUERY_RESPONSE_SCHEME;
use super::super::types::{ExecutionResult, NetworkType, RequestStatus};
use super::super::Result;
use super::Operation;

/// Read-only call. Queries are not signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQueryRequest {
    /// Must be [`PROTOCOL_VERSION`](super::super::PROTOCOL_VERSION)
    pub protocol_version: u32,
    /// Target virtual chain
    pub virtual_chain_id: u32,
    /// Nanoseconds since the Unix epoch, nonce included
    pub timestamp: u64,
    /// Network of the caller key
    pub network_type: NetworkType,
    /// Contract to call
    pub contract_name: String,
    /// Method to call
    pub method_name: String,
    /// Method arguments
    pub input_arguments: Vec<Argument>,
}

/// Decoded query answer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunQueryResponse {
    /// Request outcome
    pub request_status: RequestStatus,
    /// Execution outcome
    pub execution_result: ExecutionResult,
    /// Values returned by the method
    pub output_arguments: Vec<Argument>,
    /// Events emitted by the method
    pub output_events: Vec<Event>,
    /// Height of the block the query ran against
    pub block_height: u64,
    /// Timestamp of that block, in nanoseconds
    pub block_timestamp: u64,
}

/// Build a run-query request. The caller's public key is taken from
/// `signer`; the signature field is left empty.
#[instrument(
    level = "debug",
    skip(req, signer),
    fields(contract = %req.contract_name, method = %req.method_name)
)]
pub fn encode_run_query_request<S: Signer + ?Sized>(
    req: &RunQueryRequest,
    signer: &S,
) -> Result<Vec<u8>> {
    check_protocol_version(req.protocol_version)?;
    let public_key = signer.public_key()?;
    let input_argument_array = packed_arguments_encode(&req.input_arguments)?;
    let envelope = Envelope {
        protocol_version: req.protocol_version,
        virtual_chain_id: req.virtual_chain_id,
        timestamp: req.timestamp,
        network_type: req.network_type,
        public_key: &public_key,
        contract_name: &req.contract_name,
        method_name: &req.method_name,
        input_argument_array: &input_argument_array,
    };
    let buf = build(&wire::RunQueryRequest {
        signed_query: wire::SignedQuery {
            transaction: envelope.transaction()?,
            signature: &[],
        },
    })?;
    Ok(finish_request(Operation::RunQuery, buf))
}

/// Decode a run-query response body.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn decode_run_query_response(buf: &[u8]) -> Result<RunQueryResponse> {
    decode_response(Operation::RunQuery, buf, RUN_QUERY_RESPONSE_SCHEME, |msg| {
        let result = decode_request_result(msg, 0)?;
        let outcome = decode_query_result(msg.get_message(1)?)?;
        Ok(RunQueryResponse {
            request_status: result.request_status,
            execution_result: outcome.execution_result,
            output_arguments: outcome.output_arguments,
            output_events: outcome.output_events,
            block_height: result.block_height,
            block_timestamp: result.block_timestamp,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519KeyPair, LocalSigner};
    use crate::membuffers::{InternalMessage, NO_UNIONS};
    use crate::protocol::schemes::{
        QUERY_SCHEME, RUN_QUERY_REQUEST_SCHEME, SIGNED_QUERY_SCHEME,
    };

    #[test]
    fn test_query_is_unsigned() {
        let signer = LocalSigner::new(Ed25519KeyPair::from_seed(&[9; 32]));
        let req = RunQueryRequest {
            protocol_version: 1,
            virtual_chain_id: 42,
            timestamp: 5,
            network_type: NetworkType::MainNet,
            contract_name: "BenchmarkToken".into(),
            method_name: "getBalance".into(),
            input_arguments: vec![Argument::Bytes20([1; 20])],
        };
        let buf = encode_run_query_request(&req, &signer).unwrap();
        let msg = InternalMessage::new(buf.as_slice(), RUN_QUERY_REQUEST_SCHEME, NO_UNIONS);
        assert!(msg.is_valid());
        let signed =
            InternalMessage::new(msg.get_message(0).unwrap(), SIGNED_QUERY_SCHEME, NO_UNIONS);
        assert!(signed.get_bytes(1).unwrap().is_empty());
        let query = InternalMessage::new(signed.get_message(0).unwrap(), QUERY_SCHEME, NO_UNIONS);
        assert_eq!(query.get_string(5).unwrap(), "getBalance");
        assert_eq!(query.get_u64(2).unwrap(), 5);
    }

    #[test]
    fn test_query_outputs_are_decoded() {
        let args = packed_arguments_encode(&[Argument::Uint64(1000)]).unwrap();
        let buf = build(&wire::RunQueryResponse {
            request_result: wire::RequestResult {
                request_status: RequestStatus::Completed,
                block_height: 11,
                block_timestamp: 12,
            },
            query_result: Some(wire::QueryResult {
                execution_result: ExecutionResult::Success,
                output_argument_array: &args,
                output_events_array: &[],
            }),
        })
        .unwrap();
        let res = decode_run_query_response(&buf).unwrap();
        assert_eq!(res.request_status, RequestStatus::Completed);
        assert_eq!(res.execution_result, ExecutionResult::Success);
        assert_eq!(res.output_arguments, vec![Argument::Uint64(1000)]);
        assert!(res.output_events.is_empty());
        assert_eq!(res.block_height, 11);
    }

    #[test]
    fn test_missing_query_result_is_not_executed() {
        let buf = build(&wire::RunQueryResponse {
            request_result: wire::RequestResult {
                request_status: RequestStatus::BadRequest,
                block_height: 0,
                block_timestamp: 0,
            },
            query_result: None,
        })
        .unwrap();
        let res = decode_run_query_response(&buf).unwrap();
        assert_eq!(res.request_status, RequestStatus::BadRequest);
        assert_eq!(res.execution_result, ExecutionResult::NotExecuted);
    }
}
