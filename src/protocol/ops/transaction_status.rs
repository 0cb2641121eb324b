//! Get-transaction-status

use tracing::instrument;

use crate::membuffers::build;

use super::super::arguments::Argument;
use super::super::codec::{
    check_protocol_version, decode_receipt, decode_request_result, decode_response,
    finish_request, split_tx_id,
};
use super::super::events::Event;
use super::super::messages as wire;
use super::super::schemes::GET_TRANSACTION_STATUS_RESPONSE_SCHEME;
use super::super::types::{ExecutionResult, RequestStatus, TransactionStatus};
use super::super::Result;
use super::Operation;

/// Status lookup for a previously submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTransactionStatusRequest {
    /// Must be [`PROTOCOL_VERSION`](super::super::PROTOCOL_VERSION)
    pub protocol_version: u32,
    /// Virtual chain the transaction was sent to
    pub virtual_chain_id: u32,
    /// 40-byte transaction id
    pub tx_id: Vec<u8>,
}

/// Decoded transaction status.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GetTransactionStatusResponse {
    /// Request outcome
    pub request_status: RequestStatus,
    /// Hash of the transaction, empty when no receipt was returned
    pub tx_hash: Vec<u8>,
    /// Execution outcome
    pub execution_result: ExecutionResult,
    /// Values returned by the method
    pub output_arguments: Vec<Argument>,
    /// Events emitted by the method
    pub output_events: Vec<Event>,
    /// Transaction status
    pub transaction_status: TransactionStatus,
    /// Height of the block the answer refers to
    pub block_height: u64,
    /// Timestamp of that block, in nanoseconds
    pub block_timestamp: u64,
}

/// Build a get-transaction-status request.
#[instrument(level = "debug", skip(req))]
pub fn encode_get_transaction_status_request(req: &GetTransactionStatusRequest) -> Result<Vec<u8>> {
    check_protocol_version(req.protocol_version)?;
    let (tx_hash, transaction_timestamp) = split_tx_id(&req.tx_id)?;
    let buf = build(&wire::GetTransactionStatusRequest {
        transaction_ref: wire::TransactionRef {
            protocol_version: req.protocol_version,
            virtual_chain_id: req.virtual_chain_id,
            transaction_timestamp,
            tx_hash: &tx_hash,
        },
    })?;
    Ok(finish_request(Operation::GetTransactionStatus, buf))
}

/// Decode a get-transaction-status response body.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn decode_get_transaction_status_response(buf: &[u8]) -> Result<GetTransactionStatusResponse> {
    decode_response(
        Operation::GetTransactionStatus,
        buf,
        GET_TRANSACTION_STATUS_RESPONSE_SCHEME,
        |msg| {
            let result = decode_request_result(msg, 0)?;
            let transaction_status = TransactionStatus::decode(msg.get_u16(1)?)?;
            let receipt = decode_receipt(msg.get_message(2)?)?;
            Ok(GetTransactionStatusResponse {
                request_status: result.request_status,
                tx_hash: receipt.tx_hash,
                execution_result: receipt.execution_result,
                output_arguments: receipt.output_arguments,
                output_events: receipt.output_events,
                transaction_status,
                block_height: result.block_height,
                block_timestamp: result.block_timestamp,
            })
        },
    )
}
