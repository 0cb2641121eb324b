//! Get-transaction-receipt-proof

use tracing::instrument;

use crate::membuffers::build;

use super::super::arguments::Argument;
use super::super::codec::{
    check_protocol_version, decode_receipt, decode_request_result, decode_response,
    finish_request, split_tx_id,
};
use super::super::events::Event;
use super::super::messages as wire;
use super::super::schemes::GET_TRANSACTION_RECEIPT_PROOF_RESPONSE_SCHEME;
use super::super::types::{ExecutionResult, RequestStatus, TransactionStatus};
use super::super::Result;
use super::Operation;

/// Receipt proof lookup for a previously submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTransactionReceiptProofRequest {
    /// Must be [`PROTOCOL_VERSION`](super::super::PROTOCOL_VERSION)
    pub protocol_version: u32,
    /// Virtual chain the transaction was sent to
    pub virtual_chain_id: u32,
    /// 40-byte transaction id
    pub tx_id: Vec<u8>,
}

/// Decoded receipt with its proof.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GetTransactionReceiptProofResponse {
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
    /// Opaque receipt proof
    pub packed_proof: Vec<u8>,
    /// Receipt bytes the proof covers
    pub packed_receipt: Vec<u8>,
}

/// Build a get-transaction-receipt-proof request.
#[instrument(level = "debug", skip(req))]
pub fn encode_get_transaction_receipt_proof_request(
    req: &GetTransactionReceiptProofRequest,
) -> Result<Vec<u8>> {
    check_protocol_version(req.protocol_version)?;
    let (tx_hash, transaction_timestamp) = split_tx_id(&req.tx_id)?;
    let buf = build(&wire::GetTransactionReceiptProofRequest {
        transaction_ref: wire::TransactionRef {
            protocol_version: req.protocol_version,
            virtual_chain_id: req.virtual_chain_id,
            transaction_timestamp,
            tx_hash: &tx_hash,
        },
    })?;
    Ok(finish_request(Operation::GetTransactionReceiptProof, buf))
}

/// Decode a get-transaction-receipt-proof response body.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn decode_get_transaction_receipt_proof_response(
    buf: &[u8],
) -> Result<GetTransactionReceiptProofResponse> {
    decode_response(
        Operation::GetTransactionReceiptProof,
        buf,
        GET_TRANSACTION_RECEIPT_PROOF_RESPONSE_SCHEME,
        |msg| {
            let result = decode_request_result(msg, 0)?;
            let transaction_status = TransactionStatus::decode(msg.get_u16(1)?)?;
            let packed_receipt = msg.get_message(2)?;
            let receipt = decode_receipt(packed_receipt)?;
            Ok(GetTransactionReceiptProofResponse {
                request_status: result.request_status,
                tx_hash: receipt.tx_hash,
                execution_result: receipt.execution_result,
                output_arguments: receipt.output_arguments,
                output_events: receipt.output_events,
                transaction_status,
                block_height: result.block_height,
                block_timestamp: result.block_timestamp,
                packed_proof: msg.get_bytes(3)?.to_vec(),
                packed_receipt: packed_receipt.to_vec(),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::arguments::packed_arguments_encode;

    #[test]
    fn test_proof_and_receipt_are_kept() {
        let args = packed_arguments_encode(&[Argument::Bool(true)]).unwrap();
        let receipt = wire::TransactionReceipt {
            tx_hash: &[8; 32],
            execution_result: ExecutionResult::Success,
            output_argument_array: &args,
            output_events_array: &[],
        };
        let buf = build(&wire::GetTransactionReceiptProofResponse {
            request_result: wire::RequestResult {
                request_status: RequestStatus::Completed,
                block_height: 5,
                block_timestamp: 6,
            },
            transaction_status: TransactionStatus::Committed,
            transaction_receipt: Some(receipt),
            packed_proof: &[0xEE; 10],
        })
        .unwrap();
        let res = decode_get_transaction_receipt_proof_response(&buf).unwrap();
        assert_eq!(res.packed_proof, vec![0xEE; 10]);
        assert_eq!(res.packed_receipt, build(&receipt).unwrap());
        assert_eq!(res.output_arguments, vec![Argument::Bool(true)]);
        assert_eq!(res.tx_hash, vec![8; 32]);
    }

    #[test]
    fn test_request_matches_status_request_layout() {
        let tx_id = crate::crypto::generate_tx_id(&[6; 32], 77);
        let proof =
            encode_get_transaction_receipt_proof_request(&GetTransactionReceiptProofRequest {
                protocol_version: 1,
                virtual_chain_id: 42,
                tx_id: tx_id.to_vec(),
            })
            .unwrap();
        let status = super::super::encode_get_transaction_status_request(
            &super::super::GetTransactionStatusRequest {
                protocol_version: 1,
                virtual_chain_id: 42,
                tx_id: tx_id.to_vec(),
            },
        )
        .unwrap();
        assert_eq!(proof, status);
    }
}
