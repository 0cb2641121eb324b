//! Get-block: fetch a block by height and join its receipts to its
//! transactions

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::crypto::{SHA256_HASH_SIZE_BYTES, calc_sha256, calc_tx_hash, generate_tx_id};
use crate::membuffers::{NO_UNIONS, build};

use super::super::arguments::{Argument, packed_arguments_decode};
use super::super::codec::{
    Outcome, check_protocol_version, decode_receipt, decode_request_result, decode_response,
    finish_request, open_nested,
};
use super::super::events::Event;
use super::super::messages as wire;
use super::super::schemes::{
    EDDSA01_SIGNER_SCHEME, GET_BLOCK_RESPONSE_SCHEME, RESULTS_BLOCK_HEADER_SCHEME,
    SIGNED_TRANSACTION_SCHEME, SIGNER_SCHEME, SIGNER_UNIONS, TRANSACTION_SCHEME,
    TRANSACTIONS_BLOCK_HEADER_SCHEME,
};
use super::super::types::{ExecutionResult, RequestStatus};
use super::super::Result;
use super::Operation;

/// Block lookup by height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetBlockRequest {
    /// Must be [`PROTOCOL_VERSION`](super::super::PROTOCOL_VERSION)
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Height to fetch
    pub block_height: u64,
}

/// Decoded transactions block header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionsBlockHeader {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Block height
    pub block_height: u64,
    /// Hash of the previous block
    pub prev_block_hash_ptr: Vec<u8>,
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Merkle root of the block transactions
    pub transactions_merkle_root_hash: Vec<u8>,
    /// Hash of the block metadata
    pub metadata_hash: Vec<u8>,
    /// Number of transactions in the block
    pub num_transactions: u32,
    /// Address of the block proposer
    pub block_proposer_address: Vec<u8>,
    /// Seconds
    pub reference_time: u32,
}

/// Decoded results block header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultsBlockHeader {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Block height
    pub block_height: u64,
    /// Hash of the previous block
    pub prev_block_hash_ptr: Vec<u8>,
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Merkle root of the receipts
    pub receipts_merkle_root_hash: Vec<u8>,
    /// Hash of the state diff
    pub state_diff_hash: Vec<u8>,
    /// Hash of the matching transactions block
    pub transactions_block_hash_ptr: Vec<u8>,
    /// State merkle root before execution
    pub preexecution_state_merkle_root_hash: Vec<u8>,
    /// Number of receipts
    pub num_transaction_receipts: u32,
    /// Number of state diffs
    pub num_contract_state_diffs: u32,
    /// Address of the block proposer
    pub block_proposer_address: Vec<u8>,
    /// Seconds
    pub reference_time: u32,
}

/// A transaction of the block joined with its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTransaction {
    /// 40-byte transaction id
    pub tx_id: Vec<u8>,
    /// SHA-256 of the unsigned transaction
    pub tx_hash: [u8; SHA256_HASH_SIZE_BYTES],
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Ed25519 key of the signer, empty for unknown signer schemes
    pub signer_public_key: Vec<u8>,
    /// Called contract
    pub contract_name: String,
    /// Called method
    pub method_name: String,
    /// Method arguments
    pub input_arguments: Vec<Argument>,
    /// `None` when the block carries no receipt for this transaction
    pub execution_result: Option<ExecutionResult>,
    /// Values returned by the method
    pub output_arguments: Vec<Argument>,
    /// Events emitted by the method
    pub output_events: Vec<Event>,
}

/// Decoded block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GetBlockResponse {
    /// Request outcome
    pub request_status: RequestStatus,
    /// Height of the block the answer refers to
    pub block_height: u64,
    /// Timestamp of that block, in nanoseconds
    pub block_timestamp: u64,
    /// SHA-256 of the encoded transactions block header
    pub transactions_block_hash: [u8; SHA256_HASH_SIZE_BYTES],
    /// Transactions block header
    pub transactions_block_header: TransactionsBlockHeader,
    /// SHA-256 of the encoded results block header
    pub results_block_hash: [u8; SHA256_HASH_SIZE_BYTES],
    /// Results block header
    pub results_block_header: ResultsBlockHeader,
    /// Transactions in block order
    pub transactions: Vec<BlockTransaction>,
}

/// Build a get-block request.
#[instrument(level = "debug")]
pub fn encode_get_block_request(req: &GetBlockRequest) -> Result<Vec<u8>> {
    check_protocol_version(req.protocol_version)?;
    let buf = build(&wire::GetBlockRequest {
        protocol_version: req.protocol_version,
        virtual_chain_id: req.virtual_chain_id,
        block_height: req.block_height,
    })?;
    Ok(finish_request(Operation::GetBlock, buf))
}

fn decode_transactions_header(buf: &[u8]) -> Result<TransactionsBlockHeader> {
    let msg = open_nested(buf, TRANSACTIONS_BLOCK_HEADER_SCHEME, NO_UNIONS)?;
    Ok(TransactionsBlockHeader {
        protocol_version: msg.get_u32(0)?,
        virtual_chain_id: msg.get_u32(1)?,
        block_height: msg.get_u64(2)?,
        prev_block_hash_ptr: msg.get_bytes(3)?.to_vec(),
        timestamp: msg.get_u64(4)?,
        transactions_merkle_root_hash: msg.get_bytes(5)?.to_vec(),
        metadata_hash: msg.get_bytes(6)?.to_vec(),
        num_transactions: msg.get_u32(7)?,
        block_proposer_address: msg.get_bytes(8)?.to_vec(),
        reference_time: msg.get_u32(9)?,
    })
}

fn decode_results_header(buf: &[u8]) -> Result<ResultsBlockHeader> {
    let msg = open_nested(buf, RESULTS_BLOCK_HEADER_SCHEME, NO_UNIONS)?;
    Ok(ResultsBlockHeader {
        protocol_version: msg.get_u32(0)?,
        virtual_chain_id: msg.get_u32(1)?,
        block_height: msg.get_u64(2)?,
        prev_block_hash_ptr: msg.get_bytes(3)?.to_vec(),
        timestamp: msg.get_u64(4)?,
        receipts_merkle_root_hash: msg.get_bytes(5)?.to_vec(),
        state_diff_hash: msg.get_bytes(6)?.to_vec(),
        transactions_block_hash_ptr: msg.get_bytes(7)?.to_vec(),
        preexecution_state_merkle_root_hash: msg.get_bytes(8)?.to_vec(),
        num_transaction_receipts: msg.get_u32(9)?,
        num_contract_state_diffs: msg.get_u32(10)?,
        block_proposer_address: msg.get_bytes(11)?.to_vec(),
        reference_time: msg.get_u32(12)?,
    })
}

fn signer_public_key(buf: &[u8]) -> Result<Vec<u8>> {
    let signer = open_nested(buf, SIGNER_SCHEME, SIGNER_UNIONS)?;
    let Some(offset) = signer.is_union_index(0, 0)? else {
        return Ok(Vec::new());
    };
    let eddsa = open_nested(
        signer.get_message_in_offset(offset)?,
        EDDSA01_SIGNER_SCHEME,
        NO_UNIONS,
    )?;
    Ok(eddsa.get_bytes(1)?.to_vec())
}

fn decode_block_transaction(
    buf: &[u8],
    receipts: &HashMap<Vec<u8>, Outcome>,
) -> Result<BlockTransaction> {
    let signed = open_nested(buf, SIGNED_TRANSACTION_SCHEME, NO_UNIONS)?;
    let raw_tx = signed.raw_buffer_for_field(0)?;
    let tx = open_nested(raw_tx, TRANSACTION_SCHEME, NO_UNIONS)?;
    let tx_hash = calc_tx_hash(raw_tx);
    let timestamp = tx.get_u64(2)?;
    let receipt = receipts.get(tx_hash.as_slice()).cloned();
    let (execution_result, output_arguments, output_events) = match receipt {
        Some(outcome) => (
            Some(outcome.execution_result),
            outcome.output_arguments,
            outcome.output_events,
        ),
        None => (None, Vec::new(), Vec::new()),
    };
    Ok(BlockTransaction {
        tx_id: generate_tx_id(&tx_hash, timestamp).to_vec(),
        tx_hash,
        protocol_version: tx.get_u32(0)?,
        virtual_chain_id: tx.get_u32(1)?,
        timestamp,
        signer_public_key: signer_public_key(tx.get_message(3)?)?,
        contract_name: tx.get_string(4)?.to_owned(),
        method_name: tx.get_string(5)?.to_owned(),
        input_arguments: packed_arguments_decode(tx.raw_buffer_with_header_for_field(6)?)?,
        execution_result,
        output_arguments,
        output_events,
    })
}

/// Decode a get-block response body. Receipts are joined to transactions by
/// transaction hash.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn decode_get_block_response(buf: &[u8]) -> Result<GetBlockResponse> {
    decode_response(Operation::GetBlock, buf, GET_BLOCK_RESPONSE_SCHEME, |msg| {
        let result = decode_request_result(msg, 0)?;
        let raw_tx_header = msg.get_message(1)?;
        let raw_results_header = msg.get_message(5)?;

        let mut receipts = HashMap::new();
        for raw in msg.get_message_array_iter(6)? {
            let outcome = decode_receipt(raw?.as_bytes())?;
            receipts.insert(outcome.tx_hash.clone(), outcome);
        }
        let transactions = msg
            .get_message_array_iter(3)?
            .map(|raw| decode_block_transaction(raw?.as_bytes(), &receipts))
            .collect::<Result<Vec<_>>>()?;
        let unmatched = receipts
            .keys()
            .filter(|hash| !transactions.iter().any(|tx| tx.tx_hash[..] == hash[..]))
            .count();
        if unmatched > 0 {
            debug!(unmatched, "receipts without a transaction in block");
        }
        trace!(transactions = transactions.len(), "decoded block");

        Ok(GetBlockResponse {
            request_status: result.request_status,
            block_height: result.block_height,
            block_timestamp: result.block_timestamp,
            transactions_block_hash: calc_sha256(raw_tx_header),
            transactions_block_header: decode_transactions_header(raw_tx_header)?,
            results_block_hash: calc_sha256(raw_results_header),
            results_block_header: decode_results_header(raw_results_header)?,
            transactions,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membuffers::{CodecError, RawMessage};
    use crate::protocol::Error;
    use crate::protocol::arguments::packed_arguments_encode;
    use crate::protocol::types::NetworkType;

    #[test]
    fn test_get_block_request_bytes() {
        let buf = encode_get_block_request(&GetBlockRequest {
            protocol_version: 1,
            virtual_chain_id: 42,
            block_height: 3,
        })
        .unwrap();
        assert_eq!(buf, [1, 0, 0, 0, 42, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_block_joins_receipts_by_hash() {
        let pk = [0x5A; 32];
        let args = packed_arguments_encode(&[Argument::Uint64(10)]).unwrap();
        let make_tx = |method| wire::SignedTransaction {
            transaction: wire::Transaction {
                protocol_version: 1,
                virtual_chain_id: 42,
                timestamp: 1000,
                signer: wire::Signer::Eddsa(wire::EdDsa01Signer {
                    network_type: NetworkType::TestNet,
                    public_key: &pk,
                }),
                contract_name: "BenchmarkToken",
                method_name: method,
                input_argument_array: &args,
            },
            signature: &[1; 64],
        };
        let executed = make_tx("transfer");
        let pending = make_tx("approve");
        let executed_hash = calc_tx_hash(&build(&executed.transaction).unwrap());

        let out = packed_arguments_encode(&[Argument::Bool(true)]).unwrap();
        let tx_header = wire::TransactionsBlockHeader {
            protocol_version: 1,
            virtual_chain_id: 42,
            block_height: 9,
            prev_block_hash_ptr: &[3; 32],
            timestamp: 1001,
            num_signed_transactions: 2,
            block_proposer_address: &[4; 20],
            reference_time: 17,
            ..Default::default()
        };
        let results_header = wire::ResultsBlockHeader {
            protocol_version: 1,
            virtual_chain_id: 42,
            block_height: 9,
            num_transaction_receipts: 1,
            block_proposer_address: &[4; 20],
            reference_time: 17,
            ..Default::default()
        };
        let buf = build(&wire::GetBlockResponse {
            request_result: wire::RequestResult {
                request_status: RequestStatus::Completed,
                block_height: 9,
                block_timestamp: 1001,
            },
            transactions_block_header: tx_header,
            transactions_block_metadata: RawMessage(&[]),
            signed_transactions: vec![executed, pending],
            transactions_block_proof: RawMessage(&[]),
            results_block_header: results_header,
            transaction_receipts: vec![wire::TransactionReceipt {
                tx_hash: &executed_hash,
                execution_result: ExecutionResult::Success,
                output_argument_array: &out,
                output_events_array: &[],
            }],
            contract_state_diffs: vec![],
            results_block_proof: RawMessage(&[]),
        })
        .unwrap();

        let block = decode_get_block_response(&buf).unwrap();
        assert_eq!(block.request_status, RequestStatus::Completed);
        assert_eq!(block.transactions_block_hash, calc_sha256(&build(&tx_header).unwrap()));
        assert_eq!(block.results_block_hash, calc_sha256(&build(&results_header).unwrap()));
        assert_eq!(block.transactions_block_header.num_transactions, 2);
        assert_eq!(block.transactions_block_header.reference_time, 17);
        assert_eq!(block.transactions_block_header.block_proposer_address, vec![4; 20]);
        assert_eq!(block.results_block_header.num_transaction_receipts, 1);

        assert_eq!(block.transactions.len(), 2);
        let first = &block.transactions[0];
        assert_eq!(first.tx_hash, executed_hash);
        assert_eq!(first.tx_id, generate_tx_id(&executed_hash, 1000).to_vec());
        assert_eq!(first.signer_public_key, pk.to_vec());
        assert_eq!(first.method_name, "transfer");
        assert_eq!(first.input_arguments, vec![Argument::Uint64(10)]);
        assert_eq!(first.execution_result, Some(ExecutionResult::Success));
        assert_eq!(first.output_arguments, vec![Argument::Bool(true)]);

        let second = &block.transactions[1];
        assert_eq!(second.method_name, "approve");
        assert_eq!(second.execution_result, None);
        assert!(second.output_arguments.is_empty());
    }

    #[test]
    fn test_repeated_transaction_shares_its_receipt() {
        let pk = [0x5A; 32];
        let signed = wire::SignedTransaction {
            transaction: wire::Transaction {
                protocol_version: 1,
                virtual_chain_id: 42,
                timestamp: 1000,
                signer: wire::Signer::Eddsa(wire::EdDsa01Signer {
                    network_type: NetworkType::TestNet,
                    public_key: &pk,
                }),
                contract_name: "Counter",
                method_name: "inc",
                input_argument_array: &[],
            },
            signature: &[1; 64],
        };
        let tx_hash = calc_tx_hash(&build(&signed.transaction).unwrap());
        let buf = build(&wire::GetBlockResponse {
            request_result: wire::RequestResult {
                request_status: RequestStatus::Completed,
                block_height: 4,
                block_timestamp: 0,
            },
            transactions_block_header: wire::TransactionsBlockHeader::default(),
            transactions_block_metadata: RawMessage(&[]),
            signed_transactions: vec![signed, signed],
            transactions_block_proof: RawMessage(&[]),
            results_block_header: wire::ResultsBlockHeader::default(),
            transaction_receipts: vec![wire::TransactionReceipt {
                tx_hash: &tx_hash,
                execution_result: ExecutionResult::Success,
                output_argument_array: &[],
                output_events_array: &[],
            }],
            contract_state_diffs: vec![],
            results_block_proof: RawMessage(&[]),
        })
        .unwrap();

        let block = decode_get_block_response(&buf).unwrap();
        assert_eq!(block.transactions.len(), 2);
        for tx in &block.transactions {
            assert_eq!(tx.tx_hash, tx_hash);
            assert_eq!(tx.execution_result, Some(ExecutionResult::Success));
        }
    }

    #[test]
    fn test_header_with_trailing_bytes_is_rejected() {
        let mut header = build(&wire::TransactionsBlockHeader {
            protocol_version: 1,
            block_height: 4,
            ..Default::default()
        })
        .unwrap();
        assert!(decode_transactions_header(&header).is_ok());
        header.extend_from_slice(&[0; 4]);
        assert!(matches!(
            decode_transactions_header(&header),
            Err(Error::Codec(CodecError::InvalidStructure { .. }))
        ));
    }
}
