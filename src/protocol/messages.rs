//! Wire messages
//!
//! Borrowing views that write themselves in scheme order (see
//! [`schemes`](super::schemes)). Request encoders build them; tests and
//! fixtures build the response envelopes.

use crate::membuffers::{Builder, CodecError, Encodable, RawMessage};

use super::types::{ExecutionResult, NetworkType, RequestStatus, TransactionStatus};

type WriteResult = Result<(), CodecError>;

/// `EdDSA01Signer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdDsa01Signer<'a> {
    /// Network the key belongs to
    pub network_type: NetworkType,
    /// Ed25519 public key
    pub public_key: &'a [u8],
}

impl Encodable for EdDsa01Signer<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u16(self.network_type.as_u16())?;
        builder.write_bytes(self.public_key)
    }
}

/// `Signer` union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer<'a> {
    /// Selector 0
    Eddsa(EdDsa01Signer<'a>),
}

impl Encodable for Signer<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        match self {
            Self::Eddsa(eddsa) => {
                builder.write_union_index(0)?;
                builder.write_message(eddsa)
            }
        }
    }
}

/// `Transaction`, also the layout of `Query`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction<'a> {
    /// Protocol version
    pub protocol_version: u32,
    /// Target virtual chain
    pub virtual_chain_id: u32,
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Signer description
    pub signer: Signer<'a>,
    /// Contract to call
    pub contract_name: &'a str,
    /// Method to call
    pub method_name: &'a str,
    /// Packed input arguments
    pub input_argument_array: &'a [u8],
}

impl Encodable for Transaction<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u32(self.protocol_version)?;
        builder.write_u32(self.virtual_chain_id)?;
        builder.write_u64(self.timestamp)?;
        builder.write_message(&self.signer)?;
        builder.write_string(self.contract_name)?;
        builder.write_string(self.method_name)?;
        builder.write_bytes(self.input_argument_array)
    }
}

/// `Query`
pub type Query<'a> = Transaction<'a>;

/// `SignedTransaction`, also the layout of `SignedQuery`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedTransaction<'a> {
    /// Unsigned envelope
    pub transaction: Transaction<'a>,
    /// Ed25519 signature over the envelope hash, empty for queries
    pub signature: &'a [u8],
}

impl Encodable for SignedTransaction<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.transaction)?;
        builder.write_bytes(self.signature)
    }
}

/// `SignedQuery`
pub type SignedQuery<'a> = SignedTransaction<'a>;

/// `TransactionReceipt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt<'a> {
    /// Hash of the executed transaction
    pub tx_hash: &'a [u8],
    /// Execution outcome
    pub execution_result: ExecutionResult,
    /// Packed output arguments
    pub output_argument_array: &'a [u8],
    /// Packed output events
    pub output_events_array: &'a [u8],
}

impl Encodable for TransactionReceipt<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_bytes(self.tx_hash)?;
        builder.write_u16(self.execution_result.as_u16())?;
        builder.write_bytes(self.output_argument_array)?;
        builder.write_bytes(self.output_events_array)
    }
}

/// `QueryResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult<'a> {
    /// Execution outcome
    pub execution_result: ExecutionResult,
    /// Packed output arguments
    pub output_argument_array: &'a [u8],
    /// Packed output events
    pub output_events_array: &'a [u8],
}

impl Encodable for QueryResult<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u16(self.execution_result.as_u16())?;
        builder.write_bytes(self.output_argument_array)?;
        builder.write_bytes(self.output_events_array)
    }
}

/// `TransactionsBlockHeader`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionsBlockHeader<'a> {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Block height
    pub block_height: u64,
    /// Hash of the previous block
    pub prev_block_hash_ptr: &'a [u8],
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Merkle root of the block transactions
    pub transactions_merkle_root_hash: &'a [u8],
    /// Hash of the block metadata
    pub metadata_hash: &'a [u8],
    /// Number of transactions in the block
    pub num_signed_transactions: u32,
    /// Address of the block proposer
    pub block_proposer_address: &'a [u8],
    /// Reference time, in seconds
    pub reference_time: u32,
}

impl Encodable for TransactionsBlockHeader<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u32(self.protocol_version)?;
        builder.write_u32(self.virtual_chain_id)?;
        builder.write_u64(self.block_height)?;
        builder.write_bytes(self.prev_block_hash_ptr)?;
        builder.write_u64(self.timestamp)?;
        builder.write_bytes(self.transactions_merkle_root_hash)?;
        builder.write_bytes(self.metadata_hash)?;
        builder.write_u32(self.num_signed_transactions)?;
        builder.write_bytes(self.block_proposer_address)?;
        builder.write_u32(self.reference_time)
    }
}

/// `ResultsBlockHeader`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultsBlockHeader<'a> {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Block height
    pub block_height: u64,
    /// Hash of the previous block
    pub prev_block_hash_ptr: &'a [u8],
    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,
    /// Merkle root of the receipts
    pub receipts_merkle_root_hash: &'a [u8],
    /// Hash of the state diff
    pub state_diff_hash: &'a [u8],
    /// Hash of the matching transactions block
    pub transactions_block_hash_ptr: &'a [u8],
    /// State merkle root before execution
    pub preexecution_state_merkle_root_hash: &'a [u8],
    /// Number of receipts
    pub num_transaction_receipts: u32,
    /// Number of state diffs
    pub num_contract_state_diffs: u32,
    /// Address of the block proposer
    pub block_proposer_address: &'a [u8],
    /// Reference time, in seconds
    pub reference_time: u32,
}

impl Encodable for ResultsBlockHeader<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u32(self.protocol_version)?;
        builder.write_u32(self.virtual_chain_id)?;
        builder.write_u64(self.block_height)?;
        builder.write_bytes(self.prev_block_hash_ptr)?;
        builder.write_u64(self.timestamp)?;
        builder.write_bytes(self.receipts_merkle_root_hash)?;
        builder.write_bytes(self.state_diff_hash)?;
        builder.write_bytes(self.transactions_block_hash_ptr)?;
        builder.write_bytes(self.preexecution_state_merkle_root_hash)?;
        builder.write_u32(self.num_transaction_receipts)?;
        builder.write_u32(self.num_contract_state_diffs)?;
        builder.write_bytes(self.block_proposer_address)?;
        builder.write_u32(self.reference_time)
    }
}

/// `RequestResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestResult {
    /// Request outcome
    pub request_status: RequestStatus,
    /// Height of the block the answer refers to
    pub block_height: u64,
    /// Timestamp of that block, in nanoseconds
    pub block_timestamp: u64,
}

impl Encodable for RequestResult {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u16(self.request_status.as_u16())?;
        builder.write_u64(self.block_height)?;
        builder.write_u64(self.block_timestamp)
    }
}

/// `TransactionRef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRef<'a> {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain of the transaction
    pub virtual_chain_id: u32,
    /// Transaction timestamp, from the tx id
    pub transaction_timestamp: u64,
    /// Transaction hash, from the tx id
    pub tx_hash: &'a [u8],
}

impl Encodable for TransactionRef<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u32(self.protocol_version)?;
        builder.write_u32(self.virtual_chain_id)?;
        builder.write_u64(self.transaction_timestamp)?;
        builder.write_bytes(self.tx_hash)
    }
}

/// `SendTransactionRequest`
#[derive(Debug, Clone, Copy)]
pub struct SendTransactionRequest<'a> {
    /// Signed envelope
    pub signed_transaction: SignedTransaction<'a>,
}

impl Encodable for SendTransactionRequest<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.signed_transaction)
    }
}

/// `RunQueryRequest`
#[derive(Debug, Clone, Copy)]
pub struct RunQueryRequest<'a> {
    /// Signed envelope
    pub signed_query: SignedQuery<'a>,
}

impl Encodable for RunQueryRequest<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.signed_query)
    }
}

/// `GetTransactionStatusRequest`
#[derive(Debug, Clone, Copy)]
pub struct GetTransactionStatusRequest<'a> {
    /// Transaction being asked about
    pub transaction_ref: TransactionRef<'a>,
}

impl Encodable for GetTransactionStatusRequest<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.transaction_ref)
    }
}

/// `GetTransactionReceiptProofRequest`
#[derive(Debug, Clone, Copy)]
pub struct GetTransactionReceiptProofRequest<'a> {
    /// Transaction being asked about
    pub transaction_ref: TransactionRef<'a>,
}

impl Encodable for GetTransactionReceiptProofRequest<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.transaction_ref)
    }
}

/// `GetBlockRequest`
#[derive(Debug, Clone, Copy)]
pub struct GetBlockRequest {
    /// Protocol version
    pub protocol_version: u32,
    /// Virtual chain
    pub virtual_chain_id: u32,
    /// Block height
    pub block_height: u64,
}

impl Encodable for GetBlockRequest {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_u32(self.protocol_version)?;
        builder.write_u32(self.virtual_chain_id)?;
        builder.write_u64(self.block_height)
    }
}

/// `SendTransactionResponse`; `None` receipts are written empty.
#[derive(Debug, Clone, Copy)]
pub struct SendTransactionResponse<'a> {
    /// Request outcome
    pub request_result: RequestResult,
    /// Transaction status
    pub transaction_status: TransactionStatus,
    /// Receipt, if the transaction was executed
    pub transaction_receipt: Option<TransactionReceipt<'a>>,
}

impl Encodable for SendTransactionResponse<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.request_result)?;
        builder.write_u16(self.transaction_status.as_u16())?;
        builder.write_message(&self.transaction_receipt)
    }
}

/// `GetTransactionStatusResponse`
pub type GetTransactionStatusResponse<'a> = SendTransactionResponse<'a>;

/// `RunQueryResponse`
#[derive(Debug, Clone, Copy)]
pub struct RunQueryResponse<'a> {
    /// Request outcome
    pub request_result: RequestResult,
    /// Query result, if executed
    pub query_result: Option<QueryResult<'a>>,
}

impl Encodable for RunQueryResponse<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.request_result)?;
        builder.write_message(&self.query_result)
    }
}

/// `GetTransactionReceiptProofResponse`
#[derive(Debug, Clone, Copy)]
pub struct GetTransactionReceiptProofResponse<'a> {
    /// Request outcome
    pub request_result: RequestResult,
    /// Transaction status
    pub transaction_status: TransactionStatus,
    /// Receipt, if the transaction was executed
    pub transaction_receipt: Option<TransactionReceipt<'a>>,
    /// Packed receipt proof
    pub packed_proof: &'a [u8],
}

impl Encodable for GetTransactionReceiptProofResponse<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.request_result)?;
        builder.write_u16(self.transaction_status.as_u16())?;
        builder.write_message(&self.transaction_receipt)?;
        builder.write_bytes(self.packed_proof)
    }
}

/// `GetBlockResponse`. Metadata, proofs and state diffs are carried as
/// already-encoded message content.
#[derive(Debug, Clone)]
pub struct GetBlockResponse<'a> {
    /// Request outcome
    pub request_result: RequestResult,
    /// Transactions block header
    pub transactions_block_header: TransactionsBlockHeader<'a>,
    /// Transactions block metadata
    pub transactions_block_metadata: RawMessage<'a>,
    /// Transactions in the block
    pub signed_transactions: Vec<SignedTransaction<'a>>,
    /// Transactions block proof
    pub transactions_block_proof: RawMessage<'a>,
    /// Results block header
    pub results_block_header: ResultsBlockHeader<'a>,
    /// Receipts in the block
    pub transaction_receipts: Vec<TransactionReceipt<'a>>,
    /// Contract state diffs
    pub contract_state_diffs: Vec<RawMessage<'a>>,
    /// Results block proof
    pub results_block_proof: RawMessage<'a>,
}

impl Encodable for GetBlockResponse<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> WriteResult {
        builder.write_message(&self.request_result)?;
        builder.write_message(&self.transactions_block_header)?;
        builder.write_message(&self.transactions_block_metadata)?;
        builder.write_message_array(&self.signed_transactions)?;
        builder.write_message(&self.transactions_block_proof)?;
        builder.write_message(&self.results_block_header)?;
        builder.write_message_array(&self.transaction_receipts)?;
        builder.write_message_array(&self.contract_state_diffs)?;
        builder.write_message(&self.results_block_proof)
    }
}
