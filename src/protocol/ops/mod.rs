//! Request encoders and response decoders, one module per public API call
//!
//! Requests are plain owned structs; encoders validate them and write the
//! wire envelope. Decoders run a structural scan over the whole response
//! before reading any field, so a truncated or garbled body is reported as
//! [`Error::CorruptResponse`](super::Error::CorruptResponse) rather than as
//! partial data.

mod block;
mod receipt_proof;
mod run_query;
mod send_transaction;
mod transaction_status;

use std::fmt;

pub use block::{
    BlockTransaction, GetBlockRequest, GetBlockResponse, ResultsBlockHeader,
    TransactionsBlockHeader, decode_get_block_response, encode_get_block_request,
};
pub use receipt_proof::{
    GetTransactionReceiptProofRequest, GetTransactionReceiptProofResponse,
    decode_get_transaction_receipt_proof_response, encode_get_transaction_receipt_proof_request,
};
pub use run_query::{
    RunQueryRequest, RunQueryResponse, decode_run_query_response, encode_run_query_request,
};
pub use send_transaction::{
    SendTransactionRequest, SendTransactionResponse, decode_send_transaction_response,
    encode_send_transaction_request,
};
pub use transaction_status::{
    GetTransactionStatusRequest, GetTransactionStatusResponse,
    decode_get_transaction_status_response, encode_get_transaction_status_request,
};

/// Public API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Submit a signed transaction
    SendTransaction,
    /// Run a read-only query
    RunQuery,
    /// Look up a transaction by id
    GetTransactionStatus,
    /// Fetch a receipt with its proof
    GetTransactionReceiptProof,
    /// Fetch a block by height
    GetBlock,
}

impl Operation {
    /// Number of operations.
    pub const COUNT: usize = 5;

    /// Every operation, in a fixed order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::SendTransaction,
        Self::RunQuery,
        Self::GetTransactionStatus,
        Self::GetTransactionReceiptProof,
        Self::GetBlock,
    ];

    /// HTTP path the request is posted to.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SendTransaction => "/api/v1/send-transaction",
            Self::RunQuery => "/api/v1/run-query",
            Self::GetTransactionStatus => "/api/v1/get-transaction-status",
            Self::GetTransactionReceiptProof => "/api/v1/get-transaction-receipt-proof",
            Self::GetBlock => "/api/v1/get-block",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::SendTransaction => "send-transaction",
            Self::RunQuery => "run-query",
            Self::GetTransactionStatus => "get-transaction-status",
            Self::GetTransactionReceiptProof => "get-transaction-receipt-proof",
            Self::GetBlock => "get-block",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
