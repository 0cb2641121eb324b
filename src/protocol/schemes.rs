//! Field layouts of every protocol message
//!
//! Field positions are part of the wire contract; readers address fields by
//! their index in these lists.

use crate::membuffers::{FieldType, Scheme, Unions};

use FieldType::{
    Bool, BoolArray, Bytes, Bytes20, Bytes20Array, Bytes32, Bytes32Array, BytesArray, Message,
    MessageArray, String, StringArray, Uint16, Uint32, Uint32Array, Uint64, Uint64Array, Uint256,
    Uint256Array, Union,
};

/// `Argument`: a single union over every argument kind.
pub static ARGUMENT_SCHEME: Scheme = &[Union];

/// Argument variants, indexed by argument tag.
pub static ARGUMENT_UNIONS: Unions = &[&[
    Uint32,
    Uint64,
    String,
    Bytes,
    Bool,
    Uint256,
    Bytes20,
    Bytes32,
    Uint32Array,
    Uint64Array,
    StringArray,
    BytesArray,
    BoolArray,
    Uint256Array,
    Bytes20Array,
    Bytes32Array,
]];

/// `ArgumentArray`: `[arguments]`.
pub static ARGUMENT_ARRAY_SCHEME: Scheme = &[MessageArray];

/// `Event`: `[contract name, event name, packed arguments]`.
pub static EVENT_SCHEME: Scheme = &[String, String, Bytes];

/// `EventsArray`: `[events]`.
pub static EVENTS_ARRAY_SCHEME: Scheme = &[MessageArray];

/// `EdDSA01Signer`: `[network type, public key]`.
pub static EDDSA01_SIGNER_SCHEME: Scheme = &[Uint16, Bytes];

/// `Signer`: union over signer schemes.
pub static SIGNER_SCHEME: Scheme = &[Union];

/// Signer variants: `0` Ed25519, `1` reserved.
pub static SIGNER_UNIONS: Unions = &[&[Message, Message]];

/// `Transaction`: `[protocol version, virtual chain, timestamp, signer,
/// contract name, method name, packed input arguments]`.
pub static TRANSACTION_SCHEME: Scheme = &[Uint32, Uint32, Uint64, Message, String, String, Bytes];

/// `SignedTransaction`: `[transaction, signature]`.
pub static SIGNED_TRANSACTION_SCHEME: Scheme = &[Message, Bytes];

/// `Query`: same layout as `Transaction`.
pub static QUERY_SCHEME: Scheme = &[Uint32, Uint32, Uint64, Message, String, String, Bytes];

/// `SignedQuery`: `[query, signature]`.
pub static SIGNED_QUERY_SCHEME: Scheme = &[Message, Bytes];

/// `TransactionReceipt`: `[tx hash, execution result, packed output
/// arguments, packed output events]`.
pub static TRANSACTION_RECEIPT_SCHEME: Scheme = &[Bytes, Uint16, Bytes, Bytes];

/// `QueryResult`: `[execution result, packed output arguments, packed
/// output events]`.
pub static QUERY_RESULT_SCHEME: Scheme = &[Uint16, Bytes, Bytes];

/// `TransactionsBlockHeader`.
pub static TRANSACTIONS_BLOCK_HEADER_SCHEME: Scheme = &[
    Uint32, // protocol version
    Uint32, // virtual chain
    Uint64, // block height
    Bytes,  // previous block hash
    Uint64, // timestamp
    Bytes,  // transactions merkle root
    Bytes,  // metadata hash
    Uint32, // number of transactions
    Bytes,  // proposer address
    Uint32, // reference time
];

/// `ResultsBlockHeader`.
pub static RESULTS_BLOCK_HEADER_SCHEME: Scheme = &[
    Uint32, // protocol version
    Uint32, // virtual chain
    Uint64, // block height
    Bytes,  // previous block hash
    Uint64, // timestamp
    Bytes,  // receipts merkle root
    Bytes,  // state diff hash
    Bytes,  // transactions block hash
    Bytes,  // pre-execution state merkle root
    Uint32, // number of receipts
    Uint32, // number of state diffs
    Bytes,  // proposer address
    Uint32, // reference time
];

/// `RequestResult`: `[request status, block height, block timestamp]`.
pub static REQUEST_RESULT_SCHEME: Scheme = &[Uint16, Uint64, Uint64];

/// `TransactionRef`: `[protocol version, virtual chain, tx timestamp, tx hash]`.
pub static TRANSACTION_REF_SCHEME: Scheme = &[Uint32, Uint32, Uint64, Bytes];

/// `SendTransactionRequest`: `[signed transaction]`.
pub static SEND_TRANSACTION_REQUEST_SCHEME: Scheme = &[Message];

/// `SendTransactionResponse`: `[request result, tx status, receipt]`.
pub static SEND_TRANSACTION_RESPONSE_SCHEME: Scheme = &[Message, Uint16, Message];

/// `RunQueryRequest`: `[signed query]`.
pub static RUN_QUERY_REQUEST_SCHEME: Scheme = &[Message];

/// `RunQueryResponse`: `[request result, query result]`.
pub static RUN_QUERY_RESPONSE_SCHEME: Scheme = &[Message, Message];

/// `GetTransactionStatusRequest`: `[transaction ref]`.
pub static GET_TRANSACTION_STATUS_REQUEST_SCHEME: Scheme = &[Message];

/// `GetTransactionStatusResponse`: `[request result, tx status, receipt]`.
pub static GET_TRANSACTION_STATUS_RESPONSE_SCHEME: Scheme = &[Message, Uint16, Message];

/// `GetTransactionReceiptProofRequest`: `[transaction ref]`.
pub static GET_TRANSACTION_RECEIPT_PROOF_REQUEST_SCHEME: Scheme = &[Message];

/// `GetTransactionReceiptProofResponse`: `[request result, tx status,
/// receipt, packed proof]`.
pub static GET_TRANSACTION_RECEIPT_PROOF_RESPONSE_SCHEME: Scheme =
    &[Message, Uint16, Message, Bytes];

/// `GetBlockRequest`: `[protocol version, virtual chain, block height]`.
pub static GET_BLOCK_REQUEST_SCHEME: Scheme = &[Uint32, Uint32, Uint64];

/// `GetBlockResponse`.
pub static GET_BLOCK_RESPONSE_SCHEME: Scheme = &[
    Message,      // request result
    Message,      // transactions block header
    Message,      // transactions block metadata
    MessageArray, // signed transactions
    Message,      // transactions block proof
    Message,      // results block header
    MessageArray, // transaction receipts
    MessageArray, // contract state diffs
    Message,      // results block proof
];
