//! Send-transaction
//!
//! The request is built with a zeroed signature, which is then overwritten in
//! place once the transaction content has been hashed and signed.

use tracing::{debug, instrument};

use crate::crypto::{
    ED25519_SIGNATURE_SIZE_BYTES, Signer, TX_ID_SIZE_BYTES, calc_tx_hash, generate_tx_id,
};
use crate::membuffers::{InternalMessage, NO_UNIONS, build};

use super::super::arguments::{Argument, packed_arguments_encode};
use super::super::codec::{
    Envelope, check_protocol_version, decode_receipt, decode_request_result, decode_response,
    finish_request,
};
use super::super::events::Event;
use super::super::messages as wire;
use super::super::schemes::{
    SEND_TRANSACTION_REQUEST_SCHEME, SEND_TRANSACTION_RESPONSE_SCHEME, SIGNED_TRANSACTION_SCHEME,
};
use super::super::types::{ExecutionResult, NetworkType, RequestStatus, TransactionStatus};
use super::super::Result;
use super::Operation;

/// Transaction to sign and submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTransactionRequest {
    /// Must be [`PROTOCOL_VERSION`](super::super::PROTOCOL_VERSION)
    pub protocol_version: u32,
    /// Target virtual chain
    pub virtual_chain_id: u32,
    /// Nanoseconds since the Unix epoch, nonce included
    pub timestamp: u64,
    /// Network of the signing key
    pub network_type: NetworkType,
    /// Contract to call
    pub contract_name: String,
    /// Method to call
    pub method_name: String,
    /// Method arguments
    pub input_arguments: Vec<Argument>,
}

/// Decoded answer to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SendTransactionResponse {
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

/// Build and sign a send-transaction request.
///
/// The envelope is written with a zeroed signature, hashed, signed, and the
/// signature patched into the buffer. Returns the request bytes and the
/// transaction id.
#[instrument(
    level = "debug",
    skip(req, signer),
    fields(contract = %req.contract_name, method = %req.method_name)
)]
pub fn encode_send_transaction_request<S: Signer + ?Sized>(
    req: &SendTransactionRequest,
    signer: &S,
) -> Result<(Vec<u8>, [u8; TX_ID_SIZE_BYTES])> {
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
    let placeholder = [0u8; ED25519_SIGNATURE_SIZE_BYTES];
    let mut buf = build(&wire::SendTransactionRequest {
        signed_transaction: wire::SignedTransaction {
            transaction: envelope.transaction()?,
            signature: &placeholder,
        },
    })?;

    let mut request =
        InternalMessage::new(buf.as_mut_slice(), SEND_TRANSACTION_REQUEST_SCHEME, NO_UNIONS);
    let mut signed =
        InternalMessage::new(request.get_message_mut(0)?, SIGNED_TRANSACTION_SCHEME, NO_UNIONS);
    let tx_hash = calc_tx_hash(signed.raw_buffer_for_field(0)?);
    let signature = signer.sign_ed25519(&tx_hash)?;
    signed.set_bytes(1, &signature)?;

    let tx_id = generate_tx_id(&tx_hash, req.timestamp);
    debug!(timestamp = req.timestamp, "signed transaction");
    Ok((finish_request(Operation::SendTransaction, buf), tx_id))
}

/// Decode a send-transaction response body.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn decode_send_transaction_response(buf: &[u8]) -> Result<SendTransactionResponse> {
    decode_response(
        Operation::SendTransaction,
        buf,
        SEND_TRANSACTION_RESPONSE_SCHEME,
        |msg| {
            let result = decode_request_result(msg, 0)?;
            let transaction_status = TransactionStatus::decode(msg.get_u16(1)?)?;
            let receipt = decode_receipt(msg.get_message(2)?)?;
            Ok(SendTransactionResponse {
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
