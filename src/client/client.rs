//! Request building and submission

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tracing::{debug, instrument};

use crate::crypto::{Signer, decode_hex, encode_hex};
use crate::protocol::{
    Argument, Error, GetBlockRequest, GetBlockResponse, GetTransactionReceiptProofRequest,
    GetTransactionReceiptProofResponse, GetTransactionStatusRequest, GetTransactionStatusResponse,
    Operation, PROTOCOL_VERSION, Result, RunQueryRequest, RunQueryResponse,
    SendTransactionRequest, SendTransactionResponse, decode_get_block_response,
    decode_get_transaction_receipt_proof_response, decode_get_transaction_status_response,
    decode_run_query_response, decode_send_transaction_response, encode_get_block_request,
    encode_get_transaction_receipt_proof_request, encode_get_transaction_status_request,
    encode_run_query_request, encode_send_transaction_request,
};

use super::config::ClientConfig;
use super::transport::{CONTENT_TYPE_MEMBUFFERS, Transport, membuffers_body};

/// Largest nano nonce before the counter wraps to zero.
pub const MAX_NANO_NONCE: u32 = 499_999;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// System contract that deploys services.
const DEPLOYMENTS_CONTRACT: &str = "_Deployments";
const DEPLOY_METHOD: &str = "deployService";

/// Execution engine of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Processor {
    /// Compiled into the node
    Native = 1,
    /// Javascript sources
    JavaScript = 2,
}

/// Node client: builds signed requests, posts them through a [`Transport`]
/// and decodes the answers.
///
/// The nano nonce is shared by every request built through one client, so
/// transactions created concurrently on the same client get distinct
/// timestamps within a millisecond.
#[derive(Debug)]
pub struct Client<T, S> {
    config: ClientConfig,
    transport: T,
    signer: S,
    nano_nonce: AtomicU32,
}

impl<T: Transport, S: Signer> Client<T, S> {
    /// Create a client.
    pub fn new(config: ClientConfig, transport: T, signer: S) -> Self {
        Self {
            config,
            transport,
            signer,
            nano_nonce: AtomicU32::new(0),
        }
    }

    /// Connection settings.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Take the current nano nonce and advance the counter, wrapping after
    /// [`MAX_NANO_NONCE`].
    pub fn bump_nano_nonce(&self) -> u32 {
        let mut current = self.nano_nonce.load(Ordering::Relaxed);
        loop {
            let next = if current >= MAX_NANO_NONCE { 0 } else { current + 1 };
            match self.nano_nonce.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return current,
                Err(actual) => current = actual,
            }
        }
    }

    fn timestamp(&self) -> u64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        millis
            .saturating_mul(NANOS_PER_MILLI)
            .saturating_add(u64::from(self.bump_nano_nonce()))
    }

    /// Build a signed transaction. Returns the request bytes and the
    /// checksummed hex transaction id.
    #[instrument(level = "debug", skip(self, input_arguments))]
    pub fn create_transaction(
        &self,
        contract_name: &str,
        method_name: &str,
        input_arguments: Vec<Argument>,
    ) -> Result<(Vec<u8>, String)> {
        let req = SendTransactionRequest {
            protocol_version: PROTOCOL_VERSION,
            virtual_chain_id: self.config.virtual_chain_id,
            timestamp: self.timestamp(),
            network_type: self.config.network_type,
            contract_name: contract_name.to_owned(),
            method_name: method_name.to_owned(),
            input_arguments,
        };
        let (buf, tx_id) = encode_send_transaction_request(&req, &self.signer)?;
        let tx_id = encode_hex(&tx_id);
        debug!(%tx_id, len = buf.len(), "created transaction");
        Ok((buf, tx_id))
    }

    /// Build a transaction deploying `contract_name` from `sources`.
    pub fn create_deploy_transaction(
        &self,
        contract_name: &str,
        processor: Processor,
        sources: Vec<Vec<u8>>,
    ) -> Result<(Vec<u8>, String)> {
        let mut args = Vec::with_capacity(sources.len() + 2);
        args.push(Argument::String(contract_name.to_owned()));
        args.push(Argument::Uint32(processor as u32));
        args.extend(sources.into_iter().map(Argument::Bytes));
        self.create_transaction(DEPLOYMENTS_CONTRACT, DEPLOY_METHOD, args)
    }

    /// Build an unsigned query.
    #[instrument(level = "debug", skip(self, input_arguments))]
    pub fn create_query(
        &self,
        contract_name: &str,
        method_name: &str,
        input_arguments: Vec<Argument>,
    ) -> Result<Vec<u8>> {
        let req = RunQueryRequest {
            protocol_version: PROTOCOL_VERSION,
            virtual_chain_id: self.config.virtual_chain_id,
            timestamp: self.timestamp(),
            network_type: self.config.network_type,
            contract_name: contract_name.to_owned(),
            method_name: method_name.to_owned(),
            input_arguments,
        };
        encode_run_query_request(&req, &self.signer)
    }

    fn post(&self, op: Operation, payload: Vec<u8>) -> Result<Bytes> {
        if payload.is_empty() {
            return Err(Error::Transport(format!("refusing to send an empty {op} payload")));
        }
        let url = self.config.url(op.path());
        let response = self
            .transport
            .post(&url, CONTENT_TYPE_MEMBUFFERS, Bytes::from(payload))?;
        debug!(%op, status = response.status, len = response.body.len(), "node answered");
        membuffers_body(response)
    }

    /// Submit a transaction built by [`create_transaction`](Self::create_transaction).
    #[instrument(level = "debug", skip(self, transaction), fields(len = transaction.len()))]
    pub fn send_transaction(&self, transaction: Vec<u8>) -> Result<SendTransactionResponse> {
        let body = self.post(Operation::SendTransaction, transaction)?;
        decode_send_transaction_response(&body)
    }

    /// Run a query built by [`create_query`](Self::create_query).
    #[instrument(level = "debug", skip(self, query), fields(len = query.len()))]
    pub fn send_query(&self, query: Vec<u8>) -> Result<RunQueryResponse> {
        let body = self.post(Operation::RunQuery, query)?;
        decode_run_query_response(&body)
    }

    /// Status of a transaction given its hex id.
    #[instrument(level = "debug", skip(self))]
    pub fn get_transaction_status(&self, tx_id: &str) -> Result<GetTransactionStatusResponse> {
        let payload = encode_get_transaction_status_request(&GetTransactionStatusRequest {
            protocol_version: PROTOCOL_VERSION,
            virtual_chain_id: self.config.virtual_chain_id,
            tx_id: decode_hex(tx_id)?,
        })?;
        let body = self.post(Operation::GetTransactionStatus, payload)?;
        decode_get_transaction_status_response(&body)
    }

    /// Receipt and proof of a transaction given its hex id.
    #[instrument(level = "debug", skip(self))]
    pub fn get_transaction_receipt_proof(
        &self,
        tx_id: &str,
    ) -> Result<GetTransactionReceiptProofResponse> {
        let payload =
            encode_get_transaction_receipt_proof_request(&GetTransactionReceiptProofRequest {
                protocol_version: PROTOCOL_VERSION,
                virtual_chain_id: self.config.virtual_chain_id,
                tx_id: decode_hex(tx_id)?,
            })?;
        let body = self.post(Operation::GetTransactionReceiptProof, payload)?;
        decode_get_transaction_receipt_proof_response(&body)
    }

    /// Block at `block_height`.
    #[instrument(level = "debug", skip(self))]
    pub fn get_block(&self, block_height: u64) -> Result<GetBlockResponse> {
        let payload = encode_get_block_request(&GetBlockRequest {
            protocol_version: PROTOCOL_VERSION,
            virtual_chain_id: self.config.virtual_chain_id,
            block_height,
        })?;
        let body = self.post(Operation::GetBlock, payload)?;
        decode_get_block_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::client::transport::HttpResponse;
    use crate::crypto::{Ed25519KeyPair, LocalSigner};

    struct Offline;

    impl Transport for Offline {
        fn post(&self, _: &str, _: &str, _: Bytes) -> Result<HttpResponse> {
            Err(Error::Transport("offline".into()))
        }
    }

    fn client() -> Client<Offline, LocalSigner> {
        Client::new(
            ClientConfig::default(),
            Offline,
            LocalSigner::new(Ed25519KeyPair::from_seed(&[1; 32])),
        )
    }

    #[test]
    fn test_nonce_wraps() {
        let client = client();
        client.nano_nonce.store(MAX_NANO_NONCE - 1, Ordering::Relaxed);
        assert_eq!(client.bump_nano_nonce(), MAX_NANO_NONCE - 1);
        assert_eq!(client.bump_nano_nonce(), MAX_NANO_NONCE);
        assert_eq!(client.bump_nano_nonce(), 0);
        assert_eq!(client.bump_nano_nonce(), 1);
    }

    #[test]
    fn test_transactions_get_distinct_ids() {
        let client = client();
        let (_, first) = client.create_transaction("Counter", "inc", vec![]).unwrap();
        let (_, second) = client.create_transaction("Counter", "inc", vec![]).unwrap();
        assert_ne!(first, second);
        assert_eq!(decode_hex(&first).unwrap().len(), 40);
    }

    #[test]
    fn test_concurrent_transactions_get_distinct_ids() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;

        let client = client();
        let client = &client;
        let ids: Vec<String> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(move || {
                        (0..PER_THREAD)
                            .map(|_| client.create_transaction("Counter", "inc", vec![]).unwrap().1)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), THREADS * PER_THREAD);
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_transport_errors_surface() {
        let err = client().get_block(1).unwrap_err();
        assert!(matches!(err, Error::Transport(msg) if msg == "offline"));
    }
}
