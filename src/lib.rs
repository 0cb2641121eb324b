//! Orbs client - build, sign and decode requests for an Orbs node
//!
//! This library implements the client side of the Orbs public API: the
//! membuffers wire format, transaction and query envelopes, SHA-256 digests
//! and Ed25519 signatures, and decoders for every node response.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use orbs_client::{Argument, Client, ClientConfig, HttpResponse, Transport, create_account};
//!
//! struct Http;
//!
//! impl Transport for Http {
//!     fn post(
//!         &self,
//!         url: &str,
//!         content_type: &str,
//!         body: bytes::Bytes,
//!     ) -> orbs_client::Result<HttpResponse> {
//!         // hand the body to an HTTP client of your choice
//! #       unimplemented!()
//!     }
//! }
//!
//! let account = create_account()?;
//! let client = Client::new(ClientConfig::default(), Http, account.signer());
//!
//! let (tx, tx_id) = client.create_transaction(
//!     "BenchmarkToken",
//!     "transfer",
//!     vec![Argument::Uint64(10), Argument::Bytes20([0xAB; 20])],
//! )?;
//! let response = client.send_transaction(tx)?;
//! println!("{tx_id}: {}", response.transaction_status);
//! # Ok::<(), orbs_client::Error>(())
//! ```
//!
//! # Layout
//!
//! - [`membuffers`] - schema-driven binary codec
//! - [`crypto`] - hashing, addresses, checksummed hex, Ed25519
//! - [`protocol`] - message layouts, arguments, events, per-call codecs
//! - [`client`] - nonce handling, HTTP seam, accounts
//!
//! No tracing subscriber is installed; spans and events are emitted through
//! the `tracing` facade.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod crypto;
pub mod membuffers;
pub mod protocol;

pub use client::{
    Account, Client, ClientConfig, HttpResponse, Processor, Transport, address_to_bytes,
    bytes_to_address, create_account,
};
pub use crypto::{CryptoError, LocalSigner, Signer};
pub use membuffers::CodecError;
pub use protocol::{
    Argument, Error, Event, ExecutionResult, NetworkType, PROTOCOL_VERSION, RequestStatus,
    Result, TransactionStatus,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
