//! Node client
//!
//! [`Client`] ties the protocol encoders to a [`Transport`]. It owns the
//! nano nonce that keeps timestamps, and therefore transaction ids, unique
//! within a millisecond.

mod account;
#[allow(clippy::module_inception)]
mod client;
mod config;
mod transport;

pub use account::{Account, address_to_bytes, bytes_to_address, create_account};
pub use client::{Client, MAX_NANO_NONCE, Processor};
pub use config::ClientConfig;
pub use transport::{CONTENT_TYPE_MEMBUFFERS, HttpResponse, Transport};
