//! Orbs protocol layer
//!
//! Message layouts, status enums, typed arguments and events, and the
//! request encoders / response decoders of the public API. Everything here
//! is a pure function over caller-owned buffers.

pub mod arguments;
mod codec;
mod error;
pub mod events;
pub mod messages;
mod metrics;
mod ops;
pub mod schemes;
mod types;

pub use arguments::{Argument, packed_arguments_decode, packed_arguments_encode};
pub use error::{Error, Result};
pub use events::{Event, packed_events_decode, packed_events_encode};
pub use metrics::{MetricsSnapshot, metrics};
pub use ops::*;
pub use types::{ExecutionResult, NetworkType, RequestStatus, TransactionStatus};

/// Protocol version written into, and required of, every envelope.
pub const PROTOCOL_VERSION: u32 = 1;
