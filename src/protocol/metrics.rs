use std::sync::atomic::{AtomicU64, Ordering};

use super::ops::Operation;

/// Process-wide codec counters, updated without locks.
pub(crate) struct Metrics;

static ENCODED_REQUESTS: AtomicU64 = AtomicU64::new(0);
static DECODED_RESPONSES: AtomicU64 = AtomicU64::new(0);
static DECODE_FAILURES: AtomicU64 = AtomicU64::new(0);
static ENCODED_BYTES: AtomicU64 = AtomicU64::new(0);
static DECODED_BYTES: AtomicU64 = AtomicU64::new(0);
static LARGEST_RESPONSE_BYTES: AtomicU64 = AtomicU64::new(0);

struct OperationCounters {
    send_transaction: AtomicU64,
    run_query: AtomicU64,
    get_transaction_status: AtomicU64,
    get_transaction_receipt_proof: AtomicU64,
    get_block: AtomicU64,
}

static REQUEST_COUNTERS: OperationCounters = OperationCounters::new();

impl OperationCounters {
    const fn new() -> Self {
        Self {
            send_transaction: AtomicU64::new(0),
            run_query: AtomicU64::new(0),
            get_transaction_status: AtomicU64::new(0),
            get_transaction_receipt_proof: AtomicU64::new(0),
            get_block: AtomicU64::new(0),
        }
    }

    const fn counter(&self, op: Operation) -> &AtomicU64 {
        match op {
            Operation::SendTransaction => &self.send_transaction,
            Operation::RunQuery => &self.run_query,
            Operation::GetTransactionStatus => &self.get_transaction_status,
            Operation::GetTransactionReceiptProof => &self.get_transaction_receipt_proof,
            Operation::GetBlock => &self.get_block,
        }
    }

    fn increment(&self, op: Operation) {
        self.counter(op).fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self, op: Operation) -> u64 {
        self.counter(op).load(Ordering::Relaxed)
    }
}

fn as_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

impl Metrics {
    #[inline]
    pub(crate) fn record_encoded(op: Operation, len: usize) {
        ENCODED_REQUESTS.fetch_add(1, Ordering::Relaxed);
        ENCODED_BYTES.fetch_add(as_u64(len), Ordering::Relaxed);
        REQUEST_COUNTERS.increment(op);
    }

    #[inline]
    pub(crate) fn record_decoded(len: usize) {
        DECODED_RESPONSES.fetch_add(1, Ordering::Relaxed);
        DECODED_BYTES.fetch_add(as_u64(len), Ordering::Relaxed);
        update_max(&LARGEST_RESPONSE_BYTES, as_u64(len));
    }

    #[inline]
    pub(crate) fn record_decode_failure() {
        DECODE_FAILURES.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            encoded_requests: ENCODED_REQUESTS.load(Ordering::Relaxed),
            decoded_responses: DECODED_RESPONSES.load(Ordering::Relaxed),
            decode_failures: DECODE_FAILURES.load(Ordering::Relaxed),
            encoded_bytes: ENCODED_BYTES.load(Ordering::Relaxed),
            decoded_bytes: DECODED_BYTES.load(Ordering::Relaxed),
            largest_response_bytes: LARGEST_RESPONSE_BYTES.load(Ordering::Relaxed),
            requests_by_operation: Operation::ALL.map(|op| REQUEST_COUNTERS.load(op)),
        }
    }
}

fn update_max(target: &AtomicU64, candidate: u64) {
    let mut current = target.load(Ordering::Relaxed);
    while candidate > current {
        match target.compare_exchange_weak(current, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return,
            Err(old) => current = old,
        }
    }
}

/// Point-in-time copy of the codec counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests encoded
    pub encoded_requests: u64,
    /// Responses decoded successfully
    pub decoded_responses: u64,
    /// Responses rejected as corrupt or undecodable
    pub decode_failures: u64,
    /// Total request bytes produced
    pub encoded_bytes: u64,
    /// Total response bytes accepted
    pub decoded_bytes: u64,
    /// Largest response accepted
    pub largest_response_bytes: u64,
    /// Requests encoded, indexed like [`Operation::ALL`]
    pub requests_by_operation: [u64; Operation::COUNT],
}

impl MetricsSnapshot {
    /// Requests encoded for one operation.
    #[must_use]
    pub fn requests(&self, op: Operation) -> u64 {
        Operation::ALL
            .iter()
            .position(|candidate| *candidate == op)
            .map_or(0, |index| self.requests_by_operation[index])
    }

    /// Average accepted response size in bytes.
    #[must_use]
    pub fn avg_response_bytes(&self) -> Option<u64> {
        if self.decoded_responses == 0 {
            return None;
        }
        Some(self.decoded_bytes / self.decoded_responses)
    }
}

/// Current process-wide codec counters.
#[must_use]
pub fn metrics() -> MetricsSnapshot {
    Metrics::totals()
}
