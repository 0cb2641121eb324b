//! Status codes and network types carried on the wire

use std::fmt;

use super::{Error, Result};

macro_rules! wire_status {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Convert from the wire value
            #[must_use]
            pub const fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Convert to the wire value
            #[must_use]
            pub const fn as_u16(self) -> u16 {
                self as u16
            }

            /// Decode a wire value; zero is reserved and unknown values are rejected.
            pub fn decode(value: u16) -> Result<Self> {
                match Self::from_u16(value) {
                    Some(status) => Ok(status),
                    None if value == 0 => Err(Error::ReservedStatus { kind: $kind }),
                    None => Err(Error::UnsupportedStatus { kind: $kind, value }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $(Self::$variant => $label,)+
                };
                write!(f, "{name}")
            }
        }
    };
}

wire_status! {
    /// Outcome of the request itself, independent of contract execution
    RequestStatus, "RequestStatus" {
        /// Request fully served
        Completed = 1 => "COMPLETED",
        /// Accepted, result not final yet
        InProcess = 2 => "IN_PROCESS",
        /// Request rejected as malformed
        BadRequest = 3 => "BAD_REQUEST",
        /// Node is overloaded
        Congestion = 4 => "CONGESTION",
        /// Node failed internally
        SystemError = 5 => "SYSTEM_ERROR",
        /// Node is behind the network
        OutOfSync = 6 => "OUT_OF_SYNC",
        /// Requested item does not exist
        NotFound = 7 => "NOT_FOUND",
    }
}

wire_status! {
    /// Outcome of running the contract method
    ExecutionResult, "ExecutionResult" {
        /// Method returned normally
        Success = 1 => "SUCCESS",
        /// Contract raised an error
        ErrorSmartContract = 2 => "ERROR_SMART_CONTRACT",
        /// Arguments did not match the method
        ErrorInput = 3 => "ERROR_INPUT",
        /// No contract under that name
        ErrorContractNotDeployed = 4 => "ERROR_CONTRACT_NOT_DEPLOYED",
        /// Execution failed for another reason
        ErrorUnexpected = 5 => "ERROR_UNEXPECTED",
        /// Method was not run
        NotExecuted = 6 => "NOT_EXECUTED",
    }
}

wire_status! {
    /// Lifecycle state of a submitted transaction
    TransactionStatus, "TransactionStatus" {
        /// Included in a block
        Committed = 1 => "COMMITTED",
        /// Same transaction already committed
        DuplicateTransactionAlreadyCommitted = 2 => "DUPLICATE_TRANSACTION_ALREADY_COMMITTED",
        /// Waiting in the pool
        Pending = 3 => "PENDING",
        /// Same transaction already pending
        DuplicateTransactionAlreadyPending = 4 => "DUPLICATE_TRANSACTION_ALREADY_PENDING",
        /// Unknown to the node
        NoRecordFound = 6 => "NO_RECORD_FOUND",
        /// Protocol version not supported
        RejectedUnsupportedVersion = 7 => "REJECTED_UNSUPPORTED_VERSION",
        /// Sent to the wrong virtual chain
        RejectedVirtualChainMismatch = 8 => "REJECTED_VIRTUAL_CHAIN_MISMATCH",
        /// Timestamp too far in the past
        RejectedTimestampWindowExceeded = 9 => "REJECTED_TIMESTAMP_WINDOW_EXCEEDED",
        /// Signature does not verify
        RejectedSignatureMismatch = 10 => "REJECTED_SIGNATURE_MISMATCH",
        /// Signer scheme not supported
        RejectedUnknownSignerScheme = 11 => "REJECTED_UNKNOWN_SIGNER_SCHEME",
        /// Global pre-order check failed
        RejectedGlobalPreOrder = 12 => "REJECTED_GLOBAL_PRE_ORDER",
        /// Virtual chain pre-order check failed
        RejectedVirtualChainPreOrder = 13 => "REJECTED_VIRTUAL_CHAIN_PRE_ORDER",
        /// Contract pre-order check failed
        RejectedSmartContractPreOrder = 14 => "REJECTED_SMART_CONTRACT_PRE_ORDER",
        /// Timestamp ahead of node time
        RejectedTimestampAheadOfNodeTime = 15 => "REJECTED_TIMESTAMP_AHEAD_OF_NODE_TIME",
        /// Node is overloaded
        RejectedCongestion = 16 => "REJECTED_CONGESTION",
    }
}

wire_status! {
    /// Network a signer key belongs to
    NetworkType, "NetworkType" {
        /// Production network ('M')
        MainNet = 77 => "MAIN_NET",
        /// Test network ('T')
        TestNet = 84 => "TEST_NET",
    }
}
