//! # Error Types
//!
//! Error handling for the check-submission protocol.
//!
//! This module defines all error variants that can occur while building,
//! parsing, or exchanging packets, from low-level I/O errors to protocol
//! violations.
//!
//! ## Error Categories
//! - **I/O Errors**: Socket read/write/accept failures
//! - **Codec Errors**: Version mismatches, checksum failures, bad lengths
//! - **Handshake Errors**: Malformed or truncated connection preambles
//! - **Configuration Errors**: Invalid TOML or out-of-range settings
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Propagation Policy
//!
//! Codec errors travel unchanged to the connection layer. The only place an
//! error is consumed rather than surfaced is the receiving side's single
//! classic-to-extended layout fallback, which retries exactly once on
//! [`ProtocolError::ChecksumMismatch`]. There is no automatic reconnection
//! or retry anywhere in this crate.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("packet version {expected} expected, received {found}")]
    VersionMismatch { expected: i16, found: i16 },

    #[error("crc32 check failed, packet seems to be broken: {expected:#010x} != {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("{field} is {len} bytes, at most {max} fit the field")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("packet length mismatch: expected {expected} bytes, got {found}")]
    TruncatedPacket { expected: usize, found: usize },

    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// True for the one error that sanctions the extended-layout fallback.
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, ProtocolError::ChecksumMismatch { .. })
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
