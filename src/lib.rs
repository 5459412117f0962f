//! # nsca-protocol
//!
//! Passive check-submission protocol core, compatible with the NSCA wire
//! format: a submitting side pushes fixed-length, checksummed, XOR-obfuscated
//! result packets to a central collector over TCP.
//!
//! ## Protocol in one paragraph
//!
//! On accept, the collector sends a 132-byte cleartext preamble: a 128-byte
//! random IV key plus its current unix time. Each packet is then a
//! fixed-layout record (`version | pad | crc32 | timestamp | return_code |
//! hostname | service | status | pad`, big-endian integers) protected by a
//! CRC-32 over the record with the crc field zeroed, and XORed against two
//! repeating keystreams: the IV key and the shared secret, each with its
//! cursor reset per packet. Two layouts share wire version 3 and are told
//! apart only by total length (720 vs 4304 bytes); the collector reads the
//! short length first and falls back to the long one on checksum failure.
//!
//! ## Module Overview
//! - [`core`]: checksum, keystream cipher, packet codec, version registry
//! - [`protocol`]: handshake preamble
//! - [`service`]: client and server connections over tokio streams
//! - [`config`]: TOML/env configuration including the shared secret
//! - [`error`]: the [`ProtocolError`](error::ProtocolError) taxonomy
//! - [`utils`]: logging setup
//!
//! ## Example
//! ```no_run
//! use nsca_protocol::core::packet::{CheckResult, ReturnCode};
//! use nsca_protocol::service::client::Client;
//!
//! #[tokio::main]
//! async fn main() -> nsca_protocol::error::Result<()> {
//!     let client = Client::new("monitoring.example.net:5667", "secret".as_bytes());
//!     client
//!         .send([CheckResult::new(
//!             0, // 0 = use the collector's handshake timestamp
//!             ReturnCode::Warning,
//!             "web01",
//!             "disk /var",
//!             "WARNING - 91% used",
//!         )])
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use crate::core::packet::{CheckResult, PacketVersion, ReturnCode};
pub use crate::error::{ProtocolError, Result};
