//! # Connections
//!
//! Socket-owning endpoints for both sides of the protocol.
//!
//! ## Components
//! - **server**: Receiving side — listener, per-connection IV keys, the
//!   length-fallback packet reader, and an accept loop with graceful
//!   shutdown
//! - **client**: Submitting side — handshake reader and packet writer
//!
//! All I/O is plain awaited reads and writes with no internal timeouts;
//! callers needing deadlines wrap these calls themselves.

pub mod client;
pub mod server;
