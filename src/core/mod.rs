//! # Core Protocol Components
//!
//! The wire-format layer: checksum, keystream cipher, packet codec, and the
//! version registry.
//!
//! ## Components
//! - **crc32**: Bit-reflected CRC-32 integrity checksum
//! - **cipher**: Two-layer repeating-key XOR obfuscation
//! - **packet**: Fixed-layout packet build/parse with truncation and padding
//! - **registry**: Known layouts, keyed by version and ordered by length
//!
//! Everything here is synchronous and allocation-light; sockets live in
//! [`crate::service`].

pub mod cipher;
pub mod crc32;
pub mod packet;
pub mod registry;
