//! # Protocol Flow
//!
//! Connection-level protocol pieces that sit between the raw codec in
//! [`crate::core`] and the socket-owning connections in [`crate::service`].
//!
//! Currently this is the handshake preamble; the packet exchange itself has
//! no further framing, every packet is an independent fixed-length unit.

pub mod handshake;
