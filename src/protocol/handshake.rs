//! Connection handshake preamble.
//!
//! Immediately after accepting a connection the receiving side sends 132
//! bytes in the clear: a fresh 128-byte random IV key followed by its current
//! unix time as a big-endian u32. The submitting side reads this exactly once
//! before any packet exchange; the IV key seeds the first cipher layer and
//! the timestamp is the suggested default for check results that carry none.
//!
//! The IV key lives only as long as the connection and is never persisted.

use crate::error::{ProtocolError, Result};
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the per-connection IV key.
pub const IV_KEY_LEN: usize = 128;

/// Total preamble length on the wire.
pub const PREAMBLE_LEN: usize = IV_KEY_LEN + 4;

/// The unencrypted greeting the receiving side writes on accept.
#[derive(Clone, Debug)]
pub struct ServerPreamble {
    pub iv_key: [u8; IV_KEY_LEN],
    pub timestamp: u32,
}

impl ServerPreamble {
    /// Fresh preamble: cryptographically random IV key, current unix time.
    pub fn generate() -> Result<Self> {
        let mut iv_key = [0u8; IV_KEY_LEN];
        rand::rng().fill_bytes(&mut iv_key);
        Ok(Self {
            iv_key,
            timestamp: unix_now()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; PREAMBLE_LEN] {
        let mut buf = [0u8; PREAMBLE_LEN];
        buf[..IV_KEY_LEN].copy_from_slice(&self.iv_key);
        buf[IV_KEY_LEN..].copy_from_slice(&self.timestamp.to_be_bytes());
        buf
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() != PREAMBLE_LEN {
            return Err(ProtocolError::HandshakeFailed(format!(
                "preamble must be {PREAMBLE_LEN} bytes, got {}",
                raw.len()
            )));
        }
        let mut iv_key = [0u8; IV_KEY_LEN];
        iv_key.copy_from_slice(&raw[..IV_KEY_LEN]);
        let mut ts = [0u8; 4];
        ts.copy_from_slice(&raw[IV_KEY_LEN..]);
        Ok(Self {
            iv_key,
            timestamp: u32::from_be_bytes(ts),
        })
    }
}

/// Current unix time in seconds.
///
/// # Errors
/// Fails only if the system clock reads earlier than the epoch.
pub fn unix_now() -> Result<u32> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as u32)
        .map_err(|_| ProtocolError::HandshakeFailed("system time before unix epoch".into()))
}
