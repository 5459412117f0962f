//! Two-layer XOR keystream obfuscation.
//!
//! Every packet on the wire is XORed against two repeating keys: the
//! 128-byte IV key the receiving side hands out at connection start, and the
//! static shared secret. XOR is self-inverse, so the same transform applied
//! in the same order recovers the plaintext on the other side.
//!
//! The keystream cursor starts at 0 for every packet. A single persistent
//! cipher per connection would keep advancing its cursor across packets and
//! silently desynchronize from a conformant peer, so [`PacketCipher::apply`]
//! builds fresh [`Keystream`] instances on every call.

/// A repeating-key XOR stream with an explicit cursor.
///
/// An empty key yields the identity transform.
pub struct Keystream {
    key: Vec<u8>,
    cursor: usize,
}

impl Keystream {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cursor: 0,
        }
    }

    /// XOR `data` in place, advancing the cursor once per byte.
    ///
    /// The cursor carries over between calls on the same instance, so one
    /// instance corresponds to one continuous stream.
    pub fn apply(&mut self, data: &mut [u8]) {
        if self.key.is_empty() {
            return;
        }
        for byte in data.iter_mut() {
            *byte ^= self.key[self.cursor];
            self.cursor = (self.cursor + 1) % self.key.len();
        }
    }
}

/// The per-connection cipher: IV-key layer plus shared-secret layer.
///
/// Both sides must apply the layers in the same order; since each layer is an
/// independent XOR they commute, but the order here matches the reference
/// client (IV key first, then secret).
pub struct PacketCipher {
    iv_key: Vec<u8>,
    secret: Vec<u8>,
}

impl PacketCipher {
    pub fn new(iv_key: impl Into<Vec<u8>>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            iv_key: iv_key.into(),
            secret: secret.into(),
        }
    }

    /// Encrypt or decrypt one packet's bytes in place.
    ///
    /// Each layer starts at cursor 0, equivalent to constructing fresh
    /// [`Keystream`]s. Call exactly once per packet; never spread one call's
    /// stream across packet boundaries.
    pub fn apply(&self, data: &mut [u8]) {
        xor_cycled(&self.iv_key, data);
        xor_cycled(&self.secret, data);
    }
}

/// One fresh pass of a repeating key over `data`, cursor starting at 0.
fn xor_cycled(key: &[u8], data: &mut [u8]) {
    if key.is_empty() {
        return;
    }
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % key.len()];
    }
}
