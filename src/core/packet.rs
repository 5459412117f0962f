//! # Packet Codec
//!
//! Fixed-layout binary codec for passive check-submission packets.
//!
//! ## Wire Format
//! ```text
//! [version: i16] [pad: 2] [crc32: u32] [timestamp: u32] [return_code: i16]
//! [hostname: N] [service: N] [status: N] [pad: 2]
//! ```
//! All integers are big-endian. Text fields are NUL-terminated and occupy a
//! fixed width; whatever follows the terminator inside the field is padding
//! and is discarded on parse. The crc32 field covers the whole packet with
//! itself zeroed.
//!
//! Two layouts exist, both carrying wire version 3: the classic layout with a
//! 512-byte status field (720 bytes total) and the extended layout with a
//! 4096-byte status field (4304 bytes total). They are told apart by length
//! alone; see [`crate::core::registry`].

use crate::core::crc32::crc32;
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, BytesMut};
use rand::RngCore;

/// Wire version shared by both known layouts.
pub const PACKET_VERSION: i16 = 3;

/// version + pad + crc32 + timestamp + return_code
const HEADER_LEN: usize = 2 + 2 + 4 + 4 + 2;
/// Trailing alignment padding.
const TRAILER_LEN: usize = 2;
/// Byte offset of the crc32 field inside a packet.
const CRC_OFFSET: usize = 4;

/// Check result as submitted by a plugin or scheduler.
///
/// `status` is an opaque line of text; any performance-data formatting inside
/// it belongs to the producer, not to this crate. An empty `hostname` means
/// "use the local host name" and is passed through unchanged — the consumer
/// decides what local means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Unix timestamp (seconds) of the check execution.
    pub timestamp: u32,
    pub return_code: ReturnCode,
    pub hostname: String,
    pub service: String,
    pub status: String,
}

impl CheckResult {
    pub fn new(
        timestamp: u32,
        return_code: ReturnCode,
        hostname: impl Into<String>,
        service: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            return_code,
            hostname: hostname.into(),
            service: service.into(),
            status: status.into(),
        }
    }
}

/// Nagios-style check outcome.
///
/// Any wire value outside 0..=3 is treated as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum ReturnCode {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl ReturnCode {
    pub fn from_wire(value: i16) -> Self {
        match value {
            0 => ReturnCode::Ok,
            1 => ReturnCode::Warning,
            2 => ReturnCode::Critical,
            _ => ReturnCode::Unknown,
        }
    }

    pub fn to_wire(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Ok => "OK",
            ReturnCode::Warning => "WARNING",
            ReturnCode::Critical => "CRITICAL",
            ReturnCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the space after a field's NUL terminator is filled on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Cryptographically random bytes, the reference behavior. With the
    /// keystream cursor restarting at 0 every packet, identical leading
    /// plaintext would otherwise yield identical ciphertext prefixes under
    /// one IV key; random trailing padding is the scheme's existing
    /// mitigation for repeated short fields.
    #[default]
    Random,
    /// Plain NUL fill.
    Nul,
}

/// Encoding policy knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    pub padding: Padding,
    /// Fail with [`ProtocolError::FieldTooLong`] instead of truncating.
    pub strict: bool,
}

/// Immutable descriptor of one packet layout.
///
/// Field lengths include the NUL terminator, so the usable text capacity of
/// each field is `len - 1` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketVersion {
    pub version: i16,
    pub hostname_len: usize,
    pub service_len: usize,
    pub status_len: usize,
}

impl PacketVersion {
    /// The layout every NSCA daemon since 2.7 understands: 512-byte status.
    pub const CLASSIC: PacketVersion = PacketVersion {
        version: PACKET_VERSION,
        hostname_len: 64,
        service_len: 128,
        status_len: 512,
    };

    /// The 2.9-era layout with a 4096-byte status field. Same wire version
    /// number, longer packet.
    pub const EXTENDED: PacketVersion = PacketVersion {
        version: PACKET_VERSION,
        hostname_len: 64,
        service_len: 128,
        status_len: 4096,
    };

    /// Total byte count of a packet in this layout.
    pub const fn packet_len(&self) -> usize {
        HEADER_LEN + self.hostname_len + self.service_len + self.status_len + TRAILER_LEN
    }

    /// Serialize `result` into canonical packet bytes with the reference
    /// policy: truncate oversized fields, random trailing padding.
    pub fn encode(&self, result: &CheckResult) -> Vec<u8> {
        self.encode_fields(result, Padding::Random)
    }

    /// Serialize `result` with explicit padding and truncation policy.
    pub fn encode_with(&self, result: &CheckResult, opts: EncodeOptions) -> Result<Vec<u8>> {
        if opts.strict {
            check_len("hostname", &result.hostname, self.hostname_len)?;
            check_len("service", &result.service, self.service_len)?;
            check_len("status", &result.status, self.status_len)?;
        }
        Ok(self.encode_fields(result, opts.padding))
    }

    fn encode_fields(&self, result: &CheckResult, padding: Padding) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.packet_len());
        buf.put_i16(self.version);
        buf.put_bytes(0, 2);
        buf.put_u32(0); // crc32, patched below
        buf.put_u32(result.timestamp);
        buf.put_i16(result.return_code.to_wire());
        put_text_field(&mut buf, &result.hostname, self.hostname_len, padding);
        put_text_field(&mut buf, &result.service, self.service_len, padding);
        put_text_field(&mut buf, &result.status, self.status_len, padding);
        buf.put_bytes(0, TRAILER_LEN);

        let sum = crc32(&buf);
        buf[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&sum.to_be_bytes());
        buf.to_vec()
    }

    /// Parse canonical packet bytes, verifying version and checksum.
    pub fn decode(&self, raw: &[u8]) -> Result<CheckResult> {
        self.decode_inner(raw, true)
    }

    /// Parse without version or checksum verification. Useful for inspecting
    /// damaged or foreign packets; never use it on untrusted input paths.
    pub fn decode_unverified(&self, raw: &[u8]) -> Result<CheckResult> {
        self.decode_inner(raw, false)
    }

    fn decode_inner(&self, raw: &[u8], verify: bool) -> Result<CheckResult> {
        if raw.len() != self.packet_len() {
            return Err(ProtocolError::TruncatedPacket {
                expected: self.packet_len(),
                found: raw.len(),
            });
        }

        let mut cursor = raw;
        let version = cursor.get_i16();
        cursor.advance(2);
        let transmitted_crc = cursor.get_u32();
        let timestamp = cursor.get_u32();
        let return_code = ReturnCode::from_wire(cursor.get_i16());
        let hostname = take_text_field(&mut cursor, self.hostname_len);
        let service = take_text_field(&mut cursor, self.service_len);
        let status = take_text_field(&mut cursor, self.status_len);

        if verify {
            if version != self.version {
                return Err(ProtocolError::VersionMismatch {
                    expected: self.version,
                    found: version,
                });
            }
            let mut copy = raw.to_vec();
            copy[CRC_OFFSET..CRC_OFFSET + 4].fill(0);
            let computed = crc32(&copy);
            if computed != transmitted_crc {
                return Err(ProtocolError::ChecksumMismatch {
                    expected: transmitted_crc,
                    computed,
                });
            }
        }

        Ok(CheckResult {
            timestamp,
            return_code,
            hostname,
            service,
            status,
        })
    }
}

fn check_len(field: &'static str, value: &str, field_len: usize) -> Result<()> {
    let max = field_len - 1;
    if value.len() > max {
        return Err(ProtocolError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Write a NUL-terminated text field of exactly `field_len` bytes,
/// truncating to `field_len - 1` text bytes if necessary.
fn put_text_field(buf: &mut BytesMut, value: &str, field_len: usize, padding: Padding) {
    let text = value.as_bytes();
    let text = &text[..text.len().min(field_len - 1)];
    buf.put_slice(text);
    buf.put_u8(0);

    let fill = field_len - text.len() - 1;
    match padding {
        Padding::Nul => buf.put_bytes(0, fill),
        Padding::Random => {
            let mut pad = vec![0u8; fill];
            rand::rng().fill_bytes(&mut pad);
            buf.put_slice(&pad);
        }
    }
}

/// Read a fixed-width text field, keeping everything up to the first NUL and
/// discarding the terminator plus any trailing padding.
fn take_text_field(cursor: &mut &[u8], field_len: usize) -> String {
    let (field, rest) = (*cursor).split_at(field_len);
    let end = field.iter().position(|&b| b == 0).unwrap_or(field_len);
    let text = String::from_utf8_lossy(&field[..end]).into_owned();
    *cursor = rest;
    text
}
