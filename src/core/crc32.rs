//! Bit-reflected CRC-32 as used by the NSCA wire format.
//!
//! Polynomial `0xEDB88320`, register initialized to all-ones, final value
//! inverted. This is the same checksum the reference daemon computes over a
//! packet with its crc32 field zeroed.

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Compute the CRC-32 of `data`.
///
/// Pure function, no failure modes. Two invocations on the same bytes always
/// yield the same value.
pub fn crc32(data: &[u8]) -> u32 {
    let mut sum = 0xFFFF_FFFFu32;
    for &byte in data {
        sum ^= u32::from(byte);
        for _ in 0..8 {
            sum = if sum & 1 != 0 {
                (sum >> 1) ^ POLYNOMIAL
            } else {
                sum >> 1
            };
        }
    }
    sum ^ 0xFFFF_FFFF
}
