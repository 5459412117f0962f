#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Codec and cipher integration tests: the wire scenarios a conformant peer
//! exercises, without any sockets involved.

use nsca_protocol::core::cipher::PacketCipher;
use nsca_protocol::core::packet::{
    CheckResult, EncodeOptions, PacketVersion, Padding, ReturnCode,
};
use nsca_protocol::error::ProtocolError;

fn iv_key() -> Vec<u8> {
    (0..128u8).collect()
}

fn warning_result() -> CheckResult {
    CheckResult::new(1700000000, ReturnCode::Warning, "host1", "svc1", "WARNING")
}

#[test]
fn encipher_decipher_parse_round_trip() {
    let original = warning_result();
    let mut wire = PacketVersion::CLASSIC.encode(&original);

    PacketCipher::new(iv_key(), b"pw".to_vec()).apply(&mut wire);
    // Same two layers, same order, fresh cursors on the receiving side.
    PacketCipher::new(iv_key(), b"pw".to_vec()).apply(&mut wire);

    let parsed = PacketVersion::CLASSIC.decode(&wire).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn wrong_secret_fails_the_checksum() {
    let mut wire = PacketVersion::CLASSIC.encode(&warning_result());

    PacketCipher::new(iv_key(), b"pw".to_vec()).apply(&mut wire);
    PacketCipher::new(iv_key(), b"pw2".to_vec()).apply(&mut wire);

    let err = PacketVersion::CLASSIC.decode(&wire).unwrap_err();
    assert!(
        err.is_checksum_mismatch(),
        "wrong shared secret must surface as a checksum failure, got {err:?}"
    );
}

#[test]
fn wrong_iv_key_fails_the_checksum() {
    let mut wire = PacketVersion::CLASSIC.encode(&warning_result());

    PacketCipher::new(iv_key(), b"pw".to_vec()).apply(&mut wire);
    PacketCipher::new(vec![0x77; 128], b"pw".to_vec()).apply(&mut wire);

    assert!(PacketVersion::CLASSIC
        .decode(&wire)
        .unwrap_err()
        .is_checksum_mismatch());
}

#[test]
fn single_bit_flips_are_detected() {
    // NUL padding so every byte outside the crc field is deterministic and
    // covered. The version field is excluded: it is checked before the
    // checksum and flips there surface as VersionMismatch instead.
    let raw = PacketVersion::CLASSIC
        .encode_with(
            &warning_result(),
            EncodeOptions {
                padding: Padding::Nul,
                strict: false,
            },
        )
        .unwrap();

    // Alignment pad, timestamp, return code, each text field, trailer pad.
    for offset in [2, 3, 8, 11, 12, 14, 78, 206, 700, 719] {
        for bit in 0..8 {
            let mut tampered = raw.clone();
            tampered[offset] ^= 1 << bit;
            let err = PacketVersion::CLASSIC.decode(&tampered).unwrap_err();
            assert!(
                err.is_checksum_mismatch(),
                "flip at byte {offset} bit {bit} gave {err:?}"
            );
        }
    }
}

#[test]
fn version_field_flip_is_a_version_mismatch() {
    let mut raw = PacketVersion::CLASSIC.encode(&warning_result());
    raw[1] ^= 0x04;
    assert!(matches!(
        PacketVersion::CLASSIC.decode(&raw).unwrap_err(),
        ProtocolError::VersionMismatch {
            expected: 3,
            found: 7
        }
    ));
}

#[test]
fn random_padding_does_not_affect_the_fields() {
    let original = warning_result();
    // Random padding differs between encodes, parsed fields must not.
    let a = PacketVersion::CLASSIC.encode(&original);
    let b = PacketVersion::CLASSIC.encode(&original);
    assert_ne!(a, b, "two encodes should differ in their random padding");

    assert_eq!(PacketVersion::CLASSIC.decode(&a).unwrap(), original);
    assert_eq!(PacketVersion::CLASSIC.decode(&b).unwrap(), original);
}

#[test]
fn oversized_service_truncates_to_usable_length() {
    let mut result = warning_result();
    result.service = "0123456789".repeat(51) + "AB"; // 512 chars
    let raw = PacketVersion::CLASSIC.encode(&result);
    let parsed = PacketVersion::CLASSIC.decode(&raw).unwrap();
    // 127 usable bytes in a 128-byte field.
    assert_eq!(parsed.service, result.service[..127]);
}

#[test]
fn oversized_status_fits_the_extended_layout() {
    let mut result = warning_result();
    result.status = "x".repeat(1000);

    let classic = PacketVersion::CLASSIC.encode(&result);
    let truncated = PacketVersion::CLASSIC.decode(&classic).unwrap();
    assert_eq!(truncated.status.len(), 511);

    let extended = PacketVersion::EXTENDED.encode(&result);
    let intact = PacketVersion::EXTENDED.decode(&extended).unwrap();
    assert_eq!(intact.status, result.status);
}

#[test]
fn empty_fields_round_trip() {
    let result = CheckResult::new(1, ReturnCode::Ok, "", "", "");
    let raw = PacketVersion::CLASSIC.encode(&result);
    assert_eq!(PacketVersion::CLASSIC.decode(&raw).unwrap(), result);
}
