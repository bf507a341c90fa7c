//! Integration tests for the tcp2ws-core frame codec.
//!
//! These tests drive the public API the way the bridge's pumps do: a chunk is
//! encoded on the TCP→WebSocket side, and the resulting payload bytes are
//! decoded on the WebSocket→TCP side.

use tcp2ws_core::{
    decode, encode, FramingMode, WirePayload, DEFAULT_READ_BUFFER_SIZE, SUPPORTED_SUBPROTOCOLS,
};

/// Encodes a chunk, flattens the payload to the bytes a WebSocket message
/// would carry, and decodes it again.
fn relay(mode: FramingMode, chunk: &[u8]) -> Vec<u8> {
    let wire_bytes = match encode(mode, chunk) {
        WirePayload::Binary(bytes) => bytes,
        WirePayload::Text(text) => text.into_bytes(),
    };
    decode(mode, wire_bytes).expect("decode must succeed")
}

#[test]
fn test_binary_relay_preserves_full_buffer_of_every_byte_value() {
    // Arrange: a full read buffer cycling through all 256 byte values.
    let chunk: Vec<u8> = (0..DEFAULT_READ_BUFFER_SIZE).map(|i| (i % 256) as u8).collect();

    // Act / Assert
    assert_eq!(relay(FramingMode::Binary, &chunk), chunk);
}

#[test]
fn test_base64_relay_preserves_bytes_outside_printable_ascii() {
    let chunk: Vec<u8> = vec![0x00, 0x01, 0x7F, 0x80, 0xC3, 0x28, 0xFE, 0xFF];
    assert_eq!(relay(FramingMode::Base64Text, &chunk), chunk);
}

#[test]
fn test_base64_relay_preserves_every_padding_length() {
    // Lengths 1, 2, 3 exercise "==", "=" and no padding respectively.
    for len in 1..=3 {
        let chunk: Vec<u8> = (0..len).map(|i| 0xF0 + i as u8).collect();
        assert_eq!(relay(FramingMode::Base64Text, &chunk), chunk, "len={len}");
    }
}

#[test]
fn test_base64_mode_produces_ascii_text_payload() {
    let payload = encode(FramingMode::Base64Text, &[0xFF; 32]);
    match payload {
        WirePayload::Text(text) => assert!(text.is_ascii()),
        other => panic!("base64 mode must produce text, got {other:?}"),
    }
}

#[test]
fn test_every_offered_subprotocol_has_a_framing_mode() {
    for token in SUPPORTED_SUBPROTOCOLS {
        assert!(
            FramingMode::from_subprotocol(token).is_some(),
            "offered token {token:?} must be implemented"
        );
    }
}
