use voice_detector::application::services::{AudioPayloadError, decode_base64_audio};

use crate::helpers;

#[test]
fn given_valid_base64_when_decoding_then_returns_original_bytes() {
    let bytes = b"ID3\x04\x00mp3-ish".to_vec();

    let decoded = decode_base64_audio(&helpers::encode(&bytes)).unwrap();

    assert_eq!(decoded, bytes);
}

#[test]
fn given_base64_wrapped_at_76_columns_when_decoding_then_line_breaks_are_ignored() {
    let bytes: Vec<u8> = (0..=255).collect();
    let encoded = helpers::encode(&bytes);
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");

    assert_eq!(decode_base64_audio(&wrapped).unwrap(), bytes);
}

#[test]
fn given_non_base64_text_when_decoding_then_returns_invalid_base64() {
    let result = decode_base64_audio("this is *not* base64!");

    assert!(matches!(result, Err(AudioPayloadError::InvalidBase64(_))));
}

#[test]
fn given_blank_payload_when_decoding_then_returns_empty_error() {
    let result = decode_base64_audio("   ");

    assert!(matches!(result, Err(AudioPayloadError::Empty)));
}
