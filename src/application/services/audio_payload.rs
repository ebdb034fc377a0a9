use base64::{Engine as _, engine::general_purpose};

#[derive(Debug, thiserror::Error)]
pub enum AudioPayloadError {
    #[error("invalid base64 audio: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("audio payload is empty")]
    Empty,
}

/// Decodes the `audioBase64` field into raw container bytes.
///
/// Line breaks and other ASCII whitespace are ignored, as is a leading
/// `data:<mime>;base64,` prefix.
pub fn decode_base64_audio(encoded: &str) -> Result<Vec<u8>, AudioPayloadError> {
    let encoded = strip_data_uri_prefix(encoded.trim());
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = general_purpose::STANDARD.decode(compact.as_bytes())?;
    if bytes.is_empty() {
        return Err(AudioPayloadError::Empty);
    }

    Ok(bytes)
}

fn strip_data_uri_prefix(encoded: &str) -> &str {
    if !encoded.starts_with("data:") {
        return encoded;
    }
    encoded
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .unwrap_or(encoded)
}
