//! Attachment decoding: base64url text carrying a UTF-16LE HTML document

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

use crate::error::{Error, Result};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decode a base64url attachment body into the document text
pub fn decode_attachment(encoded: &str) -> Result<String> {
    // MIME bodies arrive line-wrapped
    let mut b64: String = encoded
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let length = b64.len();
    match length % 4 {
        0 => {}
        1 => return Err(Error::decode(length, "base64url length cannot be 1 mod 4")),
        2 => b64.push_str("=="),
        _ => b64.push('='),
    }

    let bytes = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| Error::decode(length, e.to_string()))?;

    utf16le_to_string(&bytes).map_err(|reason| Error::decode(length, reason))
}

/// Encode text the way the bank does: UTF-16LE bytes, base64url, no padding
pub fn encode_attachment(text: &str) -> String {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn utf16le_to_string(bytes: &[u8]) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!("odd UTF-16LE byte count {}", bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).map_err(|e| e.to_string())?;
    Ok(match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
