//! Base64 encoding, data URIs and hex dumps

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;

use super::ToolError;

const BYTES_PER_LINE: usize = 16;

pub fn encode(input: &str, url_safe: bool) -> String {
    if url_safe {
        URL_SAFE_NO_PAD.encode(input.as_bytes())
    } else {
        STANDARD.encode(input.as_bytes())
    }
}

/// Decode standard or URL-safe input to raw bytes; padding is optional
pub fn decode_bytes(input: &str) -> Result<Vec<u8>, ToolError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let unpadded = compact.trim_end_matches('=');
    STANDARD_NO_PAD
        .decode(unpadded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(unpadded))
        .map_err(|_| ToolError::invalid("Invalid base64 input"))
}

pub fn decode(input: &str) -> Result<String, ToolError> {
    let bytes = decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|_| ToolError::invalid("Decoded data is not valid UTF-8 text"))
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, ..] => "image/jpeg",
        [0x89, 0x50, ..] => "image/png",
        [0x47, 0x49, ..] => "image/gif",
        [0x25, 0x50, ..] => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Wrap base64 input in a data URI; non-base64 input is treated as text
pub fn data_uri(input: &str) -> String {
    if input.starts_with("data:") {
        return input.to_string();
    }
    match STANDARD.decode(input.trim().as_bytes()) {
        Ok(bytes) => format!("data:{};base64,{}", sniff_mime(&bytes), input.trim()),
        Err(_) => format!("data:text/plain;base64,{}", STANDARD.encode(input.as_bytes())),
    }
}

/// Classic `offset  hex  |ascii|` dump of base64 input
pub fn hex_dump(input: &str) -> Result<String, ToolError> {
    let bytes = decode_bytes(input)?;
    let mut out = String::new();

    for (line, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        out.push_str(&format!("{:08x}  ", line * BYTES_PER_LINE));
        for j in 0..BYTES_PER_LINE {
            match chunk.get(j) {
                Some(b) => out.push_str(&format!("{:02x} ", b)),
                None => out.push_str("   "),
            }
            if j == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (32..=126).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    Ok(out)
}
