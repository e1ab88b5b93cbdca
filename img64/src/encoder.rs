// ABOUTME: Data URL encoding for validated image bytes
// ABOUTME: Produces `data:<mediatype>;base64,<payload>` with the standard padded alphabet

use crate::constants::prefixes;
use base64::{engine::general_purpose::STANDARD, Engine};

pub fn encode(bytes: &[u8], media_type: &str) -> String {
    let mut out = String::with_capacity(
        prefixes::DATA_URL.len() + media_type.len() + 8 + bytes.len().div_ceil(3) * 4,
    );
    out.push_str(prefixes::DATA_URL);
    out.push_str(media_type);
    out.push_str(";base64,");
    STANDARD.encode_string(bytes, &mut out);
    out
}

pub fn is_data_url(source: &str) -> bool {
    source.starts_with(prefixes::DATA_URL)
}
