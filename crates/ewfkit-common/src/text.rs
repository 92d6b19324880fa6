//! String decoding helpers for on-disk fixed-width fields.

/// Trims trailing NULs and ASCII whitespace from a fixed-width field, then
/// decodes it as ASCII/Latin-1 (lossy: non-ASCII bytes become `U+FFFD`).
pub fn trimmed_ascii(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0x00 && !b.is_ascii_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decodes a little-endian UTF-16 byte sequence, stopping at the first NUL
/// or unpaired surrogate code unit. Used for GPT partition names.
pub fn utf16le_lossy(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0x0000)
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Lowercase, zero-padded hex encoding, used for MD5/SHA1 hash blocks.
pub fn to_hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
