use ewfkit_common::num::{read_u16_le, read_u32_le};

/// Formats a 16-byte mixed-endian GUID as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
///
/// The first three fields are little-endian; the last two are taken in the
/// byte order they appear in the buffer, per the on-disk GPT convention.
pub fn format_guid(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 16 {
        return None;
    }
    let field1 = read_u32_le(bytes, 0)?;
    let field2 = read_u16_le(bytes, 4)?;
    let field3 = read_u16_le(bytes, 6)?;
    let field4 = &bytes[8..10];
    let field5 = &bytes[10..16];

    Some(format!(
        "{field1:08x}-{field2:04x}-{field3:04x}-{f4}-{f5}",
        f4 = hex(field4),
        f5 = hex(field5),
    ))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn is_zero_guid(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_guid() {
        let bytes = [
            0x28, 0x73, 0x2a, 0xc1, 0x1f, 0xf8, 0xd2, 0x11, 0xba, 0x4b, 0x00, 0xa0, 0xc9, 0x3e,
            0xc9, 0x3b,
        ];
        assert_eq!(format_guid(&bytes).unwrap(), "c12a7328-f81f-11d2-ba4b-00a0c93ec93b");
    }

    #[test]
    fn zero_guid_detected() {
        assert!(is_zero_guid(&[0u8; 16]));
        assert!(!is_zero_guid(&[0, 0, 1, 0]));
    }
}
