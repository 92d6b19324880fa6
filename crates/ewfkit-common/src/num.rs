//! Bounds-checked little-endian integer reads.
//!
//! Every read takes the full slice plus an offset and returns `None` instead
//! of panicking when the requested field would run past the end of `data`.
//! Callers narrow to `usize` only at the very end, after the offset and
//! length have already been validated against the slice.

/// Reads a single byte at `offset`.
pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

/// Reads a 16-bit little-endian integer at `offset`.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes(bytes.try_into().unwrap()))
}

/// Reads a 32-bit little-endian integer at `offset`.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().unwrap()))
}

/// Reads a 64-bit little-endian integer at `offset`.
///
/// EWF offsets and sizes are nominally 64-bit; callers should carry the
/// result as `u64` through any further arithmetic and only narrow to
/// `usize` at a slice boundary.
pub fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().unwrap()))
}

/// Clamps a `u64`-typed length to the number of bytes actually available
/// starting at `offset` in `data`, narrowing to `usize` only here.
pub fn clamp_len(data: &[u8], offset: u64, len: u64) -> usize {
    let Ok(offset) = usize::try_from(offset) else {
        return 0;
    };
    let remaining = data.len().saturating_sub(offset);
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    len.min(remaining)
}

/// Slices `data[offset..offset+len]`, clamping `len` to the available
/// remainder instead of failing. Returns an empty slice if `offset` is
/// already past the end of `data`.
pub fn clamped_slice(data: &[u8], offset: u64, len: u64) -> &[u8] {
    let Ok(offset) = usize::try_from(offset) else {
        return &[];
    };
    if offset > data.len() {
        return &[];
    }
    let take = clamp_len(data, offset as u64, len);
    &data[offset..offset + take]
}
