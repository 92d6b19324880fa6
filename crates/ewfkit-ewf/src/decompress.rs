/// The DEFLATE boundary collaborator.
///
/// This crate never implements zlib/DEFLATE itself; the embedder supplies a
/// decompressor (typically backed by `flate2`, wired in by `ewfkit-cli`).
/// When none is supplied, or the supplied one fails, header payloads are
/// treated as already-uncompressed text.
pub trait ZlibDecompressor {
    /// Attempt to inflate `data`. `None` means "could not decompress" and
    /// causes the caller to fall back to the raw payload.
    fn decompress(&self, data: &[u8]) -> Option<Vec<u8>>;
}

/// The default decompressor: always declines, so header sections fall back
/// to being decoded as raw text. Used when no real decompressor is wired in.
pub struct PassthroughDecompressor;

impl ZlibDecompressor for PassthroughDecompressor {
    fn decompress(&self, _data: &[u8]) -> Option<Vec<u8>> {
        None
    }
}
