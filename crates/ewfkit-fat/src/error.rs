/// Errors recorded while walking a FAT filesystem.
///
/// Never propagated out of [`crate::FatDecoder::parse`] as a `Result::Err`;
/// see the crate docs for the defensive parsing contract.
#[derive(Debug, thiserror::Error)]
pub enum FatError {
    #[error("no FAT boot signature (0x55 0xAA) found")]
    InvalidSignature,

    #[error("FAT region at offset {offset} (len {len}) exceeds buffer of {buffer_len} bytes")]
    Truncated {
        offset: u64,
        len: u64,
        buffer_len: usize,
    },

    #[error("boot sector does not describe a supported FAT variant")]
    UnsupportedFilesystem,
}
