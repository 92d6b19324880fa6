/// Errors recorded while detecting or walking a partition table.
///
/// Never propagated out of [`crate::PartitionDecoder::parse`] as a
/// `Result::Err`; see the crate docs for the defensive parsing contract.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("neither MBR nor GPT signature matched (buffer len {buffer_len})")]
    UnknownPartitionScheme { buffer_len: usize },

    #[error("requested range exceeds buffer: offset {offset}, len {len}, buffer len {buffer_len}")]
    Truncated {
        offset: u64,
        len: u64,
        buffer_len: usize,
    },

    #[error("GPT header at offset {offset} malformed: {reason}")]
    MalformedGptHeader { offset: u64, reason: String },
}
