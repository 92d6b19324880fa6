/// Errors recorded while walking an EWF container.
///
/// None of these are ever propagated out of [`crate::EwfDecoder::parse`] as a
/// `Result::Err` (the decoder is defensive by design, see the crate docs),
/// but they give the `errors` trail on [`crate::EwfParseResult`] a typed
/// shape callers can match on before falling back to the `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum EwfError {
    #[error("Invalid EWF signature: expected {expected:02x?}, got {actual:02x?}")]
    InvalidSignature { expected: [u8; 8], actual: Vec<u8> },

    #[error("section '{section_type}' at offset {offset}: {reason}")]
    MalformedSection {
        section_type: String,
        offset: u64,
        reason: String,
    },

    #[error("requested range exceeds buffer: offset {offset}, len {len}, buffer len {buffer_len}")]
    Truncated {
        offset: u64,
        len: u64,
        buffer_len: usize,
    },
}
