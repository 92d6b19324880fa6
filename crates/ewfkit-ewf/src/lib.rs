//! EWF (Expert Witness Compression Format, `.E01`) container decoding.
//!
//! [`EwfDecoder`] walks a segment file's section chain and reconstructs its
//! case metadata, volume geometry, embedded hashes, and raw disk bytes. It
//! never panics on malformed input; see [`EwfParseResult`] for how failures
//! are surfaced instead of thrown.
//!
//! DEFLATE is not implemented here. Callers that need compressed `header`
//! sections decoded supply a [`ZlibDecompressor`] to [`EwfDecoder::parse_with`].

pub mod decoder;
pub mod decompress;
pub mod error;
pub mod model;

pub use decoder::{canonical_key, EwfDecoder, EWF_SIGNATURE};
pub use decompress::{PassthroughDecompressor, ZlibDecompressor};
pub use error::EwfError;
pub use model::{CaseMetadata, EwfParseResult, HashBlock, SectionDescriptor, VolumeInfo};
