use std::collections::BTreeMap;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
/// One section descriptor from an EWF container's section walk.
pub struct SectionDescriptor {
    /// Lowercase, trimmed section type (e.g. `"header"`, `"sectors"`, `"done"`).
    pub r#type: String,
    /// Absolute byte offset of the next section header, as stored on disk.
    pub next_offset: u64,
    /// Payload length, per the convention described in [`crate::EwfDecoder`].
    pub size: u64,
    /// This section's own starting byte offset in the file.
    pub offset: u64,
    /// The section's payload, already clipped to the available buffer.
    pub data: Vec<u8>,
}

/// Acquisition metadata decoded from `header`/`header2` sections, keyed by
/// canonical name (see [`crate::decoder::canonical_key`] for the alias table).
pub type CaseMetadata = BTreeMap<String, String>;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Geometry of the acquired medium, decoded from a `volume`/`disk` section.
pub struct VolumeInfo {
    pub media_type: u8,
    pub chunk_count: u32,
    pub sectors_per_chunk: u32,
    pub bytes_per_sector: u32,
    pub sector_count: u64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Embedded integrity hashes, decoded from a `hash`/`digest` section.
pub struct HashBlock {
    pub md5: Option<String>,
    pub sha1: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
/// The outcome of walking one EWF container, valid or not.
///
/// `valid` and `errors` are independent: `valid` means the signature was
/// accepted, `errors` enumerates every sub-decode issue encountered along
/// the way regardless of whether the walk as a whole succeeded.
pub struct EwfParseResult {
    pub valid: bool,
    pub signature: [u8; 8],
    pub sections: Vec<SectionDescriptor>,
    pub metadata: CaseMetadata,
    pub volume: Option<VolumeInfo>,
    pub hash: Option<HashBlock>,
    pub raw_disk_data: Option<Vec<u8>>,
    pub errors: Vec<String>,
}

impl EwfParseResult {
    pub(crate) fn invalid(signature: [u8; 8], error: String) -> Self {
        Self {
            valid: false,
            signature,
            sections: Vec::new(),
            metadata: CaseMetadata::new(),
            volume: None,
            hash: None,
            raw_disk_data: None,
            errors: vec![error],
        }
    }
}
