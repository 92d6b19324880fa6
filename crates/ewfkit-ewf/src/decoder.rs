use ewfkit_common::num::{clamped_slice, read_u32_le, read_u64_le, read_u8};
use ewfkit_common::text::{to_hex_lower, trimmed_ascii};
use tracing::{debug, warn};

use crate::decompress::{PassthroughDecompressor, ZlibDecompressor};
use crate::error::EwfError;
use crate::model::{CaseMetadata, EwfParseResult, HashBlock, SectionDescriptor, VolumeInfo};

/// The 8-byte magic every EWF segment file starts with.
pub const EWF_SIGNATURE: [u8; 8] = [0x45, 0x56, 0x46, 0x09, 0x0D, 0x0A, 0xFF, 0x00];

/// Signature (5) + segment header bytes skipped before the first section.
const SECTION_WALK_START: usize = 13;
/// `type[16]`, `next_offset u64le`, `size u64le`, `padding[40]`, `checksum u32le`.
const SECTION_DESCRIPTOR_LEN: usize = 76;

/// Decodes EWF (`.E01`) containers into their sections, metadata, and
/// reconstructed raw-disk bytes.
///
/// `parse` never returns an `Err`: malformed input yields a result with
/// `valid = false` and/or entries in `errors`, per the crate's defensive
/// parsing contract.
pub struct EwfDecoder;

impl EwfDecoder {
    /// Parses `bytes` without a zlib decompressor: compressed `header`
    /// sections fall back to being decoded as raw (garbled) text.
    pub fn parse(bytes: &[u8]) -> EwfParseResult {
        Self::parse_with(bytes, &PassthroughDecompressor)
    }

    /// Parses `bytes`, using `decompressor` to inflate zlib-compressed
    /// `header`/`header2` payloads.
    pub fn parse_with(bytes: &[u8], decompressor: &dyn ZlibDecompressor) -> EwfParseResult {
        let mut signature = [0u8; 8];
        let have = bytes.len().min(8);
        signature[..have].copy_from_slice(&bytes[..have]);

        if have < 8 || signature != EWF_SIGNATURE {
            let err = EwfError::InvalidSignature {
                expected: EWF_SIGNATURE,
                actual: bytes[..have].to_vec(),
            };
            warn!(error = %err, "EWF signature rejected");
            return EwfParseResult::invalid(signature, err.to_string());
        }

        let mut sections = Vec::new();
        let mut metadata = CaseMetadata::new();
        let mut volume = None;
        let mut hash = None;
        let mut disk_chunks: Vec<Vec<u8>> = Vec::new();
        let mut errors = Vec::new();

        let mut offset = SECTION_WALK_START;
        while offset + SECTION_DESCRIPTOR_LEN <= bytes.len() {
            let Some(section_type) = read_section_type(bytes, offset) else {
                break;
            };
            let Some(next_offset) = read_u64_le(bytes, offset + 16) else {
                break;
            };
            let Some(size) = read_u64_le(bytes, offset + 24) else {
                break;
            };

            if section_type.is_empty() || size == 0 {
                break;
            }

            let payload_start = (offset + SECTION_DESCRIPTOR_LEN) as u64;
            let payload = clamped_slice(bytes, payload_start, size).to_vec();
            debug!(
                section_type = %section_type,
                offset,
                size,
                payload_len = payload.len(),
                "walking EWF section"
            );

            match section_type.as_str() {
                "header" | "header2" => {
                    match decode_header_section(&payload, decompressor) {
                        Ok(fields) => {
                            for (key, value) in fields {
                                metadata.insert(key, value);
                            }
                        }
                        Err(reason) => {
                            let err = EwfError::MalformedSection {
                                section_type: section_type.clone(),
                                offset: offset as u64,
                                reason,
                            };
                            warn!(error = %err, "header section decode failed");
                            errors.push(err.to_string());
                        }
                    }
                }
                "volume" | "disk" => match decode_volume_section(&payload) {
                    Some(info) => volume = Some(info),
                    None => {
                        let err = EwfError::MalformedSection {
                            section_type: section_type.clone(),
                            offset: offset as u64,
                            reason: "volume section shorter than 32 bytes".to_string(),
                        };
                        errors.push(err.to_string());
                    }
                },
                "sectors" | "data" => disk_chunks.push(payload.clone()),
                "hash" | "digest" => {
                    if let Some(block) = decode_hash_section(&payload) {
                        hash = Some(block);
                    }
                }
                _ => {}
            }

            let is_done = section_type == "done";
            sections.push(SectionDescriptor {
                r#type: section_type,
                next_offset,
                size,
                offset: offset as u64,
                data: payload,
            });

            if is_done {
                break;
            }

            let payload_len = sections.last().map(|s| s.data.len()).unwrap_or(0) as u64;
            let advance_to = if next_offset > offset as u64 {
                next_offset
            } else {
                payload_start + payload_len
            };

            if advance_to <= offset as u64 {
                break;
            }
            let Ok(next) = usize::try_from(advance_to) else {
                break;
            };
            offset = next;
        }

        let raw_disk_data = if disk_chunks.is_empty() {
            None
        } else {
            Some(disk_chunks.into_iter().flatten().collect())
        };

        EwfParseResult {
            valid: true,
            signature,
            sections,
            metadata,
            volume,
            hash,
            raw_disk_data,
            errors,
        }
    }
}

fn read_section_type(bytes: &[u8], offset: usize) -> Option<String> {
    let raw = bytes.get(offset..offset + 16)?;
    Some(trimmed_ascii(raw).to_lowercase())
}

fn decode_header_section(
    payload: &[u8],
    decompressor: &dyn ZlibDecompressor,
) -> Result<CaseMetadata, String> {
    let inflated = match payload.first() {
        Some(0x78) => decompressor
            .decompress(payload)
            .unwrap_or_else(|| payload.to_vec()),
        _ => payload.to_vec(),
    };
    let text = String::from_utf8_lossy(&inflated);

    let mut fields = CaseMetadata::new();
    for line in text.split(['\r', '\n']).filter(|l| !l.is_empty()) {
        let mut parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 {
            parts = line.split('=').collect();
        }
        if parts.len() < 2 {
            continue;
        }
        let key = parts[0].trim().to_lowercase();
        let value = parts[1..].join("=").trim().to_string();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        fields.insert(canonical_key(&key), value);
    }
    Ok(fields)
}

/// Collapses a header key and all of its known short aliases onto one
/// canonical name. Unknown keys pass through verbatim.
pub fn canonical_key(key: &str) -> String {
    match key {
        "case_number" | "c" | "case" => "case_number",
        "description" | "n" | "name" => "description",
        "examiner_name" | "e" | "examiner" => "examiner_name",
        "evidence_number" | "ev" | "evidence" => "evidence_number",
        "notes" | "no" => "notes",
        "acquired_date" | "a" | "acquired" => "acquired_date",
        "system_date" | "m" | "system" => "system_date",
        "operating_system" | "os" => "operating_system",
        "password" | "p" => "password",
        "compression_level" | "r" | "compression" => "compression_level",
        other => other,
    }
    .to_string()
}

fn decode_volume_section(payload: &[u8]) -> Option<VolumeInfo> {
    if payload.len() < 32 {
        return None;
    }
    Some(VolumeInfo {
        media_type: read_u8(payload, 0)?,
        chunk_count: read_u32_le(payload, 4)?,
        sectors_per_chunk: read_u32_le(payload, 8)?,
        bytes_per_sector: read_u32_le(payload, 12)?,
        sector_count: read_u64_le(payload, 16)?,
    })
}

fn decode_hash_section(payload: &[u8]) -> Option<HashBlock> {
    if payload.len() < 16 {
        return None;
    }
    let md5 = Some(to_hex_lower(&payload[0..16]));
    let sha1 = if payload.len() >= 36 {
        Some(to_hex_lower(&payload[16..36]))
    } else {
        None
    };
    Some(HashBlock { md5, sha1 })
}
