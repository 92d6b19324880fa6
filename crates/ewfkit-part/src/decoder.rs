use ewfkit_common::num::{clamped_slice, read_u32_le, read_u64_le, read_u8};
use ewfkit_common::text::utf16le_lossy;
use tracing::{debug, warn};

use crate::error::PartitionError;
use crate::guid::{format_guid, is_zero_guid};
use crate::model::{Partition, PartitionTable, PartitionTableKind};
use crate::tables::{gpt_type_name, mbr_type_name};

const MBR_ENTRY_OFFSET: usize = 446;
const MBR_ENTRY_LEN: usize = 16;
const MBR_ENTRY_COUNT: usize = 4;
const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
const GPT_MAX_ENTRIES: u32 = 128;

/// Detects and walks a disk's partition table: MBR, with automatic
/// escalation to GPT when a protective-MBR entry is present.
pub struct PartitionDecoder;

impl PartitionDecoder {
    pub fn parse(disk_bytes: &[u8]) -> PartitionTable {
        Self::parse_with_sector_size(disk_bytes, 512)
    }

    pub fn parse_with_sector_size(disk_bytes: &[u8], sector_size: u32) -> PartitionTable {
        if disk_bytes.len() < 512 || disk_bytes.get(510..512) != Some(&[0x55, 0xAA]) {
            let err = PartitionError::UnknownPartitionScheme {
                buffer_len: disk_bytes.len(),
            };
            warn!(error = %err, "no MBR boot signature found");
            return PartitionTable::unknown(sector_size, err.to_string());
        }

        let mut partitions = Vec::new();
        let mut escalate = false;
        for i in 0..MBR_ENTRY_COUNT {
            let entry_offset = MBR_ENTRY_OFFSET + i * MBR_ENTRY_LEN;
            let Some(boot_flag) = read_u8(disk_bytes, entry_offset) else {
                break;
            };
            let Some(type_code) = read_u8(disk_bytes, entry_offset + 4) else {
                break;
            };
            let Some(start_lba) = read_u32_le(disk_bytes, entry_offset + 8) else {
                break;
            };
            let Some(size_lba) = read_u32_le(disk_bytes, entry_offset + 12) else {
                break;
            };

            if type_code == 0x00 {
                continue;
            }
            if type_code == 0xEE {
                escalate = true;
                break;
            }

            let (type_name, filesystem) = mbr_type_name(type_code);
            let start_lba = start_lba as u64;
            let size_lba = size_lba as u64;
            partitions.push(Partition {
                index: (i + 1) as u32,
                r#type: type_name.to_string(),
                type_code: format!("{type_code:02x}"),
                start_lba,
                end_lba: start_lba + size_lba.saturating_sub(1),
                size_lba,
                size_bytes: size_lba.saturating_mul(sector_size as u64),
                bootable: boot_flag == 0x80,
                name: None,
                guid: None,
                filesystem: filesystem.map(str::to_string),
            });
        }

        if escalate {
            debug!("protective MBR detected, escalating to GPT");
            return Self::parse_gpt(disk_bytes, sector_size);
        }

        PartitionTable {
            valid: true,
            kind: PartitionTableKind::Mbr,
            sector_size,
            partitions,
            disk_guid: None,
            errors: Vec::new(),
        }
    }

    fn parse_gpt(disk_bytes: &[u8], sector_size: u32) -> PartitionTable {
        let header_offset = sector_size as usize;
        if disk_bytes.len() < header_offset + 92 {
            let err = PartitionError::Truncated {
                offset: header_offset as u64,
                len: 92,
                buffer_len: disk_bytes.len(),
            };
            return PartitionTable::unknown(sector_size, err.to_string());
        }

        let signature = &disk_bytes[header_offset..header_offset + 8];
        if signature != GPT_SIGNATURE {
            let err = PartitionError::MalformedGptHeader {
                offset: header_offset as u64,
                reason: "missing 'EFI PART' signature".to_string(),
            };
            warn!(error = %err, "GPT header rejected");
            return PartitionTable::unknown(sector_size, err.to_string());
        }

        let disk_guid = disk_bytes
            .get(header_offset + 56..header_offset + 72)
            .and_then(format_guid);
        let Some(partition_entry_lba) = read_u64_le(disk_bytes, header_offset + 72) else {
            return PartitionTable::unknown(sector_size, "GPT header truncated".to_string());
        };
        let Some(num_partition_entries) = read_u32_le(disk_bytes, header_offset + 80) else {
            return PartitionTable::unknown(sector_size, "GPT header truncated".to_string());
        };
        let Some(partition_entry_size) = read_u32_le(disk_bytes, header_offset + 84) else {
            return PartitionTable::unknown(sector_size, "GPT header truncated".to_string());
        };

        let entry_count = num_partition_entries.min(GPT_MAX_ENTRIES);
        let mut partitions = Vec::new();
        let mut errors = Vec::new();
        let array_start = partition_entry_lba.saturating_mul(sector_size as u64);

        for i in 0..entry_count {
            let entry_offset = array_start + i as u64 * partition_entry_size as u64;
            let entry = clamped_slice(disk_bytes, entry_offset, partition_entry_size as u64);
            if entry.len() < 56 {
                break;
            }

            let type_guid_bytes = &entry[0..16];
            if is_zero_guid(type_guid_bytes) {
                continue;
            }
            let Some(type_guid) = format_guid(type_guid_bytes) else {
                continue;
            };
            let partition_guid = format_guid(&entry[16..32]);
            let Some(start_lba) = read_u64_le(entry, 32) else {
                errors.push(format!("GPT entry {i}: truncated start_lba"));
                continue;
            };
            let Some(end_lba) = read_u64_le(entry, 40) else {
                errors.push(format!("GPT entry {i}: truncated end_lba"));
                continue;
            };
            let name = entry
                .get(56..entry.len().min(56 + 72))
                .map(|raw| utf16le_lossy(raw))
                .filter(|s| !s.is_empty());

            let (type_name, filesystem) = gpt_type_name(&type_guid);
            let size_lba = end_lba.saturating_sub(start_lba).saturating_add(1);
            partitions.push(Partition {
                index: i + 1,
                r#type: type_name,
                type_code: type_guid,
                start_lba,
                end_lba,
                size_lba,
                size_bytes: size_lba.saturating_mul(sector_size as u64),
                bootable: false,
                name,
                guid: partition_guid,
                filesystem: filesystem.map(str::to_string),
            });
        }

        PartitionTable {
            valid: true,
            kind: PartitionTableKind::Gpt,
            sector_size,
            partitions,
            disk_guid,
            errors,
        }
    }
}
