use ewfkit_common::num::{clamped_slice, read_u16_le, read_u32_le, read_u8};
use ewfkit_common::text::{trimmed_ascii, utf16le_lossy};
use tracing::{debug, warn};

use crate::error::FatError;
use crate::model::{FatBootSector, FatFileEntry, FatResult, FatVariant};

const MAX_CLUSTER_STEPS: usize = 10_000;
const MAX_DEPTH: u32 = 10;
const DIR_ENTRY_LEN: usize = 32;
const LFN_CHAR_OFFSETS: [usize; 13] = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

/// Decodes a FAT12/16/32 filesystem's boot sector and directory tree.
pub struct FatDecoder;

impl FatDecoder {
    pub fn parse(partition_bytes: &[u8]) -> FatResult {
        if partition_bytes.len() < 512 || partition_bytes.get(510..512) != Some(&[0x55, 0xAA]) {
            let err = FatError::InvalidSignature;
            warn!(error = %err, "no FAT boot signature found");
            return FatResult::invalid(err.to_string());
        }

        let Some(boot_sector) = read_boot_sector(partition_bytes) else {
            let err = FatError::UnsupportedFilesystem;
            return FatResult::invalid(err.to_string());
        };

        if boot_sector.bytes_per_sector == 0 || boot_sector.sectors_per_cluster == 0 {
            let err = FatError::UnsupportedFilesystem;
            return FatResult::invalid(err.to_string());
        }

        let root_dir_sectors = ((boot_sector.root_entry_count as u32 * 32)
            + boot_sector.bytes_per_sector as u32
            - 1)
            / boot_sector.bytes_per_sector as u32;
        let reserved = boot_sector.reserved_sectors as u32;
        let fat_region = boot_sector.num_fats as u32 * boot_sector.sectors_per_fat;
        let data_sectors = boot_sector
            .total_sectors
            .saturating_sub(reserved)
            .saturating_sub(fat_region)
            .saturating_sub(root_dir_sectors);
        let cluster_count = data_sectors / boot_sector.sectors_per_cluster as u32;

        let variant = if cluster_count < 4085 {
            FatVariant::Fat12
        } else if cluster_count < 65525 {
            FatVariant::Fat16
        } else {
            FatVariant::Fat32
        };
        debug!(?variant, cluster_count, "FAT variant determined");

        let fat_offset = reserved as u64 * boot_sector.bytes_per_sector as u64;
        let fat_len = boot_sector.sectors_per_fat as u64 * boot_sector.bytes_per_sector as u64;
        let mut errors = Vec::new();

        if fat_offset + fat_len > partition_bytes.len() as u64 {
            let err = FatError::Truncated {
                offset: fat_offset,
                len: fat_len,
                buffer_len: partition_bytes.len(),
            };
            errors.push(err.to_string());
            return FatResult {
                valid: true,
                variant: Some(variant),
                boot_sector: Some(boot_sector),
                entries: Vec::new(),
                errors,
            };
        }

        let fat_table = clamped_slice(partition_bytes, fat_offset, fat_len);
        let first_data_sector = reserved + fat_region + root_dir_sectors;

        let walker = ClusterWalker {
            disk: partition_bytes,
            fat: fat_table,
            variant,
            bytes_per_sector: boot_sector.bytes_per_sector as u64,
            sectors_per_cluster: boot_sector.sectors_per_cluster as u64,
            first_data_sector: first_data_sector as u64,
        };

        let root_bytes = if variant == FatVariant::Fat32 {
            walker.read_chain(boot_sector.root_cluster)
        } else {
            let offset = (reserved + fat_region) as u64 * boot_sector.bytes_per_sector as u64;
            let len = boot_sector.root_entry_count as u64 * DIR_ENTRY_LEN as u64;
            clamped_slice(partition_bytes, offset, len).to_vec()
        };

        let entries = decode_directory(&walker, &root_bytes, "", 0);

        FatResult {
            valid: true,
            variant: Some(variant),
            boot_sector: Some(boot_sector),
            entries,
            errors,
        }
    }
}

fn read_boot_sector(bytes: &[u8]) -> Option<FatBootSector> {
    let bytes_per_sector = read_u16_le(bytes, 11)?;
    let sectors_per_cluster = read_u8(bytes, 13)?;
    let reserved_sectors = read_u16_le(bytes, 14)?;
    let num_fats = read_u8(bytes, 16)?;
    let root_entry_count = read_u16_le(bytes, 17)?;
    let total_sectors_16 = read_u16_le(bytes, 19)?;
    let sectors_per_fat_16 = read_u16_le(bytes, 22)?;

    let total_sectors = if total_sectors_16 == 0 {
        read_u32_le(bytes, 32)?
    } else {
        total_sectors_16 as u32
    };

    let (sectors_per_fat, root_cluster, volume_label, fs_type) = if sectors_per_fat_16 == 0 {
        let sectors_per_fat = read_u32_le(bytes, 36)?;
        let root_cluster = read_u32_le(bytes, 44)?;
        let volume_label = trimmed_ascii(bytes.get(71..82)?);
        let fs_type = trimmed_ascii(bytes.get(82..90)?);
        (sectors_per_fat, root_cluster, volume_label, fs_type)
    } else {
        let volume_label = trimmed_ascii(bytes.get(43..54)?);
        let fs_type = trimmed_ascii(bytes.get(54..62)?);
        (sectors_per_fat_16 as u32, 0u32, volume_label, fs_type)
    };

    Some(FatBootSector {
        bytes_per_sector,
        sectors_per_cluster,
        reserved_sectors,
        num_fats,
        root_entry_count,
        total_sectors,
        sectors_per_fat,
        root_cluster,
        volume_label,
        fs_type,
    })
}

struct ClusterWalker<'a> {
    disk: &'a [u8],
    fat: &'a [u8],
    variant: FatVariant,
    bytes_per_sector: u64,
    sectors_per_cluster: u64,
    first_data_sector: u64,
}

impl ClusterWalker<'_> {
    fn next_cluster(&self, cluster: u32) -> Option<u32> {
        match self.variant {
            FatVariant::Fat32 => {
                let value = read_u32_le(self.fat, 4 * cluster as usize)? & 0x0FFF_FFFF;
                if value >= 0x0FFF_FFF8 { None } else { Some(value) }
            }
            FatVariant::Fat16 => {
                let value = read_u16_le(self.fat, 2 * cluster as usize)? as u32;
                if value >= 0xFFF8 { None } else { Some(value) }
            }
            FatVariant::Fat12 => {
                let byte_offset = cluster as usize + cluster as usize / 2;
                let raw = read_u16_le(self.fat, byte_offset)?;
                let value = if cluster % 2 == 0 {
                    raw & 0x0FFF
                } else {
                    raw >> 4
                } as u32;
                if value >= 0xFF8 { None } else { Some(value) }
            }
        }
    }

    fn cluster_bytes(&self, cluster: u32) -> Vec<u8> {
        if cluster < 2 {
            return Vec::new();
        }
        let cluster_len = self.sectors_per_cluster * self.bytes_per_sector;
        let offset = (self.first_data_sector + (cluster as u64 - 2) * self.sectors_per_cluster)
            * self.bytes_per_sector;
        clamped_slice(self.disk, offset, cluster_len).to_vec()
    }

    /// Follows the cluster chain from `start_cluster`, concatenating payloads
    /// until end-of-chain, an invalid cluster, or the step safeguard fires.
    fn read_chain(&self, start_cluster: u32) -> Vec<u8> {
        let mut out = Vec::new();
        let mut cluster = start_cluster;
        let mut steps = 0;

        while cluster >= 2 && steps < MAX_CLUSTER_STEPS {
            out.extend_from_slice(&self.cluster_bytes(cluster));
            steps += 1;
            match self.next_cluster(cluster) {
                Some(next) => cluster = next,
                None => break,
            }
        }
        out
    }
}

fn decode_directory(
    walker: &ClusterWalker<'_>,
    bytes: &[u8],
    parent_path: &str,
    depth: u32,
) -> Vec<FatFileEntry> {
    let mut entries = Vec::new();
    let mut long_name_buffer: Vec<Option<String>> = Vec::new();

    for chunk in bytes.chunks_exact(DIR_ENTRY_LEN) {
        let first_byte = chunk[0];
        if first_byte == 0x00 {
            break;
        }
        if first_byte == 0xE5 {
            continue;
        }

        let attributes = chunk[11];
        if attributes & 0x0F == 0x0F {
            let ordinal = (first_byte & 0x3F) as usize;
            if ordinal == 0 {
                continue;
            }
            let mut units = Vec::with_capacity(LFN_CHAR_OFFSETS.len() * 2);
            for &off in &LFN_CHAR_OFFSETS {
                let Some(unit) = read_u16_le(chunk, off) else {
                    continue;
                };
                if unit == 0x0000 || unit == 0xFFFF {
                    break;
                }
                units.extend_from_slice(&unit.to_le_bytes());
            }
            if long_name_buffer.len() < ordinal {
                long_name_buffer.resize(ordinal, None);
            }
            long_name_buffer[ordinal - 1] = Some(utf16le_lossy(&units));
            continue;
        }

        let is_volume_label = attributes & 0x08 != 0;
        let is_directory = attributes & 0x10 != 0;
        if is_volume_label && !is_directory {
            long_name_buffer.clear();
            continue;
        }

        let mut short_bytes = chunk[0..8].to_vec();
        if short_bytes[0] == 0x05 {
            short_bytes[0] = 0xE5;
        }
        let short_name = trimmed_ascii(&short_bytes);
        let extension = trimmed_ascii(&chunk[8..11]);

        let cluster_hi = read_u16_le(chunk, 20).unwrap_or(0) as u32;
        let cluster_lo = read_u16_le(chunk, 26).unwrap_or(0) as u32;
        let cluster = (cluster_hi << 16) | cluster_lo;
        let size = read_u32_le(chunk, 28).unwrap_or(0);

        let is_dot_entry = short_name == "." || short_name == "..";

        let long_name = if !is_dot_entry {
            let assembled: String = long_name_buffer
                .iter()
                .filter_map(|slot| slot.clone())
                .collect();
            if assembled.is_empty() {
                None
            } else {
                Some(assembled)
            }
        } else {
            None
        };
        long_name_buffer.clear();

        if is_dot_entry {
            continue;
        }

        let name = long_name.unwrap_or_else(|| {
            if extension.is_empty() {
                short_name.clone()
            } else {
                format!("{short_name}.{extension}")
            }
        });

        let path = if parent_path.is_empty() {
            name.clone()
        } else {
            format!("{parent_path}/{name}")
        };

        let children = if is_directory && cluster >= 2 && depth < MAX_DEPTH {
            let child_bytes = walker.read_chain(cluster);
            Some(decode_directory(walker, &child_bytes, &path, depth + 1))
        } else if is_directory {
            Some(Vec::new())
        } else {
            None
        };

        entries.push(FatFileEntry {
            name,
            short_name,
            extension,
            is_directory,
            is_hidden: attributes & 0x02 != 0,
            is_system: attributes & 0x04 != 0,
            size,
            cluster,
            children,
            path,
        });
    }

    entries
}
