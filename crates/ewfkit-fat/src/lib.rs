//! FAT12/16/32 filesystem walking: boot sector parsing, variant
//! determination, cluster-chain traversal, long filename assembly, and
//! recursive directory tree construction.
//!
//! [`FatDecoder::parse`] is bounded: cluster chains stop after 10,000 steps
//! and directory recursion stops at depth 10, so adversarial (cyclic) FAT
//! tables cannot hang the walk.

pub mod decoder;
pub mod error;
pub mod model;

pub use decoder::FatDecoder;
pub use error::FatError;
pub use model::{FatBootSector, FatFileEntry, FatResult, FatVariant};

#[cfg(test)]
mod tests {
    use super::*;

    fn fat32_partition(cluster_count: u32) -> Vec<u8> {
        let bytes_per_sector = 512u16;
        let sectors_per_cluster = 1u8;
        let reserved_sectors = 32u16;
        let num_fats = 1u8;
        let root_entry_count = 0u16;
        let sectors_per_fat = (cluster_count * 4).div_ceil(bytes_per_sector as u32);
        let total_sectors = reserved_sectors as u32 + num_fats as u32 * sectors_per_fat + cluster_count;

        // The real filesystem this boot sector describes is much bigger than
        // the test buffer; only the FAT region plus a few data clusters are
        // physically present, relying on clamped reads for the rest.
        let fat_region_end = (reserved_sectors as u32 + num_fats as u32 * sectors_per_fat) as usize
            * bytes_per_sector as usize;
        let buffer_len = fat_region_end + 8 * bytes_per_sector as usize;

        let mut disk = vec![0u8; buffer_len];
        disk[11..13].copy_from_slice(&bytes_per_sector.to_le_bytes());
        disk[13] = sectors_per_cluster;
        disk[14..16].copy_from_slice(&reserved_sectors.to_le_bytes());
        disk[16] = num_fats;
        disk[17..19].copy_from_slice(&root_entry_count.to_le_bytes());
        disk[19..21].copy_from_slice(&0u16.to_le_bytes());
        disk[22..24].copy_from_slice(&0u16.to_le_bytes());
        disk[32..36].copy_from_slice(&total_sectors.to_le_bytes());
        disk[36..40].copy_from_slice(&sectors_per_fat.to_le_bytes());
        disk[44..48].copy_from_slice(&2u32.to_le_bytes());
        disk[71..82].copy_from_slice(b"NO NAME    ");
        disk[82..90].copy_from_slice(b"FAT32   ");
        disk[510] = 0x55;
        disk[511] = 0xAA;
        disk
    }

    fn fat_offset(disk: &[u8]) -> usize {
        let reserved = u16::from_le_bytes([disk[14], disk[15]]) as usize;
        let bytes_per_sector = u16::from_le_bytes([disk[11], disk[12]]) as usize;
        reserved * bytes_per_sector
    }

    fn set_fat32_entry(disk: &mut [u8], cluster: u32, value: u32) {
        let offset = fat_offset(disk) + 4 * cluster as usize;
        disk[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn first_data_sector(disk: &[u8]) -> usize {
        let reserved = u16::from_le_bytes([disk[14], disk[15]]) as usize;
        let num_fats = disk[16] as usize;
        let sectors_per_fat = u32::from_le_bytes([disk[36], disk[37], disk[38], disk[39]]) as usize;
        reserved + num_fats * sectors_per_fat
    }

    fn write_cluster(disk: &mut [u8], cluster: u32, payload: &[u8]) {
        let bytes_per_sector = u16::from_le_bytes([disk[11], disk[12]]) as usize;
        let offset = (first_data_sector(disk) + (cluster as usize - 2)) * bytes_per_sector;
        disk[offset..offset + payload.len()].copy_from_slice(payload);
    }

    #[test]
    fn rejects_missing_boot_signature() {
        let disk = vec![0u8; 512];
        let result = FatDecoder::parse(&disk);
        assert!(!result.valid);
    }

    #[test]
    fn determines_fat32_variant_from_cluster_count() {
        let disk = fat32_partition(70_000);
        let result = FatDecoder::parse(&disk);
        assert!(result.valid);
        assert_eq!(result.variant, Some(FatVariant::Fat32));
        assert_eq!(result.boot_sector.as_ref().unwrap().volume_label, "NO NAME");
    }

    #[test]
    fn assembles_long_file_name_from_lfn_slot() {
        let mut disk = fat32_partition(70_000);
        set_fat32_entry(&mut disk, 2, 0x0FFF_FFF8);

        let mut root = Vec::new();
        let mut lfn = [0u8; 32];
        lfn[0] = 0x41;
        lfn[11] = 0x0F;
        let name_units: Vec<u16> = "file.txt".encode_utf16().collect();
        for (i, &off) in [1usize, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30].iter().enumerate() {
            let unit = name_units.get(i).copied().unwrap_or(0xFFFF);
            lfn[off..off + 2].copy_from_slice(&unit.to_le_bytes());
        }
        root.extend_from_slice(&lfn);

        let mut short = [0u8; 32];
        short[0..8].copy_from_slice(b"FILE~1  ");
        short[8..11].copy_from_slice(b"TXT");
        short[20..22].copy_from_slice(&0u16.to_le_bytes());
        short[26..28].copy_from_slice(&3u16.to_le_bytes());
        short[28..32].copy_from_slice(&100u32.to_le_bytes());
        root.extend_from_slice(&short);

        write_cluster(&mut disk, 2, &root);

        let result = FatDecoder::parse(&disk);
        assert!(result.valid);
        assert_eq!(result.entries.len(), 1);
        let entry = &result.entries[0];
        assert_eq!(entry.name, "file.txt");
        assert_eq!(entry.short_name, "FILE~1");
        assert_eq!(entry.extension, "TXT");
        assert_eq!(entry.size, 100);
        assert_eq!(entry.cluster, 3);
    }

    #[test]
    fn self_looping_cluster_chain_terminates_at_step_cap() {
        let mut disk = fat32_partition(70_000);
        set_fat32_entry(&mut disk, 2, 2);

        let result = FatDecoder::parse(&disk);
        assert!(result.valid);
        // root dir chain loops forever on cluster 2; walk must still return.
        let _ = result;
    }
}
