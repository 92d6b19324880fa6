use ewfkit_fat::{FatDecoder, FatVariant};

const LFN_CHAR_OFFSETS: [usize; 13] = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

fn fat32_partition(cluster_count: u32) -> Vec<u8> {
    let bytes_per_sector = 512u32;
    let reserved_sectors = 32u32;
    let num_fats = 1u32;
    let sectors_per_fat = (cluster_count * 4).div_ceil(bytes_per_sector);
    let total_sectors = reserved_sectors + num_fats * sectors_per_fat + cluster_count;
    let fat_region_end = (reserved_sectors + num_fats * sectors_per_fat) * bytes_per_sector;
    let buffer_len = fat_region_end as usize + 16 * bytes_per_sector as usize;

    let mut disk = vec![0u8; buffer_len];
    disk[11..13].copy_from_slice(&(bytes_per_sector as u16).to_le_bytes());
    disk[13] = 1;
    disk[14..16].copy_from_slice(&(reserved_sectors as u16).to_le_bytes());
    disk[16] = num_fats as u8;
    disk[17..19].copy_from_slice(&0u16.to_le_bytes());
    disk[32..36].copy_from_slice(&total_sectors.to_le_bytes());
    disk[36..40].copy_from_slice(&sectors_per_fat.to_le_bytes());
    disk[44..48].copy_from_slice(&2u32.to_le_bytes());
    disk[71..82].copy_from_slice(b"TESTVOL    ");
    disk[82..90].copy_from_slice(b"FAT32   ");
    disk[510] = 0x55;
    disk[511] = 0xAA;
    disk
}

fn set_fat_entry(disk: &mut [u8], cluster: u32, value: u32) {
    let reserved = u16::from_le_bytes([disk[14], disk[15]]) as usize;
    let bytes_per_sector = u16::from_le_bytes([disk[11], disk[12]]) as usize;
    let offset = reserved * bytes_per_sector + 4 * cluster as usize;
    disk[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_cluster(disk: &mut [u8], cluster: u32, payload: &[u8]) {
    let reserved = u16::from_le_bytes([disk[14], disk[15]]) as usize;
    let num_fats = disk[16] as usize;
    let sectors_per_fat = u32::from_le_bytes([disk[36], disk[37], disk[38], disk[39]]) as usize;
    let bytes_per_sector = u16::from_le_bytes([disk[11], disk[12]]) as usize;
    let first_data_sector = reserved + num_fats * sectors_per_fat;
    let offset = (first_data_sector + (cluster as usize - 2)) * bytes_per_sector;
    disk[offset..offset + payload.len()].copy_from_slice(payload);
}

fn lfn_entry(ordinal: u8, name: &str) -> [u8; 32] {
    let mut entry = [0u8; 32];
    entry[0] = ordinal;
    entry[11] = 0x0F;
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, &off) in LFN_CHAR_OFFSETS.iter().enumerate() {
        let unit = units.get(i).copied().unwrap_or(0xFFFF);
        entry[off..off + 2].copy_from_slice(&unit.to_le_bytes());
    }
    entry
}

fn short_entry(name: &str, ext: &str, attrs: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut entry = [0u8; 32];
    let mut padded_name = [b' '; 8];
    padded_name[..name.len()].copy_from_slice(name.as_bytes());
    entry[0..8].copy_from_slice(&padded_name);
    let mut padded_ext = [b' '; 3];
    padded_ext[..ext.len()].copy_from_slice(ext.as_bytes());
    entry[8..11].copy_from_slice(&padded_ext);
    entry[11] = attrs;
    entry[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    entry[26..28].copy_from_slice(&((cluster & 0xFFFF) as u16).to_le_bytes());
    entry[28..32].copy_from_slice(&size.to_le_bytes());
    entry
}

/// Scenario: a nested directory (one subdirectory containing one file with a
/// long name) resolves both levels correctly and paths join with `/`.
#[test]
fn nested_directory_resolves_long_name_and_path() {
    let mut disk = fat32_partition(70_000);
    set_fat_entry(&mut disk, 2, 3); // root -> subdir cluster
    set_fat_entry(&mut disk, 3, 0x0FFF_FFF8); // subdir end of chain
    set_fat_entry(&mut disk, 4, 0x0FFF_FFF8); // file cluster end of chain

    let mut root = Vec::new();
    root.extend_from_slice(&short_entry("SUBDIR", "", 0x10, 3, 0));
    write_cluster(&mut disk, 2, &root);

    let mut subdir = Vec::new();
    subdir.extend_from_slice(&lfn_entry(1, "notes.txt"));
    subdir.extend_from_slice(&short_entry("NOTES~1", "TXT", 0x20, 4, 42));
    write_cluster(&mut disk, 3, &subdir);

    let result = FatDecoder::parse(&disk);
    assert!(result.valid);
    assert_eq!(result.variant, Some(FatVariant::Fat32));
    assert_eq!(result.entries.len(), 1);

    let subdir_entry = &result.entries[0];
    assert_eq!(subdir_entry.name, "SUBDIR");
    assert!(subdir_entry.is_directory);
    let children = subdir_entry.children.as_ref().expect("subdir has children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "notes.txt");
    assert_eq!(children[0].path, "SUBDIR/notes.txt");
    assert_eq!(children[0].size, 42);
}

/// Scenario: a self-looping FAT32 chain (cluster 2 points to itself) must
/// still terminate, bounded by the 10,000-step safeguard.
#[test]
fn self_looping_chain_is_bounded() {
    let mut disk = fat32_partition(70_000);
    set_fat_entry(&mut disk, 2, 2);

    let result = FatDecoder::parse(&disk);
    assert!(result.valid);
}

/// Directory recursion stops at depth 10 even if the image encodes deeper
/// nesting via cycles in the directory cluster graph.
#[test]
fn directory_recursion_is_capped() {
    let mut disk = fat32_partition(70_000);
    // root directory contains a directory entry pointing back at its own
    // cluster, which would recurse forever without the depth cap.
    set_fat_entry(&mut disk, 2, 0x0FFF_FFF8);
    let mut root = Vec::new();
    root.extend_from_slice(&short_entry("LOOPDIR", "", 0x10, 2, 0));
    write_cluster(&mut disk, 2, &root);

    let result = FatDecoder::parse(&disk);
    assert!(result.valid);
    assert_eq!(result.entries.len(), 1);

    let mut depth = 0;
    let mut current = result.entries[0].children.as_ref();
    while let Some(children) = current {
        if children.is_empty() {
            break;
        }
        depth += 1;
        current = children[0].children.as_ref();
        assert!(depth <= 12, "recursion did not terminate near the depth cap");
    }
    assert!(depth >= 9, "recursion stopped suspiciously early");
}
