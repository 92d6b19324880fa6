/// MBR partition type byte → (human-readable name, filesystem guess).
pub fn mbr_type_name(code: u8) -> (&'static str, Option<&'static str>) {
    match code {
        0x00 => ("Empty", None),
        0x01 => ("FAT12", Some("FAT12")),
        0x04 => ("FAT16 (<32MB)", Some("FAT16")),
        0x05 => ("Extended", None),
        0x06 => ("FAT16", Some("FAT16")),
        0x07 => ("NTFS/exFAT/HPFS", Some("NTFS")),
        0x0B => ("FAT32 (CHS)", Some("FAT32")),
        0x0C => ("FAT32 (LBA)", Some("FAT32")),
        0x0E => ("FAT16 (LBA)", Some("FAT16")),
        0x0F => ("Extended (LBA)", None),
        0x11 => ("Hidden FAT12", Some("FAT12")),
        0x14 => ("Hidden FAT16 (<32MB)", Some("FAT16")),
        0x16 => ("Hidden FAT16", Some("FAT16")),
        0x17 => ("Hidden NTFS", Some("NTFS")),
        0x1B => ("Hidden FAT32", Some("FAT32")),
        0x1C => ("Hidden FAT32 (LBA)", Some("FAT32")),
        0x1E => ("Hidden FAT16 (LBA)", Some("FAT16")),
        0x27 => ("Windows Recovery", None),
        0x42 => ("Windows Dynamic", None),
        0x82 => ("Linux Swap", None),
        0x83 => ("Linux", None),
        0x85 => ("Linux Extended", None),
        0x8E => ("Linux LVM", None),
        0xEE => ("GPT Protective MBR", None),
        0xEF => ("EFI System", Some("FAT32")),
        0xFD => ("Linux RAID", None),
        _ => ("Unknown", None),
    }
}

/// GPT type GUID (lowercase, canonical form) → (human-readable name, filesystem guess).
pub fn gpt_type_name(guid: &str) -> (String, Option<&'static str>) {
    match guid {
        "c12a7328-f81f-11d2-ba4b-00a0c93ec93b" => ("EFI System".to_string(), Some("FAT32")),
        "024dee41-33e7-11d3-9d69-0008c781f39f" => ("MBR Scheme".to_string(), None),
        "e3c9e316-0b5c-4db8-817d-f92df00215ae" => ("MS Reserved".to_string(), None),
        "ebd0a0a2-b9e5-4433-87c0-68b6b72699c7" => ("MS Basic Data".to_string(), Some("NTFS")),
        "de94bba4-06d1-4d40-a16a-bfd50179d6ac" => ("Windows Recovery".to_string(), None),
        "0fc63daf-8483-4772-8e79-3d69d8477de4" => ("Linux Filesystem".to_string(), Some("ext4")),
        "0657fd6d-a4ab-43c4-84e5-0933c84b4f4f" => ("Linux Swap".to_string(), None),
        "e6d6d379-f507-44c2-a23c-238f2a3df928" => ("Linux LVM".to_string(), None),
        "933ac7e1-2eb4-4f13-b844-0e14e2aef915" => ("Linux Home".to_string(), None),
        "48465300-0000-11aa-aa11-00306543ecac" => ("Apple HFS+".to_string(), Some("HFS+")),
        "7c3457ef-0000-11aa-aa11-00306543ecac" => ("Apple APFS".to_string(), Some("APFS")),
        other => (format!("Unknown ({other})"), None),
    }
}
