use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ewfkit_common::num::clamped_slice;
use ewfkit_ewf::{EwfDecoder, EwfParseResult, ZlibDecompressor};
use ewfkit_fat::{FatDecoder, FatFileEntry, FatResult};
use ewfkit_part::{Partition, PartitionDecoder, PartitionTable};

/// Walks an EWF (`.E01`) forensic disk image: case metadata, partition
/// table, and (when a FAT partition is found) its directory tree.
#[derive(Debug, Parser)]
#[command(name = "ewfkit", version, about)]
struct Args {
    /// Path to the EWF segment file.
    input: PathBuf,

    /// 1-based partition index to walk for a FAT tree. Defaults to the
    /// first partition whose filesystem guess starts with "FAT".
    #[arg(short, long)]
    partition: Option<u32>,

    /// Emit the full result as JSON instead of a text summary.
    #[arg(short, long)]
    json: bool,

    /// Verbose (debug-level) logging of the section/cluster walk.
    #[arg(short, long)]
    verbose: bool,
}

/// The concrete DEFLATE boundary collaborator: inflates `header`/`header2`
/// payloads with `flate2`. `ewfkit-ewf` itself never links DEFLATE.
struct Flate2Decompressor;

impl ZlibDecompressor for Flate2Decompressor {
    fn decompress(&self, data: &[u8]) -> Option<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).ok()?;
        Some(out)
    }
}

#[derive(serde::Serialize)]
struct Report {
    ewf: EwfParseResult,
    partitions: Option<PartitionTable>,
    fat: Option<FatResult>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let ewf = EwfDecoder::parse_with(&bytes, &Flate2Decompressor);
    if !ewf.valid {
        bail!(
            "{} is not a valid EWF file: {}",
            args.input.display(),
            ewf.errors.join("; ")
        );
    }

    let disk = ewf.raw_disk_data.clone().unwrap_or_default();
    let partitions = if disk.is_empty() {
        None
    } else {
        Some(PartitionDecoder::parse(&disk))
    };

    let fat = partitions
        .as_ref()
        .and_then(|table| select_fat_partition(table, args.partition))
        .map(|(partition, table)| {
            let start = partition.start_lba.saturating_mul(table.sector_size as u64);
            let slice = clamped_slice(&disk, start, partition.size_bytes);
            FatDecoder::parse(slice)
        });

    let report = Report { ewf, partitions, fat };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_text(&report);
    }

    Ok(())
}

fn select_fat_partition<'a>(
    table: &'a PartitionTable,
    requested: Option<u32>,
) -> Option<(&'a Partition, &'a PartitionTable)> {
    let partition = match requested {
        Some(index) => table.partitions.iter().find(|p| p.index == index),
        None => table
            .partitions
            .iter()
            .find(|p| p.filesystem.as_deref().is_some_and(|fs| fs.starts_with("FAT"))),
    }?;
    Some((partition, table))
}

fn render_text(report: &Report) {
    println!("== EWF ==");
    for (key, value) in &report.ewf.metadata {
        println!("  {key}: {value}");
    }
    if let Some(volume) = &report.ewf.volume {
        println!(
            "  volume: {} sectors x {} bytes ({} chunk(s) of {} sectors)",
            volume.sector_count, volume.bytes_per_sector, volume.chunk_count, volume.sectors_per_chunk
        );
    }
    if let Some(hash) = &report.ewf.hash {
        if let Some(md5) = &hash.md5 {
            println!("  md5: {md5}");
        }
        if let Some(sha1) = &hash.sha1 {
            println!("  sha1: {sha1}");
        }
    }
    if !report.ewf.errors.is_empty() {
        println!("  errors: {}", report.ewf.errors.join("; "));
    }

    if let Some(table) = &report.partitions {
        println!("\n== Partitions ({:?}) ==", table.kind);
        if let Some(guid) = &table.disk_guid {
            println!("  disk guid: {guid}");
        }
        for p in &table.partitions {
            println!(
                "  [{}] {} ({}) lba {}..{} ({} bytes){}",
                p.index,
                p.r#type,
                p.filesystem.as_deref().unwrap_or("?"),
                p.start_lba,
                p.end_lba,
                p.size_bytes,
                if p.bootable { " *boot*" } else { "" }
            );
        }
    }

    if let Some(fat) = &report.fat {
        println!("\n== FAT tree ({:?}) ==", fat.variant);
        for entry in &fat.entries {
            print_fat_entry(entry, 1);
        }
        if !fat.errors.is_empty() {
            println!("  errors: {}", fat.errors.join("; "));
        }
    }
}

fn print_fat_entry(entry: &FatFileEntry, indent: usize) {
    let prefix = "  ".repeat(indent);
    if entry.is_directory {
        println!("{prefix}{}/", entry.name);
    } else {
        println!("{prefix}{} ({} bytes)", entry.name, entry.size);
    }
    if let Some(children) = &entry.children {
        for child in children {
            print_fat_entry(child, indent + 1);
        }
    }
}
