use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use ngram_core::profile_sample;

use crate::canonicalize_or_current;
use crate::commands::util::hex32;

#[derive(Debug, Serialize)]
pub struct SectionRow {
    pub index: usize,
    pub name: String,
    pub characteristics: u32,
    pub raw_offset: u64,
    pub raw_size: u64,
    pub blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_entropy: Option<f64>,
}

/// Print the section table of a sample with per-section entropy summaries.
pub fn sections_command(input: &str, json: bool) -> Result<()> {
    let path = canonicalize_or_current(input)?;
    if !path.is_file() {
        return Err(anyhow!("Input file does not exist: {}", path.display()));
    }
    let profile =
        profile_sample(&path).with_context(|| format!("Failed to read sections of {}", path.display()))?;

    let rows: Vec<SectionRow> = profile
        .sections
        .iter()
        .zip(&profile.profiles)
        .map(|(s, p)| SectionRow {
            index: s.index,
            name: s.name.clone(),
            characteristics: s.characteristics,
            raw_offset: s.raw_offset,
            raw_size: s.raw_size,
            blocks: s.num_blocks(),
            max_entropy: p.as_ref().map(|p| p.max),
            avg_entropy: p.as_ref().map(|p| p.avg),
            min_entropy: p.as_ref().map(|p| p.min),
        })
        .collect();

    if json {
        let serialized =
            serde_json::to_string_pretty(&rows).context("Failed to serialize sections to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Sections of {} ({}):", profile.sample, rows.len());
    for row in rows {
        let entropy = match (row.max_entropy, row.avg_entropy, row.min_entropy) {
            (Some(max), Some(avg), Some(min)) => {
                format!("entropy max={max:.3} avg={avg:.3} min={min:.3}")
            }
            _ => "empty".to_string(),
        };
        println!(
            "  #{} {} chars={} offset={} size={} blocks={} {}",
            row.index,
            row.name,
            hex32(row.characteristics as u64),
            hex32(row.raw_offset),
            hex32(row.raw_size),
            row.blocks,
            entropy
        );
    }

    Ok(())
}
