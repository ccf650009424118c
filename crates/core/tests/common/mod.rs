#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const PE_OFFSET: usize = 0x80;
pub const SECTION_TABLE_OFFSET: usize = PE_OFFSET + 4 + 20;
pub const DATA_OFFSET: usize = 0x200;

/// One section of a synthetic PE image. Empty data gives a zero-size section.
pub struct FixtureSection {
    pub name: &'static [u8],
    pub data: Vec<u8>,
    pub characteristics: u32,
}

impl FixtureSection {
    pub fn new(name: &'static [u8], data: Vec<u8>) -> Self {
        Self { name, data, characteristics: 0x6000_0020 }
    }
}

/// Minimal i386 PE: DOS header, PE signature, COFF header without an
/// optional header, section table at 0x98, section data from 0x200.
pub fn build_pe(sections: &[FixtureSection]) -> Vec<u8> {
    let mut bytes = vec![0u8; DATA_OFFSET];
    bytes[0..2].copy_from_slice(b"MZ");
    bytes[0x3c..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());
    bytes[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

    let coff = PE_OFFSET + 4;
    bytes[coff..coff + 2].copy_from_slice(&0x14cu16.to_le_bytes());
    bytes[coff + 2..coff + 4].copy_from_slice(&(sections.len() as u16).to_le_bytes());
    bytes[coff + 18..coff + 20].copy_from_slice(&0x0102u16.to_le_bytes());

    let mut data_offset = DATA_OFFSET;
    for (i, section) in sections.iter().enumerate() {
        let entry = SECTION_TABLE_OFFSET + i * 40;
        let mut name = [0u8; 8];
        name[..section.name.len()].copy_from_slice(section.name);
        bytes[entry..entry + 8].copy_from_slice(&name);
        let size = section.data.len() as u32;
        let ptr = if size == 0 { 0 } else { data_offset as u32 };
        bytes[entry + 8..entry + 12].copy_from_slice(&size.to_le_bytes());
        bytes[entry + 12..entry + 16].copy_from_slice(&(0x1000u32 * (i as u32 + 1)).to_le_bytes());
        bytes[entry + 16..entry + 20].copy_from_slice(&size.to_le_bytes());
        bytes[entry + 20..entry + 24].copy_from_slice(&ptr.to_le_bytes());
        bytes[entry + 36..entry + 40].copy_from_slice(&section.characteristics.to_le_bytes());
        data_offset += section.data.len();
    }
    for section in sections {
        bytes.extend_from_slice(&section.data);
    }
    bytes
}

pub fn write_sample(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// 512 bytes alternating 0xAA, 0x55.
pub fn alternating_section() -> Vec<u8> {
    (0..512).map(|i| if i % 2 == 0 { 0xAA } else { 0x55 }).collect()
}
