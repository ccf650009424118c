#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Minimal i386 PE with one section table entry per `(name, data)` pair.
///
/// Headers occupy the first 0x200 bytes; section data follows back to back.
pub fn build_pe(sections: &[(&[u8], Vec<u8>)]) -> Vec<u8> {
    let mut bytes = vec![0u8; 0x200];
    bytes[0..2].copy_from_slice(b"MZ");
    bytes[0x3c..0x40].copy_from_slice(&0x80u32.to_le_bytes());
    bytes[0x80..0x84].copy_from_slice(b"PE\0\0");
    bytes[0x84..0x86].copy_from_slice(&0x14cu16.to_le_bytes());
    bytes[0x86..0x88].copy_from_slice(&(sections.len() as u16).to_le_bytes());
    bytes[0x96..0x98].copy_from_slice(&0x0102u16.to_le_bytes());

    let mut offset = 0x200u32;
    for (i, (name, data)) in sections.iter().enumerate() {
        let entry = 0x98 + i * 40;
        bytes[entry..entry + name.len()].copy_from_slice(name);
        let size = data.len() as u32;
        let ptr = if size == 0 { 0 } else { offset };
        bytes[entry + 16..entry + 20].copy_from_slice(&size.to_le_bytes());
        bytes[entry + 20..entry + 24].copy_from_slice(&ptr.to_le_bytes());
        bytes[entry + 36..entry + 40].copy_from_slice(&0x6000_0020u32.to_le_bytes());
        offset += size;
    }
    for (_, data) in sections {
        bytes.extend_from_slice(data);
    }
    bytes
}

/// Write a two-section sample (`.text` alternating 0xAA/0x55, empty `.bss`).
pub fn write_sample(dir: &Path, file_name: &str) -> PathBuf {
    let text: Vec<u8> = (0..512).map(|i| if i % 2 == 0 { 0xAA } else { 0x55 }).collect();
    let bytes = build_pe(&[(b".text", text), (b".bss", Vec::new())]);
    let path = dir.join(file_name);
    fs::write(&path, bytes).unwrap();
    path
}
