//! PE metadata provider.
//!
//! Opens a sample, validates the MZ and PE signatures, and decodes the section
//! table with `goblin`. Only the fields the engine needs survive into
//! [`SectionDescriptor`].

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use goblin::pe::header::{
    CoffHeader, Header, PE_MAGIC, SIZEOF_COFF_HEADER, SIZEOF_PE_MAGIC,
};
use goblin::pe::section_table::SIZEOF_SECTION_TABLE;

use crate::error::{EngineError, Result};
use crate::model::{normalize_section_name, SectionDescriptor};

/// Bytes read from the start of the file before decoding headers.
const HEADER_WINDOW: u64 = 64 * 1024;

/// Offset of `e_lfanew` inside the DOS header.
const PE_POINTER_OFFSET: usize = 0x3c;

/// An opened, validated PE sample.
#[derive(Debug)]
pub struct PeSample {
    path: PathBuf,
    file: File,
    file_len: u64,
    sections: Vec<SectionDescriptor>,
}

impl PeSample {
    /// Open `path` and decode its section table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).map_err(|e| EngineError::io("open", &path, e))?;
        let file_len = file.metadata().map_err(|e| EngineError::io("stat", &path, e))?.len();

        let mut window = read_prefix(&mut file, &path, file_len.min(HEADER_WINDOW))?;
        let (coff, table_offset) = parse_headers(&window)?;

        let table_end =
            table_offset as u64 + coff.number_of_sections as u64 * SIZEOF_SECTION_TABLE as u64;
        if table_end > file_len {
            return Err(EngineError::Format(format!(
                "truncated section header: table ends at {table_end:#x}, file is {file_len:#x} bytes"
            )));
        }
        if table_end > window.len() as u64 {
            window = read_prefix(&mut file, &path, table_end)?;
        }

        let mut offset = table_offset;
        let tables = coff.sections(&window, &mut offset)?;
        let sections = tables
            .iter()
            .enumerate()
            .map(|(index, table)| SectionDescriptor {
                index,
                raw_offset: table.pointer_to_raw_data as u64,
                raw_size: table.size_of_raw_data as u64,
                characteristics: table.characteristics,
                name: normalize_section_name(&table.name),
            })
            .collect();

        Ok(Self { path, file, file_len, sections })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    /// Sample path and a seekable handle on its bytes, borrowed together.
    pub fn source(&mut self) -> (&Path, &mut File) {
        (&self.path, &mut self.file)
    }
}

fn read_prefix(file: &mut File, path: &Path, len: u64) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(0)).map_err(|e| EngineError::io("seek", path, e))?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).map_err(|e| EngineError::io("read", path, e))?;
    Ok(buf)
}

/// Validate signatures and return the COFF header plus the section table offset.
fn parse_headers(bytes: &[u8]) -> Result<(CoffHeader, usize)> {
    if bytes.len() < 2 || &bytes[..2] != b"MZ" {
        return Err(EngineError::Format("missing MZ signature".into()));
    }
    let pointer_field = bytes
        .get(PE_POINTER_OFFSET..PE_POINTER_OFFSET + 4)
        .ok_or_else(|| EngineError::Format("truncated DOS header".into()))?;
    let pe_pointer = u32::from_le_bytes([
        pointer_field[0],
        pointer_field[1],
        pointer_field[2],
        pointer_field[3],
    ]) as usize;
    match bytes.get(pe_pointer..pe_pointer + SIZEOF_PE_MAGIC) {
        Some(sig) if u32::from_le_bytes([sig[0], sig[1], sig[2], sig[3]]) == PE_MAGIC => {}
        _ => {
            return Err(EngineError::Format(format!("missing PE signature at {pe_pointer:#x}")))
        }
    }

    let header = Header::parse(bytes)?;
    let table_offset = header.dos_header.pe_pointer as usize
        + SIZEOF_PE_MAGIC
        + SIZEOF_COFF_HEADER
        + header.coff_header.size_of_optional_header as usize;
    Ok((header.coff_header, table_offset))
}
