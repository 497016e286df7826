//! Binary format for persisted maps.
//!
//! ## Format Layout
//!
//! ```text
//! +------------------+
//! | Header (16 bytes)|
//! +------------------+
//! | Map payload      |
//! | (bincode)        |
//! +------------------+
//! ```
//!
//! ### Header (16 bytes)
//! - Magic number (4 bytes): "SOFM"
//! - Version (2 bytes)
//! - Flags (2 bytes): reserved, must be 0
//! - Payload length (8 bytes)
//!
//! All integers are little-endian. The payload holds grid geometry, map
//! radius, weight bounds and every node (weights, position, id) in order.
//! `f64` values are stored bit-for-bit.

use crate::error::{Result, SofmError};
use crate::som::Map;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Magic number for persisted maps.
const MAGIC: &[u8; 4] = b"SOFM";

/// Current format version.
const VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 16;

/// Persisted map header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    /// Format version.
    pub version: u16,
    /// Flags.
    pub flags: u16,
    /// Length of the bincode payload in bytes.
    pub payload_len: u64,
}

impl MapHeader {
    /// Creates a header for the current version.
    pub fn new(payload_len: u64) -> Self {
        Self {
            version: VERSION,
            flags: 0,
            payload_len,
        }
    }

    /// Writes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Reads and checks a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(SofmError::Deserialization("Header too short".to_string()));
        }

        if &bytes[0..4] != MAGIC {
            return Err(SofmError::Deserialization(
                "Invalid magic number".to_string(),
            ));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(SofmError::Deserialization(format!(
                "Unsupported format version {} (expected {})",
                version, VERSION
            )));
        }

        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        if flags != 0 {
            return Err(SofmError::Deserialization(format!(
                "Unknown flags {:#06x}",
                flags
            )));
        }

        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[8..16]);

        Ok(Self {
            version,
            flags,
            payload_len: u64::from_le_bytes(len),
        })
    }
}

/// Binary format reader/writer for maps.
pub struct MapFormat;

impl MapFormat {
    /// Serializes a map into any writer.
    pub fn write<W: Write>(map: &Map, mut writer: W) -> Result<()> {
        let payload = bincode::serialize(map)
            .map_err(|e| SofmError::Deserialization(format!("Failed to encode map: {}", e)))?;
        let header = MapHeader::new(payload.len() as u64);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(&payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserializes a map from any reader.
    ///
    /// Truncated or inconsistent content is a deserialization error; only
    /// failures of the underlying reader surface as I/O errors.
    pub fn read<R: Read>(mut reader: R) -> Result<Map> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        read_exact_or_truncated(&mut reader, &mut header_bytes, "header")?;
        let header = MapHeader::from_bytes(&header_bytes)?;

        let mut payload = Vec::new();
        reader
            .by_ref()
            .take(header.payload_len)
            .read_to_end(&mut payload)?;
        if (payload.len() as u64) < header.payload_len {
            return Err(SofmError::Deserialization(format!(
                "Payload truncated: {} of {} bytes",
                payload.len(),
                header.payload_len
            )));
        }

        let map: Map = bincode::deserialize(&payload)?;
        map.check_structure()
            .map_err(|e| SofmError::Deserialization(format!("Inconsistent map: {}", e)))?;

        Ok(map)
    }

    /// Writes a map to a file, creating or truncating it.
    pub fn write_file<P: AsRef<Path>>(path: P, map: &Map) -> Result<()> {
        let file = File::create(path)?;
        Self::write(map, BufWriter::new(file))
    }

    /// Reads a map from a file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Map> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }
}

fn read_exact_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => SofmError::Deserialization(format!("{} truncated", what)),
        _ => SofmError::Io(e),
    })
}
