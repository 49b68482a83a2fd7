//! Level loading and saving
//!
//! The level format is binary: a `{version, width, height, layer_count}`
//! header followed by `layer_count` tile planes, every integer a big-endian
//! `i32`. Planes are stored in the fixed disk order [`Layer::DISK_ORDER`],
//! which differs from the logical layer order; both directions go through
//! the same table.
//!
//! A "restore" variant prefixes the payload with a NUL-terminated document
//! name so crash recovery can reopen the right tab.

use std::fs;
use std::path::Path;

use log::debug;

use super::{limits, Layer, Level};

/// Error type for level serialization and file I/O
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    /// Structurally broken data: truncated, wrong version, bad layer count
    Format(String),
    /// Well-formed data with out-of-range contents
    Validation(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "IO error: {}", e),
            LevelError::Format(e) => write!(f, "Format error: {}", e),
            LevelError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

fn push_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Cursor over raw level bytes
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_i32(&mut self) -> Result<i32, LevelError> {
        let end = self.pos + 4;
        if end > self.data.len() {
            return Err(LevelError::Format("unexpected end of data".to_string()));
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(i32::from_be_bytes(bytes))
    }

    /// Read a NUL-terminated UTF-8 string, consuming the terminator
    fn read_cstring(&mut self) -> Result<String, LevelError> {
        let rest = &self.data[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| LevelError::Format("missing NUL terminator".to_string()))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|e| LevelError::Format(format!("invalid UTF-8 in name: {}", e)))?
            .to_string();
        self.pos += nul + 1;
        Ok(s)
    }

    fn at_end(&self) -> bool {
        self.pos == self.data.len()
    }
}

/// Serialize a level into the binary format
pub fn serialize_level(level: &Level) -> Vec<u8> {
    let cells = (level.width() * level.height()) as usize;
    let mut buf = Vec::with_capacity(16 + cells * limits::LAYER_COUNT * 4);
    push_i32(&mut buf, level.version);
    push_i32(&mut buf, level.width());
    push_i32(&mut buf, level.height());
    push_i32(&mut buf, limits::LAYER_COUNT as i32);
    for layer in Layer::DISK_ORDER {
        for &id in level.layer_tiles(layer) {
            push_i32(&mut buf, id);
        }
    }
    buf
}

/// Parse a level from binary data
pub fn parse_level_data(bytes: &[u8]) -> Result<Level, LevelError> {
    let mut reader = Reader::new(bytes);
    let level = parse_level_payload(&mut reader)?;
    if !reader.at_end() {
        return Err(LevelError::Format(format!(
            "{} trailing bytes after level data",
            bytes.len() - reader.pos
        )));
    }
    Ok(level)
}

fn parse_level_payload(reader: &mut Reader) -> Result<Level, LevelError> {
    let version = reader.read_i32()?;
    if version != limits::FORMAT_VERSION {
        return Err(LevelError::Format(format!(
            "unsupported level version {} (expected {})",
            version,
            limits::FORMAT_VERSION
        )));
    }

    let width = reader.read_i32()?;
    let height = reader.read_i32()?;
    if width < limits::MIN_DIM || width > limits::MAX_DIM {
        return Err(LevelError::Validation(format!(
            "level width {} outside {}..={}",
            width,
            limits::MIN_DIM,
            limits::MAX_DIM
        )));
    }
    if height < limits::MIN_DIM || height > limits::MAX_DIM {
        return Err(LevelError::Validation(format!(
            "level height {} outside {}..={}",
            height,
            limits::MIN_DIM,
            limits::MAX_DIM
        )));
    }

    let layer_count = reader.read_i32()?;
    if layer_count != limits::LAYER_COUNT as i32 {
        return Err(LevelError::Format(format!(
            "unexpected layer count {} (expected {})",
            layer_count,
            limits::LAYER_COUNT
        )));
    }

    let cells = (width * height) as usize;
    let mut level = Level::new(width, height);
    level.version = version;
    for layer in Layer::DISK_ORDER {
        for i in 0..cells {
            let id = reader.read_i32()?;
            level.layer_tiles_mut(layer)[i] = id;
        }
    }
    Ok(level)
}

/// Save a level to a file
pub fn save_level<P: AsRef<Path>>(level: &Level, path: P) -> Result<(), LevelError> {
    let bytes = serialize_level(level);
    fs::write(path.as_ref(), bytes)?;
    debug!("saved level to {}", path.as_ref().display());
    Ok(())
}

/// Load a level from a file
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<Level, LevelError> {
    let bytes = fs::read(path.as_ref())?;
    let level = parse_level_data(&bytes)?;
    debug!(
        "loaded {}x{} level from {}",
        level.width(),
        level.height(),
        path.as_ref().display()
    );
    Ok(level)
}

/// Serialize the crash-restore variant: NUL-terminated name, then the level
pub fn serialize_restore(level: &Level, name: &str) -> Result<Vec<u8>, LevelError> {
    if name.contains('\0') {
        return Err(LevelError::Format(
            "document name must not contain NUL".to_string(),
        ));
    }
    let mut buf = Vec::new();
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    buf.extend_from_slice(&serialize_level(level));
    Ok(buf)
}

/// Parse the crash-restore variant, returning the document name and level
pub fn parse_restore_data(bytes: &[u8]) -> Result<(String, Level), LevelError> {
    let mut reader = Reader::new(bytes);
    let name = reader.read_cstring()?;
    let level = parse_level_payload(&mut reader)?;
    if !reader.at_end() {
        return Err(LevelError::Format(format!(
            "{} trailing bytes after restore data",
            bytes.len() - reader.pos
        )));
    }
    Ok((name, level))
}

/// Save the crash-restore variant to a file
pub fn save_restore<P: AsRef<Path>>(level: &Level, name: &str, path: P) -> Result<(), LevelError> {
    let bytes = serialize_restore(level, name)?;
    fs::write(path.as_ref(), bytes)?;
    debug!("saved restore file to {}", path.as_ref().display());
    Ok(())
}

/// Load the crash-restore variant from a file
pub fn load_restore<P: AsRef<Path>>(path: P) -> Result<(String, Level), LevelError> {
    let bytes = fs::read(path.as_ref())?;
    parse_restore_data(&bytes)
}
