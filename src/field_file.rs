//! The field file format, as uploaded by the renderer:
//!
//! ```text
//! byte 0        width, 1 to 255
//! byte 1        height, 1 to 255
//! byte 2 ..     width * height quantized distances, row-major, top-left first
//! ```
//!
//! There is no magic number and no version. A reader only checks
//! that the file size matches the declared dimensions.
//! Bright bytes are far outside the shape, dark bytes are inside.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use crate::error::{Error, Result};
use crate::options::check_dimension;

/// Number of header bytes before the samples start.
pub const HEADER_SIZE: usize = 2;

/// A grid of quantized distances, ready to be written.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QuantizedField {
    width: u8,
    height: u8,

    /// Row-major quantized distances.
    bytes: Vec<u8>,
}

impl QuantizedField {
    /// Fails if a dimension does not fit into the header
    /// or if the byte count does not match the dimensions.
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;

        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(Error::SizeMismatch { expected: HEADER_SIZE + expected, actual: HEADER_SIZE + bytes.len() });
        }

        Ok(QuantizedField { width: width as u8, height: height as u8, bytes })
    }

    #[inline]
    pub fn width(&self) -> u32 { self.width as u32 }

    #[inline]
    pub fn height(&self) -> u32 { self.height as u32 }

    #[inline]
    pub fn bytes(&self) -> &[u8] { &self.bytes }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.bytes[self.width as usize * y as usize + x as usize]
    }

    /// The complete file contents, header included.
    pub fn encode(&self) -> Vec<u8> {
        let mut file = Vec::with_capacity(HEADER_SIZE + self.bytes.len());
        file.push(self.width);
        file.push(self.height);
        file.extend_from_slice(&self.bytes);
        file
    }

    /// Parse complete file contents.
    pub fn decode(file: &[u8]) -> Result<Self> {
        if file.len() < HEADER_SIZE {
            return Err(Error::SizeMismatch { expected: HEADER_SIZE, actual: file.len() });
        }

        let (width, height) = (file[0] as u32, file[1] as u32);
        check_dimension("width", width)?;
        check_dimension("height", height)?;

        let expected = HEADER_SIZE + width as usize * height as usize;
        if file.len() != expected {
            return Err(Error::SizeMismatch { expected, actual: file.len() });
        }

        Self::new(width, height, file[HEADER_SIZE ..].to_vec())
    }

    pub fn write(&self, write: &mut impl Write) -> Result<()> {
        write.write_all(&self.encode()).map_err(Error::io("write field"))?;
        write.flush().map_err(Error::io("write field"))
    }

    pub fn read(read: &mut impl Read) -> Result<Self> {
        let mut file = Vec::new();
        read.read_to_end(&mut file).map_err(Error::io("read field"))?;
        Self::decode(&file)
    }

    /// Create or replace the file at the path.
    /// The contents are written to a temporary file next to the destination
    /// and then renamed, so a failed write never leaves a truncated field behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temporary = tempfile::NamedTempFile::new_in(directory)
            .map_err(Error::io("create temporary field"))?;

        self.write(&mut temporary)?;
        temporary.as_file().sync_all().map_err(Error::io("write field"))?;

        temporary.persist(path)
            .map_err(|error| Error::io("replace field")(error.error))?;

        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = fs::read(path).map_err(Error::io("read field"))?;
        Self::decode(&file)
    }
}
