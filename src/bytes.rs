//! Byte-stream primitives shared by the container, entry, and chunk layers.
//!
//! Everything here is big-endian, matching the package format. Strings are
//! ASCII with a one-byte length prefix (`read_string`/`write_string`) or
//! UTF-8 with a four-byte signed length prefix (`read_big_string`/
//! `write_big_string`). `read_7bit_int`/`write_7bit_int` implement the
//! little-endian base-128 varint used for XNB payload headers.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::{PackageError, Result};

/// Maximum length of a `read_string`/`write_string` payload.
pub const MAX_SHORT_STRING_LEN: usize = 255;

/// Reading primitives for any byte-oriented stream used by this crate.
pub trait ReadExt: Read {
    fn read_u8_val(&mut self) -> Result<u8> {
        Ok(self.read_u8().map_err(eof_to_malformed)?)
    }

    fn read_i32_be(&mut self) -> Result<i32> {
        Ok(self
            .read_i32::<BigEndian>()
            .map_err(eof_to_malformed)?)
    }

    fn read_f32_be(&mut self) -> Result<f32> {
        Ok(self
            .read_f32::<BigEndian>()
            .map_err(eof_to_malformed)?)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u8_val()? as usize;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).map_err(eof_to_malformed)?;
        String::from_utf8(buf)
            .map_err(|e| PackageError::MalformedInput(format!("non-ASCII string: {}", e)))
    }

    fn read_big_string(&mut self) -> Result<String> {
        let len = self.read_i32_be()?;
        if len < 0 {
            return Err(PackageError::MalformedInput(format!(
                "negative big string length: {}",
                len
            )));
        }
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf).map_err(eof_to_malformed)?;
        String::from_utf8(buf)
            .map_err(|e| PackageError::MalformedInput(format!("non-UTF8 big string: {}", e)))
    }

    fn read_7bit_int(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8_val()?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(result)
    }
}

/// Writing primitives for any byte-oriented stream used by this crate.
pub trait WriteExt: Write {
    fn write_u8_val(&mut self, v: u8) -> Result<()> {
        self.write_u8(v)?;
        Ok(())
    }

    fn write_i32_be(&mut self, v: i32) -> Result<()> {
        self.write_i32::<BigEndian>(v)?;
        Ok(())
    }

    fn write_f32_be(&mut self, v: f32) -> Result<()> {
        self.write_f32::<BigEndian>(v)?;
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        if s.len() > MAX_SHORT_STRING_LEN {
            return Err(PackageError::EncodingError(format!(
                "string exceeds maximum length for packing: {}",
                s.len()
            )));
        }
        if !s.is_ascii() {
            return Err(PackageError::EncodingError(format!(
                "string is not ASCII: {:?}",
                s
            )));
        }
        self.write_u8(s.len() as u8)?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_big_string(&mut self, s: &str) -> Result<()> {
        self.write_i32::<BigEndian>(s.len() as i32)?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_7bit_int(&mut self, mut value: u64) -> Result<()> {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
                self.write_u8(byte)?;
            } else {
                self.write_u8(byte)?;
                break;
            }
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}
impl<W: Write + ?Sized> WriteExt for W {}

/// Non-destructive end-of-stream probe: attempts a one-byte read and, if the
/// stream wasn't empty, rewinds by one byte.
pub fn is_eof<S: Read + Seek>(stream: &mut S) -> Result<bool> {
    let mut buf = [0u8; 1];
    match stream.read(&mut buf)? {
        0 => Ok(true),
        _ => {
            stream.seek(SeekFrom::Current(-1))?;
            Ok(false)
        }
    }
}

fn eof_to_malformed(e: std::io::Error) -> PackageError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        PackageError::MalformedInput("unexpected end of input".to_string())
    } else {
        PackageError::IoError(e)
    }
}
