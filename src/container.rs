//! Chunked container I/O: the layered reader/writer implementing the
//! virtual-address-space abstraction described in spec §4.3 — a logical
//! stream of decompressed bytes exposed over chunked compressed storage.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::bytes::{self, ReadExt, WriteExt};
use crate::chunk::{self, ChunkCodec, CompressionType, CHUNK_SIZE};
use crate::errors::{PackageError, Result};

const END_OF_CHUNK: u8 = 0xBE;
const END_OF_FILE: u8 = 0xFF;

const HADES_VERSION: i32 = 7;
const PYRE_TRANSISTOR_VERSION: i32 = 5;

/// Accepted package version numbers (5 for Pyre/Transistor, 7 for Hades).
pub const SUPPORTED_VERSIONS: [i32; 2] = [PYRE_TRANSISTOR_VERSION, HADES_VERSION];

fn header_adjustment(chunk: u64) -> u64 {
    if chunk == 0 {
        4
    } else {
        0
    }
}

fn chunk_window(chunk: u64) -> usize {
    (CHUNK_SIZE - header_adjustment(chunk)) as usize
}

fn io_err(e: PackageError) -> io::Error {
    match e {
        PackageError::IoError(io_e) => io_e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

/// Reader over a package's (or manifest's) chunked, compressed body,
/// presenting it as a flat, seekable, decompressed byte stream.
pub struct PackageReader<R> {
    raw: R,
    codec: Box<dyn ChunkCodec>,
    compression: CompressionType,
    version: i32,
    is_manifest: bool,
    chunk: u64,
    offset: u64,
    buf: Option<Vec<u8>>,
    buf_pos: usize,
    chunk_locations: Vec<u64>,
}

impl<R: Read + Write + Seek> PackageReader<R> {
    /// Opens `raw` for reading, parsing the 4-byte header.
    pub fn new(mut raw: R, is_manifest: bool) -> Result<Self> {
        if raw.stream_position()? != 0 {
            return Err(PackageError::MalformedInput(
                "attempted to read header while not at start of stream".to_string(),
            ));
        }

        let comp_code = raw.read_u8_val()?;
        let codec = chunk::by_code(comp_code)?;
        let compression = CompressionType::from_type_code(comp_code)
            .expect("by_code already validated this code");
        let mut filler = [0u8; 2];
        raw.read_exact(&mut filler)?;
        let version = raw.read_u8_val()? as i32;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(PackageError::UnsupportedVersion(version));
        }

        Ok(Self {
            raw,
            codec,
            compression,
            version,
            is_manifest,
            chunk: 0,
            offset: 4,
            buf: None,
            buf_pos: 0,
            chunk_locations: vec![4],
        })
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn is_manifest(&self) -> bool {
        self.is_manifest
    }

    /// The virtual tell value: `chunk * CHUNK_SIZE + offset`.
    pub fn tell(&self) -> u64 {
        self.chunk * CHUNK_SIZE + self.offset
    }

    /// Whether the stream has no more bytes: the raw stream is at EOF and
    /// the current chunk buffer (if any) is exhausted.
    pub fn is_eof(&mut self) -> Result<bool> {
        let buffer_exhausted = match &self.buf {
            Some(buf) => self.buf_pos >= buf.len(),
            None => true,
        };
        Ok(buffer_exhausted && bytes::is_eof(&mut self.raw)?)
    }

    /// Reads the next `n` bytes of decompressed data, crossing chunk
    /// boundaries transparently. Returns fewer than `n` bytes only at EOF.
    pub fn read_n(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if self.buf.is_none() {
                if !self.materialize_current_chunk()? {
                    break;
                }
            }
            let buf = self.buf.as_ref().expect("just materialized");
            if self.buf_pos >= buf.len() {
                self.advance_to_next_chunk()?;
                continue;
            }
            let available = buf.len() - self.buf_pos;
            let take = available.min(n - out.len());
            out.extend_from_slice(&buf[self.buf_pos..self.buf_pos + take]);
            self.buf_pos += take;
            self.offset += take as u64;
        }
        Ok(out)
    }

    /// Absolute seek to virtual position `pos`. Only read-mode, only
    /// `SeekFrom::Start`-style absolute seeks are supported.
    pub fn seek_to(&mut self, pos: u64) -> Result<u64> {
        let target_chunk = pos / CHUNK_SIZE;
        let target_offset = pos % CHUNK_SIZE;

        if target_chunk != self.chunk {
            self.seek_to_chunk(target_chunk)?;
        } else {
            // Same chunk: the raw stream has likely advanced past this
            // chunk's start while draining it, so rewind before deciding
            // whether to re-materialize.
            self.raw
                .seek(SeekFrom::Start(self.chunk_locations[self.chunk as usize]))?;
            self.buf = None;
            self.buf_pos = 0;
        }
        self.offset = target_offset;

        if target_chunk == 0 && target_offset <= 4 {
            self.buf = None;
            self.buf_pos = 0;
        } else {
            let content_offset = (target_offset - header_adjustment(target_chunk)) as usize;
            if content_offset > 0 {
                self.materialize_current_chunk()?;
                self.buf_pos = content_offset;
            } else {
                self.buf = None;
                self.buf_pos = 0;
            }
        }
        Ok(self.tell())
    }

    /// Reads the next entry's leading type byte, transparently advancing
    /// across end-of-chunk sentinels. Returns `None` at end-of-file.
    pub fn next_entry_code(&mut self) -> Result<Option<u8>> {
        loop {
            if self.is_eof()? {
                return Ok(None);
            }
            let b = self.read_u8_val()?;
            match b {
                END_OF_CHUNK => self.advance_to_next_chunk()?,
                END_OF_FILE => return Ok(None),
                other => return Ok(Some(other)),
            }
        }
    }

    fn materialize_current_chunk(&mut self) -> Result<bool> {
        if bytes::is_eof(&mut self.raw)? {
            return Ok(false);
        }
        self.record_chunk_location();
        let window = chunk_window(self.chunk);
        let data = self.codec.read_chunk(&mut self.raw, window)?;
        self.buf = Some(data);
        self.buf_pos = 0;
        Ok(true)
    }

    fn advance_to_next_chunk(&mut self) -> Result<()> {
        self.chunk += 1;
        self.offset = 0;
        self.buf = None;
        self.buf_pos = 0;
        self.record_chunk_location();
        Ok(())
    }

    fn seek_to_chunk(&mut self, target: u64) -> Result<()> {
        if (target as usize) < self.chunk_locations.len() {
            self.raw
                .seek(SeekFrom::Start(self.chunk_locations[target as usize]))?;
            self.chunk = target;
            self.buf = None;
            self.buf_pos = 0;
        } else {
            let last_known = (self.chunk_locations.len() - 1) as u64;
            self.raw
                .seek(SeekFrom::Start(self.chunk_locations[last_known as usize]))?;
            self.chunk = last_known;
            self.buf = None;
            self.buf_pos = 0;
            while self.chunk < target {
                self.skip_current_chunk()?;
            }
        }
        Ok(())
    }

    fn skip_current_chunk(&mut self) -> Result<()> {
        let window = chunk_window(self.chunk);
        self.codec.skip_chunk(&mut self.raw, window)?;
        self.chunk += 1;
        self.offset = 0;
        self.buf = None;
        self.buf_pos = 0;
        self.record_chunk_location();
        Ok(())
    }

    fn record_chunk_location(&mut self) {
        if self.chunk_locations.len() <= self.chunk as usize {
            let pos = self.raw.stream_position().unwrap_or(0);
            self.chunk_locations.push(pos);
        }
    }
}

impl<R: Read + Write + Seek> Read for PackageReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.read_n(buf.len()).map_err(io_err)?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

/// Writer over a package's (or manifest's) chunked, compressed body.
///
/// Writers are append-only and not seekable — `PackageReader::seek_to` has
/// no counterpart here.
pub struct PackageWriter<W> {
    raw: W,
    codec: Box<dyn ChunkCodec>,
    compression: CompressionType,
    version: i32,
    chunk: u64,
    write_buf: Vec<u8>,
    write_pos: usize,
    closed: bool,
}

impl<W: Read + Write + Seek> PackageWriter<W> {
    /// Opens `raw` for writing, immediately writing the 4-byte header.
    pub fn new(mut raw: W, compression: CompressionType, version: i32) -> Result<Self> {
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(PackageError::UnsupportedVersion(version));
        }
        let codec = chunk::by_name(compression.name())?;
        raw.write_u8_val(codec.type_code())?;
        raw.write_all(&[0, 0])?;
        raw.write_u8_val(version as u8)?;

        let mut writer = Self {
            raw,
            codec,
            compression,
            version,
            chunk: 0,
            write_buf: Vec::new(),
            write_pos: 0,
            closed: false,
        };
        writer.reset_write_buf();
        Ok(writer)
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Writes `b` as the contents of one entry or other indivisible record,
    /// flushing the current chunk first if it wouldn't fit.
    pub fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        if b.len() > CHUNK_SIZE as usize {
            return Err(PackageError::EncodingError(format!(
                "cannot write more than {} bytes at once",
                CHUNK_SIZE
            )));
        }

        // -1: room must remain for the end-of-chunk/end-of-file sentinel.
        let available = self.write_buf.len() - self.write_pos - 1;
        if b.len() > available {
            self.flush_chunk(false)?;
        }

        self.write_buf[self.write_pos..self.write_pos + b.len()].copy_from_slice(b);
        self.write_pos += b.len();
        Ok(())
    }

    /// Flushes the final chunk with the end-of-file sentinel and releases
    /// the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_chunk(true)?;
        self.closed = true;
        Ok(())
    }

    fn flush_chunk(&mut self, closing: bool) -> Result<()> {
        let sentinel = if closing { END_OF_FILE } else { END_OF_CHUNK };
        self.write_buf[self.write_pos] = sentinel;
        self.write_pos += 1;

        if self.compression == CompressionType::Uncompressed {
            let slice = self.write_buf[..self.write_pos].to_vec();
            self.codec.write_chunk(&mut self.raw, &slice)?;
        } else {
            let slice = self.write_buf.clone();
            self.codec.write_chunk(&mut self.raw, &slice)?;
        }

        self.chunk += 1;
        self.reset_write_buf();
        Ok(())
    }

    fn reset_write_buf(&mut self) {
        let size = chunk_window(self.chunk);
        self.write_buf = vec![0u8; size];
        self.write_pos = 0;
    }
}

impl<W: Read + Write + Seek> Drop for PackageWriter<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<W: Read + Write + Seek> Write for PackageWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io_err)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn empty_package(version: i32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut w = PackageWriter::new(&mut out, CompressionType::Uncompressed, version)
                .unwrap();
            w.close().unwrap();
        }
        out.into_inner()
    }

    #[test]
    fn header_round_trip() {
        for version in SUPPORTED_VERSIONS {
            let bytes = empty_package(version);
            let reader = PackageReader::new(Cursor::new(bytes), false).unwrap();
            assert_eq!(reader.compression(), CompressionType::Uncompressed);
            assert_eq!(reader.version(), version);
        }
    }

    #[test]
    fn scenario_s1_empty_package_bytes() {
        let bytes = empty_package(7);
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x07, 0xFF]);
    }

    #[test]
    fn tell_after_header_is_four() {
        let bytes = empty_package(7);
        let reader = PackageReader::new(Cursor::new(bytes), false).unwrap();
        assert_eq!(reader.tell(), 4);
    }

    #[test]
    fn scenario_s2_include_entry_bytes() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut w =
                PackageWriter::new(&mut out, CompressionType::Uncompressed, 7).unwrap();
            let mut body = Vec::new();
            body.push(0xCCu8);
            body.write_string("Packages\\Menus").unwrap();
            w.write_bytes(&body).unwrap();
            w.close().unwrap();
        }
        let out = out.into_inner();
        let tail = &out[4..];
        let mut expected = vec![0xCC, 0x10];
        expected.extend_from_slice(b"Packages\\Menus");
        expected.push(0xFF);
        assert_eq!(tail, expected.as_slice());
    }

    #[test]
    fn chunk_boundary_forces_new_chunk() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut w =
                PackageWriter::new(&mut out, CompressionType::Uncompressed, 7).unwrap();
            let big = vec![0x41u8; chunk_window(0) - 2];
            w.write_bytes(&big).unwrap();
            w.write_bytes(&[0xCC, 0x01, b'a']).unwrap();
            w.close().unwrap();
        }
        let out = out.into_inner();
        // header (4) + chunk0 payload (CHUNK_SIZE - 4, truncated: big bytes + sentinel)
        assert!(out.len() < (2 * CHUNK_SIZE) as usize);
        assert!(out.len() > CHUNK_SIZE as usize);
    }

    #[test]
    fn seek_then_read_matches_scenario_s5() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut w =
                PackageWriter::new(&mut out, CompressionType::Uncompressed, 7).unwrap();
            let mut a = vec![0xCCu8];
            a.write_string("a").unwrap();
            let mut b = vec![0xCCu8];
            b.write_string("b").unwrap();
            w.write_bytes(&a).unwrap();
            w.write_bytes(&b).unwrap();
            w.close().unwrap();
        }

        let mut reader = PackageReader::new(Cursor::new(out.into_inner()), false).unwrap();
        reader.seek_to(4).unwrap();
        let code = reader.next_entry_code().unwrap();
        assert_eq!(code, Some(0xCC));
        assert_eq!(reader.read_string().unwrap(), "a");

        reader.seek_to(4).unwrap();
        assert_eq!(reader.next_entry_code().unwrap(), Some(0xCC));
        assert_eq!(reader.read_string().unwrap(), "a");
        assert_eq!(reader.next_entry_code().unwrap(), Some(0xCC));
        assert_eq!(reader.read_string().unwrap(), "b");
        assert_eq!(reader.next_entry_code().unwrap(), None);
    }
}
