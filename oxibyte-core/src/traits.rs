//! Capability contracts for pluggable byte transports.
//!
//! The stream engine never talks to files, sockets, or pipes directly.
//! It pulls raw bytes through [`ByteSource`] and pushes them through
//! [`ByteSink`]; implementing one of these single-method traits is all
//! external code has to do to plug a concrete transport into the engine.

use crate::error::{Result, StreamError};
use std::io::{self, Read, Write};

/// A capability that produces bytes on demand.
///
/// # Contract
///
/// `fill` writes up to `buf.len()` bytes into `buf` and returns how many
/// were written. Returning `Ok(0)` signals end-of-stream; the source may
/// be called again after that and must keep returning `Ok(0)`.
pub trait ByteSource {
    /// Pull the next chunk of bytes into `buf`.
    ///
    /// # Returns
    ///
    /// The number of bytes written; 0 means the source is exhausted.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// A capability that consumes bytes.
///
/// # Contract
///
/// `write` must consume the whole slice or fail. A zero-length slice must
/// be accepted without inspecting the data.
pub trait ByteSink {
    /// Push a chunk of bytes to the transport.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).fill(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).fill(buf)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }
}

impl ByteSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapter exposing any [`std::io::Read`] as a [`ByteSource`].
///
/// End-of-stream is latched: once the inner reader reports 0 bytes,
/// every later `fill` returns 0 without touching the reader again.
#[derive(Debug)]
pub struct IoSource<R: Read> {
    inner: R,
    eof: bool,
}

impl<R: Read> IoSource<R> {
    /// Create a new source wrapping the given reader.
    pub fn new(inner: R) -> Self {
        Self { inner, eof: false }
    }

    /// Get a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume this adapter and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.eof || buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.inner.read(buf) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(0);
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StreamError::read_failed(e)),
            }
        }
    }
}

/// Adapter exposing any [`std::io::Write`] as a [`ByteSink`].
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    /// Create a new sink wrapping the given writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Get a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume this adapter and return the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(StreamError::write_failed)
    }
}

/// Compression effort for streams that apply the codec.
///
/// The encoding follows the classic zlib convention: 1 is fastest, 9 is
/// the best ratio, the reserved value 0 selects the codec's own default
/// effort, and anything above 9 disables compression entirely so the
/// stream moves bytes verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Reserved sentinel selecting the codec's default effort.
    pub const DEFAULT: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Best compression ratio (slowest).
    pub const BEST: Self = Self(9);
    /// Compression disabled; the stream carries raw bytes.
    pub const DISABLED: Self = Self(10);

    /// Create a compression level from its integer encoding.
    pub fn new(level: u8) -> Self {
        Self(level)
    }

    /// Get the raw level value.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Whether this level enables the codec at all.
    pub fn is_enabled(&self) -> bool {
        self.0 <= 9
    }

    /// Whether this is the reserved default-effort sentinel.
    pub fn is_default_effort(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_compression_level() {
        assert!(CompressionLevel::FAST.is_enabled());
        assert!(CompressionLevel::BEST.is_enabled());
        assert!(CompressionLevel::DEFAULT.is_enabled());
        assert!(CompressionLevel::DEFAULT.is_default_effort());
        assert!(!CompressionLevel::DISABLED.is_enabled());
        assert!(!CompressionLevel::new(200).is_enabled());
        assert_eq!(CompressionLevel::default(), CompressionLevel::DISABLED);
    }

    #[test]
    fn test_io_source_latches_eof() {
        let mut source = IoSource::new(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 8];
        assert_eq!(source.fill(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
        assert_eq!(source.fill(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_io_source_empty_buf() {
        let mut source = IoSource::new(Cursor::new(vec![1u8]));
        assert_eq!(source.fill(&mut []).unwrap(), 0);
        // The single byte is still there afterwards.
        let mut buf = [0u8; 1];
        assert_eq!(source.fill(&mut buf).unwrap(), 1);
    }

    #[test]
    fn test_io_sink() {
        let mut sink = IoSink::new(Vec::new());
        sink.write(b"abc").unwrap();
        sink.write(b"").unwrap();
        sink.write(b"d").unwrap();
        assert_eq!(sink.into_inner(), b"abcd");
    }

    #[test]
    fn test_vec_sink() {
        let mut out = Vec::new();
        {
            let sink: &mut dyn ByteSink = &mut out;
            sink.write(b"xy").unwrap();
        }
        assert_eq!(out, b"xy");
    }
}
