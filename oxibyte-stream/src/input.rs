//! Buffered byte-at-a-time input stream.
//!
//! An [`InputStream`] reads from either a fixed in-memory span or a
//! pull-based [`ByteSource`] capability, optionally decompressing a
//! DEFLATE stream on the way through. Source-backed streams use two
//! levels of buffering: the primary buffer holds decoded (or raw) bytes
//! the caller consumes one at a time, and a staging buffer holds
//! compressed bytes pulled from the source before they are fed to the
//! codec.

use crate::codec::Decoder;
use oxibyte_core::{ByteSource, Result, StreamError};

/// Default refill chunk pulled from a backing source (64 KB).
///
/// Large chunks amortize the per-call cost of the source capability;
/// override at construction for transports with different trade-offs.
pub const SOURCE_CHUNK_SIZE: usize = 64 * 1024;

/// Primary buffer: either a borrowed caller-owned span or an owned
/// buffer the stream refills.
#[derive(Debug)]
enum InputBuffer<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
}

impl InputBuffer<'_> {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Borrowed(b) => b,
            Self::Owned(v) => v,
        }
    }

    fn owned_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Self::Owned(v) => v,
            Self::Borrowed(_) => unreachable!("source-backed streams own their buffer"),
        }
    }
}

/// Decompression side of a source-backed stream: the codec state plus
/// the staging buffer of compressed bytes pulled from the source.
struct InflateState {
    decoder: Decoder,
    staging: Vec<u8>,
    staging_pos: usize,
}

impl InflateState {
    fn staged_all_consumed(&self) -> bool {
        self.staging_pos == self.staging.len()
    }
}

/// Refill machinery for source-backed streams.
struct SourceState<'a> {
    source: Box<dyn ByteSource + 'a>,
    /// The source has returned 0 bytes; it will never produce more.
    exhausted: bool,
    chunk_size: usize,
    inflate: Option<InflateState>,
}

impl std::fmt::Debug for SourceState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceState")
            .field("exhausted", &self.exhausted)
            .field("chunk_size", &self.chunk_size)
            .field("compressed", &self.inflate.is_some())
            .finish_non_exhaustive()
    }
}

/// Buffered reader over an in-memory span or a [`ByteSource`].
///
/// Bytes are consumed one at a time through the unchecked [`next`] /
/// [`peek`] hot path or the checked [`next_checked`] / [`peek_checked`]
/// variants. When the buffer runs dry on a source-backed stream, the
/// refill protocol pulls the next chunk (decompressing it if the stream
/// was opened in compressed mode) before end-of-stream is reported.
///
/// [`next`]: Self::next
/// [`peek`]: Self::peek
/// [`next_checked`]: Self::next_checked
/// [`peek_checked`]: Self::peek_checked
///
/// # Example
///
/// ```rust
/// use oxibyte_stream::InputStream;
///
/// let mut stream = InputStream::from_slice(b"ab");
/// assert_eq!(stream.next_checked().unwrap(), b'a');
/// assert_eq!(stream.next_checked().unwrap(), b'b');
/// assert!(stream.is_eof().unwrap());
/// ```
#[derive(Debug)]
pub struct InputStream<'a> {
    buf: InputBuffer<'a>,
    pos: usize,
    backing: Option<SourceState<'a>>,
}

impl<'a> InputStream<'a> {
    /// Create a stream over a borrowed, caller-owned byte span.
    ///
    /// The span is never mutated or freed by the stream; the caller must
    /// keep it alive and unmodified for the stream's lifetime.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            buf: InputBuffer::Borrowed(data),
            pos: 0,
            backing: None,
        }
    }

    /// Create a stream over a compressed in-memory span.
    ///
    /// The entire span is decoded up front into a buffer the stream
    /// owns, so the result never aliases the input and carries no
    /// borrow of it.
    pub fn from_slice_compressed(data: &[u8]) -> Result<InputStream<'static>> {
        let mut decoder = Decoder::new();
        let mut decoded = Vec::new();
        let mut fed = 0;
        while !decoder.is_finished() {
            let consumed = decoder.run(&data[fed..], &mut decoded)?;
            fed += consumed;
            if consumed == 0 && !decoder.is_finished() {
                return Err(StreamError::compression(
                    "compressed span ended before the stream was complete",
                ));
            }
        }
        Ok(InputStream {
            buf: InputBuffer::Owned(decoded),
            pos: 0,
            backing: None,
        })
    }

    /// Create a stream pulling raw bytes from a source capability.
    pub fn from_source<S: ByteSource + 'a>(source: S) -> Self {
        Self::from_source_with_chunk_size(source, SOURCE_CHUNK_SIZE)
    }

    /// Source-backed stream with an explicit refill chunk size.
    pub fn from_source_with_chunk_size<S: ByteSource + 'a>(source: S, chunk_size: usize) -> Self {
        Self {
            buf: InputBuffer::Owned(Vec::new()),
            pos: 0,
            backing: Some(SourceState {
                source: Box::new(source),
                exhausted: false,
                chunk_size: chunk_size.max(1),
                inflate: None,
            }),
        }
    }

    /// Create a stream pulling a compressed byte stream from a source
    /// capability, decoding it transparently.
    pub fn from_source_compressed<S: ByteSource + 'a>(source: S) -> Self {
        Self::from_source_compressed_with_chunk_size(source, SOURCE_CHUNK_SIZE)
    }

    /// Compressed source-backed stream with an explicit refill chunk size.
    pub fn from_source_compressed_with_chunk_size<S: ByteSource + 'a>(
        source: S,
        chunk_size: usize,
    ) -> Self {
        Self {
            buf: InputBuffer::Owned(Vec::new()),
            pos: 0,
            backing: Some(SourceState {
                source: Box::new(source),
                exhausted: false,
                chunk_size: chunk_size.max(1),
                inflate: Some(InflateState {
                    decoder: Decoder::new(),
                    staging: Vec::new(),
                    staging_pos: 0,
                }),
            }),
        }
    }

    /// Whether no byte can ever be produced again.
    ///
    /// On a source-backed stream this may trigger a refill, so it can
    /// fail with [`StreamError::ReadFailed`] or
    /// [`StreamError::CompressionStream`]. It becomes true only after
    /// the last real byte has been consumed, never before.
    pub fn is_eof(&mut self) -> Result<bool> {
        loop {
            if self.pos < self.buf.bytes().len() {
                return Ok(false);
            }
            let Some(backing) = self.backing.as_mut() else {
                return Ok(true);
            };
            let done = match &backing.inflate {
                None => backing.exhausted,
                Some(state) => {
                    state.decoder.is_finished()
                        || (backing.exhausted && state.staged_all_consumed())
                }
            };
            if done {
                return Ok(true);
            }
            Self::refill(&mut self.buf, &mut self.pos, backing)?;
        }
    }

    /// Read the next byte without an end-of-stream check.
    ///
    /// # Precondition
    ///
    /// [`is_eof`](Self::is_eof) must have returned `false` since the last
    /// byte was consumed. Violating this is a caller bug; debug builds
    /// assert, release builds panic on the bounds check.
    #[inline]
    pub fn next(&mut self) -> u8 {
        debug_assert!(self.pos < self.buf.bytes().len(), "next() past end of stream");
        let byte = self.buf.bytes()[self.pos];
        self.pos += 1;
        byte
    }

    /// Peek at the next byte without consuming it or checking for
    /// end-of-stream.
    ///
    /// Same precondition as [`next`](Self::next).
    #[inline]
    pub fn peek(&self) -> u8 {
        debug_assert!(self.pos < self.buf.bytes().len(), "peek() past end of stream");
        self.buf.bytes()[self.pos]
    }

    /// Read the next byte, failing with [`StreamError::EndOfStream`] if
    /// the stream is exhausted.
    pub fn next_checked(&mut self) -> Result<u8> {
        if self.is_eof()? {
            return Err(StreamError::EndOfStream);
        }
        Ok(self.next())
    }

    /// Peek at the next byte, failing with [`StreamError::EndOfStream`]
    /// if the stream is exhausted.
    pub fn peek_checked(&mut self) -> Result<u8> {
        if self.is_eof()? {
            return Err(StreamError::EndOfStream);
        }
        Ok(self.peek())
    }

    /// Current absolute read offset.
    ///
    /// # Panics
    ///
    /// Panics on a source-backed stream: refills discard old buffer
    /// contents, so no stable absolute offset exists there.
    pub fn position(&self) -> usize {
        assert!(
            self.backing.is_none(),
            "position() is only defined for in-memory streams"
        );
        self.pos
    }

    /// The full underlying buffer, for zero-copy bulk access.
    ///
    /// # Panics
    ///
    /// Panics on a source-backed stream, whose buffer contents are
    /// transient.
    pub fn as_slice(&self) -> &[u8] {
        assert!(
            self.backing.is_none(),
            "as_slice() is only defined for in-memory streams"
        );
        self.buf.bytes()
    }

    /// Pull the next chunk of logical bytes into the primary buffer.
    ///
    /// Uncompressed: one `fill` call from the source. Compressed: top up
    /// the staging buffer if it has no unconsumed compressed bytes, then
    /// feed it to the codec and keep whatever decoded bytes come out.
    /// Either way the read position resets to the start of the buffer.
    fn refill(buf: &mut InputBuffer<'_>, pos: &mut usize, backing: &mut SourceState<'_>) -> Result<()> {
        let primary = buf.owned_mut();
        primary.clear();
        *pos = 0;

        match &mut backing.inflate {
            None => {
                primary.resize(backing.chunk_size, 0);
                let n = backing.source.fill(primary)?;
                primary.truncate(n);
                if n == 0 {
                    backing.exhausted = true;
                }
            }
            Some(state) => {
                while primary.is_empty() && !state.decoder.is_finished() {
                    if state.staged_all_consumed() && !backing.exhausted {
                        state.staging.resize(backing.chunk_size, 0);
                        let n = backing.source.fill(&mut state.staging)?;
                        state.staging.truncate(n);
                        state.staging_pos = 0;
                        if n == 0 {
                            backing.exhausted = true;
                        }
                    }
                    let consumed = state
                        .decoder
                        .run(&state.staging[state.staging_pos..], primary)?;
                    state.staging_pos += consumed;
                    if primary.is_empty() && !state.decoder.is_finished() {
                        if backing.exhausted && state.staged_all_consumed() {
                            return Err(StreamError::compression(
                                "source ended before the compressed stream was complete",
                            ));
                        }
                        if consumed == 0 && !state.staged_all_consumed() {
                            return Err(StreamError::compression("inflate engine stalled"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl<'a> From<&'a [u8]> for InputStream<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::from_slice(data)
    }
}

impl<'a> From<&'a str> for InputStream<'a> {
    fn from(data: &'a str) -> Self {
        Self::from_slice(data.as_bytes())
    }
}

impl From<Vec<u8>> for InputStream<'static> {
    fn from(data: Vec<u8>) -> Self {
        Self {
            buf: InputBuffer::Owned(data),
            pos: 0,
            backing: None,
        }
    }
}
