//! Buffered byte-at-a-time output stream.
//!
//! An [`OutputStream`] accumulates bytes in memory, batches them out to a
//! [`ByteSink`] capability, or compresses them on the way through — one
//! mode per stream, fixed at construction. Compressed output cannot be
//! flushed mid-stream; [`finish`](OutputStream::finish) closes the codec
//! state and flushes everything that remains.

use crate::codec::Encoder;
use oxibyte_core::{ByteSink, CompressionLevel, Result};

/// Default batching window for sink-backed uncompressed output.
///
/// Small enough to stay cache-friendly, large enough that per-write
/// overhead at the sink boundary amortizes away.
pub const SINK_BATCH_SIZE: usize = 256;

/// Default staging buffer for compressed output (32 KB).
///
/// Bytes accumulate here and are handed to the codec one batch at a
/// time, keeping codec invocations rare without large copies.
pub const STAGING_BUFFER_SIZE: usize = 32 * 1024;

/// Where compressed output lands.
enum Destination<'a> {
    Memory(Vec<u8>),
    Sink(Box<dyn ByteSink + 'a>),
}

/// One mode per stream, fixed between construction and `finish`.
enum Mode<'a> {
    /// The accumulation buffer is the entire result.
    Memory { buf: Vec<u8> },
    /// Fixed-capacity batching window, flushed verbatim when full.
    Sink {
        sink: Box<dyn ByteSink + 'a>,
        batch: Vec<u8>,
        capacity: usize,
    },
    /// Bytes stage in a working buffer and are compressed in batches.
    Compressed {
        dest: Destination<'a>,
        encoder: Encoder,
        staging: Vec<u8>,
        capacity: usize,
    },
}

/// Buffered writer over an in-memory buffer or a [`ByteSink`].
///
/// # Example
///
/// ```rust
/// use oxibyte_stream::{InputStream, OutputStream};
/// use oxibyte_core::CompressionLevel;
///
/// let mut out = OutputStream::with_level(CompressionLevel::DEFAULT);
/// for &b in b"hello hello hello" {
///     out.push(b).unwrap();
/// }
/// let compressed = out.finish_into_vec().unwrap();
///
/// let mut back = InputStream::from_slice_compressed(&compressed).unwrap();
/// assert_eq!(back.next_checked().unwrap(), b'h');
/// ```
pub struct OutputStream<'a> {
    mode: Mode<'a>,
    finished: bool,
}

impl<'a> OutputStream<'a> {
    /// In-memory, uncompressed stream: the buffer is the result.
    pub fn new() -> Self {
        Self {
            mode: Mode::Memory { buf: Vec::new() },
            finished: false,
        }
    }

    /// In-memory stream; compressed when `level` enables the codec.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self::with_level_and_capacity(level, STAGING_BUFFER_SIZE)
    }

    /// In-memory stream with an explicit staging capacity for the
    /// compressed mode. Falls back to [`new`](Self::new) when the level
    /// disables compression.
    pub fn with_level_and_capacity(level: CompressionLevel, capacity: usize) -> Self {
        if !level.is_enabled() {
            return Self::new();
        }
        Self {
            mode: Mode::Compressed {
                dest: Destination::Memory(Vec::new()),
                encoder: Encoder::new(level),
                staging: Vec::with_capacity(capacity.max(1)),
                capacity: capacity.max(1),
            },
            finished: false,
        }
    }

    /// Sink-backed, uncompressed stream with the default batching window.
    pub fn to_sink<S: ByteSink + 'a>(sink: S) -> Self {
        Self::to_sink_with_capacity(sink, SINK_BATCH_SIZE)
    }

    /// Sink-backed, uncompressed stream with an explicit batching window.
    pub fn to_sink_with_capacity<S: ByteSink + 'a>(sink: S, capacity: usize) -> Self {
        Self {
            mode: Mode::Sink {
                sink: Box::new(sink),
                batch: Vec::with_capacity(capacity.max(1)),
                capacity: capacity.max(1),
            },
            finished: false,
        }
    }

    /// Sink-backed stream; compressed when `level` enables the codec.
    pub fn to_sink_with_level<S: ByteSink + 'a>(sink: S, level: CompressionLevel) -> Self {
        if !level.is_enabled() {
            return Self::to_sink(sink);
        }
        Self {
            mode: Mode::Compressed {
                dest: Destination::Sink(Box::new(sink)),
                encoder: Encoder::new(level),
                staging: Vec::with_capacity(STAGING_BUFFER_SIZE),
                capacity: STAGING_BUFFER_SIZE,
            },
            finished: false,
        }
    }

    /// Append one logical byte to the stream.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        debug_assert!(!self.finished, "push() after finish");
        match &mut self.mode {
            Mode::Memory { buf } => {
                buf.push(byte);
                Ok(())
            }
            Mode::Sink {
                sink,
                batch,
                capacity,
            } => {
                batch.push(byte);
                if batch.len() >= *capacity {
                    sink.write(batch)?;
                    batch.clear();
                }
                Ok(())
            }
            Mode::Compressed {
                dest,
                encoder,
                staging,
                capacity,
            } => {
                staging.push(byte);
                if staging.len() >= *capacity {
                    Self::compress_step(dest, encoder, staging, false)?;
                }
                Ok(())
            }
        }
    }

    /// Force the batching window out to the sink immediately.
    ///
    /// Only meaningful for sink-backed uncompressed streams. A no-op for
    /// in-memory streams and for compressed streams, whose codec state
    /// can only be closed correctly by [`finish`](Self::finish).
    pub fn flush(&mut self) -> Result<()> {
        if let Mode::Sink { sink, batch, .. } = &mut self.mode {
            if !batch.is_empty() {
                sink.write(batch)?;
                batch.clear();
            }
        }
        Ok(())
    }

    /// Close the stream: run the final compression step, flush every
    /// remaining buffered byte, and release resources.
    ///
    /// Consuming `self` makes the terminal state structural; writing
    /// again requires constructing a new stream.
    pub fn finish(mut self) -> Result<()> {
        self.do_finish()
    }

    /// Close the stream and move the accumulated in-memory bytes out.
    ///
    /// # Panics
    ///
    /// Panics on a sink-backed stream, whose bytes have already left the
    /// object.
    pub fn finish_into_vec(mut self) -> Result<Vec<u8>> {
        assert!(
            !self.is_sink_backed(),
            "finish_into_vec() is only defined for in-memory streams"
        );
        self.do_finish()?;
        match &mut self.mode {
            Mode::Memory { buf } => Ok(std::mem::take(buf)),
            Mode::Compressed {
                dest: Destination::Memory(buf),
                ..
            } => Ok(std::mem::take(buf)),
            _ => unreachable!("sink-backed streams are rejected above"),
        }
    }

    /// The accumulated bytes so far.
    ///
    /// # Panics
    ///
    /// Panics unless the stream is in-memory and uncompressed; in every
    /// other mode the logical bytes are no longer individually
    /// addressable.
    pub fn as_slice(&self) -> &[u8] {
        match &self.mode {
            Mode::Memory { buf } => buf,
            _ => panic!("as_slice() is only defined for in-memory uncompressed streams"),
        }
    }

    /// Mutable access to the accumulation buffer, e.g. to clear it in
    /// place and reuse the stream as a scratch buffer.
    ///
    /// # Panics
    ///
    /// Same contract as [`as_slice`](Self::as_slice).
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        match &mut self.mode {
            Mode::Memory { buf } => buf,
            _ => panic!("buffer_mut() is only defined for in-memory uncompressed streams"),
        }
    }

    /// Whether bytes leave this stream through a sink capability.
    pub fn is_sink_backed(&self) -> bool {
        matches!(
            self.mode,
            Mode::Sink { .. }
                | Mode::Compressed {
                    dest: Destination::Sink(_),
                    ..
                }
        )
    }

    /// Run one compression batch over the staging buffer.
    fn compress_step(
        dest: &mut Destination<'_>,
        encoder: &mut Encoder,
        staging: &mut Vec<u8>,
        finish: bool,
    ) -> Result<()> {
        match dest {
            Destination::Memory(buf) => {
                encoder.run(staging, buf, finish)?;
            }
            Destination::Sink(sink) => {
                let mut out = Vec::new();
                encoder.run(staging, &mut out, finish)?;
                if !out.is_empty() {
                    sink.write(&out)?;
                }
            }
        }
        staging.clear();
        Ok(())
    }

    fn do_finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        match &mut self.mode {
            Mode::Memory { .. } => Ok(()),
            Mode::Sink { sink, batch, .. } => {
                if !batch.is_empty() {
                    sink.write(batch)?;
                    batch.clear();
                }
                Ok(())
            }
            Mode::Compressed {
                dest,
                encoder,
                staging,
                ..
            } => Self::compress_step(dest, encoder, staging, true),
        }
    }
}

impl Default for OutputStream<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OutputStream<'_> {
    fn drop(&mut self) {
        // Best-effort finish on drop.
        let _ = self.do_finish();
    }
}
