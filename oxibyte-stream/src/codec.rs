//! Adapter over the external DEFLATE engine.
//!
//! The streams never touch `flate2` directly; they drive the codec through
//! the feed/drain/finish protocol exposed here. Both halves account for
//! consumed and produced bytes via `total_in`/`total_out` deltas, so a
//! single call can be handed a partial chunk of input and will report
//! exactly how much of it the engine accepted.
//!
//! The wire format is a zlib-wrapped DEFLATE stream (RFC 1950), readable
//! by any standard zlib decompressor.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use oxibyte_core::{CompressionLevel, Result, StreamError};

/// Scratch chunk used when draining codec output.
const DRAIN_CHUNK_SIZE: usize = 8 * 1024;

fn flate2_compression(level: CompressionLevel) -> Compression {
    if level.is_default_effort() {
        Compression::default()
    } else {
        Compression::new(u32::from(level.get().min(9)))
    }
}

/// Streaming compressor half of the codec boundary.
pub(crate) struct Encoder {
    inner: Compress,
    finished: bool,
}

impl Encoder {
    /// Create an encoder for the given effort level.
    ///
    /// The level must be one that enables compression; disabled levels
    /// never reach the codec.
    pub(crate) fn new(level: CompressionLevel) -> Self {
        debug_assert!(level.is_enabled());
        Self {
            inner: Compress::new(flate2_compression(level), true),
            finished: false,
        }
    }

    /// Feed `input` to the engine and drain everything it produces into
    /// `out`.
    ///
    /// With `finish == false` the whole input is consumed (the engine may
    /// keep it internal and emit nothing yet). With `finish == true` the
    /// end-of-stream signal is raised and the engine is driven until it
    /// reports completion.
    pub(crate) fn run(&mut self, input: &[u8], out: &mut Vec<u8>, finish: bool) -> Result<usize> {
        let flush = if finish {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        let mut consumed = 0;
        loop {
            let mut chunk = [0u8; DRAIN_CHUNK_SIZE];
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .compress(&input[consumed..], &mut chunk, flush)
                .map_err(|e| StreamError::compression(e.to_string()))?;
            let used = (self.inner.total_in() - before_in) as usize;
            let made = (self.inner.total_out() - before_out) as usize;
            consumed += used;
            out.extend_from_slice(&chunk[..made]);

            match status {
                Status::StreamEnd => {
                    self.finished = true;
                    break;
                }
                Status::Ok | Status::BufError => {
                    if used == 0 && made == 0 {
                        if finish || consumed < input.len() {
                            return Err(StreamError::compression("deflate engine stalled"));
                        }
                        break;
                    }
                    if !finish && consumed == input.len() && made < chunk.len() {
                        break;
                    }
                }
            }
        }
        Ok(consumed)
    }

    /// Whether the engine has emitted its end-of-stream marker.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Streaming decompressor half of the codec boundary.
pub(crate) struct Decoder {
    inner: Decompress,
    finished: bool,
}

impl Decoder {
    /// Create a decoder expecting a zlib-wrapped stream.
    pub(crate) fn new() -> Self {
        Self {
            inner: Decompress::new(true),
            finished: false,
        }
    }

    /// Feed `input` to the engine and drain all decoded bytes into `out`.
    ///
    /// Returns how many input bytes the engine accepted. A return of 0
    /// with [`is_finished`](Self::is_finished) still false means the
    /// engine needs more input to make progress.
    pub(crate) fn run(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        if self.finished {
            return Ok(0);
        }
        let mut consumed = 0;
        loop {
            let mut chunk = [0u8; DRAIN_CHUNK_SIZE];
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .decompress(&input[consumed..], &mut chunk, FlushDecompress::None)
                .map_err(|e| StreamError::compression(e.to_string()))?;
            let used = (self.inner.total_in() - before_in) as usize;
            let made = (self.inner.total_out() - before_out) as usize;
            consumed += used;
            out.extend_from_slice(&chunk[..made]);

            match status {
                Status::StreamEnd => {
                    self.finished = true;
                    break;
                }
                Status::Ok | Status::BufError => {
                    // No progress with a fresh output chunk: the engine is
                    // waiting for more compressed input.
                    if used == 0 && made == 0 {
                        break;
                    }
                }
            }
        }
        Ok(consumed)
    }

    /// Whether the engine has seen the end-of-stream marker.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(50);

        let mut encoder = Encoder::new(CompressionLevel::DEFAULT);
        let mut compressed = Vec::new();
        let consumed = encoder.run(&data, &mut compressed, false).unwrap();
        assert_eq!(consumed, data.len());
        encoder.run(&[], &mut compressed, true).unwrap();
        assert!(encoder.is_finished());
        assert!(compressed.len() < data.len());

        let mut decoder = Decoder::new();
        let mut decoded = Vec::new();
        let consumed = decoder.run(&compressed, &mut decoded).unwrap();
        assert_eq!(consumed, compressed.len());
        assert!(decoder.is_finished());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decoder_incremental_input() {
        let data = vec![7u8; 10_000];
        let mut encoder = Encoder::new(CompressionLevel::BEST);
        let mut compressed = Vec::new();
        encoder.run(&data, &mut compressed, true).unwrap();

        // Feed the compressed stream one byte at a time.
        let mut decoder = Decoder::new();
        let mut decoded = Vec::new();
        let mut pos = 0;
        while pos < compressed.len() {
            let end = (pos + 1).min(compressed.len());
            let c = decoder.run(&compressed[pos..end], &mut decoded).unwrap();
            assert!(c > 0, "decoder made no progress");
            pos += c;
        }
        assert!(decoder.is_finished());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let mut decoder = Decoder::new();
        let mut out = Vec::new();
        // Not a zlib header; the engine must report a stream error.
        assert!(decoder.run(&[0xDE, 0xAD, 0xBE, 0xEF], &mut out).is_err());
    }

    #[test]
    fn test_encoder_empty_stream() {
        let mut encoder = Encoder::new(CompressionLevel::FAST);
        let mut compressed = Vec::new();
        encoder.run(&[], &mut compressed, true).unwrap();
        assert!(encoder.is_finished());
        // Header plus empty final block plus checksum.
        assert!(!compressed.is_empty());

        let mut decoder = Decoder::new();
        let mut decoded = Vec::new();
        decoder.run(&compressed, &mut decoded).unwrap();
        assert!(decoder.is_finished());
        assert!(decoded.is_empty());
    }
}
