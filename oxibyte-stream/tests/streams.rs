//! End-to-end tests for the stream engine: identity and compression
//! round-trips, end-of-stream semantics, and sink batching behavior.

use oxibyte_core::{ByteSink, ByteSource, CompressionLevel, Result, StreamError};
use oxibyte_stream::{InputStream, OutputStream};
use std::cell::RefCell;
use std::rc::Rc;

/// Source delivering a fixed sequence of chunks, then 0 forever.
struct ChunkSource {
    chunks: Vec<Vec<u8>>,
    next: usize,
}

impl ChunkSource {
    fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks, next: 0 }
    }
}

impl ByteSource for ChunkSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(chunk) = self.chunks.get(self.next) else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        // Chunks are sized to fit the refill buffer in these tests.
        assert_eq!(n, chunk.len());
        self.next += 1;
        Ok(n)
    }
}

/// Sink recording every write as a separate chunk.
#[derive(Clone, Default)]
struct ChunkSink {
    chunks: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl ByteSink for ChunkSink {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.chunks.borrow_mut().push(bytes.to_vec());
        Ok(())
    }
}

fn sample_data(len: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    pattern.iter().copied().cycle().take(len).collect()
}

fn drain(stream: &mut InputStream<'_>) -> Vec<u8> {
    let mut out = Vec::new();
    while !stream.is_eof().unwrap() {
        out.push(stream.next());
    }
    out
}

#[test]
fn identity_roundtrip_in_memory() {
    let data = sample_data(10_000);
    let mut out = OutputStream::new();
    for &b in &data {
        out.push(b).unwrap();
    }
    assert_eq!(out.finish_into_vec().unwrap(), data);
}

#[test]
fn compression_roundtrip_all_levels() {
    for level in 1..=9u8 {
        for len in [0usize, 1, 200_000] {
            let data = sample_data(len);
            let mut out = OutputStream::with_level(CompressionLevel::new(level));
            for &b in &data {
                out.push(b).unwrap();
            }
            let compressed = out.finish_into_vec().unwrap();

            let mut input = InputStream::from_slice_compressed(&compressed).unwrap();
            assert_eq!(drain(&mut input), data, "level {level} len {len}");
        }
    }
}

#[test]
fn compression_roundtrip_through_source_refills() {
    // Large enough that both the output staging buffer and the input
    // refill buffer cycle several times.
    let data = sample_data(300_000);
    let mut out = OutputStream::with_level(CompressionLevel::DEFAULT);
    for &b in &data {
        out.push(b).unwrap();
    }
    let compressed = out.finish_into_vec().unwrap();

    let source = ChunkSource::new(compressed.chunks(61).map(<[u8]>::to_vec).collect());
    let mut input = InputStream::from_source_compressed_with_chunk_size(source, 64);
    assert_eq!(drain(&mut input), data);
}

#[test]
fn compressed_output_to_sink_decodes() {
    let data = sample_data(100_000);
    let sink = ChunkSink::default();
    let chunks = sink.chunks.clone();
    let mut out = OutputStream::to_sink_with_level(sink, CompressionLevel::FAST);
    for &b in &data {
        out.push(b).unwrap();
    }
    out.finish().unwrap();

    let compressed: Vec<u8> = chunks.borrow().iter().flatten().copied().collect();
    let mut input = InputStream::from_slice_compressed(&compressed).unwrap();
    assert_eq!(drain(&mut input), data);
}

#[test]
fn empty_span_eof_and_checked_read() {
    let mut stream = InputStream::from_slice(b"");
    assert!(stream.is_eof().unwrap());
    for _ in 0..3 {
        assert!(matches!(
            stream.next_checked(),
            Err(StreamError::EndOfStream)
        ));
    }
}

#[test]
fn checked_reads_stop_exactly_at_size() {
    let data = sample_data(257);
    let mut stream = InputStream::from_slice(&data);
    for &expected in &data {
        assert_eq!(stream.next_checked().unwrap(), expected);
    }
    assert!(stream.is_eof().unwrap());
    assert!(matches!(
        stream.next_checked(),
        Err(StreamError::EndOfStream)
    ));
    assert!(matches!(
        stream.next_checked(),
        Err(StreamError::EndOfStream)
    ));
}

#[test]
fn source_eof_only_after_last_byte() {
    let source = ChunkSource::new(vec![vec![1, 2], vec![3]]);
    let mut stream = InputStream::from_source_with_chunk_size(source, 8);

    assert!(!stream.is_eof().unwrap());
    assert_eq!(stream.next(), 1);
    assert_eq!(stream.next(), 2);
    // Buffer is dry but the source still has a chunk; not eof yet.
    assert!(!stream.is_eof().unwrap());
    assert_eq!(stream.next(), 3);
    // Now the source answers 0 and eof becomes permanent.
    assert!(stream.is_eof().unwrap());
    assert!(stream.is_eof().unwrap());
}

#[test]
fn sink_batches_never_exceed_capacity() {
    let data = sample_data(1000);
    let sink = ChunkSink::default();
    let chunks = sink.chunks.clone();
    let mut out = OutputStream::to_sink_with_capacity(sink, 16);
    for &b in &data {
        out.push(b).unwrap();
    }
    out.finish().unwrap();

    let all = chunks.borrow();
    assert!(all.iter().all(|c| !c.is_empty() && c.len() <= 16));
    // Every chunk except the last is a full batch.
    assert!(all[..all.len() - 1].iter().all(|c| c.len() == 16));
    let joined: Vec<u8> = all.iter().flatten().copied().collect();
    assert_eq!(joined, data);
}

#[test]
#[should_panic(expected = "in-memory")]
fn position_rejected_on_source_backed_stream() {
    let stream = InputStream::from_source(ChunkSource::new(vec![vec![1]]));
    let _ = stream.position();
}

#[test]
fn compressed_span_stays_borrowed_and_intact() {
    let data = sample_data(5_000);
    let mut out = OutputStream::with_level(CompressionLevel::BEST);
    for &b in &data {
        out.push(b).unwrap();
    }
    let compressed = out.finish_into_vec().unwrap();
    let pristine = compressed.clone();

    let mut input = InputStream::from_slice_compressed(&compressed).unwrap();
    assert_eq!(drain(&mut input), data);
    // The decoded buffer is owned by the stream; the input span is untouched.
    assert_eq!(compressed, pristine);
}

#[test]
fn truncated_compressed_source_errors() {
    let data = sample_data(50_000);
    let mut out = OutputStream::with_level(CompressionLevel::DEFAULT);
    for &b in &data {
        out.push(b).unwrap();
    }
    let mut compressed = out.finish_into_vec().unwrap();
    compressed.truncate(compressed.len() / 2);

    let source = ChunkSource::new(vec![compressed]);
    let mut input = InputStream::from_source_compressed(source);
    let mut result = Ok(false);
    while let Ok(false) = result {
        result = input.is_eof();
        if let Ok(false) = result {
            input.next();
        }
    }
    assert!(matches!(result, Err(StreamError::CompressionStream { .. })));
}
