//! # OxiByte Stream
//!
//! Buffered, byte-at-a-time input and output streams over in-memory
//! spans or pluggable [`ByteSource`]/[`ByteSink`] capabilities, with
//! transparent DEFLATE (zlib) compression in either direction.
//!
//! Each direction exposes exactly two data operations — read-next-byte
//! and write-next-byte — plus explicit lifecycle control. Buffering is
//! what makes that affordable: input pulls large chunks through the
//! source boundary and hands bytes out one at a time; output batches
//! bytes before they cross the sink or codec boundary.
//!
//! ## Example
//!
//! ```rust
//! use oxibyte_core::CompressionLevel;
//! use oxibyte_stream::{InputStream, OutputStream};
//!
//! // Compress into memory...
//! let mut out = OutputStream::with_level(CompressionLevel::BEST);
//! for &b in b"abc abc abc" {
//!     out.push(b).unwrap();
//! }
//! let compressed = out.finish_into_vec().unwrap();
//!
//! // ...and read it back, decoding transparently.
//! let mut input = InputStream::from_slice_compressed(&compressed).unwrap();
//! let mut decoded = Vec::new();
//! while !input.is_eof().unwrap() {
//!     decoded.push(input.next());
//! }
//! assert_eq!(decoded, b"abc abc abc");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod codec;
pub mod input;
pub mod output;

// Re-exports
pub use input::{InputStream, SOURCE_CHUNK_SIZE};
pub use output::{OutputStream, SINK_BATCH_SIZE, STAGING_BUFFER_SIZE};

pub use oxibyte_core::{
    ByteSink, ByteSource, CompressionLevel, IoSink, IoSource, Result, StreamError,
};
