//! # OxiByte Core
//!
//! Core components for the OxiByte buffered stream library.
//!
//! This crate provides the building blocks shared by both stream
//! directions:
//!
//! - [`traits`]: `ByteSource`/`ByteSink` capability contracts and the
//!   `std::io` adapters
//! - [`error`]: the stream error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ InputStream / OutputStream (oxibyte-stream)          │
//! │     buffering, refill, compression batching          │
//! ├──────────────────────────────────────────────────────┤
//! │ Capabilities (this crate)                            │
//! │     ByteSource, ByteSink, CompressionLevel, errors   │
//! ├──────────────────────────────────────────────────────┤
//! │ Transports (external)                                │
//! │     files, sockets, pipes, in-memory buffers         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxibyte_core::{ByteSource, IoSource};
//! use std::io::Cursor;
//!
//! let mut source = IoSource::new(Cursor::new(b"hello".to_vec()));
//! let mut buf = [0u8; 16];
//! let n = source.fill(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

// Re-exports for convenience
pub use error::{Result, StreamError};
pub use traits::{ByteSink, ByteSource, CompressionLevel, IoSink, IoSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StreamError};
    pub use crate::traits::{ByteSink, ByteSource, CompressionLevel, IoSink, IoSource};
}
