#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `zstream` drives the zlib engine (zlib, gzip and raw deflate framing)
//! through a buffer-oriented incremental protocol. Callers hand the stream one
//! input chunk and one output buffer at a time; each step advances the engine
//! exactly as far as those buffers allow and reports what happened through a
//! [`Status`]. Nothing ever materialises the whole stream, which makes the
//! crate a building block for higher layers that chunk files, sockets or lazy
//! byte sources.
//!
//! # Design
//!
//! - [`Stream`] owns the native engine state and two cursors: input consumed
//!   and output produced. Buffers are [`bytes::Bytes`] and
//!   [`bytes::BytesMut`], so popping produced output never copies.
//! - [`params`] holds validated tuning values ([`CompressionLevel`],
//!   [`WindowBits`], [`MemoryLevel`], [`Strategy`]) and the
//!   [`CompressParams`]/[`DecompressParams`] configuration structs.
//! - [`status`] translates engine codes: recoverable conditions become
//!   [`Status`] values, fatal ones become [`ZlibError`].
//! - [`checksum`] exposes the Adler-32 accumulator used to identify preset
//!   dictionaries.
//! - [`debug_zlib`] emits structured `tracing` events when the `tracing`
//!   feature is enabled.
//!
//! # Invariants
//!
//! - A new input buffer may only be pushed once the previous one is fully
//!   consumed, and a new output buffer only once produced bytes are popped.
//! - The engine only sees raw pointers into the current buffers for the
//!   duration of a single call.
//! - The native state is released exactly once: explicitly through
//!   [`Stream::finalize`], on the first fatal error, or on drop.
//!
//! # Errors
//!
//! Broken buffer preconditions are caller bugs and panic. Parameter problems
//! surface as [`ParameterError`] or [`InitError`] before any native state is
//! allocated. Fatal engine conditions surface as [`ZlibError`], which converts
//! into [`std::io::Error`] for callers working in I/O terms.
//!
//! # Examples
//!
//! Compressing in small output chunks and decompressing the result:
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use zstream::{CompressParams, DecompressParams, Flush, Format, Status, Stream};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let payload = Bytes::from(b"incremental payload ".repeat(64));
//!
//! let mut deflater = Stream::compress(&CompressParams::new(Format::Gzip))?;
//! deflater.push_input_buffer(payload.clone());
//! let mut compressed = BytesMut::new();
//! loop {
//!     deflater.push_output_space(32);
//!     let status = deflater.deflate(Flush::Finish)?;
//!     if deflater.output_bytes_available() > 0 {
//!         compressed.extend_from_slice(&deflater.pop_output_buffer());
//!     }
//!     if status == Status::StreamEnd {
//!         break;
//!     }
//! }
//!
//! let mut inflater = Stream::decompress(&DecompressParams::new(Format::GzipOrZlib))?;
//! inflater.push_input_buffer(compressed.freeze());
//! inflater.push_output_buffer(BytesMut::zeroed(payload.len()));
//! assert_eq!(inflater.inflate(Flush::Finish)?, Status::StreamEnd);
//! assert_eq!(inflater.pop_output_buffer(), payload);
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - [`stream`] for the buffer protocol in detail.
//! - [`flate2`](https://docs.rs/flate2) for `Read`/`Write` adapters over the
//!   same engine.

pub mod checksum;
pub mod debug_zlib;
mod engine;
pub mod error;
pub mod flush;
pub mod format;
pub mod params;
pub mod status;
pub mod stream;
pub mod version;

pub use checksum::{DictionaryHash, dictionary_hash};
pub use error::{ErrorKind, InitError, ParameterError, ZlibError};
pub use flush::Flush;
pub use format::Format;
pub use params::{
    CompressParams, CompressionLevel, DEFAULT_COMPRESS_BUFFER_SIZE,
    DEFAULT_DECOMPRESS_BUFFER_SIZE, DecompressParams, MemoryLevel, Method, Strategy, WindowBits,
};
pub use status::Status;
pub use stream::{Direction, Stream};
pub use version::EngineVersion;
