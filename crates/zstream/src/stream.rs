//! The buffer-oriented stream driver.
//!
//! A [`Stream`] owns one native engine handle together with the caller's
//! current input and output buffers. Each step advances the engine exactly as
//! far as those buffers allow and records how much input was consumed and how
//! much output was produced:
//!
//! ```text
//!   input:  [ consumed ........ | remaining ............... ]
//!                               ^ input cursor
//!   output: [ popped | available | free space ............. ]
//!           ^ base   ^ offset    ^ engine write cursor
//! ```
//!
//! A previous buffer is only released when its successor is pushed, and the
//! engine only ever sees raw pointers for the duration of a single call.
//!
//! # Examples
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use zstream::{CompressParams, DecompressParams, Flush, Format, Status, Stream};
//!
//! let mut deflater = Stream::compress(&CompressParams::new(Format::Zlib))?;
//! deflater.push_input_buffer(Bytes::from_static(b"hello world hello world"));
//! deflater.push_output_space(256);
//! assert_eq!(deflater.deflate(Flush::Finish)?, Status::StreamEnd);
//! let compressed = deflater.pop_output_buffer();
//!
//! let mut inflater = Stream::decompress(&DecompressParams::new(Format::Zlib))?;
//! inflater.push_input_buffer(compressed);
//! inflater.push_output_buffer(BytesMut::zeroed(256));
//! assert_eq!(inflater.inflate(Flush::NoFlush)?, Status::StreamEnd);
//! assert_eq!(&inflater.pop_output_buffer()[..], b"hello world hello world");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::fmt;

use bytes::{Buf, Bytes, BytesMut};

use crate::checksum::DictionaryHash;
use crate::debug_zlib;
use crate::engine::{EngineHandle, StepOutcome};
use crate::error::{ErrorKind, InitError, ParameterError, ZlibError};
use crate::flush::Flush;
use crate::format::Format;
use crate::params::{CompressParams, CompressionLevel, DecompressParams, Strategy};
use crate::status::{self, Status};
use crate::version::EngineVersion;

/// Which way a [`Stream`] transforms data. Fixed when the stream is created.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Plain bytes in, compressed bytes out.
    Compress,
    /// Compressed bytes in, plain bytes out.
    Decompress,
}

impl Direction {
    /// Returns a lowercase noun for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compress => "compression",
            Self::Decompress => "decompression",
        }
    }

    const fn step_name(self) -> &'static str {
        match self {
            Self::Compress => "deflate",
            Self::Decompress => "inflate",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Incremental compressor or decompressor driven by caller-supplied buffers.
///
/// Calling a method whose precondition does not hold (pushing a buffer over
/// one that is not drained, popping when nothing is available, stepping
/// without output space, resetting with buffered data) is a bug in the caller
/// and panics.
///
/// Fatal engine errors release the native state before they are returned;
/// every engine operation after that fails with an [`ErrorKind::Stream`]
/// error. The native state is also released on drop.
pub struct Stream {
    engine: Option<EngineHandle>,
    direction: Direction,
    format: Format,
    version: EngineVersion,
    /// Unconsumed input; consumed bytes are advanced past, not copied.
    input: Bytes,
    /// Unpopped region of the current output buffer. Its first
    /// `output_available` bytes hold produced data, the rest is free.
    output: BytesMut,
    /// Address of the first byte of the current output buffer.
    output_base: usize,
    output_offset: usize,
    output_available: usize,
    pending_dictionary: Option<DictionaryHash>,
    total_in: u64,
    total_out: u64,
}

impl Stream {
    /// Creates a compressing stream.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::Parameter`] for the decode-only
    /// [`Format::GzipOrZlib`], [`InitError::UnsupportedFormat`] when the linked
    /// engine predates gzip support, and [`InitError::Engine`] when the engine
    /// refuses to initialise.
    pub fn compress(params: &CompressParams) -> Result<Self, InitError> {
        let format = params.format();
        if format.is_decode_only() {
            return Err(ParameterError::DecodeOnlyFormat(format).into());
        }
        let version = EngineVersion::current();
        ensure_supported(format, version)?;

        let window_bits = params.window_bits().raw(format);
        let engine = EngineHandle::compress(
            params.level().raw(),
            params.method().raw(),
            window_bits,
            params.memory_level().raw(),
            params.strategy().raw(),
        )
        .map_err(|source| InitError::Engine {
            direction: Direction::Compress,
            source,
        })?;

        debug_zlib::trace_stream_init(Direction::Compress, format, window_bits, version.as_str());
        Ok(Self::with_engine(engine, Direction::Compress, format, version))
    }

    /// Creates a decompressing stream.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::UnsupportedFormat`] when the linked engine predates
    /// gzip support and [`InitError::Engine`] when the engine refuses to
    /// initialise.
    pub fn decompress(params: &DecompressParams) -> Result<Self, InitError> {
        let format = params.format();
        let version = EngineVersion::current();
        ensure_supported(format, version)?;

        let window_bits = params.window_bits().raw(format);
        let engine =
            EngineHandle::decompress(window_bits).map_err(|source| InitError::Engine {
                direction: Direction::Decompress,
                source,
            })?;

        debug_zlib::trace_stream_init(
            Direction::Decompress,
            format,
            window_bits,
            version.as_str(),
        );
        Ok(Self::with_engine(engine, Direction::Decompress, format, version))
    }

    fn with_engine(
        engine: EngineHandle,
        direction: Direction,
        format: Format,
        version: EngineVersion,
    ) -> Self {
        let output = BytesMut::new();
        Self {
            engine: Some(engine),
            direction,
            format,
            version,
            input: Bytes::new(),
            output_base: output.as_ptr() as usize,
            output,
            output_offset: 0,
            output_available: 0,
            pending_dictionary: None,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Returns the direction fixed at creation.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the container format fixed at creation.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Returns the engine version probed when the stream was created.
    #[must_use]
    pub const fn engine_version(&self) -> EngineVersion {
        self.version
    }

    /// Reports whether the native state has been released.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.engine.is_none()
    }

    // ------------------------------------------------------------------
    // Input buffer
    // ------------------------------------------------------------------

    /// Hands the next input chunk to the stream. The previous chunk is
    /// released here.
    ///
    /// # Panics
    ///
    /// Panics if the current input buffer still has unconsumed bytes.
    pub fn push_input_buffer(&mut self, input: Bytes) {
        assert!(
            self.input.is_empty(),
            "cannot push input: the current input buffer still holds {} unconsumed bytes",
            self.input.len()
        );
        self.input = input;
    }

    /// Reports whether the current input buffer has been fully consumed.
    #[must_use]
    pub fn input_buffer_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Returns the number of unconsumed input bytes.
    #[must_use]
    pub fn input_remaining(&self) -> usize {
        self.input.len()
    }

    /// Takes back the unconsumed tail of the input buffer without copying it.
    ///
    /// Used after [`Status::StreamEnd`] to recover trailing data such as the
    /// next member of a multi-member gzip file.
    ///
    /// # Panics
    ///
    /// Panics if there is no unconsumed input.
    pub fn pop_remaining_input_buffer(&mut self) -> Bytes {
        assert!(!self.input.is_empty(), "no unconsumed input to pop");
        self.input.split_to(self.input.len())
    }

    // ------------------------------------------------------------------
    // Output buffer
    // ------------------------------------------------------------------

    /// Hands the next output buffer to the stream. Its whole length is
    /// writable and its previous contents are overwritten. The previous buffer
    /// is released here.
    ///
    /// # Panics
    ///
    /// Panics if produced bytes from the current buffer have not been popped.
    pub fn push_output_buffer(&mut self, output: BytesMut) {
        assert!(
            self.output_available == 0,
            "cannot push output: {} produced bytes have not been popped",
            self.output_available
        );
        self.output_base = output.as_ptr() as usize;
        self.output_offset = 0;
        self.output = output;
    }

    /// Pushes a freshly allocated, zeroed output buffer of `len` bytes.
    ///
    /// # Panics
    ///
    /// As [`Stream::push_output_buffer`].
    pub fn push_output_space(&mut self, len: usize) {
        self.push_output_buffer(BytesMut::zeroed(len));
    }

    /// Takes the bytes produced since the last pop without copying them.
    ///
    /// # Panics
    ///
    /// Panics if no output bytes are available.
    pub fn pop_output_buffer(&mut self) -> Bytes {
        assert!(self.output_available > 0, "no output bytes available to pop");
        let produced = self.output.split_to(self.output_available).freeze();
        self.output_offset += self.output_available;
        self.output_available = 0;
        produced
    }

    /// Returns the number of produced bytes waiting to be popped.
    #[must_use]
    pub const fn output_bytes_available(&self) -> usize {
        self.output_available
    }

    /// Returns the number of bytes the engine may still write into the
    /// current output buffer.
    #[must_use]
    pub fn output_space_remaining(&self) -> usize {
        self.output.len() - self.output_available
    }

    /// Reports whether the current output buffer has no free space left.
    #[must_use]
    pub fn output_buffer_full(&self) -> bool {
        self.output_space_remaining() == 0
    }

    /// Returns how many bytes of the current output buffer have already been
    /// popped.
    #[must_use]
    pub const fn output_buffer_offset(&self) -> usize {
        self.output_offset
    }

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    /// Compresses as much of the current input as the output space allows.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ZlibError`] after releasing the native state, or an
    /// [`ErrorKind::Stream`] error if it was already released.
    ///
    /// # Panics
    ///
    /// Panics on a decompressing stream or when there is no output space.
    pub fn deflate(&mut self, flush: Flush) -> Result<Status, ZlibError> {
        self.step(Direction::Compress, flush)
    }

    /// Decompresses as much of the current input as the output space allows.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ZlibError`] after releasing the native state, or an
    /// [`ErrorKind::Stream`] error if it was already released.
    ///
    /// # Panics
    ///
    /// Panics on a compressing stream or when there is no output space.
    pub fn inflate(&mut self, flush: Flush) -> Result<Status, ZlibError> {
        self.step(Direction::Decompress, flush)
    }

    fn step(&mut self, expected: Direction, flush: Flush) -> Result<Status, ZlibError> {
        let space = self.output_space_remaining();
        let Some(engine) = self.engine.as_mut() else {
            return Err(ZlibError::finalized());
        };
        assert!(
            self.direction == expected,
            "cannot {} on a {} stream",
            expected.step_name(),
            self.direction
        );
        assert!(
            space > 0,
            "no output space: push an output buffer before calling {}",
            expected.step_name()
        );

        let outcome = engine.step(
            &self.input,
            &mut self.output[self.output_available..],
            flush.raw(),
        );
        let translated = status::translate(outcome.code, engine);
        self.record_progress(outcome);

        match translated {
            Ok(status) => {
                if let Status::NeedDictionary(hash) = status {
                    self.pending_dictionary = Some(hash);
                }
                debug_zlib::trace_step(
                    self.direction,
                    flush,
                    outcome.consumed,
                    outcome.produced,
                    status,
                );
                Ok(status)
            }
            Err(error) => self.fail(expected.step_name(), error),
        }
    }

    fn record_progress(&mut self, outcome: StepOutcome) {
        self.input.advance(outcome.consumed);
        self.output_available += outcome.produced;
        self.total_in += outcome.consumed as u64;
        self.total_out += outcome.produced as u64;
        debug_assert_eq!(
            outcome.write_cursor - self.output_base,
            self.output_offset + self.output_available,
            "engine write cursor diverged from output bookkeeping"
        );
    }

    /// Changes the level and strategy of a compressing stream mid-stream.
    ///
    /// The engine may compress pending input with the old settings first, so
    /// this consumes input and produces output like a step does.
    ///
    /// # Errors
    ///
    /// As [`Stream::deflate`].
    ///
    /// # Panics
    ///
    /// Panics on a decompressing stream.
    pub fn set_params(
        &mut self,
        level: CompressionLevel,
        strategy: Strategy,
    ) -> Result<Status, ZlibError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(ZlibError::finalized());
        };
        assert!(
            self.direction == Direction::Compress,
            "cannot change compression parameters on a {} stream",
            self.direction
        );

        let outcome = engine.params(
            &self.input,
            &mut self.output[self.output_available..],
            level.raw(),
            strategy.raw(),
        );
        let translated = status::translate(outcome.code, engine);
        self.record_progress(outcome);
        match translated {
            Ok(status) => Ok(status),
            Err(error) => self.fail("set_params", error),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Returns the engine to its freshly initialised state, keeping the
    /// parameters it was created with. Totals restart from zero.
    ///
    /// # Errors
    ///
    /// Any failure is fatal and releases the native state.
    ///
    /// # Panics
    ///
    /// Panics if unconsumed input or unpopped output remains.
    pub fn reset(&mut self) -> Result<(), ZlibError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(ZlibError::finalized());
        };
        assert!(
            self.input.is_empty() && self.output_available == 0,
            "cannot reset with buffered data: {} input bytes unconsumed, {} output bytes unpopped",
            self.input.len(),
            self.output_available
        );

        let code = engine.reset();
        let result = status::fail_if_error(code, || engine.message());
        match result {
            Ok(()) => {
                debug_zlib::trace_reset(self.direction, self.total_in, self.total_out);
                self.total_in = 0;
                self.total_out = 0;
                self.pending_dictionary = None;
                Ok(())
            }
            Err(error) => self.fail("reset", error),
        }
    }

    /// Resets a decompressing stream so it can decode the next member of a
    /// multi-member input. Trailing input must be taken back with
    /// [`Stream::pop_remaining_input_buffer`] first.
    ///
    /// # Errors
    ///
    /// As [`Stream::reset`].
    ///
    /// # Panics
    ///
    /// Panics on a compressing stream, or as [`Stream::reset`].
    pub fn inflate_reset(&mut self) -> Result<(), ZlibError> {
        assert!(
            self.direction == Direction::Decompress,
            "inflate_reset called on a {} stream",
            self.direction
        );
        self.reset()
    }

    /// Releases the native state. Calling it again does nothing.
    pub fn finalize(&mut self) {
        if let Some(engine) = self.engine.take() {
            drop(engine);
            debug_zlib::trace_finalize(self.direction, self.total_in, self.total_out);
        }
    }

    fn fail<T>(&mut self, operation: &str, error: ZlibError) -> Result<T, ZlibError> {
        debug_zlib::trace_fatal(self.direction, operation, &error);
        self.finalize();
        Err(error)
    }

    // ------------------------------------------------------------------
    // Dictionaries
    // ------------------------------------------------------------------

    /// Installs a preset dictionary.
    ///
    /// When compressing, call it right after creation or [`Stream::reset`].
    /// When decompressing zlib data, call it after a step reports
    /// [`Status::NeedDictionary`]; for raw deflate, before the first step.
    ///
    /// # Errors
    ///
    /// Formats without dictionary support and dictionaries longer than
    /// `u32::MAX` bytes are rejected with an [`ErrorKind::Stream`] error and
    /// leave the stream usable. Engine failures, including a dictionary whose
    /// hash does not match the one the stream asked for, are fatal.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<(), ZlibError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(ZlibError::finalized());
        };
        if !self.format.supports_dictionary() {
            return Err(ZlibError::new(
                ErrorKind::Stream,
                format!("the {} format does not support preset dictionaries", self.format),
            ));
        }
        if u32::try_from(dictionary.len()).is_err() {
            return Err(ZlibError::new(
                ErrorKind::Stream,
                format!("dictionary of {} bytes is too large", dictionary.len()),
            ));
        }

        let code = engine.set_dictionary(dictionary);
        let result = status::fail_if_error(code, || engine.message());
        match result {
            Ok(()) => {
                self.pending_dictionary = None;
                Ok(())
            }
            Err(error) => self.fail("set_dictionary", error),
        }
    }

    /// Returns the hash reported by the last [`Status::NeedDictionary`], until
    /// a dictionary is installed.
    #[must_use]
    pub const fn pending_dictionary(&self) -> Option<DictionaryHash> {
        self.pending_dictionary
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    /// Returns the input bytes consumed since creation or the last reset.
    #[must_use]
    pub const fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Returns the output bytes produced since creation or the last reset.
    #[must_use]
    pub const fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Returns the engine's running checksum of the uncompressed data:
    /// CRC-32 for gzip, Adler-32 otherwise. `None` once finalised.
    #[must_use]
    pub fn stream_checksum(&self) -> Option<u32> {
        self.engine.as_ref().map(EngineHandle::adler)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("direction", &self.direction)
            .field("format", &self.format)
            .field("finalized", &self.is_finalized())
            .field("input_remaining", &self.input.len())
            .field("output_offset", &self.output_offset)
            .field("output_available", &self.output_available)
            .field("output_space", &self.output_space_remaining())
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}

fn ensure_supported(format: Format, version: EngineVersion) -> Result<(), InitError> {
    if format.requires_gzip_support() && !version.supports_gzip() {
        return Err(InitError::UnsupportedFormat {
            format,
            version: version.as_str().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deflater(format: Format) -> Stream {
        Stream::compress(&CompressParams::new(format)).expect("compress init")
    }

    fn inflater(format: Format) -> Stream {
        Stream::decompress(&DecompressParams::new(format)).expect("decompress init")
    }

    #[test]
    fn new_stream_has_empty_buffers() {
        let stream = deflater(Format::Zlib);
        assert!(stream.input_buffer_empty());
        assert_eq!(stream.input_remaining(), 0);
        assert_eq!(stream.output_bytes_available(), 0);
        assert_eq!(stream.output_space_remaining(), 0);
        assert!(stream.output_buffer_full());
        assert_eq!(stream.output_buffer_offset(), 0);
        assert!(!stream.is_finalized());
        assert_eq!(stream.direction(), Direction::Compress);
        assert_eq!(stream.format(), Format::Zlib);
    }

    #[test]
    fn compress_rejects_decode_only_format() {
        let err = Stream::compress(&CompressParams::new(Format::GzipOrZlib))
            .expect_err("auto-detection cannot compress");
        assert_eq!(
            err,
            InitError::Parameter(ParameterError::DecodeOnlyFormat(Format::GzipOrZlib))
        );
    }

    #[test]
    fn old_engines_cannot_use_gzip() {
        let old = EngineVersion::parse("1.1.4");
        assert!(matches!(
            ensure_supported(Format::Gzip, old),
            Err(InitError::UnsupportedFormat {
                format: Format::Gzip,
                ..
            })
        ));
        assert!(ensure_supported(Format::GzipOrZlib, old).is_err());
        assert!(ensure_supported(Format::Zlib, old).is_ok());
        assert!(ensure_supported(Format::Raw, old).is_ok());
    }

    #[test]
    fn pop_output_advances_offset() {
        let mut stream = deflater(Format::Raw);
        stream.push_input_buffer(Bytes::from_static(b"abcabcabcabc"));
        stream.push_output_space(64);
        assert_eq!(stream.deflate(Flush::Finish), Ok(Status::StreamEnd));
        let produced = stream.output_bytes_available();
        assert!(produced > 0);
        assert_eq!(stream.output_space_remaining(), 64 - produced);

        let popped = stream.pop_output_buffer();
        assert_eq!(popped.len(), produced);
        assert_eq!(stream.output_buffer_offset(), produced);
        assert_eq!(stream.output_bytes_available(), 0);
        assert_eq!(stream.output_space_remaining(), 64 - produced);
        assert_eq!(stream.total_in(), 12);
        assert_eq!(stream.total_out(), produced as u64);
    }

    #[test]
    fn pop_remaining_input_returns_unconsumed_tail() {
        let mut stream = inflater(Format::Zlib);
        stream.push_input_buffer(Bytes::from_static(b"not yet consumed"));
        let tail = stream.pop_remaining_input_buffer();
        assert_eq!(&tail[..], b"not yet consumed");
        assert!(stream.input_buffer_empty());
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut stream = inflater(Format::Raw);
        stream.finalize();
        stream.finalize();
        assert!(stream.is_finalized());
        assert_eq!(stream.stream_checksum(), None);
    }

    #[test]
    fn operations_after_finalize_report_stream_errors() {
        let mut stream = deflater(Format::Zlib);
        stream.finalize();
        stream.push_output_space(16);
        assert_eq!(
            stream.deflate(Flush::Finish).expect_err("finalized").kind(),
            ErrorKind::Stream
        );
        assert_eq!(stream.reset().expect_err("finalized").kind(), ErrorKind::Stream);
        assert_eq!(
            stream.set_dictionary(b"dict").expect_err("finalized").kind(),
            ErrorKind::Stream
        );
    }

    #[test]
    fn gzip_dictionary_is_rejected_without_finalizing() {
        let mut stream = deflater(Format::Gzip);
        let err = stream.set_dictionary(b"dictionary").expect_err("gzip has no dictionary");
        assert_eq!(err.kind(), ErrorKind::Stream);
        assert!(err.kind().is_fatal());
        assert!(!stream.is_finalized());
    }

    #[test]
    #[should_panic(expected = "cannot inflate on a compression stream")]
    fn stepping_in_the_wrong_direction_panics() {
        let mut stream = deflater(Format::Zlib);
        stream.push_output_space(16);
        let _ = stream.inflate(Flush::NoFlush);
    }

    #[test]
    #[should_panic(expected = "inflate_reset called on a compression stream")]
    fn inflate_reset_requires_decompression() {
        let mut stream = deflater(Format::Zlib);
        let _ = stream.inflate_reset();
    }

    #[test]
    fn debug_output_names_direction() {
        let stream = inflater(Format::Gzip);
        let rendered = format!("{stream:?}");
        assert!(rendered.contains("Decompress"));
        assert!(rendered.contains("Gzip"));
    }

    #[test]
    fn stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Stream>();
    }
}
