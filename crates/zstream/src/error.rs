//! Error types reported by parameter validation, stream initialisation and
//! engine operations.
//!
//! Three families exist:
//!
//! - [`ParameterError`] is raised while building tuning values, before any
//!   native state is allocated.
//! - [`InitError`] wraps everything that can go wrong while creating a
//!   [`Stream`](crate::Stream).
//! - [`ZlibError`] is a fatal engine condition. By the time a caller sees one
//!   from a step, reset or dictionary operation, the stream has already been
//!   finalised.
//!
//! Recoverable engine conditions are not errors; they are reported through
//! [`Status`](crate::Status).

use std::fmt;
use std::io;

use thiserror::Error;

use crate::format::Format;
use crate::stream::Direction;

/// Errors produced when a tuning parameter falls outside its legal range.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParameterError {
    /// Compression levels must fall within `0..=9`.
    #[error("compression level {0} is outside the supported range 0-9")]
    CompressionLevel(u32),
    /// Window sizes must fall within `9..=15`.
    #[error("window bits {0} is outside the supported range 9-15")]
    WindowBits(u32),
    /// Memory levels must fall within `1..=9`.
    #[error("memory level {0} is outside the supported range 1-9")]
    MemoryLevel(u32),
    /// The format can only be used to decompress.
    #[error("the {0} format can only be used for decompression")]
    DecodeOnlyFormat(Format),
    /// A format name did not match any known format.
    #[error("unsupported stream format: {input}")]
    UnknownFormat {
        /// The rejected input.
        input: String,
    },
    /// A strategy name did not match any known strategy.
    #[error("unsupported compression strategy: {input}")]
    UnknownStrategy {
        /// The rejected input.
        input: String,
    },
}

/// Classification of a non-success engine code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// `Z_ERRNO`: the engine reported a file system error.
    File,
    /// `Z_STREAM_ERROR`: inconsistent stream state or invalid parameter.
    Stream,
    /// `Z_DATA_ERROR`: the compressed input is corrupt or incomplete.
    Data,
    /// `Z_MEM_ERROR`: the engine could not allocate memory.
    Memory,
    /// `Z_BUF_ERROR`: no progress was possible with the supplied buffers.
    Buffer,
    /// `Z_VERSION_ERROR`: the linked library is incompatible.
    Version,
    /// Any other code, kept verbatim.
    Unexpected(i32),
}

impl ErrorKind {
    /// Returns `false` only for [`ErrorKind::Buffer`], the one engine code a
    /// step reports as a recoverable [`Status::BufferError`].
    ///
    /// This classifies the code, not a particular stream: whether a returned
    /// [`ZlibError`] ended its stream is reported by [`Stream::is_finalized`].
    ///
    /// [`Status::BufferError`]: crate::Status::BufferError
    /// [`Stream::is_finalized`]: crate::Stream::is_finalized
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Buffer)
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "file error",
            Self::Stream => "stream error",
            Self::Data => "data error",
            Self::Memory => "memory error",
            Self::Buffer => "buffer error",
            Self::Version => "version error",
            Self::Unexpected(_) => "unexpected status",
        }
    }

    fn fallback_message(self) -> String {
        match self {
            Self::File => "file error".to_owned(),
            Self::Stream => "inconsistent stream state".to_owned(),
            Self::Data => "invalid or incomplete compressed data".to_owned(),
            Self::Memory => "insufficient memory".to_owned(),
            Self::Buffer => "no progress possible with the supplied buffers".to_owned(),
            Self::Version => "incompatible zlib library version".to_owned(),
            Self::Unexpected(code) => format!("unexpected zlib status {code}"),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An engine failure carrying the engine's own diagnostic text when available.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("zlib {kind}: {message}")]
pub struct ZlibError {
    kind: ErrorKind,
    message: String,
}

impl ZlibError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error from an engine code classification, falling back to a
    /// generic description when the engine left no message.
    pub(crate) fn from_engine(kind: ErrorKind, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| kind.fallback_message());
        Self { kind, message }
    }

    pub(crate) fn finalized() -> Self {
        Self::new(ErrorKind::Stream, "stream has already been finalized")
    }

    /// Returns the classification of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the diagnostic text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ZlibError> for io::Error {
    fn from(err: ZlibError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Data => io::ErrorKind::InvalidData,
            ErrorKind::Memory => io::ErrorKind::OutOfMemory,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Errors raised while creating a [`Stream`](crate::Stream).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InitError {
    /// A parameter was rejected before the engine was touched.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// The linked engine is too old for the requested format.
    #[error("zlib {version} cannot handle the {format} format; version 1.2 or later is required")]
    UnsupportedFormat {
        /// Format that was requested.
        format: Format,
        /// Version string reported by the engine.
        version: String,
    },
    /// The engine's init routine returned a non-success code.
    #[error("failed to initialise {direction} stream: {source}")]
    Engine {
        /// Direction of the stream being created.
        direction: Direction,
        /// Engine diagnostic.
        #[source]
        source: ZlibError,
    },
}
