//! Translation of raw engine codes into [`Status`] and [`ZlibError`].

use std::ffi::c_int;

use libz_sys as ffi;

use crate::checksum::DictionaryHash;
use crate::engine::EngineHandle;
use crate::error::{ErrorKind, ZlibError};

/// Non-fatal outcome of a step.
#[must_use]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// Progress was made; call again with more input or output space.
    Ok,
    /// The end of the compressed data was reached. Further steps need a reset.
    StreamEnd,
    /// Decompression is paused until the dictionary with this hash is
    /// installed with [`Stream::set_dictionary`](crate::Stream::set_dictionary).
    NeedDictionary(DictionaryHash),
    /// No progress was possible with the current buffers. Supply more input or
    /// output space and retry.
    BufferError,
}

impl Status {
    /// Reports whether the stream reached its end.
    #[must_use]
    pub const fn is_stream_end(self) -> bool {
        matches!(self, Self::StreamEnd)
    }

    /// Returns the required dictionary hash, if decompression is waiting on one.
    #[must_use]
    pub const fn needed_dictionary(self) -> Option<DictionaryHash> {
        match self {
            Self::NeedDictionary(hash) => Some(hash),
            _ => None,
        }
    }
}

/// Translates the code returned by a step. Only codes that end the stream
/// become errors.
pub(crate) fn translate(code: c_int, engine: &EngineHandle) -> Result<Status, ZlibError> {
    match code {
        ffi::Z_OK => Ok(Status::Ok),
        ffi::Z_STREAM_END => Ok(Status::StreamEnd),
        ffi::Z_NEED_DICT => Ok(Status::NeedDictionary(DictionaryHash::from_raw(
            engine.adler(),
        ))),
        ffi::Z_BUF_ERROR => Ok(Status::BufferError),
        other => Err(engine_error(other, engine.message())),
    }
}

/// Treats everything other than `Z_OK` and `Z_STREAM_END` as a failure,
/// `Z_BUF_ERROR` included. Used where partial progress is meaningless.
pub(crate) fn fail_if_error(
    code: c_int,
    message: impl FnOnce() -> Option<String>,
) -> Result<(), ZlibError> {
    match code {
        ffi::Z_OK | ffi::Z_STREAM_END => Ok(()),
        other => Err(engine_error(other, message())),
    }
}

pub(crate) fn engine_error(code: c_int, message: Option<String>) -> ZlibError {
    ZlibError::from_engine(error_kind(code), message)
}

fn error_kind(code: c_int) -> ErrorKind {
    match code {
        ffi::Z_ERRNO => ErrorKind::File,
        ffi::Z_STREAM_ERROR => ErrorKind::Stream,
        ffi::Z_DATA_ERROR => ErrorKind::Data,
        ffi::Z_MEM_ERROR => ErrorKind::Memory,
        ffi::Z_BUF_ERROR => ErrorKind::Buffer,
        ffi::Z_VERSION_ERROR => ErrorKind::Version,
        other => ErrorKind::Unexpected(other),
    }
}
