//! Flush directives accepted by the step operations.

use core::fmt;
use std::ffi::c_int;

/// How eagerly a step should force buffered data out, in increasing strength
/// (with [`Flush::Block`] as the advanced exception).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Flush {
    /// Let the engine buffer as much as it likes.
    #[default]
    NoFlush,
    /// Emit everything so far and align to a byte boundary. The stream stays
    /// open and the compression history is kept.
    SyncFlush,
    /// Like [`Flush::SyncFlush`] but also discard the match history, so the
    /// output after this point can be decoded without what came before.
    FullFlush,
    /// Signal the end of input. Repeat until the step reports
    /// [`Status::StreamEnd`](crate::Status::StreamEnd).
    Finish,
    /// Stop at the next deflate block boundary.
    Block,
}

impl Flush {
    pub(crate) const fn raw(self) -> c_int {
        match self {
            Self::NoFlush => libz_sys::Z_NO_FLUSH,
            Self::SyncFlush => libz_sys::Z_SYNC_FLUSH,
            Self::FullFlush => libz_sys::Z_FULL_FLUSH,
            Self::Finish => libz_sys::Z_FINISH,
            Self::Block => libz_sys::Z_BLOCK,
        }
    }

    /// Returns the engine's name for the directive.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoFlush => "Z_NO_FLUSH",
            Self::SyncFlush => "Z_SYNC_FLUSH",
            Self::FullFlush => "Z_FULL_FLUSH",
            Self::Finish => "Z_FINISH",
            Self::Block => "Z_BLOCK",
        }
    }
}

impl fmt::Display for Flush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
