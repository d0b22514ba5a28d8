//! Container formats understood by the engine.

use core::fmt;
use core::str::FromStr;

use crate::error::ParameterError;

/// Framing applied around the deflate payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Format {
    /// gzip framing: header with metadata and a CRC-32 trailer.
    Gzip,
    /// zlib framing: two-byte header and an Adler-32 trailer.
    #[default]
    Zlib,
    /// Raw deflate without header or trailer.
    Raw,
    /// Accept either gzip or zlib framing, detected from the header.
    /// Only valid when decompressing.
    GzipOrZlib,
}

impl Format {
    /// Every format, in declaration order.
    pub const ALL: [Self; 4] = [Self::Gzip, Self::Zlib, Self::Raw, Self::GzipOrZlib];

    /// Returns the canonical name used in diagnostics and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zlib => "zlib",
            Self::Raw => "raw",
            Self::GzipOrZlib => "gzip-or-zlib",
        }
    }

    /// Reports whether the format may only be used for decompression.
    #[must_use]
    pub const fn is_decode_only(self) -> bool {
        matches!(self, Self::GzipOrZlib)
    }

    /// Reports whether preset dictionaries can be used with the format.
    ///
    /// gzip has no field to carry a dictionary identifier. The auto-detecting
    /// mode accepts dictionaries because the stream may turn out to be zlib.
    #[must_use]
    pub const fn supports_dictionary(self) -> bool {
        !matches!(self, Self::Gzip)
    }

    /// Reports whether the format needs gzip support from the engine.
    #[must_use]
    pub const fn requires_gzip_support(self) -> bool {
        matches!(self, Self::Gzip | Self::GzipOrZlib)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Self::Gzip),
            "zlib" => Ok(Self::Zlib),
            "raw" | "deflate" => Ok(Self::Raw),
            "gzip-or-zlib" | "auto" => Ok(Self::GzipOrZlib),
            other => Err(ParameterError::UnknownFormat {
                input: other.to_owned(),
            }),
        }
    }
}
