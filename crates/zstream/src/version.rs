//! Capability probe for the linked engine.

use core::fmt;

use crate::engine;

/// Version of the zlib library a stream was created against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineVersion {
    text: &'static str,
    major: u32,
    minor: u32,
}

impl EngineVersion {
    /// Queries the linked library.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(engine::version())
    }

    pub(crate) fn parse(text: &'static str) -> Self {
        let mut parts = text.split('.');
        let major = leading_number(parts.next());
        let minor = leading_number(parts.next());
        Self { text, major, minor }
    }

    /// Returns the version string exactly as the library reports it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.text
    }

    /// Returns the major version, or zero if it could not be parsed.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor version, or zero if it could not be parsed.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// gzip framing through the in-memory API arrived in zlib 1.2.
    #[must_use]
    pub const fn supports_gzip(&self) -> bool {
        self.major > 1 || (self.major == 1 && self.minor >= 2)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

fn leading_number(part: Option<&str>) -> u32 {
    let Some(part) = part else {
        return 0;
    };
    let digits = part.bytes().take_while(u8::is_ascii_digit).count();
    part[..digits].parse().unwrap_or(0)
}
