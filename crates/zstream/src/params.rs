//! Validated tuning parameters and the stream configuration built from them.
//!
//! Each value type checks its range when constructed, so a [`Stream`] never
//! hands the engine a value it would reject, and knows its raw engine
//! encoding. [`CompressParams`] and [`DecompressParams`] bundle them together
//! with a suggested chunk size for callers that drive the stream in a loop.
//!
//! # Examples
//!
//! ```
//! use zstream::{CompressParams, CompressionLevel, Format, Strategy, WindowBits};
//!
//! let params = CompressParams::new(Format::Gzip)
//!     .with_level(CompressionLevel::Best)
//!     .with_window_bits(WindowBits::new(12).unwrap())
//!     .with_strategy(Strategy::Filtered);
//! assert_eq!(params.window_bits().get(), 12);
//! ```
//!
//! [`Stream`]: crate::Stream

use core::fmt;
use core::str::FromStr;
use std::ffi::c_int;
use std::num::NonZeroU8;

use crate::error::ParameterError;
use crate::format::Format;

const CHUNK_OVERHEAD: usize = 2 * std::mem::size_of::<usize>();

/// Suggested output chunk size when compressing: 16 KiB less allocator overhead.
pub const DEFAULT_COMPRESS_BUFFER_SIZE: usize = 16 * 1024 - CHUNK_OVERHEAD;

/// Suggested output chunk size when decompressing: 32 KiB less allocator overhead.
pub const DEFAULT_DECOMPRESS_BUFFER_SIZE: usize = 32 * 1024 - CHUNK_OVERHEAD;

/// Compression levels recognised by the engine.
///
/// Presets and [`CompressionLevel::Precise`] are distinct values even when
/// they name the same numeric level. [`CompressionLevel::from_numeric`] always
/// picks the preset, so a level survives a trip through its numeric form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub enum CompressionLevel {
    /// Level 0: store the input without compressing it.
    None,
    /// Level 1: favour speed over compression ratio.
    Fast,
    /// The engine's default balance, equivalent to level 6.
    #[default]
    Default,
    /// Level 9: favour the best possible compression ratio.
    Best,
    /// An explicit level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Creates a level from its numeric value.
    ///
    /// `0`, `1`, `6` and `9` map to their presets; the remaining levels in
    /// `2..=8` map to [`CompressionLevel::Precise`].
    pub fn from_numeric(level: u32) -> Result<Self, ParameterError> {
        match level {
            0 => Ok(Self::None),
            1 => Ok(Self::Fast),
            6 => Ok(Self::Default),
            9 => Ok(Self::Best),
            2..=8 => NonZeroU8::new(level as u8)
                .map(Self::Precise)
                .ok_or(ParameterError::CompressionLevel(level)),
            _ => Err(ParameterError::CompressionLevel(level)),
        }
    }

    /// Returns the numeric level in `0..=9`.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Fast => 1,
            Self::Default => 6,
            Self::Best => 9,
            Self::Precise(level) => level.get(),
        }
    }

    pub(crate) const fn raw(self) -> c_int {
        match self {
            Self::Default => libz_sys::Z_DEFAULT_COMPRESSION,
            other => other.value() as c_int,
        }
    }
}

impl TryFrom<u32> for CompressionLevel {
    type Error = ParameterError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        Self::from_numeric(level)
    }
}

impl From<CompressionLevel> for u32 {
    fn from(level: CompressionLevel) -> Self {
        Self::from(level.value())
    }
}

/// Base-two logarithm of the sliding window size.
///
/// Larger windows find longer-range matches; the decompressor's memory use
/// depends only on this value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct WindowBits(u8);

impl WindowBits {
    /// Smallest supported window (512 bytes).
    pub const MIN: Self = Self(9);
    /// Largest supported window (32 KiB), also the default.
    pub const MAX: Self = Self(15);

    /// Validates `bits` against `9..=15`.
    pub fn new(bits: u8) -> Result<Self, ParameterError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(ParameterError::WindowBits(u32::from(bits)))
        }
    }

    /// Returns the exponent.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the window size in bytes.
    #[must_use]
    pub const fn window_size(self) -> usize {
        1 << self.0
    }

    /// Encodes the exponent the way the engine expects for `format`: offset by
    /// 16 for gzip, by 32 for auto-detection, and negated for raw deflate.
    #[must_use]
    pub const fn raw(self, format: Format) -> c_int {
        let bits = self.0 as c_int;
        match format {
            Format::Zlib => bits,
            Format::Gzip => bits + 16,
            Format::GzipOrZlib => bits + 32,
            Format::Raw => -bits,
        }
    }
}

impl Default for WindowBits {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for WindowBits {
    type Error = ParameterError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<WindowBits> for u8 {
    fn from(bits: WindowBits) -> Self {
        bits.get()
    }
}

/// How much memory the compressor may use for its internal state.
///
/// Higher levels are faster and compress slightly better. Decompression is
/// unaffected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct MemoryLevel(u8);

impl MemoryLevel {
    /// Minimum memory, slowest.
    pub const MIN: Self = Self(1);
    /// The engine's default.
    pub const DEFAULT: Self = Self(8);
    /// Maximum memory, fastest.
    pub const MAX: Self = Self(9);

    /// Validates `level` against `1..=9`.
    pub fn new(level: u8) -> Result<Self, ParameterError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ParameterError::MemoryLevel(u32::from(level)))
        }
    }

    /// Returns the level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    pub(crate) const fn raw(self) -> c_int {
        self.0 as c_int
    }
}

impl Default for MemoryLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for MemoryLevel {
    type Error = ParameterError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<MemoryLevel> for u8 {
    fn from(level: MemoryLevel) -> Self {
        level.get()
    }
}

/// Tuning hint for the match finder. Only the ratio and speed change; every
/// strategy produces a valid stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Strategy {
    /// Normal data.
    #[default]
    Default,
    /// Data produced by a filter or predictor: small values, random distribution.
    Filtered,
    /// Huffman coding only, no string matching.
    HuffmanOnly,
    /// Matches limited to distance one (run-length encoding).
    Rle,
    /// Fixed Huffman codes only.
    Fixed,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Filtered,
        Self::HuffmanOnly,
        Self::Rle,
        Self::Fixed,
    ];

    /// Returns the canonical name used in diagnostics and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Filtered => "filtered",
            Self::HuffmanOnly => "huffman-only",
            Self::Rle => "rle",
            Self::Fixed => "fixed",
        }
    }

    pub(crate) const fn raw(self) -> c_int {
        match self {
            Self::Default => libz_sys::Z_DEFAULT_STRATEGY,
            Self::Filtered => libz_sys::Z_FILTERED,
            Self::HuffmanOnly => libz_sys::Z_HUFFMAN_ONLY,
            Self::Rle => libz_sys::Z_RLE,
            Self::Fixed => libz_sys::Z_FIXED,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "filtered" => Ok(Self::Filtered),
            "huffman-only" | "huffman" => Ok(Self::HuffmanOnly),
            "rle" => Ok(Self::Rle),
            "fixed" => Ok(Self::Fixed),
            other => Err(ParameterError::UnknownStrategy {
                input: other.to_owned(),
            }),
        }
    }
}

/// Compression method. zlib only implements deflate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Method {
    /// The deflate algorithm.
    #[default]
    Deflated,
}

impl Method {
    pub(crate) const fn raw(self) -> c_int {
        match self {
            Self::Deflated => libz_sys::Z_DEFLATED,
        }
    }
}

/// Settings for a compressing [`Stream`](crate::Stream).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CompressParams {
    format: Format,
    level: CompressionLevel,
    method: Method,
    window_bits: WindowBits,
    memory_level: MemoryLevel,
    strategy: Strategy,
    buffer_size: usize,
}

impl CompressParams {
    /// Creates default settings for `format`.
    #[must_use]
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Replaces the compression level.
    #[must_use]
    pub const fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Replaces the compression method.
    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replaces the window size.
    #[must_use]
    pub const fn with_window_bits(mut self, window_bits: WindowBits) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Replaces the memory level.
    #[must_use]
    pub const fn with_memory_level(mut self, memory_level: MemoryLevel) -> Self {
        self.memory_level = memory_level;
        self
    }

    /// Replaces the strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replaces the suggested output chunk size. Zero is treated as one.
    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Returns the stream format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Returns the compression level.
    #[must_use]
    pub const fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Returns the compression method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the window size.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window_bits
    }

    /// Returns the memory level.
    #[must_use]
    pub const fn memory_level(&self) -> MemoryLevel {
        self.memory_level
    }

    /// Returns the strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the suggested output chunk size, never zero.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            format: Format::default(),
            level: CompressionLevel::default(),
            method: Method::default(),
            window_bits: WindowBits::default(),
            memory_level: MemoryLevel::default(),
            strategy: Strategy::default(),
            buffer_size: DEFAULT_COMPRESS_BUFFER_SIZE,
        }
    }
}

/// Settings for a decompressing [`Stream`](crate::Stream).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DecompressParams {
    format: Format,
    window_bits: WindowBits,
    buffer_size: usize,
}

impl DecompressParams {
    /// Creates default settings for `format`.
    #[must_use]
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Replaces the window size. It must be at least as large as the one the
    /// stream was compressed with.
    #[must_use]
    pub const fn with_window_bits(mut self, window_bits: WindowBits) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Replaces the suggested output chunk size. Zero is treated as one.
    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Returns the stream format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Returns the window size.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window_bits
    }

    /// Returns the suggested output chunk size, never zero.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

impl Default for DecompressParams {
    fn default() -> Self {
        Self {
            format: Format::default(),
            window_bits: WindowBits::default(),
            buffer_size: DEFAULT_DECOMPRESS_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_level_constructor_accepts_valid_range() {
        assert_eq!(CompressionLevel::from_numeric(0), Ok(CompressionLevel::None));
        assert_eq!(CompressionLevel::from_numeric(1), Ok(CompressionLevel::Fast));
        assert_eq!(CompressionLevel::from_numeric(6), Ok(CompressionLevel::Default));
        assert_eq!(CompressionLevel::from_numeric(9), Ok(CompressionLevel::Best));
        for level in [2, 3, 4, 5, 7, 8] {
            let precise = CompressionLevel::from_numeric(level).expect("valid level");
            let expected = NonZeroU8::new(level as u8).expect("validated");
            assert_eq!(precise, CompressionLevel::Precise(expected));
            assert_eq!(u32::from(precise), level);
        }
    }

    #[test]
    fn numeric_form_round_trips_every_level() {
        for level in 0..=9 {
            let parsed = CompressionLevel::from_numeric(level).expect("valid level");
            assert_eq!(CompressionLevel::try_from(u32::from(parsed)), Ok(parsed));
        }
        for preset in [
            CompressionLevel::None,
            CompressionLevel::Fast,
            CompressionLevel::Default,
            CompressionLevel::Best,
        ] {
            assert_eq!(CompressionLevel::try_from(u32::from(preset)), Ok(preset));
        }
    }

    #[test]
    fn numeric_level_constructor_rejects_out_of_range() {
        let err = CompressionLevel::from_numeric(10).expect_err("level above 9 rejected");
        assert_eq!(err, ParameterError::CompressionLevel(10));
    }

    #[test]
    fn presets_map_to_engine_levels() {
        assert_eq!(CompressionLevel::None.raw(), 0);
        assert_eq!(CompressionLevel::Fast.raw(), 1);
        assert_eq!(CompressionLevel::Default.raw(), -1);
        assert_eq!(CompressionLevel::Default.value(), 6);
        assert_eq!(CompressionLevel::Best.raw(), 9);
    }

    #[test]
    fn window_bits_range_is_enforced() {
        assert_eq!(WindowBits::new(8), Err(ParameterError::WindowBits(8)));
        assert_eq!(WindowBits::new(16), Err(ParameterError::WindowBits(16)));
        for bits in 9..=15 {
            assert_eq!(WindowBits::new(bits).expect("valid").get(), bits);
        }
        assert_eq!(WindowBits::default(), WindowBits::MAX);
        assert_eq!(WindowBits::MAX.window_size(), 32 * 1024);
    }

    #[test]
    fn window_bits_encoding_depends_on_format() {
        let bits = WindowBits::new(12).expect("valid");
        assert_eq!(bits.raw(Format::Zlib), 12);
        assert_eq!(bits.raw(Format::Gzip), 28);
        assert_eq!(bits.raw(Format::GzipOrZlib), 44);
        assert_eq!(bits.raw(Format::Raw), -12);
    }

    #[test]
    fn memory_level_range_is_enforced() {
        assert_eq!(MemoryLevel::new(0), Err(ParameterError::MemoryLevel(0)));
        assert_eq!(MemoryLevel::new(10), Err(ParameterError::MemoryLevel(10)));
        assert_eq!(MemoryLevel::default().get(), 8);
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
        assert!(matches!(
            "lz77".parse::<Strategy>(),
            Err(ParameterError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn strategy_codes_match_zlib() {
        let raw: Vec<_> = Strategy::ALL.iter().map(|s| s.raw()).collect();
        assert_eq!(raw, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn params_builders_replace_fields() {
        let params = CompressParams::new(Format::Raw)
            .with_level(CompressionLevel::Fast)
            .with_memory_level(MemoryLevel::MAX)
            .with_strategy(Strategy::Rle)
            .with_buffer_size(0);
        assert_eq!(params.format(), Format::Raw);
        assert_eq!(params.level(), CompressionLevel::Fast);
        assert_eq!(params.memory_level(), MemoryLevel::MAX);
        assert_eq!(params.strategy(), Strategy::Rle);
        assert_eq!(params.buffer_size(), 1);
        assert_eq!(params.method(), Method::Deflated);
    }

    #[test]
    fn default_buffer_sizes_leave_room_for_overhead() {
        assert!(CompressParams::default().buffer_size() < 16 * 1024);
        assert!(DecompressParams::default().buffer_size() < 32 * 1024);
        assert_eq!(
            DecompressParams::new(Format::GzipOrZlib).format(),
            Format::GzipOrZlib
        );
    }
}
