//! Structured tracing for stream lifecycle and step progress.
//!
//! Every function is compiled behind the `tracing` feature flag and becomes an
//! empty inline function when the feature is disabled, so call sites in
//! [`Stream`](crate::Stream) cost nothing in default builds.
//!
//! Events are emitted under the `zstream::engine` target: lifecycle changes at
//! `debug`, individual steps at `trace`, and fatal engine errors at `warn`.

use crate::error::ZlibError;
use crate::flush::Flush;
use crate::format::Format;
use crate::status::Status;
use crate::stream::Direction;

/// Target name for tracing events.
#[cfg(feature = "tracing")]
const ENGINE_TARGET: &str = "zstream::engine";

// ============================================================================
// Tracing functions (feature-gated)
// ============================================================================

/// Traces a successful engine initialisation.
///
/// # Arguments
///
/// * `direction` - Whether the stream compresses or decompresses
/// * `format` - The container format requested
/// * `raw_window_bits` - The window bits as passed to the engine, format offset included
/// * `version` - The engine version string
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_stream_init(direction: Direction, format: Format, raw_window_bits: i32, version: &str) {
    tracing::debug!(
        target: ENGINE_TARGET,
        direction = %direction,
        format = %format,
        raw_window_bits = raw_window_bits,
        version = %version,
        "stream_init"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_stream_init(
    _direction: Direction,
    _format: Format,
    _raw_window_bits: i32,
    _version: &str,
) {
}

/// Traces one `deflate`/`inflate` call.
///
/// # Arguments
///
/// * `direction` - Whether the stream compresses or decompresses
/// * `flush` - The flush directive passed to the engine
/// * `consumed` - Input bytes consumed by the call
/// * `produced` - Output bytes produced by the call
/// * `status` - The recoverable status the call translated to
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_step(
    direction: Direction,
    flush: Flush,
    consumed: usize,
    produced: usize,
    status: Status,
) {
    tracing::trace!(
        target: ENGINE_TARGET,
        direction = %direction,
        flush = %flush,
        consumed = consumed,
        produced = produced,
        status = ?status,
        "step"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_step(
    _direction: Direction,
    _flush: Flush,
    _consumed: usize,
    _produced: usize,
    _status: Status,
) {
}

/// Traces a fatal engine error. The stream is finalised right after.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_fatal(direction: Direction, operation: &str, error: &ZlibError) {
    tracing::warn!(
        target: ENGINE_TARGET,
        direction = %direction,
        operation = operation,
        kind = %error.kind(),
        message = %error.message(),
        "fatal"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_fatal(_direction: Direction, _operation: &str, _error: &ZlibError) {}

/// Traces a successful reset, with the totals of the member that just ended.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_reset(direction: Direction, total_in: u64, total_out: u64) {
    tracing::debug!(
        target: ENGINE_TARGET,
        direction = %direction,
        total_in = total_in,
        total_out = total_out,
        "reset"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_reset(_direction: Direction, _total_in: u64, _total_out: u64) {}

/// Traces release of the native state.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_finalize(direction: Direction, total_in: u64, total_out: u64) {
    tracing::debug!(
        target: ENGINE_TARGET,
        direction = %direction,
        total_in = total_in,
        total_out = total_out,
        "finalize"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_finalize(_direction: Direction, _total_in: u64, _total_out: u64) {}
