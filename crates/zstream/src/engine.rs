//! Binding to the zlib C API.
//!
//! This is the only module that touches `libz-sys`. It owns the native
//! `z_stream`, points it at caller buffers for the duration of a single call,
//! and releases it when dropped. Status codes are returned raw; translation
//! happens in [`crate::status`].

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ffi::{CStr, c_int, c_uint, c_void};
use std::{fmt, mem, ptr};

use libz_sys as ffi;

use crate::error::ZlibError;
use crate::status;
use crate::stream::Direction;

/// Largest span the engine can address in one call; its counters are `uInt`.
const MAX_SPAN: usize = c_uint::MAX as usize;

const STREAM_SIZE: c_int = mem::size_of::<ffi::z_stream>() as c_int;

/// Progress made by one engine call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct StepOutcome {
    pub(crate) code: c_int,
    pub(crate) consumed: usize,
    pub(crate) produced: usize,
    /// Address the engine would write the next output byte to.
    pub(crate) write_cursor: usize,
}

/// An initialised native stream.
///
/// The `z_stream` is boxed because zlib keeps a back-pointer to it inside its
/// private state and rejects calls made through a moved copy.
pub(crate) struct EngineHandle {
    raw: Box<ffi::z_stream>,
    direction: Direction,
}

// SAFETY: the native state is private to this handle and only reachable
// through `&mut self`, so moving it to another thread is sound.
unsafe impl Send for EngineHandle {}

impl EngineHandle {
    pub(crate) fn compress(
        level: c_int,
        method: c_int,
        window_bits: c_int,
        memory_level: c_int,
        strategy: c_int,
    ) -> Result<Self, ZlibError> {
        let mut raw = Box::new(blank_stream());
        // SAFETY: `raw` is a zeroed stream with valid allocator callbacks and
        // the version/size pair describes the library we link against.
        let code = unsafe {
            ffi::deflateInit2_(
                &mut *raw,
                level,
                method,
                window_bits,
                memory_level,
                strategy,
                ffi::zlibVersion(),
                STREAM_SIZE,
            )
        };
        Self::adopt(raw, Direction::Compress, code)
    }

    pub(crate) fn decompress(window_bits: c_int) -> Result<Self, ZlibError> {
        let mut raw = Box::new(blank_stream());
        // SAFETY: as for `compress`.
        let code =
            unsafe { ffi::inflateInit2_(&mut *raw, window_bits, ffi::zlibVersion(), STREAM_SIZE) };
        Self::adopt(raw, Direction::Decompress, code)
    }

    fn adopt(raw: Box<ffi::z_stream>, direction: Direction, code: c_int) -> Result<Self, ZlibError> {
        // A failed init has already freed whatever it allocated, so the box
        // is dropped without calling the matching end routine.
        status::fail_if_error(code, || message_of(&raw))?;
        Ok(Self { raw, direction })
    }

    /// Runs `deflate` or `inflate` over the given buffers.
    pub(crate) fn step(&mut self, input: &[u8], output: &mut [u8], flush: c_int) -> StepOutcome {
        let direction = self.direction;
        self.with_buffers(input, output, |strm| {
            // SAFETY: `strm` is initialised and its buffer pointers cover
            // slices that outlive the call.
            unsafe {
                match direction {
                    Direction::Compress => ffi::deflate(strm, flush),
                    Direction::Decompress => ffi::inflate(strm, flush),
                }
            }
        })
    }

    /// Runs `deflateParams`, which may compress pending input into `output`.
    pub(crate) fn params(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        level: c_int,
        strategy: c_int,
    ) -> StepOutcome {
        debug_assert_eq!(self.direction, Direction::Compress);
        self.with_buffers(input, output, |strm| {
            // SAFETY: as for `step`.
            unsafe { ffi::deflateParams(strm, level, strategy) }
        })
    }

    pub(crate) fn reset(&mut self) -> c_int {
        self.raw.msg = ptr::null_mut();
        // SAFETY: the stream is initialised and holds no buffer pointers
        // between calls.
        unsafe {
            match self.direction {
                Direction::Compress => ffi::deflateReset(&mut *self.raw),
                Direction::Decompress => ffi::inflateReset(&mut *self.raw),
            }
        }
    }

    /// Installs a preset dictionary. The caller guarantees the length fits
    /// the engine's counter type.
    pub(crate) fn set_dictionary(&mut self, dictionary: &[u8]) -> c_int {
        debug_assert!(dictionary.len() <= MAX_SPAN);
        let len = dictionary.len() as c_uint;
        self.raw.msg = ptr::null_mut();
        // SAFETY: the engine copies the dictionary before returning.
        unsafe {
            match self.direction {
                Direction::Compress => {
                    ffi::deflateSetDictionary(&mut *self.raw, dictionary.as_ptr(), len)
                }
                Direction::Decompress => {
                    ffi::inflateSetDictionary(&mut *self.raw, dictionary.as_ptr(), len)
                }
            }
        }
    }

    /// The diagnostic text from the most recent engine call, if any.
    pub(crate) fn message(&self) -> Option<String> {
        message_of(&self.raw)
    }

    /// The engine's running checksum. After `Z_NEED_DICT` this holds the
    /// identifier of the required dictionary.
    pub(crate) fn adler(&self) -> u32 {
        self.raw.adler as u32
    }

    fn with_buffers(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        call: impl FnOnce(*mut ffi::z_stream) -> c_int,
    ) -> StepOutcome {
        let avail_in = input.len().min(MAX_SPAN);
        let avail_out = output.len().min(MAX_SPAN);
        let raw = &mut *self.raw;
        raw.next_in = input.as_ptr().cast_mut();
        raw.avail_in = avail_in as c_uint;
        raw.next_out = output.as_mut_ptr();
        raw.avail_out = avail_out as c_uint;
        // `msg` is only ever set, never cleared, by the engine.
        raw.msg = ptr::null_mut();

        let code = call(ptr::from_mut(raw));

        let outcome = StepOutcome {
            code,
            consumed: avail_in - raw.avail_in as usize,
            produced: avail_out - raw.avail_out as usize,
            write_cursor: raw.next_out as usize,
        };
        // The buffers belong to the caller; never keep pointers into them.
        raw.next_in = ptr::null_mut();
        raw.avail_in = 0;
        raw.next_out = ptr::null_mut();
        raw.avail_out = 0;
        outcome
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // SAFETY: a handle only exists after a successful init and is dropped
        // exactly once.
        unsafe {
            match self.direction {
                Direction::Compress => ffi::deflateEnd(&mut *self.raw),
                Direction::Decompress => ffi::inflateEnd(&mut *self.raw),
            };
        }
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("direction", &self.direction)
            .field("total_in", &self.raw.total_in)
            .field("total_out", &self.raw.total_out)
            .finish_non_exhaustive()
    }
}

/// The version string of the linked library.
pub(crate) fn version() -> &'static str {
    // SAFETY: zlibVersion returns a pointer to a static NUL-terminated string.
    let text = unsafe { CStr::from_ptr(ffi::zlibVersion()) };
    text.to_str().unwrap_or("unknown")
}

/// Folds `bytes` into an Adler-32 accumulator.
pub(crate) fn adler32(seed: u32, bytes: &[u8]) -> u32 {
    let mut acc = seed;
    for chunk in bytes.chunks(MAX_SPAN) {
        // SAFETY: `chunk` is a live slice whose length fits in `uInt`.
        acc = unsafe { ffi::adler32(acc as _, chunk.as_ptr(), chunk.len() as c_uint) } as u32;
    }
    acc
}

fn message_of(raw: &ffi::z_stream) -> Option<String> {
    if raw.msg.is_null() {
        return None;
    }
    // SAFETY: zlib only ever stores pointers to static NUL-terminated strings
    // in `msg`.
    let text = unsafe { CStr::from_ptr(raw.msg) };
    Some(text.to_string_lossy().into_owned())
}

fn blank_stream() -> ffi::z_stream {
    ffi::z_stream {
        next_in: ptr::null_mut(),
        avail_in: 0,
        total_in: 0,
        next_out: ptr::null_mut(),
        avail_out: 0,
        total_out: 0,
        msg: ptr::null_mut(),
        state: ptr::null_mut(),
        zalloc,
        zfree,
        opaque: ptr::null_mut(),
        data_type: 0,
        adler: 0,
        reserved: 0,
    }
}

// zlib's allocator callbacks, backed by the Rust global allocator. Each block
// carries its size in a leading word so `zfree` can rebuild the layout.

const ALIGN: usize = mem::align_of::<usize>();

fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

extern "C" fn zalloc(_opaque: *mut c_void, items: c_uint, item_size: c_uint) -> *mut c_void {
    let size = match items
        .checked_mul(item_size)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .map(|bytes| align_up(bytes, ALIGN))
        .and_then(|bytes| bytes.checked_add(mem::size_of::<usize>()))
    {
        Some(size) => size,
        None => return ptr::null_mut(),
    };
    let Ok(layout) = Layout::from_size_align(size, ALIGN) else {
        return ptr::null_mut();
    };
    // SAFETY: `layout` has a non-zero size because it includes the header.
    unsafe {
        let block = alloc::alloc(layout).cast::<usize>();
        if block.is_null() {
            return ptr::null_mut();
        }
        block.write(size);
        block.add(1).cast::<c_void>()
    }
}

extern "C" fn zfree(_opaque: *mut c_void, address: *mut c_void) {
    if address.is_null() {
        return;
    }
    // SAFETY: `address` came from `zalloc`, which stored the block size one
    // word before it.
    unsafe {
        let block = address.cast::<usize>().sub(1);
        let size = block.read();
        let layout = Layout::from_size_align_unchecked(size, ALIGN);
        alloc::dealloc(block.cast::<u8>(), layout);
    }
}
