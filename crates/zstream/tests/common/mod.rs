//! Drivers shared by the integration tests: feed a whole payload through a
//! stream in fixed-size input and output chunks.

#![allow(dead_code)]

use bytes::Bytes;
use zstream::{CompressParams, DecompressParams, Flush, Status, Stream};

/// Moves any produced bytes into `sink`.
pub fn drain(stream: &mut Stream, sink: &mut Vec<u8>) {
    if stream.output_bytes_available() > 0 {
        sink.extend_from_slice(&stream.pop_output_buffer());
    }
}

/// Compresses `data`, pushing `in_chunk` input bytes and `out_chunk` bytes of
/// output space at a time.
pub fn compress_chunked(
    params: &CompressParams,
    data: &[u8],
    in_chunk: usize,
    out_chunk: usize,
) -> Vec<u8> {
    let mut stream = Stream::compress(params).expect("compress init");
    let mut out = Vec::new();

    for chunk in data.chunks(in_chunk.max(1)) {
        stream.push_input_buffer(Bytes::copy_from_slice(chunk));
        while !stream.input_buffer_empty() {
            if stream.output_buffer_full() {
                stream.push_output_space(out_chunk);
            }
            let status = stream.deflate(Flush::NoFlush).expect("deflate");
            assert_ne!(status, Status::StreamEnd);
            drain(&mut stream, &mut out);
        }
    }

    loop {
        if stream.output_buffer_full() {
            stream.push_output_space(out_chunk);
        }
        let status = stream.deflate(Flush::Finish).expect("deflate finish");
        drain(&mut stream, &mut out);
        if status == Status::StreamEnd {
            break;
        }
    }
    out
}

/// Decompresses `data` in chunks and returns the output. Panics if the input
/// ends before the stream does.
pub fn decompress_chunked(
    params: &DecompressParams,
    data: &[u8],
    in_chunk: usize,
    out_chunk: usize,
) -> Vec<u8> {
    let mut stream = Stream::decompress(params).expect("decompress init");
    let mut out = Vec::new();

    for chunk in data.chunks(in_chunk.max(1)) {
        stream.push_input_buffer(Bytes::copy_from_slice(chunk));
        loop {
            if stream.output_buffer_full() {
                stream.push_output_space(out_chunk);
            }
            let status = stream.inflate(Flush::NoFlush).expect("inflate");
            drain(&mut stream, &mut out);
            match status {
                Status::StreamEnd => return out,
                Status::NeedDictionary(hash) => panic!("unexpected dictionary request {hash}"),
                Status::Ok | Status::BufferError => {}
            }
            if stream.input_buffer_empty() && !stream.output_buffer_full() {
                break;
            }
        }
    }
    panic!("compressed input ended before the stream did");
}

/// Compresses in one go with generous buffers.
pub fn compress(params: &CompressParams, data: &[u8]) -> Vec<u8> {
    compress_chunked(params, data, data.len(), 4096)
}

/// Decompresses in one go with generous buffers.
pub fn decompress(params: &DecompressParams, data: &[u8]) -> Vec<u8> {
    decompress_chunked(params, data, data.len(), 4096)
}

/// Decodes a stream prefix that has no end marker, returning what the
/// engine could produce from it.
pub fn decompress_prefix(params: &DecompressParams, data: &[u8]) -> Vec<u8> {
    let mut stream = Stream::decompress(params).expect("decompress init");
    let mut out = Vec::new();
    stream.push_input_buffer(Bytes::copy_from_slice(data));
    loop {
        if stream.output_buffer_full() {
            stream.push_output_space(4096);
        }
        let status = stream.inflate(Flush::SyncFlush).expect("inflate prefix");
        drain(&mut stream, &mut out);
        assert_ne!(status, Status::StreamEnd, "prefix must not end the stream");
        if stream.input_buffer_empty() && !stream.output_buffer_full() {
            return out;
        }
    }
}

/// Text with enough repetition to compress well but enough variety to span
/// several deflate blocks.
pub fn sample_text(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"stream ", b"buffer ", b"window ", b"deflate ", b"inflate ", b"cursor ", b"member ",
        b"dictionary ",
    ];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 7 + i / 3) % words.len()]);
        i += 1;
    }
    out.truncate(len);
    out
}
