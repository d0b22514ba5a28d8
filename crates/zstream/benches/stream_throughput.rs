//! crates/zstream/benches/stream_throughput.rs
//!
//! Benchmarks for driving the engine through the buffer protocol.
//!
//! Run with: `cargo bench -p zstream`

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::Rng;

use zstream::{
    CompressParams, CompressionLevel, DecompressParams, DictionaryHash, Flush, Format, Status,
    Stream, dictionary_hash,
};

/// Generate data that is half random bytes and half repeated text, so it
/// compresses like typical mixed content.
fn generate_mixed_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        if rng.gen_bool(0.5) {
            let mut noise = [0u8; 64];
            rng.fill(&mut noise[..]);
            data.extend_from_slice(&noise);
        } else {
            data.extend_from_slice(b"the quick brown fox jumps over the lazy dog ");
        }
    }
    data.truncate(size);
    data
}

fn run(stream: &mut Stream, input: Bytes, chunk: usize, compress: bool) -> usize {
    let mut produced = 0;
    stream.push_input_buffer(input);
    loop {
        if stream.output_buffer_full() {
            stream.push_output_space(chunk);
        }
        let status = if compress {
            stream.deflate(Flush::Finish)
        } else {
            stream.inflate(Flush::NoFlush)
        }
        .expect("step");
        if stream.output_bytes_available() > 0 {
            produced += stream.pop_output_buffer().len();
        }
        if status == Status::StreamEnd {
            return produced;
        }
    }
}

/// Benchmark compression across levels with the default chunk size.
fn bench_deflate_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("deflate_levels");
    let data = Bytes::from(generate_mixed_data(256 * 1024));
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (name, level) in [
        ("fast", CompressionLevel::Fast),
        ("default", CompressionLevel::Default),
        ("best", CompressionLevel::Best),
    ] {
        let params = CompressParams::new(Format::Zlib).with_level(level);
        group.bench_with_input(BenchmarkId::new("zlib", name), &data, |b, data| {
            b.iter(|| {
                let mut stream = Stream::compress(&params).unwrap();
                black_box(run(&mut stream, data.clone(), params.buffer_size(), true))
            });
        });
    }

    group.finish();
}

/// Benchmark decompression with varying output chunk sizes.
fn bench_inflate_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate_chunk_sizes");
    let data = generate_mixed_data(256 * 1024);
    let compressed = {
        let mut stream = Stream::compress(&CompressParams::new(Format::Gzip)).unwrap();
        let mut out = Vec::new();
        stream.push_input_buffer(Bytes::from(data.clone()));
        loop {
            if stream.output_buffer_full() {
                stream.push_output_space(64 * 1024);
            }
            let status = stream.deflate(Flush::Finish).unwrap();
            if stream.output_bytes_available() > 0 {
                out.extend_from_slice(&stream.pop_output_buffer());
            }
            if status == Status::StreamEnd {
                break;
            }
        }
        Bytes::from(out)
    };
    group.throughput(Throughput::Bytes(data.len() as u64));

    let params = DecompressParams::new(Format::Gzip);
    for chunk in [512, 4096, params.buffer_size(), 256 * 1024] {
        group.bench_with_input(BenchmarkId::new("gzip", chunk), &compressed, |b, compressed| {
            b.iter(|| {
                let mut stream = Stream::decompress(&params).unwrap();
                black_box(run(&mut stream, compressed.clone(), chunk, false))
            });
        });
    }

    group.finish();
}

/// Benchmark the dictionary hash over dictionary-sized inputs.
fn bench_dictionary_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary_hash");

    for size in [256, 4096, 32 * 1024] {
        let data = generate_mixed_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("adler32", size), &data, |b, data| {
            b.iter(|| black_box(dictionary_hash(DictionaryHash::INITIAL, black_box(data))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_deflate_levels,
    bench_inflate_chunk_sizes,
    bench_dictionary_hash
);
criterion_main!(benches);
