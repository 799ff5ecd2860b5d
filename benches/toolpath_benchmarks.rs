use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use laser_gcode_tools::machine::build_path;
use laser_gcode_tools::{build_layer_trace, classify_text, ParsedLine};
use std::hint::black_box;

/// Approximate a raster job with arcs between passes
fn generate_laser_job(size_mb: usize) -> String {
    let target_bytes = size_mb * 1024 * 1024;
    let mut content = String::with_capacity(target_bytes + 1000);

    let mut row = 0usize;
    while content.len() < target_bytes {
        let y = (row as f64) * 0.1;
        content.push_str(&format!("G0 X0 Y{:.3} S0\n", y));
        content.push_str(&format!("G1 X50 S{} F3000\n", row % 1000));
        content.push_str(&format!("G2 X50 Y{:.3} I0 J0.05\n", y + 0.1));
        content.push_str("G1 X0\n");
        row += 1;
    }

    content
}

/// Approximate a print job with layer changes and thermal commands
fn generate_print_job(size_mb: usize) -> String {
    let target_bytes = size_mb * 1024 * 1024;
    let mut content = String::with_capacity(target_bytes + 1000);

    let mut layer = 0usize;
    while content.len() < target_bytes {
        layer += 1;
        content.push_str(&format!("G1 Z{:.2} F600\n", (layer as f64) * 0.2));
        content.push_str(&format!("M104 S{}\n", 200 + layer % 15));
        content.push_str(&format!("M106 S{}\n", layer % 256));
        for i in 0..20 {
            content.push_str(&format!("G1 X{} Y{} E0.1\n", i, (i * 7) % 20));
        }
    }

    content
}

fn bench_build_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_path");

    for size_mb in [1, 5, 10] {
        let content = generate_laser_job(size_mb);
        let lines: Vec<ParsedLine> = classify_text(&content);

        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::new("size_mb", size_mb), &lines, |b, lines| {
            b.iter(|| {
                let toolpath = build_path(black_box(lines));
                black_box(toolpath.segments.len())
            })
        });
    }
    group.finish();
}

fn bench_build_layer_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_layer_trace");

    for size_mb in [1, 5, 10] {
        let content = generate_print_job(size_mb);
        let lines: Vec<ParsedLine> = classify_text(&content);

        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::new("size_mb", size_mb), &lines, |b, lines| {
            b.iter(|| {
                let trace = build_layer_trace(black_box(lines));
                black_box(trace.records.len())
            })
        });
    }
    group.finish();
}

fn bench_tessellation(c: &mut Criterion) {
    let toolpath = build_path(&classify_text(&generate_laser_job(1)));

    let mut group = c.benchmark_group("tessellation");
    for samples in [16, 100] {
        group.bench_with_input(BenchmarkId::new("samples", samples), &samples, |b, &samples| {
            b.iter(|| black_box(toolpath.polylines(samples).len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_path, bench_build_layer_trace, bench_tessellation);
criterion_main!(benches);
