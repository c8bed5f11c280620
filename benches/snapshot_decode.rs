//! Benchmarks for shared-memory snapshot decoding
//!
//! Covers the per-poll work of the monitor loop:
//! - Header reads and validity checks
//! - Full decode (fixed block plus every slot) for both layouts
//! - Name lookups through the layout
//! - The non-zero sweep used by the memory scanner
//!
//! Platform: Cross-platform (synthetic snapshots, CI-safe)

use aerobridge::layout::MemoryLayout;
use aerobridge::snapshot::{ACTIVE_THRESHOLD, SnapshotView, SnapshotWriter, Value};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Populated snapshot resembling a C172 in cruise.
fn cruise_snapshot(layout: MemoryLayout) -> Vec<u8> {
    let mut writer = SnapshotWriter::new(layout);
    writer.set_header(1_700_000_000_000_000, 1, 4242);
    for (name, value) in [
        ("Aircraft.Latitude", 0.8267),
        ("Aircraft.Longitude", -2.1364),
        ("Aircraft.Altitude", 1524.0),
        ("Aircraft.IndicatedAirspeed", 51.4),
        ("Aircraft.Pitch", 0.035),
        ("Aircraft.Bank", -0.01),
        ("Aircraft.OnGround", 0.0),
    ] {
        writer.set_field(name, Value::F64(value)).expect("known field");
    }
    for index in (0..layout.slot_count).step_by(3) {
        writer.set_slot(index, index as f64 * 0.5).expect("slot in range");
    }
    writer.into_bytes()
}

fn bench_header(c: &mut Criterion) {
    let bytes = cruise_snapshot(MemoryLayout::FULL);
    let view = SnapshotView::new(&bytes, MemoryLayout::FULL);

    let mut group = c.benchmark_group("header");
    group.bench_function("read_header", |b| b.iter(|| black_box(view.header())));
    group.bench_function("is_valid", |b| b.iter(|| black_box(view.is_valid())));
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for layout in [MemoryLayout::COMPACT, MemoryLayout::FULL] {
        let bytes = cruise_snapshot(layout);
        group.bench_function(BenchmarkId::new("full_snapshot", layout.version), |b| {
            b.iter(|| {
                let view = SnapshotView::new(black_box(&bytes), layout);
                black_box(view.decode())
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let bytes = cruise_snapshot(MemoryLayout::FULL);
    let view = SnapshotView::new(&bytes, MemoryLayout::FULL);
    let decoded = view.decode().expect("valid snapshot");

    let mut group = c.benchmark_group("lookup");
    group.bench_function("view_fixed_field", |b| {
        b.iter(|| black_box(view.value(black_box("Aircraft.Altitude"))))
    });
    group.bench_function("view_late_slot", |b| {
        b.iter(|| black_box(view.value(black_box("Navigation.ILS2Data"))))
    });
    group.bench_function("decoded_get", |b| {
        b.iter(|| black_box(decoded.get(black_box("Controls.Throttle"))))
    });
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let bytes = cruise_snapshot(MemoryLayout::FULL);
    let view = SnapshotView::new(&bytes, MemoryLayout::FULL);

    let mut group = c.benchmark_group("memory_scan");
    group.bench_function("active_slots", |b| {
        b.iter(|| black_box(view.active_slots(ACTIVE_THRESHOLD)))
    });
    group.bench_function("active_fixed_offsets", |b| {
        b.iter(|| black_box(view.active_fixed_offsets(ACTIVE_THRESHOLD)))
    });
    group.finish();
}

criterion_group!(benches, bench_header, bench_decode, bench_lookup, bench_scan);
criterion_main!(benches);
