use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tokio::runtime::Runtime;
use vmi_supervisor::api::ingest::{parse_info, parse_stats};
use vmi_supervisor::registry::{ModuleRegistry, ModuleStats, StatsUpdate};
use vmi_supervisor::telemetry::Frame;

const STATS_FRAME: &str = "IP2VFSTATS ID_:7;NAM:cam7;FPS:29.7;FRM:120;USE:10;KER:2;MEM:4096";
const INFO_FRAME: &str =
    "IP2VFINFOS ID_:5;NAM:cam5;MTN:6005;STA:1700000000;PID:1;PTY:tcp;PDI:0;PFS:4096";

fn bench_frame_decode(c: &mut Criterion) {
    c.bench_function("frame_decode_stats", |b| {
        b.iter(|| black_box(Frame::decode(black_box(STATS_FRAME)).unwrap()));
    });

    c.bench_function("frame_decode_info", |b| {
        b.iter(|| black_box(Frame::decode(black_box(INFO_FRAME)).unwrap()));
    });
}

fn bench_ingest_parse(c: &mut Criterion) {
    let stats_path = Frame::decode(STATS_FRAME).unwrap().to_path();
    let stats_fields = stats_path.trim_start_matches("/modulestats/").to_string();
    let info_fields = format!(
        "{}/IP/192.168.1.10/THUMB/10.0.0.9-ip2vf3-5_frame.png",
        Frame::decode(INFO_FRAME)
            .unwrap()
            .to_path()
            .trim_start_matches("/moduleinfos/")
    );

    c.bench_function("parse_stats_path", |b| {
        b.iter(|| black_box(parse_stats(black_box(&stats_fields)).unwrap()));
    });

    c.bench_function("parse_info_path", |b| {
        b.iter(|| black_box(parse_info(black_box(&info_fields)).unwrap()));
    });
}

fn bench_registry_apply_stats(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("registry_apply_stats");

    for size in [10i64, 100, 1000].iter() {
        let registry = ModuleRegistry::new();
        rt.block_on(async {
            for id in 0..*size {
                registry.get_or_create(id).await;
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let update = StatsUpdate {
                    id: size / 2,
                    stats: ModuleStats {
                        fps: 25.0,
                        frame_count: 1,
                        ..Default::default()
                    },
                };
                black_box(registry.apply_stats(update).await);
            });
        });
    }

    group.finish();
}

fn bench_registry_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let registry = ModuleRegistry::new();
    rt.block_on(async {
        for id in 0..500 {
            registry.get_or_create(id).await;
        }
    });

    c.bench_function("registry_list_500", |b| {
        b.to_async(&rt).iter(|| async { black_box(registry.list().await) });
    });
}

criterion_group!(
    benches,
    bench_frame_decode,
    bench_ingest_parse,
    bench_registry_apply_stats,
    bench_registry_list
);
criterion_main!(benches);
