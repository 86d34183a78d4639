use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use gridiron_forecast::aggregate::DataAggregate;
use gridiron_forecast::config::PipelineConfig;
use gridiron_forecast::elo::compute_elo;
use gridiron_forecast::game_log::{GameLog, ScheduledGame};
use gridiron_forecast::rpi::compute_rpi;
use gridiron_forecast::synthetic::{self, LeagueShape};

fn sample_league() -> (GameLog, Vec<ScheduledGame>) {
    let shape = LeagueShape {
        seasons: 5,
        ..LeagueShape::default()
    };
    let league = synthetic::generate(11, shape);
    let (log, _) = GameLog::from_raw(league.rows).unwrap();
    (log, league.events)
}

fn bench_elo(c: &mut Criterion) {
    let (log, _) = sample_league();
    let cfg = PipelineConfig::default();
    c.bench_function("elo_pass", |b| {
        b.iter(|| black_box(compute_elo(black_box(&log), cfg.elo)).len())
    });
}

fn bench_rpi(c: &mut Criterion) {
    let (log, _) = sample_league();
    let cfg = PipelineConfig::default();
    c.bench_function("rpi_pass", |b| {
        b.iter(|| black_box(compute_rpi(black_box(&log), cfg.rpi)).len())
    });
}

fn bench_aggregate_build(c: &mut Criterion) {
    let (log, events) = sample_league();
    c.bench_function("aggregate_build", |b| {
        b.iter(|| {
            let agg =
                DataAggregate::build(log.clone(), black_box(&events), PipelineConfig::default())
                    .unwrap();
            black_box(agg.training().len());
        })
    });
}

criterion_group!(perf, bench_elo, bench_rpi, bench_aggregate_build);
criterion_main!(perf);
