use criterion::{black_box, criterion_group, criterion_main, Criterion};

use beat_montage::analysis::{BeatStrengthScorer, BeatTable, EnergyProfiler};
use beat_montage::audio::AudioBuffer;

/// Three minutes of a 440 Hz tone at 22.05 kHz
fn three_minute_tone() -> AudioBuffer {
    let sample_rate = 22050;
    let samples = (0..sample_rate as usize * 180)
        .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
        .collect();
    AudioBuffer::new(samples, sample_rate)
}

fn bench_energy_and_scoring(c: &mut Criterion) {
    let buffer = three_minute_tone();
    let profiler = EnergyProfiler::new(2048, 512).unwrap();

    c.bench_function("rms_curve_3min", |b| {
        b.iter(|| profiler.compute(black_box(&buffer)).unwrap())
    });

    let curve = profiler.compute(&buffer).unwrap();
    let beat_times: Vec<f64> = (0..360).map(|i| i as f64 * 0.5).collect();
    let scorer = BeatStrengthScorer::default();

    c.bench_function("score_360_beats", |b| {
        b.iter(|| scorer.score(black_box(&beat_times), black_box(&curve)).unwrap())
    });

    let strengths = scorer.score(&beat_times, &curve).unwrap();
    let table = BeatTable::build(&beat_times, &strengths).unwrap();

    c.bench_function("above_percentile_360", |b| {
        b.iter(|| table.above_percentile(black_box(0.75)).unwrap())
    });
}

criterion_group!(benches, bench_energy_and_scoring);
criterion_main!(benches);
