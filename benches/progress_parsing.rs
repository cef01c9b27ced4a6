use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ffwrap::domain::model::TimeSpec;
use ffwrap::engine::progress::ProgressParser;

fn diagnostic_lines() -> Vec<String> {
    let mut lines = vec![
        "Input #0, matroska,webm, from 'movie.mkv':".to_string(),
        "  Duration: 01:30:00.00, start: 0.000000, bitrate: 5000 kb/s".to_string(),
        "  Stream #0:0: Video: h264, yuv420p, 1920x1080".to_string(),
    ];
    for second in 0..5400 {
        lines.push(format!(
            "frame={:>6} fps=240 q=28.0 size={:>8}kB time={} bitrate=1000.0kbits/s speed=9.6x",
            second * 25,
            second * 125,
            TimeSpec::from_seconds(second as f64)
        ));
    }
    lines
}

fn bench_progress_parsing(c: &mut Criterion) {
    let lines = diagnostic_lines();

    c.bench_function("parse_stderr_lines", |b| {
        b.iter(|| {
            let mut parser = ProgressParser::new();
            let mut events = 0usize;
            for line in &lines {
                events += parser.parse_stderr_line(black_box(line)).len();
            }
            events += parser.force_complete().len();
            events
        })
    });

    c.bench_function("parse_time_value", |b| {
        b.iter(|| TimeSpec::parse(black_box("01:23:45.6789")))
    });
}

criterion_group!(benches, bench_progress_parsing);
criterion_main!(benches);
