//! Progress parsing of ffmpeg diagnostics and callbacks for UI integration

use std::io::Write;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::TimeSpec;
use crate::engine::result::FailureReason;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=\s*(-?\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("time pattern is valid")
});

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("duration pattern is valid")
});

/// Something the parser learned from a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// Output timestamp ffmpeg has reached
    Time(TimeSpec),
    /// Completion percentage, two decimals
    Percent(f64),
}

/// Where the parser is in ffmpeg's diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    ReadingInputHeader,
    Running,
    Done,
}

/// Line-by-line state machine over ffmpeg's stderr.
///
/// One parser serves one job. It is not meant to be shared between threads;
/// the runner delivers lines to it one at a time.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    state: ParserState,
    total: Option<TimeSpec>,
    last_percent: i64,
}

impl Default for ProgressParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressParser {
    /// Parser with no known total; the total is learned from input headers
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            total: None,
            last_percent: -1,
        }
    }

    /// Parser seeded with the resolved job duration. Longer `Duration:`
    /// header lines still raise the total; a zero duration seeds nothing.
    pub fn with_expected_duration(expected: TimeSpec) -> Self {
        let mut parser = Self::new();
        if expected > TimeSpec::ZERO {
            parser.total = Some(expected);
        }
        parser
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn total_duration(&self) -> Option<TimeSpec> {
        self.total
    }

    /// Last whole percent reported, -1 before the first
    pub fn last_percent(&self) -> i64 {
        self.last_percent
    }

    /// Feed one stderr line
    pub fn parse_stderr_line(&mut self, line: &str) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        if self.state == ParserState::Done {
            return events;
        }

        let line = line.trim_start();
        if line.starts_with("frame") {
            self.state = ParserState::Running;
            if let Some(captures) = TIME_RE.captures(line) {
                let time = TimeSpec::parse(&captures[1]).unwrap_or_default();
                events.push(ProgressEvent::Time(time));
                if let Some(percent) = self.percent_of(time) {
                    let whole = percent.floor() as i64;
                    if whole > self.last_percent {
                        self.last_percent = whole;
                        events.push(ProgressEvent::Percent(percent));
                    }
                }
            }
        } else if line.starts_with("Input #") {
            self.state = ParserState::ReadingInputHeader;
        } else if self.state == ParserState::ReadingInputHeader {
            if line.starts_with("Stream") || line.starts_with("Output") {
                self.state = ParserState::Idle;
            } else if let Some(captures) = DURATION_RE.captures(line) {
                let duration = TimeSpec::parse(&captures[1]).unwrap_or_default();
                self.observe_duration(duration);
            }
        }
        events
    }

    /// Standard output carries nothing the parser needs
    pub fn parse_stdout_line(&mut self, _line: &str) -> Vec<ProgressEvent> {
        Vec::new()
    }

    /// End-of-job signal: always reports 100%, plus the total when known
    pub fn force_complete(&mut self) -> Vec<ProgressEvent> {
        let mut events = vec![ProgressEvent::Percent(100.0)];
        if let Some(total) = self.total {
            events.push(ProgressEvent::Time(total));
        }
        self.last_percent = 100;
        self.state = ParserState::Done;
        events
    }

    fn observe_duration(&mut self, duration: TimeSpec) {
        if self.total.map_or(true, |total| duration > total) {
            self.total = Some(duration);
        }
    }

    fn percent_of(&self, time: TimeSpec) -> Option<f64> {
        let total = self.total?;
        if total <= TimeSpec::ZERO {
            return None;
        }
        let ratio = time.as_seconds() / total.as_seconds() * 100.0;
        Some((ratio * 100.0).round() / 100.0)
    }
}

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called before the process starts with the expected output length
    fn on_start(&self, expected: TimeSpec);

    /// Called for every timestamp ffmpeg reports
    fn on_time(&self, time: TimeSpec);

    /// Called at most once per whole percent, and once with 100.0 at the end
    fn on_percent(&self, percent: f64);

    /// Called after the job ends; `None` means success
    fn on_complete(&self, failure: Option<&FailureReason>);
}

/// Fans parser events out to every registered callback
#[derive(Clone, Default)]
pub struct ProgressDispatcher {
    callbacks: Vec<Arc<dyn ProgressCallback>>,
}

impl ProgressDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a progress callback
    pub fn add_callback(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks.push(callback);
    }

    pub fn start(&self, expected: TimeSpec) {
        for callback in &self.callbacks {
            callback.on_start(expected);
        }
    }

    pub fn dispatch(&self, events: &[ProgressEvent]) {
        for event in events {
            for callback in &self.callbacks {
                match event {
                    ProgressEvent::Time(time) => callback.on_time(*time),
                    ProgressEvent::Percent(percent) => callback.on_percent(*percent),
                }
            }
        }
    }

    pub fn complete(&self, failure: Option<&FailureReason>) {
        for callback in &self.callbacks {
            callback.on_complete(failure);
        }
    }
}

/// Console progress bar on stderr
pub struct ConsoleProgressCallback {
    verbose: bool,
}

impl ConsoleProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, expected: TimeSpec) {
        if self.verbose {
            eprintln!("Starting transcode, expected length {}", expected);
        }
    }

    fn on_time(&self, time: TimeSpec) {
        if self.verbose {
            eprintln!("  at {}", time);
        }
    }

    fn on_percent(&self, percent: f64) {
        let bar_length = 30;
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * bar_length as f64) as usize;
        let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled);
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r[{}] {:>6.2}%", bar, percent);
        let _ = stderr.flush();
    }

    fn on_complete(&self, failure: Option<&FailureReason>) {
        match failure {
            None => eprintln!("\nDone"),
            Some(reason) => eprintln!("\nFailed: {}", reason),
        }
    }
}

/// JSON-lines progress events on stdout
pub struct JsonProgressCallback {
    output_time_events: bool,
}

impl JsonProgressCallback {
    pub fn new(output_time_events: bool) -> Self {
        Self { output_time_events }
    }
}

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, expected: TimeSpec) {
        let event = serde_json::json!({
            "event": "start",
            "expected_duration": expected.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_time(&self, time: TimeSpec) {
        if self.output_time_events {
            let event = serde_json::json!({
                "event": "time",
                "time": time.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            println!("{}", event);
        }
    }

    fn on_percent(&self, percent: f64) {
        let event = serde_json::json!({
            "event": "progress",
            "percent": percent,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_complete(&self, failure: Option<&FailureReason>) {
        let event = serde_json::json!({
            "event": "complete",
            "success": failure.is_none(),
            "error": failure.map(|reason| reason.to_string()),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}

/// No-op progress callback for when progress reporting is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _expected: TimeSpec) {}
    fn on_time(&self, _time: TimeSpec) {}
    fn on_percent(&self, _percent: f64) {}
    fn on_complete(&self, _failure: Option<&FailureReason>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn percents(events: &[ProgressEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Percent(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn times(events: &[ProgressEvent]) -> Vec<TimeSpec> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Time(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    fn feed(parser: &mut ProgressParser, lines: &[&str]) -> Vec<ProgressEvent> {
        lines
            .iter()
            .flat_map(|line| parser.parse_stderr_line(line))
            .collect()
    }

    #[test]
    fn test_header_duration_then_progress() {
        let mut parser = ProgressParser::new();
        let events = feed(
            &mut parser,
            &[
                "Input #0, matroska,webm, from 'in.mkv':",
                "  Duration: 00:10:00.00, start: 0.000000, bitrate: 5000 kb/s",
                "  Stream #0:0: Video: h264",
                "frame=15000 fps=250 q=28.0 size=  102400kB time=00:05:00.00 bitrate=2796.2kbits/s speed=5x",
            ],
        );

        assert_eq!(times(&events), vec![TimeSpec::from_seconds(300.0)]);
        assert_eq!(percents(&events), vec![50.0]);
        assert_eq!(parser.state(), ParserState::Running);
        assert_eq!(parser.total_duration(), Some(TimeSpec::from_seconds(600.0)));
    }

    #[test]
    fn test_percent_suppressed_within_same_whole_percent() {
        let mut parser = ProgressParser::with_expected_duration(TimeSpec::from_seconds(1000.0));
        let lines: Vec<String> = (0..10)
            .map(|i| format!("frame={} fps=25 time=00:00:{:02}.{:02} bitrate=1k", i, 12, i * 5))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let events = feed(&mut parser, &refs);

        assert_eq!(times(&events).len(), 10);
        assert_eq!(percents(&events), vec![1.2]);
        assert_eq!(parser.last_percent(), 1);
    }

    #[test]
    fn test_percent_is_monotonic() {
        let mut parser = ProgressParser::with_expected_duration(TimeSpec::from_seconds(100.0));
        let events = feed(
            &mut parser,
            &[
                "frame=1 time=00:00:10.00",
                "frame=2 time=00:00:05.00",
                "frame=3 time=00:00:20.50",
            ],
        );
        assert_eq!(percents(&events), vec![10.0, 20.5]);
    }

    #[test]
    fn test_largest_header_duration_wins() {
        let mut parser = ProgressParser::new();
        feed(
            &mut parser,
            &[
                "Input #0, mov, from 'a.mov':",
                "  Duration: 00:02:00.00, start: 0.000000",
                "Input #1, mov, from 'b.mov':",
                "  Duration: 00:05:00.00, start: 0.000000",
                "Input #2, mov, from 'c.mov':",
                "  Duration: 00:01:00.00, start: 0.000000",
                "Output #0, mp4, to 'out.mp4':",
                "  Duration: 00:09:00.00",
            ],
        );
        assert_eq!(parser.total_duration(), Some(TimeSpec::from_seconds(300.0)));
        assert_eq!(parser.state(), ParserState::Idle);
    }

    #[test]
    fn test_longer_header_raises_resolved_duration() {
        let mut parser = ProgressParser::with_expected_duration(TimeSpec::from_seconds(60.0));
        let events = feed(
            &mut parser,
            &[
                "Input #0, matroska, from 'in.mkv':",
                "  Duration: 00:10:00.00",
                "  Stream #0:0: Video: h264",
                "frame=1 time=00:05:00.00",
            ],
        );
        assert_eq!(parser.total_duration(), Some(TimeSpec::from_seconds(600.0)));
        assert_eq!(percents(&events), vec![50.0]);
    }

    #[test]
    fn test_shorter_header_keeps_resolved_duration() {
        let mut parser = ProgressParser::with_expected_duration(TimeSpec::from_seconds(60.0));
        let events = feed(
            &mut parser,
            &[
                "Input #0, matroska, from 'in.mkv':",
                "  Duration: 00:00:40.00",
                "frame=1 time=00:00:30.00",
            ],
        );
        assert_eq!(parser.total_duration(), Some(TimeSpec::from_seconds(60.0)));
        assert_eq!(percents(&events), vec![50.0]);
    }

    #[test]
    fn test_no_total_means_time_only() {
        let mut parser = ProgressParser::new();
        let events = feed(&mut parser, &["frame=1 time=00:00:30.00", "frame=2 time=N/A"]);
        assert_eq!(events, vec![ProgressEvent::Time(TimeSpec::from_seconds(30.0))]);
    }

    #[test]
    fn test_lines_outside_header_are_ignored() {
        let mut parser = ProgressParser::new();
        let events = feed(&mut parser, &["  Duration: 00:10:00.00", "Press [q] to stop"]);
        assert!(events.is_empty());
        assert_eq!(parser.total_duration(), None);
    }

    #[test]
    fn test_force_complete_after_progress() {
        let mut parser = ProgressParser::with_expected_duration(TimeSpec::from_seconds(120.0));
        feed(&mut parser, &["frame=1 time=00:01:00.00", "frame=2 time=00:01:59.00"]);

        let events = parser.force_complete();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Percent(100.0),
                ProgressEvent::Time(TimeSpec::from_seconds(120.0)),
            ]
        );
        assert_eq!(parser.last_percent(), 100);
        assert_eq!(parser.state(), ParserState::Done);
        assert!(parser.parse_stderr_line("frame=3 time=00:02:00.00").is_empty());
    }

    #[test]
    fn test_force_complete_without_total() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.force_complete(), vec![ProgressEvent::Percent(100.0)]);
    }

    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recorder {
        fn on_start(&self, expected: TimeSpec) {
            self.events.lock().unwrap().push(format!("start {}", expected));
        }
        fn on_time(&self, time: TimeSpec) {
            self.events.lock().unwrap().push(format!("time {}", time));
        }
        fn on_percent(&self, percent: f64) {
            self.events.lock().unwrap().push(format!("percent {}", percent));
        }
        fn on_complete(&self, failure: Option<&FailureReason>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {}", failure.is_none()));
        }
    }

    #[test]
    fn test_dispatcher_preserves_event_order() {
        let recorder = Arc::new(Recorder {
            events: Mutex::new(Vec::new()),
        });
        let mut dispatcher = ProgressDispatcher::new();
        dispatcher.add_callback(recorder.clone());

        dispatcher.start(TimeSpec::from_seconds(10.0));
        dispatcher.dispatch(&[
            ProgressEvent::Time(TimeSpec::from_seconds(5.0)),
            ProgressEvent::Percent(50.0),
        ]);
        dispatcher.complete(None);

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "start 00:00:10.0000",
                "time 00:00:05.0000",
                "percent 50",
                "complete true",
            ]
        );
    }
}
