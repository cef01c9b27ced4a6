//! FFmpeg execution adapter
//!
//! Launches ffmpeg as a child process and streams its output line by line.
//! ffmpeg rewrites its status line with carriage returns, so both `\r` and
//! `\n` end a line here.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::domain::model::ProcessOutput;
use crate::engine::command::display_command;
use crate::ports::{LineSink, ProcessRunner};

const READ_BUFFER_SIZE: usize = 8192;

/// Splits a byte stream on `\r` and `\n`, skipping empty lines
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if let Some(line) = self.take() {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Whatever is left once the stream ends
    pub fn finish(&mut self) -> Option<String> {
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stdout,
    Stderr,
}

fn deliver(channel: Channel, line: String, sink: &mut dyn LineSink, output: &mut ProcessOutput) {
    match channel {
        Channel::Stdout => {
            sink.on_stdout(&line);
            output.stdout.push(line);
        }
        Channel::Stderr => {
            sink.on_stderr(&line);
            output.stderr.push(line);
        }
    }
}

/// FFmpeg-based process runner
pub struct FFmpegAdapter {
    program: PathBuf,
}

impl FFmpegAdapter {
    /// Create a runner for the given ffmpeg binary
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program_path(&self) -> &Path {
        &self.program
    }

    fn launch_error(&self, err: std::io::Error) -> ProcessOutput {
        ProcessOutput::launch_failure(format!(
            "failed to start {}: {}",
            self.program.display(),
            err
        ))
    }
}

#[async_trait]
impl ProcessRunner for FFmpegAdapter {
    fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    async fn run(&self, args: &[String], sink: &mut dyn LineSink) -> ProcessOutput {
        info!("Running {}", display_command(&self.program(), args));

        let mut child = match tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return self.launch_error(e),
        };

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            return ProcessOutput::launch_failure("child process pipes were not captured");
        };

        let mut output = ProcessOutput::default();
        let mut out_lines = LineSplitter::default();
        let mut err_lines = LineSplitter::default();
        let mut out_buf = vec![0u8; READ_BUFFER_SIZE];
        let mut err_buf = vec![0u8; READ_BUFFER_SIZE];
        let mut out_open = true;
        let mut err_open = true;

        while out_open || err_open {
            tokio::select! {
                read = stdout.read(&mut out_buf), if out_open => match read {
                    Ok(0) => {
                        out_open = false;
                        if let Some(line) = out_lines.finish() {
                            deliver(Channel::Stdout, line, sink, &mut output);
                        }
                    }
                    Ok(n) => {
                        for line in out_lines.push(&out_buf[..n]) {
                            deliver(Channel::Stdout, line, sink, &mut output);
                        }
                    }
                    Err(e) => {
                        out_open = false;
                        output.exception = Some(format!("reading stdout: {}", e));
                    }
                },
                read = stderr.read(&mut err_buf), if err_open => match read {
                    Ok(0) => {
                        err_open = false;
                        if let Some(line) = err_lines.finish() {
                            deliver(Channel::Stderr, line, sink, &mut output);
                        }
                    }
                    Ok(n) => {
                        for line in err_lines.push(&err_buf[..n]) {
                            deliver(Channel::Stderr, line, sink, &mut output);
                        }
                    }
                    Err(e) => {
                        err_open = false;
                        output.exception = Some(format!("reading stderr: {}", e));
                    }
                },
            }
        }

        match child.wait().await {
            Ok(status) => output.exit_code = status.code().unwrap_or(-1),
            Err(e) => {
                output.exit_code = -1;
                output.exception = Some(format!("waiting for {}: {}", self.program.display(), e));
            }
        }
        debug!("{} exited with code {}", self.program.display(), output.exit_code);
        output
    }

    fn run_blocking(&self, args: &[String], sink: &mut dyn LineSink) -> ProcessOutput {
        info!("Running {}", display_command(&self.program(), args));

        let mut child = match std::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return self.launch_error(e),
        };

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            return ProcessOutput::launch_failure("child process pipes were not captured");
        };

        let (tx, rx) = mpsc::channel::<(Channel, Result<String, String>)>();
        let readers = [
            spawn_reader(Channel::Stdout, stdout, tx.clone()),
            spawn_reader(Channel::Stderr, stderr, tx),
        ];

        let mut output = ProcessOutput::default();
        for (channel, message) in rx {
            match message {
                Ok(line) => deliver(channel, line, sink, &mut output),
                Err(e) => output.exception = Some(e),
            }
        }
        for reader in readers {
            let _ = reader.join();
        }

        match child.wait() {
            Ok(status) => output.exit_code = status.code().unwrap_or(-1),
            Err(e) => {
                output.exit_code = -1;
                output.exception = Some(format!("waiting for {}: {}", self.program.display(), e));
            }
        }
        debug!("{} exited with code {}", self.program.display(), output.exit_code);
        output
    }
}

fn spawn_reader<R>(
    channel: Channel,
    mut pipe: R,
    tx: mpsc::Sender<(Channel, Result<String, String>)>,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut lines = LineSplitter::default();
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => {
                    if let Some(line) = lines.finish() {
                        let _ = tx.send((channel, Ok(line)));
                    }
                    break;
                }
                Ok(n) => {
                    for line in lines.push(&buf[..n]) {
                        if tx.send((channel, Ok(line))).is_err() {
                            return;
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = tx.send((channel, Err(format!("reading {:?}: {}", channel, e))));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        stdout: Vec<String>,
        stderr: Vec<String>,
    }

    impl LineSink for Collect {
        fn on_stdout(&mut self, line: &str) {
            self.stdout.push(line.to_string());
        }
        fn on_stderr(&mut self, line: &str) {
            self.stderr.push(line.to_string());
        }
    }

    #[test]
    fn test_line_splitter_handles_carriage_returns() {
        let mut splitter = LineSplitter::default();
        assert_eq!(splitter.push(b"frame=1 time=00:00:01.00\rframe=2"), vec!["frame=1 time=00:00:01.00"]);
        assert_eq!(splitter.push(b" time=00:00:02.00\r\nDone\n"), vec!["frame=2 time=00:00:02.00", "Done"]);
        assert_eq!(splitter.push(b"tail"), Vec::<String>::new());
        assert_eq!(splitter.finish(), Some("tail".to_string()));
        assert_eq!(splitter.finish(), None);
    }

    #[cfg(unix)]
    fn script() -> Vec<String> {
        vec![
            "-c".to_string(),
            "echo out; echo err 1>&2; printf 'frame=1\\rframe=2\\n' 1>&2; exit 3".to_string(),
        ]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_async_run_streams_lines_and_exit_code() {
        let runner = FFmpegAdapter::new("sh");
        let mut sink = Collect::default();
        let output = runner.run(&script(), &mut sink).await;

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.exception, None);
        assert_eq!(output.stdout, vec!["out"]);
        assert_eq!(output.stderr, vec!["err", "frame=1", "frame=2"]);
        assert_eq!(sink.stderr, output.stderr);
        assert_eq!(sink.stdout, output.stdout);
    }

    #[cfg(unix)]
    #[test]
    fn test_blocking_run_streams_lines_and_exit_code() {
        let runner = FFmpegAdapter::new("sh");
        let mut sink = Collect::default();
        let output = runner.run_blocking(&script(), &mut sink);

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, vec!["out"]);
        assert_eq!(output.stderr, vec!["err", "frame=1", "frame=2"]);
        assert_eq!(sink.stderr.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_program_is_an_exception() {
        let runner = FFmpegAdapter::new("/definitely/not/a/real/ffmpeg");
        let output = runner.run(&[], &mut Collect::default()).await;
        assert_eq!(output.exit_code, -1);
        assert!(output.exception.unwrap().contains("failed to start"));

        let blocking = runner.run_blocking(&[], &mut Collect::default());
        assert!(blocking.exception.is_some());
    }
}
