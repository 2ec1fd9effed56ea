//! ffmpeg argument building and subprocess execution shared by both transcoders.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{SourceSpec, TranscodeError, TranscodeResult};
use crate::core::audio::AudioFormat;

/// Placeholder understood by ffmpeg as stdin.
pub(super) const STDIN: &str = "pipe:0";

/// Placeholder understood by ffmpeg as stdout.
pub(super) const STDOUT: &str = "pipe:1";

/// Ordered ffmpeg command line.
///
/// Input flags always precede `-i`, output flags always precede the output
/// location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfmpegArgs {
    args: Vec<OsString>,
}

impl FfmpegArgs {
    /// Quiet, non-interactive, overwrite allowed.
    pub fn new() -> Self {
        let mut args = Self::default();
        args.push_all(["-hide_banner", "-loglevel", "error", "-y"]);
        args
    }

    /// Declare the input. Headerless formats get explicit rate/channel flags.
    pub fn input(mut self, source: &SourceSpec, raw_pcm_default: u32, location: impl AsRef<OsStr>) -> Self {
        let demuxer = match source.format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::PcmS16le => "s16le",
            AudioFormat::Ulaw8k => "mulaw",
        };
        self.push_all(["-f", demuxer]);

        if let Some(rate) = source.input_rate(raw_pcm_default) {
            self.push_all(["-ar".to_string(), rate.to_string(), "-ac".to_string(), "1".to_string()]);
        }

        self.push("-i");
        self.push(location);
        self
    }

    /// Raw PCM16 little-endian output.
    pub fn pcm_output(mut self, sample_rate: u32, channels: u16, location: impl AsRef<OsStr>) -> Self {
        self.push_all([
            "-f".to_string(),
            "s16le".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            channels.to_string(),
        ]);
        self.push(location);
        self
    }

    /// MP3 output through libmp3lame.
    pub fn mp3_output(mut self, sample_rate: u32, bitrate_kbps: u32, location: impl AsRef<OsStr>) -> Self {
        self.push_all([
            "-f".to_string(),
            "mp3".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            format!("{bitrate_kbps}k"),
            "-ar".to_string(),
            sample_rate.to_string(),
        ]);
        self.push(location);
        self
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.args
    }

    /// Lossy string view, for logs and tests.
    pub fn to_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn push(&mut self, arg: impl AsRef<OsStr>) {
        self.args.push(arg.as_ref().to_os_string());
    }

    fn push_all<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.push(arg);
        }
    }
}

/// Run ffmpeg to completion and return its stdout.
///
/// `stdin_data` is streamed to the child when present; otherwise stdin is
/// closed. The child is killed if `deadline` elapses.
pub(super) async fn run_ffmpeg(
    program: &Path,
    args: &FfmpegArgs,
    stdin_data: Option<Vec<u8>>,
    deadline: Duration,
) -> TranscodeResult<Vec<u8>> {
    debug!(
        program = %program.display(),
        args = ?args.to_strings(),
        "Spawning transcoder"
    );

    let mut command = Command::new(program);
    command
        .args(args.as_slice())
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| {
        TranscodeError::Failed(format!(
            "failed to spawn {}: {e}",
            program.display()
        ))
    })?;

    // Feed stdin from a separate task so a full stdout pipe can't deadlock us
    let writer = match (stdin_data, child.stdin.take()) {
        (Some(data), Some(mut stdin)) => Some(tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&data).await {
                // ffmpeg may exit before draining stdin; the exit status reports why
                debug!(error = %e, "Transcoder stdin closed early");
            }
            drop(stdin);
        })),
        _ => None,
    };

    let output = timeout(deadline, child.wait_with_output())
        .await
        .map_err(|_| TranscodeError::Timeout(deadline))?
        .map_err(|e| TranscodeError::Failed(format!("failed to wait for transcoder: {e}")))?;

    finish_stdin_writer(writer).await;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        return Err(TranscodeError::Failed(detail));
    }

    Ok(output.stdout)
}

/// Wait for the stdin writer. A failed task is logged; the exit status and
/// output decide the result. Returns whether the writer finished cleanly.
async fn finish_stdin_writer(writer: Option<JoinHandle<()>>) -> bool {
    let Some(writer) = writer else {
        return true;
    };

    match writer.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Transcoder stdin writer task failed");
            false
        }
    }
}

/// Reject empty transcoder output.
pub(super) fn ensure_not_empty(output: Vec<u8>) -> TranscodeResult<Vec<u8>> {
    if output.is_empty() {
        return Err(TranscodeError::Failed("empty output".to_string()));
    }
    Ok(output)
}
