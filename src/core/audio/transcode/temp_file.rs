use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ffmpeg::{FfmpegArgs, ensure_not_empty, run_ffmpeg};
use super::{SourceSpec, TranscodeError, TranscodeResult, Transcoder, TranscoderConfig};
use crate::core::audio::AudioFormat;

/// Transcoder that exchanges data with ffmpeg through temporary files.
///
/// Each call creates its own directory `callvoice-<uuid>-*` under the
/// configured temp dir. The directory and both files are removed when the
/// [`TempDir`] guard drops, which covers success, failure and timeout alike.
#[derive(Debug, Clone)]
pub struct TempFileTranscoder {
    config: TranscoderConfig,
}

impl TempFileTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    fn create_workdir(&self) -> TranscodeResult<TempDir> {
        let token = Uuid::new_v4().simple().to_string();
        let prefix = format!("callvoice-{token}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let result = match &self.config.temp_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };

        result.map_err(|e| TranscodeError::Failed(format!("failed to create temp dir: {e}")))
    }

    async fn run(
        &self,
        input: &[u8],
        source: SourceSpec,
        output_format: AudioFormat,
        build: impl FnOnce(FfmpegArgs, &Path) -> FfmpegArgs,
    ) -> TranscodeResult<Vec<u8>> {
        let workdir = self.create_workdir()?;
        let input_path = workdir
            .path()
            .join(format!("input.{}", source.format.extension()));
        let output_path: PathBuf = workdir
            .path()
            .join(format!("output.{}", output_format.extension()));

        tokio::fs::write(&input_path, input)
            .await
            .map_err(|e| TranscodeError::Failed(format!("failed to write input: {e}")))?;

        let args = build(
            FfmpegArgs::new().input(&source, self.config.raw_pcm_sample_rate, &input_path),
            &output_path,
        );

        let result = run_ffmpeg(&self.config.ffmpeg_path, &args, None, self.config.timeout).await;
        if let Err(e) = &result {
            warn!(error = %e, dir = %workdir.path().display(), "Transcode failed");
        }
        result?;

        let output = tokio::fs::read(&output_path)
            .await
            .map_err(|e| TranscodeError::Failed(format!("failed to read output: {e}")))?;

        debug!(
            input_bytes = input.len(),
            output_bytes = output.len(),
            "Transcode finished"
        );

        // workdir drops here and removes both files
        ensure_not_empty(output)
    }
}

#[async_trait]
impl Transcoder for TempFileTranscoder {
    async fn to_pcm(
        &self,
        input: &[u8],
        source: SourceSpec,
        target_rate: u32,
        target_channels: u16,
    ) -> TranscodeResult<Vec<u8>> {
        self.run(input, source, AudioFormat::PcmS16le, |args, out| {
            args.pcm_output(target_rate, target_channels, out)
        })
        .await
    }

    async fn to_mp3(&self, input: &[u8], source: SourceSpec) -> TranscodeResult<Vec<u8>> {
        let rate = self.config.preview_sample_rate;
        let bitrate = self.config.mp3_bitrate_kbps;
        self.run(input, source, AudioFormat::Mp3, |args, out| {
            args.mp3_output(rate, bitrate, out)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "temp_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workdir_naming_and_cleanup() {
        let parent = tempfile::tempdir().unwrap();
        let transcoder = TempFileTranscoder::new(TranscoderConfig {
            temp_dir: Some(parent.path().to_path_buf()),
            ..Default::default()
        });

        let first = transcoder.create_workdir().unwrap();
        let second = transcoder.create_workdir().unwrap();
        assert_ne!(first.path(), second.path());

        let name = first.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("callvoice-"));

        drop(first);
        drop(second);
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_and_cleans_up() {
        let parent = tempfile::tempdir().unwrap();
        let transcoder = TempFileTranscoder::new(TranscoderConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg-binary"),
            temp_dir: Some(parent.path().to_path_buf()),
            ..Default::default()
        });

        let result = transcoder
            .to_pcm(&[0u8; 64], SourceSpec::new(AudioFormat::PcmS16le), 8000, 1)
            .await;

        assert!(matches!(result, Err(TranscodeError::Failed(_))));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
