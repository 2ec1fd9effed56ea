use async_trait::async_trait;
use tracing::{debug, warn};

use super::ffmpeg::{FfmpegArgs, STDIN, STDOUT, ensure_not_empty, run_ffmpeg};
use super::{SourceSpec, TranscodeResult, Transcoder, TranscoderConfig};

/// Transcoder that streams through ffmpeg's stdin/stdout.
///
/// No filesystem artifacts are created. Containers whose demuxer needs to seek
/// (some WAV variants) may fail in this mode where the temp-file mode works.
#[derive(Debug, Clone)]
pub struct PipeTranscoder {
    config: TranscoderConfig,
}

impl PipeTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    async fn run(&self, input: &[u8], args: FfmpegArgs) -> TranscodeResult<Vec<u8>> {
        let output = run_ffmpeg(
            &self.config.ffmpeg_path,
            &args,
            Some(input.to_vec()),
            self.config.timeout,
        )
        .await
        .inspect_err(|e| warn!(error = %e, "Transcode failed"))?;

        debug!(
            input_bytes = input.len(),
            output_bytes = output.len(),
            "Transcode finished"
        );
        ensure_not_empty(output)
    }

    fn input_args(&self, source: &SourceSpec) -> FfmpegArgs {
        FfmpegArgs::new().input(source, self.config.raw_pcm_sample_rate, STDIN)
    }
}

#[async_trait]
impl Transcoder for PipeTranscoder {
    async fn to_pcm(
        &self,
        input: &[u8],
        source: SourceSpec,
        target_rate: u32,
        target_channels: u16,
    ) -> TranscodeResult<Vec<u8>> {
        let args = self
            .input_args(&source)
            .pcm_output(target_rate, target_channels, STDOUT);
        self.run(input, args).await
    }

    async fn to_mp3(&self, input: &[u8], source: SourceSpec) -> TranscodeResult<Vec<u8>> {
        let args = self.input_args(&source).mp3_output(
            self.config.preview_sample_rate,
            self.config.mp3_bitrate_kbps,
            STDOUT,
        );
        self.run(input, args).await
    }

    fn name(&self) -> &'static str {
        "pipe"
    }
}
