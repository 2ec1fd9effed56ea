use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use callvoice_tts::{PipelineConfig, ProviderChoice, TTSRequest, TargetFormat, TtsOrchestrator};

/// callvoice - telephony TTS pipeline
#[derive(Parser, Debug)]
#[command(name = "callvoice")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize text and write the audio to a file
    Synth {
        /// Text to speak
        #[arg(short = 't', long = "text")]
        text: String,

        /// auto, elevenlabs or sarvam
        #[arg(short = 'p', long = "provider", default_value = "auto")]
        provider: ProviderChoice,

        /// ElevenLabs voice id or Sarvam speaker name
        #[arg(short = 'v', long = "voice")]
        voice: Option<String>,

        /// telephony (8 kHz µ-law) or preview (MP3)
        #[arg(long = "target", default_value = "telephony")]
        target: TargetFormat,

        /// Locale tag such as hi-IN
        #[arg(short = 'l', long = "language")]
        language: Option<String>,

        /// Output file path
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the speakers routed to Sarvam under auto selection
    Speakers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PipelineConfig::from_file(path).map_err(|e| anyhow!(e.to_string()))?
        }
        None => PipelineConfig::from_env().map_err(|e| anyhow!(e.to_string()))?,
    };

    match cli.command {
        Commands::Speakers => {
            let table = config.speaker_table().map_err(|e| anyhow!(e))?;
            println!(
                "speaker table v{} ({}), default: {}",
                table.version, table.model, table.default_speaker
            );
            for speaker in table.speakers() {
                println!("  {speaker}");
            }
        }
        Commands::Synth {
            text,
            provider,
            voice,
            target,
            language,
            output,
        } => {
            let orchestrator = TtsOrchestrator::from_config(&config)?;

            let mut request = TTSRequest::new(text, target).with_provider(provider);
            request.voice = voice;
            request.language = language;

            let result = orchestrator.generate(&request).await?;

            for warning in &result.warnings {
                warn!(%warning, "Synthesis warning");
            }

            tokio::fs::write(&output, result.audio.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!(
                provider = %result.provider,
                format = %result.format,
                bytes = result.audio.len(),
                duration_ms = result.audio.duration_ms().unwrap_or_default(),
                "Wrote {}",
                output.display()
            );
        }
    }

    Ok(())
}
