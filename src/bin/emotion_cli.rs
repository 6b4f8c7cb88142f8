use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use voice_emotion::analysis::{display_name, FeatureBlock, FeatureExtractor};
use voice_emotion::audio::decode_file;
use voice_emotion::config::AppConfig;
use voice_emotion::http::{run_http_server, AppState};
use voice_emotion::model::{ModelArtifacts, ProbabilisticClassifier};
use voice_emotion::{transcription, EmotionRecognizer};

#[derive(Parser, Debug)]
#[command(
    name = "emotion_cli",
    about = "Speech emotion recognition from recorded audio"
)]
struct Cli {
    /// JSON config file (defaults to $EMOTION_CONFIG or config/emotion.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct ArtifactArgs {
    /// Directory containing scaler.json, mlp_emotion_model.json and label_encoder.json
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP analysis service
    Serve {
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[arg(long)]
        addr: Option<SocketAddr>,
        #[arg(long)]
        upload_dir: Option<PathBuf>,
        /// Base URL of an OpenAI-compatible transcription server
        #[arg(long)]
        transcribe_url: Option<String>,
    },
    /// Recognize the emotion in an audio file and print the JSON payload
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the extracted feature vector of an audio file
    Features { file: PathBuf },
    /// Validate the model artifacts and print a summary
    Inspect {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
}

#[derive(Serialize)]
struct FeatureReport {
    file: String,
    sample_rate: u32,
    duration_secs: f64,
    len: usize,
    zero_crossing_rate: f64,
    chroma: Vec<f64>,
    mfcc: Vec<f64>,
    mel_spectrogram: Vec<f64>,
}

#[derive(Serialize)]
struct ClassEntry {
    label: String,
    name: String,
}

#[derive(Serialize)]
struct InspectReport {
    artifacts_dir: String,
    n_features: usize,
    n_classes: usize,
    classes: Vec<ClassEntry>,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout carries only JSON reports
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from_file(path);
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Serve {
            artifacts,
            addr,
            upload_dir,
            transcribe_url,
        } => {
            apply_artifact_args(&mut config, artifacts);
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(dir) = upload_dir {
                config.server.upload_dir = dir;
            }
            if let Some(url) = transcribe_url {
                config.transcription.endpoint = Some(url);
            }
            run_serve(&config)
        }
        Commands::Analyze {
            file,
            artifacts,
            output,
        } => {
            apply_artifact_args(&mut config, artifacts);
            run_analyze(&config, &file, output)
        }
        Commands::Features { file } => run_features(&config, &file),
        Commands::Inspect { artifacts } => {
            apply_artifact_args(&mut config, artifacts);
            run_inspect(&config)
        }
    }
}

fn apply_artifact_args(config: &mut AppConfig, args: ArtifactArgs) {
    if let Some(dir) = args.artifacts_dir {
        config.artifacts.dir = dir;
    }
}

fn load_recognizer(config: &AppConfig) -> Result<EmotionRecognizer> {
    EmotionRecognizer::load(config).with_context(|| {
        format!(
            "loading model artifacts from {}",
            config.artifacts.dir.display()
        )
    })
}

fn run_serve(config: &AppConfig) -> Result<ExitCode> {
    // Artifacts must load before the listener binds
    let recognizer = Arc::new(load_recognizer(config)?);
    let transcriber = transcription::from_config(&config.transcription);
    let state = AppState::new(recognizer, transcriber, &config.server);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(run_http_server(state, config.server.addr))?;
    Ok(ExitCode::SUCCESS)
}

fn run_analyze(config: &AppConfig, file: &Path, output: Option<PathBuf>) -> Result<ExitCode> {
    let recognizer = load_recognizer(config)?;
    let payload = recognizer.recognize(file);

    let json = serde_json::to_string_pretty(&payload)?;
    if let Some(path) = output {
        fs::write(&path, &json).with_context(|| format!("writing {}", path.display()))?;
    }
    println!("{json}");

    Ok(if payload.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_features(config: &AppConfig, file: &Path) -> Result<ExitCode> {
    config
        .features
        .validate()
        .map_err(|reason| anyhow!("invalid feature configuration: {reason}"))?;
    let waveform = decode_file(file).with_context(|| format!("decoding {}", file.display()))?;
    let extractor = FeatureExtractor::new(config.features.clone());
    let features = extractor
        .extract(&waveform)
        .with_context(|| format!("extracting features from {}", file.display()))?;

    let report = FeatureReport {
        file: file.display().to_string(),
        sample_rate: waveform.sample_rate,
        duration_secs: waveform.duration_secs(),
        len: features.len(),
        zero_crossing_rate: features.zero_crossing_rate(),
        chroma: features.block(FeatureBlock::Chroma).to_vec(),
        mfcc: features.block(FeatureBlock::Mfcc).to_vec(),
        mel_spectrogram: features.block(FeatureBlock::MelSpectrogram).to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

fn run_inspect(config: &AppConfig) -> Result<ExitCode> {
    let artifacts = ModelArtifacts::load(&config.artifacts, config.features.feature_len())
        .with_context(|| {
            format!(
                "loading model artifacts from {}",
                config.artifacts.dir.display()
            )
        })?;

    let classes = artifacts
        .labels()
        .classes()
        .iter()
        .map(|label| ClassEntry {
            label: label.clone(),
            name: display_name(label).to_string(),
        })
        .collect();

    let report = InspectReport {
        artifacts_dir: config.artifacts.dir.display().to_string(),
        n_features: artifacts.n_features(),
        n_classes: artifacts.classifier().n_classes(),
        classes,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}
