use anyhow::{Context, Result};
use clap::Parser;
use mixxx_analyzer::config::parse_timeout_secs;
use mixxx_analyzer::{AnalysisResult, AnalysisRunner, Analyzer, AnalyzerConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "ogg", "m4a", "aac", "aiff", "aif", "opus",
];

#[derive(Parser, Debug)]
#[command(name = "mixxx-analyze")]
#[command(about = "Analyze audio files with the mixxx-analyzer binary", long_about = None)]
struct Args {
    /// Audio files or directories (directories are scanned recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Path to the mixxx-analyzer binary (default: bundled copy, then PATH)
    #[arg(short = 'b', long)]
    binary: Option<String>,

    /// Kill the analyzer after this many seconds
    #[arg(short = 't', long, value_parser = parse_timeout_secs)]
    timeout: Option<Duration>,

    /// Print results as a JSON array
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = AnalyzerConfig::from_env().context("Invalid MIXXX_ANALYZER_* environment")?;
    if let Some(binary) = &args.binary {
        let expanded = shellexpand::tilde(binary);
        config = config.with_binary(PathBuf::from(expanded.as_ref()));
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    let files = collect_audio_files(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No audio files found in {:?}", args.paths);
    }
    log::info!("Analyzing {} file(s)", files.len());

    let runner = AnalysisRunner::from_config(config);
    log::debug!("Using analyzer: {:?}", runner.binary()?);

    let results = runner
        .analyze_many(&files)
        .with_context(|| format!("Failed to analyze {} file(s)", files.len()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}", format_line(result));
        }
    }

    let undetected = results.iter().filter(|r| r.bpm.is_none()).count();
    if undetected > 0 {
        log::warn!("BPM undetected for {} of {} file(s)", undetected, results.len());
    }

    Ok(())
}

/// Expand directories into their audio files, keeping explicit files as given
fn collect_audio_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to scan {:?}", input))?;
            if entry.file_type().is_file() && is_audio_file(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        log::debug!("Found {} audio file(s) in {:?}", found.len(), input);
        files.extend(found);
    }

    Ok(files)
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn format_line(r: &AnalysisResult) -> String {
    let bpm = match r.bpm {
        Some(bpm) => format!("{:6.2}", bpm),
        None => "(undetected)".to_string(),
    };
    format!(
        "{:<50}  BPM: {}  Key: {:<10} ({:>3})  LUFS: {:7.2}  RG: {:+.2} dB  Intro: {:.1}s  Outro: {:.1}s",
        r.file, bpm, r.key, r.camelot, r.lufs, r.replay_gain, r.intro_secs, r.outro_secs
    )
}
