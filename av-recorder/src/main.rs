//! Records a fixed duration of camera and microphone input to an AVI file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use av_capture_core::{DeviceCategory, RecorderConfig, RecorderState, RecordingDelegate, RecordingResult};

#[derive(Parser, Debug)]
#[command(name = "av-recorder", version, about = "Record camera and microphone to an AVI file")]
struct Cli {
    /// Output file
    #[arg(short, long, default_value = "record.avi")]
    output: PathBuf,

    /// Recording length in seconds
    #[arg(short, long, default_value_t = 10)]
    duration: u32,

    /// Give up waiting for the stop notification after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Write a JSON metadata sidecar next to the recording
    #[arg(long)]
    metadata: bool,
}

/// Logs session progress.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
struct ConsoleDelegate;

impl RecordingDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &RecorderState) {
        info!("State: {:?}", state);
    }

    fn on_source_missing(&self, category: DeviceCategory) {
        warn!("No {} found, recording without it", category.device_label());
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        info!(
            "Finished {} ({} streams, {} events)",
            result.file_path.display(),
            result.streams.len(),
            result.events_consumed
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = RecorderConfig {
        completion_timeout: cli.timeout.map(Duration::from_secs),
        write_metadata: cli.metadata,
        ..RecorderConfig::default()
    };

    println!(
        "Recording {} seconds of audio and video (camera + microphone) to \"{}\"...",
        cli.duration,
        cli.output.display()
    );

    let result = record(cli.output, cli.duration, config)?;

    println!("Saved {}", result.file_path.display());
    if let Some(checksum) = &result.checksum {
        println!("SHA-256 {}", checksum);
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn record(output: PathBuf, duration: u32, config: RecorderConfig) -> Result<RecordingResult> {
    use std::sync::Arc;

    use av_capture_core::RecordingSession;
    use av_capture_windows::DirectShowFramework;

    let mut session = RecordingSession::with_config(DirectShowFramework::new(), output, config)?;
    session.set_delegate(Arc::new(ConsoleDelegate));
    Ok(session.record(duration)?)
}

#[cfg(not(target_os = "windows"))]
fn record(_output: PathBuf, _duration: u32, _config: RecorderConfig) -> Result<RecordingResult> {
    anyhow::bail!("no capture backend for this platform")
}
