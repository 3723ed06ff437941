mod args;
mod sinks;
mod sources;

use anyhow::{Context, Result, bail};
use args::Args;
use clap::Parser;
use fire_vision::alert::AlarmSounder;
use fire_vision::session::{Command, SessionHandle};
use fire_vision::{FirePipeline, FireSession, Frame, PipelineConfig};
use futures::stream::BoxStream;
use sinks::{LogSink, TerminalBell};
use std::io::BufRead;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Logging & Arguments ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    // --- 2. Pipeline ---
    let mut config =
        PipelineConfig::load(args.config.as_deref()).context("loading configuration")?;
    if args.mirror {
        config.mirror = true;
    }
    let pipeline = FirePipeline::new(config)?;

    // --- 3. Frame Source ---
    let frames = open_source(&args, pipeline.config())?;

    // --- 4. Session ---
    let sink = (LogSink, AlarmSounder::new(TerminalBell::default()));
    let (mut session, handle) = FireSession::new(pipeline, sink);
    std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || read_commands(std::io::stdin().lock(), handle))
        .context("starting the command reader")?;

    info!("Fire detection running. Commands: q = quit, s = toggle sound, r = reset alarm");
    let summary = session.run(frames).await;

    // --- 5. Summary ---
    println!(
        "Analyzed {} frames ({} rejected), final state: {}",
        summary.frames_analyzed, summary.frames_rejected, summary.alarm.state
    );
    Ok(())
}

fn open_source(args: &Args, config: &PipelineConfig) -> Result<BoxStream<'static, Frame>> {
    let (width, height) = (config.image_width, config.image_height);
    if let Some(dir) = &args.frames_dir {
        return sources::image_directory(dir, width, height, args.fps);
    }

    #[cfg(feature = "camera")]
    {
        use sources::capture::{Device, open};
        if let Some(index) = args.camera {
            return open(Device::Camera(index), width, height);
        }
        if let Some(path) = &args.video {
            return open(Device::Video(path.clone()), width, height);
        }
    }

    bail!("camera and video input need fire_tester built with `--features camera`")
}

/// Maps input lines to session commands until `q` or end of input. Runs on its
/// own thread: a blocked stdin read there does not hold up runtime shutdown.
fn read_commands(input: impl BufRead, handle: SessionHandle) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        let command = match line.trim() {
            "q" => Command::Stop,
            "s" => Command::ToggleAudio,
            "r" => Command::ResetAlarm,
            "" => continue,
            other => {
                info!("Unknown command {other:?}");
                continue;
            }
        };
        if !handle.send(command) || command == Command::Stop {
            break;
        }
    }
}
