//! Moviola - headless movie player
//!
//! Plays the synthetic test-pattern movie through the player and logs
//! progress. Usage:
//!
//! ```text
//! moviola [config.json] [--wgpu] [--audio] [--duration SECS]
//! ```

mod config;

use anyhow::{Context, Result};
use config::{AppConfig, Renderer};
use moviola_audio::{AudioEngine, AudioOutput};
use moviola_gpu::{
    GpuContext, RenderContext, SoftwareRenderContext, SoftwareVideoBackend, VideoBackend,
    WgpuVideoBackend,
};
use moviola_media::TestPatternDecoder;
use moviola_player::{MoviePlayer, PlayerState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = match args.first() {
        Some(first) if !first.starts_with("--") => {
            let path = PathBuf::from(args.remove(0));
            AppConfig::load(&path)?
        }
        _ => AppConfig::default(),
    };
    config.apply_args(&args)?;

    info!("Moviola starting ({:?} renderer)", config.renderer);

    let (video, mut rc): (Arc<dyn VideoBackend>, Box<dyn RenderContext>) = match config.renderer
    {
        Renderer::Software => (
            Arc::new(SoftwareVideoBackend::new()),
            Box::new(SoftwareRenderContext::new()),
        ),
        Renderer::Wgpu => {
            let gpu = GpuContext::new_blocking().context("initializing wgpu")?;
            let backend = WgpuVideoBackend::new(&gpu);
            let rc = backend.render_context();
            (Arc::new(backend), Box::new(rc))
        }
    };

    let sample_rate = config.movie.sample_rate.unwrap_or(48_000);
    let engine = Arc::new(AudioEngine::new(sample_rate));
    // Keep the device stream alive for the whole run
    let output = if config.audio_device {
        match AudioOutput::open(engine.output_buffer(), sample_rate) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("No audio device, playing silent: {}", e);
                None
            }
        }
    } else {
        None
    };
    let discard_audio = output.is_none();

    let decoder = TestPatternDecoder::new(config.movie.clone())?;
    let mut player = MoviePlayer::new(
        video,
        engine.clone(),
        Box::new(decoder),
        config.player.clone(),
    )?;
    player.play()?;

    let tick = Duration::from_secs_f64(1.0 / config.tick_rate.max(1.0));
    let frames_per_tick = (sample_rate as f64 * tick.as_secs_f64()).ceil() as usize;
    let timeout = Duration::from_secs_f64(config.timeout_secs.max(0.0));
    let started = Instant::now();
    let mut last = Instant::now();
    let mut last_report = 0u64;
    let mut drain = vec![0.0f32; frames_per_tick * AudioEngine::CHANNELS as usize];

    while player.state() != PlayerState::Finished {
        if started.elapsed() > timeout {
            warn!("Timed out after {:.1}s in state {}", timeout.as_secs_f64(), player.state());
            break;
        }

        let now = Instant::now();
        player.update(now.duration_since(last).as_secs_f64());
        last = now;
        player.render(rc.as_mut())?;

        engine.pump(frames_per_tick);
        if discard_audio {
            engine.output_buffer().read(&mut drain);
        }

        let second = player.time() as u64;
        if second > last_report {
            last_report = second;
            info!(
                "t={:.2}s state={} queued={} audio={}",
                player.time(),
                player.state(),
                player.queued_frames(),
                player
                    .audio_clip()
                    .map(|c| c.samples_left())
                    .unwrap_or_default()
            );
        }

        std::thread::sleep(tick);
    }

    info!(
        "Playback done: {:.2}s of movie in {:.2}s",
        player.time(),
        started.elapsed().as_secs_f64()
    );
    player.reset();
    Ok(())
}
