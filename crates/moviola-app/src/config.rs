//! Application configuration, loaded from an optional JSON file.

use anyhow::{Context, Result};
use moviola_media::TestPatternConfig;
use moviola_player::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    #[default]
    Software,
    Wgpu,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub player: PlayerConfig,
    pub movie: TestPatternConfig,
    pub renderer: Renderer,
    /// Play through the default output device instead of discarding audio.
    pub audio_device: bool,
    /// Update/render ticks per second.
    pub tick_rate: f64,
    /// Give up after this many seconds of wall time.
    pub timeout_secs: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            movie: TestPatternConfig::default(),
            renderer: Renderer::default(),
            audio_device: false,
            tick_rate: 60.0,
            timeout_secs: 30.0,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Apply command line flags on top of the file settings.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--wgpu" => self.renderer = Renderer::Wgpu,
                "--audio" => self.audio_device = true,
                "--duration" => {
                    let value = iter.next().context("--duration needs a value")?;
                    self.movie.duration = value
                        .parse()
                        .with_context(|| format!("bad duration {:?}", value))?;
                }
                other => anyhow::bail!("unknown argument {:?}", other),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let mut config = AppConfig::default();
        let args = ["--wgpu", "--duration", "2.5"].map(String::from);
        config.apply_args(&args).unwrap();
        assert_eq!(config.renderer, Renderer::Wgpu);
        assert_eq!(config.movie.duration, 2.5);
        assert!(!config.audio_device);
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let mut config = AppConfig::default();
        assert!(config.apply_args(&["--fast".to_string()]).is_err());
    }

    #[test]
    fn test_nested_json() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "renderer": "wgpu", "player": { "video_high_water_frames": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.renderer, Renderer::Wgpu);
        assert_eq!(config.player.video_high_water_frames, 4);
        assert_eq!(config.tick_rate, 60.0);
    }
}
