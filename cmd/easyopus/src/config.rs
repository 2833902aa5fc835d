//! Codec profile loaded from YAML.
//!
//! Stored in ~/.easyopus/config.yaml. Every field is optional in the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use easyopus::{Application, Bitrate, Channels, Complexity, Decoder, Encoder, FrameDuration};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".easyopus";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Application mode as spelled in config files and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Voip,
    Audio,
    Lowdelay,
}

impl From<Mode> for Application {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Voip => Application::VoIP,
            Mode::Audio => Application::Audio,
            Mode::Lowdelay => Application::RestrictedLowdelay,
        }
    }
}

/// Codec settings shared by all commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub sample_rate: i32,
    pub channels: i32,
    pub application: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<i32>,
    pub frame_ms: f32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            application: Mode::Audio,
            bitrate: None,
            complexity: None,
            frame_ms: 20.0,
        }
    }
}

impl Profile {
    /// Gets the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
    }

    /// Loads a profile from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Loads `explicit` if given, else the default file when it exists.
    pub fn resolve(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(Path::new(path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn channels(&self) -> anyhow::Result<Channels> {
        Ok(Channels::try_from(self.channels)?)
    }

    pub fn frame_duration(&self) -> anyhow::Result<FrameDuration> {
        FrameDuration::from_millis(self.frame_ms)
            .ok_or_else(|| anyhow::anyhow!("unsupported frame duration {}ms", self.frame_ms))
    }

    /// Samples per channel in one frame.
    pub fn frame_size(&self) -> anyhow::Result<i32> {
        Ok(self.frame_duration()?.frame_size(self.sample_rate))
    }

    /// Interleaved samples in one frame.
    pub fn frame_samples(&self) -> anyhow::Result<usize> {
        Ok(self.frame_size()? as usize * self.channels()?.count() as usize)
    }

    /// Builds an initialized, tuned encoder.
    pub fn encoder(&self) -> anyhow::Result<Encoder> {
        let mut encoder = Encoder::new();
        encoder
            .init(self.sample_rate, self.channels()?, self.application.into())
            .context("encoder init")?;
        if let Some(bps) = self.bitrate {
            encoder.set_bitrate(Bitrate::from(bps)).context("set bitrate")?;
        }
        if let Some(level) = self.complexity {
            encoder
                .set_complexity(Complexity::new(level)?)
                .context("set complexity")?;
        }
        Ok(encoder)
    }

    /// Builds an initialized decoder.
    pub fn decoder(&self) -> anyhow::Result<Decoder> {
        let mut decoder = Decoder::new();
        decoder
            .init(self.sample_rate, self.channels()?)
            .context("decoder init")?;
        Ok(decoder)
    }
}
