// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player configuration, persisted as RON.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CDN serving the artist videos
pub const REMOTE_MEDIA_ROOT: &str = "https://virtualartsessions.global.ssl.fastly.net/";

/// Local file server prefix
pub const LOCAL_MEDIA_ROOT: &str = "/serve-file/";

/// Video frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoResolution {
    /// 1024 × 848
    Large,
    /// 512 × 424
    #[default]
    Medium,
    /// 256 × 212, used on small devices
    Small,
}

impl VideoResolution {
    /// Directory name of the resolution
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Large => "1024_848",
            Self::Medium => "512_424",
            Self::Small => "256_212",
        }
    }
}

/// Video container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoContainer {
    /// `WebM`
    #[default]
    Webm,
    /// MP4
    Mp4,
}

impl VideoContainer {
    /// File extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

/// Where videos are served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoSource {
    /// The public CDN
    #[default]
    Remote,
    /// A local file server
    Local,
}

/// How to pick the video for a sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Frame size
    pub resolution: VideoResolution,
    /// Container format
    pub container: VideoContainer,
    /// Server
    pub source: VideoSource,
}

impl VideoSettings {
    /// Full URL of the video at `path`
    pub fn resolve_path(&self, path: &str) -> String {
        let (base, suffix) = match self.source {
            VideoSource::Remote => (REMOTE_MEDIA_ROOT, ""),
            VideoSource::Local => (LOCAL_MEDIA_ROOT, "/"),
        };
        format!(
            "{base}{path}/{}/video.{}{suffix}",
            self.resolution.as_str(),
            self.container.extension()
        )
    }
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Video selection
    pub video: VideoSettings,
    /// Highest accepted playback rate
    pub max_playback_rate: f64,
    /// Step used by skip forward/back, in seconds
    pub skip_seconds: f64,
    /// Directory holding one sub-directory per sketch
    pub data_root: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video: VideoSettings::default(),
            max_playback_rate: 10.0,
            skip_seconds: 1.0,
            data_root: PathBuf::from("data"),
        }
    }
}

impl PlayerConfig {
    /// Load from a RON file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ron::from_str(&content)?)
    }

    /// Save as pretty-printed RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Clamp a requested playback rate; `None` for non-finite rates
    pub fn clamp_rate(&self, rate: f64) -> Option<f64> {
        let ceiling = self.max_playback_rate.max(0.0);
        rate.is_finite().then(|| rate.clamp(0.0, ceiling))
    }
}
