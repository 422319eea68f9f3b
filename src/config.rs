//! Configuration types for download, purge, and filesystem layout.
//!
//! Every component takes its configuration explicitly at construction; there
//! is no ambient global state, so tests can inject temporary directories and
//! thresholds.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for download operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Maximum number of simultaneous in-flight fetches.
    pub max_concurrent: usize,
    /// Attempt ceiling per URL.
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Base delay between retry attempts in seconds; attempt `i` waits
    /// `base_delay_secs + i` before the next try.
    pub base_delay_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            max_retries: 5,
            timeout_secs: 30,
            base_delay_secs: 1,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of simultaneous in-flight fetches.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Sets the per-URL attempt ceiling.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the per-request timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the base inter-retry delay in seconds.
    #[must_use]
    pub const fn with_base_delay_secs(mut self, base_delay_secs: u64) -> Self {
        self.base_delay_secs = base_delay_secs;
        self
    }
}

/// Thresholds for the post-download purge pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Minimum acceptable image width in pixels. Narrower images are
    /// blacklisted and removed; width equal to the minimum is kept.
    pub min_width: u32,
    /// Fraction of border pixels that must be white or black for an image
    /// to count as boring.
    pub boring_threshold: f64,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            min_width: 1920,
            boring_threshold: 0.7,
        }
    }
}

impl PurgeConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum acceptable image width.
    #[must_use]
    pub const fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Sets the boring-background border fraction threshold.
    #[must_use]
    pub const fn with_boring_threshold(mut self, boring_threshold: f64) -> Self {
        self.boring_threshold = boring_threshold;
        self
    }
}

/// Wallpaper channel. Each channel keeps its own folder and its own
/// skip-list, so SFW and NSFW blacklists never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Sfw,
    Nsfw,
}

impl Channel {
    /// Subfolder name for this channel under the base wallpaper folder.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Sfw => "sfw",
            Self::Nsfw => "nsfw",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sfw => write!(f, "SFW"),
            Self::Nsfw => write!(f, "NSFW"),
        }
    }
}

/// Filesystem layout for downloads and the skip-list store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Base folder holding the per-channel wallpaper directories.
    pub base_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        let downloads = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            base_dir: downloads.join("Wallpapers"),
        }
    }
}

impl PathConfig {
    /// Wallpaper folder for a channel.
    #[must_use]
    pub fn channel_dir(&self, channel: Channel) -> PathBuf {
        self.base_dir.join(channel.dir_name())
    }

    /// Skip-list path scoped to a channel's wallpaper folder.
    #[must_use]
    pub fn skip_list_path(&self, channel: Channel) -> PathBuf {
        self.channel_dir(channel).join(".blacklist.csv")
    }

    /// Fallback single shared skip-list under the user cache directory, for
    /// callers not working inside a channel folder.
    #[must_use]
    pub fn shared_skip_list_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("walldl")
            .join("blacklist.csv")
    }
}

/// Complete application configuration combining download, purge, and path
/// settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download configuration.
    pub download: DownloadConfig,
    /// Purge configuration.
    pub purge: PurgeConfig,
    /// Path configuration.
    pub paths: PathConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the optional TOML configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("walldl")
            .join("config.toml")
    }

    /// Loads configuration from the default config file, falling back to
    /// defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
