use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Case-folding policy applied to identifiers. Must be the same for input
/// parsing and result-store membership tests, otherwise resume double-probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFold {
    /// Exact match after trimming whitespace.
    #[default]
    Exact,
    /// Lowercase after trimming.
    Lower,
}

impl CaseFold {
    pub fn apply(self, raw: &str) -> String {
        match self {
            CaseFold::Exact => raw.trim().to_string(),
            CaseFold::Lower => raw.trim().to_lowercase(),
        }
    }
}

/// Probe transport parameters (optional `[probe]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Optional `canary` header value required by some service frontends.
    pub canary: Option<String>,
    /// Optional cookie string sent with each probe.
    pub cookie: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            connect_timeout_secs: 5,
            canary: None,
            cookie: None,
        }
    }
}

/// Retry policy parameters for the prober (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per probe (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_secs: 0.25,
            max_delay_secs: 5,
        }
    }
}

/// Archival settings (`[archive]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Run the periodic bundle/upload cycle during `run`.
    pub enabled: bool,
    /// Seconds between archive ticks. Floored at the scheduler's minimum.
    pub interval_secs: u64,
    /// Account token for the blob store; uploads are skipped when unset.
    pub gofile_token: Option<String>,
    /// Target folder id at the blob store.
    pub gofile_folder_id: Option<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 3600,
            gofile_token: None,
            gofile_folder_id: None,
        }
    }
}

/// Global configuration loaded from `~/.config/mailprobe/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailprobeConfig {
    /// Concurrent in-flight probes. Hard-capped by the engine.
    pub concurrency: usize,
    /// Identifier case-folding policy.
    pub case_fold: CaseFold,
    pub probe: ProbeConfig,
    /// Optional retry policy for the prober; built-in defaults when missing.
    pub retry: Option<RetryConfig>,
    pub archive: ArchiveConfig,
}

impl Default for MailprobeConfig {
    fn default() -> Self {
        Self {
            concurrency: 200,
            case_fold: CaseFold::default(),
            probe: ProbeConfig::default(),
            retry: None,
            archive: ArchiveConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mailprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MailprobeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MailprobeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MailprobeConfig = toml::from_str(&data)?;
    Ok(cfg)
}
