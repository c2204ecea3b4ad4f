//! Pipeline config: working directory, allow-list, download proxy, converter programs and limits.

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// WORK_DIR; transient downloads and outputs.
    pub work_dir: PathBuf,
    /// ALLOWED_USERS, comma-separated user ids.
    pub allowed_users: Vec<i64>,
    /// ALLOWLIST_FILE, JSON object mapping user id to bool.
    pub allowlist_file: Option<PathBuf>,
    /// FETCH_PROXY, applied to file downloads only.
    pub fetch_proxy: Option<String>,
    pub step_timeout_secs: u64,
    pub convert_timeout_secs: u64,
    pub max_concurrent_runs: usize,
    pub ffmpeg_path: String,
    pub lottie_command: String,
    /// TGS_COMPRESS; renders animated stickers with the small preset.
    pub tgs_compress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./files"),
            allowed_users: Vec::new(),
            allowlist_file: None,
            fetch_proxy: None,
            step_timeout_secs: 30,
            convert_timeout_secs: 120,
            max_concurrent_runs: 4,
            ffmpeg_path: "ffmpeg".to_string(),
            lottie_command: "lottie_to_gif.sh".to_string(),
            tgs_compress: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let allowed_users = match non_empty_var("ALLOWED_USERS") {
            Some(raw) => parse_user_ids(&raw).context("Invalid ALLOWED_USERS")?,
            None => Vec::new(),
        };

        Ok(Self {
            work_dir: non_empty_var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            allowed_users,
            allowlist_file: non_empty_var("ALLOWLIST_FILE").map(PathBuf::from),
            fetch_proxy: non_empty_var("FETCH_PROXY"),
            step_timeout_secs: parse_var("STEP_TIMEOUT_SECS")?.unwrap_or(defaults.step_timeout_secs),
            convert_timeout_secs: parse_var("CONVERT_TIMEOUT_SECS")?
                .unwrap_or(defaults.convert_timeout_secs),
            max_concurrent_runs: parse_var("MAX_CONCURRENT_RUNS")?
                .unwrap_or(defaults.max_concurrent_runs),
            ffmpeg_path: non_empty_var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            lottie_command: non_empty_var("LOTTIE_COMMAND").unwrap_or(defaults.lottie_command),
            tgs_compress: non_empty_var("TGS_COMPRESS")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.tgs_compress),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_timeout_secs == 0 {
            anyhow::bail!("STEP_TIMEOUT_SECS must be greater than 0");
        }
        if self.convert_timeout_secs == 0 {
            anyhow::bail!("CONVERT_TIMEOUT_SECS must be greater than 0");
        }
        if self.max_concurrent_runs == 0 {
            anyhow::bail!("MAX_CONCURRENT_RUNS must be greater than 0");
        }
        if self.work_dir.as_os_str().is_empty() {
            anyhow::bail!("WORK_DIR is empty");
        }
        if self.work_dir.exists() && !self.work_dir.is_dir() {
            anyhow::bail!("WORK_DIR is not a directory: {}", self.work_dir.display());
        }
        if let Some(ref proxy) = self.fetch_proxy {
            if reqwest::Url::parse(proxy).is_err() {
                anyhow::bail!("FETCH_PROXY is set but not a valid URL: {}", proxy);
            }
        }
        Ok(())
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }

    /// ALLOWED_USERS plus every id mapped to `true` in ALLOWLIST_FILE.
    pub fn load_allowlist(&self) -> Result<BTreeSet<i64>> {
        let mut users: BTreeSet<i64> = self.allowed_users.iter().copied().collect();
        if let Some(ref path) = self.allowlist_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read ALLOWLIST_FILE {}", path.display()))?;
            users.extend(parse_allowlist_json(&raw).with_context(|| {
                format!("ALLOWLIST_FILE {} is not a JSON object of id -> bool", path.display())
            })?);
        }
        Ok(users)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}={}: {}", name, raw, e)),
        None => Ok(None),
    }
}

pub(crate) fn parse_user_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("not a user id: {}", s))
        })
        .collect()
}

pub(crate) fn parse_allowlist_json(raw: &str) -> Result<Vec<i64>> {
    let entries: HashMap<String, bool> = serde_json::from_str(raw)?;
    let mut users = Vec::new();
    for (id, allowed) in entries {
        if allowed {
            users.push(
                id.trim()
                    .parse::<i64>()
                    .with_context(|| format!("not a user id: {}", id))?,
            );
        }
    }
    Ok(users)
}
