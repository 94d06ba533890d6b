use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use qscale_core::models::event::MESSAGE_TYPE_ANSWERSHEET_SAVED;
use qscale_eval::handlers::{DEFAULT_CALL_TIMEOUT, PipelineOptions};
use qscale_eval::pool::{DEFAULT_ANSWER_CONCURRENCY, DEFAULT_FACTOR_CONCURRENCY};

/// Current config version. Bump this when changing shape, with a matching
/// step in [`migrate`].
pub const CURRENT_VERSION: u32 = 2;

pub const CONFIG_PATH_ENV: &str = "QSCALE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Name of the subscribed topic. Only labels dispatch log records;
    /// routing goes by each message's own type.
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concurrency {
    #[serde(default = "default_answer_concurrency")]
    pub answers: usize,
    #[serde(default = "default_factor_concurrency")]
    pub factors: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_topic() -> String {
    MESSAGE_TYPE_ANSWERSHEET_SAVED.to_string()
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}

fn default_answer_concurrency() -> usize {
    DEFAULT_ANSWER_CONCURRENCY
}

fn default_factor_concurrency() -> usize {
    DEFAULT_FACTOR_CONCURRENCY
}

impl Default for Concurrency {
    fn default() -> Self {
        Self {
            answers: DEFAULT_ANSWER_CONCURRENCY,
            factors: DEFAULT_FACTOR_CONCURRENCY,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            data_dir: default_data_dir(),
            topic: default_topic(),
            concurrency: Concurrency::default(),
            call_timeout_secs: default_call_timeout_secs(),
            log_format: LogFormat::default(),
        }
    }
}

impl WorkerConfig {
    /// Load from `QSCALE_CONFIG` (if set) and apply environment overrides.
    pub fn from_env() -> eyre::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config = match path {
            Some(path) => load_config(&path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `QSCALE_*` overrides read through `lookup`, then normalize.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<Self> {
        if let Some(dir) = lookup("QSCALE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(topic) = lookup("QSCALE_TOPIC") {
            self.topic = topic;
        }
        if let Some(n) = lookup("QSCALE_ANSWER_CONCURRENCY") {
            self.concurrency.answers = parse_var("QSCALE_ANSWER_CONCURRENCY", &n)?;
        }
        if let Some(n) = lookup("QSCALE_FACTOR_CONCURRENCY") {
            self.concurrency.factors = parse_var("QSCALE_FACTOR_CONCURRENCY", &n)?;
        }
        if let Some(n) = lookup("QSCALE_CALL_TIMEOUT_SECS") {
            self.call_timeout_secs = parse_var("QSCALE_CALL_TIMEOUT_SECS", &n)?;
        }
        if let Some(format) = lookup("QSCALE_LOG_FORMAT") {
            self.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => return Err(eyre::eyre!("QSCALE_LOG_FORMAT: unknown format '{other}'")),
            };
        }
        Ok(self.normalized())
    }

    /// Zero values mean "use the default".
    pub fn normalized(mut self) -> Self {
        if self.concurrency.answers == 0 {
            self.concurrency.answers = DEFAULT_ANSWER_CONCURRENCY;
        }
        if self.concurrency.factors == 0 {
            self.concurrency.factors = DEFAULT_FACTOR_CONCURRENCY;
        }
        if self.call_timeout_secs == 0 {
            self.call_timeout_secs = default_call_timeout_secs();
        }
        self
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            answer_concurrency: self.concurrency.answers,
            factor_concurrency: self.concurrency.factors,
            call_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> eyre::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| eyre::eyre!("{key}: invalid value '{value}': {e}"))
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> eyre::Result<WorkerConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(WorkerConfig::default());
        }
        Err(e) => {
            return Err(eyre::eyre!("failed to read config at {}: {e}", path.display()));
        }
    };
    parse_config(&contents)
}

/// Parse config JSON, migrating older versions first.
pub fn parse_config(contents: &str) -> eyre::Result<WorkerConfig> {
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: WorkerConfig = serde_json::from_value(migrated)?;
    Ok(config.normalized())
}

/// Sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        ));
    }

    let obj = json
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;

    // v0/v1 -> v2: a single `max_concurrency` knob sized the factor stage.
    if from_version < 2 {
        if let Some(max) = obj.remove("max_concurrency") {
            let concurrency = obj
                .entry("concurrency")
                .or_insert_with(|| serde_json::json!({}));
            if let Some(c) = concurrency.as_object_mut() {
                c.entry("factors").or_insert(max);
            }
        }
        obj.insert("config_version".to_string(), CURRENT_VERSION.into());
        tracing::info!(from_version, "migrated config to v2");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &WorkerConfig) -> eyre::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
