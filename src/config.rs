//! Ranker and host configuration loaded from environment variables

use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How the rank threshold bounds the number of groups in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankTruncation {
    /// At most `rank_max_threshold` groups
    #[default]
    Exact,
    /// At most `rank_max_threshold + 1` groups, matching the historical output
    Legacy,
}

impl RankTruncation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankTruncation::Exact => "exact",
            RankTruncation::Legacy => "legacy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(RankTruncation::Exact),
            "legacy" => Some(RankTruncation::Legacy),
            _ => None,
        }
    }

    /// Maximum number of groups a report may carry for the given threshold
    pub fn group_limit(&self, rank_max_threshold: usize) -> usize {
        match self {
            RankTruncation::Exact => rank_max_threshold,
            RankTruncation::Legacy => rank_max_threshold.saturating_add(1),
        }
    }
}

/// When reports fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Checked on every arriving event; a silent stream never reports
    #[default]
    Cooperative,
    /// Driven by a host interval timer regardless of input
    Independent,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Cooperative => "cooperative",
            TimerMode::Independent => "independent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cooperative" => Some(TimerMode::Cooperative),
            "independent" => Some(TimerMode::Independent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One `{"hashtags": [...]}` object per line
    #[default]
    Jsonl,
    /// Free text per line, `#tags` are extracted
    Text,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Jsonl => "jsonl",
            InputFormat::Text => "text",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json" => Some(InputFormat::Jsonl),
            "text" | "txt" => Some(InputFormat::Text),
            _ => None,
        }
    }
}

/// Construction-time parameters of a [`crate::ranker_core::FrequencyRanker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankerConfig {
    /// Minimum number of whole seconds between two reports
    pub log_interval_secs: u64,

    /// Maximum number of count groups shown per report
    pub rank_max_threshold: usize,

    /// Optional cap on distinct tokens tracked per window (unbounded when None)
    pub max_distinct_tokens: Option<usize>,

    pub truncation: RankTruncation,
}

impl RankerConfig {
    pub fn new(log_interval_secs: u64, rank_max_threshold: usize) -> Result<Self, ConfigError> {
        if log_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "log_interval_secs must be positive".to_string(),
            ));
        }

        if rank_max_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "rank_max_threshold must be positive".to_string(),
            ));
        }

        Ok(Self {
            log_interval_secs,
            rank_max_threshold,
            max_distinct_tokens: None,
            truncation: RankTruncation::default(),
        })
    }

    pub fn with_max_distinct_tokens(mut self, max_distinct_tokens: Option<usize>) -> Self {
        self.max_distinct_tokens = max_distinct_tokens;
        self
    }

    pub fn with_truncation(mut self, truncation: RankTruncation) -> Self {
        self.truncation = truncation;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Required:
    /// - `LOG_INTERVAL_SECS` - reporting cadence in seconds
    /// - `RANK_MAX_THRESHOLD` - number of rank groups to display
    ///
    /// Optional:
    /// - `MAX_DISTINCT_TOKENS` - per-window cardinality cap (default: unbounded)
    /// - `RANK_TRUNCATION` - `exact` or `legacy` (default: exact)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`RankerConfig::from_env`] with an injectable variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_interval_secs = required_number::<u64, _>(&var, "LOG_INTERVAL_SECS")?;
        let rank_max_threshold = required_number::<usize, _>(&var, "RANK_MAX_THRESHOLD")?;

        let max_distinct_tokens = match var("MAX_DISTINCT_TOKENS") {
            Some(raw) => {
                let cap = raw.trim().parse::<usize>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "MAX_DISTINCT_TOKENS must be a number, got '{}'",
                        raw
                    ))
                })?;
                if cap == 0 {
                    return Err(ConfigError::InvalidValue(
                        "MAX_DISTINCT_TOKENS must be positive".to_string(),
                    ));
                }
                Some(cap)
            }
            None => None,
        };

        let truncation = match var("RANK_TRUNCATION") {
            Some(raw) => RankTruncation::from_str(raw.trim()).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "RANK_TRUNCATION must be 'exact' or 'legacy', got '{}'",
                    raw
                ))
            })?,
            None => RankTruncation::default(),
        };

        Ok(Self::new(log_interval_secs, rank_max_threshold)?
            .with_max_distinct_tokens(max_distinct_tokens)
            .with_truncation(truncation))
    }
}

/// Configuration of the bundled single-process host
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Events file; stdin when None
    pub input_path: Option<PathBuf>,

    pub input_format: InputFormat,

    /// Keep reading `input_path` as it grows
    pub follow: bool,

    /// Append every report as a JSON line to this file
    pub report_output_path: Option<PathBuf>,

    pub timer_mode: TimerMode,

    /// Channel buffer size between event source and ranker
    pub channel_buffer: usize,
}

impl HostConfig {
    /// Load host configuration from environment variables and CLI flags
    ///
    /// Environment variables:
    /// - `INPUT_PATH` (default: stdin)
    /// - `INPUT_FORMAT` - `jsonl` or `text` (default: jsonl)
    /// - `REPORT_OUTPUT_PATH` (default: none, log only)
    /// - `TIMER_MODE` - `cooperative` or `independent` (default: cooperative)
    /// - `EVENT_CHANNEL_BUFFER` (default: 10000)
    ///
    /// Flags: `--follow` tails `INPUT_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        Self::from_vars(|key| env::var(key).ok(), &args)
    }

    pub fn from_vars<F>(var: F, args: &[String]) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_path = var("INPUT_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let input_format = match var("INPUT_FORMAT") {
            Some(raw) => InputFormat::from_str(raw.trim()).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "INPUT_FORMAT must be 'jsonl' or 'text', got '{}'",
                    raw
                ))
            })?,
            None => InputFormat::default(),
        };

        let timer_mode = match var("TIMER_MODE") {
            Some(raw) => TimerMode::from_str(raw.trim()).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "TIMER_MODE must be 'cooperative' or 'independent', got '{}'",
                    raw
                ))
            })?,
            None => TimerMode::default(),
        };

        let report_output_path = var("REPORT_OUTPUT_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let channel_buffer = var("EVENT_CHANNEL_BUFFER")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10_000);

        let follow = args.iter().any(|a| a == "--follow");
        if follow && input_path.is_none() {
            return Err(ConfigError::MissingVariable(
                "INPUT_PATH (required by --follow)".to_string(),
            ));
        }

        Ok(Self {
            input_path,
            input_format,
            follow,
            report_output_path,
            timer_mode,
            channel_buffer,
        })
    }
}

fn required_number<T, F>(var: &F, key: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))?;
    let value = raw.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!("{} must be a positive integer, got '{}'", key, raw))
    })?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue(format!("{} must be positive", key)));
    }
    Ok(value)
}
