//! Runtime settings.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Every setting has a default so commands
//! that never reach the model (`scan`, `layout`, `show`) run with an empty
//! environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `OPENAI_API_KEY` | unset |
//! | `REPOGRAPH_MODEL` | `gpt-4.1-nano` |
//! | `REPOGRAPH_LLM_URL` | `https://api.openai.com/v1/chat/completions` |
//! | `REPOGRAPH_MAX_FILE_BYTES` | `102400` |
//! | `REPOGRAPH_WORKDIR` | `analysis_temp` |
//! | `REPOGRAPH_STORE` | `.repograph` |
//! | `REPOGRAPH_CLONE_TIMEOUT_SECS` | `120` |
//! | `REPOGRAPH_LLM_TIMEOUT_SECS` | `120` |
//! | `REPOGRAPH_LOG` | `warn` |

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Default chat model used for analysis.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
/// Default chat-completions endpoint.
pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Files larger than this are flagged instead of read.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 100 * 1024;

/// Settings shared by all commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// API key for the live model adapter.
    pub api_key: Option<String>,
    /// Model identifier sent with each completion request.
    pub model: String,
    /// Chat-completions endpoint.
    pub llm_url: String,
    /// Byte threshold above which a source file is skipped.
    pub max_file_bytes: u64,
    /// Scratch root for checkouts.
    pub workdir: PathBuf,
    /// Root directory of the analysis store.
    pub store_root: PathBuf,
    /// Deadline for fetching a repository.
    pub clone_timeout_secs: u64,
    /// Deadline for a single model call.
    pub llm_timeout_secs: u64,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            llm_url: DEFAULT_LLM_URL.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            workdir: PathBuf::from("analysis_temp"),
            store_root: PathBuf::from(".repograph"),
            clone_timeout_secs: 120,
            llm_timeout_secs: 120,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `.env` (if present) and the process environment.
    #[must_use]
    pub fn load() -> Self {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Empty values count as unset. Numbers that fail to parse keep their
    /// default and emit a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get("OPENAI_API_KEY"),
            model: get("REPOGRAPH_MODEL").unwrap_or(defaults.model),
            llm_url: get("REPOGRAPH_LLM_URL").unwrap_or(defaults.llm_url),
            max_file_bytes: parse_or(
                "REPOGRAPH_MAX_FILE_BYTES",
                get("REPOGRAPH_MAX_FILE_BYTES"),
                defaults.max_file_bytes,
            ),
            workdir: get("REPOGRAPH_WORKDIR").map_or(defaults.workdir, PathBuf::from),
            store_root: get("REPOGRAPH_STORE").map_or(defaults.store_root, PathBuf::from),
            clone_timeout_secs: parse_or(
                "REPOGRAPH_CLONE_TIMEOUT_SECS",
                get("REPOGRAPH_CLONE_TIMEOUT_SECS"),
                defaults.clone_timeout_secs,
            ),
            llm_timeout_secs: parse_or(
                "REPOGRAPH_LLM_TIMEOUT_SECS",
                get("REPOGRAPH_LLM_TIMEOUT_SECS"),
                defaults.llm_timeout_secs,
            ),
            log_level: get("REPOGRAPH_LOG").unwrap_or(defaults.log_level),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={raw:?} is not a valid number, using {default}");
            default
        }),
    }
}
