//! Configuration for field assist and the studio.
//!
//! Both configs are plain builders; `from_env` fills them from
//! `LOREFORGE_*` variables so binaries can be configured without code.

use std::path::PathBuf;

/// Default sampling temperature for field generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default response budget for a single field.
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Settings for the text generator behind field assist.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistConfig {
    /// Model override; `None` uses the client's default.
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,

    /// Maximum tokens per generated field.
    pub max_tokens: usize,

    /// System prompt sent with every request.
    pub system_prompt: String,
}

impl AssistConfig {
    pub fn new() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature. Clamped to 0.0 - 1.0.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Read `LOREFORGE_MODEL`, `LOREFORGE_TEMPERATURE` and
    /// `LOREFORGE_MAX_TOKENS`. Unset or unparseable values keep defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(model) = env_var("LOREFORGE_MODEL") {
            config = config.with_model(model);
        }
        if let Some(temperature) = env_parse::<f32>("LOREFORGE_TEMPERATURE") {
            config = config.with_temperature(temperature);
        }
        if let Some(max_tokens) = env_parse::<usize>("LOREFORGE_MAX_TOKENS") {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You help authors build worlds for light novels. \
Answer with the requested field content only: no headings, no preamble, no quotes.";

/// Settings for a [`Studio`](crate::studio::Studio).
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// URL the studio opens at.
    pub start_url: String,

    /// Where [`MemoryStore`](crate::store::MemoryStore) snapshots are kept.
    pub data_path: Option<PathBuf>,

    /// Maximum number of notices kept in the queue.
    pub notice_capacity: usize,

    pub assist: AssistConfig,
}

impl StudioConfig {
    pub fn new() -> Self {
        Self {
            start_url: crate::route::BASE_PATH.to_string(),
            data_path: None,
            notice_capacity: 32,
            assist: AssistConfig::new(),
        }
    }

    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity.max(1);
        self
    }

    pub fn with_assist(mut self, assist: AssistConfig) -> Self {
        self.assist = assist;
        self
    }

    /// Assist settings from the environment plus `LOREFORGE_START_URL`
    /// and `LOREFORGE_DATA`.
    pub fn from_env() -> Self {
        let mut config = Self::new().with_assist(AssistConfig::from_env());
        if let Some(url) = env_var("LOREFORGE_START_URL") {
            config = config.with_start_url(url);
        }
        if let Some(path) = env_var("LOREFORGE_DATA") {
            config = config.with_data_path(path);
        }
        config
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
