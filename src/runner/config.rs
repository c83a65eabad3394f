//! Runtime configuration.
//!
//! Settings come from chained setters, or from the environment:
//!
//! ```text
//! ESRT_HEAP_LIMIT=100000     # maximum number of live objects
//! ESRT_MAX_CALL_DEPTH=256    # nested calls before a RangeError
//! ESRT_STRICT=1              # run global code in strict mode
//! ```

use std::env;

use thiserror::Error;

use crate::runner::ds::heap::HeapConfig;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

pub const ENV_HEAP_LIMIT: &str = "ESRT_HEAP_LIMIT";
pub const ENV_MAX_CALL_DEPTH: &str = "ESRT_MAX_CALL_DEPTH";
pub const ENV_STRICT: &str = "ESRT_STRICT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of live objects; `None` means unlimited.
    pub heap_limit: Option<usize>,
    pub max_call_depth: usize,
    /// Whether global code starts in strict mode.
    pub strict: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            heap_limit: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            strict: false,
        }
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

fn parse_count(name: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        })
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heap_limit(mut self, limit: Option<usize>) -> Self {
        self.heap_limit = limit;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads the `ESRT_*` variables of the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup; unset
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = RuntimeConfig::default();
        if let Some(v) = lookup(ENV_HEAP_LIMIT) {
            config.heap_limit = Some(parse_count(ENV_HEAP_LIMIT, &v)?);
        }
        if let Some(v) = lookup(ENV_MAX_CALL_DEPTH) {
            config.max_call_depth = parse_count(ENV_MAX_CALL_DEPTH, &v)?;
        }
        if let Some(v) = lookup(ENV_STRICT) {
            config.strict = parse_flag(ENV_STRICT, &v)?;
        }
        Ok(config)
    }

    pub fn heap_config(&self) -> HeapConfig {
        match self.heap_limit {
            Some(limit) => HeapConfig::with_limit(limit),
            None => HeapConfig::unlimited(),
        }
    }
}
