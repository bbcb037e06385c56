//! Evaluator configuration.
//!
//! Configuration is plain data: callers build it in code or parse it from
//! TOML text they loaded themselves.
//!
//! ```toml
//! version = 1
//! max_depth = 16
//! missing_value = ""
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FilterError, FilterResult};

/// Current config schema version.
const CONFIG_VERSION: u32 = 1;

/// Default limit on filter nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings shared by filter construction and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Config schema version.
    pub version: u32,

    /// Deepest nesting accepted before failing with `FilterTooDeep`.
    pub max_depth: usize,

    /// Value a field resolves to when its path is missing from the record.
    /// TOML has no null, so the default is left out when serializing.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub missing_value: Value,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            max_depth: DEFAULT_MAX_DEPTH,
            missing_value: Value::Null,
        }
    }
}

impl EvaluatorConfig {
    /// Parses a config from TOML text. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Config` if the text is not valid TOML for this
    /// schema, declares a newer schema version, or sets `max_depth` to zero.
    pub fn from_toml_str(input: &str) -> FilterResult<Self> {
        let config: EvaluatorConfig =
            toml::from_str(input).map_err(|e| FilterError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to TOML text.
    pub fn to_toml_string(&self) -> FilterResult<String> {
        toml::to_string(self).map_err(|e| FilterError::config(e.to_string()))
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the value used for missing fields.
    pub fn with_missing_value(mut self, value: impl Into<Value>) -> Self {
        self.missing_value = value.into();
        self
    }

    fn validate(&self) -> FilterResult<()> {
        if self.version > CONFIG_VERSION {
            return Err(FilterError::config(format!(
                "unsupported config version {} (newest supported is {})",
                self.version, CONFIG_VERSION
            )));
        }
        if self.max_depth == 0 {
            return Err(FilterError::config("max_depth must be at least 1"));
        }
        Ok(())
    }
}
