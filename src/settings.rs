//! Runtime settings resolved from environment variables.
//!
//! Values are read through [`EnvSource`] so tests can supply a map instead
//! of mutating the process environment.

use crate::tool_session::domain::{BackoffPolicy, ToolSessionDomainError};
use camino::Utf8PathBuf;
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Maximum tool invocations per run.
pub const MAX_TOOL_CALL: &str = "MAX_TOOL_CALL";
/// Connection retries per tool server after the initial attempt.
pub const MCP_MAX_RETRIES: &str = "MCP_MAX_RETRIES";
/// First backoff delay in seconds.
pub const MCP_BACKOFF_BASE_SECONDS: &str = "MCP_BACKOFF_BASE_SECONDS";
/// Backoff delay cap in seconds.
pub const MCP_BACKOFF_MAX_SECONDS: &str = "MCP_BACKOFF_MAX_SECONDS";
/// Timeout of each health probe request in seconds.
pub const MCP_PROBE_TIMEOUT_SECONDS: &str = "MCP_PROBE_TIMEOUT_SECONDS";
/// Timeout of each protocol request in seconds.
pub const MCP_REQUEST_TIMEOUT_SECONDS: &str = "MCP_REQUEST_TIMEOUT_SECONDS";
/// Location of the tool server registry document.
pub const MCP_CONFIG_PATH: &str = "MCP_CONFIG_PATH";
/// Listen address of the HTTP boundary.
pub const THINK_BIND_ADDRESS: &str = "THINK_BIND_ADDRESS";

const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const AZURE_OPENAI_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
const LLM_TEMPERATURE: &str = "LLM_TEMPERATURE";

const DEFAULT_MAX_TOOL_CALLS: usize = 4;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(8);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_REGISTRY_PATH: &str = "config/config.json";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Source of configuration variables.
pub trait EnvSource: Send + Sync {
    /// Returns the value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(BTreeMap<String, String>);

impl MapEnv {
    /// Builds a source from key/value pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Errors raised while resolving settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A variable required by a partially configured group is unset.
    #[error("{0} must be set")]
    Missing(String),

    /// The backoff bounds are inconsistent.
    #[error(transparent)]
    Backoff(#[from] ToolSessionDomainError),
}

/// Result type for settings resolution.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Tuning values for the session manager, invocation loop and server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    max_tool_calls: usize,
    backoff: BackoffPolicy,
    probe_timeout: Duration,
    request_timeout: Duration,
    registry_path: Utf8PathBuf,
    bind_address: SocketAddr,
}

impl AgentSettings {
    /// Resolves settings, applying defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a variable cannot be parsed or the
    /// backoff base exceeds its cap.
    pub fn from_env(env: &impl EnvSource) -> SettingsResult<Self> {
        let max_retries = parsed(env, MCP_MAX_RETRIES)?.unwrap_or(DEFAULT_MAX_RETRIES);
        let base = seconds(env, MCP_BACKOFF_BASE_SECONDS)?.unwrap_or(DEFAULT_BACKOFF_BASE);
        let cap = seconds(env, MCP_BACKOFF_MAX_SECONDS)?.unwrap_or(DEFAULT_BACKOFF_MAX);

        Ok(Self {
            max_tool_calls: parsed(env, MAX_TOOL_CALL)?.unwrap_or(DEFAULT_MAX_TOOL_CALLS),
            backoff: BackoffPolicy::new(max_retries, base, cap)?,
            probe_timeout: seconds(env, MCP_PROBE_TIMEOUT_SECONDS)?
                .unwrap_or(DEFAULT_PROBE_TIMEOUT),
            request_timeout: seconds(env, MCP_REQUEST_TIMEOUT_SECONDS)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            registry_path: non_blank(env, MCP_CONFIG_PATH)
                .map_or_else(|| Utf8PathBuf::from(DEFAULT_REGISTRY_PATH), Utf8PathBuf::from),
            bind_address: match non_blank(env, THINK_BIND_ADDRESS) {
                Some(raw) => parse_value(THINK_BIND_ADDRESS, &raw)?,
                None => parse_value(THINK_BIND_ADDRESS, DEFAULT_BIND_ADDRESS)?,
            },
        })
    }

    /// Returns the maximum number of tool invocations per run.
    #[must_use]
    pub const fn max_tool_calls(&self) -> usize {
        self.max_tool_calls
    }

    /// Returns the connection retry policy.
    #[must_use]
    pub const fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Returns the per-request health probe timeout.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Returns the per-request protocol timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the registry document path.
    #[must_use]
    pub fn registry_path(&self) -> &camino::Utf8Path {
        &self.registry_path
    }

    /// Returns the HTTP listen address.
    #[must_use]
    pub const fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }
}

/// Connection settings for an Azure OpenAI chat deployment.
#[derive(Clone, PartialEq)]
pub struct AzureOpenAiSettings {
    endpoint: Url,
    deployment: String,
    api_version: String,
    api_key: String,
    temperature: f64,
}

impl AzureOpenAiSettings {
    /// Resolves deployment settings.
    ///
    /// Returns `Ok(None)` when none of endpoint, deployment and key is set.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when only some of them are set and
    /// [`SettingsError::InvalidValue`] for an unusable endpoint or
    /// temperature.
    pub fn from_env(env: &impl EnvSource) -> SettingsResult<Option<Self>> {
        let endpoint = non_blank(env, AZURE_OPENAI_ENDPOINT);
        let deployment = non_blank(env, AZURE_OPENAI_DEPLOYMENT);
        let api_key = non_blank(env, AZURE_OPENAI_API_KEY);

        let (raw_endpoint, deployment_name, key) = match (endpoint, deployment, api_key) {
            (None, None, None) => return Ok(None),
            (Some(e), Some(d), Some(k)) => (e, d, k),
            (None, _, _) => return Err(SettingsError::Missing(AZURE_OPENAI_ENDPOINT.to_owned())),
            (_, None, _) => {
                return Err(SettingsError::Missing(AZURE_OPENAI_DEPLOYMENT.to_owned()));
            }
            (_, _, None) => return Err(SettingsError::Missing(AZURE_OPENAI_API_KEY.to_owned())),
        };

        let temperature: f64 = parsed(env, LLM_TEMPERATURE)?.unwrap_or_default();
        if !temperature.is_finite() {
            return Err(invalid(LLM_TEMPERATURE, &temperature.to_string()));
        }

        Ok(Some(Self {
            endpoint: parse_value(AZURE_OPENAI_ENDPOINT, &raw_endpoint)?,
            deployment: deployment_name,
            api_version: non_blank(env, AZURE_OPENAI_API_VERSION)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            api_key: key,
            temperature,
        }))
    }

    /// Creates settings directly.
    #[must_use]
    pub fn new(
        endpoint: Url,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            endpoint,
            deployment: deployment.into(),
            api_version: api_version.into(),
            api_key: api_key.into(),
            temperature,
        }
    }

    /// Returns the resource endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the deployment name.
    #[must_use]
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Returns the API version query value.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn non_blank(env: &impl EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn invalid(key: &str, value: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> SettingsResult<T> {
    raw.parse().map_err(|_| invalid(key, raw))
}

fn parsed<T: FromStr>(env: &impl EnvSource, key: &str) -> SettingsResult<Option<T>> {
    non_blank(env, key)
        .map(|raw| parse_value(key, &raw))
        .transpose()
}

fn seconds(env: &impl EnvSource, key: &str) -> SettingsResult<Option<Duration>> {
    non_blank(env, key)
        .map(|raw| {
            let secs: f64 = parse_value(key, &raw)?;
            Duration::try_from_secs_f64(secs).map_err(|_| invalid(key, &raw))
        })
        .transpose()
}
