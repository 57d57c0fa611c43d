//! Runtime configuration.
//!
//! Values come from an optional KDL file, then the environment, then
//! command-line flags, each layer overriding the previous one:
//!
//! ```kdl
//! backend "https://project.example.co"
//! anon-key "public-anon-key"
//! session-file "~/.config/likeboost/session.json"
//! demo enabled=#true delay-ms=1500
//! ```

use miette::Diagnostic;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable holding the backend base URL
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the public project key
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "likeboost.kdl";
/// Simulated latency of demo submissions
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    #[error("Missing Supabase environment variables")]
    #[diagnostic(
        code(likeboost::config::missing),
        help("set SUPABASE_URL and SUPABASE_ANON_KEY, or `backend` and `anon-key` in likeboost.kdl")
    )]
    Missing,

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(likeboost::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse KDL config")]
    #[diagnostic(code(likeboost::config::kdl))]
    Kdl(
        #[from]
        #[source]
        kdl::KdlError,
    ),

    #[error("{0}")]
    #[diagnostic(code(likeboost::config::invalid))]
    Invalid(String),

    #[error("invalid backend URL")]
    #[diagnostic(code(likeboost::config::url))]
    Url(
        #[from]
        #[source]
        url::ParseError,
    ),
}

/// Whether the sentinel UIDs short-circuit to canned outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    pub enabled: bool,
    pub delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: DEFAULT_DEMO_DELAY,
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: Url,
    pub anon_key: SmolStr,
    pub session_file: PathBuf,
    pub demo: DemoConfig,
}

/// One configuration layer; unset fields fall through to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub backend_url: Option<String>,
    pub anon_key: Option<SmolStr>,
    pub session_file: Option<PathBuf>,
    pub demo_enabled: Option<bool>,
    pub demo_delay: Option<Duration>,
}

impl PartialConfig {
    pub fn from_kdl(text: &str) -> Result<Self, ConfigError> {
        let doc = text.parse::<kdl::KdlDocument>()?;
        let mut out = PartialConfig::default();

        for node in doc.nodes() {
            match node.name().value() {
                "backend" => out.backend_url = Some(string_arg(node)?.to_owned()),
                "anon-key" => out.anon_key = Some(string_arg(node)?.into()),
                "session-file" => out.session_file = Some(PathBuf::from(string_arg(node)?)),
                "demo" => {
                    if let Some(enabled) = node.get("enabled") {
                        out.demo_enabled = Some(enabled.as_bool().ok_or_else(|| {
                            ConfigError::Invalid("demo enabled= expects a boolean".into())
                        })?);
                    }
                    if let Some(delay) = node.get("delay-ms") {
                        let ms = delay
                            .as_integer()
                            .and_then(|i| u64::try_from(i).ok())
                            .ok_or_else(|| {
                                ConfigError::Invalid(
                                    "demo delay-ms= expects a non-negative integer".into(),
                                )
                            })?;
                        out.demo_delay = Some(Duration::from_millis(ms));
                    }
                }
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "Unknown config node: {other}"
                    )));
                }
            }
        }
        Ok(out)
    }

    /// Read `path`. A missing file is an empty layer only when `optional`.
    pub async fn from_file(path: &Path, optional: bool) -> Result<Self, ConfigError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::from_kdl(&text),
            Err(e) if optional && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Layer from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var(URL_ENV).ok().filter(|v| !v.is_empty()),
            anon_key: std::env::var(ANON_KEY_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .map(SmolStr::from),
            ..Default::default()
        }
    }

    /// `other` wins wherever it is set.
    pub fn merge(self, other: PartialConfig) -> Self {
        Self {
            backend_url: other.backend_url.or(self.backend_url),
            anon_key: other.anon_key.or(self.anon_key),
            session_file: other.session_file.or(self.session_file),
            demo_enabled: other.demo_enabled.or(self.demo_enabled),
            demo_delay: other.demo_delay.or(self.demo_delay),
        }
    }

    pub fn resolve(self) -> Result<Config, ConfigError> {
        let (Some(url), Some(anon_key)) = (self.backend_url, self.anon_key) else {
            return Err(ConfigError::Missing);
        };
        let defaults = DemoConfig::default();
        Ok(Config {
            backend_url: Url::parse(&url)?,
            anon_key,
            session_file: self.session_file.unwrap_or_else(default_session_file),
            demo: DemoConfig {
                enabled: self.demo_enabled.unwrap_or(defaults.enabled),
                delay: self.demo_delay.unwrap_or(defaults.delay),
            },
        })
    }
}

fn string_arg(node: &kdl::KdlNode) -> Result<&str, ConfigError> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| {
            ConfigError::Invalid(format!("{} expects a string value", node.name().value()))
        })
}

/// `$XDG_CONFIG_HOME/likeboost/session.json`, falling back to `~/.config`
/// and finally the working directory.
pub fn default_session_file() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("likeboost").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".likeboost-session.json"))
}
