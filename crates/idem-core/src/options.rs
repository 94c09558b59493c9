// IdemOptions — engine configuration.
//
// Everything the engine needs is passed in here; nothing is read from
// ambient globals at runtime. `from_env()` is the one place environment
// variables are consulted, at construction time.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env;
use crate::logger::{LoggerConfig, LogLevel};

// ─── Activation Email Callback ──────────────────────────────────

/// Data passed to the activation email callback.
#[derive(Debug, Clone)]
pub struct EmailCallbackData {
    /// Public projection of the user record.
    pub user: serde_json::Value,
    /// The activation link.
    pub url: String,
    /// The raw activation token embedded in the link.
    pub token: String,
}

/// Async callback for dispatching activation emails. When unset, the
/// engine logs the activation link instead of sending anything.
pub type EmailCallback = Arc<
    dyn Fn(&EmailCallbackData) -> Pin<Box<dyn Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send>>
        + Send
        + Sync,
>;

// ─── Top-level Options ──────────────────────────────────────────

/// Top-level configuration for the identity engine.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdemOptions {
    /// Secret key for signing session tokens.
    pub secret: String,

    /// Base URL used to build activation links (e.g. "https://example.com").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// App name, used in log lines and activation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Namespace for synthesized pseudo-emails:
    /// `{subject}@{provider}.{namespace}.user`.
    #[serde(default = "default_pseudo_email_namespace")]
    pub pseudo_email_namespace: String,

    /// Google verification config. Absent disables only the ID-token
    /// stage; access tokens still verify through the userinfo endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleOptions>,

    /// Apple verification config. Absent means Apple logins are rejected
    /// as unsupported. Facebook needs no server-side config and is always
    /// routable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple: Option<AppleOptions>,

    /// Session token configuration.
    #[serde(default)]
    pub session: SessionOptions,

    /// Local-registration activation configuration.
    #[serde(default)]
    pub activation: ActivationOptions,

    /// Bound on every outbound provider call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Logger configuration.
    #[serde(default)]
    pub logger: LoggerOptions,
}

fn default_pseudo_email_namespace() -> String {
    "idem".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

impl Default for IdemOptions {
    fn default() -> Self {
        Self {
            secret: String::new(),
            base_url: None,
            app_name: None,
            pseudo_email_namespace: default_pseudo_email_namespace(),
            google: None,
            apple: None,
            session: SessionOptions::default(),
            activation: ActivationOptions::default(),
            provider_timeout_secs: default_provider_timeout_secs(),
            logger: LoggerOptions::default(),
        }
    }
}

impl IdemOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Build options from environment variables: `IDEM_SECRET`,
    /// `IDEM_BASE_URL`, `GOOGLE_CLIENT_ID`, `APPLE_SERVICE_ID`.
    pub fn from_env() -> Self {
        let mut options = Self::new(env::get_secret_from_env().unwrap_or_default());
        options.base_url = env::get_base_url_from_env();
        options.google = env::get_google_client_id_from_env().map(GoogleOptions::new);
        options.apple = env::get_apple_service_id_from_env().map(AppleOptions::new);
        options
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn pseudo_email_namespace(mut self, ns: impl Into<String>) -> Self {
        self.pseudo_email_namespace = ns.into();
        self
    }

    pub fn google(mut self, client_id: impl Into<String>) -> Self {
        self.google = Some(GoogleOptions::new(client_id));
        self
    }

    pub fn apple(mut self, service_id: impl Into<String>) -> Self {
        self.apple = Some(AppleOptions::new(service_id));
        self
    }

    pub fn session_expires_in(mut self, seconds: u64) -> Self {
        self.session.expires_in = seconds;
        self
    }

    pub fn provider_timeout_secs(mut self, seconds: u64) -> Self {
        self.provider_timeout_secs = seconds;
        self
    }

    pub fn send_activation_email(mut self, callback: EmailCallback) -> Self {
        self.activation.send_activation_email = Some(callback);
        self
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

// ─── Provider Options ───────────────────────────────────────────

/// Google verification config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleOptions {
    /// Expected `aud` of Google ID tokens (the OAuth client id).
    pub client_id: String,
}

impl GoogleOptions {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

/// Apple verification config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleOptions {
    /// Expected `aud` of Apple ID tokens (the Services ID).
    pub service_id: String,
}

impl AppleOptions {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
        }
    }
}

// ─── Session Options ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Session token TTL in seconds (default: 604800 = 7 days).
    #[serde(default = "default_session_expires_in")]
    pub expires_in: u64,
}

fn default_session_expires_in() -> u64 {
    604_800 // 7 days
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            expires_in: default_session_expires_in(),
        }
    }
}

// ─── Activation Options ─────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationOptions {
    /// Length of generated activation tokens (default: 32).
    #[serde(default = "default_activation_token_length")]
    pub token_length: usize,

    /// Callback to dispatch the activation email. When unset, the link
    /// is logged at Info level and nothing is sent.
    #[serde(skip)]
    pub send_activation_email: Option<EmailCallback>,
}

fn default_activation_token_length() -> usize {
    32
}

impl fmt::Debug for ActivationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationOptions")
            .field("token_length", &self.token_length)
            .field(
                "send_activation_email",
                &self.send_activation_email.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ActivationOptions {
    fn default() -> Self {
        Self {
            token_length: default_activation_token_length(),
            send_activation_email: None,
        }
    }
}

// ─── Logger Options ─────────────────────────────────────────────

/// Serializable logger settings; converted to a `LoggerConfig` when the
/// engine context is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerOptions {
    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub disable_colors: bool,

    /// "debug", "info", "success", "warn", or "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            disabled: false,
            disable_colors: false,
            level: default_log_level(),
        }
    }
}

impl LoggerOptions {
    pub fn to_logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            disabled: self.disabled,
            disable_colors: self.disable_colors,
            level: LogLevel::from(self.level.as_str()),
            custom_handler: None,
        }
    }
}
