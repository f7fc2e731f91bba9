use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "explore-dev-secret".to_string(),
            jwt_expiration_seconds: 3600,
        }
    }
}

/// The single back-office account. Demo gating only.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@exploregb.pk".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_intent_delay")]
    pub intent_delay_ms: u64,
    #[serde(default = "default_confirm_delay")]
    pub confirm_delay_ms: u64,
}

fn default_currency() -> String { "usd".to_string() }
fn default_intent_delay() -> u64 { 1000 }
fn default_confirm_delay() -> u64 { 2000 }

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            intent_delay_ms: default_intent_delay(),
            confirm_delay_ms: default_confirm_delay(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Without a key every chat reply falls back to the apology message.
    pub api_key: Option<String>,
    #[serde(default = "default_assistant_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_assistant_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String { "gemini-3-flash-preview".to_string() }
fn default_timeout() -> u64 { 30 }

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_assistant_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Retention of per-customer checkout and chat sessions.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Unused sessions are dropped after this long.
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,
    /// Booked or failed checkouts stay readable this long.
    #[serde(default = "default_settled_ttl")]
    pub settled_ttl_secs: u64,
    #[serde(default = "default_max_per_customer")]
    pub max_per_customer: usize,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_idle_ttl() -> u64 { 1800 }
fn default_settled_ttl() -> u64 { 300 }
fn default_max_per_customer() -> usize { 5 }
fn default_max_sessions() -> usize { 10_000 }
fn default_sweep_interval() -> u64 { 60 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl(),
            settled_ttl_secs: default_settled_ttl(),
            max_per_customer: default_max_per_customer(),
            max_sessions: default_max_sessions(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked developer overrides
            .add_source(config::File::with_name("config/local").required(false))
            // EXPLORE__ASSISTANT__API_KEY=... sets assistant.api_key
            .add_source(config::Environment::with_prefix("EXPLORE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
