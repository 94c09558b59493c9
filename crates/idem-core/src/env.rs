// Environment detection and env-sourced configuration values.

use std::sync::OnceLock;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Detect the current environment mode from `IDEM_ENV`, then `RUST_ENV`.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("IDEM_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default()
            .to_lowercase();

        match env_val.as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

pub fn is_development() -> bool {
    detect_env_mode() == EnvMode::Development
}

pub fn is_test() -> bool {
    detect_env_mode() == EnvMode::Test
}

/// Session-token signing secret (`IDEM_SECRET`).
pub fn get_secret_from_env() -> Option<String> {
    std::env::var("IDEM_SECRET").ok()
}

/// Base URL for activation links (`IDEM_BASE_URL`).
pub fn get_base_url_from_env() -> Option<String> {
    std::env::var("IDEM_BASE_URL").ok()
}

/// Audience for Google ID token checks (`GOOGLE_CLIENT_ID`).
pub fn get_google_client_id_from_env() -> Option<String> {
    std::env::var("GOOGLE_CLIENT_ID").ok()
}

/// Audience for Apple ID token checks (`APPLE_SERVICE_ID`).
pub fn get_apple_service_id_from_env() -> Option<String> {
    std::env::var("APPLE_SERVICE_ID").ok()
}

/// Initialize a `tracing` subscriber for embedders that use the tracing
/// ecosystem. The engine itself logs through `AuthLogger`; this is a
/// convenience so both ends share one env-filtered console.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("idem=info")
        } else {
            EnvFilter::new("idem=debug")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
