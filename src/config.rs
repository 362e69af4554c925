use std::env;

/// Fallback secret used outside production. Never valid in `Env::Production`.
pub const LOCAL_SESSION_SECRET: &str = "local-dashboard-session-secret-change-me";

/// AppConfig
///
/// Holds the dashboard's entire configuration state. Loaded once at startup,
/// immutable afterwards, and pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the platform REST API, without a trailing slash.
    pub backend_url: String,
    // Per-request timeout for backend calls, in seconds.
    pub backend_timeout_secs: u64,
    // Shared secret used to sign and verify the `admin_session` cookie.
    pub session_secret: String,
    // Lifetime of a freshly issued session, in seconds.
    pub session_ttl_secs: u64,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Controls log format and the mock backend switch.
    pub env: Env,
    // Local-only: serve pages from the seeded in-memory backend.
    pub use_mock_backend: bool,
}

/// Env
///
/// Defines the runtime context: local development or a production deployment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for tests.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000/api".to_string(),
            backend_timeout_secs: 15,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_secs: 86_400,
            bind_addr: "0.0.0.0:3000".to_string(),
            env: Env::Local,
            use_mock_backend: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in `Env::Production` when `SESSION_SECRET` or `BACKEND_URL` is missing,
    /// so the dashboard never starts with a guessable session secret.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let defaults = Self::default();

        let backend_timeout_secs = parse_or("BACKEND_TIMEOUT_SECS", defaults.backend_timeout_secs);
        let session_ttl_secs = parse_or("SESSION_TTL_SECS", defaults.session_ttl_secs);
        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        match env {
            Env::Local => Self {
                env: Env::Local,
                backend_url: env::var("BACKEND_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.backend_url),
                backend_timeout_secs,
                session_secret: env::var("SESSION_SECRET")
                    .unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
                session_ttl_secs,
                bind_addr,
                use_mock_backend: env::var("USE_MOCK_BACKEND")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            },
            Env::Production => Self {
                env: Env::Production,
                backend_url: env::var("BACKEND_URL")
                    .expect("FATAL: BACKEND_URL required in prod")
                    .trim_end_matches('/')
                    .to_string(),
                backend_timeout_secs,
                session_secret: env::var("SESSION_SECRET")
                    .expect("FATAL: SESSION_SECRET must be set in production."),
                session_ttl_secs,
                bind_addr,
                // The mock backend is never served in production.
                use_mock_backend: false,
            },
        }
    }
}

fn parse_or(key: &str, fallback: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}
