//! Client configuration loaded from environment variables.

/// Configuration for a [`PortalClient`](crate::http::PortalClient).
///
/// All fields have defaults suitable for local development; override via
/// environment variables in deployed builds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the banking backend, without a trailing slash
    /// (default: `http://localhost:8080`).
    pub base_url: String,
    /// Fixed per-request timeout in seconds (default: `30`). A request that
    /// exceeds it fails with a timeout classification and is not retried.
    pub request_timeout_secs: u64,
    /// Treat 403 like an expired session (refresh, then logout-and-redirect
    /// on failure). The admin console sets this; the customer portal does
    /// not (default: `false`).
    pub treat_forbidden_as_expired: bool,
}

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `BANKLINE_API_URL`         | `http://localhost:8080` |
    /// | `BANKLINE_TIMEOUT_SECS`    | `30`                    |
    /// | `BANKLINE_FORBIDDEN_EXPIRES`| `false`                |
    ///
    /// # Panics
    ///
    /// Panics if `BANKLINE_TIMEOUT_SECS` is set but not a valid u64.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("BANKLINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into());

        let request_timeout_secs: u64 = std::env::var("BANKLINE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("BANKLINE_TIMEOUT_SECS must be a valid u64");

        let treat_forbidden_as_expired = std::env::var("BANKLINE_FORBIDDEN_EXPIRES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            treat_forbidden_as_expired,
        }
    }

    /// Configuration pointing at an explicit base URL, with defaults for
    /// everything else. Used by tests and short-lived tools.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            treat_forbidden_as_expired: false,
        }
    }
}
