//! Runtime backend configuration.
//!
//! Recognized environment variables:
//!
//! - `HEAT_MAP_API_URL`: backend base URL. Trailing slashes are trimmed;
//!   values that are not `http://` or `https://` URLs are ignored. Empty
//!   means same-origin, which a headless client cannot reach, so every
//!   backend-backed provider reports its data as unavailable and the
//!   engine falls back to simulation.
//! - `HEAT_MAP_SIMULATE_ONLY`: when `1`/`true`, the temperature backend
//!   is never contacted.

/// Backend settings shared by the temperature and facility providers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, or empty for same-origin.
    pub base_url: String,
    /// Skip the temperature backend and always simulate.
    pub simulate_only: bool,
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let url = std::env::var("HEAT_MAP_API_URL").ok();
        let simulate = std::env::var("HEAT_MAP_SIMULATE_ONLY").ok();
        Self::from_values(url.as_deref(), simulate.as_deref())
    }

    /// Builds the configuration from raw variable values.
    #[must_use]
    pub fn from_values(base_url: Option<&str>, simulate_only: Option<&str>) -> Self {
        let base_url = base_url.map_or_else(String::new, sanitize_base_url);
        let simulate_only = simulate_only
            .map(str::trim)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        log::debug!(
            "Backend base URL: {}, simulate only: {simulate_only}",
            if base_url.is_empty() {
                "(same-origin)"
            } else {
                base_url.as_str()
            }
        );

        Self {
            base_url,
            simulate_only,
        }
    }

    /// Creates a configuration pointing at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: sanitize_base_url(base_url),
            simulate_only: false,
        }
    }

    /// Whether an absolute backend URL is configured.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Joins `path` (starting with `/`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn sanitize_base_url(raw: &str) -> String {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() || url == "undefined" || url == "null" {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        log::warn!("Ignoring backend URL without http(s) scheme: {url}");
        String::new()
    }
}
