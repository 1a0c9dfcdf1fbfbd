use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Provider credential. Optional at startup: data endpoints fail closed
    /// when it is absent, the health endpoint stays reachable and reports it.
    pub google_places_api_key: Option<String>,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_base_ms: u64,
    pub cache_ttl_secs: u64,
    pub default_category: String,
    pub default_area_size_m: f64,
    pub default_grid_size: u32,
    pub default_overlap: f64,
    pub max_results_per_tile: u32,
    pub region_code: String,
    /// Per-tile search radius as a fraction of the grid step:
    /// `"half-step"` or `"wide-overlap"` (legacy 0.7 x step).
    pub radius_policy: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "google_places_api_key",
                &self.google_places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("default_category", &self.default_category)
            .field("default_area_size_m", &self.default_area_size_m)
            .field("default_grid_size", &self.default_grid_size)
            .field("default_overlap", &self.default_overlap)
            .field("max_results_per_tile", &self.max_results_per_tile)
            .field("region_code", &self.region_code)
            .field("radius_policy", &self.radius_policy)
            .finish()
    }
}
