use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("PLACEGRID_ENV", "development"));
    let bind_addr = parse_addr("PLACEGRID_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PLACEGRID_LOG_LEVEL", "info");

    let google_places_api_key = lookup("GOOGLE_PLACES_API_KEY").ok();
    let places_base_url = or_default("PLACEGRID_PLACES_BASE_URL", "https://places.googleapis.com");

    let request_timeout_secs = parse_u64("PLACEGRID_REQUEST_TIMEOUT_SECS", "8")?;
    let max_attempts = parse_u32("PLACEGRID_MAX_ATTEMPTS", "2")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PLACEGRID_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_backoff_base_ms = parse_u64("PLACEGRID_RETRY_BACKOFF_BASE_MS", "0")?;
    let cache_ttl_secs = parse_u64("PLACEGRID_CACHE_TTL_SECS", "3600")?;

    let default_category = or_default("PLACEGRID_DEFAULT_CATEGORY", "hotels");
    let default_area_size_m = parse_f64("PLACEGRID_DEFAULT_AREA_SIZE_M", "5000")?;
    let default_grid_size = parse_u32("PLACEGRID_DEFAULT_GRID_SIZE", "3")?;
    let default_overlap = parse_f64("PLACEGRID_DEFAULT_OVERLAP", "0.4")?;
    if !(0.0..1.0).contains(&default_overlap) {
        return Err(ConfigError::InvalidEnvVar {
            var: "PLACEGRID_DEFAULT_OVERLAP".to_string(),
            reason: "overlap must be in [0, 1)".to_string(),
        });
    }
    let max_results_per_tile = parse_u32("PLACEGRID_MAX_RESULTS_PER_TILE", "20")?;
    let region_code = or_default("PLACEGRID_REGION_CODE", "in");

    let radius_policy = or_default("PLACEGRID_RADIUS_POLICY", "half-step");
    if radius_policy != "half-step" && radius_policy != "wide-overlap" {
        return Err(ConfigError::InvalidEnvVar {
            var: "PLACEGRID_RADIUS_POLICY".to_string(),
            reason: format!("unknown policy '{radius_policy}' (expected 'half-step' or 'wide-overlap')"),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_places_api_key,
        places_base_url,
        request_timeout_secs,
        max_attempts,
        retry_backoff_base_ms,
        cache_ttl_secs,
        default_category,
        default_area_size_m,
        default_grid_size,
        default_overlap,
        max_results_per_tile,
        region_code,
        radius_policy,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn empty_env_yields_defaults() {
        let map = HashMap::new();
        let config = build_app_config(lookup_from_map(&map)).expect("defaults should parse");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.default_category, "hotels");
        assert_eq!(config.default_grid_size, 3);
        assert!((config.default_overlap - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.radius_policy, "half-step");
        assert!(config.google_places_api_key.is_none());
    }

    #[test]
    fn api_key_is_picked_up_when_present() {
        let mut map = HashMap::new();
        map.insert("GOOGLE_PLACES_API_KEY", "secret-key");
        let config = build_app_config(lookup_from_map(&map)).expect("parse");
        assert_eq!(config.google_places_api_key.as_deref(), Some("secret-key"));
    }

    #[test]
    fn api_key_is_redacted_from_debug_output() {
        let mut map = HashMap::new();
        map.insert("GOOGLE_PLACES_API_KEY", "secret-key");
        let config = build_app_config(lookup_from_map(&map)).expect("parse");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut map = HashMap::new();
        map.insert("PLACEGRID_BIND_ADDR", "not-an-addr");
        let err = build_app_config(lookup_from_map(&map)).expect_err("should fail");
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PLACEGRID_BIND_ADDR"));
    }

    #[test]
    fn overlap_of_one_or_more_is_rejected() {
        let mut map = HashMap::new();
        map.insert("PLACEGRID_DEFAULT_OVERLAP", "1.0");
        let err = build_app_config(lookup_from_map(&map)).expect_err("should fail");
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PLACEGRID_DEFAULT_OVERLAP")
        );
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let mut map = HashMap::new();
        map.insert("PLACEGRID_MAX_ATTEMPTS", "0");
        let err = build_app_config(lookup_from_map(&map)).expect_err("should fail");
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PLACEGRID_MAX_ATTEMPTS")
        );
    }

    #[test]
    fn unknown_radius_policy_is_rejected() {
        let mut map = HashMap::new();
        map.insert("PLACEGRID_RADIUS_POLICY", "diagonal");
        let err = build_app_config(lookup_from_map(&map)).expect_err("should fail");
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PLACEGRID_RADIUS_POLICY")
        );
    }

    #[test]
    fn parse_environment_recognises_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("anything-else"), Environment::Development);
    }
}
