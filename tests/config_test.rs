// Config::from_env tests; these mutate process env so they run serially

use serial_test::serial;
use solar_potential_service::config::{Config, ConfigError};

const VARS: [&str; 7] = [
    "SERVER_HOST",
    "SERVER_PORT",
    "NASA_POWER_URL",
    "REQUEST_TIMEOUT_SECONDS",
    "PROVIDER_MAX_RETRIES",
    "CACHE_SWEEP_INTERVAL_SECONDS",
    "CACHE_MAX_ENTRIES",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.server_addr(), "0.0.0.0:5000");
    assert_eq!(
        config.power_url,
        "https://power.larc.nasa.gov/api/temporal/monthly/point"
    );
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.provider_max_retries, 0);
    assert_eq!(config.cache_sweep_interval_secs, 60);
    assert_eq!(config.cache_max_entries, None);
}

#[test]
#[serial]
fn test_overrides() {
    clear_env();
    std::env::set_var("SERVER_HOST", "127.0.0.1");
    std::env::set_var("SERVER_PORT", "9090");
    std::env::set_var("NASA_POWER_URL", "http://localhost:1234/point");
    std::env::set_var("PROVIDER_MAX_RETRIES", "2");
    std::env::set_var("CACHE_MAX_ENTRIES", "1000");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.server_addr(), "127.0.0.1:9090");
    assert_eq!(config.power_url, "http://localhost:1234/point");
    assert_eq!(config.provider_max_retries, 2);
    assert_eq!(config.cache_max_entries, Some(1000));
}

#[test]
#[serial]
fn test_sweep_interval_is_capped() {
    clear_env();
    std::env::set_var("CACHE_SWEEP_INTERVAL_SECONDS", "3600");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.cache_sweep_interval_secs, 300);
}

#[test]
#[serial]
fn test_cache_ttl_is_not_configurable() {
    clear_env();
    // The 24 hour TTL is fixed; a stray variable must neither fail nor apply
    std::env::set_var("CACHE_TTL_SECONDS", "0");

    let result = Config::from_env();
    std::env::remove_var("CACHE_TTL_SECONDS");

    assert!(result.is_ok());
}

#[test]
#[serial]
fn test_invalid_value_is_error() {
    clear_env();
    std::env::set_var("SERVER_PORT", "not-a-port");

    let result = Config::from_env();
    clear_env();

    match result {
        Err(ConfigError::Invalid { var, value }) => {
            assert_eq!(var, "SERVER_PORT");
            assert_eq!(value, "not-a-port");
        }
        Ok(_) => panic!("Expected invalid SERVER_PORT to fail"),
    }
}
