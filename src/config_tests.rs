use crate::config::{Config, DEFAULT_UNIVERSE};
use crate::domain::analytics::forecast::ScalerFitScope;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    env::remove_var("SYMBOLS");
    env::remove_var("FORECAST_EPOCHS");
    env::remove_var("SCALER_FIT_SCOPE");

    let config = Config::from_env().unwrap();

    assert_eq!(config.symbols.len(), DEFAULT_UNIVERSE.len());
    assert!(config.symbols.iter().any(|s| s == "BTC-USD"));
    assert_eq!(config.forecast.training_epochs, 10);
    assert_eq!(config.forecast.min_history, 60);
    assert_eq!(config.forecast.scaler_fit_scope, ScalerFitScope::FullHistory);
    assert_eq!(config.binance_base_url, "https://api.binance.com");
}

#[test]
fn test_config_symbol_list_override() {
    let _guard = get_env_lock().lock().unwrap();
    env::set_var("SYMBOLS", "BTC-USD, ETH-USD ,SOL-USD");

    let config = Config::from_env().unwrap();
    assert_eq!(config.symbols, vec!["BTC-USD", "ETH-USD", "SOL-USD"]);

    env::remove_var("SYMBOLS");
}

#[test]
fn test_config_forecast_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    env::set_var("FORECAST_EPOCHS", "3");
    env::set_var("FORECAST_HIDDEN_UNITS", "16");
    env::set_var("SCALER_FIT_SCOPE", "train");

    let config = Config::from_env().unwrap();
    assert_eq!(config.forecast.training_epochs, 3);
    assert_eq!(config.forecast.hidden_units, 16);
    assert_eq!(config.forecast.scaler_fit_scope, ScalerFitScope::TrainOnly);

    env::remove_var("FORECAST_EPOCHS");
    env::remove_var("FORECAST_HIDDEN_UNITS");
    env::remove_var("SCALER_FIT_SCOPE");
}

#[test]
fn test_config_rejects_bad_scaler_scope() {
    let _guard = get_env_lock().lock().unwrap();
    env::set_var("SCALER_FIT_SCOPE", "everything");

    assert!(Config::from_env().is_err());

    env::remove_var("SCALER_FIT_SCOPE");
}

#[test]
fn test_config_timeouts() {
    let _guard = get_env_lock().lock().unwrap();
    env::set_var("FETCH_TIMEOUT_SECS", "5");

    let config = Config::from_env().unwrap();
    let timeouts = config.timeouts();
    assert_eq!(timeouts.fetch.as_secs(), 5);
    assert_eq!(timeouts.train.as_secs(), 180);

    env::remove_var("FETCH_TIMEOUT_SECS");
}
