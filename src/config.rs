use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::notifier::NOTICE_TTL_MAX_SECS;
use crate::schema::{
    self, DECIDE_INTERVAL_MAX, DECIDE_INTERVAL_MIN, DEFAULT_MAX_POSITIONS, DEFAULT_MAX_SYMBOLS, LEVERAGE_MAX,
    LEVERAGE_MIN,
};
use crate::wizard::{SymbolRestorePolicy, WizardDefaults};

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Backend
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub connection_test_path: String,
    pub region: String,

    // Wizard defaults
    pub default_symbols: Vec<String>,
    pub symbol_restore: SymbolRestorePolicy,
    pub default_initial_capital: f64,
    pub default_max_leverage: f64,
    pub default_decide_interval: u64,
    pub default_max_positions: u32,
    pub max_symbols: usize,
    pub test_connection: bool,

    // UI
    pub settings_path: String,
    pub notice_ttl_secs: u64,

    // Logging
    pub log_json: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connection_test_path", &self.connection_test_path)
            .field("region", &self.region)
            .field("default_symbols", &self.default_symbols)
            .field("symbol_restore", &self.symbol_restore)
            .field("default_initial_capital", &self.default_initial_capital)
            .field("default_max_leverage", &self.default_max_leverage)
            .field("default_decide_interval", &self.default_decide_interval)
            .field("default_max_positions", &self.default_max_positions)
            .field("max_symbols", &self.max_symbols)
            .field("test_connection", &self.test_connection)
            .field("settings_path", &self.settings_path)
            .field("notice_ttl_secs", &self.notice_ttl_secs)
            .field("log_json", &self.log_json)
            .finish()
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|s| s.trim().to_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) if v == "1" || v == "true" || v == "yes" || v == "y" || v == "on" => true,
        Some(v) if v == "0" || v == "false" || v == "no" || v == "n" || v == "off" => false,
        Some(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|x| x.trim().parse().ok())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = std::env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Backend
        let api_base_url = std::env::var("WIZ_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string());
        let api_token = std::env::var("WIZ_API_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let request_timeout_secs = env_parse::<u64>("WIZ_REQUEST_TIMEOUT_SECS").unwrap_or(15);
        let connection_test_path = std::env::var("WIZ_CONNECTION_TEST_PATH")
            .unwrap_or_else(|_| "/strategy/test-connection".to_string());
        let region = std::env::var("WIZ_REGION").unwrap_or_else(|_| "default".to_string());

        if request_timeout_secs == 0 {
            return Err(anyhow!("WIZ_REQUEST_TIMEOUT_SECS must be > 0"));
        }

        // Wizard defaults
        let default_symbols = env_list("WIZ_DEFAULT_SYMBOLS").unwrap_or_else(|| {
            ["BTC/USDT", "ETH/USDT", "SOL/USDT", "DOGE/USDT", "XRP/USDT"]
                .into_iter()
                .map(str::to_string)
                .collect()
        });
        let symbol_restore = match std::env::var("WIZ_SYMBOL_RESTORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => SymbolRestorePolicy::default(),
        };
        let default_initial_capital = env_parse::<f64>("WIZ_DEFAULT_INITIAL_CAPITAL").unwrap_or(1000.0);
        let default_max_leverage = env_parse::<f64>("WIZ_DEFAULT_MAX_LEVERAGE").unwrap_or(2.0);
        let default_decide_interval = env_parse::<u64>("WIZ_DEFAULT_DECIDE_INTERVAL").unwrap_or(60);
        let default_max_positions =
            env_parse::<u32>("WIZ_DEFAULT_MAX_POSITIONS").unwrap_or(DEFAULT_MAX_POSITIONS);
        let max_symbols = env_parse::<usize>("WIZ_MAX_SYMBOLS").unwrap_or(DEFAULT_MAX_SYMBOLS);
        let test_connection = env_bool("WIZ_TEST_CONNECTION", true);

        if default_initial_capital <= 0.0 {
            return Err(anyhow!("WIZ_DEFAULT_INITIAL_CAPITAL must be > 0"));
        }
        if !(LEVERAGE_MIN..=LEVERAGE_MAX).contains(&default_max_leverage) {
            return Err(anyhow!(
                "WIZ_DEFAULT_MAX_LEVERAGE must be within [{LEVERAGE_MIN}, {LEVERAGE_MAX}]"
            ));
        }
        if !(DECIDE_INTERVAL_MIN..=DECIDE_INTERVAL_MAX).contains(&default_decide_interval) {
            return Err(anyhow!(
                "WIZ_DEFAULT_DECIDE_INTERVAL must be within [{DECIDE_INTERVAL_MIN}, {DECIDE_INTERVAL_MAX}]"
            ));
        }

        if default_max_positions == 0 {
            return Err(anyhow!("WIZ_DEFAULT_MAX_POSITIONS must be > 0"));
        }
        if max_symbols == 0 {
            return Err(anyhow!("WIZ_MAX_SYMBOLS must be > 0"));
        }
        if schema::normalize_symbols(&default_symbols).len() > max_symbols {
            return Err(anyhow!("WIZ_DEFAULT_SYMBOLS holds more than WIZ_MAX_SYMBOLS={max_symbols} symbols"));
        }

        // UI
        let settings_path = std::env::var("WIZ_SETTINGS_PATH").unwrap_or_else(|_| "./ui_settings.json".to_string());
        let notice_ttl_secs = env_parse::<u64>("WIZ_NOTICE_TTL_SECS").unwrap_or(5);
        if !(1..=NOTICE_TTL_MAX_SECS).contains(&notice_ttl_secs) {
            return Err(anyhow!("WIZ_NOTICE_TTL_SECS must be within [1, {NOTICE_TTL_MAX_SECS}]"));
        }

        let log_json = env_bool("WIZ_LOG_JSON", false);

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout_secs,
            connection_test_path,
            region,
            default_symbols,
            symbol_restore,
            default_initial_capital,
            default_max_leverage,
            default_decide_interval,
            default_max_positions,
            max_symbols,
            test_connection,
            settings_path,
            notice_ttl_secs,
            log_json,
        })
    }

    pub fn wizard_defaults(&self) -> WizardDefaults {
        WizardDefaults::new(
            self.default_symbols.clone(),
            self.default_initial_capital,
            self.default_max_leverage,
            self.default_decide_interval,
        )
        .with_max_positions(self.default_max_positions)
        .with_max_symbols(self.max_symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment is process-global; keep every env-mutating assertion in one test.
    #[test]
    fn from_env_defaults_and_validation() {
        for key in [
            "WIZ_API_BASE_URL",
            "WIZ_DEFAULT_SYMBOLS",
            "WIZ_SYMBOL_RESTORE",
            "WIZ_DEFAULT_MAX_LEVERAGE",
            "WIZ_REQUEST_TIMEOUT_SECS",
            "WIZ_NOTICE_TTL_SECS",
            "WIZ_MAX_SYMBOLS",
            "WIZ_DEFAULT_MAX_POSITIONS",
        ] {
            std::env::remove_var(key);
        }

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.default_symbols.len(), 5);
        assert_eq!(cfg.symbol_restore, SymbolRestorePolicy::DefaultsIfUntouched);
        assert_eq!(cfg.connection_test_path, "/strategy/test-connection");
        assert_eq!(cfg.notice_ttl_secs, 5);
        assert_eq!(cfg.default_max_positions, DEFAULT_MAX_POSITIONS);
        assert_eq!(cfg.wizard_defaults().max_symbols, DEFAULT_MAX_SYMBOLS);

        std::env::set_var("WIZ_DEFAULT_SYMBOLS", "btc/usdt, ,eth/usdt");
        std::env::set_var("WIZ_SYMBOL_RESTORE", "previous");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.default_symbols, vec!["btc/usdt".to_string(), "eth/usdt".to_string()]);
        assert_eq!(cfg.symbol_restore, SymbolRestorePolicy::Previous);
        assert_eq!(cfg.wizard_defaults().symbols, vec!["BTC/USDT".to_string(), "ETH/USDT".to_string()]);

        std::env::set_var("WIZ_DEFAULT_MAX_LEVERAGE", "8");
        assert!(Config::from_env().is_err());
        std::env::remove_var("WIZ_DEFAULT_MAX_LEVERAGE");

        std::env::set_var("WIZ_SYMBOL_RESTORE", "sometimes");
        assert!(Config::from_env().is_err());
        std::env::set_var("WIZ_SYMBOL_RESTORE", "previous");

        std::env::set_var("WIZ_NOTICE_TTL_SECS", "0");
        assert!(Config::from_env().is_err());
        std::env::set_var("WIZ_NOTICE_TTL_SECS", "10000000000000000");
        assert!(Config::from_env().is_err());
        std::env::set_var("WIZ_NOTICE_TTL_SECS", "30");
        assert_eq!(Config::from_env().unwrap().notice_ttl_secs, 30);
        std::env::remove_var("WIZ_NOTICE_TTL_SECS");

        std::env::set_var("WIZ_DEFAULT_MAX_POSITIONS", "0");
        assert!(Config::from_env().is_err());
        std::env::remove_var("WIZ_DEFAULT_MAX_POSITIONS");

        // Two default symbols are set above.
        std::env::set_var("WIZ_MAX_SYMBOLS", "1");
        assert!(Config::from_env().is_err());
        std::env::set_var("WIZ_MAX_SYMBOLS", "2");
        assert_eq!(Config::from_env().unwrap().max_symbols, 2);
        std::env::remove_var("WIZ_MAX_SYMBOLS");

        for key in ["WIZ_DEFAULT_SYMBOLS", "WIZ_SYMBOL_RESTORE"] {
            std::env::remove_var(key);
        }
    }
}
