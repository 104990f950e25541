use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Live,
    #[default]
    Virtual,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Live => "live",
            TradingMode::Virtual => "virtual",
        }
    }
}

impl FromStr for TradingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(TradingMode::Live),
            "virtual" => Ok(TradingMode::Virtual),
            other => Err(anyhow!("unknown trading mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Okx,
    Binance,
    Hyperliquid,
    Blockchaincom,
    Coinbaseexchange,
    Gate,
    Mexc,
}

impl ExchangeId {
    pub const ALL: [ExchangeId; 7] = [
        ExchangeId::Okx,
        ExchangeId::Binance,
        ExchangeId::Hyperliquid,
        ExchangeId::Blockchaincom,
        ExchangeId::Coinbaseexchange,
        ExchangeId::Gate,
        ExchangeId::Mexc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Okx => "okx",
            ExchangeId::Binance => "binance",
            ExchangeId::Hyperliquid => "hyperliquid",
            ExchangeId::Blockchaincom => "blockchaincom",
            ExchangeId::Coinbaseexchange => "coinbaseexchange",
            ExchangeId::Gate => "gate",
            ExchangeId::Mexc => "mexc",
        }
    }
}

impl FromStr for ExchangeId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        ExchangeId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| anyhow!("unsupported exchange: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum StrategyType {
    #[default]
    PromptBasedStrategy,
    GridStrategy,
}

impl StrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::PromptBasedStrategy => "PromptBasedStrategy",
            StrategyType::GridStrategy => "GridStrategy",
        }
    }
}

impl FromStr for StrategyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "PromptBasedStrategy" => Ok(StrategyType::PromptBasedStrategy),
            "GridStrategy" => Ok(StrategyType::GridStrategy),
            other => Err(anyhow!("unknown strategy type: {other}")),
        }
    }
}

/// Minimal secret set needed to authenticate against one exchange.
///
/// Serialized flat (`exchange_id` plus the credential fields) so it matches the
/// backend's exchange config payload.
#[derive(Clone, PartialEq, Eq)]
pub enum ExchangeCredentials {
    Virtual,
    Hyperliquid {
        wallet_address: String,
        private_key: String,
    },
    WithPassphrase {
        exchange: ExchangeId,
        api_key: String,
        secret_key: String,
        passphrase: String,
    },
    ApiKey {
        exchange: ExchangeId,
        api_key: String,
        secret_key: String,
    },
}

impl ExchangeCredentials {
    pub fn exchange_id(&self) -> Option<ExchangeId> {
        match self {
            ExchangeCredentials::Virtual => None,
            ExchangeCredentials::Hyperliquid { .. } => Some(ExchangeId::Hyperliquid),
            ExchangeCredentials::WithPassphrase { exchange, .. }
            | ExchangeCredentials::ApiKey { exchange, .. } => Some(*exchange),
        }
    }

    pub fn trading_mode(&self) -> TradingMode {
        match self {
            ExchangeCredentials::Virtual => TradingMode::Virtual,
            _ => TradingMode::Live,
        }
    }

    pub fn to_config(&self) -> ExchangeConfig {
        let mut cfg = ExchangeConfig {
            exchange_id: self.exchange_id(),
            trading_mode: self.trading_mode(),
            ..ExchangeConfig::default()
        };
        match self {
            ExchangeCredentials::Virtual => {}
            ExchangeCredentials::Hyperliquid { wallet_address, private_key } => {
                cfg.wallet_address = Some(wallet_address.clone());
                cfg.private_key = Some(private_key.clone());
            }
            ExchangeCredentials::WithPassphrase { api_key, secret_key, passphrase, .. } => {
                cfg.api_key = Some(api_key.clone());
                cfg.secret_key = Some(secret_key.clone());
                cfg.passphrase = Some(passphrase.clone());
            }
            ExchangeCredentials::ApiKey { api_key, secret_key, .. } => {
                cfg.api_key = Some(api_key.clone());
                cfg.secret_key = Some(secret_key.clone());
            }
        }
        cfg
    }
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeCredentials::Virtual => f.write_str("Virtual"),
            ExchangeCredentials::Hyperliquid { wallet_address, .. } => f
                .debug_struct("Hyperliquid")
                .field("wallet_address", wallet_address)
                .field("private_key", &"<redacted>")
                .finish(),
            ExchangeCredentials::WithPassphrase { exchange, .. } => f
                .debug_struct("WithPassphrase")
                .field("exchange", exchange)
                .field("api_key", &"<redacted>")
                .field("secret_key", &"<redacted>")
                .field("passphrase", &"<redacted>")
                .finish(),
            ExchangeCredentials::ApiKey { exchange, .. } => f
                .debug_struct("ApiKey")
                .field("exchange", exchange)
                .field("api_key", &"<redacted>")
                .field("secret_key", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub exchange_id: Option<ExchangeId>,
    pub trading_mode: TradingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("exchange_id", &self.exchange_id)
            .field("trading_mode", &self.trading_mode)
            .field("has_api_key", &self.api_key.is_some())
            .field("has_wallet", &self.wallet_address.is_some())
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: String,
    pub model_id: String,
    pub api_key: String,
}

impl fmt::Debug for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSelection")
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyParameters {
    pub strategy_type: StrategyType,
    pub strategy_name: String,
    /// Only present for virtual trading.
    pub initial_capital: Option<f64>,
    pub max_leverage: f64,
    /// Concurrent open positions.
    pub max_positions: u32,
    /// Seconds between decision cycles.
    pub decide_interval: u64,
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

/// Payload handed to the strategy agent once the wizard completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub model_config: ModelSelection,
    pub exchange_config: ExchangeConfig,
    pub trading_config: StrategyParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_parses_case_insensitively() {
        assert_eq!("OKX".parse::<ExchangeId>().unwrap(), ExchangeId::Okx);
        assert_eq!(" coinbaseexchange ".parse::<ExchangeId>().unwrap(), ExchangeId::Coinbaseexchange);
        assert!("kraken".parse::<ExchangeId>().is_err());
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = ExchangeCredentials::WithPassphrase {
            exchange: ExchangeId::Okx,
            api_key: "key-123".into(),
            secret_key: "sec-456".into(),
            passphrase: "pass-789".into(),
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("key-123"));
        assert!(!dbg.contains("sec-456"));
        assert!(!dbg.contains("pass-789"));
        assert!(dbg.contains("Okx"));
    }

    #[test]
    fn virtual_config_carries_no_secrets() {
        let cfg = ExchangeCredentials::Virtual.to_config();
        assert_eq!(cfg.trading_mode, TradingMode::Virtual);
        assert!(cfg.exchange_id.is_none());
        let json = serde_json::to_value(&cfg).unwrap();
        assert!(json.get("api_key").is_none());
        assert!(json.get("private_key").is_none());
    }
}
