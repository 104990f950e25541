use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    ExchangeCredentials, ExchangeId, ModelSelection, StrategyParameters, StrategyType, TradingMode,
};
use crate::i18n::{self, Language};
use crate::wizard::WizardStep;

pub const PROVIDER: &str = "provider";
pub const MODEL_ID: &str = "model_id";
pub const MODEL_API_KEY: &str = "api_key";

pub const TRADING_MODE: &str = "trading_mode";
pub const EXCHANGE_ID: &str = "exchange_id";
pub const API_KEY: &str = "api_key";
pub const SECRET_KEY: &str = "secret_key";
pub const PASSPHRASE: &str = "passphrase";
pub const WALLET_ADDRESS: &str = "wallet_address";
pub const PRIVATE_KEY: &str = "private_key";

pub const STRATEGY_TYPE: &str = "strategy_type";
pub const STRATEGY_NAME: &str = "strategy_name";
pub const INITIAL_CAPITAL: &str = "initial_capital";
pub const MAX_LEVERAGE: &str = "max_leverage";
pub const MAX_POSITIONS: &str = "max_positions";
pub const DECIDE_INTERVAL: &str = "decide_interval";
pub const SYMBOLS: &str = "symbols";
pub const TEMPLATE_ID: &str = "template_id";
pub const CUSTOM_PROMPT: &str = "custom_prompt";

/// Every credential field the exchange step can hold, across all exchanges.
pub const CREDENTIAL_FIELDS: [&str; 5] = [API_KEY, SECRET_KEY, PASSPHRASE, WALLET_ADDRESS, PRIVATE_KEY];

pub const LEVERAGE_MIN: f64 = 1.0;
pub const LEVERAGE_MAX: f64 = 5.0;
pub const DECIDE_INTERVAL_MIN: u64 = 10;
pub const DECIDE_INTERVAL_MAX: u64 = 3600;
pub const DEFAULT_MAX_POSITIONS: u32 = 5;
pub const DEFAULT_MAX_SYMBOLS: usize = 5;

/// A single form value. Drafts carry plain JSON, so numbers may also arrive as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(v) => v.iter().all(|s| s.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

pub type StepValues = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    InvalidNumber,
    NotInteger,
    MustBePositive,
    OutOfRange { min: f64, max: f64 },
    UnsupportedExchange(String),
    InvalidOption(String),
    GridSingleSymbol,
    TooManySymbols { max: usize },
    UnknownField,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: &str, kind: FieldErrorKind) -> Self {
        Self { field: field.to_string(), kind }
    }

    pub fn message(&self, lang: Language) -> String {
        i18n::field_error(lang, &self.kind)
    }
}

pub fn known_fields(step: WizardStep) -> &'static [&'static str] {
    match step {
        WizardStep::Model => &[PROVIDER, MODEL_ID, MODEL_API_KEY],
        WizardStep::Exchange => &[
            TRADING_MODE,
            EXCHANGE_ID,
            API_KEY,
            SECRET_KEY,
            PASSPHRASE,
            WALLET_ADDRESS,
            PRIVATE_KEY,
        ],
        WizardStep::Strategy => &[
            STRATEGY_TYPE,
            STRATEGY_NAME,
            INITIAL_CAPITAL,
            MAX_LEVERAGE,
            MAX_POSITIONS,
            DECIDE_INTERVAL,
            SYMBOLS,
            TEMPLATE_ID,
            CUSTOM_PROMPT,
        ],
    }
}

/// Which credential fields the exchange step must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSchema {
    CredentialFree,
    WalletKey,
    KeySecretPassphrase(ExchangeId),
    KeySecret(ExchangeId),
}

impl CredentialSchema {
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CredentialSchema::CredentialFree => &[],
            CredentialSchema::WalletKey => &[WALLET_ADDRESS, PRIVATE_KEY],
            CredentialSchema::KeySecretPassphrase(_) => &[API_KEY, SECRET_KEY, PASSPHRASE],
            CredentialSchema::KeySecret(_) => &[API_KEY, SECRET_KEY],
        }
    }

    pub fn validate(&self, values: &StepValues) -> Vec<FieldError> {
        self.required_fields()
            .iter()
            .filter(|name| non_empty_text(values, name).is_none())
            .map(|name| FieldError::new(name, FieldErrorKind::Required))
            .collect()
    }

    /// Builds the credential variant for this schema. Fields outside the schema are ignored.
    pub fn credentials(&self, values: &StepValues) -> Result<ExchangeCredentials, Vec<FieldError>> {
        let errors = self.validate(values);
        if !errors.is_empty() {
            return Err(errors);
        }
        let get = |name: &str| non_empty_text(values, name).unwrap_or_default().to_string();
        Ok(match *self {
            CredentialSchema::CredentialFree => ExchangeCredentials::Virtual,
            CredentialSchema::WalletKey => ExchangeCredentials::Hyperliquid {
                wallet_address: get(WALLET_ADDRESS),
                private_key: get(PRIVATE_KEY),
            },
            CredentialSchema::KeySecretPassphrase(exchange) => ExchangeCredentials::WithPassphrase {
                exchange,
                api_key: get(API_KEY),
                secret_key: get(SECRET_KEY),
                passphrase: get(PASSPHRASE),
            },
            CredentialSchema::KeySecret(exchange) => ExchangeCredentials::ApiKey {
                exchange,
                api_key: get(API_KEY),
                secret_key: get(SECRET_KEY),
            },
        })
    }
}

/// Resolve the credential schema for a trading mode and exchange.
///
/// Virtual mode never looks at `exchange_id`. Under live mode a missing or
/// unrecognized exchange becomes a field error on `exchange_id`.
pub fn resolve_schema(mode: TradingMode, exchange_id: Option<&str>) -> Result<CredentialSchema, FieldError> {
    if mode == TradingMode::Virtual {
        return Ok(CredentialSchema::CredentialFree);
    }
    let raw = exchange_id.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(FieldError::new(EXCHANGE_ID, FieldErrorKind::Required));
    };
    let exchange: ExchangeId = raw
        .parse()
        .map_err(|_| FieldError::new(EXCHANGE_ID, FieldErrorKind::UnsupportedExchange(raw.to_string())))?;
    Ok(match exchange {
        ExchangeId::Hyperliquid => CredentialSchema::WalletKey,
        ExchangeId::Okx | ExchangeId::Coinbaseexchange => CredentialSchema::KeySecretPassphrase(exchange),
        ExchangeId::Binance | ExchangeId::Blockchaincom | ExchangeId::Gate | ExchangeId::Mexc => {
            CredentialSchema::KeySecret(exchange)
        }
    })
}

pub fn trading_mode_of(values: &StepValues) -> Result<TradingMode, FieldError> {
    match non_empty_text(values, TRADING_MODE) {
        None => Ok(TradingMode::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| FieldError::new(TRADING_MODE, FieldErrorKind::InvalidOption(raw.to_string()))),
    }
}

pub fn strategy_type_of(values: &StepValues) -> Result<StrategyType, FieldError> {
    match non_empty_text(values, STRATEGY_TYPE) {
        None => Ok(StrategyType::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| FieldError::new(STRATEGY_TYPE, FieldErrorKind::InvalidOption(raw.to_string()))),
    }
}

pub fn validate_model_step(values: &StepValues) -> Result<ModelSelection, Vec<FieldError>> {
    let errors: Vec<FieldError> = known_fields(WizardStep::Model)
        .iter()
        .filter(|name| non_empty_text(values, name).is_none())
        .map(|name| FieldError::new(name, FieldErrorKind::Required))
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }
    let get = |name: &str| non_empty_text(values, name).unwrap_or_default().to_string();
    Ok(ModelSelection {
        provider: get(PROVIDER),
        model_id: get(MODEL_ID),
        api_key: get(MODEL_API_KEY),
    })
}

pub fn validate_exchange_step(values: &StepValues) -> Result<ExchangeCredentials, Vec<FieldError>> {
    let mode = trading_mode_of(values).map_err(|e| vec![e])?;
    let schema = resolve_schema(mode, non_empty_text(values, EXCHANGE_ID)).map_err(|e| vec![e])?;
    schema.credentials(values)
}

/// Validate the strategy step. `mode` comes from the exchange step; initial
/// capital only applies to virtual trading and is dropped for live.
/// `max_symbols` caps the selection; the backend rejects longer lists.
pub fn validate_strategy_step(
    values: &StepValues,
    mode: TradingMode,
    max_symbols: usize,
) -> Result<StrategyParameters, Vec<FieldError>> {
    let mut errors = Vec::new();

    let strategy_type = strategy_type_of(values).unwrap_or_else(|e| {
        errors.push(e);
        StrategyType::default()
    });

    let strategy_name = non_empty_text(values, STRATEGY_NAME).map(str::to_string);
    if strategy_name.is_none() {
        errors.push(FieldError::new(STRATEGY_NAME, FieldErrorKind::Required));
    }

    let initial_capital = match mode {
        TradingMode::Live => None,
        TradingMode::Virtual => match number(values, INITIAL_CAPITAL) {
            Ok(Some(v)) if v > 0.0 => Some(v),
            Ok(Some(_)) => {
                errors.push(FieldError::new(INITIAL_CAPITAL, FieldErrorKind::MustBePositive));
                None
            }
            Ok(None) => {
                errors.push(FieldError::new(INITIAL_CAPITAL, FieldErrorKind::Required));
                None
            }
            Err(kind) => {
                errors.push(FieldError::new(INITIAL_CAPITAL, kind));
                None
            }
        },
    };

    let max_leverage = match bounded(values, MAX_LEVERAGE, LEVERAGE_MIN, LEVERAGE_MAX) {
        Ok(v) => v,
        Err(e) => {
            errors.push(e);
            LEVERAGE_MIN
        }
    };

    let max_positions = match number(values, MAX_POSITIONS) {
        Ok(Some(v)) if v.fract() != 0.0 => {
            errors.push(FieldError::new(MAX_POSITIONS, FieldErrorKind::NotInteger));
            DEFAULT_MAX_POSITIONS
        }
        Ok(Some(v)) if v >= 1.0 && v <= u32::MAX as f64 => v as u32,
        Ok(Some(_)) => {
            errors.push(FieldError::new(MAX_POSITIONS, FieldErrorKind::MustBePositive));
            DEFAULT_MAX_POSITIONS
        }
        Ok(None) => {
            errors.push(FieldError::new(MAX_POSITIONS, FieldErrorKind::Required));
            DEFAULT_MAX_POSITIONS
        }
        Err(kind) => {
            errors.push(FieldError::new(MAX_POSITIONS, kind));
            DEFAULT_MAX_POSITIONS
        }
    };

    let decide_interval = match bounded(
        values,
        DECIDE_INTERVAL,
        DECIDE_INTERVAL_MIN as f64,
        DECIDE_INTERVAL_MAX as f64,
    ) {
        Ok(v) if v.fract() == 0.0 => v as u64,
        Ok(_) => {
            errors.push(FieldError::new(DECIDE_INTERVAL, FieldErrorKind::NotInteger));
            DECIDE_INTERVAL_MIN
        }
        Err(e) => {
            errors.push(e);
            DECIDE_INTERVAL_MIN
        }
    };

    let symbols = values.get(SYMBOLS).map(symbols_of).unwrap_or_default();
    if symbols.is_empty() {
        errors.push(FieldError::new(SYMBOLS, FieldErrorKind::Required));
    } else if strategy_type == StrategyType::GridStrategy && symbols.len() != 1 {
        errors.push(FieldError::new(SYMBOLS, FieldErrorKind::GridSingleSymbol));
    } else if symbols.len() > max_symbols {
        errors.push(FieldError::new(SYMBOLS, FieldErrorKind::TooManySymbols { max: max_symbols }));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(StrategyParameters {
        strategy_type,
        strategy_name: strategy_name.unwrap_or_default(),
        initial_capital,
        max_leverage,
        max_positions,
        decide_interval,
        symbols,
        template_id: non_empty_text(values, TEMPLATE_ID).map(str::to_string),
        custom_prompt: non_empty_text(values, CUSTOM_PROMPT).map(str::to_string),
    })
}

/// Upper-cased, trimmed, de-duplicated symbols in selection order.
pub fn normalize_symbols<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for s in raw {
        let sym = s.as_ref().trim().to_uppercase();
        if !sym.is_empty() && !out.contains(&sym) {
            out.push(sym);
        }
    }
    out
}

pub fn symbols_of(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::List(v) => normalize_symbols(v),
        FieldValue::Text(s) => normalize_symbols(s.split(',')),
        FieldValue::Number(_) => Vec::new(),
    }
}

fn non_empty_text<'a>(values: &'a StepValues, name: &str) -> Option<&'a str> {
    values
        .get(name)
        .and_then(FieldValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number(values: &StepValues, name: &str) -> Result<Option<f64>, FieldErrorKind> {
    match values.get(name) {
        None => Ok(None),
        Some(FieldValue::Number(n)) if n.is_finite() => Ok(Some(*n)),
        Some(FieldValue::Number(_)) => Err(FieldErrorKind::InvalidNumber),
        Some(FieldValue::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(FieldValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or(FieldErrorKind::InvalidNumber),
        Some(FieldValue::List(_)) => Err(FieldErrorKind::InvalidNumber),
    }
}

fn bounded(values: &StepValues, name: &str, min: f64, max: f64) -> Result<f64, FieldError> {
    match number(values, name) {
        Ok(Some(v)) if (min..=max).contains(&v) => Ok(v),
        Ok(Some(_)) => Err(FieldError::new(name, FieldErrorKind::OutOfRange { min, max })),
        Ok(None) => Err(FieldError::new(name, FieldErrorKind::Required)),
        Err(kind) => Err(FieldError::new(name, kind)),
    }
}
