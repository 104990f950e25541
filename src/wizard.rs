use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{StrategyRequest, StrategyType, TradingMode};
use crate::schema::{
    self, FieldError, FieldErrorKind, FieldValue, StepValues, CREDENTIAL_FIELDS, DECIDE_INTERVAL,
    DEFAULT_MAX_POSITIONS, DEFAULT_MAX_SYMBOLS, INITIAL_CAPITAL, MAX_LEVERAGE, MAX_POSITIONS, MODEL_API_KEY,
    STRATEGY_TYPE, SYMBOLS, TRADING_MODE, WALLET_ADDRESS,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Model,
    Exchange,
    Strategy,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::Model, WizardStep::Exchange, WizardStep::Strategy];

    pub fn index(self) -> usize {
        match self {
            WizardStep::Model => 0,
            WizardStep::Exchange => 1,
            WizardStep::Strategy => 2,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

/// Linear framing: everything before `current` is completed, everything after is upcoming.
pub fn step_indicator(steps: &[WizardStep], current: WizardStep) -> Vec<(WizardStep, StepStatus)> {
    steps
        .iter()
        .map(|&step| {
            let status = match step.index().cmp(&current.index()) {
                std::cmp::Ordering::Less => StepStatus::Completed,
                std::cmp::Ordering::Equal => StepStatus::Current,
                std::cmp::Ordering::Greater => StepStatus::Upcoming,
            };
            (step, status)
        })
        .collect()
}

/// What happens to the symbol selection when leaving GridStrategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolRestorePolicy {
    /// Restore the default symbol set unless the user edited symbols themselves.
    #[default]
    DefaultsIfUntouched,
    /// Restore whatever was selected before switching to grid.
    Previous,
    /// Keep the single grid symbol.
    Keep,
}

impl FromStr for SymbolRestorePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "defaults_if_untouched" | "defaults" => Ok(SymbolRestorePolicy::DefaultsIfUntouched),
            "previous" => Ok(SymbolRestorePolicy::Previous),
            "keep" => Ok(SymbolRestorePolicy::Keep),
            other => Err(anyhow!("unknown symbol restore policy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WizardDefaults {
    pub symbols: Vec<String>,
    pub max_symbols: usize,
    pub model: StepValues,
    pub exchange: StepValues,
    pub strategy: StepValues,
}

impl WizardDefaults {
    pub fn new(symbols: Vec<String>, initial_capital: f64, max_leverage: f64, decide_interval: u64) -> Self {
        let symbols = schema::normalize_symbols(&symbols);

        let mut exchange = StepValues::new();
        exchange.insert(TRADING_MODE.into(), FieldValue::text(TradingMode::Virtual.as_str()));

        let mut strategy = StepValues::new();
        strategy.insert(STRATEGY_TYPE.into(), FieldValue::text(StrategyType::PromptBasedStrategy.as_str()));
        strategy.insert(INITIAL_CAPITAL.into(), FieldValue::Number(initial_capital));
        strategy.insert(MAX_LEVERAGE.into(), FieldValue::Number(max_leverage));
        strategy.insert(MAX_POSITIONS.into(), FieldValue::Number(DEFAULT_MAX_POSITIONS as f64));
        strategy.insert(DECIDE_INTERVAL.into(), FieldValue::Number(decide_interval as f64));
        strategy.insert(SYMBOLS.into(), FieldValue::List(symbols.clone()));

        Self {
            symbols,
            max_symbols: DEFAULT_MAX_SYMBOLS,
            model: StepValues::new(),
            exchange,
            strategy,
        }
    }

    pub fn with_max_positions(mut self, max_positions: u32) -> Self {
        self.strategy
            .insert(MAX_POSITIONS.into(), FieldValue::Number(max_positions as f64));
        self
    }

    pub fn with_max_symbols(mut self, max_symbols: usize) -> Self {
        self.max_symbols = max_symbols;
        self
    }

    pub fn for_step(&self, step: WizardStep) -> &StepValues {
        match step {
            WizardStep::Model => &self.model,
            WizardStep::Exchange => &self.exchange,
            WizardStep::Strategy => &self.strategy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Advanced { from: WizardStep, to: WizardStep },
    /// Last step validated; the wizard is ready to submit.
    Finished,
    Rejected { step: WizardStep, errors: Vec<FieldError> },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub step: WizardStep,
    pub status: StepStatus,
    pub completed: bool,
    pub values: StepValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub current: WizardStep,
    pub steps: Vec<StepSnapshot>,
}

/// Form state for one strategy-creation session.
#[derive(Debug, Clone)]
pub struct Wizard {
    values: BTreeMap<WizardStep, StepValues>,
    completed: [bool; 3],
    current: WizardStep,
    defaults: WizardDefaults,
    symbol_policy: SymbolRestorePolicy,
    symbols_customized: bool,
    pre_grid_symbols: Option<Vec<String>>,
}

impl Wizard {
    pub fn new(defaults: WizardDefaults, symbol_policy: SymbolRestorePolicy) -> Self {
        let values = WizardStep::ALL
            .into_iter()
            .map(|step| (step, defaults.for_step(step).clone()))
            .collect();
        Self {
            values,
            completed: [false; 3],
            current: WizardStep::Model,
            defaults,
            symbol_policy,
            symbols_customized: false,
            pre_grid_symbols: None,
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed[step.index()]
    }

    pub fn values(&self, step: WizardStep) -> &StepValues {
        &self.values[&step]
    }

    pub fn field(&self, step: WizardStep, name: &str) -> Option<&FieldValue> {
        self.values(step).get(name)
    }

    pub fn trading_mode(&self) -> TradingMode {
        schema::trading_mode_of(self.values(WizardStep::Exchange)).unwrap_or_default()
    }

    pub fn strategy_type(&self) -> StrategyType {
        schema::strategy_type_of(self.values(WizardStep::Strategy)).unwrap_or_default()
    }

    pub fn set_field(&mut self, step: WizardStep, name: &str, value: FieldValue) -> Result<(), FieldError> {
        if !schema::known_fields(step).contains(&name) {
            return Err(FieldError::new(name, FieldErrorKind::UnknownField));
        }

        match (step, name) {
            (WizardStep::Exchange, TRADING_MODE) => {
                let mode: TradingMode = parse_option(TRADING_MODE, &value)?;
                let previous = self.trading_mode();
                if previous != mode {
                    info!(from = previous.as_str(), to = mode.as_str(), "wizard.trading_mode.switch");
                    let defaults = self.defaults.exchange.clone();
                    self.reset_step(WizardStep::Exchange, &defaults);
                }
                self.step_mut(step)
                    .insert(TRADING_MODE.into(), FieldValue::text(mode.as_str()));
            }
            (WizardStep::Strategy, STRATEGY_TYPE) => {
                let kind: StrategyType = parse_option(STRATEGY_TYPE, &value)?;
                let previous = self.strategy_type();
                self.step_mut(step)
                    .insert(STRATEGY_TYPE.into(), FieldValue::text(kind.as_str()));
                if previous != kind {
                    self.on_strategy_type_change(kind);
                }
            }
            (WizardStep::Strategy, SYMBOLS) => {
                let symbols = schema::symbols_of(&value);
                self.symbols_customized = true;
                self.step_mut(step).insert(SYMBOLS.into(), FieldValue::List(symbols));
            }
            _ => {
                self.step_mut(step).insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Replace a step's values with `defaults` and clear its completion flag.
    pub fn reset_step(&mut self, step: WizardStep, defaults: &StepValues) {
        debug!(step = ?step, "wizard.reset_step");
        self.values.insert(step, defaults.clone());
        self.completed[step.index()] = false;
        if step == WizardStep::Strategy {
            self.symbols_customized = false;
            self.pre_grid_symbols = None;
        }
    }

    pub fn validate_step(&self, step: WizardStep) -> Result<(), Vec<FieldError>> {
        let values = self.values(step);
        match step {
            WizardStep::Model => schema::validate_model_step(values).map(|_| ()),
            WizardStep::Exchange => schema::validate_exchange_step(values).map(|_| ()),
            WizardStep::Strategy => {
                schema::validate_strategy_step(values, self.trading_mode(), self.defaults.max_symbols).map(|_| ())
            }
        }
    }

    /// Earlier steps edited after completion are re-checked first; the first
    /// one that no longer validates becomes current again.
    pub fn advance(&mut self) -> AdvanceOutcome {
        for earlier in &WizardStep::ALL[..self.current.index()] {
            let earlier = *earlier;
            if self.is_completed(earlier) {
                continue;
            }
            if let Err(errors) = self.validate_step(earlier) {
                info!(step = ?earlier, current = ?self.current, errors = errors.len(), "wizard.advance.reopened");
                self.current = earlier;
                return AdvanceOutcome::Rejected { step: earlier, errors };
            }
            self.completed[earlier.index()] = true;
        }

        let step = self.current;
        if let Err(errors) = self.validate_step(step) {
            info!(step = ?step, errors = errors.len(), "wizard.advance.rejected");
            return AdvanceOutcome::Rejected { step, errors };
        }
        self.completed[step.index()] = true;
        match step.next() {
            Some(next) => {
                self.current = next;
                info!(from = ?step, to = ?next, "wizard.advance");
                AdvanceOutcome::Advanced { from: step, to: next }
            }
            None => {
                info!(step = ?step, "wizard.finished");
                AdvanceOutcome::Finished
            }
        }
    }

    /// Returns false on the first step.
    pub fn go_back(&mut self) -> bool {
        match self.current.prev() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }

    /// Snapshot for display. Secret fields are masked. A step behind the
    /// current one that lost its completion shows as upcoming.
    pub fn snapshot(&self) -> WizardSnapshot {
        let indicator = step_indicator(&WizardStep::ALL, self.current);
        let steps = indicator
            .into_iter()
            .map(|(step, status)| StepSnapshot {
                step,
                status: match status {
                    StepStatus::Completed if !self.is_completed(step) => StepStatus::Upcoming,
                    other => other,
                },
                completed: self.is_completed(step),
                values: masked(step, self.values(step)),
            })
            .collect();
        WizardSnapshot {
            current: self.current,
            steps,
        }
    }

    /// Re-validate every step and build the request. Errors from all steps are collected.
    pub fn submit(&self) -> Result<StrategyRequest, Vec<FieldError>> {
        let model = schema::validate_model_step(self.values(WizardStep::Model));
        let creds = schema::validate_exchange_step(self.values(WizardStep::Exchange));
        let params = schema::validate_strategy_step(
            self.values(WizardStep::Strategy),
            self.trading_mode(),
            self.defaults.max_symbols,
        );

        match (model, creds, params) {
            (Ok(model_config), Ok(creds), Ok(trading_config)) => Ok(StrategyRequest {
                model_config,
                exchange_config: creds.to_config(),
                trading_config,
            }),
            (model, creds, params) => {
                let mut errors = Vec::new();
                errors.extend(model.err().unwrap_or_default());
                errors.extend(creds.err().unwrap_or_default());
                errors.extend(params.err().unwrap_or_default());
                Err(errors)
            }
        }
    }

    fn step_mut(&mut self, step: WizardStep) -> &mut StepValues {
        self.values.entry(step).or_default()
    }

    fn on_strategy_type_change(&mut self, to: StrategyType) {
        let current = self
            .values(WizardStep::Strategy)
            .get(SYMBOLS)
            .map(schema::symbols_of)
            .unwrap_or_default();

        let next = match to {
            StrategyType::GridStrategy => {
                let single = current
                    .first()
                    .cloned()
                    .or_else(|| self.defaults.symbols.first().cloned());
                self.pre_grid_symbols = Some(current);
                Some(single.into_iter().collect::<Vec<_>>())
            }
            StrategyType::PromptBasedStrategy => {
                let previous = self.pre_grid_symbols.take();
                match self.symbol_policy {
                    SymbolRestorePolicy::DefaultsIfUntouched if !self.symbols_customized => {
                        Some(self.defaults.symbols.clone())
                    }
                    SymbolRestorePolicy::DefaultsIfUntouched | SymbolRestorePolicy::Keep => None,
                    SymbolRestorePolicy::Previous => {
                        Some(previous.filter(|p| !p.is_empty()).unwrap_or_else(|| self.defaults.symbols.clone()))
                    }
                }
            }
        };

        if let Some(symbols) = next {
            debug!(strategy_type = to.as_str(), symbols = ?symbols, "wizard.symbols.adjusted");
            self.step_mut(WizardStep::Strategy)
                .insert(SYMBOLS.into(), FieldValue::List(symbols));
        }
    }
}

fn parse_option<T: FromStr>(field: &str, value: &FieldValue) -> Result<T, FieldError> {
    let raw = match value.as_text() {
        Some(text) => text.to_string(),
        None => serde_json::to_string(value).unwrap_or_default(),
    };
    raw.parse()
        .map_err(|_| FieldError::new(field, FieldErrorKind::InvalidOption(raw)))
}

fn is_secret(step: WizardStep, name: &str) -> bool {
    match step {
        WizardStep::Model => name == MODEL_API_KEY,
        WizardStep::Exchange => name != WALLET_ADDRESS && CREDENTIAL_FIELDS.contains(&name),
        WizardStep::Strategy => false,
    }
}

fn masked(step: WizardStep, values: &StepValues) -> StepValues {
    values
        .iter()
        .map(|(k, v)| {
            let v = if is_secret(step, k) && !v.is_empty() {
                FieldValue::text("********")
            } else {
                v.clone()
            };
            (k.clone(), v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExchangeId;
    use crate::schema::{API_KEY, EXCHANGE_ID, MODEL_ID, PASSPHRASE, PROVIDER, SECRET_KEY, STRATEGY_NAME};

    fn defaults() -> WizardDefaults {
        WizardDefaults::new(
            vec!["BTC/USDT".into(), "ETH/USDT".into(), "SOL/USDT".into()],
            1000.0,
            2.0,
            60,
        )
    }

    fn wizard(policy: SymbolRestorePolicy) -> Wizard {
        Wizard::new(defaults(), policy)
    }

    fn fill_model(w: &mut Wizard) {
        w.set_field(WizardStep::Model, PROVIDER, FieldValue::text("openrouter")).unwrap();
        w.set_field(WizardStep::Model, MODEL_ID, FieldValue::text("deepseek-ai/deepseek-v3.1")).unwrap();
        w.set_field(WizardStep::Model, MODEL_API_KEY, FieldValue::text("sk-model")).unwrap();
    }

    fn fill_okx(w: &mut Wizard) {
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();
        w.set_field(WizardStep::Exchange, EXCHANGE_ID, FieldValue::text("okx")).unwrap();
        w.set_field(WizardStep::Exchange, API_KEY, FieldValue::text("okx-key")).unwrap();
        w.set_field(WizardStep::Exchange, SECRET_KEY, FieldValue::text("okx-secret")).unwrap();
        w.set_field(WizardStep::Exchange, PASSPHRASE, FieldValue::text("okx-pass")).unwrap();
    }

    fn symbols(w: &Wizard) -> Vec<String> {
        w.field(WizardStep::Strategy, SYMBOLS).map(schema::symbols_of).unwrap_or_default()
    }

    #[test]
    fn advance_stays_put_on_invalid_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        match w.advance() {
            AdvanceOutcome::Rejected { step, errors } => {
                assert_eq!(step, WizardStep::Model);
                assert_eq!(errors.len(), 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(w.current(), WizardStep::Model);
        assert!(!w.is_completed(WizardStep::Model));
    }

    #[test]
    fn advance_moves_exactly_one_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        assert_eq!(
            w.advance(),
            AdvanceOutcome::Advanced { from: WizardStep::Model, to: WizardStep::Exchange }
        );
        assert!(w.is_completed(WizardStep::Model));
        assert!(!w.is_completed(WizardStep::Exchange));

        // Virtual is the default mode, so the exchange step passes without credentials.
        assert_eq!(
            w.advance(),
            AdvanceOutcome::Advanced { from: WizardStep::Exchange, to: WizardStep::Strategy }
        );

        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("alpha")).unwrap();
        assert_eq!(w.advance(), AdvanceOutcome::Finished);
        assert_eq!(w.current(), WizardStep::Strategy);
        assert!(w.is_completed(WizardStep::Strategy));
    }

    #[test]
    fn go_back_stops_at_first_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        assert!(!w.go_back());
        fill_model(&mut w);
        w.advance();
        assert!(w.go_back());
        assert_eq!(w.current(), WizardStep::Model);
    }

    #[test]
    fn trading_mode_round_trip_clears_credentials() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_okx(&mut w);
        assert!(w.validate_step(WizardStep::Exchange).is_ok());

        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("virtual")).unwrap();
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();

        for name in [EXCHANGE_ID, API_KEY, SECRET_KEY, PASSPHRASE] {
            assert!(w.field(WizardStep::Exchange, name).is_none(), "{name} survived the switch");
        }
        assert_eq!(w.trading_mode(), TradingMode::Live);
        let errs = w.validate_step(WizardStep::Exchange).unwrap_err();
        assert_eq!(errs[0].field, EXCHANGE_ID);
    }

    #[test]
    fn same_trading_mode_keeps_fields() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_okx(&mut w);
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();
        assert_eq!(
            w.field(WizardStep::Exchange, API_KEY),
            Some(&FieldValue::text("okx-key"))
        );
    }

    #[test]
    fn invalid_trading_mode_is_rejected_without_reset() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_okx(&mut w);
        let err = w
            .set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("paper"))
            .unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidOption("paper".into()));
        assert_eq!(w.trading_mode(), TradingMode::Live);
        assert!(w.field(WizardStep::Exchange, API_KEY).is_some());
    }

    #[test]
    fn mode_switch_uncompletes_exchange_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        w.advance();
        w.advance();
        assert!(w.is_completed(WizardStep::Exchange));
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();
        assert!(!w.is_completed(WizardStep::Exchange));
    }

    #[test]
    fn non_text_option_reports_its_json_form() {
        let mut w = wizard(SymbolRestorePolicy::default());
        let err = w
            .set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::Number(2.0))
            .unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidOption("2.0".into()));

        let err = w
            .set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::list(["GridStrategy"]))
            .unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidOption("[\"GridStrategy\"]".into()));
        assert_eq!(w.strategy_type(), StrategyType::PromptBasedStrategy);
    }

    #[test]
    fn finishing_rechecks_steps_edited_from_the_last_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        w.advance();
        w.advance();
        assert_eq!(w.current(), WizardStep::Strategy);
        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("alpha")).unwrap();

        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();
        let snap = w.snapshot();
        assert!(!snap.steps[1].completed);
        assert_eq!(snap.steps[1].status, StepStatus::Upcoming);
        assert_eq!(snap.steps[0].status, StepStatus::Completed);

        match w.advance() {
            AdvanceOutcome::Rejected { step, errors } => {
                assert_eq!(step, WizardStep::Exchange);
                assert_eq!(errors[0].field, EXCHANGE_ID);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(w.current(), WizardStep::Exchange);
        assert!(!w.is_completed(WizardStep::Strategy));

        fill_okx(&mut w);
        assert_eq!(
            w.advance(),
            AdvanceOutcome::Advanced { from: WizardStep::Exchange, to: WizardStep::Strategy }
        );
        assert_eq!(w.advance(), AdvanceOutcome::Finished);
        assert!(WizardStep::ALL.iter().all(|s| w.is_completed(*s)));
    }

    #[test]
    fn earlier_step_still_valid_after_edit_is_recompleted() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        fill_okx(&mut w);
        w.advance();
        w.advance();
        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("alpha")).unwrap();

        // live -> virtual resets the exchange step, but virtual needs no credentials.
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("virtual")).unwrap();
        assert!(!w.is_completed(WizardStep::Exchange));
        assert_eq!(w.advance(), AdvanceOutcome::Finished);
        assert!(w.is_completed(WizardStep::Exchange));
    }

    #[test]
    fn defaults_carry_max_positions_and_symbol_cap() {
        let mut w = Wizard::new(defaults().with_max_positions(7).with_max_symbols(2), SymbolRestorePolicy::default());
        fill_model(&mut w);
        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("alpha")).unwrap();

        // Three default symbols exceed the cap of two.
        let errs = w.submit().unwrap_err();
        assert_eq!(errs[0].kind, FieldErrorKind::TooManySymbols { max: 2 });

        w.set_field(WizardStep::Strategy, SYMBOLS, FieldValue::list(["BTC/USDT", "ETH/USDT"])).unwrap();
        let req = w.submit().unwrap();
        assert_eq!(req.trading_config.max_positions, 7);
    }

    #[test]
    fn grid_truncates_to_first_symbol() {
        let mut w = wizard(SymbolRestorePolicy::default());
        w.set_field(WizardStep::Strategy, SYMBOLS, FieldValue::list(["BTC/USDT", "ETH/USDT"])).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        assert_eq!(symbols(&w), vec!["BTC/USDT".to_string()]);
    }

    #[test]
    fn grid_falls_back_to_default_symbol() {
        let mut w = wizard(SymbolRestorePolicy::default());
        w.set_field(WizardStep::Strategy, SYMBOLS, FieldValue::list(Vec::<String>::new())).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        assert_eq!(symbols(&w), vec!["BTC/USDT".to_string()]);
    }

    #[test]
    fn leaving_grid_restores_defaults_when_untouched() {
        let mut w = wizard(SymbolRestorePolicy::DefaultsIfUntouched);
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("PromptBasedStrategy")).unwrap();
        assert_eq!(symbols(&w), defaults().symbols);
    }

    #[test]
    fn leaving_grid_keeps_customized_selection() {
        let mut w = wizard(SymbolRestorePolicy::DefaultsIfUntouched);
        w.set_field(WizardStep::Strategy, SYMBOLS, FieldValue::list(["DOGE/USDT", "ETH/USDT"])).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("PromptBasedStrategy")).unwrap();
        assert_eq!(symbols(&w), vec!["DOGE/USDT".to_string()]);
    }

    #[test]
    fn previous_policy_restores_pre_grid_selection() {
        let mut w = wizard(SymbolRestorePolicy::Previous);
        w.set_field(WizardStep::Strategy, SYMBOLS, FieldValue::list(["DOGE/USDT", "ETH/USDT"])).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        assert_eq!(symbols(&w).len(), 1);
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("PromptBasedStrategy")).unwrap();
        assert_eq!(symbols(&w), vec!["DOGE/USDT".to_string(), "ETH/USDT".to_string()]);
    }

    #[test]
    fn keep_policy_leaves_single_symbol() {
        let mut w = wizard(SymbolRestorePolicy::Keep);
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("GridStrategy")).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_TYPE, FieldValue::text("PromptBasedStrategy")).unwrap();
        assert_eq!(symbols(&w), vec!["BTC/USDT".to_string()]);
    }

    #[test]
    fn unknown_field_rejected() {
        let mut w = wizard(SymbolRestorePolicy::default());
        let err = w
            .set_field(WizardStep::Model, "temperature", FieldValue::Number(0.2))
            .unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::UnknownField);
        let err = w
            .set_field(WizardStep::Model, PASSPHRASE, FieldValue::text("x"))
            .unwrap_err();
        assert_eq!(err.field, PASSPHRASE);
    }

    #[test]
    fn virtual_submit_carries_no_credentials() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        w.set_field(WizardStep::Exchange, EXCHANGE_ID, FieldValue::text("okx")).unwrap();
        w.set_field(WizardStep::Exchange, API_KEY, FieldValue::text("leftover")).unwrap();
        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("paper")).unwrap();

        let req = w.submit().unwrap();
        assert_eq!(req.exchange_config.trading_mode, TradingMode::Virtual);
        assert!(req.exchange_config.exchange_id.is_none());
        assert!(req.exchange_config.api_key.is_none());
        assert_eq!(req.trading_config.initial_capital, Some(1000.0));
    }

    #[test]
    fn live_submit_builds_exchange_config() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        fill_okx(&mut w);
        w.set_field(WizardStep::Strategy, STRATEGY_NAME, FieldValue::text("okx-live")).unwrap();

        let req = w.submit().unwrap();
        assert_eq!(req.exchange_config.exchange_id, Some(ExchangeId::Okx));
        assert_eq!(req.exchange_config.passphrase.as_deref(), Some("okx-pass"));
        assert_eq!(req.trading_config.initial_capital, None);
    }

    #[test]
    fn submit_collects_errors_from_every_step() {
        let mut w = wizard(SymbolRestorePolicy::default());
        w.set_field(WizardStep::Exchange, TRADING_MODE, FieldValue::text("live")).unwrap();
        let errs = w.submit().unwrap_err();
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&PROVIDER));
        assert!(fields.contains(&EXCHANGE_ID));
        assert!(fields.contains(&STRATEGY_NAME));
    }

    #[test]
    fn indicator_is_linear() {
        let statuses: Vec<StepStatus> = step_indicator(&WizardStep::ALL, WizardStep::Exchange)
            .into_iter()
            .map(|(_, s)| s)
            .collect();
        assert_eq!(statuses, vec![StepStatus::Completed, StepStatus::Current, StepStatus::Upcoming]);

        let first = step_indicator(&WizardStep::ALL, WizardStep::Model);
        assert_eq!(first[0].1, StepStatus::Current);
        assert!(first[1..].iter().all(|(_, s)| *s == StepStatus::Upcoming));
    }

    #[test]
    fn snapshot_masks_secrets() {
        let mut w = wizard(SymbolRestorePolicy::default());
        fill_model(&mut w);
        fill_okx(&mut w);
        let snap = w.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("okx-secret"));
        assert!(!json.contains("sk-model"));
        assert!(json.contains("\"exchange_id\":\"okx\""));
    }
}
