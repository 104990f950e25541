use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::schema::{FieldError, StepValues, STRATEGY_TYPE, TRADING_MODE};
use crate::wizard::{Wizard, WizardStep};

/// Field values for every step, as saved by the front end or written by hand.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Draft {
    #[serde(default)]
    pub model: StepValues,
    #[serde(default)]
    pub exchange: StepValues,
    #[serde(default)]
    pub strategy: StepValues,
}

impl Draft {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| format!("reading draft {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing draft {}", path.display()))
    }

    pub fn values(&self, step: WizardStep) -> &StepValues {
        match step {
            WizardStep::Model => &self.model,
            WizardStep::Exchange => &self.exchange,
            WizardStep::Strategy => &self.strategy,
        }
    }

    /// Replays the draft into `wizard`. Mode and strategy type go first since
    /// changing them rewrites dependent fields.
    pub fn apply(&self, wizard: &mut Wizard) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for step in WizardStep::ALL {
            let values = self.values(step);
            let leading = [TRADING_MODE, STRATEGY_TYPE];
            let first = values.iter().filter(|(k, _)| leading.contains(&k.as_str()));
            let rest = values.iter().filter(|(k, _)| !leading.contains(&k.as_str()));
            for (name, value) in first.chain(rest) {
                if let Err(e) = wizard.set_field(step, name, value.clone()) {
                    errors.push(e);
                }
            }
        }
        errors
    }
}
