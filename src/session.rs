use anyhow::Result;
use tracing::info;

use crate::api::{BackendClient, DefaultTickers, StrategyDetail, StrategyReport, StrategySummary, UserInfo};
use crate::notifier::Notifier;

/// Front-end data access: API failures become notices instead of errors.
pub struct Session {
    client: BackendClient,
    notices: Notifier,
    strategies: Option<Vec<StrategySummary>>,
}

impl Session {
    pub fn new(client: BackendClient, notices: Notifier) -> Self {
        Self {
            client,
            notices,
            strategies: None,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn notices(&mut self) -> &mut Notifier {
        &mut self.notices
    }

    fn surface<T>(&mut self, what: &str, res: Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.notices.error(format!("{what}: {e}"));
                None
            }
        }
    }

    pub async fn current_user(&mut self) -> Option<UserInfo> {
        let res = self.client.me().await;
        self.surface("auth/me", res)
    }

    pub async fn logout(&mut self) -> bool {
        let res = self.client.logout().await;
        let ok = self.surface("auth/logout", res).is_some();
        if ok {
            self.client.set_token(None);
            self.strategies = None;
            info!("session.logout");
        }
        ok
    }

    /// Cached after the first successful fetch.
    pub async fn strategies(&mut self) -> Option<Vec<StrategySummary>> {
        if let Some(cached) = &self.strategies {
            return Some(cached.clone());
        }
        let res = self.client.list_strategies().await;
        let list = self.surface("strategy/list", res)?;
        self.strategies = Some(list.clone());
        Some(list)
    }

    pub async fn strategy_detail(&mut self, strategy_id: &str) -> Option<StrategyDetail> {
        let res = self.client.strategy_detail(strategy_id).await;
        self.surface("strategy/detail", res)
    }

    /// Invalidates the strategy cache only when publishing succeeds.
    pub async fn publish(&mut self, report: &StrategyReport) -> bool {
        let res = self.client.publish_strategy(report).await;
        match self.surface("strategy/report", res) {
            Some(_) => {
                self.strategies = None;
                self.notices.info(format!("published {}", report.strategy_id));
                true
            }
            None => false,
        }
    }

    pub async fn default_tickers(&mut self, region: &str) -> Option<DefaultTickers> {
        let res = self.client.default_tickers(region).await;
        self.surface("system/default-tickers", res)
    }
}
