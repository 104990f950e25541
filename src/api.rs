use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ExchangeConfig, TradingMode};

/// Envelope every backend endpoint answers with. `code == 0` means success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    pub fn into_data(self) -> Result<T> {
        if !self.is_ok() {
            return Err(anyhow!("backend error {}: {}", self.code, self.msg));
        }
        self.data.ok_or_else(|| anyhow!("backend returned no data"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,

    #[serde(flatten)]
    pub rest: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Running,
    Paused,
    Stopped,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StrategySummary {
    pub strategy_id: Option<String>,
    pub name: Option<String>,
    pub model_provider: Option<String>,
    pub model_id: Option<String>,
    pub exchange_id: Option<String>,
    pub mode: Option<TradingMode>,
    pub status: Option<StrategyStatus>,
    pub realized_pnl: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
    /// Milliseconds since epoch.
    pub last_updated_ts: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDetail {
    pub strategy_id: String,
    #[serde(default)]
    pub name: Option<String>,

    /// Portfolio and history blocks are rendered elsewhere; kept opaque here.
    #[serde(flatten)]
    pub rest: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultTicker {
    pub ticker: String,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultTickers {
    #[serde(default)]
    pub region: Option<String>,
    pub tickers: Vec<DefaultTicker>,
}

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!(path, "api.get");
        let resp = self
            .authed(self.http.get(self.url(path)))
            .query(query)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn me(&self) -> Result<UserInfo> {
        self.get("/auth/me", &[]).await
    }

    pub async fn logout(&self) -> Result<()> {
        let resp = self
            .authed(self.http.post(self.url("/auth/logout")))
            .send()
            .await?;
        ack(resp).await
    }

    pub async fn list_strategies(&self) -> Result<Vec<StrategySummary>> {
        self.get("/strategy/list", &[]).await
    }

    pub async fn strategy_detail(&self, strategy_id: &str) -> Result<StrategyDetail> {
        self.get(&format!("/strategy/detail/{strategy_id}"), &[]).await
    }

    pub async fn publish_strategy(&self, report: &StrategyReport) -> Result<()> {
        debug!(strategy_id = %report.strategy_id, "api.publish");
        let resp = self
            .authed(self.http.post(self.url("/strategy/report")))
            .json(report)
            .send()
            .await?;
        ack(resp).await
    }

    pub async fn default_tickers(&self, region: &str) -> Result<DefaultTickers> {
        self.get("system/default-tickers", &[("region", region)]).await
    }

    /// Posts credentials for verification. A rejection comes back as an
    /// envelope with a non-zero code, not as an error.
    pub async fn test_connection(&self, path: &str, cfg: &ExchangeConfig) -> Result<ApiResponse<serde_json::Value>> {
        let resp = self
            .authed(self.http.post(self.url(path)))
            .json(cfg)
            .send()
            .await?;
        envelope(resp).await
    }
}

/// Reads the envelope before looking at the HTTP status so a 4xx/5xx body
/// keeps the backend's `msg`.
async fn envelope<T: DeserializeOwned>(resp: Response) -> Result<ApiResponse<T>> {
    let status = resp.status();
    let raw = resp.text().await?;
    match serde_json::from_str::<ApiResponse<T>>(&raw) {
        Ok(body) if status.is_success() || !body.is_ok() => Ok(body),
        Ok(_) => Err(anyhow!("http {status}")),
        Err(_) if !status.is_success() => Err(anyhow!("http {status}")),
        Err(e) => Err(anyhow!("malformed response: {e}")),
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    envelope(resp).await?.into_data()
}

/// For endpoints whose `data` carries nothing of interest.
async fn ack(resp: Response) -> Result<()> {
    let body: ApiResponse<serde_json::Value> = envelope(resp).await?;
    if !body.is_ok() {
        return Err(anyhow!("backend error {}: {}", body.code, body.msg));
    }
    Ok(())
}
