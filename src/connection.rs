use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::BackendClient;
use crate::domain::ExchangeCredentials;
use crate::i18n::{self, Language, Msg};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}

impl ConnectionTestResult {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Verifies exchange credentials against the backend. Failure is a normal
/// outcome; this never returns an error.
#[derive(Clone)]
pub struct ConnectionTester {
    client: BackendClient,
    path: String,
    language: Language,
    in_flight: Arc<AtomicBool>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConnectionTester {
    pub fn new(client: BackendClient, path: impl Into<String>, language: Language) -> Self {
        Self {
            client,
            path: path.into(),
            language,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Single attempt, no retry. A concurrent call while one is pending is refused.
    pub async fn test_connection(&self, credentials: &ExchangeCredentials) -> ConnectionTestResult {
        let lang = self.language;
        if matches!(credentials, ExchangeCredentials::Virtual) {
            return ConnectionTestResult::ok(i18n::text(lang, Msg::ConnectionNotRequired));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return ConnectionTestResult::failed(i18n::text(lang, Msg::ConnectionInFlight));
        }
        let _guard = InFlight(&self.in_flight);

        let exchange = credentials.exchange_id().map(|e| e.as_str()).unwrap_or("");
        info!(exchange, "connection.test.start");

        match self.client.test_connection(&self.path, &credentials.to_config()).await {
            Ok(body) if body.is_ok() => {
                info!(exchange, "connection.test.ok");
                ConnectionTestResult::ok(i18n::text(lang, Msg::ConnectionOk))
            }
            Ok(body) => {
                warn!(exchange, code = body.code, reason = %body.msg, "connection.test.rejected");
                let base = i18n::text(lang, Msg::ConnectionFailed);
                let message = if body.msg.trim().is_empty() {
                    base.to_string()
                } else {
                    format!("{base}: {}", body.msg.trim())
                };
                ConnectionTestResult::failed(message)
            }
            Err(e) => {
                warn!(exchange, error = %e, "connection.test.error");
                let network = e
                    .downcast_ref::<reqwest::Error>()
                    .map(|re| re.is_connect() || re.is_timeout() || re.is_request())
                    .unwrap_or(false);
                let msg = if network { Msg::ConnectionNetworkError } else { Msg::ConnectionFailed };
                ConnectionTestResult::failed(i18n::text(lang, msg))
            }
        }
    }
}
