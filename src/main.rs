mod api;
mod config;
mod connection;
mod domain;
mod draft;
mod i18n;
mod monitoring;
mod notifier;
mod render;
mod schema;
mod session;
mod settings;
mod time;
mod wizard;

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::api::{BackendClient, StrategyReport};
use crate::config::Config;
use crate::connection::ConnectionTester;
use crate::draft::Draft;
use crate::notifier::Notifier;
use crate::session::Session;
use crate::settings::{RenderContext, SettingsStore};
use crate::wizard::{AdvanceOutcome, Wizard, WizardStep};

#[tokio::main]
async fn main() -> Result<()> {
    // Load local .env if present
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env()?;
    monitoring::init_tracing(cfg.log_json);
    info!(?cfg, "boot");

    let mut ctx = RenderContext::init(SettingsStore::new(&cfg.settings_path))?;
    let client = BackendClient::new(
        &cfg.api_base_url,
        cfg.api_token.clone(),
        Duration::from_secs(cfg.request_timeout_secs),
    )?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "strategies".to_string());
    match command.as_str() {
        "wizard" => {
            let path = args.next().ok_or_else(|| anyhow!("usage: wizard <draft.json>"))?;
            run_wizard(&cfg, &ctx, client, &path).await?;
        }
        "strategies" => list_strategies(&cfg, &ctx, client).await?,
        "tickers" => list_tickers(&cfg, client).await?,
        "detail" => {
            let id = args.next().ok_or_else(|| anyhow!("usage: detail <strategy_id>"))?;
            let mut session = open_session(&cfg, client)?;
            if let Some(detail) = session.strategy_detail(&id).await {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            }
            print_notices(&mut session);
        }
        "publish" => {
            let id = args.next().ok_or_else(|| anyhow!("usage: publish <strategy_id> [description]"))?;
            let report = StrategyReport { strategy_id: id, name: None, description: args.next() };
            let mut session = open_session(&cfg, client)?;
            session.publish(&report).await;
            print_notices(&mut session);
        }
        "logout" => {
            let mut session = open_session(&cfg, client)?;
            session.logout().await;
            print_notices(&mut session);
        }
        "settings" => {
            if let Some(lang) = args.next() {
                ctx.set_language(lang.parse()?)?;
            }
            if let Some(mode) = args.next() {
                ctx.set_color_mode(mode.parse()?)?;
            }
            println!("language={} color_mode={:?}", ctx.language().code(), ctx.color_mode());
        }
        other => {
            return Err(anyhow!(
                "unknown command: {other} (expected wizard | strategies | tickers | detail | publish | logout | settings)"
            ))
        }
    }

    ctx.teardown()
}

async fn run_wizard(cfg: &Config, ctx: &RenderContext, client: BackendClient, path: &str) -> Result<()> {
    let lang = ctx.language();
    let draft = Draft::load(path)?;
    let mut wizard = Wizard::new(cfg.wizard_defaults(), cfg.symbol_restore);

    for e in draft.apply(&mut wizard) {
        warn!(field = %e.field, "draft.field.rejected");
        eprintln!("  ! {}: {}", e.field, e.message(lang));
    }

    let tester = ConnectionTester::new(client, cfg.connection_test_path.clone(), lang);

    loop {
        let snapshot = wizard.snapshot();
        let indicator: Vec<_> = snapshot.steps.iter().map(|s| (s.step, s.status)).collect();
        eprintln!("{}", render::render_steps(ctx, &indicator));
        let step = wizard.current();

        // The connection test is advisory and never gates navigation.
        if step == WizardStep::Exchange && cfg.test_connection {
            if let Ok(creds) = schema::validate_exchange_step(wizard.values(step)) {
                let res = tester.test_connection(&creds).await;
                info!(success = res.success, "wizard.connection_test");
                eprintln!("  {} {}", if res.success { "ok" } else { "!!" }, res.message);
            }
        }

        match wizard.advance() {
            AdvanceOutcome::Advanced { .. } => continue,
            AdvanceOutcome::Finished => break,
            AdvanceOutcome::Rejected { step, errors } => {
                for e in &errors {
                    eprintln!("  ! {}: {}", e.field, e.message(lang));
                }
                return Err(anyhow!("step {step:?} has {} invalid field(s)", errors.len()));
            }
        }
    }

    match wizard.submit() {
        Ok(req) => {
            info!(
                exchange = ?req.exchange_config.exchange_id,
                mode = req.exchange_config.trading_mode.as_str(),
                strategy_type = req.trading_config.strategy_type.as_str(),
                symbols = ?req.trading_config.symbols,
                "wizard.submit"
            );
            println!("{}", serde_json::to_string_pretty(&req)?);
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("  ! {}: {}", e.field, e.message(lang));
            }
            Err(anyhow!("submission has {} invalid field(s)", errors.len()))
        }
    }
}

fn open_session(cfg: &Config, client: BackendClient) -> Result<Session> {
    Ok(Session::new(client, Notifier::new(cfg.notice_ttl_secs)?))
}

async fn list_strategies(cfg: &Config, ctx: &RenderContext, client: BackendClient) -> Result<()> {
    let mut session = open_session(cfg, client)?;
    if session.client().has_token() {
        if let Some(user) = session.current_user().await {
            info!(user = user.email.as_deref().or(user.name.as_deref()).unwrap_or(""), "session.user");
        }
    }

    for s in session.strategies().await.unwrap_or_default() {
        let updated = s
            .last_updated_ts
            .and_then(|ts| time::format_ts_ms(ts, ctx.language()).ok())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<20} {:<8} {:>8} {}",
            s.strategy_id.as_deref().unwrap_or("-"),
            s.name.as_deref().unwrap_or("-"),
            s.mode.map(|m| m.as_str()).unwrap_or("-"),
            s.pnl_pct.map(|p| format!("{p:.2}%")).unwrap_or_else(|| "-".to_string()),
            updated,
        );
    }

    print_notices(&mut session);
    Ok(())
}

async fn list_tickers(cfg: &Config, client: BackendClient) -> Result<()> {
    let mut session = open_session(cfg, client)?;
    if let Some(list) = session.default_tickers(&cfg.region).await {
        for t in list.tickers {
            println!("{:<14} {:<10} {}", t.ticker, t.symbol, t.name);
        }
    }
    print_notices(&mut session);
    Ok(())
}

fn print_notices(session: &mut Session) {
    for n in session.notices().active(Utc::now()) {
        eprintln!("  ! {}", n.text);
    }
}
