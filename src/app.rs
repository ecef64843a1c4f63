//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - wires the ECB provider, model artifacts and audit store together
//! - prints reports/plots

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::{AuditStore, JsonAuditStore};
use crate::cli::{AuditCommand, Command, ForecastArgs, ScoreboardArgs, TrainArgs};
use crate::config::AppConfig;
use crate::data::{CachedProvider, EcbClient};
use crate::domain::{Currency, CurrencyPair, ForecastRequest, NewAudit, TrustLabel};
use crate::error::AppError;
use crate::model::{ArtifactModel, artifact_path, train_leg};

pub mod pipeline;

/// Entry point for the `fxc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Forecast(args) => handle_forecast(args, &config),
        Command::Scoreboard(args) => handle_scoreboard(args, &config),
        Command::Train(args) => handle_train(args, &config),
        Command::Audit(cmd) => handle_audit(cmd, &config),
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn provider(config: &AppConfig) -> Result<CachedProvider<EcbClient>, AppError> {
    Ok(CachedProvider::new(EcbClient::from_config(config)?, config.cache_ttl))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::storage(format!("Failed to serialize output: {e}")))
}

fn handle_forecast(args: ForecastArgs, config: &AppConfig) -> Result<(), AppError> {
    let request = ForecastRequest {
        pair: CurrencyPair::new(args.from, args.to),
        days: args.days,
        today: args.today.unwrap_or_else(local_today),
    };
    let provider = provider(config)?;
    let model = ArtifactModel::new(&config.model_dir);

    let out = pipeline::run_forecast(&request, config, &provider, &model)?;

    if args.json {
        println!("{}", to_json(&out.result)?);
    } else {
        println!("{}", crate::report::format_timeline(&out.result));
    }

    if args.plot {
        let plot = crate::plot::render_timeline_plot(&out.result.forecast, args.width, args.height);
        println!("{plot}");
    }

    if args.record {
        match pipeline::audit_for_forecast(&out, Utc::now()) {
            Some(new) => {
                let mut store = JsonAuditStore::open(&config.audit_path)?;
                let saved = store.insert(new)?;
                info!(id = saved.id, pair = %saved.currency_pair, target = %saved.target_date, "recorded audit");
            }
            None => warn!(pair = %out.result.pair, "timeline has nothing to audit"),
        }
    }

    Ok(())
}

fn handle_scoreboard(args: ScoreboardArgs, config: &AppConfig) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(local_today);
    let provider = provider(config)?;
    let mut store = JsonAuditStore::open(&config.audit_path)?;

    let (result, summary) = pipeline::run_scoreboard(&mut store, &provider, today)?;

    if args.json {
        println!("{}", to_json(&result)?);
    } else {
        println!("{}", crate::report::format_scoreboard(&result, &summary));
    }
    Ok(())
}

fn handle_train(args: TrainArgs, config: &AppConfig) -> Result<(), AppError> {
    let currencies: Vec<Currency> = match args.currency {
        Some(c) => vec![c],
        None => Currency::legs().collect(),
    };
    let provider = provider(config)?;
    let trained_on = local_today();

    let results: Vec<(Currency, Result<bool, AppError>)> = currencies
        .par_iter()
        .map(|&currency| {
            let path = artifact_path(&config.model_dir, &currency.leg_code());
            if path.exists() && !args.force {
                info!(leg = %currency.leg_code(), "artifact exists, skipping");
                return (currency, Ok(false));
            }
            let trained = train_leg(&provider, currency, config.history_start, trained_on, args.lags)
                .and_then(|artifact| crate::io::artifact::write_artifact_json(&path, &artifact));
            (currency, trained.map(|()| true))
        })
        .collect();

    let mut trained = 0usize;
    for (currency, result) in results {
        match result {
            Ok(true) => {
                trained += 1;
                info!(leg = %currency.leg_code(), "trained");
            }
            Ok(false) => {}
            Err(err) if args.all => warn!(leg = %currency.leg_code(), error = %err, "training failed"),
            Err(err) => return Err(err),
        }
    }

    println!("Trained {trained} leg model(s) into {}", config.model_dir.display());
    Ok(())
}

fn handle_audit(cmd: AuditCommand, config: &AppConfig) -> Result<(), AppError> {
    let mut store = JsonAuditStore::open(&config.audit_path)?;
    match cmd {
        AuditCommand::List { json } => {
            let records = store.list_all()?;
            if json {
                println!("{}", to_json(&records)?);
            } else {
                println!("{}", crate::report::format_audits(&records));
            }
        }
        AuditCommand::Seed { today } => {
            let n = seed_demo_audits(&mut store, today.unwrap_or_else(local_today))?;
            println!("Seeded {n} demo audit record(s) into {}", config.audit_path.display());
        }
    }
    Ok(())
}

/// Append four already-resolved records covering the main trust labels.
pub fn seed_demo_audits<S: AuditStore + ?Sized>(store: &mut S, today: NaiveDate) -> Result<usize, AppError> {
    let yesterday = today - chrono::Duration::days(1);
    let two_days_ago = today - chrono::Duration::days(2);

    let demos = [
        ("GBP_INR", yesterday, 105.50, 0.005, 105.48, 0.0048, TrustLabel::DirectionMatchedHighTrust),
        ("GBP_USD", yesterday, 1.27, 0.001, 1.28, 0.005, TrustLabel::DirectionMatchedConservative),
        ("GBP_EUR", two_days_ago, 1.15, 0.003, 1.14, -0.001, TrustLabel::DirectionMissedWarning),
        ("USD_JPY", two_days_ago, 145.00, 0.0, 145.05, 0.0003, TrustLabel::DirectionAccuratePrecision),
    ];

    let created_at = Utc::now();
    for (pair, target_date, predicted_rate, predicted_change_pct, actual, actual_pct, label) in demos {
        let mut record = store.insert(NewAudit {
            currency_pair: pair.to_string(),
            created_at,
            target_date,
            predicted_rate,
            predicted_change_pct,
        })?;
        record.actual_rate = Some(actual);
        record.actual_change_pct = Some(actual_pct);
        record.trust_label = Some(label);
        record.is_resolved = true;
        store.update(&record)?;
    }

    Ok(demos.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{MemoryAuditStore, scoreboard};

    #[test]
    fn seeding_appends_resolved_records() {
        let mut store = MemoryAuditStore::new();
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(seed_demo_audits(&mut store, today).unwrap(), 4);
        assert_eq!(seed_demo_audits(&mut store, today).unwrap(), 4);

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|r| r.is_resolved && r.trust_label.is_some()));
        assert!(store.list_unresolved(today).unwrap().is_empty());

        let rows = scoreboard(&store).unwrap();
        let pairs: Vec<&str> = rows.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(pairs, ["GBP/EUR", "GBP/INR", "GBP/USD", "USD/JPY"]);
        assert_eq!(rows[0].status, "danger");
        assert_eq!(rows[1].pred, "+0.50%");
    }
}
