//! Scoreboard: the latest resolved prediction per pair.

use crate::audit::store::AuditStore;
use crate::domain::{PredictionAudit, ScoreRow};
use crate::error::AppError;

/// One row per pair that has at least one resolved record, ordered by pair code.
pub fn scoreboard<S: AuditStore + ?Sized>(store: &S) -> Result<Vec<ScoreRow>, AppError> {
    let mut rows = Vec::new();
    for pair in store.list_distinct_pairs()? {
        if let Some(latest) = store.latest_resolved(&pair)? {
            if let Some(row) = score_row(&latest) {
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

/// Format a resolved record. Returns `None` if the record is missing its verdict.
pub fn score_row(record: &PredictionAudit) -> Option<ScoreRow> {
    let label = record.trust_label?;
    let actual = record.actual_change_pct?;
    Some(ScoreRow {
        currency: record.currency_pair.replace('_', "/"),
        pred: signed_pct(record.predicted_change_pct),
        actual: signed_pct(actual),
        label,
        status: if label.is_matched() { "success" } else { "danger" }.to_string(),
    })
}

/// `0.005` -> `"+0.50%"`.
pub fn signed_pct(fraction: f64) -> String {
    format!("{:+.2}%", fraction * 100.0)
}
