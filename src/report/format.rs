//! Formatted terminal output for timelines, scoreboards and audit listings.
//!
//! We keep formatting code in one place so the forecasting and auditing code
//! stays free of presentation concerns.

use crate::audit::ResolutionSummary;
use crate::audit::scoreboard::signed_pct;
use crate::domain::{ForecastResult, PointKind, PredictionAudit, ScoreboardResult};

/// Format a forecast timeline as a table.
pub fn format_timeline(result: &ForecastResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== fxc - {} forecast ===\n", result.pair.replace('_', "/")));
    let count = |k: PointKind| result.forecast.iter().filter(|p| p.kind == k).count();
    out.push_str(&format!(
        "Points: history={} indicative={} forecast={}\n\n",
        count(PointKind::History),
        count(PointKind::Indicative),
        count(PointKind::Forecast),
    ));

    out.push_str(format!("{:<12} {:>12} {:<10}", "date", "rate", "type").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<10}", "", "", "").trim_end());
    out.push('\n');

    for p in &result.forecast {
        out.push_str(
            format!("{:<12} {:>12.4} {:<10}", p.date.to_string(), p.rate, p.kind.as_str()).trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the scoreboard plus a one-line resolution summary.
pub fn format_scoreboard(result: &ScoreboardResult, summary: &ResolutionSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Resolution: resolved={} skipped={}\n\n",
        summary.resolved, summary.skipped
    ));

    if result.scoreboard.is_empty() {
        out.push_str("No resolved predictions yet.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:<9} {:>8} {:>8} {:<34} {:<8}",
            "pair", "pred", "actual", "label", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<9} {:-<8} {:-<8} {:-<34} {:-<8}", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in &result.scoreboard {
        out.push_str(
            format!(
                "{:<9} {:>8} {:>8} {:<34} {:<8}",
                row.currency,
                row.pred,
                row.actual,
                row.label.display_name(),
                row.status
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format every stored audit record.
pub fn format_audits(records: &[PredictionAudit]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:<9} {:<12} {:>12} {:>8} {:>12} {:>8} {:<22}",
            "id", "pair", "target", "predicted", "pred%", "actual", "act%", "label"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<5} {:-<9} {:-<12} {:-<12} {:-<8} {:-<12} {:-<8} {:-<22}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in records {
        let actual = r.actual_rate.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into());
        let actual_pct = r.actual_change_pct.map(signed_pct).unwrap_or_else(|| "-".into());
        let label = r
            .trust_label
            .map(|l| l.display_name().to_string())
            .unwrap_or_else(|| "pending".into());
        out.push_str(
            format!(
                "{:>5} {:<9} {:<12} {:>12.4} {:>8} {:>12} {:>8} {:<22}",
                r.id,
                truncate(&r.currency_pair, 9),
                r.target_date.to_string(),
                r.predicted_rate,
                signed_pct(r.predicted_change_pct),
                actual,
                actual_pct,
                label,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScoreRow, TimelinePoint, TrustLabel};
    use chrono::NaiveDate;

    #[test]
    fn timeline_table() {
        let result = ForecastResult {
            pair: "GBP_INR".into(),
            forecast: vec![
                TimelinePoint {
                    date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                    rate: 110.0,
                    kind: PointKind::History,
                },
                TimelinePoint {
                    date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                    rate: 110.5,
                    kind: PointKind::Forecast,
                },
            ],
        };
        let txt = format_timeline(&result);
        assert!(txt.starts_with("=== fxc - GBP/INR forecast ===\n"));
        assert!(txt.contains("Points: history=1 indicative=0 forecast=1"));
        assert!(txt.contains("2025-01-03       110.0000 history\n"));
        assert!(txt.ends_with("2025-01-06       110.5000 forecast\n"));
    }

    #[test]
    fn empty_scoreboard_message() {
        let txt = format_scoreboard(&ScoreboardResult { scoreboard: vec![] }, &ResolutionSummary::default());
        assert!(txt.contains("No resolved predictions yet."));
    }

    #[test]
    fn scoreboard_rows() {
        let result = ScoreboardResult {
            scoreboard: vec![ScoreRow {
                currency: "GBP/USD".into(),
                pred: "+0.10%".into(),
                actual: "+0.50%".into(),
                label: TrustLabel::DirectionMatchedConservative,
                status: "success".into(),
            }],
        };
        let txt = format_scoreboard(&result, &ResolutionSummary { resolved: 1, skipped: 0 });
        assert!(txt.starts_with("Resolution: resolved=1 skipped=0\n"));
        assert!(txt.contains("GBP/USD     +0.10%   +0.50% Direction Matched (Conservative)   success"));
    }

    #[test]
    fn truncate_long_ids() {
        assert_eq!(truncate("ABCDEFGHIJ", 5), "ABCD.");
        assert_eq!(truncate("ABC", 5), "ABC");
    }
}
