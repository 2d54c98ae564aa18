use crate::model::{ReconRow, ReconStatus, StatusReport};

/// Count rows per status and derive percentages (two decimals, 0 when there are no rows).
pub fn summarize(rows: &[ReconRow]) -> StatusReport {
    let mut correct = 0;
    let mut shortage = 0;
    let mut surplus = 0;

    for r in rows {
        match r.status {
            ReconStatus::Correct => correct += 1,
            ReconStatus::Shortage => shortage += 1,
            ReconStatus::Surplus => surplus += 1,
        }
    }

    let total = rows.len();
    let total_with_issues = shortage + surplus;

    StatusReport {
        total,
        correct,
        shortage,
        surplus,
        total_with_issues,
        correct_pct: percent(correct, total),
        issues_pct: percent(total_with_issues, total),
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
