use crate::model::{LinePair, ReconRow, ReconStatus};
use crate::validate::validate_description;

/// Classify a signed quantity difference against a relative tolerance band.
///
/// The band is `max(reference, comparison) * tolerance` when that max is
/// positive; otherwise the two quantities must be exactly equal.
pub fn classify_quantity(reference: f64, comparison: f64, tolerance: f64) -> ReconStatus {
    let difference = reference - comparison;
    let max = reference.max(comparison);

    let within = if max > 0.0 {
        difference.abs() <= max * tolerance
    } else {
        reference == comparison
    };

    if within {
        ReconStatus::Correct
    } else if difference > 0.0 {
        ReconStatus::Shortage
    } else {
        ReconStatus::Surplus
    }
}

/// Human-readable issue text for a classified key.
pub fn issue_text(status: ReconStatus, difference: f64, comparison_label: &str) -> String {
    match status {
        ReconStatus::Correct => "OK".to_string(),
        ReconStatus::Shortage => {
            format!("Missing {} in {comparison_label}", format_general(difference))
        }
        ReconStatus::Surplus => {
            format!("Excess {} in {comparison_label}", format_general(difference.abs()))
        }
    }
}

/// Compact number formatting: six significant digits, no trailing zeros,
/// scientific notation only for very small or very large magnitudes.
pub fn format_general(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if v == 0.0 {
        return "0".into();
    }

    const PRECISION: i32 = 6;

    // Exponent after rounding to PRECISION significant digits.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Turn paired lines into reconciliation rows.
///
/// An absent side contributes quantity 0 to the decision, but its row fields stay `None`.
pub fn build_rows(
    pairs: &[LinePair],
    comparison_label: &str,
    tolerance: f64,
    description_threshold: f64,
) -> Vec<ReconRow> {
    pairs
        .iter()
        .map(|pair| {
            let reference_qty = pair.reference.as_ref().map_or(0.0, |g| g.quantity);
            let comparison_qty = pair.comparison.as_ref().map_or(0.0, |g| g.quantity);
            let status = classify_quantity(reference_qty, comparison_qty, tolerance);

            let reference_description = pair.reference.as_ref().and_then(|g| g.description.clone());
            let comparison_description = pair.comparison.as_ref().and_then(|g| g.description.clone());
            let descriptions_agree = match (&pair.reference, &pair.comparison) {
                (Some(_), Some(_)) => Some(validate_description(
                    reference_description.as_deref(),
                    comparison_description.as_deref(),
                    description_threshold,
                )),
                _ => None,
            };

            ReconRow {
                part_number: pair.key.part_number.clone(),
                unit: pair.key.unit.clone(),
                status,
                issue: issue_text(status, reference_qty - comparison_qty, comparison_label),
                reference_quantity: pair.reference.as_ref().map(|g| g.quantity),
                comparison_quantity: pair.comparison.as_ref().map(|g| g.quantity),
                reference_unit: pair.reference.as_ref().map(|g| g.unit.clone()),
                comparison_unit: pair.comparison.as_ref().map(|g| g.unit.clone()),
                reference_description,
                comparison_description,
                descriptions_agree,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupedLine, LineKey};

    fn grouped(part: &str, qty: f64, desc: Option<&str>) -> GroupedLine {
        GroupedLine {
            part_number: part.into(),
            unit: "PCS".into(),
            quantity: qty,
            description: desc.map(String::from),
            row_count: 1,
        }
    }

    fn pair(part: &str, reference: Option<GroupedLine>, comparison: Option<GroupedLine>) -> LinePair {
        LinePair {
            key: LineKey {
                part_number: part.into(),
                unit: "PCS".into(),
            },
            reference,
            comparison,
        }
    }

    #[test]
    fn classify_band() {
        assert_eq!(classify_quantity(10.0, 10.0, 0.01), ReconStatus::Correct);
        assert_eq!(classify_quantity(100.0, 99.0, 0.01), ReconStatus::Correct);
        assert_eq!(classify_quantity(100.0, 95.0, 0.01), ReconStatus::Shortage);
        assert_eq!(classify_quantity(0.0, 3.0, 0.01), ReconStatus::Surplus);
        assert_eq!(classify_quantity(0.0, 0.0, 0.0), ReconStatus::Correct);
        assert_eq!(classify_quantity(-2.0, -2.0, 0.0), ReconStatus::Correct);
        assert_eq!(classify_quantity(-2.0, -1.0, 0.5), ReconStatus::Surplus);
    }

    #[test]
    fn general_format() {
        assert_eq!(format_general(5.0), "5");
        assert_eq!(format_general(2.5), "2.5");
        assert_eq!(format_general(0.1 + 0.2), "0.3");
        assert_eq!(format_general(123456.0), "123456");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(-3.25), "-3.25");
        assert_eq!(format_general(999999.5), "1e+06");
        assert_eq!(format_general(0.0), "0");
    }

    #[test]
    fn issue_texts() {
        assert_eq!(issue_text(ReconStatus::Correct, 0.0, "HPLM"), "OK");
        assert_eq!(issue_text(ReconStatus::Shortage, 5.0, "HPLM"), "Missing 5 in HPLM");
        assert_eq!(issue_text(ReconStatus::Surplus, -3.0, "PLM"), "Excess 3 in PLM");
    }

    #[test]
    fn rows_keep_absent_sides_null() {
        let pairs = vec![
            pair("P3", None, Some(grouped("P3", 3.0, Some("Nut")))),
            pair("P5", Some(grouped("P5", 0.0, None)), None),
        ];
        let rows = build_rows(&pairs, "HPLM", 0.01, 0.8);

        assert_eq!(rows[0].status, ReconStatus::Surplus);
        assert_eq!(rows[0].issue, "Excess 3 in HPLM");
        assert_eq!(rows[0].reference_quantity, None);
        assert_eq!(rows[0].comparison_quantity, Some(3.0));
        assert_eq!(rows[0].reference_unit, None);
        assert_eq!(rows[0].comparison_unit.as_deref(), Some("PCS"));
        assert_eq!(rows[0].descriptions_agree, None);

        // present with zero vs absent: both 0 for the decision
        assert_eq!(rows[1].status, ReconStatus::Correct);
        assert_eq!(rows[1].reference_quantity, Some(0.0));
        assert_eq!(rows[1].comparison_quantity, None);
    }

    #[test]
    fn descriptions_are_informational() {
        let pairs = vec![pair(
            "P1",
            Some(grouped("P1", 10.0, Some("Hex bolt"))),
            Some(grouped("P1", 10.0, Some("Washer"))),
        )];
        let rows = build_rows(&pairs, "HPLM", 0.01, 0.8);
        assert_eq!(rows[0].status, ReconStatus::Correct);
        assert_eq!(rows[0].descriptions_agree, Some(false));
    }
}
