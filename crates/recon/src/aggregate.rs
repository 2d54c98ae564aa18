use std::collections::BTreeMap;

use crate::config::UnitSynonyms;
use crate::model::{GroupedLine, LineKey, StandardLine};
use crate::units::normalize_unit;

/// Group lines by (part number, normalized unit), sum quantities, keep the
/// first non-blank description.
///
/// Non-numeric and missing quantities count as 0. Lines with a blank part
/// number are skipped. Output is ordered by key.
pub fn group_lines(lines: &[StandardLine], units: &[UnitSynonyms]) -> Vec<GroupedLine> {
    let mut groups: BTreeMap<LineKey, (f64, Option<String>, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for line in lines {
        let Some(part_number) = line.part_number.as_text() else {
            skipped += 1;
            continue;
        };
        let key = LineKey {
            part_number,
            unit: normalize_unit(&line.unit, units),
        };

        let entry = groups.entry(key).or_insert((0.0, None, 0));
        entry.0 += line.quantity.to_quantity();
        if entry.1.is_none() {
            entry.1 = line.description.as_text();
        }
        entry.2 += 1;
    }

    if skipped > 0 {
        let source = lines.first().map(|l| l.source.as_str()).unwrap_or_default();
        log::debug!("{source}: skipped {skipped} rows with a blank part number");
    }

    groups
        .into_iter()
        .map(|(key, (quantity, description, row_count))| GroupedLine {
            part_number: key.part_number,
            unit: key.unit,
            quantity,
            description,
            row_count,
        })
        .collect()
}
