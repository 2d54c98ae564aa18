use std::collections::{BTreeSet, HashMap};

use crate::model::{GroupedLine, LineKey, LinePair};

/// Pair grouped lines of both sides by exact (part number, unit).
///
/// Every key of either side appears exactly once, sorted by part number then unit.
pub fn pair_lines(reference: &[GroupedLine], comparison: &[GroupedLine]) -> Vec<LinePair> {
    let reference_map: HashMap<LineKey, &GroupedLine> =
        reference.iter().map(|g| (g.key(), g)).collect();
    let comparison_map: HashMap<LineKey, &GroupedLine> =
        comparison.iter().map(|g| (g.key(), g)).collect();

    let keys: BTreeSet<&LineKey> = reference_map.keys().chain(comparison_map.keys()).collect();

    keys.into_iter()
        .map(|key| LinePair {
            key: key.clone(),
            reference: reference_map.get(key).map(|g| (*g).clone()),
            comparison: comparison_map.get(key).map(|g| (*g).clone()),
        })
        .collect()
}
