//! Character-sequence similarity in the style of Ratcliff/Obershelp
//! "gestalt pattern matching": repeatedly take the longest common block,
//! recurse on both sides, and score `2 * matched / total_len`.

use std::collections::HashMap;

/// Similarity ratio in `[0, 1]`, compared case-insensitively.
pub fn similarity(a: &str, b: &str) -> f64 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}

/// Similarity ratio in `[0, 1]`, case-sensitive. Two empty strings score 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each char in `b`, popular chars removed.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        // Long sequences: chars making up more than 1% of `b` don't seed matches.
        if b.len() >= 200 {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, idxs| idxs.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` within the given bounds.
    /// Ties go to the earliest `i`, then the earliest `j`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Popular chars never seed a block, but a block may still run across them.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_and_empty() {
        assert!(close(ratio("abc", "abc"), 1.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
    }

    #[test]
    fn known_ratios() {
        // M=3 ("ab" + "d"), total 8
        assert!(close(ratio("abcd", "abxd"), 0.75));
        // "q" then "ty": 3 matched chars over 12
        assert!(close(ratio("qty.", "quantity"), 0.5));
        // no common chars
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn case_insensitive_wrapper() {
        assert!(close(similarity("Quantity", "QUANTITY"), 1.0));
        assert!(similarity("Component Qty", "component quantity") > 0.8);
    }

    #[test]
    fn near_miss_header_scores_high() {
        // one-letter typo in a long header
        let s = similarity("Unit of Measur", "Unit Of Measure");
        assert!(s > 0.9, "{s}");
    }

    #[test]
    fn symmetric_for_simple_inputs() {
        assert!(close(ratio("part number", "part no"), ratio("part no", "part number")));
    }

    // Expected values below come from Python's difflib.SequenceMatcher.

    #[test]
    fn long_repeated_text_extends_across_popular_chars() {
        let a = "hello world ".repeat(20);
        let b = format!("{}hello wurld ", "hello world ".repeat(19));
        assert_eq!(b.chars().count(), 240);
        // one block of 235 chars up to the typo
        assert!(close(ratio(&a, &b), 0.9791666666666666), "{}", ratio(&a, &b));
        assert!(close(ratio(&b, &a), 0.9791666666666666));
    }

    #[test]
    fn long_alternating_text() {
        let a = "ab".repeat(150);
        let b = format!("{}ba", "ab".repeat(149));
        assert!(close(ratio(&a, &b), 0.9933333333333333), "{}", ratio(&a, &b));
    }

    #[test]
    fn long_description_with_small_edit() {
        let a = LONG_DESCRIPTION;
        let b = LONG_DESCRIPTION.replace("grade 8.8", "grade 10.9");
        assert_eq!(a.chars().count(), 222);
        assert!(close(ratio(a, &b), 0.9887640449438202), "{}", ratio(a, &b));
    }

    #[test]
    fn long_text_with_replaced_tail() {
        let a = "stainless steel washer ".repeat(10);
        let b = format!("{}stainless steel gasket ", "stainless steel washer ".repeat(9));
        assert!(close(ratio(&a, &b), 0.9695652173913043), "{}", ratio(&a, &b));
    }

    const LONG_DESCRIPTION: &str = "hex head cap screw, zinc plated steel, grade 8.8, din 933, \
fully threaded, m8 x 20 mm, supplied in boxes of 100, for use on frame cross members and bracket \
assemblies of the main conveyor line, replace when worn or damaged";
}
