use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::warn;

/// Reconciles left- and right-entropy records into one branch-entropy record
/// per word.
///
/// Input is the concatenation of the left and right entropy files, re-sorted
/// as a single stream, so the two records for a word are adjacent, though in
/// no guaranteed relative order. Field count tells them apart: left records
/// are `word\tentropy`, right records are `word\tfrequency\tentropy`.
///
/// A word observed in only one orientation is an orphan: the window advances
/// past it and nothing is emitted. This loses words that only ever appear at
/// one sentence edge; a known, documented limitation, kept deliberately.
pub struct StreamMerger;

impl StreamMerger {
    /// Merges the combined sorted entropy stream, writing
    /// `word\tfrequency\tmin(leftEntropy, rightEntropy)` per matched pair.
    pub fn merge<R: BufRead, W: Write>(input: R, mut output: W) -> Result<()> {
        let mut lines = input.lines();
        let mut next = move || -> Result<Option<String>> {
            lines
                .next()
                .transpose()
                .context("read combined entropy stream")
        };

        // Two-line lookahead window.
        let mut line1 = next()?;
        let mut line2 = next()?;

        while let (Some(l1), Some(l2)) = (&line1, &line2) {
            let seg1: Vec<&str> = l1.split('\t').collect();
            let seg2: Vec<&str> = l2.split('\t').collect();

            if seg1[0] != seg2[0] {
                // Orphan in l1: present in one orientation only.
                line1 = line2;
                line2 = next()?;
                continue;
            }

            if seg1.len() < 2 {
                warn!("merge: record with no value fields skipped: {l1:?}");
                line1 = line2;
                line2 = next()?;
                continue;
            }

            // The matched pair is consumed whether or not it produces output.
            match merge_pair(&seg1, &seg2) {
                Some((word, frequency, entropy)) => {
                    line1 = next()?;
                    line2 = next()?;
                    writeln!(output, "{word}\t{frequency}\t{entropy}")?;
                }
                None => {
                    warn!("merge: unusable record pair skipped: {l1:?} / {l2:?}");
                    line1 = next()?;
                    line2 = next()?;
                }
            }
        }
        Ok(())
    }
}

/// Classifies a matched pair by field count and extracts the merged record.
/// Returns `None` when the pair is not one 2-field and one 3-field record,
/// or when a numeric field fails to parse.
fn merge_pair(seg1: &[&str], seg2: &[&str]) -> Option<(String, u64, f64)> {
    let (left, right) = match (seg1.len(), seg2.len()) {
        (2, 3) => (seg1, seg2),
        (3, 2) => (seg2, seg1),
        // Both look like left records. Should not occur on well-formed
        // input; repeated hits in the log point at an upstream problem.
        _ => return None,
    };

    let left_entropy: f64 = left[1].parse().ok()?;
    let frequency: u64 = right[1].parse().ok()?;
    let right_entropy: f64 = right[2].parse().ok()?;

    let entropy = left_entropy.min(right_entropy);
    Some((left[0].to_string(), frequency, entropy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(lines: &[&str]) -> Vec<String> {
        let input = lines.join("\n") + "\n";
        let mut out = Vec::new();
        StreamMerger::merge(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn merges_matched_pair_left_first() {
        let got = merge(&["北京\t1.5", "北京\t7\t2.5"]);
        assert_eq!(got, vec!["北京\t7\t1.5"]);
    }

    #[test]
    fn merges_matched_pair_right_first() {
        // Same pair, roles swapped between the two lookahead slots.
        let got = merge(&["北京\t7\t2.5", "北京\t1.5"]);
        assert_eq!(got, vec!["北京\t7\t1.5"]);
    }

    #[test]
    fn takes_minimum_entropy() {
        let got = merge(&["天安门\t3.25", "天安门\t4\t0.75"]);
        assert_eq!(got, vec!["天安门\t4\t0.75"]);
    }

    #[test]
    fn orphans_are_dropped() {
        let got = merge(&[
            "一\t0.5",
            "北京\t1.5",
            "北京\t7\t2.5",
            "天安门\t9\t3.5",
        ]);
        assert_eq!(got, vec!["北京\t7\t1.5"]);
    }

    #[test]
    fn guard_pair_of_left_records_emits_nothing() {
        // Two 2-field records for one word: guard branch, pair consumed,
        // following words still merge.
        let got = merge(&["北京\t1.5", "北京\t2.5", "门\t0.5", "门\t3\t1.0"]);
        assert_eq!(got, vec!["门\t3\t0.5"]);
    }

    #[test]
    fn malformed_numeric_field_is_skipped() {
        let got = merge(&["北京\tbad", "北京\t7\t2.5", "门\t0.5", "门\t3\t1.0"]);
        assert_eq!(got, vec!["门\t3\t0.5"]);
    }

    #[test]
    fn empty_and_single_line_streams() {
        assert!(merge(&[]).is_empty());
        assert!(merge(&["北京\t7\t2.5"]).is_empty());
    }
}
