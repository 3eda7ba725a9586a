use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::ngram::{Orientation, reverse};

/// Streaming group-by over a sorted n-gram stream, producing branch entropy
/// per prefix.
///
/// The input must be totally, byte-lexicographically sorted so that every
/// line sharing a prefix is contiguous. Only one leading character's worth
/// of prefixes is ever held in memory: the accumulator is flushed whenever
/// the leading character changes, and once more at end of stream.
///
/// Right-oriented output lines are `word\tfrequency\tentropy`; left-oriented
/// lines are `unreversed(word)\tentropy`. Frequency is orientation
/// independent, so only the right branch records it. Left keys are
/// un-reversed on emission so both branches key the same literal string.
pub struct EntropyAggregator {
    orientation: Orientation,
}

// Ordered maps, not hash maps: emission order and float summation order must
// be deterministic so re-running on identical input is byte-identical.
type SuffixCounter = BTreeMap<char, u64>;

impl EntropyAggregator {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    /// Consumes the sorted n-gram stream from `input` and writes one entropy
    /// record per observed prefix to `output`.
    pub fn aggregate<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        let mut stats: BTreeMap<String, SuffixCounter> = BTreeMap::new();
        let mut current_first: Option<char> = None;
        let mut groups = 0u64;

        for line in input.lines() {
            let line = line.context("read sorted n-gram stream")?;
            let chars: Vec<char> = line.chars().collect();
            let Some(&first) = chars.first() else {
                continue;
            };

            if current_first.is_some() && current_first != Some(first) {
                self.flush(&mut stats, &mut output)?;
                groups += 1;
            }
            current_first = Some(first);

            // Every proper non-empty prefix, with the character right after it.
            for i in 1..chars.len() {
                let prefix: String = chars[..i].iter().collect();
                *stats.entry(prefix).or_default().entry(chars[i]).or_insert(0) += 1;
            }
        }

        if !stats.is_empty() {
            self.flush(&mut stats, &mut output)?;
            groups += 1;
        }
        debug!("entropy aggregation flushed {groups} leading-char group(s)");
        Ok(())
    }

    fn flush<W: Write>(
        &self,
        stats: &mut BTreeMap<String, SuffixCounter>,
        output: &mut W,
    ) -> Result<()> {
        for (word, counter) in stats.iter() {
            let frequency: u64 = counter.values().sum();
            let entropy = branch_entropy(counter, frequency);
            match self.orientation {
                Orientation::Right => {
                    writeln!(output, "{word}\t{frequency}\t{entropy}")?;
                }
                Orientation::Left => {
                    writeln!(output, "{}\t{entropy}", reverse(word))?;
                }
            }
        }
        stats.clear();
        Ok(())
    }
}

/// Shannon entropy (log2) of the suffix-character distribution.
fn branch_entropy(counter: &SuffixCounter, frequency: u64) -> f64 {
    let mut entropy = 0.0;
    for &count in counter.values() {
        let p = count as f64 / frequency as f64;
        entropy += -p * p.log2();
    }
    entropy
}
