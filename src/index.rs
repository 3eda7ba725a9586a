use std::collections::HashMap;
use std::io::BufRead;

use anyhow::{Context, Result};
use log::{info, warn};

/// Exact-key lookup from substring to occurrence count.
///
/// Only point lookups are needed; no prefix or range scans. Kept behind a
/// trait so the hash-map implementation can be swapped (e.g. for a trie, or
/// a structure tuned for concurrent reads) without touching the scorer.
pub trait ExactMatchIndex {
    fn put(&mut self, key: String, value: u64);
    fn get_exact(&self, key: &str) -> Option<u64>;
}

/// Hash-map backed [`ExactMatchIndex`]; immutable after construction by
/// convention (the pipeline never writes to it past the build stage).
#[derive(Debug, Default)]
pub struct FrequencyIndex {
    map: HashMap<String, u64>,
}

impl ExactMatchIndex for FrequencyIndex {
    fn put(&mut self, key: String, value: u64) {
        self.map.insert(key, value);
    }

    fn get_exact(&self, key: &str) -> Option<u64> {
        self.map.get(key).copied()
    }
}

impl FrequencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from the sorted right-entropy file
    /// (`word\tfrequency\tentropy` per line) and returns it together with
    /// `total`, the number of distinct n-grams loaded (the corpus-size term
    /// of the PMI formula). Malformed lines are logged and skipped.
    pub fn load<R: BufRead>(input: R) -> Result<(Self, u64)> {
        let mut index = Self::new();
        let mut total = 0u64;
        for line in input.lines() {
            let line = line.context("read right entropy file")?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                warn!("frequency index: short record skipped: {line:?}");
                continue;
            }
            let frequency: u64 = match fields[1].parse() {
                Ok(f) => f,
                Err(_) => {
                    warn!("frequency index: non-numeric frequency skipped: {line:?}");
                    continue;
                }
            };
            index.put(fields[0].to_string(), frequency);
            total += 1;
        }
        info!("frequency index loaded: {total} n-grams");
        Ok((index, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_looks_up_exact_keys() {
        let input = "北\t5\t1.2\n北京\t5\t2.32\n天安门\t4\t2.0\n";
        let (index, total) = FrequencyIndex::load(input.as_bytes()).unwrap();
        assert_eq!(total, 3);
        assert_eq!(index.get_exact("北京"), Some(5));
        assert_eq!(index.get_exact("天安门"), Some(4));
        // Exact match only: a prefix of a stored key is not a hit.
        assert_eq!(index.get_exact("天安"), None);
        assert_eq!(index.get_exact("京"), None);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let input = "北京\t5\t2.32\nbroken\n天\tNaN-ish\t1.0\n门\t2\t0.5\n";
        let (index, total) = FrequencyIndex::load(input.as_bytes()).unwrap();
        assert_eq!(total, 2);
        assert_eq!(index.get_exact("北京"), Some(5));
        assert_eq!(index.get_exact("门"), Some(2));
        assert_eq!(index.get_exact("天"), None);
    }
}
