use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::index::ExactMatchIndex;

/// Sentinel for a word whose first or last character has no prior entry.
pub const UNKNOWN_PRIOR: f64 = -1.0;

/// Threshold configuration for candidate acceptance.
///
/// Two configurations are known in practice: a permissive one
/// (`pmi ≥ 1`, `entropy ≥ 3`, `posPrior ≥ 0.1`) and a strict one
/// (`pmi ≥ 5`, `entropy ≥ 2`, no posPrior gate). The defaults here take the
/// permissive pmi/entropy pair but leave the posPrior gate off, since no
/// prior table is loaded unless one is configured; enable the gate
/// explicitly when supplying a table. All three gates are tunable rather
/// than hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct ScoreConfig {
    pub min_pmi: f64,
    pub min_entropy: f64,
    /// When set, candidates additionally require `posPrior ≥` this value.
    pub min_pos_prior: Option<f64>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_pmi: 1.0,
            min_entropy: 3.0,
            min_pos_prior: None,
        }
    }
}

/// Known words; candidates already present here are never emitted.
#[derive(Debug, Default)]
pub struct KnownWordDictionary {
    words: HashSet<String>,
}

impl KnownWordDictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a word-per-line UTF-8 file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("open known-word dictionary {}", path.display()))?;
        let mut words = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.context("read known-word dictionary")?;
            let word = line.trim();
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }
        info!("known-word dictionary loaded: {} words", words.len());
        Ok(Self { words })
    }

    pub fn from_words<I: IntoIterator<Item = S>, S: Into<String>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Per-character position priors: probability of the character occurring at
/// the start, middle, and end of a known word.
#[derive(Debug, Default)]
pub struct CharPositionPriorTable {
    priors: HashMap<char, [f64; 3]>,
}

impl CharPositionPriorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a `char\tpStart\tpMid\tpEnd` TSV file. Malformed lines are
    /// logged and skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("open position prior table {}", path.display()))?;
        let mut priors = HashMap::new();
        for line in BufReader::new(file).lines() {
            let line = line.context("read position prior table")?;
            let fields: Vec<&str> = line.split('\t').collect();
            let parsed = (|| {
                let mut chars = fields.first()?.chars();
                let c = chars.next()?;
                if chars.next().is_some() || fields.len() != 4 {
                    return None;
                }
                let start: f64 = fields[1].parse().ok()?;
                let mid: f64 = fields[2].parse().ok()?;
                let end: f64 = fields[3].parse().ok()?;
                Some((c, [start, mid, end]))
            })();
            match parsed {
                Some((c, p)) => {
                    priors.insert(c, p);
                }
                None => warn!("position prior table: malformed line skipped: {line:?}"),
            }
        }
        info!("position prior table loaded: {} characters", priors.len());
        Ok(Self { priors })
    }

    pub fn get(&self, c: char) -> Option<[f64; 3]> {
        self.priors.get(&c).copied()
    }

    /// `min(pStart(first), pEnd(last))` when both are defined, else the
    /// unknown sentinel.
    pub fn word_prior(&self, first: char, last: char) -> f64 {
        match (self.get(first), self.get(last)) {
            (Some(start), Some(end)) => start[0].min(end[2]),
            _ => UNKNOWN_PRIOR,
        }
    }
}

/// A scored, accepted candidate word.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: String,
    pub frequency: u64,
    pub pmi: f64,
    pub entropy: f64,
    pub pos_prior: f64,
}

/// Scores merged-entropy records by PMI over the best bipartition and
/// applies the acceptance gates.
pub struct WordScorer<'a, I: ExactMatchIndex> {
    index: &'a I,
    /// Number of distinct n-grams in the frequency index.
    total: u64,
    dictionary: &'a KnownWordDictionary,
    priors: &'a CharPositionPriorTable,
    config: ScoreConfig,
}

impl<'a, I: ExactMatchIndex> WordScorer<'a, I> {
    pub fn new(
        index: &'a I,
        total: u64,
        dictionary: &'a KnownWordDictionary,
        priors: &'a CharPositionPriorTable,
        config: ScoreConfig,
    ) -> Self {
        Self {
            index,
            total,
            dictionary,
            priors,
            config,
        }
    }

    /// Scores every record of the merged entropy file and writes accepted
    /// candidates as `word\tfrequency\tpmi\tentropy\tposPrior` lines.
    pub fn score_stream<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        let mut seen = 0u64;
        let mut accepted = 0u64;
        for line in input.lines() {
            let line = line.context("read merged entropy file")?;
            seen += 1;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                warn!("scorer: unexpected field count, record skipped: {line:?}");
                continue;
            }
            let (frequency, entropy) = match (fields[1].parse::<u64>(), fields[2].parse::<f64>())
            {
                (Ok(f), Ok(e)) => (f, e),
                _ => {
                    warn!("scorer: non-numeric field, record skipped: {line:?}");
                    continue;
                }
            };
            if let Some(c) = self.score_word(fields[0], frequency, entropy) {
                writeln!(
                    output,
                    "{}\t{}\t{}\t{}\t{}",
                    c.word, c.frequency, c.pmi, c.entropy, c.pos_prior
                )?;
                accepted += 1;
            }
        }
        info!("scoring done: {accepted} candidates from {seen} merged records");
        Ok(())
    }

    /// Scores one word; `None` means filtered out (not an error).
    pub fn score_word(&self, word: &str, frequency: u64, entropy: f64) -> Option<Candidate> {
        // Transliterations and numbers, e.g. residue like "abc123".
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric()) {
            debug!("scorer: ascii-only word dropped: {word}");
            return None;
        }

        let chars: Vec<char> = word.chars().collect();
        let max_product = self.best_split_product(&chars)?;

        let pf = frequency as f64 * self.total as f64 / max_product as f64;
        let pmi = pf.log2();
        if !pmi.is_finite() {
            return None;
        }

        let pos_prior = self.priors.word_prior(*chars.first()?, *chars.last()?);

        if pmi < self.config.min_pmi || entropy < self.config.min_entropy {
            return None;
        }
        if let Some(min_pp) = self.config.min_pos_prior {
            if pos_prior < min_pp {
                return None;
            }
        }
        if self.dictionary.contains(word) {
            return None;
        }

        Some(Candidate {
            word: word.to_string(),
            frequency,
            pmi,
            entropy,
            pos_prior,
        })
    }

    /// Maximum `leftFreq * rightFreq` over all bipartitions of the word.
    /// Splits where either half is absent from the index contribute nothing;
    /// `None` when no split has both halves (includes single-char words).
    fn best_split_product(&self, chars: &[char]) -> Option<u64> {
        let mut max: Option<u64> = None;
        for i in 1..chars.len() {
            let left: String = chars[..i].iter().collect();
            let right: String = chars[i..].iter().collect();
            let (Some(lf), Some(rf)) = (
                self.index.get_exact(&left),
                self.index.get_exact(&right),
            ) else {
                continue;
            };
            let product = lf * rf;
            if max.is_none_or(|m| product > m) {
                max = Some(product);
            }
        }
        max
    }
}
