#![forbid(unsafe_code)]
//! # Chinese new-word discovery
//!
//! Finds previously unlisted words in raw Chinese text by combining two
//! statistical signals over a corpus that may be larger than memory:
//!
//! - **PMI** of a word's best bipartition: how much more often the word
//!   occurs than its halves would under independence.
//! - **Branch entropy** of the characters adjacent to the word: a genuine
//!   word edge sees many different neighbors, a word fragment few.
//!
//! The pipeline is a strictly sequential batch of stages, each reading the
//! previous stage's completed artifact: sentence normalization → boundary-
//! marked n-gram emission (forward and reversed) → external sort → streaming
//! entropy aggregation → two-stream merge-join → PMI scoring → sorted
//! candidate list. Memory stays bounded throughout: the sorter spills to
//! disk and the aggregator holds one leading character's prefixes at a time.
//!
//! ## Example
//! ```no_run
//! use word_discovery::PipelineConfig;
//!
//! let config = PipelineConfig::new("corpus.txt");
//! let candidates = word_discovery::run(&config).unwrap();
//! println!("candidates at {}", candidates.display());
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

pub mod entropy;
pub mod index;
pub mod merge;
pub mod ngram;
pub mod normalize;
pub mod score;
pub mod sort;

pub use entropy::EntropyAggregator;
pub use index::{ExactMatchIndex, FrequencyIndex};
pub use merge::StreamMerger;
pub use ngram::Orientation;
pub use score::{
    Candidate, CharPositionPriorTable, KnownWordDictionary, ScoreConfig, WordScorer,
};
pub use sort::ExternalSorter;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw corpus: UTF-8 text, one record per line.
    pub corpus: PathBuf,
    /// Where intermediate and final artifacts go; defaults to the corpus
    /// directory.
    pub out_dir: Option<PathBuf>,
    /// Maximum candidate word length in characters.
    pub max_len: usize,
    /// External sorter memory budget in bytes of buffered line data.
    pub memory_budget: usize,
    /// Extra stopword characters on top of the built-in set.
    pub extra_stopwords: Option<String>,
    /// Known-word dictionary file; absent means an empty dictionary.
    pub dictionary: Option<PathBuf>,
    /// Character position prior table; absent means all priors unknown.
    pub pos_priors: Option<PathBuf>,
    /// Candidate acceptance thresholds.
    pub score: ScoreConfig,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(corpus: P) -> Self {
        Self {
            corpus: corpus.into(),
            out_dir: None,
            max_len: 6,
            memory_budget: 64 * 1024 * 1024,
            extra_stopwords: None,
            dictionary: None,
            pos_priors: None,
            score: ScoreConfig::default(),
        }
    }
}

/// Runs the full pipeline and returns the path of the sorted candidate file.
///
/// Stages run strictly in sequence; every artifact is flushed before the
/// next stage opens it. A failing stage aborts the run with the stage name
/// and path in the error chain; re-running after fixing the cause re-derives
/// everything from the corpus.
pub fn run(config: &PipelineConfig) -> Result<PathBuf> {
    let out_dir = output_dir(config)?;
    let sorter = ExternalSorter::new(config.memory_budget);
    let artifact = |name: &str| out_dir.join(name);

    // Per-orientation: normalize + emit, sort, aggregate, sort.
    let right_sorted = entropy_branch(config, &sorter, &out_dir, Orientation::Right)?;
    let left_sorted = entropy_branch(config, &sorter, &out_dir, Orientation::Left)?;

    // Re-sort both entropy files as one stream so records for the same word
    // become adjacent, then merge-join them.
    info!("merge: combining left and right entropy files");
    let combined_sorted = artifact("entropy_combined_sorted.txt");
    let chained = open(&right_sorted, "merge")?.chain(open(&left_sorted, "merge")?);
    sorter
        .sort(chained, create(&combined_sorted, "merge")?)
        .context("merge: sort combined entropy stream")?;

    let merged = artifact("entropy_merged.txt");
    {
        let mut out = BufWriter::new(create(&merged, "merge")?);
        StreamMerger::merge(BufReader::new(open(&combined_sorted, "merge")?), &mut out)
            .context("merge: join left/right entropy records")?;
        out.flush().context("merge: flush merged entropy file")?;
    }

    // Exact-match frequency index over the pre-merge right-oriented counts.
    info!("score: building frequency index");
    let (index, total) = FrequencyIndex::load(BufReader::new(open(&right_sorted, "score")?))
        .context("score: build frequency index")?;

    let dictionary = match &config.dictionary {
        Some(path) => KnownWordDictionary::load(path)?,
        None => KnownWordDictionary::empty(),
    };
    let priors = match &config.pos_priors {
        Some(path) => CharPositionPriorTable::load(path)?,
        None => CharPositionPriorTable::empty(),
    };

    info!("score: extracting candidate words");
    let candidates = artifact("candidates.txt");
    {
        let scorer = WordScorer::new(&index, total, &dictionary, &priors, config.score);
        let mut out = BufWriter::new(create(&candidates, "score")?);
        scorer
            .score_stream(BufReader::new(open(&merged, "score")?), &mut out)
            .context("score: score merged entropy records")?;
        out.flush().context("score: flush candidate file")?;
    }

    // Final sort is only for a deterministic, reproducible artifact.
    let candidates_sorted = artifact("candidates_sorted.txt");
    sorter
        .sort(
            open(&candidates, "score")?,
            create(&candidates_sorted, "score")?,
        )
        .context("score: sort candidate file")?;

    info!("pipeline done: {}", candidates_sorted.display());
    Ok(candidates_sorted)
}

/// One orientation's half of the pipeline: emit n-grams from the normalized
/// corpus, sort them, aggregate branch entropy, sort the entropy records.
/// Returns the sorted entropy file path.
fn entropy_branch(
    config: &PipelineConfig,
    sorter: &ExternalSorter,
    out_dir: &Path,
    orientation: Orientation,
) -> Result<PathBuf> {
    let stage = match orientation {
        Orientation::Right => "right branch",
        Orientation::Left => "left branch",
    };
    let side = match orientation {
        Orientation::Right => "right",
        Orientation::Left => "left",
    };
    let ngram_file = out_dir.join(format!("ngram_{side}.txt"));
    let ngram_sorted = out_dir.join(format!("ngram_{side}_sorted.txt"));
    let entropy_file = out_dir.join(format!("entropy_{side}.txt"));
    let entropy_sorted = out_dir.join(format!("entropy_{side}_sorted.txt"));

    info!("{stage}: emitting n-grams from {}", config.corpus.display());
    let stopwords = normalize::stopword_set(config.extra_stopwords.as_deref());
    {
        let reader = BufReader::new(open(&config.corpus, stage)?);
        let mut writer = BufWriter::new(create(&ngram_file, stage)?);
        for line in reader.lines() {
            let line = line.with_context(|| format!("{stage}: read corpus"))?;
            for run in normalize::clean_runs(&line, &stopwords) {
                ngram::write_run(&mut writer, &run, config.max_len, orientation)
                    .with_context(|| format!("{stage}: write n-gram stream"))?;
            }
        }
        writer
            .flush()
            .with_context(|| format!("{stage}: flush n-gram stream"))?;
    }

    info!("{stage}: sorting n-gram stream");
    sorter
        .sort(open(&ngram_file, stage)?, create(&ngram_sorted, stage)?)
        .with_context(|| format!("{stage}: sort n-gram stream"))?;

    info!("{stage}: aggregating branch entropy");
    {
        let mut writer = BufWriter::new(create(&entropy_file, stage)?);
        EntropyAggregator::new(orientation)
            .aggregate(BufReader::new(open(&ngram_sorted, stage)?), &mut writer)
            .with_context(|| format!("{stage}: aggregate entropy"))?;
        writer
            .flush()
            .with_context(|| format!("{stage}: flush entropy file"))?;
    }

    info!("{stage}: sorting entropy records");
    sorter
        .sort(
            open(&entropy_file, stage)?,
            create(&entropy_sorted, stage)?,
        )
        .with_context(|| format!("{stage}: sort entropy file"))?;

    Ok(entropy_sorted)
}

fn output_dir(config: &PipelineConfig) -> Result<PathBuf> {
    let dir = match &config.out_dir {
        Some(dir) => dir.clone(),
        None => config
            .corpus
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("create output directory {}", dir.display()))?;
    Ok(dir)
}

fn open(path: &Path, stage: &str) -> Result<File> {
    File::open(path).with_context(|| format!("{stage}: open {}", path.display()))
}

fn create(path: &Path, stage: &str) -> Result<File> {
    File::create(path).with_context(|| format!("{stage}: create {}", path.display()))
}
