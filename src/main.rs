#![forbid(unsafe_code)]
//! # word_discovery CLI
//!
//! Command-line front end for the `word_discovery` crate: runs the whole
//! discovery pipeline over one raw corpus file and prints the path of the
//! sorted candidate list.
//!
//! ## Example
//! ```bash
//! cargo run --release -- corpus.txt --max-len 6 --min-pmi 5 --min-entropy 2
//! ```
//!
//! Intermediate artifacts land next to the corpus (or in `--out-dir`); set
//! `RUST_LOG=info` to watch stage boundaries. See `--help` for all options.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;
use word_discovery::{PipelineConfig, ScoreConfig};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Raw corpus file (UTF-8 text, one record per line)
    corpus: PathBuf,

    /// Maximum candidate word length in characters
    #[arg(long, default_value_t = 6)]
    max_len: usize,

    /// External sort memory budget in bytes of buffered line data
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    memory_budget: usize,

    /// Directory for intermediate and final artifacts (default: corpus directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Extra stopword characters appended to the built-in set
    #[arg(long)]
    stopwords: Option<String>,

    /// Known-word dictionary (.txt, one word per line); listed words are never candidates
    #[arg(long)]
    dict: Option<PathBuf>,

    /// Character position prior table (tab-separated: char, pStart, pMid, pEnd)
    #[arg(long)]
    pos_prior: Option<PathBuf>,

    /// Minimum PMI for an accepted candidate
    #[arg(long, default_value_t = 1.0)]
    min_pmi: f64,

    /// Minimum branch entropy for an accepted candidate
    #[arg(long, default_value_t = 3.0)]
    min_entropy: f64,

    /// If set, also require the position prior to reach this value
    #[arg(long)]
    min_pos_prior: Option<f64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig {
        out_dir: cli.out_dir,
        max_len: cli.max_len,
        memory_budget: cli.memory_budget,
        extra_stopwords: cli.stopwords,
        dictionary: cli.dict,
        pos_priors: cli.pos_prior,
        score: ScoreConfig {
            min_pmi: cli.min_pmi,
            min_entropy: cli.min_entropy,
            min_pos_prior: cli.min_pos_prior,
        },
        ..PipelineConfig::new(cli.corpus)
    };

    match word_discovery::run(&config) {
        Ok(candidates) => {
            println!("{}", candidates.display());
        }
        Err(e) => {
            error!("Error: {e:#}");
            process::exit(1);
        }
    }
}
