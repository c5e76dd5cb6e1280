use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use index_core::filter::StopwordMatch;
use index_core::persist::{IndexSink, MemorySink, SledStore};
use index_core::weight::WeightMode;
use index_core::{run, IndexerConfig, RunReport};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect a term-level inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Documents,
    Terms,
    Postings,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file under a directory
    Build {
        /// Corpus root directory
        #[arg(long)]
        input: PathBuf,
        /// Output store directory
        #[arg(long, required_unless_present = "dry_run")]
        output: Option<PathBuf>,
        /// JSON config file; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Store termfreq * idf in the tfidf column instead of idf alone
        #[arg(long, default_value_t = false)]
        tfidf: bool,
        /// Match stopwords case-insensitively
        #[arg(long, default_value_t = false)]
        lowercase_stopwords: bool,
        /// Apply NFKC compatibility folding before splitting
        #[arg(long, default_value_t = false)]
        nfkc: bool,
        /// Visit files in listing order instead of by name
        #[arg(long, default_value_t = false)]
        unsorted: bool,
        /// Minimum accepted token length
        #[arg(long)]
        min_len: Option<usize>,
        /// Build in memory and report, without writing a store
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print one table of a built store as JSON lines
    Dump {
        #[arg(long)]
        index: PathBuf,
        #[arg(long, value_enum)]
        table: Table,
    },
    /// Print the run metadata of a built store
    Stats {
        #[arg(long)]
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, config, tfidf, lowercase_stopwords, nfkc, unsorted, min_len, dry_run } => {
            let mut cfg = match config {
                Some(path) => IndexerConfig::from_json_file(&path)?,
                None => IndexerConfig::default(),
            };
            if tfidf {
                cfg.weighting = WeightMode::TfIdf;
            }
            if lowercase_stopwords {
                cfg.stopword_match = StopwordMatch::Lowercased;
            }
            cfg.nfkc |= nfkc;
            if unsorted {
                cfg.sort_paths = false;
            }
            if let Some(n) = min_len {
                cfg.min_term_len = n;
            }
            build_index(&input, output.as_deref(), &cfg, dry_run)
        }
        Commands::Dump { index, table } => dump(&index, table),
        Commands::Stats { index } => stats(&index),
    }
}

fn build_index(input: &Path, output: Option<&Path>, cfg: &IndexerConfig, dry_run: bool) -> Result<()> {
    let mut sink: Box<dyn IndexSink> = match (dry_run, output) {
        (false, Some(out)) => {
            Box::new(SledStore::open(out).with_context(|| format!("opening store at {}", out.display()))?)
        }
        _ => Box::new(MemorySink::new()),
    };
    let report = run(input, cfg, sink.as_mut()).with_context(|| format!("indexing {}", input.display()))?;
    match output.filter(|_| !dry_run) {
        Some(out) => tracing::info!(output = %out.display(), "index build complete"),
        None => tracing::info!("dry run complete, nothing written"),
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let c = report.counters;
    println!("Start Time: {}", report.started_at);
    println!("Documents {}", c.documents);
    println!("Terms {}", c.terms);
    println!("Tokens {}", c.tokens);
    println!("Stop Words Found {}", c.stopwords);
    if !report.is_clean() {
        println!("Skipped {}", report.failures.len());
        for failure in &report.failures {
            if let Ok(line) = serde_json::to_string(failure) {
                println!("  {line}");
            }
        }
    }
    println!("End Time: {}", report.finished_at);
}

fn dump(index: &Path, table: Table) -> Result<()> {
    let store = SledStore::open(index)?;
    let lines = match table {
        Table::Documents => store.documents()?.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?,
        Table::Terms => store.terms()?.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?,
        Table::Postings => store.postings()?.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?,
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn stats(index: &Path) -> Result<()> {
    let store = SledStore::open(index)?;
    let meta = store.meta()?.with_context(|| format!("no index metadata in {}", index.display()))?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}
