use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use engine::persist::load_index;
use engine::{PostingFormat, RetrievalMode};
use query::{corpus_size, run_queries, OutputFormat, QueryOptions};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Answer boolean or TF-IDF ranked queries against a postings index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Conjunctive (AND) retrieval; postings are bare document ids
    Boolean {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// TF-IDF ranked retrieval; postings are `documentId,termFrequency`
    Ranked {
        #[command(flatten)]
        common: CommonArgs,
        /// Declared total document count N
        #[arg(long)]
        num_docs: Option<u32>,
        /// Read N from an indexer meta.json
        #[arg(long)]
        meta: Option<PathBuf>,
        /// Use the number of distinct documents in the index as N
        #[arg(long, default_value_t = false)]
        union_corpus: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Index text file
    #[arg(long)]
    index: PathBuf,
    /// File with one query per line (default: stdin)
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Analyze query lines like indexed text (normalize, stop words, stemming)
    #[arg(long, default_value_t = false)]
    analyze: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let (common, index, mode) = match cli.command {
        Commands::Boolean { common } => {
            let index = load_index(&common.index, PostingFormat::Bare)?;
            (common, index, RetrievalMode::Boolean)
        }
        Commands::Ranked { common, num_docs, meta, union_corpus } => {
            let corpus = corpus_size(num_docs, meta.as_deref(), union_corpus)?;
            let index = load_index(&common.index, PostingFormat::WithFrequency)?;
            let num_docs = corpus.resolve(&index)?;
            tracing::info!(num_docs, ?corpus, "corpus size resolved");
            (common, index, RetrievalMode::Ranked { num_docs })
        }
    };
    let opts = QueryOptions { mode, analyze: common.analyze, format: common.format };

    let out = BufWriter::new(io::stdout().lock());
    let answered = match &common.queries {
        Some(path) => run_queries(&index, BufReader::new(File::open(path)?), out, &opts)?,
        None => run_queries(&index, io::stdin().lock(), out, &opts)?,
    };
    tracing::info!(answered, "queries answered");
    Ok(())
}
