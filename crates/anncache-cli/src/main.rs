//! anncache - incrementally populate per-document analysis caches.
//!
//! Samples documents in a set that lack a cached result for the given
//! pipeline, runs them through the analysis service, and repeats until the
//! store reports nothing left to do.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use anncache_common::logging::{init_logging, LogConfig, LogLevel};
use anncache_common::{Fingerprint, PipelineSpec};
use anncache_engine::pipeline::HttpPipeline;
use anncache_engine::runner::{CacheRun, RunConfig, RunTarget, DEFAULT_BATCH_SIZE};
use anncache_engine::store::EsStore;

#[derive(Parser, Debug)]
#[command(name = "anncache")]
#[command(author, version, about = "Populate cached analysis results for documents in a set")]
struct Cli {
    /// Document store host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Document store port
    #[arg(long, default_value_t = 9200)]
    port: u16,

    /// Full document store URL; overrides host/port when set
    #[arg(long, env = "ANNCACHE_ES_URL")]
    es_url: Option<String>,

    /// Index holding the parent documents
    #[arg(long, default_value = "amcat")]
    index: String,

    /// Parent document type
    #[arg(long, default_value = "article")]
    parent_doctype: String,

    /// Document field handed to the pipeline
    #[arg(long, default_value = "text")]
    field: String,

    /// Analysis service URL
    #[arg(long, env = "ANNCACHE_PIPELINE_URL", default_value = "http://localhost:5000")]
    pipeline_url: String,

    /// Items sampled per batch
    #[arg(short = 'n', long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Concurrent pipeline workers per batch
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Stop after the first batch
    #[arg(long)]
    norepeat: bool,

    /// Interpret SET as a single item id instead of a set id
    #[arg(long)]
    single: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Set to process (item id with --single)
    set: i64,

    /// Ordered pipeline module identifiers
    #[arg(required = true)]
    modules: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let spec = PipelineSpec::new(cli.modules.clone())?;
    let fingerprint = Fingerprint::derive(&cli.parent_doctype, &spec);

    let store_url = cli
        .es_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", cli.host, cli.port));

    info!(%fingerprint, store = %store_url, modules = %spec, "starting cache run");

    let store = Arc::new(EsStore::new(
        store_url,
        cli.index.clone(),
        cli.parent_doctype.clone(),
    )?);
    let pipeline = Arc::new(HttpPipeline::new(cli.pipeline_url.clone(), spec)?);

    let target = if cli.single {
        RunTarget::SingleItem(cli.set)
    } else {
        RunTarget::Set(cli.set)
    };

    let config = RunConfig {
        index: cli.index,
        parent_type: cli.parent_doctype,
        field: cli.field,
        target,
        batch_size: cli.batch_size,
        concurrency: cli.concurrency,
        no_repeat: cli.norepeat,
    };

    let stats = CacheRun::new(store, pipeline, fingerprint, config)
        .run()
        .await?;

    info!(
        batches = stats.batches,
        processed = stats.processed,
        failed = stats.failed,
        "done"
    );
    Ok(())
}
