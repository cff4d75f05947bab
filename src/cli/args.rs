//! Command line argument parsing for the Rocchio CLI using clap.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::expansion::RocchioConfig;

/// Rocchio - pseudo-relevance feedback query expansion with BM25 weights
#[derive(Parser, Debug, Clone)]
#[command(name = "rocchio")]
#[command(about = "Expand search queries with Rocchio pseudo-relevance feedback")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct RocchioArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl RocchioArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Expand a single query
    Expand(ExpandArgs),

    /// Serve expansions over HTTP
    Serve(ServeArgs),
}

/// Where feedback documents and term vectors come from.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Elasticsearch base URL
    #[arg(long, env = "ROCCHIO_ES_URL", conflicts_with = "docs")]
    pub es_url: Option<String>,

    /// JSON-Lines corpus to index in memory instead of Elasticsearch
    #[arg(long, value_name = "FILE")]
    pub docs: Option<PathBuf>,

    /// Basic credentials for Elasticsearch (user:password)
    #[arg(long, env = "ROCCHIO_ES_AUTH", hide_env_values = true)]
    pub auth: Option<String>,

    /// Deadline for the whole expansion in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl BackendArgs {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Rocchio parameters shared by `expand` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct ExpansionParams {
    /// Field whose term vectors are used
    #[arg(long, default_value = "_all")]
    pub field: String,

    /// Weight of the original query
    #[arg(long, default_value = "0.5")]
    pub alpha: f64,

    /// Weight of the feedback documents
    #[arg(long, default_value = "0.5")]
    pub beta: f64,

    /// BM25 term-frequency saturation
    #[arg(long, default_value = "1.2")]
    pub k1: f64,

    /// BM25 length normalisation
    #[arg(short, long, default_value = "0.75")]
    pub b: f64,

    /// Number of feedback documents
    #[arg(long, default_value = "10")]
    pub fb_docs: usize,

    /// Number of expansion terms
    #[arg(long, default_value = "10")]
    pub fb_terms: usize,

    /// Drop English stop words from the query
    #[arg(long)]
    pub stop_words: bool,

    /// Fail when the query matches no documents
    #[arg(long)]
    pub require_feedback: bool,
}

impl ExpansionParams {
    pub fn to_config(&self, timeout: Option<Duration>) -> RocchioConfig {
        let config = RocchioConfig::default()
            .with_field(self.field.clone())
            .with_alpha(self.alpha)
            .with_beta(self.beta)
            .with_bm25(self.k1, self.b)
            .with_fb_docs(self.fb_docs)
            .with_fb_terms(self.fb_terms)
            .with_stop_words(self.stop_words)
            .with_require_feedback(self.require_feedback);
        match timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

/// Arguments for expanding a query
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Query string
    #[arg(long)]
    pub query: String,

    /// Index to search
    #[arg(long)]
    pub index: String,

    #[command(flatten)]
    pub params: ExpansionParams,

    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Arguments for the REST server
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Name under which a `--docs` corpus is served
    #[arg(long, default_value = "default")]
    pub index: String,

    #[command(flatten)]
    pub params: ExpansionParams,

    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
