//! Command implementations for the Rocchio CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::analysis::analyzer::StandardAnalyzer;
use crate::backend::{
    ElasticsearchBackend, ElasticsearchConfig, MemoryBackend, MemoryIndex, SearchBackend,
    TermVectorSource,
};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, RocchioError};
use crate::expansion::RocchioExpander;
use crate::server::{self, AppState};

/// Search and term-vector collaborators selected on the command line.
pub struct Backends {
    pub search: Arc<dyn SearchBackend>,
    pub term_vectors: Arc<dyn TermVectorSource>,
}

impl Backends {
    fn shared<B>(backend: B) -> Self
    where
        B: SearchBackend + TermVectorSource + 'static,
    {
        let backend = Arc::new(backend);
        Backends {
            search: backend.clone(),
            term_vectors: backend,
        }
    }
}

/// Execute a CLI command.
pub async fn execute_command(args: RocchioArgs) -> Result<()> {
    match &args.command {
        Command::Expand(expand_args) => expand_query(expand_args.clone(), &args).await,
        Command::Serve(serve_args) => serve(serve_args.clone()).await,
    }
}

/// Build the collaborators named by `backend`. A `--docs` corpus is
/// registered under `index`.
pub fn build_backends(backend: &BackendArgs, index: &str) -> Result<Backends> {
    match (&backend.es_url, &backend.docs) {
        (Some(url), _) => {
            let mut config = ElasticsearchConfig::new(url.clone());
            if let Some(auth) = &backend.auth {
                config = config.with_auth(auth.clone());
            }
            if let Some(timeout) = backend.timeout() {
                config = config.with_timeout(timeout);
            }
            info!("Using Elasticsearch at {url}");
            Ok(Backends::shared(ElasticsearchBackend::new(config)?))
        }
        (None, Some(path)) => Ok(Backends::shared(load_corpus(path, index)?)),
        (None, None) => Err(RocchioError::invalid_config(
            "either --es-url or --docs must be given",
        )),
    }
}

fn load_corpus(path: &Path, index: &str) -> Result<MemoryBackend> {
    let start_time = Instant::now();
    let corpus = MemoryIndex::from_jsonl_file(path, Arc::new(StandardAnalyzer::new()))?;
    info!(
        "Indexed {} documents from {} into '{index}' in {}ms",
        corpus.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(MemoryBackend::new().with_index(index, corpus))
}

/// Expand one query and print the result.
async fn expand_query(args: ExpandArgs, cli_args: &RocchioArgs) -> Result<()> {
    let config = args.params.to_config(args.backend.timeout());
    config.validate()?;

    let backends = build_backends(&args.backend, &args.index)?;
    let expander = RocchioExpander::new(backends.search, backends.term_vectors, config)?;

    let start_time = Instant::now();
    let expansion = expander.expand_detailed(&args.index, &args.query).await?;
    let duration = start_time.elapsed();

    output_result(
        "Query expanded successfully",
        &ExpansionResult::new(
            &args.index,
            &args.query,
            &expansion,
            duration.as_millis() as u64,
        ),
        cli_args,
    )
}

/// Run the REST host until interrupted.
async fn serve(args: ServeArgs) -> Result<()> {
    let defaults = args.params.to_config(args.backend.timeout());
    defaults.validate()?;

    let backends = build_backends(&args.backend, &args.index)?;
    let state = Arc::new(AppState::new(
        backends.search,
        backends.term_vectors,
        defaults,
    ));
    server::serve(args.bind, state).await
}
