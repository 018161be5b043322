use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::optimization::analyzer::ProfileAnalyzer;
use crate::optimization::generator::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Text generation backend. Default: GenerationClient over HTTP.
    pub generator: Arc<dyn TextGenerator>,
    /// Pluggable CV analyzer. Default: KeywordProfileAnalyzer. Swap via ENABLE_LLM_PROFILE_ANALYSIS.
    pub analyzer: Arc<dyn ProfileAnalyzer>,
    /// Cancelled on shutdown; each optimization run gets a child token.
    pub shutdown: CancellationToken,
}
