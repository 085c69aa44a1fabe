use std::sync::Arc;

use crate::analysis::AnalysisGenerator;
use crate::jobs::JobSearchClient;
use crate::quiz::registry::ModuleRegistry;
use crate::quiz::session::SessionStore;
use crate::retrieval::ContextRetriever;

/// Shared application state injected into all route handlers via Axum extractors.
/// Construction and lifecycle are owned by the process entry point; every
/// service receives its dependencies from here rather than lazily
/// initializing its own.
#[derive(Clone)]
pub struct AppState {
    /// Quiz modules, parsed and validated once at startup.
    pub modules: Arc<ModuleRegistry>,
    /// Session persistence seam. Default: Postgres.
    pub sessions: Arc<dyn SessionStore>,
    /// Knowledge retrieval seam. Default: Gemini embeddings + pgvector.
    pub retriever: Arc<dyn ContextRetriever>,
    /// Career analysis seam. Default: Gemini-backed generator.
    pub generator: Arc<dyn AnalysisGenerator>,
    pub jobs: JobSearchClient,
}
