use std::sync::Arc;

use crate::config::Config;
use crate::export::DocumentCompiler;
use crate::render::TemplateSet;
use crate::tailoring::ScoringPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the relevance engine and its embedding cache; shared by every request.
    pub pipeline: Arc<ScoringPipeline>,
    pub templates: Arc<TemplateSet>,
    /// Pluggable PDF backend. Default: TectonicCompiler using `TECTONIC_BIN`.
    pub compiler: Arc<dyn DocumentCompiler>,
}
