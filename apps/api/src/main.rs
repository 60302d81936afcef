mod config;
mod errors;
mod export;
mod models;
mod relevance;
mod render;
mod routes;
mod state;
mod tailoring;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::export::TectonicCompiler;
use crate::relevance::{CachePolicy, Embedder, HashingEmbedder, HttpEmbedder, RelevanceEngine};
use crate::render::TemplateSet;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::{ScoringPipeline, ScoringWeights};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding backend
    let embedder = build_embedder(&config)?;

    let policy = CachePolicy::from_capacity(config.embedding_cache_capacity);
    info!("Embedding cache policy: {:?}", policy);
    let engine = Arc::new(RelevanceEngine::new(embedder, policy));

    let weights = ScoringWeights::new(config.similarity_weight, config.impressiveness_weight)?;
    info!(
        "Scoring weights: similarity={} impressiveness={}",
        weights.similarity, weights.impressiveness
    );
    let pipeline = Arc::new(ScoringPipeline::new(engine, weights));

    // Templates: built-ins, optionally overridden from TEMPLATE_DIR
    let templates = Arc::new(TemplateSet::load(config.template_dir.as_deref())?);

    let compiler = Arc::new(TectonicCompiler::new(config.tectonic_bin.clone()));
    info!("Document compiler: {}", config.tectonic_bin);

    // Build app state
    let state = AppState {
        config: config.clone(),
        pipeline,
        templates,
        compiler,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the configured embedding backend.
fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    Ok(match config.embedding_backend {
        EmbeddingBackend::Http => {
            let embedder = HttpEmbedder::new(
                &config.embedding_url,
                config.embedding_model.clone(),
                config.embedding_api_key.clone(),
            )?;
            info!(
                "Embedding backend: {} (model: {})",
                embedder.endpoint(),
                config.embedding_model
            );
            Arc::new(embedder)
        }
        EmbeddingBackend::Hashing => {
            info!("Embedding backend: feature hashing (offline)");
            Arc::new(HashingEmbedder::default())
        }
    })
}
