use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use antarvaani::config::AppConfig;
use antarvaani::core::chain::RetrievalChain;
use antarvaani::core::directory;
use antarvaani::core::embeddings::openai::OpenAiCompatEmbeddings;
use antarvaani::core::embeddings::EmbeddingProvider;
use antarvaani::core::ingestion::chunker::TextChunker;
use antarvaani::core::llm::groq::GroqProvider;
use antarvaani::core::llm::LlmProvider;
use antarvaani::core::logging;
use antarvaani::core::store::VectorStore;
use antarvaani::server::{self, AppContext, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let _log_guard = logging::init();
    log::info!("AntarVaani v{} starting", antarvaani::VERSION);

    let config = AppConfig::load();
    let state = AppState::new();

    // Resource loading happens in the background; handlers answer 503 until
    // the readiness state flips to Ready (or Failed).
    {
        let state = state.clone();
        let config = config.clone();
        tokio::spawn(async move {
            match build_context(&config).await {
                Ok(context) => {
                    log::info!("Resources loaded; service is ready");
                    state.set_ready(Arc::new(context)).await;
                }
                Err(e) => {
                    log::error!("Startup failed: {e:#}");
                    state.set_failed(format!("{e:#}")).await;
                }
            }
        });
    }

    let app = server::router(state, &config);
    let bind = config
        .server
        .bind
        .parse()
        .context("invalid bind address in config")?;
    let addr = SocketAddr::new(bind, config.port());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the shared application context: therapist directory, vector store
/// (indexing the source document on first run), and the chat providers.
async fn build_context(config: &AppConfig) -> anyhow::Result<AppContext> {
    let therapists = directory::load_therapists(&config.data.therapists_csv)?;
    let therapist_info = directory::directory_prompt_block(&therapists);

    let embedding_api_key = config
        .embedding
        .api_key_env
        .as_ref()
        .and_then(|var| std::env::var(var).ok());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiCompatEmbeddings::new(
        config.embedding.endpoint.clone(),
        config.embedding.model.clone(),
        config.embedding.dimensions,
        embedding_api_key,
    ));

    let chunker = TextChunker::new(config.indexing.chunk_size, config.indexing.chunk_overlap);
    let store = VectorStore::open_or_build(
        &config.data.store_path,
        &config.data.document_pdf,
        &chunker,
        embedder.as_ref(),
    )
    .await?;

    let llm: Arc<dyn LlmProvider> = Arc::new(GroqProvider::from_config(&config.llm)?);
    let chain = RetrievalChain::new(store, embedder, llm.clone(), config.indexing.top_k);

    Ok(AppContext {
        therapists,
        therapist_info,
        llm,
        chain,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    log::info!("Shutdown signal received");
}
