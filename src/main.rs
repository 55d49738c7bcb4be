use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use policy_copilot::config::AppConfig;
use policy_copilot::llm::client::OpenAiClient;
use policy_copilot::llm::stub::{StubCompleter, StubEmbedder};
use policy_copilot::llm::{Completer, Embedder};
use policy_copilot::routes;
use policy_copilot::services::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::build()?;

    // 2. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    tracing::info!("Starting policy-copilot...");

    // 3. Initialize LLM clients. "mock" selects the deterministic stubs,
    //    useful for local runs without credentials.
    let (embedder, completer): (Arc<dyn Embedder>, Arc<dyn Completer>) =
        if config.openai.api_key == "mock" {
            tracing::warn!("openai.api_key is \"mock\", using stub embedding and completion clients");
            (Arc::new(StubEmbedder::new(256)), Arc::new(StubCompleter))
        } else {
            let client = Arc::new(OpenAiClient::new(config.openai.clone()));
            (client.clone(), client)
        };

    // 4. Initialize App State (services + retrieval snapshot slot)
    let state = AppState::new(&config, embedder, completer);

    // 5. Load or build the index before serving. A failure here is logged,
    //    not fatal: the server comes up and /ask reports the index as not
    //    ready until a successful /reindex.
    match state
        .index_service
        .load_or_build(&state.pdf_path, &state.index_dir)
        .await
    {
        Ok(built) => {
            tracing::info!(chunks = built.chunks.len(), "Retrieval index ready");
            state.install(built).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Index build/load failed; /ask will report index not ready");
        }
    }

    // 6. Setup Router
    let app = routes::create_router(state);

    // 7. Start Server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
