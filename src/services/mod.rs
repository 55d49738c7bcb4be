use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::index::{ChunkMeta, FlatL2Index};
use crate::llm::{Completer, Embedder};
use crate::services::answer::AnswerService;
use crate::services::index::IndexService;
use crate::services::retrieval::RetrievalService;

pub mod answer;
pub mod index;
pub mod retrieval;

/// One search result, rank 1 = closest
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub rank: u32,
    pub page: u32,
    pub text: String,
}

/// Immutable snapshot of a built index and its chunk metadata.
///
/// The two halves are only ever created, persisted, loaded, and swapped as
/// a pair; `index.len() == chunks.len()` holds for every snapshot.
pub struct RetrievalState {
    pub index: FlatL2Index,
    pub chunks: Vec<ChunkMeta>,
}

// A container for all services to be injected into routes
#[derive(Clone)]
pub struct AppState {
    pub index_service: Arc<IndexService>,
    pub retrieval_service: Arc<RetrievalService>,
    pub answer_service: Arc<AnswerService>,
    /// Resolved source document path (resolution happens in main, not here)
    pub pdf_path: Arc<PathBuf>,
    pub index_dir: Arc<PathBuf>,
    retrieval: Arc<RwLock<Option<Arc<RetrievalState>>>>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
    ) -> Self {
        Self {
            index_service: Arc::new(IndexService::new(
                embedder.clone(),
                config.document.chunk_size,
                config.document.chunk_overlap,
            )),
            retrieval_service: Arc::new(RetrievalService::new(embedder, config.document.top_k)),
            answer_service: Arc::new(AnswerService::new(completer)),
            pdf_path: Arc::new(PathBuf::from(&config.document.pdf_path)),
            index_dir: Arc::new(PathBuf::from(&config.document.index_dir)),
            retrieval: Arc::new(RwLock::new(None)),
        }
    }

    /// Current retrieval snapshot, if an index has been loaded or built.
    /// Queries hold the returned Arc and are unaffected by a concurrent swap.
    pub async fn snapshot(&self) -> Option<Arc<RetrievalState>> {
        self.retrieval.read().await.clone()
    }

    /// Replace the retrieval snapshot wholesale. In-flight queries keep the
    /// snapshot they already cloned; nothing can observe a torn pair.
    pub async fn install(&self, state: RetrievalState) {
        *self.retrieval.write().await = Some(Arc::new(state));
    }
}
