//! Index build, persistence, and search
//!
//! Owns the mapping between the two on-disk artifacts (binary vector blob
//! + JSON chunk metadata) and the in-memory `RetrievalState`. The build
//! path is: extract pages, chunk page-major, embed, index, persist both
//! artifacts. `load_or_build` is the sole entry point consumers use on
//! startup: a persisted index is authoritative unless absent.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::chunker;
use crate::errors::AppError;
use crate::index::{ChunkMeta, FlatL2Index};
use crate::llm::Embedder;
use crate::pdf::{self, Page};
use crate::services::{Hit, RetrievalState};

/// Persisted index blob, co-located with the metadata file
pub const INDEX_FILE: &str = "index.bin";
/// Persisted chunk metadata, order-aligned with the index
pub const META_FILE: &str = "index_meta.json";

pub struct IndexService {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl IndexService {
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            embedder,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Build the index from scratch and persist both artifacts.
    ///
    /// Fails with `EmptyDocument` before anything is written when
    /// extraction + chunking produce no chunks at all.
    pub async fn build(&self, pdf_path: &Path, index_dir: &Path) -> Result<RetrievalState, AppError> {
        let start = Instant::now();

        let pages = pdf::extract_pages(pdf_path)?;
        let chunks = self.chunk_pages(&pages);
        if chunks.is_empty() {
            return Err(AppError::EmptyDocument);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embedding_start = Instant::now();
        let embeddings = self.embedder.embed(&texts).await?;
        let embedding_duration = embedding_start.elapsed();

        let dim = embeddings.first().map(|v| v.len()).unwrap_or(0);
        let mut index = FlatL2Index::new(dim);
        index.add_all(&embeddings)?;

        std::fs::create_dir_all(index_dir)?;
        std::fs::write(index_dir.join(INDEX_FILE), index.to_bytes())?;
        std::fs::write(index_dir.join(META_FILE), serde_json::to_vec_pretty(&chunks)?)?;

        metrics::counter!("policy_copilot_index_builds_total").increment(1);
        metrics::counter!("policy_copilot_index_chunks_total").increment(chunks.len() as u64);
        metrics::histogram!("policy_copilot_embedding_duration_seconds")
            .record(embedding_duration.as_secs_f64());
        metrics::histogram!("policy_copilot_index_build_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            pages = pages.len(),
            chunks = chunks.len(),
            dim,
            embedding_ms = embedding_duration.as_millis(),
            total_ms = start.elapsed().as_millis(),
            "Index built and persisted"
        );

        Ok(RetrievalState { index, chunks })
    }

    /// Load the persisted pair when both artifacts exist, otherwise build.
    ///
    /// A loaded pair whose vector count disagrees with its chunk count is
    /// discarded with a warning and rebuilt rather than served torn.
    pub async fn load_or_build(
        &self,
        pdf_path: &Path,
        index_dir: &Path,
    ) -> Result<RetrievalState, AppError> {
        let index_path = index_dir.join(INDEX_FILE);
        let meta_path = index_dir.join(META_FILE);

        if index_path.exists() && meta_path.exists() {
            let index = FlatL2Index::from_bytes(&std::fs::read(&index_path)?)?;
            let chunks: Vec<ChunkMeta> = serde_json::from_slice(&std::fs::read(&meta_path)?)?;

            if index.len() == chunks.len() {
                tracing::info!(chunks = chunks.len(), dim = index.dim(), "Loaded persisted index");
                return Ok(RetrievalState { index, chunks });
            }
            tracing::warn!(
                vectors = index.len(),
                chunks = chunks.len(),
                "Persisted index and metadata disagree, rebuilding"
            );
        }

        self.build(pdf_path, index_dir).await
    }

    /// Rank the `k` nearest chunks for an already-embedded query.
    /// Returns fewer than `k` hits when the index is smaller than `k`.
    pub fn search(state: &RetrievalState, query: &[f32], k: usize) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (ordinal, _distance) in state.index.search(query, k) {
            // An ordinal without metadata would mean a torn pair; skip it
            let Some(chunk) = state.chunks.get(ordinal) else {
                continue;
            };
            hits.push(Hit {
                rank: hits.len() as u32 + 1,
                page: chunk.page,
                text: chunk.text.clone(),
            });
        }
        hits
    }

    /// Flatten page chunks in page order, then window order within a page.
    fn chunk_pages(&self, pages: &[Page]) -> Vec<ChunkMeta> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in chunker::chunk_text(&page.text, self.chunk_size, self.chunk_overlap) {
                chunks.push(ChunkMeta {
                    page: page.page_number,
                    text,
                });
            }
        }
        chunks
    }
}
