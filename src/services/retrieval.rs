//! Query-side retrieval: embed the question, rank index hits.

use std::sync::Arc;

use crate::errors::AppError;
use crate::llm::Embedder;
use crate::services::index::IndexService;
use crate::services::{Hit, RetrievalState};

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    /// Embed `query` as a single-item batch and return the ranked nearest
    /// chunks from the given snapshot. No query-embedding cache.
    pub async fn retrieve(
        &self,
        query: &str,
        state: &RetrievalState,
        k: Option<usize>,
    ) -> Result<Vec<Hit>, AppError> {
        let vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmbeddingService("no embedding returned for query".to_string()))?;

        let hits = IndexService::search(state, &query_vector, k.unwrap_or(self.top_k));

        metrics::counter!("policy_copilot_retrievals_total").increment(1);
        tracing::debug!(hits = hits.len(), "Retrieval complete");

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ChunkMeta, FlatL2Index};
    use crate::llm::stub::StubEmbedder;

    async fn snapshot_of(texts: &[(u32, &str)], embedder: &StubEmbedder) -> RetrievalState {
        let chunks: Vec<ChunkMeta> = texts
            .iter()
            .map(|(page, text)| ChunkMeta { page: *page, text: text.to_string() })
            .collect();
        let inputs: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = crate::llm::Embedder::embed(embedder, &inputs).await.unwrap();
        let mut index = FlatL2Index::new(vectors[0].len());
        index.add_all(&vectors).unwrap();
        RetrievalState { index, chunks }
    }

    #[tokio::test]
    async fn exact_text_match_ranks_first() {
        let embedder = StubEmbedder::new(64);
        let state = snapshot_of(
            &[
                (1, "annual leave accrues at two days per month of service"),
                (2, "expense reports are due within thirty days of travel"),
            ],
            &embedder,
        )
        .await;

        let service = RetrievalService::new(Arc::new(StubEmbedder::new(64)), 5);
        let hits = service
            .retrieve("annual leave accrues at two days per month of service", &state, None)
            .await
            .unwrap();

        assert_eq!(hits[0].page, 1);
        assert_eq!(hits[0].rank, 1);
    }

    #[tokio::test]
    async fn repeated_queries_return_identical_ordering() {
        let embedder = StubEmbedder::new(64);
        let state = snapshot_of(
            &[
                (1, "holiday schedule is published every December for the year ahead"),
                (2, "overtime must be approved in advance by a direct manager"),
                (3, "equipment may be requested through the internal portal"),
            ],
            &embedder,
        )
        .await;

        let service = RetrievalService::new(Arc::new(StubEmbedder::new(64)), 3);
        let first = service.retrieve("who approves overtime", &state, None).await.unwrap();
        let second = service.retrieve("who approves overtime", &state, None).await.unwrap();

        let pages: Vec<u32> = first.iter().map(|h| h.page).collect();
        let pages_again: Vec<u32> = second.iter().map(|h| h.page).collect();
        assert_eq!(pages, pages_again);
    }

    #[tokio::test]
    async fn k_overrides_default_top_k() {
        let embedder = StubEmbedder::new(64);
        let state = snapshot_of(
            &[(1, "alpha section"), (2, "beta section"), (3, "gamma section")],
            &embedder,
        )
        .await;

        let service = RetrievalService::new(Arc::new(StubEmbedder::new(64)), 5);
        let hits = service.retrieve("alpha section", &state, Some(1)).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
