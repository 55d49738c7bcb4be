//! OpenAI-compatible HTTP client implementing both capability traits.

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::errors::AppError;
use crate::llm::{Completer, Embedder};

/// Run `call` once per batch of at most `batch_size` inputs and
/// concatenate the results in input order. Batching is a payload-size
/// concern only: the output must be indistinguishable from a single
/// unbatched call. A failed batch aborts the whole operation.
pub(crate) async fn embed_batched<F, Fut>(
    texts: &[String],
    batch_size: usize,
    mut call: F,
) -> Result<Vec<Vec<f32>>, AppError>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<Vec<f32>>, AppError>>,
{
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        vectors.extend(call(batch.to_vec()).await?);
    }
    Ok(vectors)
}

pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Embed one batch with a single API call.
    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let body = EmbeddingsRequest {
            model: &self.config.embed_model,
            input: batch,
        };

        let res = self
            .http
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingService(format!("request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::EmbeddingService(format!("{status}: {text}")));
        }

        let parsed: EmbeddingsResponse = res
            .json()
            .await
            .map_err(|e| AppError::EmbeddingService(format!("parse error: {e}")))?;

        vectors_in_index_order(parsed.data, batch.len())
    }
}

/// Re-align one batch response with its inputs. Responses arrive in order;
/// sorting by index makes the 1:1 alignment independent of server behavior.
fn vectors_in_index_order(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, AppError> {
    if data.len() != expected {
        return Err(AppError::EmbeddingService(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        embed_batched(texts, self.config.embed_batch_size, |batch| async move {
            self.embed_batch(&batch).await
        })
        .await
    }
}

#[async_trait]
impl Completer for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let body = ChatRequest {
            model: &self.config.gen_model,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::CompletionService(format!("request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::CompletionService(format!("{status}: {text}")));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::CompletionService(format!("parse error: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::CompletionService("no choices in response".to_string()))
    }
}

// ----------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Per-batch stand-in: one recognizable vector per input text.
    fn vector_for(text: &str) -> Vec<f32> {
        vec![text.len() as f32, text.bytes().map(|b| b as f32).sum()]
    }

    #[tokio::test]
    async fn batching_preserves_order_and_values() {
        let texts: Vec<String> = (0..150).map(|i| format!("chunk number {i}")).collect();
        let batch_sizes = RefCell::new(Vec::new());

        let batched = embed_batched(&texts, 64, |batch| {
            let batch_sizes = &batch_sizes;
            async move {
                batch_sizes.borrow_mut().push(batch.len());
                Ok(batch.iter().map(|t| vector_for(t)).collect())
            }
        })
        .await
        .unwrap();

        // 150 inputs at batch size 64 split 64/64/22
        assert_eq!(*batch_sizes.borrow(), vec![64, 64, 22]);

        // Output is indistinguishable from one unbatched call
        let unbatched = embed_batched(&texts, 1000, |batch| async move {
            Ok(batch.iter().map(|t| vector_for(t)).collect())
        })
        .await
        .unwrap();
        assert_eq!(batched, unbatched);

        assert_eq!(batched.len(), texts.len());
        for (text, vector) in texts.iter().zip(&batched) {
            assert_eq!(vector, &vector_for(text));
        }
    }

    #[tokio::test]
    async fn failed_batch_aborts_the_whole_call() {
        let texts: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let calls = RefCell::new(0usize);

        let result = embed_batched(&texts, 4, |batch| {
            let calls = &calls;
            async move {
                *calls.borrow_mut() += 1;
                if *calls.borrow() == 2 {
                    Err(AppError::EmbeddingService("boom".to_string()))
                } else {
                    Ok(batch.iter().map(|t| vector_for(t)).collect())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::EmbeddingService(_))));
        // No third batch after the failure
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn out_of_order_responses_realign_to_input_order() {
        let data = vec![
            EmbeddingData { index: 2, embedding: vec![2.0] },
            EmbeddingData { index: 0, embedding: vec![0.0] },
            EmbeddingData { index: 1, embedding: vec![1.0] },
        ];

        let vectors = vectors_in_index_order(data, 3).unwrap();
        assert_eq!(vectors, vec![vec![0.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn short_responses_are_rejected() {
        let data = vec![EmbeddingData { index: 0, embedding: vec![0.0] }];
        let result = vectors_in_index_order(data, 2);
        assert!(matches!(result, Err(AppError::EmbeddingService(_))));
    }
}
