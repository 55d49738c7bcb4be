//! Deterministic stub clients.
//!
//! Selected at startup when `openai.api_key = "mock"`, and used throughout
//! the test suite. Stub embeddings are derived from the text bytes, so the
//! same text always maps to the same vector and identical texts collide at
//! distance zero.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm::{Completer, Embedder};

pub struct StubEmbedder {
    dim: usize,
}

impl StubEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let mut position: usize = 0;
        for byte in text.trim().bytes() {
            position = position.wrapping_mul(31).wrapping_add(byte as usize);
            vector[position % self.dim] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

pub struct StubCompleter;

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, AppError> {
        // Echo enough of the request to make assertions possible
        Ok(format!("[stub answer] {}\n", user.chars().take(120).collect::<String>()))
    }
}
