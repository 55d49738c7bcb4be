//! Capability traits for the external language-model services.
//!
//! The pipeline depends on these traits, never on a vendor SDK, so every
//! build/search/generate path is testable with the stub implementations.

pub mod client;
pub mod stub;

use async_trait::async_trait;

use crate::errors::AppError;

/// Converts text to dense vectors, order-preserved, one per input.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a list of texts. All returned vectors share one dimension and
    /// line up 1:1 with the inputs. A service failure aborts the whole
    /// call; there is no partial-batch recovery.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;
}

/// Generates a completion from a system instruction and a user message.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;
}
