//! Answer generation from retrieved excerpts.
//!
//! Builds a constrained prompt: the model may only use the provided
//! excerpts, must fall back to a fixed sentence when the policy is silent,
//! and must not cite pages or sources in the answer.

use std::sync::Arc;

use crate::errors::AppError;
use crate::llm::Completer;
use crate::services::Hit;

const SYSTEM_PROMPT: &str = "You are an HR policy assistant. Answer ONLY using the provided policy excerpts. \
If the policy does not specify something, reply exactly: 'Not specified in the policy.' \
Be concise and professional. Do not include citations, sources, or page numbers in your answer.";

/// Delimiter between excerpts in the context block
const EXCERPT_SEPARATOR: &str = "\n\n---\n\n";

pub struct AnswerService {
    completer: Arc<dyn Completer>,
}

impl AnswerService {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Generate an answer for `question` constrained to `hits`.
    /// Zero hits produce an empty context block, not an error; completion
    /// failures propagate to the caller with no local fallback answer.
    pub async fn generate(&self, question: &str, hits: &[Hit]) -> Result<String, AppError> {
        let context = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(EXCERPT_SEPARATOR);

        let user_msg = format!(
            "Policy excerpts:\n{context}\n\nQuestion: {question}\n\n\
             Answer briefly and clearly. Do not add sources, citations, or page numbers."
        );

        let answer = self.completer.complete(SYSTEM_PROMPT, &user_msg).await?;

        metrics::counter!("policy_copilot_answers_total").increment(1);

        Ok(answer.trim().to_string())
    }
}
