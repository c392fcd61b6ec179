//! Answer generation: prompt strategies and the LLM generator trait.
//!
//! Retrieval produces context chunks; this module turns them into a grounded
//! answer. The prompt side is pluggable via [`PromptStrategy`] so the two
//! historical query variants (a hand-built stuffed-context template and a
//! QA-chain style template) are one component with two strategies rather
//! than two copies of the pipeline.

use async_trait::async_trait;

use crate::error::Result;

/// The fixed phrase the model is instructed to emit when the answer is not
/// derivable from the supplied context.
pub const FALLBACK_ANSWER: &str = "I don't know, thanks for asking!";

/// Renders a question and its retrieved context into a complete LLM prompt.
///
/// Every strategy must instruct the model to answer only from the supplied
/// context, bound the answer to three sentences, and name
/// [`FALLBACK_ANSWER`] as the response for unanswerable questions.
pub trait PromptStrategy: Send + Sync {
    /// Build the prompt for `question` given the retrieved chunk texts.
    ///
    /// `contexts` are in descending-similarity order; strategies preserve
    /// that order when stuffing them into the prompt.
    fn render(&self, question: &str, contexts: &[&str]) -> String;
}

/// The service's custom stuffed-context template.
///
/// Joins the retrieved chunk texts with newlines and embeds them directly
/// in the instruction block.
#[derive(Debug, Clone, Copy, Default)]
pub struct StuffedContextPrompt;

impl PromptStrategy for StuffedContextPrompt {
    fn render(&self, question: &str, contexts: &[&str]) -> String {
        let context = contexts.join("\n");
        format!(
            "Use the following pieces of context to answer the question.\n\
             Use three sentences maximum and keep the answer as concise as possible.\n\
             If you don't know the answer, just say \"{FALLBACK_ANSWER}\" and don't try to make up an answer.\n\
             \n\
             {context}\n\
             \n\
             Question: {question}\n\
             \n\
             Answer:"
        )
    }
}

/// A QA-chain style template: each context piece is labelled as a separate
/// document excerpt before the question is posed.
#[derive(Debug, Clone, Copy, Default)]
pub struct QaChainPrompt;

impl PromptStrategy for QaChainPrompt {
    fn render(&self, question: &str, contexts: &[&str]) -> String {
        let mut prompt = String::from(
            "You are answering a question using only the document excerpts below.\n\
             Answer in three sentences maximum. If the excerpts do not contain the answer,\n\
             reply exactly with \"",
        );
        prompt.push_str(FALLBACK_ANSWER);
        prompt.push_str("\".\n\n");
        for (i, context) in contexts.iter().enumerate() {
            prompt.push_str(&format!("Excerpt {}:\n{context}\n\n", i + 1));
        }
        prompt.push_str(&format!("Question: {question}\n\nAnswer:"));
        prompt
    }
}

/// An LLM backend that turns a rendered prompt into answer text.
///
/// The pipeline only invokes the generator when retrieval produced at least
/// one context chunk.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate answer text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// A short name for the backing model, used in logs and errors.
    fn model_name(&self) -> &str;
}
