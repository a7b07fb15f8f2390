use tracing::debug;

use crate::evaluation::prompts::{build_ideal_answer_prompt, IDEAL_ANSWER_SYSTEM};
use crate::llm_client::{LlmError, TextGenerator};

/// Asks the model to analyze one answer and write a model answer for the question.
/// Callers validate that both inputs are non-empty.
pub async fn review_answer(
    llm: &dyn TextGenerator,
    question: &str,
    answer: &str,
) -> Result<String, LlmError> {
    debug!("Generating ideal answer ({} chars of candidate answer)", answer.len());
    let prompt = build_ideal_answer_prompt(question.trim(), answer.trim());
    llm.generate(IDEAL_ANSWER_SYSTEM, &prompt).await
}
