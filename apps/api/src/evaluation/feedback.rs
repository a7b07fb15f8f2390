//! Feedback synthesis: turns an aggregate score (and optionally the transcript) into
//! categorical feedback.
//!
//! Two backends behind `FeedbackSynthesizer`:
//! - `BandFeedback`: fixed score-band lookup, deterministic, no LLM call.
//! - `GenerativeFeedback`: LLM summary of the transcript. Any failure (call error, timeout,
//!   output that does not parse into the expected shape) degrades to the band lookup.
//!
//! `overall_score` is always the stringified input score, never the model's opinion.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluation::prompts::{build_feedback_prompt, FEEDBACK_SYSTEM};
use crate::interview::session::CandidateAnswer;
use crate::llm_client::{generate_json, TextGenerator};
use crate::outcome::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub strength: String,
    pub areas_of_improvement: String,
    pub weakness: String,
    pub overall_score: String,
}

/// The shape the model is asked to produce. Extra keys (including any score it adds) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedFeedback {
    strength: String,
    areas_of_improvement: String,
    weakness: String,
}

#[async_trait]
pub trait FeedbackSynthesizer: Send + Sync {
    async fn synthesize(&self, score: u32, answers: &[CandidateAnswer]) -> Outcome<Feedback>;

    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Score bands
// ────────────────────────────────────────────────────────────────────────────

/// Canned feedback for the band containing `score`:
/// `[80, 100]`, `[60, 79]`, `[40, 59]`, `[0, 39]`.
pub fn band_feedback(score: u32) -> Feedback {
    let (strength, areas_of_improvement, weakness) = match score {
        80.. => (
            "Strong technical knowledge demonstrated",
            "Add more specific examples",
            "Could provide more detailed explanations",
        ),
        60..=79 => (
            "Good basic understanding shown",
            "Technical depth, practical examples",
            "Needs more technical specifics",
        ),
        40..=59 => (
            "Shows fundamental knowledge",
            "Technical terms, clarity, depth",
            "Answers lack technical detail",
        ),
        _ => (
            "Willing to attempt answers",
            "Technical knowledge, specificity",
            "Insufficient technical depth",
        ),
    };

    Feedback {
        strength: strength.to_string(),
        areas_of_improvement: areas_of_improvement.to_string(),
        weakness: weakness.to_string(),
        overall_score: score.to_string(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BandFeedback;

#[async_trait]
impl FeedbackSynthesizer for BandFeedback {
    async fn synthesize(&self, score: u32, _answers: &[CandidateAnswer]) -> Outcome<Feedback> {
        Outcome::Ok(band_feedback(score))
    }

    fn name(&self) -> &'static str {
        "band"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generative summarization
// ────────────────────────────────────────────────────────────────────────────

pub struct GenerativeFeedback {
    llm: Arc<dyn TextGenerator>,
}

impl GenerativeFeedback {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FeedbackSynthesizer for GenerativeFeedback {
    async fn synthesize(&self, score: u32, answers: &[CandidateAnswer]) -> Outcome<Feedback> {
        let prompt = build_feedback_prompt(score, answers);

        match generate_json::<GeneratedFeedback>(self.llm.as_ref(), FEEDBACK_SYSTEM, &prompt).await
        {
            Ok(generated) => Outcome::Ok(Feedback {
                strength: generated.strength,
                areas_of_improvement: generated.areas_of_improvement,
                weakness: generated.weakness,
                overall_score: score.to_string(),
            }),
            Err(e) => {
                warn!("Generative feedback unavailable, using score band for {score}: {e}");
                Outcome::degraded(band_feedback(score), format!("feedback generation failed: {e}"))
            }
        }
    }

    fn name(&self) -> &'static str {
        "generative"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::llm_client::LlmError;

    struct Scripted {
        reply: Result<&'static str, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn replying(text: &'static str) -> Self {
            Self {
                reply: Ok(text),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(LlmError::EmptyContent),
            }
        }
    }

    fn transcript() -> Vec<CandidateAnswer> {
        vec![CandidateAnswer {
            question_text: "What is a REST API?".to_string(),
            answer_text: "An HTTP interface over resources".to_string(),
            question_index: 0,
        }]
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(band_feedback(100).strength, "Strong technical knowledge demonstrated");
        assert_eq!(band_feedback(80).strength, "Strong technical knowledge demonstrated");
        assert_eq!(band_feedback(79).strength, "Good basic understanding shown");
        assert_eq!(band_feedback(60).strength, "Good basic understanding shown");
        assert_eq!(band_feedback(59).strength, "Shows fundamental knowledge");
        assert_eq!(band_feedback(40).strength, "Shows fundamental knowledge");
        assert_eq!(band_feedback(39).strength, "Willing to attempt answers");
        assert_eq!(band_feedback(0).strength, "Willing to attempt answers");
    }

    #[test]
    fn test_score_seventy_falls_in_sixty_band() {
        let feedback = band_feedback(70);
        assert_eq!(feedback.areas_of_improvement, "Technical depth, practical examples");
        assert_eq!(feedback.weakness, "Needs more technical specifics");
        assert_eq!(feedback.overall_score, "70");
    }

    #[test]
    fn test_feedback_serializes_camel_case() {
        let json = serde_json::to_value(band_feedback(45)).unwrap();
        assert_eq!(json["areasOfImprovement"], "Technical terms, clarity, depth");
        assert_eq!(json["overallScore"], "45");
    }

    #[tokio::test]
    async fn test_band_strategy_is_never_degraded() {
        let outcome = BandFeedback.synthesize(85, &transcript()).await;
        assert_eq!(outcome, Outcome::Ok(band_feedback(85)));
    }

    #[tokio::test]
    async fn test_generative_uses_model_output_but_keeps_score() {
        let llm = Arc::new(Scripted::replying(
            r#"{"strength": "Clear API knowledge", "areasOfImprovement": "Depth",
                "weakness": "Few examples", "overallScore": "95"}"#,
        ));
        let synthesizer = GenerativeFeedback::new(llm.clone());

        let outcome = synthesizer.synthesize(62, &transcript()).await;
        assert!(!outcome.is_degraded());
        let (feedback, _) = outcome.into_parts();
        assert_eq!(feedback.strength, "Clear API knowledge");
        assert_eq!(feedback.overall_score, "62");

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Score: 62"));
        assert!(prompts[0].contains("What is a REST API?"));
    }

    #[tokio::test]
    async fn test_generative_accepts_fenced_json() {
        let llm = Arc::new(Scripted::replying(
            "```json\n{\"strength\": \"s\", \"areasOfImprovement\": \"a\", \"weakness\": \"w\"}\n```",
        ));
        let outcome = GenerativeFeedback::new(llm).synthesize(10, &transcript()).await;
        assert_eq!(outcome.value().weakness, "w");
    }

    #[tokio::test]
    async fn test_malformed_output_degrades_to_band_lookup() {
        let llm = Arc::new(Scripted::replying("The candidate did fine overall."));
        let outcome = GenerativeFeedback::new(llm).synthesize(70, &transcript()).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &band_feedback(70));
    }

    #[tokio::test]
    async fn test_missing_fields_degrade_to_band_lookup() {
        let llm = Arc::new(Scripted::replying(r#"{"strength": "only this"}"#));
        let outcome = GenerativeFeedback::new(llm).synthesize(33, &transcript()).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_parts().0, band_feedback(33));
    }

    #[tokio::test]
    async fn test_call_failure_degrades_to_band_lookup() {
        let outcome = GenerativeFeedback::new(Arc::new(Scripted::failing()))
            .synthesize(88, &transcript())
            .await;

        assert!(outcome.reason().unwrap().contains("feedback generation failed"));
        assert_eq!(outcome.value(), &band_feedback(88));
    }
}
