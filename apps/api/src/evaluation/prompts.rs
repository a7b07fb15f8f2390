// LLM prompt constants for the evaluation module.

use crate::interview::session::CandidateAnswer;

/// System prompt for transcript feedback. Enforces JSON-only output.
pub const FEEDBACK_SYSTEM: &str = r#"You are an expert interview assessor. Based on the candidate's answers and their score, provide detailed feedback as a JSON object with this EXACT schema:
{
  "strength": "Main strength of the candidate",
  "areasOfImprovement": "Key areas that need improvement",
  "weakness": "Main weakness to address"
}
Keep the feedback constructive, specific and actionable.
You MUST respond with valid JSON only. Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

/// Feedback prompt template. Replace: {score}, {transcript}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = "Score: {score}
Candidate's Answers:
{transcript}

Please provide detailed feedback addressing the strengths, areas of improvement and weaknesses.";

/// System prompt for the per-question analysis and model answer.
pub const IDEAL_ANSWER_SYSTEM: &str = "You are an expert interviewer and mentor. \
    Analyze the candidate's answer to the interview question and provide constructive feedback. \
    Your response should have two parts:

1. Analysis: Evaluate what the candidate did well and what could be improved. Be specific but constructive.
2. Ideal Answer: Provide a model answer that demonstrates the key points that should be covered.

Keep your response professional and clear. Format your response with clear sections.";

/// Ideal-answer prompt template. Replace: {question}, {answer}
pub const IDEAL_ANSWER_PROMPT_TEMPLATE: &str = "Question: {question}
Candidate's Answer: {answer}

Please provide an analysis of the answer and an ideal response.";

/// Renders the transcript as `Q: ...` / `A: ...` pairs, one pair per answer.
pub fn format_transcript(answers: &[CandidateAnswer]) -> String {
    answers
        .iter()
        .map(|a| format!("Q: {}\nA: {}", a.question_text, a.answer_text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_feedback_prompt(score: u32, answers: &[CandidateAnswer]) -> String {
    FEEDBACK_PROMPT_TEMPLATE
        .replace("{score}", &score.to_string())
        .replace("{transcript}", &format_transcript(answers))
}

pub fn build_ideal_answer_prompt(question: &str, answer: &str) -> String {
    IDEAL_ANSWER_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_system_demands_json() {
        assert!(FEEDBACK_SYSTEM.contains("valid JSON only"));
        assert!(FEEDBACK_SYSTEM.contains("areasOfImprovement"));
    }

    #[test]
    fn test_transcript_pairs_questions_with_answers() {
        let answers = vec![
            CandidateAnswer {
                question_text: "Q one".to_string(),
                answer_text: "first".to_string(),
                question_index: 0,
            },
            CandidateAnswer {
                question_text: "Q two".to_string(),
                answer_text: "second".to_string(),
                question_index: 1,
            },
        ];
        assert_eq!(
            format_transcript(&answers),
            "Q: Q one\nA: first\nQ: Q two\nA: second"
        );
    }

    #[test]
    fn test_ideal_answer_prompt_fills_placeholders() {
        let prompt = build_ideal_answer_prompt("What is a mutex?", "A lock");
        assert!(prompt.starts_with("Question: What is a mutex?\nCandidate's Answer: A lock"));
        assert!(!prompt.contains('{'));
    }
}
