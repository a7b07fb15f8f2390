// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it;
// this file only holds the pieces they have in common.

/// Appended to every prompt whose output is shown verbatim to the candidate.
pub const QUESTION_ONLY_INSTRUCTION: &str = "\
    Only provide the question itself. \
    Do NOT add an introduction, a preamble such as \"Here is a question\", \
    an assessment rubric, an explanation or the answer.";

