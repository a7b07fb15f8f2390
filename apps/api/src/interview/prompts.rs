// All LLM prompt constants for question generation.
// Reuses QUESTION_ONLY_INSTRUCTION from llm_client::prompts.

use crate::llm_client::prompts::QUESTION_ONLY_INSTRUCTION;

/// Canned behavioral questions used when generation fails.
pub const FALLBACK_INTRO_QUESTION: &str =
    "Could you please introduce yourself and tell us about your background?";
pub const FALLBACK_MOTIVATION_QUESTION: &str =
    "What interests you about this role and why did you apply for it?";

pub const INTRO_SYSTEM: &str = "You are a professional interviewer. \
    Generate an introduction question that asks the candidate to introduce themselves \
    and their background. Keep it professional and concise.";
pub const INTRO_PROMPT: &str = "Generate an introduction question for the interview.";

pub const MOTIVATION_SYSTEM: &str = "You are a professional interviewer. \
    Generate a question that asks about the candidate's motivation for applying to this role \
    and what interests them about it.";
pub const MOTIVATION_PROMPT: &str = "Generate a question about role motivation.";

/// System prompt for resume-grounded technical questions.
pub const GROUNDED_SYSTEM: &str = "You are a professional technical interviewer. \
    You write one interview question at a time, grounded in the candidate's resume \
    and the job they are applying for.";

/// Grounded question template.
/// Replace: {context}, {experience}, {ordinal}, {total}, {question_only}
pub const GROUNDED_PROMPT_TEMPLATE: &str = r#"Based on the following context from a resume and job description:

{context}

Generate a specific theory interview question for a {experience} candidate.
This is question {ordinal} of {total}; make it different from the other questions in the set.
The question should:
1. Be relevant to the candidate's background and job requirements
2. Be answerable in 2-3 lines
3. Focus on theoretical skills mentioned in both the resume and the job description
4. Be appropriate for the candidate's experience level
5. Where it fits, ask the candidate to explain one of their projects
{question_only}"#;

/// System prompt for questions drawn straight from a custom job description.
pub const CUSTOM_JOB_SYSTEM: &str = "You are a professional technical interviewer. \
    Based on the following job description, generate a relevant technical interview question.";

/// Replace: {job_description}, {ordinal}, {total}, {question_only}
pub const CUSTOM_JOB_PROMPT_TEMPLATE: &str = "Generate a technical interview question \
    based on the job requirements: {job_description}
This is question {ordinal} of {total}; ask something new.
{question_only}";

/// System prompt for quick setup. Replace: {domain}, {role}, {experience}
pub const ROLE_SYSTEM_TEMPLATE: &str = "You are a professional interviewer with expertise in {domain}. \
    Your job is to conduct an interview for the role of {role}. \
    Generate one structured and insightful technical question suitable for a {experience}-level candidate. \
    Ask a simple question which can be answered in 2-3 lines max. \
    There is only one candidate you are interviewing, ask a new question.";

/// Replace: {domain}, {role}, {experience}, {ordinal}, {total}, {question_only}
pub const ROLE_PROMPT_TEMPLATE: &str = "Ask a technical {experience}-level interview question \
    for a {role} in {domain}.
This is question {ordinal} of {total}.
{question_only}";

pub fn build_grounded_prompt(context: &[String], experience: &str, index: usize, total: usize) -> String {
    GROUNDED_PROMPT_TEMPLATE
        .replace("{context}", &context.join(" "))
        .replace("{experience}", experience)
        .replace("{ordinal}", &(index + 1).to_string())
        .replace("{total}", &total.to_string())
        .replace("{question_only}", QUESTION_ONLY_INSTRUCTION)
}

pub fn build_custom_job_prompt(job_description: &str, index: usize, total: usize) -> String {
    CUSTOM_JOB_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{ordinal}", &(index + 1).to_string())
        .replace("{total}", &total.to_string())
        .replace("{question_only}", QUESTION_ONLY_INSTRUCTION)
}

pub fn build_role_system(domain: &str, role: &str, experience: &str) -> String {
    ROLE_SYSTEM_TEMPLATE
        .replace("{domain}", domain)
        .replace("{role}", role)
        .replace("{experience}", experience)
}

pub fn build_role_prompt(
    domain: &str,
    role: &str,
    experience: &str,
    index: usize,
    total: usize,
) -> String {
    ROLE_PROMPT_TEMPLATE
        .replace("{domain}", domain)
        .replace("{role}", role)
        .replace("{experience}", experience)
        .replace("{ordinal}", &(index + 1).to_string())
        .replace("{total}", &total.to_string())
        .replace("{question_only}", QUESTION_ONLY_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_prompt_carries_context_and_ordinal() {
        let prompt = build_grounded_prompt(
            &["Built Kafka pipelines.".to_string(), "Needs Rust.".to_string()],
            "senior",
            1,
            3,
        );
        assert!(prompt.contains("Built Kafka pipelines. Needs Rust."));
        assert!(prompt.contains("for a senior candidate"));
        assert!(prompt.contains("question 2 of 3"));
        assert!(prompt.ends_with(QUESTION_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_role_prompts_fill_every_placeholder() {
        let system = build_role_system("Data Science", "Data Analyst", "entry");
        let prompt = build_role_prompt("Data Science", "Data Analyst", "entry", 0, 3);
        for text in [&system, &prompt] {
            assert!(!text.contains('{'), "unfilled placeholder in: {text}");
        }
        assert!(system.contains("expertise in Data Science"));
        assert!(prompt.contains("entry-level interview question for a Data Analyst"));
    }

    #[test]
    fn test_custom_job_prompt_embeds_description() {
        let prompt = build_custom_job_prompt("Go, gRPC and Postgres", 2, 3);
        assert!(prompt.contains("job requirements: Go, gRPC and Postgres"));
        assert!(prompt.contains("question 3 of 3"));
    }
}
