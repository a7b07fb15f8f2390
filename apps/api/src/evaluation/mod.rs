pub mod feedback;
pub mod handlers;
pub mod ideal_answer;
pub mod prompts;
pub mod scoring;
