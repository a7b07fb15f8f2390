//! Answer Scoring: pluggable, trait-based scorer for a single candidate answer.
//!
//! Default: `HeuristicRubric` (pure-Rust, deterministic, no LLM call).
//!
//! `AppState` holds an `Arc<dyn AnswerScorer>` so the rubric can be replaced without
//! touching the feedback handler.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interview::session::CandidateAnswer;

// ────────────────────────────────────────────────────────────────────────────
// Rubric constants
// ────────────────────────────────────────────────────────────────────────────

pub const LENGTH_WEIGHT: f64 = 30.0;
pub const TECHNICAL_WEIGHT: f64 = 25.0;
pub const EXPLANATION_WEIGHT: f64 = 25.0;
pub const RELEVANCE_WEIGHT: f64 = 20.0;
/// Word count at which the length component saturates.
pub const LENGTH_SATURATION_WORDS: usize = 100;
pub const MAX_SCORE: f64 = 100.0;

/// Curated technical vocabulary. Matched on word boundaries, case-insensitively.
pub const TECHNICAL_TERMS: &[&str] = &[
    "api", "code", "data", "function", "method", "class", "algorithm", "database",
    "framework", "library", "server", "client", "test", "debug", "deploy", "performance",
    "optimization", "scalability", "security", "encryption", "protocol", "thread",
    "process", "memory", "storage", "cloud", "container", "virtualization", "network",
    "frontend", "backend", "fullstack", "devops", "ci/cd", "integration", "authentication",
    "authorization", "middleware", "cache", "proxy", "dns", "http", "https", "ssl", "tls",
    "rest", "soap", "graphql", "json", "xml", "ajax", "mvc", "orm", "nosql", "sql", "crud",
    "gui", "cli", "architecture", "design pattern", "microservice", "docker", "kubernetes",
    "aws", "azure", "git", "agile", "scrum", "testing", "unit test", "integration test",
    "deployment", "monitoring", "logging", "analytics", "machine learning", "ai",
    "blockchain", "iot", "mobile", "responsive", "ui", "ux", "accessibility", "seo",
    "version control",
];

/// Causal and explanatory connectives.
pub const EXPLANATORY_CONNECTIVES: &[&str] = &[
    "because", "therefore", "hence", "since", "as", "due to", "thus", "resulting in",
    "consequently", "so that", "which means", "thereby", "accordingly", "for this reason",
    "in order to", "on account of", "this leads to", "this ensures", "this allows",
    "this helps", "this enables", "this prevents", "this improves", "this optimizes",
    "this facilitates", "this maintains",
];

static TECHNICAL_RE: LazyLock<Regex> = LazyLock::new(|| alternation(TECHNICAL_TERMS));
static EXPLANATION_RE: LazyLock<Regex> = LazyLock::new(|| alternation(EXPLANATORY_CONNECTIVES));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Builds `\b(term1|term2|...)\b` from a fixed term list.
fn alternation(terms: &[&str]) -> Regex {
    let body = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({body})\b")).expect("term list compiles to a valid pattern")
}

// ────────────────────────────────────────────────────────────────────────────
// Experience level
// ────────────────────────────────────────────────────────────────────────────

/// Expected seniority, which scales the rubric sum before capping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    /// Case-insensitive: `senior` → Senior, `junior`/`entry` → Junior, anything else → Mid.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "senior" => ExperienceLevel::Senior,
            "junior" | "entry" => ExperienceLevel::Junior,
            _ => ExperienceLevel::Mid,
        }
    }

    pub fn modifier(self) -> f64 {
        match self {
            ExperienceLevel::Senior => 1.2,
            ExperienceLevel::Junior => 0.8,
            ExperienceLevel::Mid => 1.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-answer rubric result. Components are unmodified; `total` applies the
/// experience modifier and the 100 cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub length: f64,
    pub technical: f64,
    pub explanation: f64,
    pub relevance: f64,
    pub modifier: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn raw_sum(&self) -> f64 {
        self.length + self.technical + self.explanation + self.relevance
    }
}

/// Scores for a whole session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionScore {
    pub per_answer: Vec<ScoreBreakdown>,
    pub overall: u32,
    pub scorer_backend: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("no answers to score")]
    EmptyAnswerSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The answer scorer trait. Implement this to swap rubrics without touching callers.
pub trait AnswerScorer: Send + Sync {
    fn score(&self, question: &str, answer: &str, level: ExperienceLevel) -> ScoreBreakdown;

    /// Short backend label, reported alongside scores.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicRubric (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// Four weighted factors, summed, scaled by experience, capped at 100:
///
/// | Factor      | Weight | Rule                                                     |
/// |-------------|--------|----------------------------------------------------------|
/// | length      | 30     | `min(words, 100) / 100 × 30`                             |
/// | technical   | 25     | 25 if any technical term appears, else 0                 |
/// | explanation | 25     | 25 if any explanatory connective appears, else 0         |
/// | relevance   | 20     | `20 × |Q ∩ A| / |Q|` over lowercase word sets, 0 if Q = ∅ |
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicRubric;

impl AnswerScorer for HeuristicRubric {
    fn score(&self, question: &str, answer: &str, level: ExperienceLevel) -> ScoreBreakdown {
        let question = question.to_lowercase();
        let answer = answer.to_lowercase();

        let word_count = answer.split_whitespace().count();
        let length = (word_count.min(LENGTH_SATURATION_WORDS) as f64
            / LENGTH_SATURATION_WORDS as f64)
            * LENGTH_WEIGHT;

        let technical = if TECHNICAL_RE.is_match(&answer) {
            TECHNICAL_WEIGHT
        } else {
            0.0
        };

        let explanation = if EXPLANATION_RE.is_match(&answer) {
            EXPLANATION_WEIGHT
        } else {
            0.0
        };

        let relevance = relevance_ratio(&question, &answer) * RELEVANCE_WEIGHT;

        let mut breakdown = ScoreBreakdown {
            length,
            technical,
            explanation,
            relevance,
            modifier: level.modifier(),
            total: 0.0,
        };
        breakdown.total = (breakdown.raw_sum() * breakdown.modifier).min(MAX_SCORE);
        breakdown
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Share of distinct question words that also appear in the answer.
fn relevance_ratio(question: &str, answer: &str) -> f64 {
    let question_words: std::collections::HashSet<&str> =
        WORD_RE.find_iter(question).map(|m| m.as_str()).collect();
    if question_words.is_empty() {
        return 0.0;
    }
    let answer_words: std::collections::HashSet<&str> =
        WORD_RE.find_iter(answer).map(|m| m.as_str()).collect();

    question_words.intersection(&answer_words).count() as f64 / question_words.len() as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// `floor(mean(totals))`. Fails on an empty slice.
pub fn aggregate_score(totals: &[f64]) -> Result<u32, ScoringError> {
    if totals.is_empty() {
        return Err(ScoringError::EmptyAnswerSet);
    }
    let mean = totals.iter().sum::<f64>() / totals.len() as f64;
    Ok(mean.floor().clamp(0.0, MAX_SCORE) as u32)
}

/// Scores every answer of a session and aggregates them.
pub fn score_session(
    scorer: &dyn AnswerScorer,
    answers: &[CandidateAnswer],
    level: ExperienceLevel,
) -> Result<SessionScore, ScoringError> {
    let per_answer: Vec<ScoreBreakdown> = answers
        .iter()
        .map(|a| scorer.score(&a.question_text, &a.answer_text, level))
        .collect();
    let totals: Vec<f64> = per_answer.iter().map(|s| s.total).collect();
    let overall = aggregate_score(&totals)?;

    Ok(SessionScore {
        per_answer,
        overall,
        scorer_backend: scorer.name().to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
