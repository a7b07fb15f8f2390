//! Interview sessions: the questions asked and the ordered answers collected.
//!
//! Sessions are short-lived and keyed by a random id handed to the client. The Redis
//! store keeps the session as JSON under `interview:session:{id}` and its answers as a
//! list under `interview:session:{id}:answers`, both with a TTL so abandoned interviews
//! disappear on their own. Answers are appended with `RPUSH`, so overlapping submissions
//! to one session never overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::evaluation::scoring::ExperienceLevel;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Question {0} is not part of this interview")]
    QuestionNotFound(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            question: text.into(),
        }
    }
}

/// One submitted answer. Created once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnswer {
    pub question_text: String,
    pub answer_text: String,
    pub question_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    /// Owner of the interview when the client is signed in.
    pub user_id: Option<String>,
    /// The experience label as the client sent it; parsed for scoring.
    pub experience: String,
    pub questions: Vec<Question>,
    /// Persisted apart from the session body; see `SessionStore::append_answer`.
    #[serde(skip)]
    pub answers: Vec<CandidateAnswer>,
    pub created_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(experience: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            experience: experience.into(),
            questions,
            answers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_label(&self.experience)
    }

    /// Builds the answer to the question at `question_index` without recording it.
    pub fn answer_to(
        &self,
        question_index: usize,
        answer: &str,
    ) -> Result<CandidateAnswer, SessionError> {
        let question = self
            .questions
            .get(question_index)
            .ok_or(SessionError::QuestionNotFound(question_index))?;

        Ok(CandidateAnswer {
            question_text: question.question.clone(),
            answer_text: answer.to_string(),
            question_index,
        })
    }
}

#[cfg(test)]
impl InterviewSession {
    /// Appends an answer to the question at `question_index`.
    pub fn record_answer(
        &mut self,
        question_index: usize,
        answer: &str,
    ) -> Result<&CandidateAnswer, SessionError> {
        let answer = self.answer_to(question_index, answer)?;
        self.answers.push(answer);
        Ok(&self.answers[self.answers.len() - 1])
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, SessionError>;

    async fn save(&self, session: &InterviewSession) -> Result<(), SessionError>;

    /// Appends one answer without rewriting the rest of the session.
    /// Returns the number of answers now recorded, or `None` for an unknown session.
    async fn append_answer(
        &self,
        id: Uuid,
        question_index: usize,
        answer: &str,
    ) -> Result<Option<usize>, SessionError>;

    /// Returns whether a session was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, SessionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(id: Uuid) -> String {
        format!("interview:session:{id}")
    }

    fn answers_key(id: Uuid) -> String {
        format!("interview:session:{id}:answers")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (raw, answers): (Option<String>, Vec<String>) = redis::pipe()
            .cmd("GET")
            .arg(Self::key(id))
            .cmd("LRANGE")
            .arg(Self::answers_key(id))
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut session: InterviewSession = serde_json::from_str(&raw)?;
        session.answers = answers
            .iter()
            .map(|a| serde_json::from_str(a))
            .collect::<Result<_, _>>()?;
        Ok(Some(session))
    }

    async fn save(&self, session: &InterviewSession) -> Result<(), SessionError> {
        let json = serde_json::to_string(session)?;
        let answers = session
            .answers
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let answers_key = Self::answers_key(session.id);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(Self::key(session.id))
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .ignore()
            .cmd("DEL")
            .arg(&answers_key)
            .ignore();
        if !answers.is_empty() {
            pipe.cmd("RPUSH")
                .arg(&answers_key)
                .arg(answers)
                .ignore()
                .cmd("EXPIRE")
                .arg(&answers_key)
                .arg(self.ttl_secs)
                .ignore();
        }

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        pipe.query_async::<_, ()>(&mut conn).await?;

        debug!(
            "Saved session {} ({} questions, {} answers)",
            session.id,
            session.questions.len(),
            session.answers.len()
        );
        Ok(())
    }

    async fn append_answer(
        &self,
        id: Uuid,
        question_index: usize,
        answer: &str,
    ) -> Result<Option<usize>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(id))
            .query_async(&mut conn)
            .await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        // Questions never change after creation, so validating against this read is safe.
        let session: InterviewSession = serde_json::from_str(&raw)?;
        let entry = serde_json::to_string(&session.answer_to(question_index, answer)?)?;

        let answers_key = Self::answers_key(id);
        let (recorded,): (usize,) = redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(&answers_key)
            .arg(entry)
            .cmd("EXPIRE")
            .arg(&answers_key)
            .arg(self.ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!("Recorded answer {recorded} for session {id} (question {question_index})");
        Ok(Some(recorded))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (removed,): (i64,) = redis::pipe()
            .cmd("DEL")
            .arg(Self::key(id))
            .cmd("DEL")
            .arg(Self::answers_key(id))
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}

/// In-process store for handler and router tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: tokio::sync::Mutex<std::collections::HashMap<Uuid, InterviewSession>>,
}

#[cfg(test)]
#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, SessionError> {
        Ok(self.sessions.lock().await.get(&id).cloned())
    }

    async fn save(&self, session: &InterviewSession) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn append_answer(
        &self,
        id: Uuid,
        question_index: usize,
        answer: &str,
    ) -> Result<Option<usize>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(None);
        };
        session.record_answer(question_index, answer)?;
        Ok(Some(session.answers.len()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SessionError> {
        Ok(self.sessions.lock().await.remove(&id).is_some())
    }
}
