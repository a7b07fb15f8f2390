//! Result type for operations that can fall back to a deterministic value.
//!
//! A generative call that fails (or returns something unusable) does not have to be an
//! error: behavioral questions fall back to canned text and feedback falls back to the
//! score-band lookup. `Outcome` keeps that degradation visible to the caller instead of
//! hiding it behind a swallowed error.

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The primary path produced the value.
    Ok(T),
    /// The primary path failed; `value` is the fallback and `reason` says why.
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// The degradation reason, if the fallback was used.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Splits into the value and an optional degradation reason.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Outcome::Ok(value) => (value, None),
            Outcome::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}
