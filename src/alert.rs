//! Alert record and lifecycle state machine.

use crate::aggregate::Severity;
use crate::explain::Explanation;
use crate::typology::Typology;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Alert lifecycle states: `Generated -> UnderReview ->
/// Investigated -> (Dismissed | Escalated -> StorFiled)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Generated,
    UnderReview,
    Investigated,
    Dismissed,
    Escalated,
    StorFiled,
}

impl AlertStatus {
    /// Whether `next` is a valid transition target from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: AlertStatus) -> bool {
        use AlertStatus::{Dismissed, Escalated, Generated, Investigated, StorFiled, UnderReview};
        matches!(
            (self, next),
            (Generated, UnderReview)
                | (UnderReview, Investigated)
                | (Investigated, Dismissed)
                | (Investigated, Escalated)
                | (Escalated, StorFiled)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, AlertStatus::Dismissed | AlertStatus::StorFiled)
    }
}

/// An error raised attempting an illegal lifecycle transition.
#[derive(Debug, Clone)]
pub struct InvalidTransition {
    pub from: AlertStatus,
    pub to: AlertStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot transition alert from {:?} to {:?}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// A generated alert: the immutable analytical payload plus its mutable
/// lifecycle status.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub typology: Typology,
    pub severity: Severity,
    pub explanation: Explanation,
    pub generated_at: DateTime<Utc>,
    pub status: AlertStatus,
    pub status_history: Vec<(AlertStatus, DateTime<Utc>)>,
}

impl Alert {
    #[must_use]
    pub fn new(typology: Typology, severity: Severity, explanation: Explanation, generated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            typology,
            severity,
            explanation,
            generated_at,
            status: AlertStatus::Generated,
            status_history: vec![(AlertStatus::Generated, generated_at)],
        }
    }

    /// Attempt a lifecycle transition, recording it in `status_history` on
    /// success.
    pub fn transition(&mut self, next: AlertStatus, at: DateTime<Utc>) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition { from: self.status, to: next });
        }
        self.status = next;
        self.status_history.push((next, at));
        Ok(())
    }
}
