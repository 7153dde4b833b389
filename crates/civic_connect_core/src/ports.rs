//! crates/civic_connect_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like LLM providers or
//! identity backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Assessment, Report, Requester, ScoringRequest};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and store operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("A signed-in user is required")]
    Unauthenticated,
    #[error("Forbidden")]
    Forbidden,
    #[error("The external scoring service failed: {0}")]
    ExternalService(String),
    #[error("The external scoring service returned an invalid assessment: {0}")]
    InvalidAssessmentShape(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Reports are still loading")]
    NotReady,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Both live-scoring failure kinds look the same to a submitting user.
    pub fn is_scoring_failure(&self) -> bool {
        matches!(
            self,
            PortError::ExternalService(_) | PortError::InvalidAssessmentShape(_)
        )
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Which path a scorer takes; fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Live,
    Fallback,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Live => "live",
            ScoringMode::Fallback => "fallback",
        }
    }
}

#[async_trait]
pub trait PriorityScorer: Send + Sync {
    /// Produces a priority assessment for a draft's descriptive fields.
    async fn assess(&self, request: &ScoringRequest<'_>) -> PortResult<Assessment>;

    fn mode(&self) -> ScoringMode;
}

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetches the reports the store starts out with.
    async fn fetch_reports(&self) -> PortResult<Vec<Report>>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    // --- Accounts ---
    async fn register(&self, name: &str, email: &str, password: &str) -> PortResult<Requester>;

    async fn authenticate(&self, email: &str, password: &str) -> PortResult<Requester>;

    // --- Auth Sessions ---
    async fn create_auth_session(&self, user_id: Uuid) -> PortResult<String>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Requester>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
