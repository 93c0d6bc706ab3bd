//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the account store and the submission ledger, both in memory behind
//! `RwLock`s, plus the parsed server config.

use std::sync::Arc;

use solvency::model::{Review, ReviewState, Submission, SubmissionRecord};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::services::accounts::AccountStore;

/// A recorded submission with the server-side time it was accepted and,
/// once a regulator has acted on it, the review.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub submission: Submission,
    pub recorded_at: OffsetDateTime,
    pub insurer_id: Option<String>,
    pub review: Option<Review>,
}

impl LedgerEntry {
    #[must_use]
    pub fn new(submission: Submission, recorded_at: OffsetDateTime, insurer_id: Option<String>) -> Self {
        Self { submission, recorded_at, insurer_id, review: None }
    }

    #[must_use]
    pub fn review_state(&self) -> ReviewState {
        self.review.as_ref().map_or(ReviewState::Pending, |r| r.decision.outcome())
    }

    #[must_use]
    pub fn to_record(&self) -> SubmissionRecord {
        SubmissionRecord {
            submission: self.submission.clone(),
            insurer_id: self.insurer_id.clone(),
            review_state: self.review_state(),
            submitted_at: self.recorded_at,
            review: self.review.clone(),
        }
    }
}

/// Shared application state. Clone is required by Axum; inner fields are
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub accounts: Arc<RwLock<AccountStore>>,
    /// Submissions in acceptance order (oldest first).
    pub ledger: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, accounts: AccountStore) -> Self {
        Self {
            config: Arc::new(config),
            accounts: Arc::new(RwLock::new(accounts)),
            ledger: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// State seeded from the predefined directory.
    #[must_use]
    pub fn seeded(config: ServerConfig) -> Self {
        let accounts = AccountStore::seeded(config.seed_password.as_deref());
        Self::new(config, accounts)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
