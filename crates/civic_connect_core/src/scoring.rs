//! crates/civic_connect_core/src/scoring.rs
//!
//! The offline `PriorityScorer` used when no external scoring credential is
//! configured. It never fails and never touches the network.

use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::domain::{Assessment, ScoringRequest};
use crate::ports::{PortResult, PriorityScorer, ScoringMode};

pub const FALLBACK_SCORE_RANGE: RangeInclusive<u8> = 40..=80;
pub const FALLBACK_DEPARTMENT: &str = "General Services";
pub const FALLBACK_TIMEFRAME: &str = "Pending Review";
pub const FALLBACK_ACTION: &str = "Manual review and assignment required.";
pub const FALLBACK_SUMMARY: &str = "No live AI assessment was performed because the scoring service is not configured. This score is a placeholder pending manual review.";

/// Scores reports with a bounded pseudo-random value and placeholder text.
///
/// The random source is injected so tests (or a `FALLBACK_SEED`) can pin the
/// produced scores.
pub struct FallbackScorer<R = Xoshiro256PlusPlus> {
    rng: Mutex<R>,
}

impl FallbackScorer {
    pub fn from_entropy() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Xoshiro256PlusPlus::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> FallbackScorer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn draw_score(&self) -> u8 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(FALLBACK_SCORE_RANGE)
    }
}

#[async_trait]
impl<R: RngCore + Send> PriorityScorer for FallbackScorer<R> {
    async fn assess(&self, request: &ScoringRequest<'_>) -> PortResult<Assessment> {
        let score = self.draw_score();
        debug!(
            category = %request.category,
            score,
            "Using placeholder assessment, no scoring credential configured"
        );

        Ok(Assessment {
            score,
            summary: FALLBACK_SUMMARY.to_string(),
            department: FALLBACK_DEPARTMENT.to_string(),
            recommended_action: FALLBACK_ACTION.to_string(),
            resolution_timeframe: FALLBACK_TIMEFRAME.to_string(),
        })
    }

    fn mode(&self) -> ScoringMode {
        ScoringMode::Fallback
    }
}
