pub mod identity;
pub mod scoring_llm;
pub mod seed;

pub use identity::{InMemoryIdentityProvider, SeedUser};
pub use scoring_llm::{scoring_client, OpenAiScoringAdapter};
pub use seed::SeedReportSource;

use std::sync::Arc;

use civic_connect_core::{ports::PriorityScorer, scoring::FallbackScorer};
use tracing::{info, warn};

use crate::config::Config;

/// Picks the scoring mode once, at startup, from the presence of a credential.
pub fn build_scorer(config: &Config) -> Arc<dyn PriorityScorer> {
    match &config.scoring_api_key {
        Some(api_key) => {
            info!(
                model = %config.scoring_model,
                api_base = %config.scoring_api_base,
                "Live AI scoring enabled"
            );
            Arc::new(OpenAiScoringAdapter::new(
                scoring_client(api_key, &config.scoring_api_base),
                config.scoring_model.clone(),
                config.scoring_temperature,
                config.scoring_timeout,
            ))
        }
        None => {
            warn!("SCORING_API_KEY not found. AI scoring will use the fallback scorer for this session.");
            match config.fallback_seed {
                Some(seed) => Arc::new(FallbackScorer::with_seed(seed)),
                None => Arc::new(FallbackScorer::from_entropy()),
            }
        }
    }
}
