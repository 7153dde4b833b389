pub mod domain;
pub mod ports;
pub mod scoring;
pub mod stats;
pub mod store;

pub use domain::{
    Assessment, Location, Report, ReportCategory, ReportDraft, ReportStatus, Requester, Role,
    ScoringRequest, UserCredentials,
};
pub use ports::{
    IdentityProvider, PortError, PortResult, PriorityScorer, ReportSource, ScoringMode,
};
pub use scoring::FallbackScorer;
pub use stats::{CategoryCount, ReportStats};
pub use store::{LoadState, ReportStore, ReportsSnapshot};
