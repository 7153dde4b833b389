//! crates/civic_connect_core/src/store.rs
//!
//! The authoritative in-memory sequence of reports.
//!
//! The collection is held as an `Arc<Vec<Report>>` and replaced copy-on-write,
//! so a snapshot handed to a reader never changes underneath it. The lock is
//! never held across the scorer call.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Report, ReportDraft, ReportStatus, Requester};
use crate::ports::{PortError, PortResult, PriorityScorer, ReportSource, ScoringMode};
use crate::stats::ReportStats;

/// Lifecycle of the store's initial population. Never goes back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

/// What a reader sees: either "no data yet" or a stable snapshot.
#[derive(Debug, Clone)]
pub enum ReportsSnapshot {
    Loading,
    Ready(Arc<Vec<Report>>),
}

struct Inner {
    state: LoadState,
    // Most recent first.
    reports: Arc<Vec<Report>>,
}

pub struct ReportStore {
    scorer: Arc<dyn PriorityScorer>,
    inner: RwLock<Inner>,
}

impl ReportStore {
    pub fn new(scorer: Arc<dyn PriorityScorer>) -> Self {
        Self {
            scorer,
            inner: RwLock::new(Inner {
                state: LoadState::Uninitialized,
                reports: Arc::new(Vec::new()),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        self.scorer.mode()
    }

    pub fn load_state(&self) -> LoadState {
        self.read().state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state() != LoadState::Ready
    }

    pub fn reports(&self) -> ReportsSnapshot {
        let inner = self.read();
        match inner.state {
            LoadState::Ready => ReportsSnapshot::Ready(Arc::clone(&inner.reports)),
            LoadState::Uninitialized | LoadState::Loading => ReportsSnapshot::Loading,
        }
    }

    /// A single report. Like `reports`, answers `NotReady` until the initial
    /// load has completed.
    pub fn get(&self, report_id: Uuid) -> PortResult<Report> {
        match self.reports() {
            ReportsSnapshot::Ready(reports) => reports
                .iter()
                .find(|r| r.id == report_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Report {} not found", report_id))),
            ReportsSnapshot::Loading => Err(PortError::NotReady),
        }
    }

    /// Dashboard statistics over the ready collection.
    pub fn stats(&self) -> PortResult<ReportStats> {
        match self.reports() {
            ReportsSnapshot::Ready(reports) => Ok(ReportStats::from_reports(&reports)),
            ReportsSnapshot::Loading => Err(PortError::NotReady),
        }
    }

    /// Runs the one-time initial population.
    ///
    /// Only the first call does anything. Reports created while the load is in
    /// flight stay ahead of the fetched ones. If the source fails the store drops
    /// back to `Uninitialized` so the load can be attempted again.
    pub async fn load(&self, source: &dyn ReportSource) -> PortResult<()> {
        {
            let mut inner = self.write();
            if inner.state != LoadState::Uninitialized {
                debug!(state = ?inner.state, "Initial report load already started, skipping");
                return Ok(());
            }
            inner.state = LoadState::Loading;
        }

        match source.fetch_reports().await {
            Ok(fetched) => {
                let mut inner = self.write();
                let fetched_count = fetched.len();
                let mut merged = Vec::with_capacity(inner.reports.len() + fetched_count);
                merged.extend(inner.reports.iter().cloned());
                merged.extend(fetched);
                inner.reports = Arc::new(merged);
                inner.state = LoadState::Ready;
                info!(fetched_count, total = inner.reports.len(), "Report store is ready");
                Ok(())
            }
            Err(e) => {
                self.write().state = LoadState::Uninitialized;
                warn!(error = %e, "Initial report load failed");
                Err(e)
            }
        }
    }

    /// Scores a draft and prepends the resulting report.
    ///
    /// Either a fully formed report is added or nothing changes.
    pub async fn create(
        &self,
        draft: ReportDraft,
        requester: Option<&Requester>,
    ) -> PortResult<Report> {
        let requester = requester.ok_or(PortError::Unauthenticated)?;
        draft.validate()?;

        let assessment = self.scorer.assess(&draft.scoring_request()).await.map_err(|e| {
            warn!(error = %e, user_id = %requester.id, "Report scoring failed, nothing stored");
            e
        })?;
        debug!(
            department = %assessment.department,
            score = assessment.score,
            "Received assessment"
        );

        let report = Report::from_submission(draft, requester, &assessment);
        Arc::make_mut(&mut self.write().reports).insert(0, report.clone());

        info!(
            report_id = %report.id,
            user_id = %requester.id,
            ai_score = report.ai_score,
            "Report created"
        );
        Ok(report)
    }

    /// Replaces the status of one report, leaving everything else untouched.
    ///
    /// An unknown id is reported as `NotFound`; the collection is not modified.
    pub fn update_status(&self, report_id: Uuid, status: ReportStatus) -> PortResult<Report> {
        let mut inner = self.write();
        let index = inner
            .reports
            .iter()
            .position(|r| r.id == report_id)
            .ok_or_else(|| PortError::NotFound(format!("Report {} not found", report_id)))?;

        let reports = Arc::make_mut(&mut inner.reports);
        let previous = reports[index].status;
        reports[index].status = status;
        let updated = reports[index].clone();

        info!(%report_id, from = %previous, to = %status, "Report status updated");
        Ok(updated)
    }
}
