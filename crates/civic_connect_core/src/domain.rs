//! crates/civic_connect_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ports::PortError;

//=========================================================================================
// Enumerations
//=========================================================================================

/// The kind of civic issue a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportCategory {
    Pothole,
    Garbage,
    WaterLeak,
    Graffiti,
    BrokenStreetlight,
    FallenTree,
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 7] = [
        ReportCategory::Pothole,
        ReportCategory::Garbage,
        ReportCategory::WaterLeak,
        ReportCategory::Graffiti,
        ReportCategory::BrokenStreetlight,
        ReportCategory::FallenTree,
        ReportCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Pothole => "pothole",
            ReportCategory::Garbage => "garbage",
            ReportCategory::WaterLeak => "water-leak",
            ReportCategory::Graffiti => "graffiti",
            ReportCategory::BrokenStreetlight => "broken-streetlight",
            ReportCategory::FallenTree => "fallen-tree",
            ReportCategory::Other => "other",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCategory {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| PortError::InvalidInput(format!("Unknown report category '{}'", s)))
    }
}

/// Triage state of a report. Any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    Open,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Open and in-progress reports both count as pending work.
    pub fn is_pending(&self) -> bool {
        !matches!(self, ReportStatus::Resolved)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ReportStatus::Open),
            "in-progress" => Ok(ReportStatus::InProgress),
            "resolved" => Ok(ReportStatus::Resolved),
            other => Err(PortError::InvalidInput(format!(
                "Unknown report status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// The authenticated identity attempting a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Only used inside the identity provider - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: Requester,
    pub hashed_password: String,
}

//=========================================================================================
// Reports
//=========================================================================================

/// A point on the map, stored as longitude/latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// User-supplied report fields, before id, timestamps and score are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub address: String,
    pub location: Location,
    pub images: Vec<String>,
}

impl ReportDraft {
    /// Checks that every descriptive field is filled in and the location is on the globe.
    pub fn validate(&self) -> Result<(), PortError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("address", &self.address),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(PortError::InvalidInput(format!("The {} must not be empty", name)));
        }
        if !self.location.is_valid() {
            return Err(PortError::InvalidInput(format!(
                "Location ({}, {}) is out of range",
                self.location.longitude, self.location.latitude
            )));
        }
        Ok(())
    }

    /// The subset of the draft the priority scorer gets to see.
    pub fn scoring_request(&self) -> ScoringRequest<'_> {
        ScoringRequest {
            title: &self.title,
            description: &self.description,
            category: self.category,
            address: &self.address,
        }
    }
}

/// Input to a `PriorityScorer`. Authorship is deliberately not part of it.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: ReportCategory,
    pub address: &'a str,
}

/// The scorer's structured output. Consumed immediately to build a `Report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: u8,
    pub summary: String,
    pub department: String,
    pub recommended_action: String,
    pub resolution_timeframe: String,
}

impl Assessment {
    pub const MAX_SCORE: u8 = 100;

    /// Rounds a raw score to an integer and clamps it into `0..=100`.
    pub fn clamp_score(raw: f64) -> u8 {
        if raw.is_nan() {
            return 0;
        }
        raw.round().clamp(0.0, f64::from(Self::MAX_SCORE)) as u8
    }

    /// The narrative persisted on the report: summary, action and timeframe.
    pub fn report_summary(&self) -> String {
        format!(
            "{} Action: {}. Timeframe: {}.",
            self.summary.trim(),
            self.recommended_action.trim().trim_end_matches('.'),
            self.resolution_timeframe.trim().trim_end_matches('.')
        )
    }
}

/// A submitted civic-issue report. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub address: String,
    pub location: Location,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub upvotes: u32,
    pub upvoters: Vec<Uuid>,
    pub status: ReportStatus,
    pub ai_score: u8,
    pub ai_summary: String,
    pub admin_notified: bool,
}

impl Report {
    /// Materializes a freshly submitted report from its draft and assessment.
    pub fn from_submission(draft: ReportDraft, requester: &Requester, assessment: &Assessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            address: draft.address,
            location: draft.location,
            images: draft.images,
            created_at: Utc::now(),
            created_by: requester.id,
            upvotes: 1,
            upvoters: vec![requester.id],
            status: ReportStatus::Open,
            ai_score: assessment.score.min(Assessment::MAX_SCORE),
            ai_summary: assessment.report_summary(),
            admin_notified: false,
        }
    }
}
