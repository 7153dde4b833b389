//! services/api/src/adapters/seed.rs
//!
//! A `ReportSource` that serves a fixed set of demo reports after a short
//! delay, standing in for the initial fetch from a backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as TimeDelta, Utc};
use civic_connect_core::{
    domain::{Location, Report, ReportCategory, ReportStatus},
    ports::{PortResult, ReportSource},
};
use tracing::info;
use uuid::Uuid;

pub struct SeedReportSource {
    delay: Duration,
}

impl SeedReportSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

struct SeedRow {
    title: &'static str,
    description: &'static str,
    category: ReportCategory,
    address: &'static str,
    coordinates: (f64, f64),
    image: &'static str,
    age_hours: i64,
    upvotes: u32,
    status: ReportStatus,
    ai_score: u8,
    ai_summary: &'static str,
    admin_notified: bool,
}

static SEED_ROWS: [SeedRow; 5] = [
    SeedRow {
        title: "Massive Pothole on Main St",
        description: "A very large and dangerous pothole has formed in the right lane of Main Street, right in front of the public library. It has already caused a flat tire.",
        category: ReportCategory::Pothole,
        address: "123 Main St, Anytown, USA",
        coordinates: (-74.0060, 40.7128),
        image: "https://picsum.photos/seed/pothole1/800/600",
        age_hours: 24,
        upvotes: 15,
        status: ReportStatus::Open,
        ai_score: 85,
        ai_summary: "A large, hazardous pothole on a major street poses a significant and immediate risk to vehicle safety. Recommend immediate dispatch for temporary patching and assessment for permanent repair.",
        admin_notified: true,
    },
    SeedRow {
        title: "Overflowing Trash Cans at City Park",
        description: "All the trash cans near the playground at City Park are overflowing. There is litter all over the ground, which is unsanitary and attracting pests.",
        category: ReportCategory::Garbage,
        address: "456 Oak Ave, Anytown, USA",
        coordinates: (-74.0120, 40.7150),
        image: "https://picsum.photos/seed/trash2/800/600",
        age_hours: 48,
        upvotes: 8,
        status: ReportStatus::InProgress,
        ai_score: 65,
        ai_summary: "Overflowing garbage cans in a public park create a sanitation hazard. Public Works should prioritize cleanup to maintain park hygiene and public health.",
        admin_notified: true,
    },
    SeedRow {
        title: "Streetlight out on 5th and Elm",
        description: "The streetlight at the corner of 5th Avenue and Elm Street is completely out. It's a busy intersection and very dark at night, making it unsafe for pedestrians.",
        category: ReportCategory::BrokenStreetlight,
        address: "5th Ave & Elm St, Anytown, USA",
        coordinates: (-73.9980, 40.7200),
        image: "https://picsum.photos/seed/light3/800/600",
        age_hours: 120,
        upvotes: 22,
        status: ReportStatus::Open,
        ai_score: 78,
        ai_summary: "A non-functional streetlight at a busy intersection presents a public safety risk, increasing the danger for both pedestrians and drivers at night. Assign to the Electrical department for urgent repair.",
        admin_notified: true,
    },
    SeedRow {
        title: "Graffiti on community center wall",
        description: "Someone has spray-painted graffiti all over the west wall of the Southside Community Center.",
        category: ReportCategory::Graffiti,
        address: "789 South St, Anytown, USA",
        coordinates: (-74.0050, 40.7050),
        image: "https://picsum.photos/seed/graffiti4/800/600",
        age_hours: 240,
        upvotes: 3,
        status: ReportStatus::Resolved,
        ai_score: 35,
        ai_summary: "Vandalism in the form of graffiti on a public building affects community aesthetics. The issue is of low urgency but should be scheduled for removal by Public Works to deter further defacement.",
        admin_notified: false,
    },
    SeedRow {
        title: "Large fallen tree branch blocking sidewalk",
        description: "After the storm last night, a very large tree branch has fallen and is completely blocking the sidewalk on Pine Street. Pedestrians have to walk in the road.",
        category: ReportCategory::FallenTree,
        address: "321 Pine St, Anytown, USA",
        coordinates: (-73.9900, 40.7250),
        image: "https://picsum.photos/seed/tree5/800/600",
        age_hours: 12,
        upvotes: 30,
        status: ReportStatus::Open,
        ai_score: 92,
        ai_summary: "A fallen tree obstructing a public sidewalk forces pedestrians into the street, creating an immediate safety hazard. Parks and Recreation or Public Works should be dispatched immediately to clear the obstruction.",
        admin_notified: true,
    },
];

impl SeedRow {
    fn to_domain(&self, index: usize) -> Report {
        let (longitude, latitude) = self.coordinates;
        Report {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            category: self.category,
            address: self.address.to_string(),
            location: Location::new(longitude, latitude),
            images: vec![self.image.to_string()],
            created_at: Utc::now() - TimeDelta::hours(self.age_hours),
            // Demo authors are not real accounts.
            created_by: Uuid::from_u128(index as u128 + 1),
            upvotes: self.upvotes,
            upvoters: Vec::new(),
            status: self.status,
            ai_score: self.ai_score,
            ai_summary: self.ai_summary.to_string(),
            admin_notified: self.admin_notified,
        }
    }
}

#[async_trait]
impl ReportSource for SeedReportSource {
    async fn fetch_reports(&self) -> PortResult<Vec<Report>> {
        tokio::time::sleep(self.delay).await;
        let reports: Vec<Report> = SEED_ROWS
            .iter()
            .enumerate()
            .map(|(i, row)| row.to_domain(i))
            .collect();
        info!(count = reports.len(), "Loaded demo reports");
        Ok(reports)
    }
}
