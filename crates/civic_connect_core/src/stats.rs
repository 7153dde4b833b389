//! crates/civic_connect_core/src/stats.rs
//!
//! Aggregates shown on the admin dashboard.

use crate::domain::{Report, ReportCategory, ReportStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: ReportCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    pub pending: usize,
    pub resolved: usize,
    /// Most reported category. Ties go to the category seen first in list order.
    pub top_category: Option<CategoryCount>,
}

impl ReportStats {
    pub fn from_reports(reports: &[Report]) -> Self {
        let resolved = reports
            .iter()
            .filter(|r| r.status == ReportStatus::Resolved)
            .count();

        // Kept in first-seen order so the tie-break is stable.
        let mut counts: Vec<CategoryCount> = Vec::new();
        for report in reports {
            match counts.iter_mut().find(|c| c.category == report.category) {
                Some(entry) => entry.count += 1,
                None => counts.push(CategoryCount {
                    category: report.category,
                    count: 1,
                }),
            }
        }

        let top_category = counts.into_iter().fold(None, |best: Option<CategoryCount>, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        });

        Self {
            total: reports.len(),
            pending: reports.len() - resolved,
            resolved,
            top_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use chrono::Utc;
    use uuid::Uuid;

    fn report(category: ReportCategory, status: ReportStatus) -> Report {
        Report {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            category,
            address: "a".to_string(),
            location: Location::new(0.0, 0.0),
            images: vec![],
            created_at: Utc::now(),
            created_by: Uuid::new_v4(),
            upvotes: 0,
            upvoters: vec![],
            status,
            ai_score: 50,
            ai_summary: String::new(),
            admin_notified: false,
        }
    }

    #[test]
    fn test_empty_list() {
        let stats = ReportStats::from_reports(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.resolved, 0);
        assert!(stats.top_category.is_none());
    }

    #[test]
    fn test_pending_counts_open_and_in_progress() {
        let reports = vec![
            report(ReportCategory::Pothole, ReportStatus::Open),
            report(ReportCategory::Garbage, ReportStatus::InProgress),
            report(ReportCategory::Garbage, ReportStatus::Resolved),
        ];
        let stats = ReportStats::from_reports(&reports);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.resolved, 1);
        assert_eq!(
            stats.top_category,
            Some(CategoryCount {
                category: ReportCategory::Garbage,
                count: 2
            })
        );
    }

    #[test]
    fn test_top_category_tie_goes_to_first_seen() {
        let reports = vec![
            report(ReportCategory::Graffiti, ReportStatus::Open),
            report(ReportCategory::Pothole, ReportStatus::Open),
        ];
        let stats = ReportStats::from_reports(&reports);
        assert_eq!(stats.top_category.unwrap().category, ReportCategory::Graffiti);
    }
}
