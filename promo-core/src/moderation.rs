//! Seller applications for promotion slots and the moderation rules.
//!
//! Sellers who win or buy a slot submit a product; an admin approves or
//! rejects each application. Applications flagged with stop factors
//! (tobacco, alcohol, ...) always need a human decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{SegmentId, SlotId};

/// Remote identifier of a moderation application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ApplicationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Case-insensitive; `None` for anything the service should not send.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seller's product submitted for one slot of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub seller_id: i64,
    pub segment_id: SegmentId,
    pub slot_id: SlotId,
    pub product_name: String,
    pub price: i64,
    pub discount: i64,
    #[serde(default)]
    pub stop_factors: Vec<String>,
    pub status: ApplicationStatus,
}

impl Application {
    /// Pending and nothing flagged: safe to approve without review.
    pub fn is_clean_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending && self.stop_factors.is_empty()
    }
}

/// Counts per status over a list of applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModerationStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

pub fn statistics(applications: &[Application]) -> ModerationStats {
    let mut stats = ModerationStats {
        total: applications.len(),
        ..ModerationStats::default()
    };
    for app in applications {
        match app.status {
            ApplicationStatus::Pending => stats.pending += 1,
            ApplicationStatus::Approved => stats.approved += 1,
            ApplicationStatus::Rejected => stats.rejected += 1,
        }
    }
    stats
}

/// Applications with `status`, or all of them for `None`. Order is kept.
pub fn filter_by_status(
    applications: &[Application],
    status: Option<ApplicationStatus>,
) -> Vec<&Application> {
    applications
        .iter()
        .filter(|app| status.map_or(true, |s| app.status == s))
        .collect()
}

/// Identifiers a bulk approval may touch: pending applications without stop
/// factors, in list order.
pub fn approvable(applications: &[Application]) -> Vec<ApplicationId> {
    applications
        .iter()
        .filter(|app| app.is_clean_pending())
        .map(|app| app.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: i64, status: ApplicationStatus, stop_factors: &[&str]) -> Application {
        Application {
            id: ApplicationId(id),
            seller_id: 123,
            segment_id: SegmentId(5),
            slot_id: SlotId(id),
            product_name: format!("product {id}"),
            price: 3990,
            discount: 33,
            stop_factors: stop_factors.iter().map(|s| s.to_string()).collect(),
            status,
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(ApplicationStatus::parse(" Approved "), Some(ApplicationStatus::Approved));
        assert_eq!(ApplicationStatus::parse("moderation"), None);
        assert_eq!(ApplicationStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn bulk_approval_skips_flagged_and_decided() {
        use ApplicationStatus::*;
        let apps = vec![
            app(1, Pending, &[]),
            app(2, Pending, &["Алкоголь"]),
            app(3, Approved, &[]),
            app(4, Rejected, &[]),
            app(5, Pending, &[]),
        ];
        assert_eq!(approvable(&apps), vec![ApplicationId(1), ApplicationId(5)]);
    }

    #[test]
    fn statistics_and_filter_agree() {
        use ApplicationStatus::*;
        let apps = vec![
            app(1, Pending, &[]),
            app(2, Approved, &[]),
            app(3, Pending, &["Оружие"]),
        ];
        let stats = statistics(&apps);
        assert_eq!(
            stats,
            ModerationStats {
                pending: 2,
                approved: 1,
                rejected: 0,
                total: 3
            }
        );
        for status in ApplicationStatus::ALL {
            let count = filter_by_status(&apps, Some(status)).len();
            let expected = match status {
                Pending => stats.pending,
                Approved => stats.approved,
                Rejected => stats.rejected,
            };
            assert_eq!(count, expected);
        }
        assert_eq!(filter_by_status(&apps, None).len(), stats.total);
    }
}
