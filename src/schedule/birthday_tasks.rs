use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use super::platform::{Announcement, BirthdayPlatform};
use crate::error::BirthdayError;
use crate::registry::{BirthdayRecord, Registry};
use crate::utils::datetime::{get_month_name, matches_birthday};
use crate::utils::role_logic::calculate_role_changes;

/// Outcome of one daily reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub celebrants: Vec<String>,
    pub announced: Vec<String>,
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
    /// Celebrants whose identity could not be resolved
    pub skipped: Vec<String>,
    pub failures: usize,
}

impl ReconcileReport {
    /// One-line count of everything the run did
    pub fn summary(&self) -> String {
        format!(
            "{} celebrant(s), {} announced, {} granted, {} revoked, {} skipped, {} failure(s)",
            self.celebrants.len(),
            self.announced.len(),
            self.granted.len(),
            self.revoked.len(),
            self.skipped.len(),
            self.failures
        )
    }
}

/// Announce today's birthdays and reconcile the birthday role.
///
/// The registry is re-read from disk first. Every celebrant is announced and
/// granted the role; every other holder loses it. A failure for one user is
/// logged and counted without stopping the others. Only a failed registry
/// reload aborts the run.
pub async fn run_birthday_reconciliation<P>(
    platform: &P,
    registry: &Registry,
    now: DateTime<Tz>,
) -> Result<ReconcileReport, BirthdayError>
where
    P: BirthdayPlatform + ?Sized,
{
    let records = registry.reload().await?;
    let today = now.date_naive();

    info!(
        "Checking birthdays for {} {} among {} registered user(s)",
        today.day(),
        get_month_name(today.month()),
        records.len()
    );

    let celebrants: Vec<BirthdayRecord> = records
        .into_iter()
        .filter(|r| matches_birthday(r.day, r.month, today))
        .collect();
    let celebrant_ids: Vec<String> = celebrants.iter().map(|r| r.user_id.clone()).collect();

    let mut report = ReconcileReport {
        celebrants: celebrant_ids.clone(),
        ..Default::default()
    };

    // Without the holder list, grant to every celebrant and leave revocation for tomorrow
    let changes = match platform.role_holders().await {
        Ok(holders) => {
            let changes = calculate_role_changes(&celebrant_ids, &holders);
            if changes.is_empty() {
                debug!("Birthday role holders already match today's celebrants");
            }
            Some(changes)
        }
        Err(e) => {
            error!("Failed to list birthday role holders: {}", e);
            report.failures += 1;
            None
        }
    };

    if celebrants.is_empty() {
        info!("No birthdays found for today");
    } else {
        info!("Found {} birthday(s) today", celebrants.len());
    }

    for record in &celebrants {
        let name = match platform.resolve_user(&record.user_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping birthday of user {}: {}", record.user_id, e);
                report.skipped.push(record.user_id.clone());
                report.failures += 1;
                continue;
            }
        };

        let announcement = Announcement {
            user_id: record.user_id.clone(),
            name,
            age: today.year() - record.year,
        };
        match platform.announce(&announcement).await {
            Ok(()) => {
                info!("Announced birthday for {}", announcement.name);
                report.announced.push(record.user_id.clone());
            }
            Err(e) => {
                error!("Failed to announce birthday of user {}: {}", record.user_id, e);
                report.failures += 1;
            }
        }

        let needs_role = changes
            .as_ref()
            .is_none_or(|c| c.to_grant.contains(&record.user_id));
        if !needs_role {
            continue;
        }

        match platform.grant_role(&record.user_id).await {
            Ok(()) => {
                info!("Added birthday role to user {}", record.user_id);
                report.granted.push(record.user_id.clone());
            }
            Err(e) => {
                error!("Failed to add birthday role to user {}: {}", record.user_id, e);
                report.failures += 1;
            }
        }
    }

    for user_id in changes.map(|c| c.to_revoke).unwrap_or_default() {
        match platform.revoke_role(&user_id).await {
            Ok(()) => {
                info!("Removed birthday role from user {}", user_id);
                report.revoked.push(user_id);
            }
            Err(e) => {
                error!("Failed to remove birthday role from user {}: {}", user_id, e);
                report.failures += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::JsonStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Mutex;

    /// In-memory platform recording every call
    #[derive(Default)]
    struct FakePlatform {
        holders: Mutex<BTreeSet<String>>,
        announcements: Mutex<Vec<Announcement>>,
        unknown_users: HashSet<String>,
        failing_announcements: HashSet<String>,
        failing_revocations: HashSet<String>,
        holders_unavailable: bool,
    }

    impl FakePlatform {
        fn with_holders(ids: &[&str]) -> Self {
            Self {
                holders: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }

        fn holders(&self) -> Vec<String> {
            self.holders.lock().unwrap().iter().cloned().collect()
        }

        fn announcements(&self) -> Vec<Announcement> {
            self.announcements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BirthdayPlatform for FakePlatform {
        async fn resolve_user(&self, user_id: &str) -> Result<String, BirthdayError> {
            if self.unknown_users.contains(user_id) {
                return Err(BirthdayError::IdentityResolutionFailed {
                    user_id: user_id.to_string(),
                    reason: "Unknown User".to_string(),
                });
            }
            Ok(format!("user{}", user_id))
        }

        async fn announce(&self, announcement: &Announcement) -> Result<(), BirthdayError> {
            if self.failing_announcements.contains(&announcement.user_id) {
                return Err(BirthdayError::DeliveryFailed("Missing Access".to_string()));
            }
            self.announcements.lock().unwrap().push(announcement.clone());
            Ok(())
        }

        async fn role_holders(&self) -> Result<Vec<String>, BirthdayError> {
            if self.holders_unavailable {
                return Err(BirthdayError::ChannelResolutionFailed {
                    channel_id: "1".to_string(),
                    reason: "Unknown Channel".to_string(),
                });
            }
            Ok(self.holders())
        }

        async fn grant_role(&self, user_id: &str) -> Result<(), BirthdayError> {
            self.holders.lock().unwrap().insert(user_id.to_string());
            Ok(())
        }

        async fn revoke_role(&self, user_id: &str) -> Result<(), BirthdayError> {
            if self.failing_revocations.contains(user_id) {
                return Err(BirthdayError::RoleUpdateFailed {
                    user_id: user_id.to_string(),
                    reason: "Missing Permissions".to_string(),
                });
            }
            self.holders.lock().unwrap().remove(user_id);
            Ok(())
        }
    }

    fn day(month: u32, day: u32) -> DateTime<Tz> {
        chrono_tz::GMT.with_ymd_and_hms(2025, month, day, 15, 0, 0).unwrap()
    }

    async fn registry_with(dir: &tempfile::TempDir, entries: &[(&str, u32, u32, i32)]) -> Registry {
        let registry = Registry::load(JsonStore::new(dir.path().join("birthdays.json")))
            .await
            .unwrap();
        for (id, d, m, y) in entries {
            registry.add(id, &format!("cached{}", id), *d, *m, *y).await.unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_single_celebrant_announced_and_granted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000), ("2", 1, 1, 1990)]).await;
        let platform = FakePlatform::default();

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();

        assert_eq!(report.celebrants, vec!["1"]);
        assert_eq!(report.announced, vec!["1"]);
        assert_eq!(report.granted, vec!["1"]);
        assert!(report.revoked.is_empty());
        assert_eq!(report.failures, 0);
        assert_eq!(
            platform.announcements(),
            vec![Announcement {
                user_id: "1".to_string(),
                name: "user1".to_string(),
                age: 25,
            }]
        );
        assert_eq!(platform.holders(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_report_summary_counts() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000), ("2", 15, 6, 2001)]).await;
        let platform = FakePlatform {
            holders: Mutex::new(["7".to_string()].into()),
            unknown_users: ["2".to_string()].into(),
            ..Default::default()
        };

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();
        assert_eq!(
            report.summary(),
            "2 celebrant(s), 1 announced, 1 granted, 1 revoked, 1 skipped, 1 failure(s)"
        );
    }

    #[tokio::test]
    async fn test_no_celebrants_clears_role() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000)]).await;
        let platform = FakePlatform::with_holders(&["1", "3"]);

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 16)).await.unwrap();

        assert!(report.celebrants.is_empty());
        assert!(platform.announcements().is_empty());
        assert_eq!(report.revoked, vec!["1", "3"]);
        assert!(platform.holders().is_empty());
    }

    #[tokio::test]
    async fn test_no_celebrants_no_holders_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[]).await;
        let platform = FakePlatform::default();

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 16)).await.unwrap();
        assert_eq!(report, ReconcileReport::default());
    }

    #[tokio::test]
    async fn test_consecutive_celebrant_days_move_the_role() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000), ("2", 16, 6, 2001)]).await;
        let platform = FakePlatform::default();

        run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();
        assert_eq!(platform.holders(), vec!["1"]);

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 16)).await.unwrap();
        assert_eq!(report.granted, vec!["2"]);
        assert_eq!(report.revoked, vec!["1"]);
        assert_eq!(platform.holders(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_rerun_same_day_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000)]).await;
        let platform = FakePlatform::default();

        run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();
        let second = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();

        assert!(second.granted.is_empty());
        assert!(second.revoked.is_empty());
        assert_eq!(platform.holders(), vec!["1"]);
        // Announcements are not deduplicated
        assert_eq!(platform.announcements().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(
            &dir,
            &[("1", 15, 6, 2000), ("2", 15, 6, 2001), ("3", 15, 6, 2002)],
        )
        .await;
        let platform = FakePlatform {
            holders: Mutex::new(["8", "9"].iter().map(|s| s.to_string()).collect()),
            unknown_users: ["1".to_string()].into(),
            failing_announcements: ["2".to_string()].into(),
            failing_revocations: ["8".to_string()].into(),
            ..Default::default()
        };

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();

        assert_eq!(report.skipped, vec!["1"]);
        assert_eq!(report.announced, vec!["3"]);
        // A failed announcement still gets the role
        assert_eq!(report.granted, vec!["2", "3"]);
        assert_eq!(report.revoked, vec!["9"]);
        assert_eq!(report.failures, 3);
        assert_eq!(platform.holders(), vec!["2", "3", "8"]);
    }

    #[tokio::test]
    async fn test_unavailable_holders_still_grants() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000)]).await;
        let platform = FakePlatform {
            holders_unavailable: true,
            ..Default::default()
        };

        let report = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();

        assert_eq!(report.announced, vec!["1"]);
        assert_eq!(report.granted, vec!["1"]);
        assert!(report.revoked.is_empty());
        assert_eq!(report.failures, 1);
    }

    #[tokio::test]
    async fn test_leap_day_celebrated_on_feb_28() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 29, 2, 2004)]).await;
        let platform = FakePlatform::default();

        let report = run_birthday_reconciliation(&platform, &registry, day(2, 28)).await.unwrap();
        assert_eq!(report.announced, vec!["1"]);
        assert_eq!(platform.announcements()[0].age, 21);
    }

    #[tokio::test]
    async fn test_reads_edits_from_other_processes() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[]).await;
        let other = registry_with(&dir, &[]).await;
        other.add("5", "late", 15, 6, 1999).await.unwrap();

        let platform = FakePlatform::default();
        let report = run_birthday_reconciliation(&platform, &registry, day(6, 15)).await.unwrap();

        assert_eq!(report.announced, vec!["5"]);
        assert!(registry.get("5").await.is_some());
    }

    #[tokio::test]
    async fn test_broken_registry_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(&dir, &[("1", 15, 6, 2000)]).await;
        std::fs::write(dir.path().join("birthdays.json"), "oops").unwrap();
        let platform = FakePlatform::with_holders(&["1"]);

        let err = run_birthday_reconciliation(&platform, &registry, day(6, 16))
            .await
            .unwrap_err();

        assert!(matches!(err, BirthdayError::StorageUnavailable { .. }));
        assert_eq!(platform.holders(), vec!["1"]);
    }
}
