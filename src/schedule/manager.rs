use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use super::birthday_tasks::run_birthday_reconciliation;
use super::discord::DiscordPlatform;
use crate::models::Data;
use crate::utils::timezone::create_cron_expression;

/// Start the daily birthday reconciliation loop
pub fn start_schedule_manager(http: Arc<serenity::Http>, data: Arc<Data>) {
    tokio::spawn(async move {
        info!("Schedule manager started");

        let timezone = data.settings.timezone;
        let cron_expression = create_cron_expression(data.settings.announce_time);
        let schedule = match cron::Schedule::from_str(&cron_expression) {
            Ok(schedule) => schedule,
            Err(e) => {
                error!("Invalid cron expression '{}': {}", cron_expression, e);
                return;
            }
        };

        let platform = DiscordPlatform::new(http, &data.settings);
        let mut last_run: Option<DateTime<Tz>> = None;

        loop {
            let now = Utc::now().with_timezone(&timezone);
            let Some((next_time, wait_duration)) = find_next_run(&schedule, now, last_run) else {
                warn!("No upcoming time found for cron '{}'", cron_expression);
                break;
            };

            info!(
                "Next birthday check at {} (in {} minutes)",
                next_time,
                wait_duration.as_secs() / 60
            );
            sleep(wait_duration).await;
            last_run = Some(next_time);

            let now = Utc::now().with_timezone(&timezone);
            match run_birthday_reconciliation(&platform, &data.registry, now).await {
                Ok(report) => info!("Birthday check done: {}", report.summary()),
                Err(e) => error!("Birthday check aborted: {}", e),
            }
        }

        info!("Schedule manager stopped");
    });
}

/// Next fire time strictly after both `now` and the previous run
fn find_next_run(
    schedule: &cron::Schedule,
    now: DateTime<Tz>,
    last_run: Option<DateTime<Tz>>,
) -> Option<(DateTime<Tz>, Duration)> {
    let from = last_run.map_or(now, |last| last.max(now));
    let next_time = schedule.after(&from).next()?;

    let wait_duration = (next_time - now)
        .to_std()
        .unwrap_or(Duration::from_secs(60));

    Some((next_time, wait_duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn daily_at(hour: u32, minute: u32) -> cron::Schedule {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
        cron::Schedule::from_str(&create_cron_expression(time)).unwrap()
    }

    #[test]
    fn test_next_run_later_today() {
        let schedule = daily_at(15, 0);
        let now = chrono_tz::GMT.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();

        let (next, wait) = find_next_run(&schedule, now, None).unwrap();
        assert_eq!(next, chrono_tz::GMT.with_ymd_and_hms(2025, 6, 15, 15, 0, 0).unwrap());
        assert_eq!(wait, Duration::from_secs(3600));
    }

    #[test]
    fn test_next_run_tomorrow_once_passed() {
        let schedule = daily_at(15, 0);
        let now = chrono_tz::GMT.with_ymd_and_hms(2025, 6, 15, 15, 0, 0).unwrap();

        let (next, _) = find_next_run(&schedule, now, None).unwrap();
        assert_eq!(next, chrono_tz::GMT.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_never_repeats_last_run() {
        let schedule = daily_at(15, 0);
        let fired = chrono_tz::GMT.with_ymd_and_hms(2025, 6, 15, 15, 0, 0).unwrap();
        // Woke up a hair early
        let now = fired - chrono::Duration::milliseconds(5);

        let (next, _) = find_next_run(&schedule, now, Some(fired)).unwrap();
        assert_eq!(next, chrono_tz::GMT.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_uses_configured_timezone() {
        let schedule = daily_at(9, 30);
        let tz: Tz = "Europe/Paris".parse().unwrap();
        let now = tz.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();

        let (next, _) = find_next_run(&schedule, now, None).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2025, 1, 11, 9, 30, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc).to_rfc3339(), "2025-01-11T08:30:00+00:00");
    }
}
