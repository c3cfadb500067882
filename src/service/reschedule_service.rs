use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use regex::{NoExpand, Regex};
use tracing::info;

use crate::clients::github_client::WorkflowStore;
use crate::error::{BotError, Result};

const CRON_LINE: &str = r"cron: '[^']*'";

pub fn wake_instant(event_start: DateTime<Utc>, lead: Duration) -> DateTime<Utc> {
    event_start - lead
}

// GitHub Actions evaluates cron in UTC.
pub fn cron_expression(wake: DateTime<Utc>) -> String {
    format!(
        "{} {} {} {} *",
        wake.minute(),
        wake.hour(),
        wake.day(),
        wake.month()
    )
}

// Swaps the one cron entry and leaves every other byte of the file alone.
pub fn replace_cron(content: &str, expr: &str) -> Result<String> {
    let pattern = Regex::new(CRON_LINE)
        .map_err(|e| BotError::WorkflowContent(format!("cron pattern: {e}")))?;
    if !pattern.is_match(content) {
        return Err(BotError::MissingCron);
    }
    let replacement = format!("cron: '{expr}'");
    Ok(pattern.replace(content, NoExpand(&replacement)).into_owned())
}

pub struct RescheduleService;

impl RescheduleService {
    pub async fn reschedule<W: WorkflowStore + ?Sized>(
        store: &W,
        wake: DateTime<Utc>,
    ) -> Result<()> {
        let expr = cron_expression(wake);
        let workflow = store.fetch().await?;
        let updated = replace_cron(&workflow.content, &expr)?;
        let message = format!(
            "Schedule next duel notification run at {}",
            wake.format("%Y-%m-%d %H:%M UTC")
        );
        store.update(&updated, &workflow.sha, &message).await?;
        info!(cron = %expr, wake = %wake, "workflow schedule updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const WORKFLOW: &str = "name: notify\n\
on:\n\
  schedule:\n\
    - cron: '0 3 1 1 *'\n\
  workflow_dispatch:\n\
jobs:\n\
  notify:\n\
    runs-on: ubuntu-latest\n";

    #[test]
    fn cron_fields_come_from_the_utc_wake_instant() {
        let wake = Utc.with_ymd_and_hms(2025, 6, 10, 5, 27, 0).unwrap();
        assert_eq!(cron_expression(wake), "27 5 10 6 *");

        let new_year = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 0).unwrap();
        assert_eq!(cron_expression(new_year), "4 3 2 1 *");
    }

    #[test]
    fn wake_instant_subtracts_the_lead() {
        let start = Utc.with_ymd_and_hms(2025, 6, 10, 5, 30, 0).unwrap();
        assert_eq!(
            wake_instant(start, Duration::minutes(3)),
            Utc.with_ymd_and_hms(2025, 6, 10, 5, 27, 0).unwrap()
        );
    }

    #[test]
    fn replace_cron_only_touches_the_cron_line() {
        let updated = replace_cron(WORKFLOW, "27 5 10 6 *").unwrap();
        assert!(updated.contains("cron: '27 5 10 6 *'"));
        assert_eq!(
            updated.replace("cron: '27 5 10 6 *'", "cron: '0 3 1 1 *'"),
            WORKFLOW
        );
    }

    #[test]
    fn missing_cron_line_is_a_typed_error() {
        let err = replace_cron("name: notify\njobs: {}\n", "1 2 3 4 *")
            .err()
            .unwrap();
        assert!(matches!(err, BotError::MissingCron));
    }
}
