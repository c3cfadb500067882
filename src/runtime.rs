use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::clients::discord_client::WebhookSender;
use crate::clients::github_client::WorkflowStore;
use crate::config::{RunPolicy, Settings};
use crate::error::Result;
use crate::models::event;
use crate::service::notification_service::NotificationService;
use crate::service::reschedule_service::{self, RescheduleService};
use crate::service::schedule_service::{ScheduleDecision, ScheduleService};
use crate::tasks::notification_timer;

pub struct RunDeps {
    pub sender: Arc<dyn WebhookSender>,
    pub workflows: Option<Arc<dyn WorkflowStore>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    NoUpcomingEvents,
    OutsideWindow { minutes_until: i64 },
    Fired { subject: String },
    Cancelled { subject: String },
}

pub async fn execute(settings: &Settings, deps: &RunDeps, now: DateTime<Utc>) -> Result<RunOutcome> {
    let raw_events = event::load_events(&settings.schedule_file)?;
    let total = raw_events.len();
    let events = event::normalize_events(raw_events, settings.timezone)?;

    let upcoming = ScheduleService::upcoming_events(events, now);
    info!(
        file = %settings.schedule_file,
        total,
        upcoming = upcoming.len(),
        past = total - upcoming.len(),
        "schedule loaded"
    );

    let Some(decision) = ScheduleService::decide(upcoming, now) else {
        info!("no upcoming events, nothing to schedule");
        return Ok(RunOutcome::NoUpcomingEvents);
    };

    let delay = decision.next_event.start_at - now;
    let subject = decision.next_event.raw.subject.clone();
    info!(
        subject = %subject,
        start_at = %decision.next_event.start_at,
        minutes_until = delay.num_minutes(),
        "next event selected"
    );

    if settings.policy == RunPolicy::Bounded && delay > settings.notify_window {
        info!(
            window_minutes = settings.notify_window.num_minutes(),
            "next event is outside the notify window, standing down"
        );
        return Ok(RunOutcome::OutsideWindow {
            minutes_until: delay.num_minutes(),
        });
    }

    let message = NotificationService::build_message(&decision.next_event);
    let mut armed = notification_timer::arm(
        deps.sender.clone(),
        subject.clone(),
        message,
        decision.next_event.start_at,
        delay.to_std().unwrap_or_default(),
    );
    info!(subject = armed.subject(), fire_at = %armed.fire_at(), "notification armed");

    // Reschedule failures stop here; the armed timer keeps running.
    if settings.policy == RunPolicy::Reschedule {
        reschedule_next_run(settings, deps, &decision).await;
    }

    tokio::select! {
        fired = armed.join() => {
            if fired {
                Ok(RunOutcome::Fired { subject })
            } else {
                Ok(RunOutcome::Cancelled { subject })
            }
        }
        _ = tokio::signal::ctrl_c() => {
            armed.cancel();
            info!(subject = %subject, "shutdown requested, pending notification cancelled");
            Ok(RunOutcome::Cancelled { subject })
        }
    }
}

async fn reschedule_next_run(settings: &Settings, deps: &RunDeps, decision: &ScheduleDecision) {
    let Some(store) = deps.workflows.as_deref() else {
        warn!("reschedule policy is active but no workflow store is configured");
        return;
    };
    let Some(next_run) = decision.next_run_event.as_ref() else {
        warn!("no second upcoming event, leaving the workflow cron unchanged");
        return;
    };
    let wake = reschedule_service::wake_instant(next_run.start_at, settings.reschedule_lead);
    if let Err(err) = RescheduleService::reschedule(store, wake).await {
        warn!(error = %err, "failed to reschedule the next run");
    }
}
