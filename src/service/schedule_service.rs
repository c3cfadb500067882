use chrono::{DateTime, Utc};

use crate::models::event::NormalizedEvent;

#[derive(Debug, Clone)]
pub struct ScheduleDecision {
    pub next_event: NormalizedEvent,
    pub next_run_event: Option<NormalizedEvent>,
}

pub struct ScheduleService;

impl ScheduleService {
    // An event starting exactly now still counts as upcoming.
    pub fn upcoming_events(
        events: Vec<NormalizedEvent>,
        now: DateTime<Utc>,
    ) -> Vec<NormalizedEvent> {
        let mut upcoming: Vec<NormalizedEvent> = events
            .into_iter()
            .filter(|event| event.start_at >= now)
            .collect();
        // Stable sort, so events sharing a start keep their input order.
        upcoming.sort_by_key(|event| event.start_at);
        upcoming
    }

    pub fn decide(events: Vec<NormalizedEvent>, now: DateTime<Utc>) -> Option<ScheduleDecision> {
        let mut upcoming = Self::upcoming_events(events, now).into_iter();
        let next_event = upcoming.next()?;
        Some(ScheduleDecision {
            next_event,
            next_run_event: upcoming.next(),
        })
    }
}
