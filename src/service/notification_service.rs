use crate::models::event::NormalizedEvent;

pub struct NotificationService;

impl NotificationService {
    pub fn build_message(event: &NormalizedEvent) -> String {
        format!(
            "@everyone\n{subject} is starting soon.\nRuns until {end_date} {end_time}.",
            subject = event.raw.subject,
            end_date = event.raw.end_date,
            end_time = event.raw.end_time,
        )
    }
}
