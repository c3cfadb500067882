use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{BotError, Result};

const START_FORMAT: &str = "%Y/%m/%d %H:%M";

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "CupId")]
    pub cup_id: String,
    #[serde(rename = "CupRarity")]
    pub cup_rarity: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub raw: RawEvent,
    pub start_at: DateTime<Utc>,
}

impl NormalizedEvent {
    // Start date/time are civil wall-clock text in the schedule timezone.
    pub fn from_raw(raw: RawEvent, timezone: Tz) -> Result<Self> {
        let civil = format!("{} {}", raw.start_date, raw.start_time);
        let naive = NaiveDateTime::parse_from_str(&civil, START_FORMAT).map_err(|e| {
            BotError::InvalidTimestamp {
                subject: raw.subject.clone(),
                value: civil.clone(),
                reason: e.to_string(),
            }
        })?;
        let local = timezone.from_local_datetime(&naive).single().ok_or_else(|| {
            BotError::InvalidTimestamp {
                subject: raw.subject.clone(),
                value: civil,
                reason: format!("not an unambiguous local time in {}", timezone),
            }
        })?;
        Ok(Self {
            start_at: local.with_timezone(&Utc),
            raw,
        })
    }
}

// Reads the whole snapshot up front; processing never touches the file again.
pub fn load_events(path: &str) -> Result<Vec<RawEvent>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| BotError::Schedule {
        path: path.to_string(),
        source,
    })?;
    let mut events = Vec::new();
    for record in reader.deserialize() {
        let event: RawEvent = record.map_err(|source| BotError::Schedule {
            path: path.to_string(),
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

pub fn normalize_events(events: Vec<RawEvent>, timezone: Tz) -> Result<Vec<NormalizedEvent>> {
    events
        .into_iter()
        .map(|event| NormalizedEvent::from_raw(event, timezone))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::Asia::Tokyo;

    fn raw(subject: &str, start_date: &str, start_time: &str) -> RawEvent {
        RawEvent {
            subject: subject.to_string(),
            start_date: start_date.to_string(),
            start_time: start_time.to_string(),
            end_date: "2025/01/05".to_string(),
            end_time: "21:00".to_string(),
            description: "ranked duels".to_string(),
            cup_id: "77".to_string(),
            cup_rarity: "UR".to_string(),
        }
    }

    #[test]
    fn tokyo_wall_clock_converts_to_utc() {
        let event = NormalizedEvent::from_raw(raw("KC Cup", "2025/01/01", "10:00"), Tokyo).unwrap();
        // JST is UTC+9 year round.
        assert_eq!(event.start_at, Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap());
        assert_eq!(event.raw.subject, "KC Cup");
    }

    #[test]
    fn midnight_crosses_the_date_line() {
        let event = NormalizedEvent::from_raw(raw("KC GT", "2025/01/01", "08:30"), Tokyo).unwrap();
        assert_eq!(
            event.start_at,
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap()
        );
    }

    #[test]
    fn malformed_timestamp_is_rejected_with_subject() {
        let err = NormalizedEvent::from_raw(raw("KC Cup", "2025/13/01", "10:00"), Tokyo)
            .err()
            .unwrap();
        match err {
            BotError::InvalidTimestamp { subject, value, .. } => {
                assert_eq!(subject, "KC Cup");
                assert_eq!(value, "2025/13/01 10:00");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ambiguous_local_time_is_rejected() {
        // 01:30 happens twice when New York leaves DST on 2025-11-02.
        let result = NormalizedEvent::from_raw(raw("DST cup", "2025/11/02", "01:30"), New_York);
        assert!(result.is_err());
    }

    #[test]
    fn normalize_events_stops_at_the_first_bad_row() {
        let events = vec![
            raw("ok", "2025/01/01", "10:00"),
            raw("broken", "2025/01/01", "25:61"),
        ];
        let err = normalize_events(events, Tokyo).err().unwrap();
        assert!(err.to_string().contains("broken"));
    }
}
