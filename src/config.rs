use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

use chrono::Duration;
use chrono_tz::Tz;

use crate::error::{BotError, Result};

pub const DEFAULT_SCHEDULE_FILE: &str = "./DuelsSchedule.csv";
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_WORKFLOW_PATH: &str = ".github/workflows/notify.yml";
const DEFAULT_NOTIFY_WINDOW_MINUTES: i64 = 15;
const DEFAULT_RESCHEDULE_LEAD_MINUTES: i64 = 3;

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BotError::config(format!("cannot read {}: {}", path, e)))?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(BotError::config(format!(
                    "invalid config line {}: {}",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPolicy {
    // Notify only when the next event is inside the notify window.
    Bounded,
    // Always notify, and move the workflow cron to wake before the event after.
    Reschedule,
}

impl FromStr for RunPolicy {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bounded" => Ok(Self::Bounded),
            "reschedule" => Ok(Self::Reschedule),
            other => Err(BotError::config(format!(
                "invalid RUN_POLICY '{}', expected 'bounded' or 'reschedule'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub schedule_file: String,
    pub timezone: Tz,
    pub policy: RunPolicy,
    pub notify_window: Duration,
    pub reschedule_lead: Duration,
}

impl Settings {
    pub fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let schedule_file =
            get("SCHEDULE_FILE").unwrap_or_else(|| DEFAULT_SCHEDULE_FILE.to_string());
        let timezone_name =
            get("SCHEDULE_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| BotError::config(format!("unknown timezone '{}'", timezone_name)))?;
        let policy = match get("RUN_POLICY") {
            Some(raw) => raw.parse()?,
            None => RunPolicy::Bounded,
        };
        let notify_window =
            minutes_prop(&get, "NOTIFY_WINDOW_MINUTES", DEFAULT_NOTIFY_WINDOW_MINUTES)?;
        let reschedule_lead = minutes_prop(
            &get,
            "RESCHEDULE_LEAD_MINUTES",
            DEFAULT_RESCHEDULE_LEAD_MINUTES,
        )?;
        Ok(Self {
            schedule_file,
            timezone,
            policy,
            notify_window,
            reschedule_lead,
        })
    }
}

fn minutes_prop(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: i64,
) -> Result<Duration> {
    let minutes = match get(key) {
        Some(raw) => {
            let minutes = raw.parse::<i64>().map_err(|_| {
                BotError::config(format!(
                    "{} must be a whole number of minutes, got '{}'",
                    key, raw
                ))
            })?;
            if minutes <= 0 {
                return Err(BotError::config(format!(
                    "{} must be a positive number of minutes",
                    key
                )));
            }
            minutes
        }
        None => default,
    };
    Duration::try_minutes(minutes)
        .ok_or_else(|| BotError::config(format!("{} is out of range", key)))
}

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
}

impl WebhookSettings {
    pub fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = get("DISCORD_WEBHOOK_URL")
            .ok_or_else(|| BotError::config("DISCORD_WEBHOOK_URL is not set"))?;
        Ok(Self { url })
    }
}

#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub workflow_path: String,
}

impl GithubSettings {
    pub fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token =
            get("GITHUB_TOKEN").ok_or_else(|| BotError::config("GITHUB_TOKEN is not set"))?;
        let repository = get("GITHUB_REPOSITORY")
            .ok_or_else(|| BotError::config("GITHUB_REPOSITORY is not set"))?;
        let Some((owner, repo)) = repository.split_once('/') else {
            return Err(BotError::config(format!(
                "GITHUB_REPOSITORY must be 'owner/repo', got '{}'",
                repository
            )));
        };
        if owner.is_empty() || repo.is_empty() {
            return Err(BotError::config(format!(
                "GITHUB_REPOSITORY must be 'owner/repo', got '{}'",
                repository
            )));
        }
        let workflow_path =
            get("WORKFLOW_PATH").unwrap_or_else(|| DEFAULT_WORKFLOW_PATH.to_string());
        Ok(Self {
            token,
            owner: owner.to_string(),
            repo: repo.to_string(),
            workflow_path,
        })
    }
}
