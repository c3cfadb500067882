use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read schedule {path}: {source}")]
    Schedule { path: String, source: csv::Error },

    #[error("event '{subject}' has an invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        subject: String,
        value: String,
        reason: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("workflow {path} changed upstream; the stored fingerprint no longer matches")]
    WorkflowConflict { path: String },

    #[error("workflow has no cron entry to rewrite")]
    MissingCron,

    #[error("invalid workflow content: {0}")]
    WorkflowContent(String),
}

impl BotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = BotError::config("DISCORD_WEBHOOK_URL is not set");
        assert_eq!(err.to_string(), "config error: DISCORD_WEBHOOK_URL is not set");

        let err = BotError::Api {
            service: "github",
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "github returned status 404: Not Found");

        let err = BotError::WorkflowConflict {
            path: ".github/workflows/notify.yml".to_string(),
        };
        assert!(err.to_string().contains(".github/workflows/notify.yml"));
    }

    #[test]
    fn invalid_timestamp_names_the_event() {
        let err = BotError::InvalidTimestamp {
            subject: "KC Cup".to_string(),
            value: "2025/13/01 10:00".to_string(),
            reason: "input is out of range".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("KC Cup"));
        assert!(rendered.contains("2025/13/01 10:00"));
    }
}
