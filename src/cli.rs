use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::clients::discord_client::DiscordWebhookClient;
use crate::clients::github_client::{GitHubClient, WorkflowStore};
use crate::config::{GithubSettings, RunPolicy, Settings, WebhookSettings};
use crate::error::Result;
use crate::models::event;
use crate::runtime::{self, RunDeps};
use crate::service::notification_service::NotificationService;
use crate::service::reschedule_service;
use crate::service::schedule_service::ScheduleService;

#[derive(Parser)]
#[command(name = "duelbot", about = "One-shot duel schedule notifier")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the next event, arm its notification, and wait for it to fire.
    Run,
    /// Print what a run would do, without timers or network calls.
    Plan,
}

pub async fn cli(get_prop: impl Fn(&str) -> Option<String>) -> Result<()> {
    // Fine to panic here
    let cli = Cli::parse();
    let settings = Settings::load(&get_prop)?;
    // The workflow job invokes the binary bare, so no subcommand means run.
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(settings, get_prop).await,
        Commands::Plan => plan(settings),
    }
}

async fn run(settings: Settings, get_prop: impl Fn(&str) -> Option<String>) -> Result<()> {
    let webhook = WebhookSettings::load(&get_prop)?;
    let sender = Arc::new(DiscordWebhookClient::new(webhook.url)?);
    let workflows = match settings.policy {
        RunPolicy::Reschedule => {
            let github = GithubSettings::load(&get_prop)?;
            Some(Arc::new(GitHubClient::new(github)?) as Arc<dyn WorkflowStore>)
        }
        RunPolicy::Bounded => None,
    };
    let deps = RunDeps { sender, workflows };
    let outcome = runtime::execute(&settings, &deps, Utc::now()).await?;
    info!(?outcome, "run finished");
    Ok(())
}

fn plan(settings: Settings) -> Result<()> {
    let now = Utc::now();
    let raw_events = event::load_events(&settings.schedule_file)?;
    let events = event::normalize_events(raw_events, settings.timezone)?;
    let upcoming = ScheduleService::upcoming_events(events, now);

    let Some(next_event) = upcoming.first() else {
        println!("No upcoming events in {}.", settings.schedule_file);
        return Ok(());
    };

    println!("Upcoming events (now = {}):", now.format("%Y-%m-%d %H:%M UTC"));
    for event in &upcoming {
        println!(
            "  {}  {}  [cup {} / {}]",
            event.start_at.format("%Y-%m-%d %H:%M UTC"),
            event.raw.subject,
            event.raw.cup_id,
            event.raw.cup_rarity
        );
    }

    let delay = next_event.start_at - now;
    println!();
    println!(
        "Next event: {} in {} minute(s)",
        next_event.raw.subject,
        delay.num_minutes()
    );

    match settings.policy {
        RunPolicy::Bounded if delay > settings.notify_window => {
            println!(
                "Outside the {}-minute notify window; a run would stand down.",
                settings.notify_window.num_minutes()
            );
        }
        RunPolicy::Bounded => {
            println!("Within the notify window; a run would send:");
            println!("{}", NotificationService::build_message(next_event));
        }
        RunPolicy::Reschedule => {
            println!("A run would send:");
            println!("{}", NotificationService::build_message(next_event));
            match upcoming.get(1) {
                Some(next_run) => {
                    let wake = reschedule_service::wake_instant(
                        next_run.start_at,
                        settings.reschedule_lead,
                    );
                    println!(
                        "Next wake-up: {} (cron '{}')",
                        wake.format("%Y-%m-%d %H:%M UTC"),
                        reschedule_service::cron_expression(wake)
                    );
                }
                None => println!("No second event; the workflow cron would stay unchanged."),
            }
        }
    }
    Ok(())
}
