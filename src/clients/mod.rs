pub mod discord_client;
pub mod github_client;
