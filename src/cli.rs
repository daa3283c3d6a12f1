use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shiftsync", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync the Workjam schedule into a Google Calendar
    Sync(SyncArgs),
    /// Print the Workjam schedule as an iCalendar feed
    Feed(FeedArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Google Calendar id to sync into
    #[arg(long, env = "GOOGLE_CALENDAR_ID")]
    pub calendar: String,

    #[command(flatten)]
    pub secrets: GoogleSecretsArgs,

    #[command(flatten)]
    pub workjam: WorkjamArgs,

    /// First day to sync, defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub sync_from: Option<NaiveDate>,

    /// Last day to sync, defaults to one month after the first
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub sync_to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    #[command(flatten)]
    pub workjam: WorkjamArgs,

    /// First day of the feed, defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub fetch_from: Option<NaiveDate>,

    /// Last day of the feed, defaults to one month after the first
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub fetch_to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct GoogleSecretsArgs {
    /// Path to the OAuth client_secret.json
    #[arg(long = "google-client-secrets", env = "GOOGLE_CLIENT_SECRETS_FILE", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// OAuth client secrets as inline JSON
    #[arg(
        long = "google-secrets",
        env = "GOOGLE_CLIENT_SECRETS",
        value_name = "JSON",
        hide_env_values = true
    )]
    pub json: Option<String>,
}

#[derive(Args, Debug)]
pub struct WorkjamArgs {
    /// Workjam bearer token, cached for later runs
    #[arg(long, env = "WORKJAM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
