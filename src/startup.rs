use crate::cli::{Command, FeedArgs, GoogleSecretsArgs, SyncArgs};
use crate::components::google_calendar::{
    CalendarSyncer, ClientSecrets, GoogleCalendarClient, GoogleRenderer, SyncReport, SyncWindow,
    TokenManager,
};
use crate::components::ical::{write_calendar, IcalRenderer};
use crate::components::transform::{EventRenderer, EventTransformer};
use crate::components::workjam::auth::resolve_token;
use crate::components::workjam::{Employers, PrimaryStore, WorkjamApi, WorkjamClient};
use crate::config::Config;
use crate::error::{config_error, Error, ShiftResult};
use crate::storage::CredentialStore;
use crate::utils::time::{date_window, default_window_end};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Cached Workjam token reference used by the CLI
pub const USER_REFERENCE: &str = "user";

/// Initialize logging with environment-based configuration
///
/// Logs go to stderr so that the feed on stdout stays clean.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Workjam state shared by every command
pub struct Session {
    pub config: Config,
    pub store: CredentialStore,
    pub api: Arc<dyn WorkjamApi>,
    pub employers: Employers,
    pub primary: PrimaryStore,
}

impl Session {
    /// Authenticate and resolve the employee's primary store
    pub async fn open(config: Config, token: Option<&str>) -> ShiftResult<Self> {
        let store = CredentialStore::new(&config.storage_dir);
        let token = resolve_token(&store, USER_REFERENCE, token)?;
        let api: Arc<dyn WorkjamApi> = Arc::new(WorkjamClient::new(&config, &token)?);
        Self::with_api(config, store, api).await
    }

    pub async fn with_api(
        config: Config,
        store: CredentialStore,
        api: Arc<dyn WorkjamApi>,
    ) -> ShiftResult<Self> {
        let employers = api.employers(api.user_id()).await?;
        let primary = employers.primary_store()?;
        info!(
            user_id = api.user_id(),
            company_id = %primary.company_id,
            store = %primary.store.store_name,
            time_zone = %primary.time_zone,
            "Resolved primary store"
        );

        Ok(Self {
            config,
            store,
            api,
            employers,
            primary,
        })
    }

    /// Local-day window in the primary store's time zone
    pub fn window(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ShiftResult<(DateTime<Tz>, DateTime<Tz>)> {
        let tz = self.primary.time_zone;
        let from = from.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
        let to = match to {
            Some(to) => to,
            None => default_window_end(from)?,
        };
        date_window(from, to, tz)
    }

    /// Fetch the schedule in the window and render it with `renderer`
    pub async fn transform<R: EventRenderer>(
        &self,
        renderer: R,
        (start, end): (DateTime<Tz>, DateTime<Tz>),
    ) -> ShiftResult<Vec<R::Output>> {
        let events = self
            .api
            .events(
                &self.primary.company_id,
                self.api.user_id(),
                start.fixed_offset(),
                end.fixed_offset(),
            )
            .await?;
        info!(count = events.len(), %start, %end, "Fetched schedule events");

        EventTransformer::new(
            self.api.clone(),
            self.primary.company_id.clone(),
            self.config.domain.clone(),
            renderer,
        )
        .with_employers(self.employers.clone())
        .with_max_concurrency(self.config.max_concurrency)
        .transform_all(events)
        .await
    }
}

fn client_secrets(args: &GoogleSecretsArgs) -> ShiftResult<ClientSecrets> {
    match (&args.file, &args.json) {
        (_, Some(json)) => ClientSecrets::from_json(json),
        (Some(file), None) => ClientSecrets::from_file(file),
        (None, None) => Err(config_error("Google client secrets are required")),
    }
}

/// Workjam to Google Calendar
pub async fn run_sync(config: Config, args: SyncArgs) -> ShiftResult<SyncReport> {
    let secrets = client_secrets(&args.secrets)?;
    let session = Session::open(config, args.workjam.token.as_deref()).await?;

    let window = session.window(args.sync_from, args.sync_to)?;
    let events = session.transform(GoogleRenderer, window).await?;

    let tokens = TokenManager::new(session.store.clone(), secrets);
    let calendar = Arc::new(GoogleCalendarClient::new(tokens)?);
    let syncer = CalendarSyncer::new(calendar, args.calendar, session.config.domain.clone());

    let sync_window = SyncWindow {
        start: window.0.with_timezone(&Utc),
        end: window.1.with_timezone(&Utc),
    };
    syncer.sync(sync_window, events).await?.into_result()
}

/// Workjam to an iCalendar document
pub async fn run_feed(config: Config, args: FeedArgs) -> ShiftResult<String> {
    let session = Session::open(config, args.workjam.token.as_deref()).await?;

    let window = session.window(args.fetch_from, args.fetch_to)?;
    let events = session.transform(IcalRenderer, window).await?;

    Ok(write_calendar(&events, Utc::now()))
}

/// Run one CLI command to completion
pub async fn run(config: Config, command: Command) -> ShiftResult<()> {
    rust_i18n::set_locale(&config.locale);

    match command {
        Command::Sync(args) => {
            let report = run_sync(config, args).await?;
            info!(
                inserted = report.inserted,
                updated = report.updated,
                deleted = report.deleted,
                unchanged = report.unchanged,
                "Sync complete"
            );
        }
        Command::Feed(args) => {
            let calendar = run_feed(config, args).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(calendar.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
