use clap::Parser;
use shiftsync::components::google_calendar::token::{CALENDAR_SCOPE, GOOGLE_AUTH_URL};
use shiftsync::components::google_calendar::{ClientSecrets, TokenManager};
use shiftsync::config::Config;
use shiftsync::error::{config_error, other_error, ShiftResult};
use shiftsync::storage::CredentialStore;
use std::path::PathBuf;
use url::Url;

const LISTEN_ADDR: &str = "127.0.0.1:8080";
const REDIRECT_URI: &str = "http://localhost:8080";

/// Authorize Google Calendar access and store the token for `shiftsync sync`
#[derive(Parser, Debug)]
#[command(name = "get_calendar_token", version, about)]
struct Args {
    /// Path to the OAuth client_secret.json
    #[arg(long = "google-client-secrets", env = "GOOGLE_CLIENT_SECRETS_FILE")]
    file: Option<PathBuf>,

    /// OAuth client secrets as inline JSON
    #[arg(long = "google-secrets", env = "GOOGLE_CLIENT_SECRETS", hide_env_values = true)]
    json: Option<String>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    run(args, config).await?;
    Ok(())
}

async fn run(args: Args, config: Config) -> ShiftResult<()> {
    let secrets = match (args.json, args.file) {
        (Some(json), _) => ClientSecrets::from_json(&json)?,
        (None, Some(file)) => ClientSecrets::from_file(file)?,
        (None, None) => {
            return Err(config_error(
                "Pass --google-client-secrets or --google-secrets",
            ))
        }
    };
    let token_manager = TokenManager::new(CredentialStore::new(&config.storage_dir), secrets);

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    let mut auth_url = Url::parse(GOOGLE_AUTH_URL)
        .map_err(|e| other_error(&format!("Invalid authorization URL: {}", e)))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &token_manager.secrets().client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", CALENDAR_SCOPE)
        .append_pair("state", &state);

    // Open browser for authorization
    eprintln!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        eprintln!("Could not open a browser, visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http(LISTEN_ADDR)
        .map_err(|e| other_error(&format!("Failed to listen on {}: {}", LISTEN_ADDR, e)))?;
    eprintln!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(other_error("Authorization callback state does not match"));
    }
    let code = param("code")
        .ok_or_else(|| other_error("No authorization code found in callback"))?;

    token_manager.exchange_code(&code, REDIRECT_URI).await?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    eprintln!(
        "Token saved to {}",
        config.storage_dir.join("google-token.json").display()
    );

    Ok(())
}
