//! Application startup and command dispatch.
//!
//! Builds the storage, session store, token exchange and client from the
//! configuration, then runs one CLI command against them.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::Command;
use crate::client::{ApiClient, ApiRequest};
use crate::config::ConfigV1;
use crate::exchange::{HttpTokenExchange, LoginCredentials};
use crate::session::SessionStore;
use crate::state::AppState;
use crate::storage::create_storage;
use crate::streaming::unwrap_text;

/// Wires the application state from configuration.
///
/// # Errors
///
/// Returns an error if the storage cannot be opened or a configured URL
/// does not parse.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, Box<dyn Error>> {
    let storage = create_storage(&config.storage)?;
    let session = Arc::new(SessionStore::open(storage));
    let exchange = Arc::new(HttpTokenExchange::new(&config.api)?);
    let client = Arc::new(ApiClient::new(&config.api, session.clone(), exchange)?);

    Ok(AppState {
        config,
        session,
        client,
    })
}

/// Runs a single command.
///
/// # Errors
///
/// Returns an error if the command fails, including when the session has
/// expired and the user must log in again.
pub async fn run(config: Arc<ConfigV1>, command: Command) -> Result<(), Box<dyn Error>> {
    let state = build_state(config)?;
    debug!("Running command '{}'", command_name(&command));

    match command {
        Command::Login { email, password } => {
            let session = state
                .client
                .login(&LoginCredentials::new(email, password))
                .await?;
            match session.identity() {
                Some(user) => println!("Signed in as {} <{}>", user.display_name, user.email),
                None => println!("Signed in"),
            }
        }
        Command::Logout => {
            state.client.logout();
            println!("Signed out");
        }
        Command::Whoami => {
            let session = state.session.get();
            match (session.has_credentials(), session.identity()) {
                (true, Some(user)) => println!("{} <{}> ({})", user.display_name, user.email, user.id),
                (true, None) => println!("Signed in (no identity stored)"),
                (false, _) => println!("Not signed in"),
            }
        }
        Command::Get { path } => {
            let response = state.client.request(&ApiRequest::get(path)).await?;
            let status = response.status();
            let body = response.text().await?;
            println!("{}", body);
            if !status.is_success() {
                return Err(format!("request failed with status {}", status).into());
            }
        }
        Command::Stream {
            path,
            body,
            envelope,
        } => stream(&state, path, body, envelope).await?,
        Command::Schema => crate::config::print_schema()?,
    }

    Ok(())
}

async fn stream(
    state: &AppState,
    path: String,
    body: Option<String>,
    envelope: bool,
) -> Result<(), Box<dyn Error>> {
    let request = match body {
        Some(body) => {
            let json: serde_json::Value = serde_json::from_str(&body)?;
            ApiRequest::post(path).json(&json)?
        }
        None => ApiRequest::get(path),
    };

    let response = state.client.open_stream(&request).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("stream rejected with status {}", status).into());
    }

    let mut out = DeltaWriter::new(io::stdout());
    let text = response
        .consume(|accumulated| {
            // Enveloped replies are only meaningful once complete.
            if !envelope {
                out.write(accumulated);
            }
        })
        .await?;
    out.finish()?;

    if envelope {
        println!(
            "{}",
            unwrap_text(&text, &state.config.streaming.envelope_field)
        );
    } else {
        println!();
    }
    info!("Stream finished ({} bytes of text)", text.len());
    Ok(())
}

/// Writes the newly arrived suffix of each text snapshot. The first write
/// error is kept and later snapshots are skipped.
struct DeltaWriter<W: Write> {
    out: W,
    printed: usize,
    error: Option<io::Error>,
}

impl<W: Write> DeltaWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            error: None,
        }
    }

    fn write(&mut self, accumulated: &str) {
        if self.error.is_some() {
            return;
        }
        let delta = &accumulated[self.printed..];
        match self.out.write_all(delta.as_bytes()).and_then(|_| self.out.flush()) {
            Ok(()) => self.printed = accumulated.len(),
            Err(e) => self.error = Some(e),
        }
    }

    fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Login { .. } => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Get { .. } => "get",
        Command::Stream { .. } => "stream",
        Command::Schema => "schema",
    }
}
