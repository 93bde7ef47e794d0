//! coatingtk server
//!
//! Drives one coating session over stdin/stdout, one JSON request per line.
//! Logs go to stderr so stdout carries responses only.
//!
//! Environment:
//! - `COATINGTK_CONFIG`: JSON settings file loaded at startup
//! - `COATINGTK_MATERIALS`: JSON material library merged into the built-ins
//! - `RUST_LOG`: log filter, `info` by default

mod handler;

use coatingtk::{CoatingError, CoatingSession};
use handler::{handle_request, Request, Response, RpcError};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const CONFIG_ENV: &str = "COATINGTK_CONFIG";
const MATERIALS_ENV: &str = "COATINGTK_MATERIALS";

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let mut session = match create_session() {
        Ok(session) => session,
        Err(e) => {
            error!(code = %e.code, "{}", e.message);
            std::process::exit(1);
        }
    };

    info!(
        version = SERVER_VERSION,
        plots = session.plots().len(),
        materials = session.materials().len(),
        "coatingtk server ready"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let request: Request = match serde_json::from_str(line) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "unparseable request");
                        send(&Response::failure(None, RpcError::parse_error(e)));
                        continue;
                    }
                };

                debug!(method = %request.method, "request");
                let response = handle_request(&mut session, &request);

                // Notifications get no reply
                if request.id.is_some() {
                    send(&response);
                }
            }
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}

fn create_session() -> Result<CoatingSession, CoatingError> {
    let mut session = CoatingSession::with_standard()?;

    if let Some(json) = read_env_file(CONFIG_ENV) {
        match session.load_config(&json) {
            Ok(()) => info!("loaded settings from {}", CONFIG_ENV),
            Err(e) => warn!(code = %e.code, "ignoring settings file: {}", e.message),
        }
    }
    if let Some(json) = read_env_file(MATERIALS_ENV) {
        match session.load_materials(&json) {
            Ok(count) => info!(count, "loaded material library"),
            Err(e) => warn!(code = %e.code, "ignoring material library: {}", e.message),
        }
    }
    Ok(session)
}

fn read_env_file(var: &str) -> Option<String> {
    let path = env::var(var).ok()?;
    match fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read {}", var);
            None
        }
    }
}

fn send(response: &Response) {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "response serialization failed");
            return;
        }
    };
    let mut stdout = io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", json).and_then(|_| stdout.flush()) {
        error!(error = %e, "stdout write failed");
    }
}
