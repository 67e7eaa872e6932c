//! Command-line caller for the quota checker.
//!
//! Stands in for the interactive front-end: reads the account from the
//! environment, runs the check on a worker task, prints the result, and
//! wires Ctrl-C to the cancel handle.
//!
//! ```text
//! QUOTA_IDENTIFIER=0233333333 QUOTA_SECRET=... quota-check [--debug]
//! ```
//!
//! Requires a running geckodriver (`geckodriver --port 4444`); override the
//! endpoint with `QUOTA_WEBDRIVER_URL`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use isp_quota_checker::{Credential, QuotaChecker, QuotaConfig, DEFAULT_SERVICE_LABEL};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let identifier =
        std::env::var("QUOTA_IDENTIFIER").context("QUOTA_IDENTIFIER is not set")?;
    let secret = std::env::var("QUOTA_SECRET").context("QUOTA_SECRET is not set")?;
    let service_label =
        std::env::var("QUOTA_SERVICE").unwrap_or_else(|_| DEFAULT_SERVICE_LABEL.to_string());
    let debug = std::env::args().any(|arg| arg == "--debug");

    let mut config = QuotaConfig::default();
    if let Ok(url) = std::env::var("QUOTA_WEBDRIVER_URL") {
        config = config.webdriver_url(url);
    }

    let checker = Arc::new(QuotaChecker::new(config));

    let cancel = checker.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, cancelling");
            cancel.cancel().await;
        }
    });

    let credential = Credential::new(identifier, secret);
    let task = checker.spawn_check(credential, service_label, debug);
    let outcome = task.await.context("quota check task panicked")?;

    checker.shutdown().await;

    match outcome {
        Ok(result) => {
            println!("{}", result.display);
            Ok(())
        }
        Err(err) => {
            if let Some(hint) = err.user_hint() {
                eprintln!("{err}\n{hint}");
            } else {
                eprintln!("{err}");
            }
            std::process::exit(1);
        }
    }
}
