//! The automation orchestrator.
//!
//! [`QuotaChecker`] composes the session manager, the login protocol and
//! the quota extractor behind one entry point, maps every failure into the
//! [`AutomationError`] taxonomy, and supports cooperative cancellation from
//! another task via [`CancelHandle`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::account::Credential;
use crate::browser::{AutomationError, SessionConfig, SessionManager, SessionMode};
use crate::portal::{login, quota, QuotaResult};
use crate::{mask_sensitive, QuotaConfig};

/// Cooperative cancellation flag, checked at every step boundary of the
/// login protocol. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail fast with [`AutomationError::Cancelled`] once the flag is set.
    pub fn check(&self) -> Result<(), AutomationError> {
        if self.is_cancelled() {
            Err(AutomationError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cancels the in-flight check from outside the worker task.
///
/// Cancellation is a hard stop: the flag aborts the protocol at the next
/// step boundary and the forced session termination aborts whatever wait is
/// currently blocking on browser I/O. Cancelling when nothing is in flight
/// is a no-op (beyond invalidating a result that has not been returned yet).
#[derive(Clone)]
pub struct CancelHandle {
    cancel: CancelFlag,
    generation: Arc<AtomicU64>,
    sessions: SessionManager,
}

impl CancelHandle {
    /// Cancel the current check. Never fails; termination errors are
    /// swallowed.
    pub async fn cancel(&self) {
        warn!("Cancellation requested");
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel.set();
        self.sessions.terminate().await;
    }
}

/// Public entry point of the automation engine.
///
/// At most one check may be in flight at a time; the single browser session
/// is the serialization point. Run checks on a worker task (see
/// [`QuotaChecker::spawn_check`]) so the caller's own loop never blocks on
/// browser I/O.
pub struct QuotaChecker {
    config: QuotaConfig,
    sessions: SessionManager,
    cancel: CancelFlag,
    /// Bumped by every cancellation; a call whose starting generation no
    /// longer matches resolves as `Cancelled` even if the scrape finished,
    /// so a stale success can never overwrite a cancel.
    generation: Arc<AtomicU64>,
    in_flight: Arc<AtomicBool>,
}

impl QuotaChecker {
    pub fn new(config: QuotaConfig) -> Self {
        let sessions = SessionManager::new(SessionConfig::new(config.webdriver_url.clone()));
        Self {
            config,
            sessions,
            cancel: CancelFlag::default(),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cancelling from another task (e.g. the caller's UI loop).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel: self.cancel.clone(),
            generation: self.generation.clone(),
            sessions: self.sessions.clone(),
        }
    }

    /// Log in and read the remaining quota for one account.
    ///
    /// `debug` selects a visible browser window; otherwise the session runs
    /// headless. Ordinary failures (rejected login, missing element,
    /// timeout) leave the session alive for the next call; only driver
    /// faults, cancellation and mode switches discard it.
    ///
    /// A second call while one is in flight is rejected immediately. The
    /// closed taxonomy has no caller-misuse kind, so the rejection is
    /// reported as `DriverFault` — unlike a real driver fault it happens
    /// before any session work and does not discard the session.
    pub async fn get_quota(
        &self,
        credential: &Credential,
        service_label: &str,
        debug: bool,
    ) -> Result<QuotaResult, AutomationError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AutomationError::DriverFault(
                "a quota check is already in flight; queue calls externally".to_string(),
            ));
        }
        let result = self.run_check(credential, service_label, debug).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// Run [`Self::get_quota`] on a dedicated worker task. The join handle
    /// is the thread-safe handoff back to the caller's own loop.
    pub fn spawn_check(
        self: &Arc<Self>,
        credential: Credential,
        service_label: String,
        debug: bool,
    ) -> JoinHandle<Result<QuotaResult, AutomationError>> {
        let checker = Arc::clone(self);
        tokio::spawn(async move { checker.get_quota(&credential, &service_label, debug).await })
    }

    /// Terminate the browser session. Call on process shutdown.
    pub async fn shutdown(&self) {
        self.sessions.terminate().await;
    }

    async fn run_check(
        &self,
        credential: &Credential,
        service_label: &str,
        debug: bool,
    ) -> Result<QuotaResult, AutomationError> {
        let generation_at_start = self.generation.load(Ordering::SeqCst);
        // A flag left over from a cancel that landed after the previous
        // call completed must not kill this one
        self.cancel.clear();

        let mode = SessionMode::from_debug_flag(debug);
        info!(
            "Quota check started for {} ({:?}, mode {:?})",
            mask_sensitive(&credential.identifier),
            credential.class,
            mode
        );

        let outcome = self.drive(credential, service_label, mode).await;

        if let Err(err) = &outcome {
            if err.is_fatal() {
                warn!("Driver fault, discarding session: {err}");
                self.sessions.terminate().await;
            }
        }

        self.finalize(generation_at_start, outcome)
    }

    async fn drive(
        &self,
        credential: &Credential,
        service_label: &str,
        mode: SessionMode,
    ) -> Result<QuotaResult, AutomationError> {
        let client = self.sessions.ensure(mode).await?;
        self.cancel.check()?;

        let class = login::login(&client, &self.config, credential, service_label, &self.cancel).await?;

        self.cancel.check()?;
        quota::extract(&client, &self.config, class).await
    }

    /// Apply the generation check: a result - success or failure - from a
    /// call that was cancelled mid-flight resolves as `Cancelled`. The
    /// session was already torn down by the cancel path.
    fn finalize(
        &self,
        generation_at_start: u64,
        outcome: Result<QuotaResult, AutomationError>,
    ) -> Result<QuotaResult, AutomationError> {
        if self.generation.load(Ordering::SeqCst) != generation_at_start || self.cancel.is_cancelled()
        {
            info!("Check result discarded: cancelled mid-flight");
            return Err(AutomationError::Cancelled);
        }
        match &outcome {
            Ok(result) => info!("Quota check finished: {}", result.display),
            Err(err) => warn!("Quota check failed: {err}"),
        }
        outcome
    }
}
