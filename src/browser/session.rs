//! Browser session lifecycle.
//!
//! Owns at most one live browser (Firefox via geckodriver) at a time and
//! decides when it may be reused versus must be recreated. Reuse keeps the
//! browser process warm between checks; a cookie wipe before each login
//! stops portal UI state from leaking across calls.

use std::sync::Arc;

use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::AutomationError;

/// How the browser window is run. A property of the session, not of a
/// single call: switching modes always recreates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    /// No visible window
    Headless,
    /// Visible window, for watching the flow in debug mode
    Visible,
}

impl SessionMode {
    /// Map the caller's debug flag to a session mode.
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            SessionMode::Visible
        } else {
            SessionMode::Headless
        }
    }
}

/// Configuration for creating browser sessions
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// WebDriver endpoint (geckodriver)
    pub webdriver_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    /// WebDriver capabilities for a session in `mode`.
    ///
    /// `pageLoadStrategy: eager` returns control once the DOM is
    /// interactive; the portal keeps loading assets long after the login
    /// form is usable, so waiting for `load` would burn the page-load
    /// budget for nothing.
    pub(crate) fn capabilities(&self, mode: SessionMode) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("firefox"));
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));

        let mut args: Vec<&str> = Vec::new();
        if mode == SessionMode::Headless {
            args.push("-headless");
        }
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        caps
    }
}

/// One live browser plus the mode it was created in.
struct ActiveSession {
    client: Client,
    mode: SessionMode,
}

/// Owns the single browser session. Cheap to clone; clones share the same
/// session slot, which is what lets a cancel handle terminate a session
/// another task is using.
#[derive(Clone)]
pub struct SessionManager {
    config: SessionConfig,
    current: Arc<RwLock<Option<ActiveSession>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a session in the requested mode, creating or recreating as needed.
    ///
    /// - no session: create one
    /// - session in a different mode: terminate (best effort) and recreate
    /// - session in the same mode: wipe cookies and reuse
    ///
    /// Creation failure (driver not running, browser missing) surfaces as
    /// [`AutomationError::DriverFault`].
    pub async fn ensure(&self, mode: SessionMode) -> Result<Client, AutomationError> {
        let mut slot = self.current.write().await;

        if let Some(active) = slot.take() {
            if active.mode == mode {
                match active.client.delete_all_cookies().await {
                    Ok(()) => {
                        debug!("Reusing existing browser session (mode: {:?}), cookies cleared", mode);
                        let client = active.client.clone();
                        *slot = Some(active);
                        return Ok(client);
                    }
                    Err(e) => {
                        // The session is likely dead; fall through to recreation
                        warn!("Cookie wipe on existing session failed ({e}), recreating");
                        active.client.close().await.ok();
                    }
                }
            } else {
                info!("Session mode changed to {:?}, recreating browser", mode);
                if let Err(e) = active.client.close().await {
                    debug!("Ignoring close error during mode switch: {e}");
                }
            }
        }

        let client = self.connect(mode).await?;
        info!("Browser session created (mode: {:?})", mode);
        *slot = Some(ActiveSession {
            client: client.clone(),
            mode,
        });
        Ok(client)
    }

    async fn connect(&self, mode: SessionMode) -> Result<Client, AutomationError> {
        let caps = self.config.capabilities(mode);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.config.webdriver_url)
            .await?;
        Ok(client)
    }

    /// Terminate the session if one exists. Idempotent; all termination
    /// errors are swallowed. Used on cancellation, mode switches and
    /// process shutdown.
    pub async fn terminate(&self) {
        let mut slot = self.current.write().await;
        if let Some(active) = slot.take() {
            info!("Terminating browser session");
            if let Err(e) = active.client.close().await {
                debug!("Ignoring session close error: {e}");
            }
        }
    }

    /// Mode of the current session, if any.
    pub async fn current_mode(&self) -> Option<SessionMode> {
        self.current.read().await.as_ref().map(|s| s.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_debug_flag() {
        assert_eq!(SessionMode::from_debug_flag(true), SessionMode::Visible);
        assert_eq!(SessionMode::from_debug_flag(false), SessionMode::Headless);
    }

    #[test]
    fn test_headless_capabilities() {
        let caps = SessionConfig::default().capabilities(SessionMode::Headless);
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["pageLoadStrategy"], "eager");
        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("-headless")));
    }

    #[test]
    fn test_visible_capabilities_have_no_headless_arg() {
        let caps = SessionConfig::default().capabilities(SessionMode::Visible);
        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(args.is_empty());
    }

    #[tokio::test]
    async fn test_terminate_without_session_is_a_noop() {
        let manager = SessionManager::new(SessionConfig::default());
        manager.terminate().await;
        manager.terminate().await;
        assert_eq!(manager.current_mode().await, None);
    }
}
