//! ISP Quota Checker
//!
//! Browser-automation core that retrieves the remaining-data quota from the
//! my.te.eg portal. The portal exposes no public API and renders the quota
//! client-side behind an authenticated session, so a real browser (Firefox
//! via geckodriver, WebDriver protocol) drives the login flow and scrapes
//! the rendered value.
//!
//! The front-end that collects accounts and displays results, and the
//! encrypted credential store, are external collaborators; this crate is the
//! engine they call into. See [`checker::QuotaChecker`] for the entry point.

pub mod account;
pub mod browser;
pub mod checker;
pub mod portal;

use std::time::Duration;

pub use account::{AccountClass, Credential, DEFAULT_SERVICE_LABEL};
pub use browser::{AutomationError, SessionMode};
pub use checker::{CancelHandle, QuotaChecker};
pub use portal::{QuotaResult, QuotaUnit};

/// Configuration for a quota check run.
///
/// Config-as-value: everything the engine needs is carried here explicitly;
/// nothing is read from the ambient process environment inside the core.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaConfig {
    /// Portal login page
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// WebDriver endpoint (geckodriver)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Initial page-load wait (DOM root present)
    #[serde(default = "default_page_load_secs")]
    pub page_load_timeout_secs: u64,
    /// Per-candidate wait when locating form fields
    #[serde(default = "default_field_secs")]
    pub field_timeout_secs: u64,
    /// Per-candidate wait for the password field (shorter; the form is
    /// already rendered once the username field was found)
    #[serde(default = "default_secret_field_secs")]
    pub secret_field_timeout_secs: u64,
    /// Shared deadline for the success-vs-error outcome race after submit
    #[serde(default = "default_outcome_secs")]
    pub outcome_timeout_secs: u64,
    /// Wait for the dashboard loading spinner to disappear
    #[serde(default = "default_dashboard_secs")]
    pub dashboard_timeout_secs: u64,
    /// Per-candidate wait when locating the rendered quota figure
    #[serde(default = "default_quota_secs")]
    pub quota_timeout_secs: u64,

    /// Poll interval for hand-rolled waits (outcome race, spinner clear)
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,
    /// Settle time for the service dropdown's open animation
    #[serde(default = "default_dropdown_animation_ms")]
    pub dropdown_animation_ms: u64,
    /// Settle time after picking a service option
    #[serde(default = "default_post_select_ms")]
    pub post_select_delay_ms: u64,
    /// Settle time before scanning the mobile usage overview
    #[serde(default = "default_mobile_settle_ms")]
    pub mobile_settle_ms: u64,
}

fn default_login_url() -> String {
    "https://my.te.eg/user/login".to_string()
}
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_page_load_secs() -> u64 {
    20
}
fn default_field_secs() -> u64 {
    10
}
fn default_secret_field_secs() -> u64 {
    5
}
fn default_outcome_secs() -> u64 {
    30
}
fn default_dashboard_secs() -> u64 {
    20
}
fn default_quota_secs() -> u64 {
    15
}
fn default_poll_ms() -> u64 {
    250
}
fn default_dropdown_animation_ms() -> u64 {
    1500
}
fn default_post_select_ms() -> u64 {
    1000
}
fn default_mobile_settle_ms() -> u64 {
    2000
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            webdriver_url: default_webdriver_url(),
            page_load_timeout_secs: default_page_load_secs(),
            field_timeout_secs: default_field_secs(),
            secret_field_timeout_secs: default_secret_field_secs(),
            outcome_timeout_secs: default_outcome_secs(),
            dashboard_timeout_secs: default_dashboard_secs(),
            quota_timeout_secs: default_quota_secs(),
            poll_interval_ms: default_poll_ms(),
            dropdown_animation_ms: default_dropdown_animation_ms(),
            post_select_delay_ms: default_post_select_ms(),
            mobile_settle_ms: default_mobile_settle_ms(),
        }
    }
}

impl QuotaConfig {
    /// Set the WebDriver endpoint
    pub fn webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Set the portal login URL
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_secs(self.field_timeout_secs)
    }

    pub fn secret_field_timeout(&self) -> Duration {
        Duration::from_secs(self.secret_field_timeout_secs)
    }

    pub fn outcome_timeout(&self) -> Duration {
        Duration::from_secs(self.outcome_timeout_secs)
    }

    pub fn dashboard_timeout(&self) -> Duration {
        Duration::from_secs(self.dashboard_timeout_secs)
    }

    pub fn quota_timeout(&self) -> Duration {
        Duration::from_secs(self.quota_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Mask a sensitive value for logging. Keeps the first and last two
/// characters of longer values; short values are fully starred.
pub fn mask_sensitive(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len == 0 {
        return String::new();
    }
    if len <= 4 {
        return "*".repeat(len);
    }
    format!(
        "{}{}{}",
        chars[..2].iter().collect::<String>(),
        "*".repeat(len - 4),
        chars[len - 2..].iter().collect::<String>()
    )
}
