//! Automation error taxonomy.
//!
//! Every failure that escapes this crate is one of these kinds; raw driver
//! errors are classified at the point where the context is known.

use thiserror::Error;

/// Automation failure kinds
#[derive(Debug, Error)]
pub enum AutomationError {
    /// No candidate strategy matched a logical UI target. Carries the
    /// target's name (e.g. "username field").
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// An unexpected native dialog kept interrupting an interaction even
    /// after being dismissed and retried.
    #[error("an unexpected dialog interrupted the interaction")]
    DialogInterrupted,

    /// The portal rejected the login; carries the portal's own inline
    /// error text where available.
    #[error("login rejected: {0}")]
    LoginRejected(String),

    /// A bounded wait expired. Carries the protocol stage that timed out.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Driver-level fault (connection, process, protocol). The only kind
    /// after which the browser session must be discarded.
    #[error("browser driver fault: {0}")]
    DriverFault(String),

    /// The call was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl AutomationError {
    /// Whether the session must be torn down after this error.
    /// Ordinary login/extraction failures leave the session reusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AutomationError::DriverFault(_))
    }

    /// Generic explanation for failures with no portal-provided text.
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            AutomationError::ElementNotFound(_) | AutomationError::Timeout(_) => Some(
                "The site layout may have changed, or the portal is responding slowly. \
                 Try again, or try debug mode to watch the browser.",
            ),
            _ => None,
        }
    }
}

impl From<fantoccini::error::NewSessionError> for AutomationError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        AutomationError::DriverFault(format!("failed to start browser session: {err}"))
    }
}

impl From<fantoccini::error::CmdError> for AutomationError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        AutomationError::DriverFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_driver_fault_is_fatal() {
        assert!(AutomationError::DriverFault("gone".into()).is_fatal());
        assert!(!AutomationError::ElementNotFound("username field".into()).is_fatal());
        assert!(!AutomationError::LoginRejected("bad password".into()).is_fatal());
        assert!(!AutomationError::Timeout("page-load".into()).is_fatal());
        assert!(!AutomationError::DialogInterrupted.is_fatal());
        assert!(!AutomationError::Cancelled.is_fatal());
    }

    #[test]
    fn test_hint_only_for_layout_failures() {
        assert!(AutomationError::ElementNotFound("quota-value".into())
            .user_hint()
            .is_some());
        assert!(AutomationError::Timeout("await-outcome".into())
            .user_hint()
            .is_some());
        assert!(AutomationError::LoginRejected("Invalid credentials".into())
            .user_hint()
            .is_none());
        assert!(AutomationError::Cancelled.user_hint().is_none());
    }
}
