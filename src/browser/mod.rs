//! Browser subsystem: session lifecycle, element location, dialog handling.

pub mod dialog;
pub mod errors;
pub mod locator;
pub mod session;

pub use dialog::{dismiss_unexpected, guarded_click};
pub use errors::AutomationError;
pub use locator::{locate, wait_gone, Candidate, Strategy};
pub use session::{SessionConfig, SessionManager, SessionMode};
