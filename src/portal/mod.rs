//! Portal-specific knowledge: the my.te.eg login protocol, its DOM
//! assumptions, and quota extraction. Everything brittle about the portal's
//! markup lives in [`selectors`]; the flow in [`login`] only speaks in
//! logical targets.

pub mod login;
pub mod quota;
pub mod selectors;

pub use quota::{QuotaResult, QuotaUnit};
