//! Element location via ordered candidate strategies.
//!
//! The portal's markup varies (A/B layouts, minor releases), so every
//! logical target is described by a declarative list of candidates tried in
//! priority order: first a fast, specific strategy, then slower positional
//! fallbacks. Adapting to a portal change means adding a candidate to the
//! table, not touching the login flow.

use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use tracing::{debug, warn};

use super::AutomationError;

/// One way of addressing an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// CSS selector (semantic attribute/class match)
    Css(String),
    /// XPath expression (semantic, structural-path or style-attribute match)
    XPath(String),
}

impl Strategy {
    pub fn css(selector: impl Into<String>) -> Self {
        Strategy::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Strategy::XPath(expression.into())
    }

    pub(crate) fn locator(&self) -> Locator<'_> {
        match self {
            Strategy::Css(s) => Locator::Css(s),
            Strategy::XPath(s) => Locator::XPath(s),
        }
    }
}

/// A strategy with its own bounded wait.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub strategy: Strategy,
    pub timeout: Duration,
}

impl Candidate {
    pub fn new(strategy: Strategy, timeout: Duration) -> Self {
        Self { strategy, timeout }
    }
}

/// Resolve a logical target to an element handle.
///
/// Candidates are tried in order, each with its own bounded wait; the first
/// match wins, so offering only the fallback yields the same element the
/// full list would when the primary doesn't match. If every candidate times
/// out the failure is [`AutomationError::ElementNotFound`] carrying
/// `target`; any other driver error aborts immediately as a
/// [`AutomationError::DriverFault`].
pub async fn locate(
    client: &Client,
    target: &str,
    candidates: &[Candidate],
) -> Result<Element, AutomationError> {
    for candidate in candidates {
        debug!(
            "Locating {target}: trying {:?} (up to {:?})",
            candidate.strategy, candidate.timeout
        );
        match client
            .wait()
            .at_most(candidate.timeout)
            .for_element(candidate.strategy.locator())
            .await
        {
            Ok(element) => {
                debug!("Located {target} via {:?}", candidate.strategy);
                return Ok(element);
            }
            Err(CmdError::WaitTimeout) => continue,
            Err(e) => return Err(AutomationError::DriverFault(e.to_string())),
        }
    }
    warn!("No candidate strategy matched {target}");
    Err(AutomationError::ElementNotFound(target.to_string()))
}

/// Wait for an element to be absent from the page (e.g. a loading spinner).
/// Returns `true` once gone, `false` if still present when `timeout`
/// expires. Only a genuine no-such-element counts as absent; any other
/// driver error (dead session, protocol failure) aborts as
/// [`AutomationError::DriverFault`] instead of masquerading as progress.
pub async fn wait_gone(
    client: &Client,
    strategy: &Strategy,
    timeout: Duration,
    poll: Duration,
) -> Result<bool, AutomationError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match client.find(strategy.locator()).await {
            Ok(_) => {}
            Err(e) if e.is_no_such_element() => return Ok(true),
            Err(e) => return Err(AutomationError::DriverFault(e.to_string())),
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(poll).await;
    }
}
