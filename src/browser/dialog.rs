//! Guard against unexpected native browser dialogs.
//!
//! The portal occasionally throws up a native alert mid-interaction
//! (session-expiry notices, mostly). An open alert makes every subsequent
//! WebDriver command fail, so interactions that have been observed to race
//! with it go through [`guarded_click`]: check-and-dismiss before the click,
//! dismiss-and-retry once if the click itself was interrupted, and fall back
//! to a simulated pointer move+click if the direct click fails for other
//! reasons.

use std::time::Duration;

use fantoccini::actions::{InputSource, MouseActions, PointerAction, MOUSE_BUTTON_LEFT};
use fantoccini::elements::Element;
use fantoccini::Client;
use tracing::{debug, warn};

use super::AutomationError;

/// How long the page gets to settle after an alert is dismissed.
const DISMISS_SETTLE: Duration = Duration::from_millis(500);

/// Dismiss a native alert if one is open. Returns `true` when an alert was
/// present and accepted. A failed alert-text read just means no alert is open.
pub async fn dismiss_unexpected(client: &Client) -> Result<bool, AutomationError> {
    match client.get_alert_text().await {
        Ok(text) => {
            warn!("Unexpected dialog detected ({text:?}), dismissing");
            client
                .accept_alert()
                .await
                .map_err(|e| AutomationError::DriverFault(e.to_string()))?;
            tokio::time::sleep(DISMISS_SETTLE).await;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Click an element with dialog protection.
///
/// Policy: dismiss any already-open alert, click; if the click fails and an
/// alert turns out to be the cause, dismiss it and retry exactly once; if
/// the retry is interrupted again the interaction fails as
/// [`AutomationError::DialogInterrupted`]. A click failure with no alert in
/// sight falls back to a simulated pointer move+click, which gets past
/// overlay quirks a direct element click trips over.
pub async fn guarded_click(client: &Client, element: &Element) -> Result<(), AutomationError> {
    dismiss_unexpected(client).await?;

    let first_err = match element.click().await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if dismiss_unexpected(client).await? {
        debug!("Click interrupted by dialog, retrying once");
        match element.click().await {
            Ok(()) => return Ok(()),
            Err(_) => {
                if dismiss_unexpected(client).await? {
                    return Err(AutomationError::DialogInterrupted);
                }
                return pointer_click(client, element).await;
            }
        }
    }

    debug!("Direct click failed ({first_err}), falling back to pointer actions");
    pointer_click(client, element).await
}

/// Simulated user click: move the pointer onto the element, press, release.
async fn pointer_click(client: &Client, element: &Element) -> Result<(), AutomationError> {
    let actions = MouseActions::new("mouse".to_string())
        .then(PointerAction::MoveToElement {
            element: element.clone(),
            duration: None,
            x: 0,
            y: 0,
        })
        .then(PointerAction::Down {
            button: MOUSE_BUTTON_LEFT,
        })
        .then(PointerAction::Up {
            button: MOUSE_BUTTON_LEFT,
        });

    client
        .perform_actions(actions)
        .await
        .map_err(|e| AutomationError::DriverFault(format!("pointer click failed: {e}")))
}
