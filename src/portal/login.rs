//! The login/navigation protocol.
//!
//! Strictly sequential: navigate, enter identifier, enter secret, classify
//! the account, select the service class (fixed-line only), submit, then
//! race the success widget against the inline error message. Each step is
//! entered only from the previous step's success and the cancel flag is
//! checked at every step boundary.

use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

use crate::account::{AccountClass, Credential};
use crate::browser::{dismiss_unexpected, guarded_click, locate, wait_gone, AutomationError, Strategy};
use crate::checker::CancelFlag;
use crate::mask_sensitive;
use crate::portal::selectors;
use crate::QuotaConfig;

/// Drive the full login protocol. On success the dashboard is rendered and
/// ready for extraction; the account class is returned for the extractor's
/// branch.
pub async fn login(
    client: &Client,
    config: &QuotaConfig,
    credential: &Credential,
    service_label: &str,
    cancel: &CancelFlag,
) -> Result<AccountClass, AutomationError> {
    // 1. Navigate
    cancel.check()?;
    info!("Navigating to {}", config.login_url);
    client.goto(&config.login_url).await?;
    wait_for_page_root(client, config).await?;

    // 2. Identifier
    cancel.check()?;
    debug!("Entering identifier {}", mask_sensitive(&credential.identifier));
    let field = locate(
        client,
        "username field",
        &selectors::username_field(config.field_timeout()),
    )
    .await?;
    field.clear().await?;
    field.send_keys(&credential.identifier).await?;

    // 3. Secret
    cancel.check()?;
    debug!("Entering secret");
    let field = locate(
        client,
        "password field",
        &selectors::password_field(config.secret_field_timeout()),
    )
    .await?;
    field.clear().await?;
    field.send_keys(&credential.secret).await?;

    // 4. Classify
    let class = credential.class;
    if class == AccountClass::Mobile {
        info!("Mobile account, skipping service selection");
    } else {
        // 5. Service class (fixed-line only). A failure here is fatal to the
        // whole login: submit silently does nothing without a selected
        // service, so the underlying cause is surfaced as-is.
        cancel.check()?;
        select_service(client, config, service_label).await?;
    }

    // 6. Submit
    cancel.check()?;
    info!("Submitting login");
    let button = locate(
        client,
        "login button",
        &selectors::login_button(config.field_timeout()),
    )
    .await?;
    button.click().await?;

    // 7. Outcome race
    cancel.check()?;
    await_outcome(client, config, cancel).await?;
    info!("Login accepted, waiting for dashboard");

    // 8. Dashboard ready
    cancel.check()?;
    let spinner = Strategy::css(selectors::LOADING_SPINNER);
    let gone = wait_gone(
        client,
        &spinner,
        config.dashboard_timeout(),
        config.poll_interval(),
    )
    .await?;
    if !gone {
        return Err(AutomationError::Timeout("dashboard-ready".to_string()));
    }

    Ok(class)
}

/// Minimal DOM-ready wait after navigation.
async fn wait_for_page_root(client: &Client, config: &QuotaConfig) -> Result<(), AutomationError> {
    match client
        .wait()
        .at_most(config.page_load_timeout())
        .for_element(Locator::Css(selectors::PAGE_ROOT))
        .await
    {
        Ok(_) => Ok(()),
        Err(CmdError::WaitTimeout) => Err(AutomationError::Timeout("page-load".to_string())),
        Err(e) => Err(AutomationError::DriverFault(e.to_string())),
    }
}

/// Open the service dropdown and pick the option matching `service_label`.
/// Both clicks go through the dialog guard; an alert has been observed to
/// appear exactly around this interaction.
async fn select_service(
    client: &Client,
    config: &QuotaConfig,
    service_label: &str,
) -> Result<(), AutomationError> {
    info!("Selecting service class: {service_label}");

    let dropdown = locate(
        client,
        "service dropdown",
        &selectors::service_dropdown(config.field_timeout()),
    )
    .await?;

    dismiss_unexpected(client).await?;
    guarded_click(client, &dropdown).await?;

    // Let the option list's open animation finish before querying it
    sleep(Duration::from_millis(config.dropdown_animation_ms)).await;
    dismiss_unexpected(client).await?;

    let option = locate(
        client,
        "service option",
        &selectors::service_option(service_label, config.field_timeout()),
    )
    .await?;
    guarded_click(client, &option).await?;

    sleep(Duration::from_millis(config.post_select_delay_ms)).await;
    debug!("Service class selected");
    Ok(())
}

/// Race the success widget against the inline error message under one
/// shared deadline.
async fn await_outcome(
    client: &Client,
    config: &QuotaConfig,
    cancel: &CancelFlag,
) -> Result<(), AutomationError> {
    let deadline = Instant::now() + config.outcome_timeout();
    loop {
        cancel.check()?;

        let success_visible =
            element_present(client, selectors::LOGIN_PROGRESS_WIDGET).await?;

        let inline_error = match client
            .find(Locator::Css(selectors::LOGIN_ERROR_MESSAGE))
            .await
        {
            // A text read failing on a just-found element falls back to the
            // generic message rather than aborting the branch
            Ok(element) => Some(element.text().await.unwrap_or_default()),
            Err(e) if e.is_no_such_element() => None,
            Err(e) => return Err(AutomationError::DriverFault(e.to_string())),
        };

        if let Some(outcome) =
            decide_outcome(success_visible, inline_error, Instant::now() >= deadline)
        {
            return outcome;
        }
        sleep(config.poll_interval()).await;
    }
}

/// Whether an element matching `selector` is currently on the page. Only a
/// genuine no-such-element counts as absent; other driver errors abort.
async fn element_present(client: &Client, selector: &str) -> Result<bool, AutomationError> {
    match client.find(Locator::Css(selector)).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_no_such_element() => Ok(false),
        Err(e) => Err(AutomationError::DriverFault(e.to_string())),
    }
}

/// One polling round's branch decision for the outcome race.
///
/// The success widget wins when both indicators are visible, so a dashboard
/// that still shows a stale error toast resolves to the success branch. An
/// inline error surfaces the portal's own text verbatim, falling back to a
/// generic message when the toast is empty. `None` means keep polling.
fn decide_outcome(
    success_visible: bool,
    inline_error: Option<String>,
    deadline_passed: bool,
) -> Option<Result<(), AutomationError>> {
    if success_visible {
        return Some(Ok(()));
    }
    if let Some(raw) = inline_error {
        let message = raw.trim();
        let message = if message.is_empty() {
            "Unknown login error".to_string()
        } else {
            message.to_string()
        };
        return Some(Err(AutomationError::LoginRejected(message)));
    }
    if deadline_passed {
        return Some(Err(AutomationError::Timeout("await-outcome".to_string())));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_error_surfaces_portal_text() {
        let outcome = decide_outcome(false, Some("Invalid credentials".to_string()), false);
        match outcome {
            Some(Err(AutomationError::LoginRejected(message))) => {
                assert_eq!(message, "Invalid credentials")
            }
            other => panic!("expected LoginRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_error_toast_gets_generic_message() {
        for raw in ["", "   "] {
            match decide_outcome(false, Some(raw.to_string()), false) {
                Some(Err(AutomationError::LoginRejected(message))) => {
                    assert_eq!(message, "Unknown login error")
                }
                other => panic!("expected LoginRejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_success_widget_wins_over_error_toast() {
        let outcome = decide_outcome(true, Some("stale toast".to_string()), false);
        assert!(matches!(outcome, Some(Ok(()))));
    }

    #[test]
    fn test_neither_indicator_times_out_at_deadline() {
        assert!(decide_outcome(false, None, false).is_none());
        match decide_outcome(false, None, true) {
            Some(Err(AutomationError::Timeout(stage))) => assert_eq!(stage, "await-outcome"),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }
}
