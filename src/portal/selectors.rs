//! Selector tables for the my.te.eg portal.
//!
//! Each logical target gets an ordered candidate list: a semantic match
//! first, positional or style-based fallbacks after. The portal ships an
//! Ant Design UI, hence the `ant-*` class names.

use std::time::Duration;

use crate::browser::{Candidate, Strategy};

// -- Login form --------------------------------------------------------------

const USERNAME_SEMANTIC: &str = r#"//input[@type="text" or @id="etisalat-input"]"#;
const USERNAME_STRUCTURAL: &str = "/html/body/div[1]/section/main/div/div/div/div[2]/div/div[2]\
     /div/div[1]/div/form/div/div/div/div/div/div[1]/input";

const PASSWORD_SEMANTIC: &str = r#"//input[@type="password"]"#;
const PASSWORD_STRUCTURAL: &str = "/html/body/div[1]/section/main/div/div/div/div[2]/div/div[2]\
     /div/div[2]/form/div/div/div/div/input";

/// Page root; presence is the minimal DOM-ready signal after navigation.
pub const PAGE_ROOT: &str = "body";

/// The custom service-class dropdown control.
pub const SERVICE_DROPDOWN: &str = ".ant-select-selector";

/// The login submit control.
pub const LOGIN_BUTTON: &str = "#login-withecare";

// -- Post-submit outcome -----------------------------------------------------

/// Appears when authentication succeeded (usage widget on the dashboard).
pub const LOGIN_PROGRESS_WIDGET: &str = ".ant-progress-circle";

/// Inline error toast shown for rejected logins.
pub const LOGIN_ERROR_MESSAGE: &str = ".ant-message-error";

/// Dashboard loading indicator; data is not rendered while it is visible.
pub const LOADING_SPINNER: &str = ".ant-spin-spinning";

// -- Quota figures -----------------------------------------------------------

/// The two co-occurring style attributes assumed to uniquely mark the
/// fixed-line remaining-quota figure. Fragile by nature; if the portal's
/// theme changes, add a candidate rather than editing this one.
const QUOTA_FIXED_STYLE: &str = ".//span[contains(@style, 'font-size: 2.1875rem') \
     and contains(@style, 'color: var(--ec-brand-primary)')]";

/// Mobile fallback: the quota figure matched by font size alone.
const QUOTA_MOBILE_STYLE: &str = ".//span[contains(@style, 'font-size: 2.1875rem')]";

/// Labels next to the mobile remaining-quota value.
pub const REMAINING_LABELS: &str = "//span[contains(text(), 'Remaining')]";

/// Username field: semantic attribute match first, fixed structural path
/// as fallback.
pub fn username_field(timeout: Duration) -> Vec<Candidate> {
    vec![
        Candidate::new(Strategy::xpath(USERNAME_SEMANTIC), timeout),
        Candidate::new(Strategy::xpath(USERNAME_STRUCTURAL), timeout),
    ]
}

/// Password field, analogous to [`username_field`].
pub fn password_field(timeout: Duration) -> Vec<Candidate> {
    vec![
        Candidate::new(Strategy::xpath(PASSWORD_SEMANTIC), timeout),
        Candidate::new(Strategy::xpath(PASSWORD_STRUCTURAL), timeout),
    ]
}

pub fn service_dropdown(timeout: Duration) -> Vec<Candidate> {
    vec![Candidate::new(Strategy::css(SERVICE_DROPDOWN), timeout)]
}

/// Dropdown option whose visible text contains `label`.
pub fn service_option(label: &str, timeout: Duration) -> Vec<Candidate> {
    let xpath = format!(
        "//div[contains(@class, 'ant-select-item-option-content')]\
         //span[contains(text(), '{label}')]"
    );
    vec![Candidate::new(Strategy::xpath(xpath), timeout)]
}

pub fn login_button(timeout: Duration) -> Vec<Candidate> {
    vec![Candidate::new(Strategy::css(LOGIN_BUTTON), timeout)]
}

pub fn fixed_quota_figure(timeout: Duration) -> Vec<Candidate> {
    vec![Candidate::new(Strategy::xpath(QUOTA_FIXED_STYLE), timeout)]
}

pub fn mobile_quota_fallback(timeout: Duration) -> Vec<Candidate> {
    vec![Candidate::new(Strategy::xpath(QUOTA_MOBILE_STYLE), timeout)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_fields_try_semantic_strategy_first() {
        let timeout = Duration::from_secs(10);
        for candidates in [username_field(timeout), password_field(timeout)] {
            assert_eq!(candidates.len(), 2);
            // Primary is an attribute match, fallback an absolute path
            match (&candidates[0].strategy, &candidates[1].strategy) {
                (Strategy::XPath(primary), Strategy::XPath(fallback)) => {
                    assert!(primary.starts_with("//input"));
                    assert!(fallback.starts_with("/html/body"));
                }
                other => panic!("unexpected strategies: {other:?}"),
            }
        }
    }

    #[test]
    fn test_service_option_embeds_label() {
        let candidates = service_option("Internet", Duration::from_secs(10));
        match &candidates[0].strategy {
            Strategy::XPath(xpath) => assert!(xpath.contains("'Internet'")),
            other => panic!("unexpected strategy: {other:?}"),
        }
    }

    #[test]
    fn test_every_candidate_keeps_its_timeout() {
        let timeout = Duration::from_secs(5);
        for candidate in username_field(timeout)
            .into_iter()
            .chain(fixed_quota_figure(timeout))
        {
            assert_eq!(candidate.timeout, timeout);
        }
    }
}
