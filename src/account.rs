//! Account credentials and account-class inference.

use serde::{Deserialize, Serialize};

use crate::mask_sensitive;

/// Service label selected in the portal's dropdown for fixed-line accounts.
pub const DEFAULT_SERVICE_LABEL: &str = "Internet";

/// The two service categories the portal distinguishes. They have different
/// login flows (mobile skips service selection) and different quota markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountClass {
    /// Fixed broadband line; quota is rendered directly in GB.
    Fixed,
    /// Mobile/4G line; quota is rendered in MB.
    Mobile,
}

impl AccountClass {
    /// Classify an account by its service number.
    ///
    /// Portal-defined business rule, not an engineering invariant: mobile/4G
    /// numbers start with `015`, everything else is a fixed line. Kept as the
    /// single place to correct if the numbering plan ever changes.
    pub fn infer(identifier: &str) -> Self {
        if identifier.starts_with("015") {
            AccountClass::Mobile
        } else {
            AccountClass::Fixed
        }
    }
}

/// One account's login material, supplied per call by the credential store.
/// Never persisted here; the secret never appears in logs (see the manual
/// `Debug` impl).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Service number used as the portal login identifier
    pub identifier: String,
    /// Portal password
    pub secret: String,
    /// Service category, inferred from the identifier unless overridden
    pub class: AccountClass,
}

impl Credential {
    /// Build a credential, inferring the account class from the identifier.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let class = AccountClass::infer(&identifier);
        Self {
            identifier,
            secret: secret.into(),
            class,
        }
    }

    /// Override the inferred account class (the credential store may carry
    /// an explicit classification).
    pub fn with_class(mut self, class: AccountClass) -> Self {
        self.class = class;
        self
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &mask_sensitive(&self.identifier))
            .field("secret", &"<redacted>")
            .field("class", &self.class)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_prefix_classifies_as_mobile() {
        assert_eq!(AccountClass::infer("01512345678"), AccountClass::Mobile);
        assert_eq!(AccountClass::infer("015"), AccountClass::Mobile);
    }

    #[test]
    fn test_other_prefixes_classify_as_fixed() {
        assert_eq!(AccountClass::infer("0233333333"), AccountClass::Fixed);
        assert_eq!(AccountClass::infer("0101234567"), AccountClass::Fixed);
        assert_eq!(AccountClass::infer(""), AccountClass::Fixed);
    }

    #[test]
    fn test_credential_infers_class() {
        let cred = Credential::new("01512345678", "secret");
        assert_eq!(cred.class, AccountClass::Mobile);

        let cred = Credential::new("0233333333", "secret");
        assert_eq!(cred.class, AccountClass::Fixed);
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let cred = Credential::new("0233333333", "hunter2hunter2");
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
