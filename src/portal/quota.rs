//! Quota extraction and normalization.
//!
//! Two mutually exclusive algorithms, selected by account class after a
//! successful login. Fixed-line dashboards render the figure directly in
//! GB; mobile dashboards render it in MB next to a "Remaining" label, so
//! the raw value is converted before display.

use fantoccini::{Client, Locator};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::account::AccountClass;
use crate::browser::{locate, AutomationError};
use crate::portal::selectors;
use crate::QuotaConfig;

/// Logical target name reported when no quota figure could be read.
const QUOTA_TARGET: &str = "quota-value";

/// Unit of a normalized quota value. The portal only ever reports data
/// volumes; everything is normalized to gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotaUnit {
    Gigabytes,
}

impl QuotaUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            QuotaUnit::Gigabytes => "GB",
        }
    }
}

/// A normalized remaining-quota reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaResult {
    /// Remaining volume in gigabytes
    pub gigabytes: f64,
    pub unit: QuotaUnit,
    /// Human-readable form, always with the unit suffix
    pub display: String,
}

/// Extract the remaining quota from the rendered dashboard.
pub async fn extract(
    client: &Client,
    config: &QuotaConfig,
    class: AccountClass,
) -> Result<QuotaResult, AutomationError> {
    match class {
        AccountClass::Fixed => extract_fixed(client, config).await,
        AccountClass::Mobile => extract_mobile(client, config).await,
    }
}

/// Fixed-line: one element marked by two co-occurring style attributes,
/// value already in GB, passed through verbatim.
async fn extract_fixed(client: &Client, config: &QuotaConfig) -> Result<QuotaResult, AutomationError> {
    let element = locate(
        client,
        QUOTA_TARGET,
        &selectors::fixed_quota_figure(config.quota_timeout()),
    )
    .await?;
    let raw = element.text().await?;
    debug!("Fixed-line quota figure matched by style attributes: {raw:?}");
    let result = fixed_result(&raw)?;
    info!("Remaining quota: {}", result.display);
    Ok(result)
}

/// Mobile: find a "Remaining" label, scan its parent's sibling spans for
/// the first purely numeric text (the raw figure in MB). Falls back to the
/// font-size style match when the sibling scan comes up empty.
async fn extract_mobile(client: &Client, config: &QuotaConfig) -> Result<QuotaResult, AutomationError> {
    // Give the usage overview a moment to finish rendering
    sleep(Duration::from_millis(config.mobile_settle_ms)).await;

    let mut raw: Option<String> = None;

    let labels = client
        .find_all(Locator::XPath(selectors::REMAINING_LABELS))
        .await?;
    debug!("Found {} 'Remaining' label(s)", labels.len());

    'labels: for label in labels {
        let parent = match label.find(Locator::XPath("..")).await {
            Ok(parent) => parent,
            Err(_) => continue,
        };
        let siblings = match parent.find_all(Locator::Css("span")).await {
            Ok(spans) => spans,
            Err(_) => continue,
        };
        for sibling in siblings {
            if let Ok(text) = sibling.text().await {
                let text = text.trim().to_string();
                if looks_numeric(&text) {
                    debug!("Quota figure found via sibling scan: {text:?}");
                    raw = Some(text);
                    break 'labels;
                }
            }
        }
    }

    let raw = match raw {
        Some(raw) => raw,
        None => {
            debug!("Sibling scan found no figure, falling back to style match");
            let element = locate(
                client,
                QUOTA_TARGET,
                &selectors::mobile_quota_fallback(config.field_timeout()),
            )
            .await?;
            element.text().await?
        }
    };

    let result = mobile_result(&raw)?;
    info!("Remaining quota: {} ({} MB raw)", result.display, raw);
    Ok(result)
}

/// Whether `text`, with thousands separators and decimal points removed,
/// is purely numeric - the shape of a rendered quota figure.
fn looks_numeric(text: &str) -> bool {
    let digits: String = text.chars().filter(|c| *c != ',' && *c != '.').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Parse a rendered decimal, stripping thousands separators.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse::<f64>().ok()
}

/// Normalize a fixed-line reading: literal text plus the unit suffix, no
/// reformatting.
pub(crate) fn fixed_result(raw: &str) -> Result<QuotaResult, AutomationError> {
    let trimmed = raw.trim();
    let gigabytes = parse_decimal(trimmed)
        .ok_or_else(|| AutomationError::ElementNotFound(QUOTA_TARGET.to_string()))?;
    Ok(QuotaResult {
        gigabytes,
        unit: QuotaUnit::Gigabytes,
        display: format!("{} {}", trimmed, QuotaUnit::Gigabytes.suffix()),
    })
}

/// Normalize a mobile reading: MB -> GB (divide by 1024), two decimals.
pub(crate) fn mobile_result(raw_mb: &str) -> Result<QuotaResult, AutomationError> {
    let megabytes = parse_decimal(raw_mb)
        .ok_or_else(|| AutomationError::ElementNotFound(QUOTA_TARGET.to_string()))?;
    let gigabytes = megabytes / 1024.0;
    Ok(QuotaResult {
        gigabytes,
        unit: QuotaUnit::Gigabytes,
        display: format!("{:.2} {}", gigabytes, QuotaUnit::Gigabytes.suffix()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_reading_is_a_pass_through() {
        let result = fixed_result("45.5").unwrap();
        assert_eq!(result.display, "45.5 GB");
        assert_eq!(result.gigabytes, 45.5);
        assert_eq!(result.unit, QuotaUnit::Gigabytes);
    }

    #[test]
    fn test_fixed_reading_trims_whitespace_only() {
        let result = fixed_result("  45.5 ").unwrap();
        assert_eq!(result.display, "45.5 GB");
    }

    #[test]
    fn test_mobile_reading_converts_mb_to_gb() {
        // 31876.02 / 1024 = 31.1289... -> rounds to two decimals
        let result = mobile_result("31,876.02").unwrap();
        assert_eq!(result.display, "31.13 GB");
        assert!((result.gigabytes - 31.1289).abs() < 0.001);
    }

    #[test]
    fn test_mobile_reading_without_separators() {
        let result = mobile_result("1024").unwrap();
        assert_eq!(result.display, "1.00 GB");
        assert_eq!(result.gigabytes, 1.0);
    }

    #[test]
    fn test_unparseable_reading_is_element_not_found() {
        for raw in ["", "  ", "N/A", "-- GB"] {
            match fixed_result(raw) {
                Err(AutomationError::ElementNotFound(target)) => {
                    assert_eq!(target, "quota-value")
                }
                other => panic!("expected ElementNotFound, got {other:?}"),
            }
        }
        assert!(matches!(
            mobile_result("loading"),
            Err(AutomationError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("31,876.02"));
        assert!(looks_numeric("1024"));
        assert!(looks_numeric("0.5"));
        assert!(!looks_numeric(""));
        assert!(!looks_numeric("Remaining"));
        assert!(!looks_numeric("12 GB"));
    }
}
