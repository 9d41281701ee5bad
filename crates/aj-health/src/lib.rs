//! Calorie provider gateway for the activity journal.
//!
//! A [`CalorieProvider`] answers one question: how many active kilocalories
//! were burned on a given local date. Hosts pick an implementation at startup
//! through [`create_provider`]:
//! - [`HttpCalorieProvider`] asks a health bridge over HTTP
//! - [`UnavailableProvider`] stands in where no health platform exists
//!
//! Failures come back as [`ProviderError`] values. Nothing here retries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for bridge calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const HTTP_BRIDGE_SOURCE_ID: &str = "http_bridge";
pub const UNAVAILABLE_SOURCE_ID: &str = "unavailable";

/// Calorie provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The health source refused access to calorie data.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// No health source is reachable on this host.
    #[error("calorie provider unavailable: {0}")]
    Unavailable(String),
    /// The requested date is not an ISO `YYYY-MM-DD` date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    /// The configured bridge URL is unusable.
    #[error("invalid base URL: {reason}")]
    InvalidBaseUrl { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Bridge returned an error response.
    #[error("bridge error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Active energy burned on one date, as reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCalories {
    pub date: String,
    pub calories_kcal: f64,
    pub source_id: &'static str,
    /// Epoch milliseconds at which the value was fetched.
    pub fetched_at: i64,
}

#[async_trait]
pub trait CalorieProvider {
    /// Total active kilocalories for a local `YYYY-MM-DD` date.
    async fn get_calories(&self, date: &str) -> Result<DailyCalories, ProviderError>;

    /// Stable identifier for the underlying health source.
    fn source_id(&self) -> &'static str;
}

/// Which provider implementation to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    None,
    Http,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "http" => Ok(Self::Http),
            _ => Err(ProviderError::Unavailable(format!(
                "unknown calorie provider '{s}'"
            ))),
        }
    }
}

/// Connection settings handed to [`create_provider`].
#[derive(Clone, Default)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Builds the provider selected by configuration.
///
/// # Errors
///
/// Returns an error when the HTTP provider is selected without a usable base
/// URL, or when its HTTP client fails to build.
pub fn create_provider(
    kind: ProviderKind,
    settings: &ProviderSettings,
) -> Result<Box<dyn CalorieProvider + Send + Sync>, ProviderError> {
    match kind {
        ProviderKind::None => Ok(Box::new(UnavailableProvider)),
        ProviderKind::Http => {
            let base_url = settings
                .base_url
                .as_deref()
                .ok_or(ProviderError::InvalidBaseUrl {
                    reason: "calorie_base_url is not configured",
                })?;
            Ok(Box::new(HttpCalorieProvider::new(
                base_url,
                settings.token.clone(),
            )?))
        }
    }
}

/// Provider for hosts without any health platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

#[async_trait]
impl CalorieProvider for UnavailableProvider {
    async fn get_calories(&self, date: &str) -> Result<DailyCalories, ProviderError> {
        validate_date(date)?;
        Err(ProviderError::Unavailable(
            "no health data source is configured on this host".to_string(),
        ))
    }

    fn source_id(&self) -> &'static str {
        UNAVAILABLE_SOURCE_ID
    }
}

/// Health bridge client.
///
/// # Thread Safety
///
/// The provider is safe to share across threads; requests share the
/// underlying HTTP connection pool.
pub struct HttpCalorieProvider {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for HttpCalorieProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCalorieProvider")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpCalorieProvider {
    /// Creates a provider for the bridge at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is blank or not http(s), or if the HTTP
    /// client fails to build.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ProviderError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ProviderError::InvalidBaseUrl {
                reason: "base URL cannot be empty",
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ProviderError::InvalidBaseUrl {
                reason: "base URL must start with http:// or https://",
            });
        }
        let token = token.filter(|token| !token.trim().is_empty());

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ProviderError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token,
        })
    }
}

#[async_trait]
impl CalorieProvider for HttpCalorieProvider {
    async fn get_calories(&self, date: &str) -> Result<DailyCalories, ProviderError> {
        let date = validate_date(date)?;

        let mut request = self
            .http
            .get(format!("{}/calories", self.base_url))
            .query(&[("date", date.as_str())]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                ProviderError::Unavailable(err.to_string())
            } else {
                ProviderError::Request(err)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let calories_kcal = sum_active_calories(&body)?;
        tracing::debug!(%date, calories_kcal, "calories fetched from bridge");
        Ok(DailyCalories {
            date,
            calories_kcal,
            source_id: HTTP_BRIDGE_SOURCE_ID,
            fetched_at: Utc::now().timestamp_millis(),
        })
    }

    fn source_id(&self) -> &'static str {
        HTTP_BRIDGE_SOURCE_ID
    }
}

/// Normalizes a `YYYY-MM-DD` date, rejecting anything chrono cannot parse.
fn validate_date(date: &str) -> Result<String, ProviderError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|parsed| parsed.format("%Y-%m-%d").to_string())
        .map_err(|_| ProviderError::InvalidDate(date.to_string()))
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = parse_api_error(body).unwrap_or_else(|| body.trim().to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::PermissionDenied(message),
        StatusCode::SERVICE_UNAVAILABLE => ProviderError::Unavailable(message),
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error)
}

/// Sums the active-energy records of a bridge response.
fn sum_active_calories(body: &str) -> Result<f64, ProviderError> {
    #[derive(Deserialize)]
    struct CaloriesResponse {
        records: Vec<EnergyRecord>,
    }

    #[derive(Deserialize)]
    struct EnergyRecord {
        kcal: f64,
    }

    let payload: CaloriesResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
    let total: f64 = payload.records.iter().map(|record| record.kcal).sum();
    if !total.is_finite() || total < 0.0 {
        return Err(ProviderError::InvalidResponse(format!(
            "calorie total out of range: {total}"
        )));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_provider_rejects_blank_base_url() {
        assert!(matches!(
            HttpCalorieProvider::new("  ", None),
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn http_provider_rejects_non_http_scheme() {
        assert!(matches!(
            HttpCalorieProvider::new("ftp://bridge.local", None),
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn http_provider_debug_redacts_token() {
        let provider =
            HttpCalorieProvider::new("http://bridge.local/", Some("secret-token".to_string()))
                .unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("http://bridge.local\""));
    }

    #[test]
    fn create_provider_requires_base_url_for_http() {
        let Err(err) = create_provider(ProviderKind::Http, &ProviderSettings::default()) else {
            panic!("http provider without a base URL should be rejected");
        };
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn create_provider_selects_implementation() {
        let none = create_provider(ProviderKind::None, &ProviderSettings::default()).unwrap();
        assert_eq!(none.source_id(), UNAVAILABLE_SOURCE_ID);

        let settings = ProviderSettings {
            base_url: Some("http://127.0.0.1:9".to_string()),
            token: None,
        };
        let http = create_provider(ProviderKind::Http, &settings).unwrap();
        assert_eq!(http.source_id(), HTTP_BRIDGE_SOURCE_ID);
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<ProviderKind>().unwrap(), ProviderKind::Http);
        assert_eq!("none".parse::<ProviderKind>().unwrap(), ProviderKind::None);
        assert!("healthkit".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn validate_date_normalizes_and_rejects() {
        assert_eq!(validate_date("2024-1-6").unwrap(), "2024-01-06");
        assert!(matches!(
            validate_date("06/01/2024"),
            Err(ProviderError::InvalidDate(_))
        ));
        assert!(matches!(
            validate_date("2024-02-30"),
            Err(ProviderError::InvalidDate(_))
        ));
    }

    #[test]
    fn sum_active_calories_adds_records() {
        let body = r#"{"records":[{"kcal":120.5},{"kcal":79.5},{"kcal":0}]}"#;
        assert!((sum_active_calories(body).unwrap() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sum_active_calories_of_no_records_is_zero() {
        assert!(sum_active_calories(r#"{"records":[]}"#).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn sum_active_calories_rejects_malformed_body() {
        assert!(matches!(
            sum_active_calories("not-json"),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            sum_active_calories(r#"{"records":[{"kcal":-5}]}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn status_error_maps_auth_failures_to_permission_denied() {
        let err = status_error(StatusCode::FORBIDDEN, r#"{"error":"scope not granted"}"#);
        assert!(
            matches!(err, ProviderError::PermissionDenied(ref message) if message == "scope not granted")
        );

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "down");
        assert!(matches!(err, ProviderError::Unavailable(_)));

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn unavailable_provider_reports_unavailable() {
        let err = UnavailableProvider.get_calories("2024-01-06").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unavailable_provider_checks_date_first() {
        let err = UnavailableProvider.get_calories("yesterday").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDate(_)));
    }
}
