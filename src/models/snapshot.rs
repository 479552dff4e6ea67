use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account balance as shown on the dashboard. `amount` is absent when the
/// raw text did not parse as a currency figure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Balance {
    pub raw: Option<String>,
    pub amount: Option<f64>,
}

/// One endpoint listed under a subscription card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endpoint {
    pub title: String,
}

/// Quota column of a subscription card. Parseable `"$X / $Y"` forms carry
/// numeric fields; anything else (e.g. "无限制") keeps only the raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Quota {
    Parsed {
        remaining: f64,
        total: f64,
        currency: String,
        raw: String,
    },
    Raw {
        raw: String,
    },
}

impl Quota {
    pub fn raw(&self) -> &str {
        match self {
            Quota::Parsed { raw, .. } | Quota::Raw { raw } => raw,
        }
    }
}

/// One dashboard-reported entitlement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub name: String,
    pub remaining_days_raw: Option<String>,
    pub remaining_days: Option<f64>,
    pub acquired_at: Option<String>,
    pub expires_at: Option<String>,
    pub reset_status: Option<String>,
    pub endpoints: Vec<Endpoint>,
    pub quota: Option<Quota>,
    pub used_percent_text: Option<String>,
    pub used_percent: Option<f64>,
}

impl Subscription {
    /// "未" in the reset column means the quota has not reset yet; the UI
    /// highlights those cards.
    pub fn needs_attention(&self) -> bool {
        self.reset_status
            .as_deref()
            .map(|s| s.contains('未'))
            .unwrap_or(false)
    }
}

/// The cached extraction result. Replaced wholesale on every successful
/// refresh, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub ok: bool,
    pub fetched_at: i64,
    pub url: String,
    pub title: String,
    pub balance: Balance,
    pub subscriptions: Vec<Subscription>,
    pub totals: BTreeMap<String, String>,
}

/// Refresh-level failure codes persisted in the last-error slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RateLimitedLocal,
    MissingHostPermission,
    TabCreateFailed,
    ExtractFailed,
    RefreshException,
}

/// The single last-error slot. Overwritten on every failed attempt and
/// cleared by the next successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastError {
    pub at: i64,
    pub reason: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl LastError {
    pub fn new(reason: &str, code: ErrorCode, detail: Option<serde_json::Value>) -> Self {
        Self {
            at: chrono::Utc::now().timestamp_millis(),
            reason: reason.to_string(),
            code,
            detail,
        }
    }
}

/// What a refresh call hands back to every caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DashboardSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LastError>,
}

impl RefreshOutcome {
    pub fn success(data: DashboardSnapshot) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: LastError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}
