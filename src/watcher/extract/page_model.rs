use crate::models::DashboardSnapshot;
use serde_json::Value;
use std::fmt;

/// Structured failure reported by the extractor. These travel as data, not
/// as errors; the retry driver decides which ones are worth another pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    AuthRequired,
    TooManyRequests,
    MainNotFound,
    DashboardDataNotReady,
}

impl ExtractError {
    pub fn code(&self) -> &str {
        match self {
            ExtractError::AuthRequired => "auth_required",
            ExtractError::TooManyRequests => "too_many_requests",
            ExtractError::MainNotFound => "main_not_found",
            ExtractError::DashboardDataNotReady => "dashboard_data_not_ready",
        }
    }

    /// True for results that usually mean "the page just needs more time".
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            ExtractError::MainNotFound | ExtractError::DashboardDataNotReady
        )
    }

    /// Detail payload persisted in the last-error slot.
    pub fn as_detail(&self) -> Value {
        Value::String(self.code().to_string())
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Quick classification of a captured page, checked in a fixed order
/// before any full parse is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageProbe {
    LoginPage,
    RateLimited,
    MainMissing,
    Ready,
}

/// One version of the dashboard's markup. Selector drift stays inside a
/// single implementation of this trait.
pub trait PageModel: Send + Sync {
    fn probe(&self, url: &str, html: &str) -> PageProbe;
    fn parse(&self, url: &str, title: &str, html: &str) -> Result<DashboardSnapshot, ExtractError>;
}
