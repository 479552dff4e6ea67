pub mod prefs;
pub mod snapshot;

pub use prefs::{Preferences, PrefsPatch};
pub use snapshot::{
    Balance, DashboardSnapshot, Endpoint, ErrorCode, LastError, Quota, RefreshOutcome,
    Subscription,
};
