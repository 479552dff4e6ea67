use serde::{Deserialize, Serialize};

pub const DEFAULT_REFRESH_MINUTES: f64 = 30.0;

/// User preferences, stored in the data dir and merged on write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub auto_refresh: bool,
    /// Set the first time the user explicitly toggles auto refresh.
    /// Stored states without this flag must never auto-refresh.
    #[serde(default)]
    pub auto_refresh_explicit: bool,
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: f64,
    #[serde(default = "default_close_temp_tab")]
    pub close_temp_tab: bool,
}

fn default_refresh_minutes() -> f64 {
    DEFAULT_REFRESH_MINUTES
}

fn default_close_temp_tab() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_refresh: false,
            auto_refresh_explicit: false,
            refresh_minutes: DEFAULT_REFRESH_MINUTES,
            close_temp_tab: true,
        }
    }
}

impl Preferences {
    /// One-way migration guard: an auto-refresh value that was never
    /// explicitly opted into is forced off, whatever was stored.
    pub fn migrated(mut self) -> Self {
        if !self.auto_refresh_explicit {
            self.auto_refresh = false;
        }
        self
    }

    /// True when the scheduler should install a periodic trigger.
    pub fn schedule_enabled(&self) -> bool {
        self.auto_refresh && self.refresh_minutes.is_finite() && self.refresh_minutes > 0.0
    }

    pub fn apply(&mut self, patch: &PrefsPatch) {
        if let Some(v) = patch.auto_refresh {
            self.auto_refresh = v;
            self.auto_refresh_explicit = true;
        }
        if let Some(v) = patch.refresh_minutes {
            if v.is_finite() && v > 0.0 {
                self.refresh_minutes = v;
            }
        }
        if let Some(v) = patch.close_temp_tab {
            self.close_temp_tab = v;
        }
    }
}

/// Partial update sent by the UI; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefsPatch {
    pub auto_refresh: Option<bool>,
    pub refresh_minutes: Option<f64>,
    pub close_temp_tab: Option<bool>,
}

impl PrefsPatch {
    /// True when the patch touches anything the scheduler cares about.
    pub fn affects_schedule(&self) -> bool {
        self.auto_refresh.is_some() || self.refresh_minutes.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_guard_forces_auto_refresh_off() {
        let prefs = Preferences {
            auto_refresh: true,
            auto_refresh_explicit: false,
            ..Preferences::default()
        };
        assert!(!prefs.migrated().auto_refresh);
    }

    #[test]
    fn test_migration_guard_keeps_explicit_value() {
        let prefs = Preferences {
            auto_refresh: true,
            auto_refresh_explicit: true,
            ..Preferences::default()
        };
        assert!(prefs.migrated().auto_refresh);
    }

    #[test]
    fn test_patch_marks_explicit() {
        let mut prefs = Preferences::default();
        prefs.apply(&PrefsPatch {
            auto_refresh: Some(true),
            ..PrefsPatch::default()
        });
        assert!(prefs.auto_refresh);
        assert!(prefs.auto_refresh_explicit);
    }

    #[test]
    fn test_patch_rejects_invalid_interval() {
        let mut prefs = Preferences::default();
        prefs.apply(&PrefsPatch {
            refresh_minutes: Some(-5.0),
            ..PrefsPatch::default()
        });
        assert_eq!(prefs.refresh_minutes, DEFAULT_REFRESH_MINUTES);
        prefs.apply(&PrefsPatch {
            refresh_minutes: Some(f64::NAN),
            ..PrefsPatch::default()
        });
        assert_eq!(prefs.refresh_minutes, DEFAULT_REFRESH_MINUTES);
    }

    #[test]
    fn test_schedule_enabled() {
        let mut prefs = Preferences {
            auto_refresh: true,
            auto_refresh_explicit: true,
            refresh_minutes: 15.0,
            close_temp_tab: true,
        };
        assert!(prefs.schedule_enabled());
        prefs.refresh_minutes = 0.0;
        assert!(!prefs.schedule_enabled());
    }

    #[test]
    fn test_deserialize_legacy_state_without_explicit_flag() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"auto_refresh": true}"#).unwrap();
        assert_eq!(prefs.refresh_minutes, DEFAULT_REFRESH_MINUTES);
        assert!(prefs.close_temp_tab);
        assert!(!prefs.migrated().auto_refresh);
    }
}
