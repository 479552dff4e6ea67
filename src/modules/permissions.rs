//! Origin allowlist. The watcher refuses to drive a tab anywhere outside
//! the granted dashboard origins.

use crate::constants::ALLOWED_ORIGINS;
use url::Url;

#[derive(Debug, Clone)]
pub struct PermissionGate {
    origins: Vec<String>,
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self {
            origins: ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PermissionGate {
    pub fn new(origins: Vec<String>) -> Self {
        Self { origins }
    }

    pub fn granted(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let origin = parsed.origin().ascii_serialization();
        self.origins.iter().any(|o| o.as_str() == origin)
    }
}
