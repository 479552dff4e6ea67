use std::time::Duration;

/// Dashboard page the watcher scrapes.
pub const DASHBOARD_URL: &str = "https://right.codes/console";

/// URL prefixes that count as "the dashboard is loaded".
pub const DASHBOARD_URL_PREFIXES: &[&str] = &[
    "https://right.codes/console",
    "https://www.right.codes/console",
];

/// Origins the watcher is allowed to drive a tab to.
pub const ALLOWED_ORIGINS: &[&str] = &["https://right.codes", "https://www.right.codes"];

/// Path fragments that indicate the site bounced us to a login screen.
pub const LOGIN_PATH_HINTS: &[&str] = &["/login", "/signin", "/auth"];

/// Visible-text phrases the site shows when its own limiter kicks in.
pub const RATE_LIMIT_PHRASES: &[&str] = &[
    "too many requests",
    "rate limit",
    "请求过于频繁",
    "访问过于频繁",
    "操作频繁",
];

/// Minimum gap between two refresh attempts, enforced locally.
pub const MIN_REFRESH_GAP: Duration = Duration::from_millis(2500);

/// Cooldown applied when the dashboard itself reports "too many requests".
pub const REMOTE_RATE_LIMIT_COOLDOWN: Duration = Duration::from_millis(65_000);

/// How long we wait for a provisioned tab to land on the dashboard URL.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(20);
pub const READINESS_POLL: Duration = Duration::from_millis(250);

/// Pause after the URL matches, before the first capture, so client-side
/// rendering gets a head start.
pub const SETTLE_DELAY: Duration = Duration::from_millis(120);

/// How long we re-capture the page waiting for the main container.
pub const CONTAINER_WAIT_TIMEOUT: Duration = Duration::from_secs(15);
pub const CONTAINER_POLL: Duration = Duration::from_millis(250);

/// Transient capture failures (frame loss, tab closed mid-capture) are
/// retried this many times with a linear backoff step.
pub const CAPTURE_RETRY_ATTEMPTS: u32 = 4;
pub const CAPTURE_RETRY_STEP: Duration = Duration::from_millis(220);

/// "Not ready yet" extraction results are retried this many times.
pub const NOT_READY_RETRY_ATTEMPTS: u32 = 3;
pub const NOT_READY_RETRY_STEP: Duration = Duration::from_millis(300);

/// Subresource patterns blocked on temporary tabs (light mode).
pub const LIGHT_MODE_BLOCKED_URLS: &[&str] = &[
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico", "*.woff", "*.woff2",
    "*.ttf", "*.otf", "*.eot", "*.mp4", "*.webm", "*.mp3", "*.ogg",
];

/// Default bind address for the command surface.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8620;

/// Returns true when `url` points at the dashboard page.
pub fn is_dashboard_url(url: &str) -> bool {
    DASHBOARD_URL_PREFIXES.iter().any(|p| url.starts_with(p))
}
