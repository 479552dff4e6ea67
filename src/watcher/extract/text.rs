//! Text-level parsing of the dashboard's rendered strings. Unparseable
//! forms always degrade to raw text instead of failing the extraction.

use crate::models::Quota;
use regex::Regex;
use std::sync::LazyLock;

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$¥￥€£]\s*\d[\d,]*(?:\.\d+)?").expect("Invalid currency regex")
});

static QUOTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([$¥￥€£])\s*([\d,]+(?:\.\d+)?)\s*/\s*[$¥￥€£]?\s*([\d,]+(?:\.\d+)?)$")
        .expect("Invalid quota regex")
});

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("Invalid percent regex"));

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Invalid number regex"));

/// Collapse all whitespace runs to single spaces and trim.
pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First currency-looking figure in `text`, as (raw, parsed amount).
pub fn find_currency(text: &str) -> Option<(String, Option<f64>)> {
    let m = CURRENCY_RE.find(text)?;
    let raw = m.as_str().to_string();
    let amount = parse_amount(&raw);
    Some((raw, amount))
}

/// Numeric value of a currency string like "$12.50" or "¥ 1,200".
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// `"$X / $Y"` forms become a structured quota; anything else keeps raw text.
pub fn parse_quota(raw: &str) -> Quota {
    let trimmed = raw.trim();
    if let Some(caps) = QUOTA_RE.captures(trimmed) {
        let remaining = parse_amount(&caps[2]);
        let total = parse_amount(&caps[3]);
        if let (Some(remaining), Some(total)) = (remaining, total) {
            return Quota::Parsed {
                remaining,
                total,
                currency: caps[1].to_string(),
                raw: trimmed.to_string(),
            };
        }
    }
    Quota::Raw {
        raw: trimmed.to_string(),
    }
}

pub fn parse_percent(raw: &str) -> Option<f64> {
    PERCENT_RE
        .captures(raw)
        .and_then(|caps| caps[1].parse().ok())
}

/// Leading numeric value of a free-text field like "28 天" or "28 days".
pub fn parse_number(raw: &str) -> Option<f64> {
    NUMBER_RE.find(raw).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_parse_dollar_pair() {
        let quota = parse_quota("$3.20 / $10.00");
        assert_eq!(
            quota,
            Quota::Parsed {
                remaining: 3.2,
                total: 10.0,
                currency: "$".to_string(),
                raw: "$3.20 / $10.00".to_string(),
            }
        );
    }

    #[test]
    fn test_quota_parse_unlimited_degrades_to_raw() {
        assert_eq!(
            parse_quota("无限制"),
            Quota::Raw {
                raw: "无限制".to_string()
            }
        );
    }

    #[test]
    fn test_quota_parse_with_commas() {
        let quota = parse_quota("¥1,200 / ¥5,000");
        assert_eq!(
            quota,
            Quota::Parsed {
                remaining: 1200.0,
                total: 5000.0,
                currency: "¥".to_string(),
                raw: "¥1,200 / ¥5,000".to_string(),
            }
        );
    }

    #[test]
    fn test_find_currency_in_text() {
        let (raw, amount) = find_currency("balance today: $12.50 remaining").unwrap();
        assert_eq!(raw, "$12.50");
        assert_eq!(amount, Some(12.5));
        assert!(find_currency("no figures here").is_none());
    }

    #[test]
    fn test_percent_and_number() {
        assert_eq!(parse_percent("已用 42.5%"), Some(42.5));
        assert_eq!(parse_percent("n/a"), None);
        assert_eq!(parse_number("28 天"), Some(28.0));
        assert_eq!(parse_number("no digits"), None);
    }

    #[test]
    fn test_collapse_ws() {
        assert_eq!(collapse_ws("  a\n\t b   c "), "a b c");
    }
}
