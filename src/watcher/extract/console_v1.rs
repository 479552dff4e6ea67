//! Parser for the current console markup. All selectors and phrase tables
//! for this page version live here; when the site ships new markup this
//! file gets a sibling, not a rewrite.

use super::page_model::{ExtractError, PageModel, PageProbe};
use super::text::{collapse_ws, find_currency, parse_number, parse_percent, parse_quota};
use crate::constants::{LOGIN_PATH_HINTS, RATE_LIMIT_PHRASES};
use crate::models::{Balance, DashboardSnapshot, Endpoint, Subscription};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static MAIN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main").expect("Invalid main selector"));
static CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".subscription-card").expect("Invalid card selector"));
static CARD_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".card-title").expect("Invalid title selector"));
static INFO_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".info-row").expect("Invalid row selector"));
static INFO_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".info-label").expect("Invalid label selector"));
static INFO_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".info-value").expect("Invalid value selector"));
static ENDPOINT_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".endpoint-item").expect("Invalid endpoint selector"));
static TOTAL_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".total-card").expect("Invalid total selector"));
static TOTAL_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".total-label").expect("Invalid total label selector"));
static TOTAL_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".total-value").expect("Invalid total value selector"));

#[derive(Debug, Default)]
pub struct ConsoleV1;

enum RowKind {
    Endpoints,
    Quota,
    UsedPercent,
    RemainingDays,
    AcquiredAt,
    ExpiresAt,
    ResetStatus,
}

/// Checked most-specific first: quota labels like "剩余额度" also contain
/// the remaining-days keyword.
fn row_kind(label: &str) -> Option<RowKind> {
    let lower = label.to_lowercase();
    if lower.contains("端点") || lower.contains("endpoint") {
        Some(RowKind::Endpoints)
    } else if lower.contains("额度") || lower.contains("quota") {
        Some(RowKind::Quota)
    } else if lower.contains("已用") || lower.contains("used") {
        Some(RowKind::UsedPercent)
    } else if lower.contains("剩余") || lower.contains("remaining") {
        Some(RowKind::RemainingDays)
    } else if lower.contains("获取") || lower.contains("acquired") {
        Some(RowKind::AcquiredAt)
    } else if lower.contains("过期") || lower.contains("到期") || lower.contains("expire") {
        Some(RowKind::ExpiresAt)
    } else if lower.contains("重置") || lower.contains("reset") {
        Some(RowKind::ResetStatus)
    } else {
        None
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

fn is_login_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_lowercase();
            LOGIN_PATH_HINTS.iter().any(|h| path.starts_with(h))
        }
        Err(_) => false,
    }
}

fn has_rate_limit_phrase(body_text: &str) -> bool {
    let lower = body_text.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p))
}

fn parse_card(card: ElementRef<'_>) -> Subscription {
    let mut sub = Subscription {
        name: card
            .select(&CARD_TITLE)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        ..Subscription::default()
    };

    for row in card.select(&INFO_ROW) {
        let Some(label_el) = row.select(&INFO_LABEL).next() else {
            continue;
        };
        let label = element_text(label_el);
        let value_text = row
            .select(&INFO_VALUE)
            .next()
            .map(element_text)
            .unwrap_or_default();

        match row_kind(&label) {
            Some(RowKind::Endpoints) => {
                sub.endpoints = row
                    .select(&ENDPOINT_ITEM)
                    .map(|item| Endpoint {
                        title: element_text(item),
                    })
                    .collect();
            }
            Some(RowKind::Quota) => sub.quota = Some(parse_quota(&value_text)),
            Some(RowKind::UsedPercent) => {
                sub.used_percent = parse_percent(&value_text);
                sub.used_percent_text = Some(value_text);
            }
            Some(RowKind::RemainingDays) => {
                sub.remaining_days = parse_number(&value_text);
                sub.remaining_days_raw = Some(value_text);
            }
            Some(RowKind::AcquiredAt) => sub.acquired_at = Some(value_text),
            Some(RowKind::ExpiresAt) => sub.expires_at = Some(value_text),
            Some(RowKind::ResetStatus) => sub.reset_status = Some(value_text),
            None => {}
        }
    }
    sub
}

impl PageModel for ConsoleV1 {
    fn probe(&self, url: &str, html: &str) -> PageProbe {
        if is_login_url(url) {
            return PageProbe::LoginPage;
        }
        let doc = Html::parse_document(html);
        let body_text = collapse_ws(&doc.root_element().text().collect::<String>());
        if has_rate_limit_phrase(&body_text) {
            return PageProbe::RateLimited;
        }
        if doc.select(&MAIN).next().is_none() {
            return PageProbe::MainMissing;
        }
        PageProbe::Ready
    }

    fn parse(&self, url: &str, title: &str, html: &str) -> Result<DashboardSnapshot, ExtractError> {
        let doc = Html::parse_document(html);
        let main = doc.select(&MAIN).next().ok_or(ExtractError::MainNotFound)?;
        let main_text = element_text(main);

        let balance = match find_currency(&main_text) {
            Some((raw, amount)) => Balance {
                raw: Some(raw),
                amount,
            },
            None => Balance::default(),
        };

        let subscriptions: Vec<Subscription> = main.select(&CARD).map(parse_card).collect();

        let totals: BTreeMap<String, String> = main
            .select(&TOTAL_CARD)
            .filter_map(|card| {
                let label = card.select(&TOTAL_LABEL).next().map(element_text)?;
                let value = card.select(&TOTAL_VALUE).next().map(element_text)?;
                Some((label, value))
            })
            .collect();

        // A bare currency match is not proof the client data arrived; a
        // populated dashboard always renders cards or totals.
        if subscriptions.is_empty() && totals.is_empty() {
            return Err(ExtractError::DashboardDataNotReady);
        }

        Ok(DashboardSnapshot {
            ok: true,
            fetched_at: chrono::Utc::now().timestamp_millis(),
            url: url.to_string(),
            title: title.to_string(),
            balance,
            subscriptions,
            totals,
        })
    }
}
