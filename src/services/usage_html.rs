//! Renders a usage snapshot as a self-contained HTML document.

use crate::config::Language;
use crate::types::{format_number, usage_percent, ModelKey, ModelUsage, UsageSnapshot};
use chrono::{DateTime, Datelike, Days, Months, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

struct Labels {
    title: &'static str,
    period_started: &'static str,
    period_started_suffix: &'static str,
    next_reset: &'static str,
    next_reset_suffix: &'static str,
    requests: &'static str,
    tokens: &'static str,
    used_requests: &'static str,
    used_requests_suffix: &'static str,
    request_limit: &'static str,
    request_limit_suffix: &'static str,
    used_tokens: &'static str,
    token_limit: &'static str,
    unlimited: &'static str,
}

const EN: Labels = Labels {
    title: "Cursor Balance",
    period_started: "Billing period: started ",
    period_started_suffix: "",
    next_reset: "Next reset: in ",
    next_reset_suffix: " days",
    requests: "Requests:",
    tokens: "Token usage:",
    used_requests: "Used ",
    used_requests_suffix: " requests",
    request_limit: "Limit ",
    request_limit_suffix: " requests",
    used_tokens: "Used ",
    token_limit: "Limit ",
    unlimited: "Unlimited",
};

const ZH: Labels = Labels {
    title: "Cursor 余额",
    period_started: "计费周期: ",
    period_started_suffix: " 开始",
    next_reset: "下次重置: ",
    next_reset_suffix: " 天后",
    requests: "请求次数:",
    tokens: "Token 用量:",
    used_requests: "已使用 ",
    used_requests_suffix: " 次",
    request_limit: "上限 ",
    request_limit_suffix: " 次",
    used_tokens: "已使用 ",
    token_limit: "上限 ",
    unlimited: "无限制",
};

const fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

/// Panel title for `language`.
#[must_use]
pub const fn panel_title(language: Language) -> &'static str {
    labels(language).title
}

/// Formats the billing-period start as a long date.
#[must_use]
pub fn format_long_date(date: DateTime<Utc>, language: Language) -> String {
    match language {
        Language::En => date.format("%B %-d, %Y").to_string(),
        Language::Zh => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
    }
}

/// Start of the next billing period.
///
/// Day overflow rolls into the following month (Jan 31 resets on Mar 2 or 3)
/// and the time of day is kept.
#[must_use]
pub fn period_reset(period_start: DateTime<Utc>) -> DateTime<Utc> {
    period_start
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.checked_add_days(Days::new(u64::from(period_start.day() - 1))))
        .unwrap_or(period_start)
}

/// Days left until the period starting at `period_start` resets.
///
/// Not clamped: once `now` is past the reset date the result goes negative.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn remaining_days(period_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (period_reset(period_start) - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64 - 1
}

/// Renders the whole document. Deterministic for a given `now`.
#[must_use]
pub fn render_usage_html(snapshot: &UsageSnapshot, now: DateTime<Utc>, language: Language) -> String {
    usage_page(snapshot, now, language).into_string()
}

fn usage_page(snapshot: &UsageSnapshot, now: DateTime<Utc>, language: Language) -> Markup {
    let labels = labels(language);
    let start = format_long_date(snapshot.billing_period_start, language);
    let days = remaining_days(snapshot.billing_period_start, now);

    html! {
        (DOCTYPE)
        html lang=(language.html_lang()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (labels.title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.container {
                    h1 { (labels.title) }
                    div.period {
                        (labels.period_started) (start) (labels.period_started_suffix)
                    }
                    div.period {
                        (labels.next_reset) (days) (labels.next_reset_suffix)
                    }
                    // Tiers missing from the response get no card.
                    @for key in ModelKey::ALL {
                        @if let Some(usage) = snapshot.model_usages.get(&key) {
                            (model_card(key, usage, labels))
                        }
                    }
                }
            }
        }
    }
}

fn model_card(key: ModelKey, usage: &ModelUsage, labels: &Labels) -> Markup {
    let requests = usage.request_count.to_string();
    let tokens = format_number(usage.token_count);
    let used_requests = format!("{}{requests}{}", labels.used_requests, labels.used_requests_suffix);
    let used_tokens = format!("{}{tokens} tokens", labels.used_tokens);

    html! {
        div.card {
            h2.card-title { (key.display_name()) }
            div.data-row {
                span.data-label { (labels.requests) }
                span.data-value { (requests) }
            }
            (limit(usage.request_count, usage.request_cap, &used_requests, labels, |cap| {
                format!("{}{cap}{}", labels.request_limit, labels.request_limit_suffix)
            }))
            div.data-row {
                span.data-label { (labels.tokens) }
                span.data-value { (tokens) }
            }
            (limit(usage.token_count, usage.token_cap, &used_tokens, labels, |cap| {
                format!("{}{} tokens", labels.token_limit, format_number(cap))
            }))
        }
    }
}

/// A progress bar plus used/limit line for a finite cap, or the unlimited
/// marker when there is no cap.
fn limit(
    used: u64,
    cap: Option<u64>,
    used_text: &str,
    labels: &Labels,
    limit_text: impl Fn(u64) -> String,
) -> Markup {
    html! {
        @if let Some(cap) = cap {
            div.usage-bar-container {
                div.usage-bar style=(format!("width: {}%", usage_percent(used, cap))) {}
            }
            div.usage-info {
                span { (used_text) }
                span { (limit_text(cap)) }
            }
        } @else {
            div.usage-info {
                span { (used_text) }
                span.unlimited { (labels.unlimited) }
            }
        }
    }
}

const STYLE: &str = r"
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
      padding: 20px;
      color: var(--vscode-foreground, #1f2328);
      background-color: var(--vscode-editor-background, #ffffff);
    }
    .container { max-width: 800px; margin: 0 auto; }
    h1 { text-align: center; margin-bottom: 30px; }
    .period {
      text-align: center;
      font-size: 1.1em;
      margin-bottom: 30px;
      color: var(--vscode-descriptionForeground, #59636e);
    }
    .card {
      background-color: var(--vscode-editor-inactiveSelectionBackground, #f6f8fa);
      border-radius: 8px;
      padding: 20px;
      margin-bottom: 20px;
      box-shadow: 0 2px 6px rgba(0, 0, 0, 0.1);
    }
    .card-title {
      font-size: 1.4em;
      margin-top: 0;
      margin-bottom: 16px;
      color: var(--vscode-editorLink-activeForeground, #0969da);
    }
    .usage-bar-container {
      width: 100%;
      height: 20px;
      background-color: var(--vscode-editor-background, #e6e8eb);
      border-radius: 10px;
      margin-bottom: 10px;
      overflow: hidden;
    }
    .usage-bar {
      height: 100%;
      background: linear-gradient(90deg, #4CAF50, #FFC107);
      border-radius: 10px;
      transition: width 0.5s ease-in-out;
    }
    .usage-info { display: flex; justify-content: space-between; margin-bottom: 20px; }
    .unlimited { color: #4CAF50; font-weight: bold; }
    .data-row { display: flex; justify-content: space-between; margin-bottom: 8px; }
    .data-label { color: var(--vscode-descriptionForeground, #59636e); }
    .data-value { font-weight: bold; }
  ";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn model(requests: u64, tokens: u64, request_cap: Option<u64>, token_cap: Option<u64>) -> ModelUsage {
        ModelUsage {
            request_count: requests,
            total_request_count: requests,
            token_count: tokens,
            request_cap,
            token_cap,
        }
    }

    fn snapshot(models: &[(ModelKey, ModelUsage)]) -> UsageSnapshot {
        UsageSnapshot {
            model_usages: models.iter().cloned().collect::<BTreeMap<_, _>>(),
            billing_period_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    /// Slice of the document holding the card for `key`.
    fn card<'a>(html: &'a str, key: ModelKey) -> &'a str {
        let title = format!(r#"<h2 class="card-title">{}</h2>"#, key.display_name());
        let start = html.find(&title).expect("card present");
        let rest = &html[start..];
        let end = rest.find(r#"<div class="card">"#).unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn test_capped_requests_and_unlimited_tokens() {
        let snap = snapshot(&[
            (ModelKey::Gpt4, model(50, 100_000, Some(500), None)),
            (ModelKey::Gpt35Turbo, model(3, 1200, None, None)),
            (ModelKey::Gpt4_32k, model(0, 0, Some(50), None)),
        ]);
        let html = render_usage_html(&snap, now(), Language::En);
        let gpt4 = card(&html, ModelKey::Gpt4);

        assert!(gpt4.contains(r#"style="width: 10%""#), "{gpt4}");
        assert!(gpt4.contains("Used 100,000 tokens"));
        assert!(gpt4.contains(r#"<span class="unlimited">Unlimited</span>"#));
        assert_eq!(gpt4.matches("usage-bar-container").count(), 1);
    }

    #[test]
    fn test_unlimited_never_renders_bar() {
        let snap = snapshot(&[(ModelKey::Gpt35Turbo, model(3, 1200, None, None))]);
        let html = render_usage_html(&snap, now(), Language::En);
        let turbo = card(&html, ModelKey::Gpt35Turbo);

        assert!(!turbo.contains("usage-bar"));
        assert_eq!(turbo.matches(r#"class="unlimited""#).count(), 2);
    }

    #[test]
    fn test_percent_clamped_when_over_cap() {
        let snap = snapshot(&[(ModelKey::Gpt4, model(900, 5000, Some(500), Some(1000)))]);
        let html = render_usage_html(&snap, now(), Language::En);

        assert_eq!(html.matches(r#"style="width: 100%""#).count(), 2);
        assert!(html.contains("Limit 500 requests"));
        assert!(html.contains("Limit 1,000 tokens"));
    }

    #[test]
    fn test_cards_follow_model_order() {
        let snap = snapshot(&[
            (ModelKey::Gpt4_32k, model(0, 0, None, None)),
            (ModelKey::Gpt4, model(0, 0, None, None)),
            (ModelKey::Gpt35Turbo, model(0, 0, None, None)),
        ]);
        let html = render_usage_html(&snap, now(), Language::En);
        let positions: Vec<usize> = ModelKey::ALL
            .iter()
            .map(|k| html.find(k.display_name()).expect("card present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_model_has_no_card() {
        let snap = snapshot(&[(ModelKey::Gpt4, model(1, 1, None, None))]);
        let html = render_usage_html(&snap, now(), Language::En);
        assert!(html.contains(ModelKey::Gpt4.display_name()));
        assert!(!html.contains(ModelKey::Gpt4_32k.display_name()));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let snap = snapshot(&[(ModelKey::Gpt4, model(50, 100_000, Some(500), None))]);
        let first = render_usage_html(&snap, now(), Language::En);
        let second = render_usage_html(&snap, now(), Language::En);
        assert_eq!(first, second);
    }

    #[test]
    fn test_period_text() {
        let snap = snapshot(&[]);
        let html = render_usage_html(&snap, now(), Language::En);
        assert!(html.contains("Billing period: started January 1, 2024"));
        assert!(html.contains("Next reset: in 21 days"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_period_text_zh() {
        let snap = snapshot(&[(ModelKey::Gpt4, model(50, 100_000, Some(500), None))]);
        let html = render_usage_html(&snap, now(), Language::Zh);
        assert!(html.contains(r#"<html lang="zh-CN">"#));
        assert!(html.contains("计费周期: 2024年1月1日 开始"));
        assert!(html.contains("下次重置: 21 天后"));
        assert!(html.contains("无限制"));
        assert!(html.contains("上限 500 次"));
    }

    #[test]
    fn test_remaining_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // 21.5 days to Feb 1 rounds up to 22, minus one.
        assert_eq!(remaining_days(start, now()), 21);
        assert_eq!(remaining_days(start, start), 30);
        let reset = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(remaining_days(start, reset), -1);
    }

    #[test]
    fn test_remaining_days_goes_negative() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap();
        // -4.5 days rounds up to -4, minus one.
        assert_eq!(remaining_days(start, late), -5);

        let html = render_usage_html(&snapshot(&[]), late, Language::En);
        assert!(html.contains("Next reset: in -5 days"));
    }

    #[test]
    fn test_period_reset_rolls_day_overflow() {
        let jan31 = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(period_reset(jan31), Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        let feb1 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(remaining_days(jan31, feb1), 29);

        let jan31_2023 = Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            period_reset(jan31_2023),
            Utc.with_ymd_and_hms(2023, 3, 3, 0, 0, 0).unwrap()
        );

        let mar31 = Utc.with_ymd_and_hms(2024, 3, 31, 9, 30, 0).unwrap();
        assert_eq!(period_reset(mar31), Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_period_reset_keeps_plain_days() {
        let start = Utc.with_ymd_and_hms(2024, 12, 15, 6, 0, 0).unwrap();
        assert_eq!(period_reset(start), Utc.with_ymd_and_hms(2025, 1, 15, 6, 0, 0).unwrap());
    }
}
