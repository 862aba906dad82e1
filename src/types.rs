use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Usage tiers reported by the `/api/usage` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelKey {
    Gpt4,
    Gpt35Turbo,
    Gpt4_32k,
}

impl ModelKey {
    /// Display order of the model cards.
    pub const ALL: [Self; 3] = [Self::Gpt4, Self::Gpt35Turbo, Self::Gpt4_32k];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4_32k => "gpt-4-32k",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Gpt4 => "Premium models",
            Self::Gpt35Turbo => "gpt-4o-mini or cursor-small",
            Self::Gpt4_32k => "GPT-4 32k",
        }
    }

    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.wire_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelUsage {
    #[serde(rename = "numRequests")]
    pub request_count: u64,
    #[serde(rename = "numRequestsTotal")]
    pub total_request_count: u64,
    #[serde(rename = "numTokens")]
    pub token_count: u64,
    /// `None` means unlimited.
    #[serde(rename = "maxRequestUsage")]
    pub request_cap: Option<u64>,
    /// `None` means unlimited.
    #[serde(rename = "maxTokenUsage")]
    pub token_cap: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub model_usages: BTreeMap<ModelKey, ModelUsage>,
    pub billing_period_start: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageResponse {
    #[serde(deserialize_with = "deserialize_period_start")]
    start_of_month: DateTime<Utc>,
    #[serde(flatten)]
    models: BTreeMap<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for UsageSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let response = UsageResponse::deserialize(deserializer)?;
        let mut model_usages = BTreeMap::new();
        for (name, value) in response.models {
            // Tiers this client does not know about are ignored.
            let Some(key) = ModelKey::from_wire_name(&name) else {
                continue;
            };
            let usage = ModelUsage::deserialize(value).map_err(serde::de::Error::custom)?;
            model_usages.insert(key, usage);
        }
        Ok(Self {
            model_usages,
            billing_period_start: response.start_of_month,
        })
    }
}

fn deserialize_period_start<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_period_start(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid startOfMonth: {raw}")))
}

/// Parses `startOfMonth` the way a JavaScript `Date` would for the formats
/// the service emits: RFC 3339, naive timestamps, or bare dates (UTC).
#[must_use]
pub fn parse_period_start(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Share of `cap` consumed by `used`, clamped to `[0, 100]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn usage_percent(used: u64, cap: u64) -> f64 {
    if cap == 0 {
        return if used > 0 { 100.0 } else { 0.0 };
    }
    (used as f64 / cap as f64 * 100.0).clamp(0.0, 100.0)
}

/// Formats a count with `,` thousands separators.
#[must_use]
pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
