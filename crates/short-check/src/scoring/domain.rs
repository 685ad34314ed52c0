use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Three-level severity shared by every categorical factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Red,
    Yellow,
    Green,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
        }
    }
}

/// Severity label supplied directly by an upstream data provider.
///
/// The original label is kept because `Medium` carries its own meaning for
/// offering ability, even though it resolves to the same severity as `Yellow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
    #[serde(alias = "red", alias = "RED")]
    Red,
    #[serde(alias = "yellow", alias = "YELLOW")]
    Yellow,
    #[serde(alias = "green", alias = "GREEN")]
    Green,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl ProviderTag {
    pub const fn severity(self) -> Severity {
        match self {
            Self::Red | Self::High => Severity::Red,
            Self::Yellow | Self::Medium => Severity::Yellow,
            Self::Green | Self::Low => Severity::Green,
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "red" => Some(Self::Red),
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

const PROVIDER_PREFIX: &str = "DT:";

/// Categorical status field: either an authoritative provider tag or free text
/// that the status resolver classifies heuristically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", from = "StatusTagRepr")]
pub enum StatusTag {
    Provider { tag: ProviderTag },
    FreeText { text: String },
}

impl StatusTag {
    pub fn provider(tag: ProviderTag) -> Self {
        Self::Provider { tag }
    }

    pub fn free_text(text: impl Into<String>) -> Self {
        Self::FreeText { text: text.into() }
    }

    /// Decodes the legacy `DT:<label>` prefix; any other string is free text.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        let prefixed = trimmed
            .get(..PROVIDER_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(PROVIDER_PREFIX))
            .and_then(|_| ProviderTag::parse(&trimmed[PROVIDER_PREFIX.len()..]));

        match prefixed {
            Some(tag) => Self::Provider { tag },
            None => Self::FreeText {
                text: trimmed.to_string(),
            },
        }
    }

    pub fn provider_tag(&self) -> Option<ProviderTag> {
        match self {
            Self::Provider { tag } => Some(*tag),
            Self::FreeText { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Provider { .. } => None,
            Self::FreeText { text } => Some(text.as_str()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusTagRepr {
    Raw(String),
    Structured(StructuredStatusTag),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StructuredStatusTag {
    Provider { tag: ProviderTag },
    FreeText { text: String },
}

impl From<StatusTagRepr> for StatusTag {
    fn from(value: StatusTagRepr) -> Self {
        match value {
            StatusTagRepr::Raw(raw) => StatusTag::from_raw(&raw),
            StatusTagRepr::Structured(StructuredStatusTag::Provider { tag }) => {
                StatusTag::Provider { tag }
            }
            StatusTagRepr::Structured(StructuredStatusTag::FreeText { text }) => {
                StatusTag::FreeText { text }
            }
        }
    }
}

/// Sparse snapshot of one ticker, as produced by OCR extraction, manual entry,
/// or enrichment lookups. Every field is optional.
///
/// Share and dollar quantities may be raw units or "millions" shorthand; see
/// [`normalize_units`](super::normalizer::normalize_units).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedData {
    pub ticker: Option<String>,

    pub cash_on_hand: Option<f64>,
    /// Negative values are cash burn, non-negative values positive cash flow.
    pub quarterly_burn_rate: Option<f64>,
    /// Months of runway when supplied directly.
    pub cash_runway: Option<f64>,

    pub outstanding_shares: Option<f64>,
    pub outstanding_shares_3y_ago: Option<f64>,
    pub float: Option<f64>,
    pub market_cap: Option<f64>,
    pub debt: Option<f64>,
    /// `Some(false)` when the debt figure was inferred or only net-cash data exists.
    pub debt_observed: Option<bool>,

    pub offering_ability: Option<StatusTag>,
    pub overhead_supply: Option<StatusTag>,
    pub cash_need: Option<StatusTag>,
    pub historical_dilution: Option<StatusTag>,
    pub overall_risk: Option<StatusTag>,

    pub institutional_ownership: Option<f64>,
    pub short_interest: Option<f64>,
    pub price_spike: Option<bool>,
    pub price_spike_pct: Option<f64>,
    pub news_headline: Option<String>,
    pub news_date: Option<NaiveDate>,

    /// Provenance only; never read by the scoring math.
    pub confidence: Option<f64>,
}
