use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Share-issuance mechanism a company can draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DilutionMechanism {
    Atm,
    Shelf,
    S1,
    EquityLine,
    Convertible,
    Warrants,
    PurchaseAgreement,
}

impl DilutionMechanism {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Atm => "ATM",
            Self::Shelf => "Shelf",
            Self::S1 => "S-1",
            Self::EquityLine => "Equity Line",
            Self::Convertible => "Convertible",
            Self::Warrants => "Warrants",
            Self::PurchaseAgreement => "Purchase Agreement",
        }
    }

    /// Active mechanisms can issue shares now; the rest are merely filed.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Shelf | Self::S1)
    }
}

/// Headline vocabularies used by the news catalyst factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsKeywords {
    pub bullish: Vec<String>,
    pub dilution: Vec<String>,
    pub neutral: Vec<String>,
    pub mechanical: Vec<String>,
    pub speculative: Vec<String>,
}

impl Default for NewsKeywords {
    fn default() -> Self {
        Self {
            bullish: words(&[
                "partnership",
                "approval",
                "approved",
                "contract",
                "acquisition",
                "acquire",
                "merger",
                "strategic",
                "earnings beat",
                "record revenue",
                "breakthrough",
                "fda",
                "awarded",
            ]),
            dilution: words(&[
                "s-1",
                "atm",
                "at-the-market",
                "424b",
                "424b3",
                "424b4",
                "424b5",
                "convertible",
                "warrant",
                "warrants",
                "equity line",
                "public offering",
                "registered direct",
                "private placement",
            ]),
            neutral: words(&[
                "earnings",
                "quarter",
                "quarterly",
                "presentation",
                "conference",
                "webcast",
            ]),
            mechanical: words(&[
                "share count",
                "filing",
                "split",
                "reverse split",
                "dividend",
                "ticker",
                "name change",
                "10-q",
                "10-k",
            ]),
            speculative: words(&[
                "could",
                "may be",
                "may soon",
                "potential",
                "explore",
                "exploring",
                "rumor",
                "poised",
                "plans to",
                "soaring",
                "skyrocket",
            ]),
        }
    }
}

/// Configurable keyword lookup tables. Loaded from JSON when the defaults need
/// to be extended without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    pub news: NewsKeywords,
    pub dilution: BTreeMap<DilutionMechanism, Vec<String>>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        let dilution = BTreeMap::from([
            (DilutionMechanism::Atm, words(&["atm", "at-the-market"])),
            (DilutionMechanism::Shelf, words(&["shelf", "s-3"])),
            (DilutionMechanism::S1, words(&["s-1", "f-1"])),
            (
                DilutionMechanism::EquityLine,
                words(&["equity line", "elo", "committed equity"]),
            ),
            (
                DilutionMechanism::Convertible,
                words(&["convertible", "convertible note"]),
            ),
            (DilutionMechanism::Warrants, words(&["warrant", "warrants"])),
            (
                DilutionMechanism::PurchaseAgreement,
                words(&["purchase agreement", "securities purchase agreement"]),
            ),
        ]);

        Self {
            news: NewsKeywords::default(),
            dilution,
        }
    }
}

impl KeywordTables {
    /// Dilution mechanisms named anywhere in `text`.
    pub fn detect_mechanisms(&self, text: &str) -> BTreeSet<DilutionMechanism> {
        let haystack = MatchText::new(text);
        self.dilution
            .iter()
            .filter(|(_, keywords)| haystack.contains_any(keywords))
            .map(|(mechanism, _)| *mechanism)
            .collect()
    }
}

/// Text reduced to lowercase alphanumeric tokens for whole-phrase matching.
pub(crate) struct MatchText {
    padded: String,
}

impl MatchText {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", tokenize(text)),
        }
    }

    pub(crate) fn contains(&self, keyword: &str) -> bool {
        let needle = tokenize(keyword);
        if needle.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {needle} "))
    }

    pub(crate) fn contains_any(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|keyword| self.contains(keyword))
    }
}

fn tokenize(text: &str) -> String {
    text.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
