use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::{PriceBar, PriceHistoryError};

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<PriceBar>, PriceHistoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut bars = Vec::new();

    for record in csv_reader.deserialize::<PriceRow>() {
        let row = record?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|source| {
            PriceHistoryError::Date {
                value: row.date.clone(),
                source,
            }
        })?;

        bars.push(PriceBar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume", default, deserialize_with = "empty_string_as_none")]
    volume: Option<u64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .replace(',', "")
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
