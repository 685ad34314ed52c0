//! Historical spike-decay analysis producing the droppiness signal.

mod parser;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum PriceHistoryError {
    #[error("failed to open price history: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse price history CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid price history date '{value}' (expected YYYY-MM-DD)")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Reads `Date,Open,High,Low,Close,Volume` rows, returned oldest first.
pub fn parse_price_history<R: Read>(reader: R) -> Result<Vec<PriceBar>, PriceHistoryError> {
    parser::parse_records(reader)
}

pub fn load_price_history<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>, PriceHistoryError> {
    let file = File::open(path)?;
    parse_price_history(file)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppinessReport {
    /// Share of spikes that faded, 0-100.
    pub score: f64,
    pub spikes: usize,
    pub faded: usize,
    pub largest_spike_pct: f64,
}

/// Measures how reliably intraday spikes give back their gains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppinessAnalyzer {
    pub spike_threshold_pct: f64,
    pub fade_window_days: usize,
    pub retrace_fraction: f64,
}

impl Default for DroppinessAnalyzer {
    fn default() -> Self {
        Self {
            spike_threshold_pct: 20.0,
            fade_window_days: 5,
            retrace_fraction: 0.5,
        }
    }
}

impl DroppinessAnalyzer {
    /// Returns `None` when the history contains no spike to learn from.
    pub fn analyze(&self, bars: &[PriceBar]) -> Option<DroppinessReport> {
        let mut spikes = 0;
        let mut faded = 0;
        let mut largest_spike_pct: f64 = 0.0;

        for (index, pair) in bars.windows(2).enumerate() {
            let prior_close = pair[0].close;
            let spike_bar = &pair[1];
            if !prior_close.is_finite() || !spike_bar.high.is_finite() {
                warn!(date = %spike_bar.date, "skipping price bar with non-finite prices");
                continue;
            }
            if prior_close <= 0.0 {
                continue;
            }

            let gain = spike_bar.high - prior_close;
            let gain_pct = gain / prior_close * 100.0;
            if gain_pct < self.spike_threshold_pct {
                continue;
            }

            spikes += 1;
            largest_spike_pct = largest_spike_pct.max(gain_pct);

            let give_back_level = prior_close + gain * (1.0 - self.retrace_fraction);
            // Bars after the spike day; the spike's own close does not count.
            let window_start = index + 2;
            let window_end = (window_start + self.fade_window_days).min(bars.len());
            if bars[window_start..window_end]
                .iter()
                .any(|bar| bar.close <= give_back_level)
            {
                faded += 1;
            }
        }

        if spikes == 0 {
            return None;
        }

        let score = (faded as f64 / spikes as f64 * 100.0 * 10.0).round() / 10.0;
        Some(DroppinessReport {
            score,
            spikes,
            faded,
            largest_spike_pct: (largest_spike_pct * 10.0).round() / 10.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, high: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date"),
            open: close,
            high,
            low: close,
            close,
            volume: None,
        }
    }

    #[test]
    fn parses_csv_and_sorts_by_date() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2025-03-04,1.10,1.20,1.00,1.05,\n\
                   2025-03-03,1.00,1.05,0.95,1.00,\"120,000\"\n";

        let bars = parse_price_history(csv.as_bytes()).expect("csv parses");

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid"));
        assert_eq!(bars[0].volume, Some(120_000));
        assert_eq!(bars[1].volume, None);
    }

    #[test]
    fn rejects_malformed_dates() {
        let csv = "Date,Open,High,Low,Close,Volume\n03/04/2025,1,1,1,1,10\n";

        match parse_price_history(csv.as_bytes()) {
            Err(PriceHistoryError::Date { value, .. }) => assert_eq!(value, "03/04/2025"),
            other => panic!("expected date error, got {other:?}"),
        }
    }

    #[test]
    fn faded_spike_scores_high() {
        let bars = vec![
            bar(3, 1.00, 1.00),
            bar(4, 1.60, 1.40),
            bar(5, 1.30, 1.25),
            bar(6, 1.20, 1.10),
        ];

        let report = DroppinessAnalyzer::default()
            .analyze(&bars)
            .expect("spike detected");

        assert_eq!(report.spikes, 1);
        assert_eq!(report.faded, 1);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.largest_spike_pct, 60.0);
    }

    #[test]
    fn held_spike_scores_low() {
        let bars = vec![
            bar(3, 1.00, 1.00),
            bar(4, 1.50, 1.45),
            bar(5, 1.55, 1.50),
            bar(6, 1.60, 1.52),
        ];

        let report = DroppinessAnalyzer::default()
            .analyze(&bars)
            .expect("spike detected");

        assert_eq!(report.faded, 0);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn same_day_give_back_is_not_a_fade() {
        let bars = vec![
            bar(3, 1.00, 1.00),
            bar(4, 1.60, 1.20),
            bar(5, 1.42, 1.40),
            bar(6, 1.50, 1.45),
        ];

        let report = DroppinessAnalyzer::default()
            .analyze(&bars)
            .expect("spike detected");

        assert_eq!(report.spikes, 1);
        assert_eq!(report.faded, 0);
    }

    #[test]
    fn fade_window_closes_after_configured_bars() {
        let analyzer = DroppinessAnalyzer {
            fade_window_days: 2,
            ..DroppinessAnalyzer::default()
        };
        let bars = vec![
            bar(3, 1.00, 1.00),
            bar(4, 1.60, 1.50),
            bar(5, 1.55, 1.50),
            bar(6, 1.52, 1.48),
            bar(7, 1.40, 1.10),
        ];

        let report = analyzer.analyze(&bars).expect("spike detected");

        assert_eq!(report.faded, 0);
    }

    #[test]
    fn non_finite_prices_are_skipped() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2025-03-03,1.00,1.02,0.98,1.00,100\n\
                   2025-03-04,1.00,NaN,0.98,1.00,100\n\
                   2025-03-05,1.00,1.03,0.99,1.01,100\n";

        let bars = parse_price_history(csv.as_bytes()).expect("csv parses");

        assert!(bars[1].high.is_nan());
        assert!(DroppinessAnalyzer::default().analyze(&bars).is_none());
    }

    #[test]
    fn quiet_history_has_no_signal() {
        let bars = vec![bar(3, 1.00, 1.00), bar(4, 1.05, 1.02)];

        assert!(DroppinessAnalyzer::default().analyze(&bars).is_none());
    }
}
