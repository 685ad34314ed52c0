use chrono::{Local, NaiveDate};
use clap::Args;
use short_check::config::AppConfig;
use short_check::droppiness::{load_price_history, DroppinessAnalyzer};
use short_check::error::AppError;
use short_check::scoring::{
    ExtractedData, ProviderTag, ShortCheckEngine, ShortCheckResponse, ShortCheckResult, StatusTag,
};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding one extracted-data record
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Droppiness score (0-100) computed elsewhere
    #[arg(long)]
    pub(crate) droppiness: Option<f64>,
    /// Daily price history CSV used to derive droppiness when no score is given
    #[arg(long)]
    pub(crate) price_history: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the full result as JSON instead of the alert card
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        droppiness,
        price_history,
        as_of,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = ShortCheckEngine::new(config.scoring);
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let raw = fs::read_to_string(&input)?;
    let data: ExtractedData = serde_json::from_str(&raw)?;

    let droppiness_report = match (droppiness, price_history) {
        (None, Some(path)) => {
            let bars = load_price_history(path)?;
            DroppinessAnalyzer::default().analyze(&bars)
        }
        _ => None,
    };
    let droppiness = droppiness.or_else(|| droppiness_report.as_ref().map(|report| report.score));

    let result = engine.evaluate(&data, droppiness, as_of);

    if json {
        let response = ShortCheckResponse {
            as_of,
            droppiness_report,
            result,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(report) = &droppiness_report {
        println!(
            "Droppiness {:.0}/100 from {} spike(s), {} faded (largest {:.1}%)",
            report.score, report.spikes, report.faded, report.largest_spike_pct
        );
    }
    render_result(&result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = ShortCheckEngine::default();

    println!("Short check demo (as of {as_of})");
    for (title, data, droppiness) in demo_scenarios(as_of) {
        println!("\n== {title} ==");
        let result = engine.evaluate(&data, droppiness, as_of);
        render_result(&result);
    }

    Ok(())
}

fn render_result(result: &ShortCheckResult) {
    print!("{}", result.alert_card);
    println!(
        "Score {} / {:.0} | {}",
        result.total_score, result.max_possible_score, result.category_label
    );
    if !result.alert_chips.is_empty() {
        let chips: Vec<_> = result
            .alert_chips
            .iter()
            .map(|chip| chip.label.as_str())
            .collect();
        println!("Alerts: {}", chips.join(", "));
    }
    println!("{}", result.synopsis);
}

fn cash_starved_microcap() -> ExtractedData {
    ExtractedData {
        ticker: Some("ABCD".to_string()),
        cash_runway: Some(2.0),
        quarterly_burn_rate: Some(-2.0),
        offering_ability: Some(StatusTag::from_raw("DT:Red")),
        institutional_ownership: Some(5.0),
        short_interest: Some(2.0),
        float: Some(0.4),
        market_cap: Some(30.0),
        ..ExtractedData::default()
    }
}

fn demo_scenarios(as_of: NaiveDate) -> Vec<(&'static str, ExtractedData, Option<f64>)> {
    vec![
        (
            "Cash-starved microcap",
            cash_starved_microcap(),
            None,
        ),
        (
            "Cash-starved microcap with fading spikes",
            cash_starved_microcap(),
            Some(80.0),
        ),
        (
            "Cash-generating institutional holding",
            ExtractedData {
                ticker: Some("SAFE".to_string()),
                quarterly_burn_rate: Some(0.5),
                institutional_ownership: Some(80.0),
                offering_ability: Some(StatusTag::provider(ProviderTag::Low)),
                overhead_supply: Some(StatusTag::provider(ProviderTag::Low)),
                ..ExtractedData::default()
            },
            None,
        ),
        (
            "Fresh partnership news",
            ExtractedData {
                ticker: Some("NEWS".to_string()),
                cash_runway: Some(5.0),
                float: Some(3.5),
                news_headline: Some("Signs strategic partnership with major retailer".to_string()),
                news_date: Some(as_of - chrono::Duration::days(1)),
                offering_ability: Some(StatusTag::free_text("ATM and S-1 on file")),
                ..ExtractedData::default()
            },
            None,
        ),
    ]
}
