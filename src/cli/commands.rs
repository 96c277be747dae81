use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::analyzers::{
    correlation_matrix, monthly_trend, pearson, run_clustering, scalar_summary, seasonal_pattern,
    weather_scatter, CorrelationMatrix, ScalarSummary, ScatterPoint, SeasonalPoint, TrendPoint,
};
use crate::cli::args::{Cli, Commands, SelectionArgs};
use crate::error::{ExplorerError, Result};
use crate::models::CanonicalDataset;
use crate::session::DashboardSession;
use crate::utils::constants::{CLUSTER_COUNT, SCATTER_SAMPLE_CAP};
use crate::utils::progress::ProgressReporter;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report { selection, json } => report(&selection, json),
        Commands::Weather { selection } => weather(&selection),
        Commands::Cluster { selection } => cluster(&selection),
    }
}

/// Load (or reuse) the canonical dataset and resolve the filter selection
fn open_session(selection: &SelectionArgs) -> Result<(DashboardSession, Arc<CanonicalDataset>)> {
    let mut session = DashboardSession::new(&selection.data_dir);

    let progress = ProgressReporter::new_spinner("Loading and cleaning dataset...", false);
    let dataset = session.dataset()?;
    progress.finish_with_message(&format!(
        "Loaded {} rows from {} stations",
        dataset.len(),
        dataset.stations().len()
    ));

    if !selection.stations.is_empty() {
        for station in &selection.stations {
            if !dataset.stations().contains(station) {
                warn!(station = station.as_str(), "requested station not present in the data");
            }
        }
        session.select_stations(selection.stations.clone());
    }

    let (observed_from, observed_to) = dataset.year_bounds().unwrap_or((0, 0));
    let year_from = selection.year_from.unwrap_or(observed_from);
    let year_to = selection.year_to.unwrap_or(observed_to);
    if year_from > year_to {
        return Err(ExplorerError::InvalidSelection(format!(
            "year range {year_from}..={year_to} is empty"
        )));
    }
    session.select_years(year_from, year_to);

    Ok((session, dataset))
}

#[derive(Serialize)]
struct ReportOutput {
    stations: Vec<String>,
    year_from: i32,
    year_to: i32,
    rows: usize,
    summary: ScalarSummary,
    correlation: CorrelationMatrix,
    monthly_trend: Vec<TrendPoint>,
    seasonal_pattern: Vec<SeasonalPoint>,
}

fn report(selection: &SelectionArgs, json: bool) -> Result<()> {
    let (session, dataset) = open_session(selection)?;
    let params = session.filter_params(&dataset);
    let subset = params.apply(&dataset);

    let summary = scalar_summary(&subset);
    let correlation = correlation_matrix(&subset);
    let trend = monthly_trend(&subset);
    let seasonal = seasonal_pattern(&subset);
    let (year_from, year_to) = params.year_range();

    if json {
        let mut stations: Vec<String> = params.stations().iter().cloned().collect();
        stations.sort();
        let output = ReportOutput {
            stations,
            year_from,
            year_to,
            rows: subset.len(),
            summary,
            correlation,
            monthly_trend: trend,
            seasonal_pattern: seasonal,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Selection: {} stations, years {}-{}, {} rows",
        params.stations().len(),
        year_from,
        year_to,
        subset.len()
    );

    println!("\nKey metrics");
    println!("  Mean PM2.5:       {}", format_value(summary.mean_pm25, "ug/m3"));
    println!("  Max PM2.5:        {}", format_value(summary.max_pm25, "ug/m3"));
    println!("  Mean temperature: {}", format_value(summary.mean_temperature, "degC"));
    println!(
        "  Air condition:    {}",
        summary
            .condition
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    println!("\nCorrelation matrix (Pearson)");
    print!("{:>6}", "");
    for name in &correlation.columns {
        print!(" {name:>6}");
    }
    println!();
    for (index, row) in correlation.values.iter().enumerate() {
        print!("{:>6}", correlation.columns[index]);
        for value in row {
            print!(" {}", format_cell(*value));
        }
        println!();
    }

    println!("\nMonthly PM2.5 trend");
    for point in &trend {
        println!(
            "  {}  {}",
            point.month_start.format("%Y-%m"),
            format_value(point.mean_pm25, "ug/m3")
        );
    }

    println!("\nSeasonal pattern (mean PM2.5 per month of year)");
    for point in &seasonal {
        let name = MONTH_NAMES.get(point.month as usize - 1).unwrap_or(&"?");
        let marker = if point.winter { "  (winter)" } else { "" };
        println!("  {name}  {}{marker}", format_value(point.mean_pm25, "ug/m3"));
    }

    Ok(())
}

fn weather(selection: &SelectionArgs) -> Result<()> {
    let (session, dataset) = open_session(selection)?;
    let subset = session.filter_params(&dataset).apply(&dataset);

    let scatter = weather_scatter(&subset);

    println!(
        "Weather impact samples (at most {} rows, fixed-seed sample)",
        SCATTER_SAMPLE_CAP
    );
    describe_points("Temperature vs PM2.5", &scatter.temperature);
    describe_points("Wind speed vs PM2.5", &scatter.wind);
    describe_points("Rainfall (> 0 mm) vs PM2.5", &scatter.rain);

    Ok(())
}

fn cluster(selection: &SelectionArgs) -> Result<()> {
    let (session, dataset) = open_session(selection)?;
    let subset = session.filter_params(&dataset).apply(&dataset);

    let progress = ProgressReporter::new_spinner("Clustering current selection...", false);
    let outcome = run_clustering(&subset)?;
    progress.finish_with_message("Clustering complete");

    if outcome.is_empty() {
        println!("Not enough complete rows to cluster this selection.");
        return Ok(());
    }

    println!(
        "Clustered {} sampled rows into {} groups",
        outcome.rows().len(),
        CLUSTER_COUNT
    );
    for cluster in 0..CLUSTER_COUNT {
        if let Some(means) = outcome.feature_means(cluster) {
            println!(
                "  Cluster {cluster}: {} rows | mean PM2.5 {:.1}, TEMP {:.1}, WSPM {:.1}, RAIN {:.2}",
                outcome.sizes()[cluster],
                means[0],
                means[1],
                means[2],
                means[3]
            );
        }
    }
    println!("  Rainy rows (> 0 mm): {}", outcome.rainy_rows().len());

    Ok(())
}

fn describe_points(title: &str, points: &[ScatterPoint]) {
    let r = pearson(points);
    let r_text = if r.is_nan() {
        "undefined".to_string()
    } else {
        format!("{r:.3}")
    };
    println!("  {title}: {} points, Pearson r = {r_text}", points.len());
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2} {unit}"),
        None => "-".to_string(),
    }
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        "   NaN".to_string()
    } else {
        format!("{value:6.2}")
    }
}
