//! Reconcile two in-memory sources and print the first forecast days.
//!
//! Run with `cargo run --example quickstart`.

use chrono::{Datelike, Duration, NaiveDate};
use revenue_forecast::catalog::MetricCatalog;
use revenue_forecast::models::AdditiveModel;
use revenue_forecast::pipeline::ForecastPipeline;
use revenue_forecast::sources::{DateRange, RawRecord, StaticSource};

fn report(date_field: &str, metric_field: &str, start: NaiveDate, days: i64) -> Vec<RawRecord> {
    (0..days)
        .map(|i| {
            let date = start + Duration::days(i);
            let weekend = date.weekday().number_from_monday() >= 6;
            let value = 2000.0 + 3.0 * i as f64 - if weekend { 800.0 } else { 0.0 };
            RawRecord::new()
                .with(date_field, &date.format("%Y%m%d").to_string())
                .with(metric_field, &format!("{:.2}", value))
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = MetricCatalog::default();
    let metric = catalog.lookup("Revenue")?;

    let legacy = StaticSource::new(
        "ua",
        "ga:date",
        report(
            "ga:date",
            &metric.legacy_field,
            NaiveDate::from_ymd_opt(2022, 7, 1).unwrap(),
            400,
        ),
    );
    let primary = StaticSource::new(
        "ga4",
        "date",
        report(
            "date",
            &metric.primary_field,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            300,
        ),
    );

    let pipeline = ForecastPipeline::new(AdditiveModel::default(), 30);
    let output = pipeline.run_sources(
        &primary,
        &DateRange::unbounded(),
        &legacy,
        &DateRange::unbounded(),
        metric,
    )?;

    println!("{:?}", output.report);
    println!("{}", output.table.columns.join(" | "));
    for row in output.table.rows.iter().filter(|r| r.actual.is_none()).take(10) {
        println!(
            "{} | {:>9.2} | {:>9.2} | {:>9.2}",
            row.date, row.predicted, row.lower_bound, row.upper_bound
        );
    }
    Ok(())
}
