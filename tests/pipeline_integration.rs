//! End-to-end runs: delimited text in, JSON documents out.

use approx::assert_relative_eq;
use price_outlook::io::{read_table_from_reader, to_writer, DEFAULT_DELIMITER};
use price_outlook::models::Damping;
use price_outlook::pipeline::{run, PipelineConfig};
use price_outlook::ForecastError;
use serde_json::Value;

fn tsv(header: &[&str], rows: &[(String, Vec<String>)]) -> String {
    let mut out = header.join("\t");
    out.push('\n');
    for (date, cells) in rows {
        out.push_str(date);
        for cell in cells {
            out.push('\t');
            out.push_str(cell);
        }
        out.push('\n');
    }
    out
}

fn monthly_rows(years: usize, columns: &[&dyn Fn(usize) -> String]) -> Vec<(String, Vec<String>)> {
    (0..years * 12)
        .map(|i| {
            let date = format!("{}-{:02}-01", 2019 + i / 12, i % 12 + 1);
            (date, columns.iter().map(|f| f(i)).collect())
        })
        .collect()
}

fn json<T: serde::Serialize>(value: &T) -> Value {
    let mut buffer = Vec::new();
    to_writer(&mut buffer, value).unwrap();
    serde_json::from_slice(&buffer).unwrap()
}

#[test]
fn five_percent_growth_stays_under_ceiling() {
    let data = "Date\tPorto\n2024-01-01\t100\n2024-02-01\t105\n2024-03-01\t110.25\n";
    let table = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap();

    let config = PipelineConfig {
        horizon: 2,
        ..Default::default()
    };
    let output = run(&table, &config).unwrap();
    assert!(output.report.is_clean(), "{}", output.report);

    // Three months of history: elapsed_years = 0.25, so CAGR = 1.05^8 - 1.
    let cagr = 1.05_f64.powi(8) - 1.0;
    let entity = &output.forecasts[0];
    assert_relative_eq!(entity.cap.unwrap().cagr, cagr, epsilon = 1e-12);

    let ceiling = entity.cap.unwrap().ceiling(2, 12);
    assert_relative_eq!(ceiling[0], 110.25 * 1.05_f64.powf(8.0 / 12.0), epsilon = 1e-9);
    assert!(ceiling[1] > ceiling[0]);
    let forecast = entity.forecast.values();
    assert!(forecast[0] <= ceiling[0] && forecast[1] <= ceiling[1]);
    assert!(forecast[1] > forecast[0]);
    assert!(forecast[0] > 110.25);

    let published = output.combined.series("Porto").unwrap();
    assert_eq!(published.len(), 5);
    assert_eq!(&published[..3], &[Some(100.0), Some(105.0), Some(110.25)]);
    // Rounding to cents can only move a value by half a cent.
    assert!(published[3].unwrap() <= ceiling[0] + 0.005);
    assert!(published[4].unwrap() <= ceiling[1] + 0.005);

    assert_eq!(
        output.combined.dates().last().unwrap().to_string(),
        "2024-05-01"
    );
}

#[test]
fn documents_have_expected_shape() {
    let rows = monthly_rows(
        3,
        &[
            &|i: usize| format!("{:.2}", 200.0 * 1.004_f64.powi(i as i32)),
            &|i: usize| if i == 7 { String::new() } else { format!("{}", 50 + i) },
        ],
    );
    let data = tsv(&["Date", "Bergen", "Tromso"], &rows);
    let table = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap();

    let output = run(
        &table,
        &PipelineConfig {
            horizon: 6,
            damping: Damping::Fixed(0.9),
            ..Default::default()
        },
    )
    .unwrap();

    let combined = json(&output.combined);
    let object = combined.as_object().unwrap();
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert!(keys.contains(&"dates"));
    assert_eq!(object["dates"].as_array().unwrap().len(), 42);
    assert_eq!(object["dates"][0], "2019-01-01");
    assert_eq!(object["dates"][41], "2022-06-01");
    for name in ["Bergen", "Tromso"] {
        assert_eq!(object[name].as_array().unwrap().len(), 42);
    }
    // The missing historical cell is published as null.
    assert!(object["Tromso"][7].is_null());

    let yoy = json(&output.year_over_year);
    let yoy = yoy.as_array().unwrap();
    assert_eq!(yoy.len(), 24);
    assert_eq!(yoy[0]["Date"], "2020-01-01");
    let expected = ((1.004_f64).powi(12) - 1.0) * 100.0;
    assert!((yoy[0]["Bergen"].as_f64().unwrap() - expected).abs() < 0.02);
    // Tromso's month 7 is missing, so the YoY point a year later is absent.
    assert!(yoy[7].get("Tromso").is_none());
    assert!(yoy[7].get("Bergen").is_some());

    let mom = json(&output.month_over_month);
    let mom = mom.as_array().unwrap();
    assert_eq!(mom.len(), 35);
    assert!(mom[6].get("Tromso").is_none());
    assert!(mom[7].get("Tromso").is_none());
    assert_eq!(mom[8]["Tromso"], 1.72);
}

#[test]
fn zero_price_is_skipped_and_reported() {
    let rows = monthly_rows(
        1,
        &[&|i: usize| if i == 5 { "0".to_string() } else { format!("{}", 10 + i) }],
    );
    let data = tsv(&["Date", "Kiel"], &rows);
    let table = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap();

    let output = run(
        &table,
        &PipelineConfig {
            horizon: 3,
            ..Default::default()
        },
    )
    .unwrap();

    // The zero value makes the log fit impossible.
    assert!(matches!(
        output.report.failures[0].error,
        ForecastError::NonPositiveValue { index: 5, .. }
    ));
    assert!(output.combined.series("Kiel").is_none());

    // MoM record k belongs to index k + 1: index 6 divides by the zero.
    let mom = output.month_over_month.records();
    assert_eq!(mom[4].get("Kiel"), Some(-100.0));
    assert_eq!(mom[5].get("Kiel"), None);
    assert_eq!(mom[6].get("Kiel"), Some(6.25));
    assert_eq!(output.report.skipped_points.len(), 1);
    assert_eq!(output.report.skipped_points[0].date.to_string(), "2019-07-01");
}

#[test]
fn unlogged_fit_accepts_zero_and_negative_prices() {
    let rows = monthly_rows(2, &[&|i: usize| format!("{}", i as f64 - 3.0)]);
    let data = tsv(&["Date", "Spread"], &rows);
    let table = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap();

    let output = run(
        &table,
        &PipelineConfig {
            horizon: 4,
            use_log_transform: false,
            apply_growth_cap: false,
            damping: Damping::Fixed(1.0),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(output.report.failures.is_empty());
    let values = output.forecasts[0].forecast.values();
    for (h, v) in values.iter().enumerate() {
        assert_relative_eq!(*v, 20.0 + (h + 1) as f64, epsilon = 1e-3);
    }
}

#[test]
fn misaligned_dates_abort_the_run() {
    let data = "Date\tA\n2024-03-01\t1\n2024-02-01\t2\n";
    let err = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap_err();
    assert!(matches!(
        err,
        price_outlook::InputError::DatesNotIncreasing { index: 1 }
    ));
}

#[test]
fn early_ending_entity_is_published_under_table_dates() {
    let rows = monthly_rows(
        2,
        &[
            &|i: usize| if i < 12 { format!("{}", 100 + i) } else { String::new() },
            &|i: usize| format!("{}", 40 + i),
        ],
    );
    let data = tsv(&["Date", "Early", "Full"], &rows);
    let table = read_table_from_reader(data.as_bytes(), DEFAULT_DELIMITER).unwrap();

    let output = run(
        &table,
        &PipelineConfig {
            horizon: 3,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(output.report.failures.is_empty(), "{}", output.report);

    let future = &output.combined.dates()[24..];
    assert_eq!(future[0].to_string(), "2021-01-01");
    for entity in &output.forecasts {
        assert_eq!(entity.forecast.dates(), future, "{}", entity.entity);
    }

    let early = output
        .forecasts
        .iter()
        .find(|f| f.entity == "Early")
        .unwrap();
    let published = output.combined.series("Early").unwrap();
    assert!(published[12..24].iter().all(Option::is_none));
    for (value, cell) in early.forecast.values().iter().zip(&published[24..]) {
        assert_relative_eq!(cell.unwrap(), *value, epsilon = 0.005);
    }
    // A year past its last observation, the rising entity sits above it.
    assert!(early.forecast.values()[0] > 111.0);
}
