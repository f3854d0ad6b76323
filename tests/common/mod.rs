#![allow(dead_code)]
use missify::{Column, Dataset, Value};

pub fn stores() -> Dataset {
    Dataset::new(vec![
        Column::text("region", ["A", "A", "B", "B"]),
        Column::float("sales", [120.0, 80.0, 310.0, 290.0]),
        Column::integer("units", [4, 3, 9, 8]),
        Column::boolean("promo", [true, false, true, false]),
    ])
    .expect("valid stores dataset")
}

pub fn revenue() -> Dataset {
    Dataset::new(vec![Column::float("revenue", [10.0, 20.0, 30.0, 40.0, 1000.0])])
        .expect("valid revenue dataset")
}

/// A larger dataset for frequency checks: `n` rows, numeric `x` spread over
/// `[0, n)` and a two-level `group`.
pub fn wide(n: usize) -> Dataset {
    #[allow(clippy::cast_precision_loss)]
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let group: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "even" } else { "odd" }).collect();
    Dataset::new(vec![
        Column::float("x", x.clone()),
        Column::float("y", x),
        Column::text("group", group),
    ])
    .expect("valid wide dataset")
}

pub fn population_stats(values: &[f64]) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

pub fn sig(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn is_missing_at(dataset: &Dataset, column: &str, row: usize) -> bool {
    dataset
        .column(column)
        .expect("column exists")
        .get(row)
        .is_some_and(Value::is_missing)
}
